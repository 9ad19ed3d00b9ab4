use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::{CategoryResponse, validate_category_name};
use crate::error::AppError;

/// Review status of a category suggestion. Closed set; terminal once moved
/// out of `pending_review`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuggestionStatus {
    PendingReview,
    Approved,
    Rejected,
}

impl SuggestionStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_review" => Some(Self::PendingReview),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSuggestionRequest {
    #[schema(example = "Street Art")]
    pub category_name: String,
    pub reason: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SuggestionListQuery {
    /// Optional status filter: pending_review, approved or rejected.
    pub status: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SuggestionResponse {
    pub id: i32,
    pub category_name: String,
    pub reason: Option<String>,
    pub submitted_by: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Review outcome; `created_category` is set when approval materialized a
/// new category (absent when a matching one already existed).
#[derive(Serialize, utoipa::ToSchema)]
pub struct ReviewSuggestionResponse {
    pub suggestion: SuggestionResponse,
    pub created_category: Option<CategoryResponse>,
}

impl From<crate::entity::category_suggestion::Model> for SuggestionResponse {
    fn from(m: crate::entity::category_suggestion::Model) -> Self {
        Self {
            id: m.id,
            category_name: m.category_name,
            reason: m.reason,
            submitted_by: m.submitted_by,
            status: m.status,
            created_at: m.created_at,
            reviewed_at: m.reviewed_at,
        }
    }
}

pub fn validate_create_suggestion(req: &CreateSuggestionRequest) -> Result<(), AppError> {
    validate_category_name(&req.category_name)?;
    if let Some(ref reason) = req.reason
        && reason.len() > 500
    {
        return Err(AppError::Validation(
            "Reason must be at most 500 bytes".into(),
        ));
    }
    Ok(())
}
