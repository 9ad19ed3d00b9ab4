use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_description, validate_title};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCompetitionRequest {
    #[schema(example = "Summer Photo Challenge")]
    pub title: String,
    pub description: String,
    /// `standard` or `business`.
    #[schema(example = "standard")]
    pub kind: String,
    pub category_id: i32,
    pub end_date: DateTime<Utc>,
    /// Optional URL-safe slug; generated when absent.
    pub short_id: Option<String>,
    /// Initial status: `upcoming` (default) or `pending_review`.
    pub status: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateCompetitionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// One of: upcoming, open, voting, closed, pending_review.
    pub status: Option<String>,
    /// `standard` or `business`. Admin-only once set.
    pub kind: Option<String>,
    pub category_id: Option<i32>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CompetitionListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Optional status filter.
    pub status: Option<String>,
    /// Case-insensitive title search.
    pub search: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompetitionResponse {
    pub id: i32,
    pub short_id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub kind: String,
    pub end_date: DateTime<Utc>,
    pub created_by: i32,
    pub category_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompetitionListResponse {
    pub data: Vec<CompetitionResponse>,
    pub pagination: Pagination,
}

impl From<crate::entity::competition::Model> for CompetitionResponse {
    fn from(m: crate::entity::competition::Model) -> Self {
        Self {
            id: m.id,
            short_id: m.short_id,
            title: m.title,
            description: m.description,
            status: m.status,
            kind: m.kind,
            end_date: m.end_date,
            created_by: m.created_by,
            category_id: m.category_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn validate_create_competition(req: &CreateCompetitionRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    validate_description(&req.description)?;
    Ok(())
}

pub fn validate_update_competition(req: &UpdateCompetitionRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }
    Ok(())
}
