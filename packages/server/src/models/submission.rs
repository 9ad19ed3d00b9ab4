use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::submission::SubmissionFile;
use crate::error::AppError;

/// A stored entry file as exposed over the API.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct SubmissionFileDto {
    /// Opaque storage key; fetch via `GET /api/v1/files/{key}`.
    pub key: String,
    #[schema(example = "sunset.png")]
    pub filename: String,
    pub size: u64,
}

impl From<SubmissionFile> for SubmissionFileDto {
    fn from(file: SubmissionFile) -> Self {
        Self {
            key: file.key,
            filename: file.filename,
            size: file.size,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    pub id: i32,
    pub competition_id: i32,
    pub user_id: i32,
    /// Username at submission time (not updated on renames).
    pub username: String,
    pub entry_title: String,
    pub description: String,
    pub files: Vec<SubmissionFileDto>,
    pub vote_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VoteResponse {
    pub submission_id: i32,
    /// Vote count after this vote was recorded.
    pub vote_count: i32,
}

/// Parse the stored files JSON column into DTOs.
pub fn files_from_json(value: &serde_json::Value) -> Vec<SubmissionFileDto> {
    serde_json::from_value::<Vec<SubmissionFile>>(value.clone())
        .unwrap_or_default()
        .into_iter()
        .map(SubmissionFileDto::from)
        .collect()
}

/// Serialize stored files for the JSON column.
pub fn files_to_json(files: &[SubmissionFile]) -> serde_json::Value {
    serde_json::to_value(files).unwrap_or(serde_json::Value::Array(vec![]))
}

impl From<crate::entity::submission::Model> for SubmissionResponse {
    fn from(m: crate::entity::submission::Model) -> Self {
        let files = files_from_json(&m.files);
        Self {
            id: m.id,
            competition_id: m.competition_id,
            user_id: m.user_id,
            username: m.username,
            entry_title: m.entry_title,
            description: m.description,
            files,
            vote_count: m.vote_count,
            created_at: m.created_at,
        }
    }
}

pub fn validate_entry_fields(entry_title: &str, description: &str) -> Result<(), AppError> {
    super::shared::validate_title(entry_title)?;
    if description.len() > 10_000 {
        return Err(AppError::Validation(
            "Description must be at most 10000 bytes".into(),
        ));
    }
    Ok(())
}
