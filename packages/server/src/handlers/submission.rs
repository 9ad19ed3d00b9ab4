use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::{FileKey, FileStore};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{instrument, warn};

use crate::eligibility::{self, Verdict};
use crate::entity::submission::SubmissionFile;
use crate::entity::{competition, submission, vote};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::lifecycle;
use crate::models::submission::{
    SubmissionResponse, VoteResponse, files_to_json, validate_entry_fields,
};
use crate::state::AppState;
use crate::utils::upload;

use super::competition::{find_competition_by_ref, stored_kind, stored_status};

/// Body limit for entry uploads; generous enough for a handful of videos.
/// Per-file ceilings are enforced against the configuration after parsing.
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(1024 * 1024 * 1024)
}

/// One parsed part of the multipart entry form.
struct UploadedFile {
    filename: String,
    data: Vec<u8>,
}

/// Entry form fields.
struct EntryForm {
    entry_title: String,
    description: String,
    files: Vec<UploadedFile>,
}

/// Drain the multipart stream into memory. Nothing touches storage here, so
/// every later precondition failure discards the upload for free.
async fn parse_entry_form(mut multipart: Multipart) -> Result<EntryForm, AppError> {
    let mut entry_title = None;
    let mut description = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart request: {e}")))?
    {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("entry_title") => {
                entry_title = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Malformed entry_title field: {e}"))
                })?);
            }
            Some("description") => {
                description = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Malformed description field: {e}"))
                })?);
            }
            Some("files") => {
                let filename = field
                    .file_name()
                    .map(ToString::to_string)
                    .ok_or_else(|| AppError::Validation("File part needs a filename".into()))?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Malformed file part: {e}")))?
                    .to_vec();
                files.push(UploadedFile { filename, data });
            }
            // Unknown fields are ignored.
            _ => {}
        }
    }

    Ok(EntryForm {
        entry_title: entry_title
            .ok_or_else(|| AppError::Validation("entry_title is required".into()))?,
        description: description.unwrap_or_default(),
        files,
    })
}

/// Validate every file against the allow-list and its class-specific size
/// ceiling, returning the extension to store each file under.
fn validate_entry_files(
    files: &[UploadedFile],
    config: &crate::config::SubmissionConfig,
) -> Result<Vec<String>, AppError> {
    if files.is_empty() {
        return Err(AppError::Validation("At least one file is required".into()));
    }
    if files.len() > config.max_files {
        return Err(AppError::Validation(format!(
            "At most {} files are allowed per entry",
            config.max_files
        )));
    }

    let mut extensions = Vec::with_capacity(files.len());
    for file in files {
        let filename =
            upload::validate_filename(&file.filename).map_err(|e| AppError::Validation(e.into()))?;

        let extension = upload::extension_of(filename).ok_or_else(|| {
            AppError::Validation(format!("File '{filename}' has no extension"))
        })?;
        let class = upload::classify_extension(&extension).ok_or_else(|| {
            AppError::Validation(format!("File type '.{extension}' is not allowed"))
        })?;

        let limit = upload::max_bytes_for(class, config);
        if file.data.len() as u64 > limit {
            return Err(AppError::Validation(format!(
                "File '{}' is too large ({} > {} bytes)",
                filename,
                file.data.len(),
                limit
            )));
        }
        if file.data.is_empty() {
            return Err(AppError::Validation(format!("File '{filename}' is empty")));
        }

        extensions.push(extension);
    }

    Ok(extensions)
}

/// Best-effort removal of files stored before a failed insert.
async fn discard_stored_files(files: &dyn FileStore, stored: &[SubmissionFile]) {
    for file in stored {
        match FileKey::parse(&file.key) {
            Ok(key) => {
                if let Err(e) = files.delete(&key).await {
                    warn!(key = %file.key, error = %e, "Failed to discard staged entry file");
                }
            }
            Err(e) => warn!(key = %file.key, error = %e, "Unparseable staged file key"),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/competitions/{ref}/submissions",
    tag = "Submissions",
    operation_id = "createSubmission",
    summary = "Submit an entry to a competition",
    description = "Multipart form with `entry_title`, optional `description` and one or more `files` parts. Preconditions are checked in order: the competition must exist and be `open`, the caller's role must be eligible for the competition kind, the caller must not have submitted before, and every file must be an allowed type within its size ceiling (videos get a larger ceiling). No partial submission is ever persisted.",
    params(("ref" = String, Path, description = "Competition ID or short id")),
    responses(
        (status = 201, description = "Entry accepted", body = SubmissionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Wrong status or ineligible role (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already submitted (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(competition_ref, user_id = auth_user.user_id))]
pub async fn create_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(competition_ref): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    // 1. Competition exists (dual id/short-id lookup).
    let competition_model = find_competition_by_ref(&state.db, &competition_ref).await?;

    // 2. Submissions are only admitted while open.
    lifecycle::require_open(stored_status(&competition_model)?)?;

    // 3. Role/kind eligibility.
    let kind = stored_kind(&competition_model)?;
    if let Verdict::Denied(reason) = eligibility::can_submit(auth_user.role, kind) {
        return Err(AppError::Forbidden(reason));
    }

    // 4. One submission per user per competition.
    let already = submission::Entity::find()
        .filter(submission::Column::CompetitionId.eq(competition_model.id))
        .filter(submission::Column::UserId.eq(auth_user.user_id))
        .one(&state.db)
        .await?;
    if already.is_some() {
        return Err(AppError::Conflict(
            "You have already submitted to this competition".into(),
        ));
    }

    // 5. Entry fields and files.
    let form = parse_entry_form(multipart).await?;
    validate_entry_fields(&form.entry_title, &form.description)?;
    let extensions = validate_entry_files(&form.files, &state.config.submission)?;

    // All preconditions hold; persist the files, then the record.
    let mut stored: Vec<SubmissionFile> = Vec::with_capacity(form.files.len());
    for (file, extension) in form.files.iter().zip(&extensions) {
        match state.files.put(&file.data, extension).await {
            Ok(key) => stored.push(SubmissionFile {
                key: key.to_string(),
                filename: file.filename.trim().to_string(),
                size: file.data.len() as u64,
            }),
            Err(e) => {
                discard_stored_files(state.files.as_ref(), &stored).await;
                return Err(e.into());
            }
        }
    }

    let new_submission = submission::ActiveModel {
        competition_id: Set(competition_model.id),
        user_id: Set(auth_user.user_id),
        username: Set(auth_user.username.clone()),
        entry_title: Set(form.entry_title.trim().to_string()),
        description: Set(form.description),
        files: Set(files_to_json(&stored)),
        vote_count: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    // The compound unique index on (competition_id, user_id) closes the race
    // between the pre-check and this insert; the staged files are discarded
    // when losing it.
    match new_submission.insert(&state.db).await {
        Ok(model) => Ok((StatusCode::CREATED, Json(SubmissionResponse::from(model)))),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            discard_stored_files(state.files.as_ref(), &stored).await;
            Err(AppError::Conflict(
                "You have already submitted to this competition".into(),
            ))
        }
        Err(e) => {
            discard_stored_files(state.files.as_ref(), &stored).await;
            Err(e.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/competitions/{ref}/submissions",
    tag = "Submissions",
    operation_id = "listSubmissions",
    summary = "List a competition's submissions",
    description = "Returns the competition's submissions in submission order.",
    params(("ref" = String, Path, description = "Competition ID or short id")),
    responses(
        (status = 200, description = "Submissions, oldest first", body = Vec<SubmissionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(competition_ref))]
pub async fn list_submissions(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(competition_ref): Path<String>,
) -> Result<Json<Vec<SubmissionResponse>>, AppError> {
    let competition_model = find_competition_by_ref(&state.db, &competition_ref).await?;

    let submissions = submission::Entity::find()
        .filter(submission::Column::CompetitionId.eq(competition_model.id))
        .order_by_asc(submission::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(
        submissions
            .into_iter()
            .map(SubmissionResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/submissions/{id}",
    tag = "Submissions",
    operation_id = "getSubmission",
    summary = "Get a submission by ID",
    params(("id" = i32, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission details", body = SubmissionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_submission(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let model = find_submission(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/submissions/{id}/vote",
    tag = "Submissions",
    operation_id = "voteForSubmission",
    summary = "Vote for a submission",
    description = "Records one vote by the caller. The parent competition must be in `voting` status and the caller's role must be eligible for the competition kind. At most one vote per user per submission; repeats return 409 and leave the count unchanged. The vote row insert and counter increment commit atomically, so the count always equals the number of voters.",
    params(("id" = i32, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Vote recorded", body = VoteResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Wrong status or ineligible role (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already voted (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn vote_for_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<VoteResponse>, AppError> {
    // 1. Submission and its parent competition exist; votes only while voting.
    let submission_model = find_submission(&state.db, id).await?;
    let competition_model = competition::Entity::find_by_id(submission_model.competition_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Submission {} references missing competition {}",
                submission_model.id, submission_model.competition_id
            ))
        })?;
    lifecycle::require_voting(stored_status(&competition_model)?)?;

    // 2. Role/kind eligibility (more permissive than submission on purpose).
    let kind = stored_kind(&competition_model)?;
    if let Verdict::Denied(reason) = eligibility::can_vote(auth_user.role, kind) {
        return Err(AppError::Forbidden(reason));
    }

    // 3. Set-insert plus increment in one transaction: the composite primary
    // key rejects a duplicate voter, and the counter moves only when the
    // insert succeeded, so vote_count == |votes| even under concurrent votes.
    let txn = state.db.begin().await?;

    let new_vote = vote::ActiveModel {
        submission_id: Set(submission_model.id),
        user_id: Set(auth_user.user_id),
        created_at: Set(chrono::Utc::now()),
    };

    match new_vote.insert(&txn).await {
        Ok(_) => {}
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict(
                "You have already voted for this submission".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    }

    submission::Entity::update_many()
        .filter(submission::Column::Id.eq(submission_model.id))
        .col_expr(
            submission::Column::VoteCount,
            Expr::col(submission::Column::VoteCount).add(1),
        )
        .exec(&txn)
        .await?;

    let updated = submission::Entity::find_by_id(submission_model.id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Internal("Submission vanished during vote".into()))?;

    txn.commit().await?;

    Ok(Json(VoteResponse {
        submission_id: updated.id,
        vote_count: updated.vote_count,
    }))
}

/// Find a submission by ID or return 404.
async fn find_submission<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<submission::Model, AppError> {
    submission::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".into()))
}
