use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::Func;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{category, category_suggestion};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::category::CategoryResponse;
use crate::models::suggestion::{
    CreateSuggestionRequest, ReviewSuggestionResponse, SuggestionListQuery, SuggestionResponse,
    SuggestionStatus, validate_create_suggestion,
};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/category-suggestions",
    tag = "Category Suggestions",
    operation_id = "createCategorySuggestion",
    summary = "Suggest a new category",
    description = "Any authenticated user can suggest a category; an admin reviews it later.",
    request_body = CreateSuggestionRequest,
    responses(
        (status = 201, description = "Suggestion recorded", body = SuggestionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(category_name = %payload.category_name))]
pub async fn create_suggestion(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSuggestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_suggestion(&payload)?;

    let new_suggestion = category_suggestion::ActiveModel {
        category_name: Set(payload.category_name.trim().to_string()),
        reason: Set(payload.reason),
        submitted_by: Set(auth_user.user_id),
        status: Set(SuggestionStatus::PendingReview.as_str().to_string()),
        created_at: Set(chrono::Utc::now()),
        reviewed_at: Set(None),
        ..Default::default()
    };

    let model = new_suggestion.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(SuggestionResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/category-suggestions",
    tag = "Category Suggestions",
    operation_id = "listCategorySuggestions",
    summary = "List category suggestions",
    description = "Admin only. Optionally filtered by status.",
    responses(
        (status = 200, description = "Suggestions, newest first", body = Vec<SuggestionResponse>),
        (status = 400, description = "Unknown status filter (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_suggestions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SuggestionListQuery>,
) -> Result<Json<Vec<SuggestionResponse>>, AppError> {
    auth_user.require_admin()?;

    let mut select = category_suggestion::Entity::find();

    if let Some(ref raw) = query.status {
        let status = SuggestionStatus::parse(raw).ok_or_else(|| {
            AppError::Validation(
                "status must be one of: pending_review, approved, rejected".into(),
            )
        })?;
        select = select.filter(category_suggestion::Column::Status.eq(status.as_str()));
    }

    let suggestions = select
        .order_by_desc(category_suggestion::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(
        suggestions
            .into_iter()
            .map(SuggestionResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/category-suggestions/{id}/approve",
    tag = "Category Suggestions",
    operation_id = "approveCategorySuggestion",
    summary = "Approve a pending suggestion",
    description = "Admin only. Materializes a matching category unless one already exists case-insensitively (idempotent). Review is terminal: an already-reviewed suggestion returns 409.",
    params(("id" = i32, Path, description = "Suggestion ID")),
    responses(
        (status = 200, description = "Suggestion approved", body = ReviewSuggestionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Suggestion not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already reviewed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn approve_suggestion(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ReviewSuggestionResponse>, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;
    let suggestion = find_pending_suggestion(&txn, id).await?;

    // Idempotent materialization: skip when a case-insensitive match exists.
    let existing = category::Entity::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(category::Column::Name)))
                .eq(suggestion.category_name.trim().to_lowercase()),
        )
        .one(&txn)
        .await?;

    let created_category = if existing.is_none() {
        let new_category = category::ActiveModel {
            name: Set(suggestion.category_name.trim().to_string()),
            description: Set(suggestion.reason.clone().unwrap_or_default()),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        Some(CategoryResponse::from(new_category.insert(&txn).await?))
    } else {
        None
    };

    let mut active: category_suggestion::ActiveModel = suggestion.into();
    active.status = Set(SuggestionStatus::Approved.as_str().to_string());
    active.reviewed_at = Set(Some(chrono::Utc::now()));
    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(ReviewSuggestionResponse {
        suggestion: model.into(),
        created_category,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/category-suggestions/{id}/reject",
    tag = "Category Suggestions",
    operation_id = "rejectCategorySuggestion",
    summary = "Reject a pending suggestion",
    description = "Admin only. Review is terminal: an already-reviewed suggestion returns 409.",
    params(("id" = i32, Path, description = "Suggestion ID")),
    responses(
        (status = 200, description = "Suggestion rejected", body = ReviewSuggestionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Suggestion not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already reviewed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn reject_suggestion(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ReviewSuggestionResponse>, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;
    let suggestion = find_pending_suggestion(&txn, id).await?;

    let mut active: category_suggestion::ActiveModel = suggestion.into();
    active.status = Set(SuggestionStatus::Rejected.as_str().to_string());
    active.reviewed_at = Set(Some(chrono::Utc::now()));
    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(ReviewSuggestionResponse {
        suggestion: model.into(),
        created_category: None,
    }))
}

async fn find_pending_suggestion<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<category_suggestion::Model, AppError> {
    let suggestion = category_suggestion::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Suggestion not found".into()))?;

    if suggestion.status != SuggestionStatus::PendingReview.as_str() {
        return Err(AppError::Conflict(format!(
            "Suggestion has already been reviewed ({})",
            suggestion.status
        )));
    }

    Ok(suggestion)
}
