use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::cascade::{self, CascadeReport};
use crate::eligibility::{CompetitionKind, Role};
use crate::entity::{category, competition};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::lifecycle::{self, CompetitionStatus};
use crate::models::competition::*;
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;
use crate::utils::short_id;

/// Look up a competition by numeric id or short id.
pub async fn find_competition_by_ref<C: ConnectionTrait>(
    db: &C,
    competition_ref: &str,
) -> Result<competition::Model, AppError> {
    // Short ids never consist of digits only, so a numeric ref is always a
    // database id.
    let found = match competition_ref.parse::<i32>() {
        Ok(id) => competition::Entity::find_by_id(id).one(db).await?,
        Err(_) => {
            competition::Entity::find()
                .filter(competition::Column::ShortId.eq(competition_ref))
                .one(db)
                .await?
        }
    };
    found.ok_or_else(|| AppError::NotFound("Competition not found".into()))
}

/// Parse the stored status, which is validated at every write boundary.
pub fn stored_status(model: &competition::Model) -> Result<CompetitionStatus, AppError> {
    CompetitionStatus::parse(&model.status).ok_or_else(|| {
        AppError::Internal(format!(
            "Competition {} has unrecognized status '{}'",
            model.id, model.status
        ))
    })
}

/// Parse the stored kind, which is validated at every write boundary.
pub fn stored_kind(model: &competition::Model) -> Result<CompetitionKind, AppError> {
    CompetitionKind::parse(&model.kind).ok_or_else(|| {
        AppError::Internal(format!(
            "Competition {} has unrecognized kind '{}'",
            model.id, model.kind
        ))
    })
}

/// Creator-or-admin gate shared by update and delete.
fn require_creator_or_admin(
    auth_user: &AuthUser,
    model: &competition::Model,
) -> Result<(), AppError> {
    if auth_user.is_admin() || model.created_by == auth_user.user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the competition creator or an admin can manage this competition".into(),
        ))
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/competitions",
    tag = "Competitions",
    operation_id = "createCompetition",
    summary = "Create a new competition",
    description = "Creates a competition. Only business and admin accounts may create competitions. The initial status is `upcoming` unless `pending_review` is requested. Title and short id are globally unique.",
    request_body = CreateCompetitionRequest,
    responses(
        (status = 201, description = "Competition created", body = CompetitionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Title or short id already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_competition(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCompetitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !matches!(auth_user.role, Role::Business | Role::Admin) {
        return Err(AppError::Forbidden(
            "Only business or admin accounts can create competitions".into(),
        ));
    }
    validate_create_competition(&payload)?;

    let kind = CompetitionKind::parse(&payload.kind)
        .ok_or_else(|| AppError::Validation("kind must be 'standard' or 'business'".into()))?;

    let status = match payload.status.as_deref() {
        None => CompetitionStatus::Upcoming,
        Some(raw) => match CompetitionStatus::parse(raw) {
            Some(s @ (CompetitionStatus::Upcoming | CompetitionStatus::PendingReview)) => s,
            _ => {
                return Err(AppError::Validation(
                    "Initial status must be 'upcoming' or 'pending_review'".into(),
                ));
            }
        },
    };

    let now = chrono::Utc::now();
    lifecycle::validate_end_date(payload.end_date, status, now)?;

    category::Entity::find_by_id(payload.category_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    let slug = match payload.short_id.as_deref() {
        Some(raw) => {
            let slug = short_id::validate(raw).map_err(|e| AppError::Validation(e.into()))?;
            if competition::Entity::find()
                .filter(competition::Column::ShortId.eq(slug))
                .one(&state.db)
                .await?
                .is_some()
            {
                return Err(AppError::Conflict(format!(
                    "Short id '{slug}' is already in use"
                )));
            }
            slug.to_string()
        }
        None => short_id::generate(),
    };

    let title = payload.title.trim().to_string();
    if competition::Entity::find()
        .filter(competition::Column::Title.eq(&title))
        .one(&state.db)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "A competition titled '{title}' already exists"
        )));
    }

    let new_competition = competition::ActiveModel {
        short_id: Set(slug),
        title: Set(title),
        description: Set(payload.description),
        status: Set(status.as_str().to_string()),
        kind: Set(kind.as_str().to_string()),
        end_date: Set(payload.end_date),
        created_by: Set(auth_user.user_id),
        category_id: Set(payload.category_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    // The unique indexes close the race between the checks above and this
    // insert.
    let model = new_competition
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Competition title or short id is already in use".into())
            }
            _ => AppError::from(e),
        })?;

    Ok((StatusCode::CREATED, Json(CompetitionResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/competitions",
    tag = "Competitions",
    operation_id = "listCompetitions",
    summary = "List competitions with pagination and search",
    description = "Returns a paginated list of competitions, newest first, with optional status filter and case-insensitive title search.",
    responses(
        (status = 200, description = "List of competitions", body = CompetitionListResponse),
        (status = 400, description = "Unknown status filter (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_competitions(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CompetitionListQuery>,
) -> Result<Json<CompetitionListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = competition::Entity::find();

    if let Some(ref raw) = query.status {
        let status = CompetitionStatus::parse(raw).ok_or_else(|| {
            AppError::Validation(
                "status must be one of: upcoming, open, voting, closed, pending_review".into(),
            )
        })?;
        select = select.filter(competition::Column::Status.eq(status.as_str()));
    }

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(competition::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_desc(competition::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(CompetitionResponse::from)
        .collect();

    Ok(Json(CompetitionListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/competitions/{ref}",
    tag = "Competitions",
    operation_id = "getCompetition",
    summary = "Get a competition by id or short id",
    params(("ref" = String, Path, description = "Competition ID or short id")),
    responses(
        (status = 200, description = "Competition details", body = CompetitionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(competition_ref))]
pub async fn get_competition(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(competition_ref): Path<String>,
) -> Result<Json<CompetitionResponse>, AppError> {
    let model = find_competition_by_ref(&state.db, &competition_ref).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/competitions/{ref}",
    tag = "Competitions",
    operation_id = "updateCompetition",
    summary = "Update a competition",
    description = "Partially updates a competition using PATCH semantics. Only the creator or an admin may update; status transitions are explicit status updates through this endpoint. A past end_date is rejected unless the (target) status is `voting` or `closed`. The kind is admin-only once set.",
    params(("ref" = String, Path, description = "Competition ID or short id")),
    request_body = UpdateCompetitionRequest,
    responses(
        (status = 200, description = "Competition updated", body = CompetitionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition or category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Title already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(competition_ref))]
pub async fn update_competition(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(competition_ref): Path<String>,
    AppJson(payload): AppJson<UpdateCompetitionRequest>,
) -> Result<Json<CompetitionResponse>, AppError> {
    validate_update_competition(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_competition_by_ref(&txn, &competition_ref).await?;
    require_creator_or_admin(&auth_user, &existing)?;

    if payload == UpdateCompetitionRequest::default() {
        return Ok(Json(existing.into()));
    }

    let current_status = stored_status(&existing)?;
    let current_kind = stored_kind(&existing)?;

    let target_status = match payload.status.as_deref() {
        None => current_status,
        Some(raw) => CompetitionStatus::parse(raw).ok_or_else(|| {
            AppError::Validation(
                "status must be one of: upcoming, open, voting, closed, pending_review".into(),
            )
        })?,
    };

    if let Some(end_date) = payload.end_date {
        lifecycle::validate_end_date(end_date, target_status, chrono::Utc::now())?;
    }

    let target_kind = match payload.kind.as_deref() {
        None => None,
        Some(raw) => {
            let requested = CompetitionKind::parse(raw).ok_or_else(|| {
                AppError::Validation("kind must be 'standard' or 'business'".into())
            })?;
            lifecycle::validate_kind_change(auth_user.role, current_kind, requested)?;
            Some(requested)
        }
    };

    if let Some(category_id) = payload.category_id {
        category::Entity::find_by_id(category_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".into()))?;
    }

    if let Some(ref title) = payload.title {
        let title = title.trim();
        if title != existing.title {
            let duplicate = competition::Entity::find()
                .filter(competition::Column::Title.eq(title))
                .one(&txn)
                .await?;
            if duplicate.is_some() {
                return Err(AppError::Conflict(format!(
                    "A competition titled '{title}' already exists"
                )));
            }
        }
    }

    let mut active: competition::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if payload.status.is_some() {
        active.status = Set(target_status.as_str().to_string());
    }
    if let Some(kind) = target_kind {
        active.kind = Set(kind.as_str().to_string());
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(end_date) = payload.end_date {
        active.end_date = Set(end_date);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Competition title is already in use".into())
        }
        _ => AppError::from(e),
    })?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/competitions/{ref}",
    tag = "Competitions",
    operation_id = "deleteCompetition",
    summary = "Delete a competition and its submissions",
    description = "Deletes a competition, cascading to its submissions and their stored files. Only the creator or an admin may delete. File cleanup is best-effort; failures are listed in the report without aborting the cascade.",
    params(("ref" = String, Path, description = "Competition ID or short id")),
    responses(
        (status = 200, description = "Cascade report", body = CascadeReport),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(competition_ref))]
pub async fn delete_competition(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(competition_ref): Path<String>,
) -> Result<Json<CascadeReport>, AppError> {
    let model = find_competition_by_ref(&state.db, &competition_ref).await?;
    require_creator_or_admin(&auth_user, &model)?;

    let report = cascade::delete_competition(&state.db, state.files.as_ref(), model.id).await?;

    tracing::info!(
        competition_id = model.id,
        submissions = report.submissions_deleted,
        files = report.files_deleted,
        file_failures = report.file_failures.len(),
        user_id = auth_user.user_id,
        "Competition deleted"
    );

    Ok(Json(report))
}
