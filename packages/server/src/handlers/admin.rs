use axum::Json;
use axum::extract::{Path, Query, State};
use sea_orm::*;
use tracing::instrument;

use crate::cascade::{self, CascadeReport};
use crate::eligibility::Role;
use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::admin::{
    AdminUserResponse, UpdateUserRoleRequest, UserListQuery, UserListResponse,
};
use crate::models::shared::Pagination;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Admin",
    operation_id = "listUsers",
    summary = "List user accounts",
    description = "Admin only. Paginated, optionally filtered by role.",
    responses(
        (status = 200, description = "User accounts", body = UserListResponse),
        (status = 400, description = "Unknown role filter (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    auth_user.require_admin()?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = user::Entity::find();

    if let Some(ref raw) = query.role {
        let role = Role::parse(raw).ok_or_else(|| {
            AppError::Validation("role must be one of: individual, business, admin".into())
        })?;
        select = select.filter(user::Column::Role.eq(role.as_str()));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_asc(user::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(AdminUserResponse::from)
        .collect();

    Ok(Json(UserListResponse {
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
    patch,
    path = "/api/v1/admin/users/{id}",
    tag = "Admin",
    operation_id = "updateUserRole",
    summary = "Change a user's role",
    description = "Admin only. Demoting the last remaining admin is rejected: at least one admin account must exist at all times.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = AdminUserResponse),
        (status = 400, description = "Unknown role (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Would leave zero admins (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_user_role(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateUserRoleRequest>,
) -> Result<Json<AdminUserResponse>, AppError> {
    auth_user.require_admin()?;

    let new_role = Role::parse(&payload.role).ok_or_else(|| {
        AppError::Validation("role must be one of: individual, business, admin".into())
    })?;

    let txn = state.db.begin().await?;
    let target = find_user(&txn, id).await?;

    if target.role == Role::Admin.as_str()
        && new_role != Role::Admin
        && admin_count(&txn).await? <= 1
    {
        return Err(AppError::Conflict(
            "At least one admin account must remain".into(),
        ));
    }

    let mut active: user::ActiveModel = target.into();
    active.role = Set(new_role.as_str().to_string());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        target_id = model.id,
        role = %model.role,
        admin_id = auth_user.user_id,
        "User role changed"
    );

    Ok(Json(AdminUserResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    tag = "Admin",
    operation_id = "deleteUser",
    summary = "Delete a user and everything they own",
    description = "Admin only. Cascades through the user's competitions (including their submissions and stored files), their own submissions elsewhere, and the votes they cast. Admins cannot delete themselves, and deleting the last remaining admin is rejected. File cleanup is best-effort; failures are listed in the report.",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Cascade report", body = CascadeReport),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Self-deletion attempt (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Would leave zero admins (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CascadeReport>, AppError> {
    auth_user.require_admin()?;

    if id == auth_user.user_id {
        return Err(AppError::Forbidden(
            "Admins cannot delete their own account".into(),
        ));
    }

    let target = find_user(&state.db, id).await?;

    if target.role == Role::Admin.as_str() && admin_count(&state.db).await? <= 1 {
        return Err(AppError::Conflict(
            "Cannot delete the last admin account".into(),
        ));
    }

    let report = cascade::delete_user(&state.db, state.files.as_ref(), target.id).await?;

    tracing::info!(
        target_id = id,
        competitions = report.competitions_deleted,
        submissions = report.submissions_deleted,
        votes = report.votes_deleted,
        file_failures = report.file_failures.len(),
        admin_id = auth_user.user_id,
        "User deleted"
    );

    Ok(Json(report))
}

async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

async fn admin_count<C: ConnectionTrait>(db: &C) -> Result<u64, AppError> {
    let count = user::Entity::find()
        .filter(user::Column::Role.eq(Role::Admin.as_str()))
        .count(db)
        .await?;
    Ok(count)
}
