use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/categories", category_routes())
        .nest("/category-suggestions", suggestion_routes())
        .nest("/competitions", competition_routes())
        .nest("/submissions", submission_routes())
        .nest("/files", file_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/me", get(handlers::auth::me))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::category::list_categories).post(handlers::category::create_category),
        )
        .route(
            "/{id}",
            get(handlers::category::get_category).delete(handlers::category::delete_category),
        )
}

fn suggestion_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::suggestion::list_suggestions)
                .post(handlers::suggestion::create_suggestion),
        )
        .route("/{id}/approve", post(handlers::suggestion::approve_suggestion))
        .route("/{id}/reject", post(handlers::suggestion::reject_suggestion))
}

fn competition_routes() -> Router<AppState> {
    let entries = Router::new()
        .route(
            "/",
            get(handlers::submission::list_submissions)
                .post(handlers::submission::create_submission),
        )
        .layer(handlers::submission::upload_body_limit());

    Router::new()
        .route(
            "/",
            get(handlers::competition::list_competitions)
                .post(handlers::competition::create_competition),
        )
        .route(
            "/{ref}",
            get(handlers::competition::get_competition)
                .patch(handlers::competition::update_competition)
                .delete(handlers::competition::delete_competition),
        )
        .nest("/{ref}/submissions", entries)
}

fn submission_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(handlers::submission::get_submission))
        .route("/{id}/vote", post(handlers::submission::vote_for_submission))
}

fn file_routes() -> Router<AppState> {
    Router::new().route("/{key}", get(handlers::file::get_file))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::admin::list_users))
        .route(
            "/users/{id}",
            patch(handlers::admin::update_user_role).delete(handlers::admin::delete_user),
        )
}
