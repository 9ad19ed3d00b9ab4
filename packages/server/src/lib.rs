pub mod cascade;
pub mod config;
pub mod database;
pub mod eligibility;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "VoteNest API",
        version = "1.0.0",
        description = "API for the VoteNest competition and voting platform"
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::category::list_categories,
        handlers::category::get_category,
        handlers::category::create_category,
        handlers::category::delete_category,
        handlers::suggestion::create_suggestion,
        handlers::suggestion::list_suggestions,
        handlers::suggestion::approve_suggestion,
        handlers::suggestion::reject_suggestion,
        handlers::competition::create_competition,
        handlers::competition::list_competitions,
        handlers::competition::get_competition,
        handlers::competition::update_competition,
        handlers::competition::delete_competition,
        handlers::submission::create_submission,
        handlers::submission::list_submissions,
        handlers::submission::get_submission,
        handlers::submission::vote_for_submission,
        handlers::file::get_file,
        handlers::admin::list_users,
        handlers::admin::update_user_role,
        handlers::admin::delete_user,
    ),
    tags(
        (name = "Auth", description = "Registration, login and account info"),
        (name = "Categories", description = "Competition categories"),
        (name = "Category Suggestions", description = "User-suggested categories and their review"),
        (name = "Competitions", description = "Competition CRUD and lifecycle"),
        (name = "Submissions", description = "Competition entries and voting"),
        (name = "Files", description = "Stored entry files"),
        (name = "Admin", description = "User administration"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
        .max_age(Duration::from_secs(config.max_age))
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .layer(cors)
}
