use sea_orm::sea_query::{
    Index, MysqlQueryBuilder, OnConflict, PostgresQueryBuilder, SqliteQueryBuilder,
};
use sea_orm::*;
use tracing::info;

use crate::config::AppConfig;
use crate::entity::{category, submission, user};
use crate::utils::hash;

/// Sample categories created when `bootstrap.sample_data` is set.
const SAMPLE_CATEGORIES: &[(&str, &str)] = &[
    ("Photography", "Photo competitions of any genre"),
    ("Design", "Graphic, product and interior design"),
    ("Short Film", "Video entries up to a few minutes"),
];

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync covers single-column uniques declared on the
/// entities; the compound one-submission-per-user-per-competition key is
/// created manually on startup. This constraint, not the application-level
/// pre-check, is what makes concurrent duplicate submissions impossible.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let stmt = Index::create()
        .if_not_exists()
        .name("uq_submission_competition_user")
        .table(submission::Entity)
        .col(submission::Column::CompetitionId)
        .col(submission::Column::UserId)
        .unique()
        .to_owned();

    let sql = match db.get_database_backend() {
        DbBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
        DbBackend::MySql => stmt.to_string(MysqlQueryBuilder),
        _ => stmt.to_string(PostgresQueryBuilder),
    };

    db.execute_unprepared(&sql).await?;
    info!("Ensured index uq_submission_competition_user exists");

    Ok(())
}

/// Idempotent startup bootstrap, gated behind `bootstrap.enabled`.
///
/// Creates the default admin account and, when `bootstrap.sample_data` is
/// set, demo business/individual accounts plus sample categories. Reruns
/// are no-ops thanks to on-conflict-do-nothing inserts.
pub async fn bootstrap(db: &DatabaseConnection, config: &AppConfig) -> anyhow::Result<()> {
    let cfg = &config.bootstrap;
    if !cfg.enabled {
        return Ok(());
    }

    if cfg.admin_password.is_empty() {
        anyhow::bail!("bootstrap.admin_password must be set when bootstrap is enabled");
    }

    let mut users_inserted = 0u32;
    users_inserted += insert_user(
        db,
        &cfg.admin_username,
        &cfg.admin_email,
        &cfg.admin_password,
        "admin",
    )
    .await?;

    if cfg.sample_data {
        users_inserted += insert_user(
            db,
            "acme_studio",
            "studio@acme.example",
            &cfg.admin_password,
            "business",
        )
        .await?;
        users_inserted += insert_user(
            db,
            "demo_visitor",
            "visitor@votenest.example",
            &cfg.admin_password,
            "individual",
        )
        .await?;

        let mut categories_inserted = 0u32;
        for &(name, description) in SAMPLE_CATEGORIES {
            let model = category::ActiveModel {
                name: Set(name.to_string()),
                description: Set(description.to_string()),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            };

            let result = category::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(category::Column::Name)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(db)
                .await;

            match result {
                Ok(_) => categories_inserted += 1,
                Err(DbErr::RecordNotInserted) => {}
                Err(e) => return Err(e.into()),
            }
        }

        if categories_inserted > 0 {
            info!("Seeded {} sample categories", categories_inserted);
        }
    }

    if users_inserted > 0 {
        info!("Seeded {} bootstrap users", users_inserted);
    }

    Ok(())
}

async fn insert_user(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<u32> {
    let password_hash = hash::hash_password(password)
        .map_err(|e| anyhow::anyhow!("password hash error for '{username}': {e}"))?;

    let model = user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_lowercase()),
        password: Set(password_hash),
        role: Set(role.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = user::Entity::insert(model)
        .on_conflict(
            OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => Ok(1),
        Err(DbErr::RecordNotInserted) => Ok(0),
        Err(e) => Err(e.into()),
    }
}
