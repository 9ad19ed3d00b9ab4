use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A single stored entry file.
/// Stored as JSON array in the database.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionFile {
    /// Opaque storage key (see `common::storage::FileKey`).
    pub key: String,
    /// Original filename as uploaded (e.g., "sunset.png").
    pub filename: String,
    /// Size in bytes at upload time.
    pub size: u64,
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub competition_id: i32,
    #[sea_orm(belongs_to, from = "competition_id", to = "id")]
    pub competition: HasOne<super::competition::Entity>,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    /// Username snapshot taken at submission time; deliberately not updated
    /// when the account is later renamed.
    pub username: String,

    pub entry_title: String,
    pub description: String,

    /// Entry files stored as JSON array of {key, filename, size} objects.
    #[sea_orm(column_type = "JsonBinary")]
    pub files: serde_json::Value,

    /// Always equals the number of vote rows for this submission.
    pub vote_count: i32,

    #[sea_orm(has_many)]
    pub votes: HasMany<super::vote::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
