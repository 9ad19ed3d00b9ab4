use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category_suggestion")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub category_name: String,
    pub reason: Option<String>,

    pub submitted_by: i32,
    #[sea_orm(belongs_to, from = "submitted_by", to = "id")]
    pub submitter: HasOne<super::user::Entity>,

    /// One of: pending_review, approved, rejected. Terminal once reviewed.
    pub status: String,

    pub created_at: DateTimeUtc,
    pub reviewed_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
