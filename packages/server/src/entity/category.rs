use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Duplicate checks are case-insensitive; the stored casing is whatever
    /// the creator supplied.
    #[sea_orm(unique)]
    pub name: String,
    pub description: String,

    #[sea_orm(has_many)]
    pub competitions: HasMany<super::competition::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
