use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A JSON document row, keyed by collection and id
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Collection the document belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub collection: String,

    /// Document id (UUID, hyphenated)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Serialized document
    pub body: Json,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
