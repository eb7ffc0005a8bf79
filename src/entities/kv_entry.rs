//! Key-value entity - Profile-scoped JSON documents.
//!
//! Every ledger (helpers, attendance, milk, payments) is stored as one JSON
//! document per household profile. The pair (`profile`, `key`) identifies a row;
//! the store keeps it unique by updating in place.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Key-value database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kv_entries")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Household profile the value belongs to (e.g., `"default"`)
    pub profile: String,
    /// Logical key (e.g., `"helpers"`, `"payments"`)
    pub key: String,
    /// JSON-encoded value
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When this value was last written
    pub updated_at: DateTime,
}

/// `KvEntry` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
