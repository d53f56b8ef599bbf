use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Closed role enumeration. Roles are immutable after registration and
/// authorization is always a capability check, never string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "OWNER")]
    Owner,
    #[sea_orm(string_value = "TENANT")]
    Tenant,
}

impl Role {
    /// Capability check: does this role satisfy `required`?
    /// Admin satisfies every requirement.
    pub fn satisfies(self, required: Role) -> bool {
        self == Role::Admin || self == required
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Stable identifier issued by the external identity provider.
    pub subject: String,
    pub email: String,
    pub role: Role,
    pub name: Option<String>,
    /// Attached documents, e.g. [{"type": "ID", "url": "..."}]
    pub documents: Option<Json>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
