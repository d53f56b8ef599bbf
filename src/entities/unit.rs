use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored occupancy status. This is a cached, derived field: it is
/// written to OCCUPIED when a tenancy is created and never reverted
/// automatically (not even on vacation notice). Occupancy reporting
/// trusts this column as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitStatus {
    #[sea_orm(string_value = "VACANT")]
    Vacant,
    #[sea_orm(string_value = "OCCUPIED")]
    Occupied,
    #[sea_orm(string_value = "UNDER_MAINTENANCE")]
    UnderMaintenance,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "units")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub property_id: i32,
    pub unit_number: String,
    /// Physical specs, e.g. {"bhk": 2, "sqft": 1000}
    pub specifications: Option<Json>,
    pub size_sqft: Option<f64>,
    pub facing: Option<String>,
    pub construction_date: Option<Date>,
    pub images: Option<Json>,
    pub documents: Option<Json>,
    pub status: UnitStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
