use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub units_count: Option<i32>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub amenities: Option<Json>,
    pub highlights: Option<Json>,
    pub house_rules: Option<Json>,
    pub nearby_places: Option<Json>,
    pub images: Option<Json>,
    pub documents: Option<Json>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
