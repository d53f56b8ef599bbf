use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenancyStatus {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "NOTICE")]
    Notice,
    #[sea_orm(string_value = "HISTORIC")]
    Historic,
}

/// A tenancy has exactly one of two payment structures: a one-time
/// lease sum or a recurring periodic rent. The matching amount column
/// must be set and the other must be null; the tenancies table carries
/// a CHECK constraint to the same effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStructure {
    #[sea_orm(string_value = "LEASE")]
    Lease,
    #[sea_orm(string_value = "RENT")]
    Rent,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tenancies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub unit_id: i32,
    /// Null for offline tenants; their contact details are stored
    /// inline in the tenant_* columns instead.
    pub tenant_id: Option<i32>,
    pub tenant_name: Option<String>,
    pub tenant_email: Option<String>,
    pub tenant_phone: Option<String>,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub status: TenancyStatus,
    pub vacation_notice_date: Option<Date>,
    pub payment_structure: PaymentStructure,
    pub rent_amount: Option<f64>,
    pub lease_amount: Option<f64>,
    pub advance_amount: Option<f64>,
    pub agreement_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
