//! Append-only record of money movements.
//!
//! Payments are immutable once recorded; corrections are made by
//! recording an offsetting payment, by policy.

use crate::entities;
use crate::entities::account::Role;
use crate::entities::payment::{PaymentStatus, PaymentType};
use crate::errors::PortalError;
use crate::identity::Caller;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

/// What a payment is attached to. An unlinked ("orphaned") payment is
/// unrepresentable at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentLink {
    // Both comes first so untagged deserialization prefers it when a
    // payload carries both ids.
    Both { tenancy_id: i32, unit_id: i32 },
    Tenancy { tenancy_id: i32 },
    Unit { unit_id: i32 },
}

impl PaymentLink {
    pub fn tenancy_id(&self) -> Option<i32> {
        match *self {
            PaymentLink::Tenancy { tenancy_id } | PaymentLink::Both { tenancy_id, .. } => {
                Some(tenancy_id)
            }
            PaymentLink::Unit { .. } => None,
        }
    }

    pub fn unit_id(&self) -> Option<i32> {
        match *self {
            PaymentLink::Unit { unit_id } | PaymentLink::Both { unit_id, .. } => Some(unit_id),
            PaymentLink::Tenancy { .. } => None,
        }
    }
}

/// Record a payment against a tenancy and/or a unit. Owner or admin
/// only; persists with status PAID.
pub async fn record_payment(
    db: &DatabaseConnection,
    caller: &Caller,
    link: PaymentLink,
    amount: f64,
    payment_type: PaymentType,
    payment_date: NaiveDate,
) -> Result<entities::payment::Model, PortalError> {
    if !caller.role.satisfies(Role::Owner) {
        return Err(PortalError::Forbidden(
            "not authorized to record payments manually",
        ));
    }

    if let Some(tenancy_id) = link.tenancy_id() {
        entities::Tenancy::find_by_id(tenancy_id)
            .one(db)
            .await?
            .ok_or(PortalError::NotFound("Tenancy"))?;
    }
    if let Some(unit_id) = link.unit_id() {
        entities::Unit::find_by_id(unit_id)
            .one(db)
            .await?
            .ok_or(PortalError::NotFound("Unit"))?;
    }

    let payment = entities::payment::ActiveModel {
        tenancy_id: Set(link.tenancy_id()),
        unit_id: Set(link.unit_id()),
        amount: Set(amount),
        payment_type: Set(payment_type),
        payment_date: Set(payment_date),
        status: Set(PaymentStatus::Paid),
        ..Default::default()
    };

    Ok(payment.insert(db).await.map_err(PortalError::from_db)?)
}

/// Role-scoped payment listing, in stable (insertion) order.
///
/// Admin sees everything. An owner sees payments whose tenancy's
/// unit's property they own. A tenant sees payments on their own
/// tenancies.
pub async fn list_payments(
    db: &DatabaseConnection,
    caller: &Caller,
) -> Result<Vec<entities::payment::Model>, PortalError> {
    use entities::payment::{Column, Entity};

    match caller.role {
        Role::Admin => Ok(Entity::find().order_by_asc(Column::Id).all(db).await?),
        Role::Owner => {
            let tenancy_ids = owned_tenancy_ids(db, caller.account_id).await?;
            Ok(Entity::find()
                .filter(Column::TenancyId.is_in(tenancy_ids))
                .order_by_asc(Column::Id)
                .all(db)
                .await?)
        }
        Role::Tenant => {
            let tenancy_ids: Vec<i32> = entities::Tenancy::find()
                .filter(entities::tenancy::Column::TenantId.eq(caller.account_id))
                .all(db)
                .await?
                .into_iter()
                .map(|t| t.id)
                .collect();
            Ok(Entity::find()
                .filter(Column::TenancyId.is_in(tenancy_ids))
                .order_by_asc(Column::Id)
                .all(db)
                .await?)
        }
    }
}

/// Tenancy ids reachable from an owner: Tenancy → Unit → Property.
async fn owned_tenancy_ids(
    db: &DatabaseConnection,
    owner_id: i32,
) -> Result<Vec<i32>, PortalError> {
    let property_ids: Vec<i32> = entities::Property::find()
        .filter(entities::property::Column::OwnerId.eq(owner_id))
        .all(db)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    let unit_ids: Vec<i32> = entities::Unit::find()
        .filter(entities::unit::Column::PropertyId.is_in(property_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect();

    Ok(entities::Tenancy::find()
        .filter(entities::tenancy::Column::UnitId.is_in(unit_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect())
}
