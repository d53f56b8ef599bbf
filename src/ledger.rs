//! Tenancy lifecycle and the payment-structure invariant.
//!
//! A tenancy carries exactly one of two payment structures: a one-time
//! lease sum or a recurring rent. The matching amount column must be
//! set and the other null. This is checked here before any write, and
//! again by the CHECK constraint on the tenancies table, so a writer
//! that bypasses this module still cannot persist an inconsistent row.

use crate::entities;
use crate::entities::account::Role;
use crate::entities::payment::{PaymentStatus, PaymentType};
use crate::entities::tenancy::{PaymentStructure, TenancyStatus};
use crate::entities::unit::UnitStatus;
use crate::errors::PortalError;
use crate::identity::{self, Caller};
use crate::notify::{self, Notifier};
use crate::settings::Notifications;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTenancy {
    pub unit_id: i32,
    /// Email of a registered tenant account; optional for offline
    /// tenants.
    pub tenant_email: Option<String>,
    /// Required when no registered account matches the email.
    pub tenant_name: Option<String>,
    pub tenant_phone: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub payment_structure: PaymentStructure,
    pub rent_amount: Option<f64>,
    pub lease_amount: Option<f64>,
    pub advance_amount: Option<f64>,
    pub agreement_url: Option<String>,
}

fn validate_structure(
    structure: PaymentStructure,
    rent_amount: Option<f64>,
    lease_amount: Option<f64>,
) -> Result<(), PortalError> {
    match structure {
        PaymentStructure::Lease => {
            if lease_amount.is_none() {
                return Err(PortalError::Validation(
                    "LEASE structure requires lease_amount".to_string(),
                ));
            }
            if rent_amount.is_some() {
                return Err(PortalError::Validation(
                    "LEASE structure must not carry rent_amount".to_string(),
                ));
            }
        }
        PaymentStructure::Rent => {
            if rent_amount.is_none() {
                return Err(PortalError::Validation(
                    "RENT structure requires rent_amount".to_string(),
                ));
            }
            if lease_amount.is_some() {
                return Err(PortalError::Validation(
                    "RENT structure must not carry lease_amount".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Create a tenancy on a unit.
///
/// Resolves the tenant (registered account by email, or an offline
/// tenant stored inline), validates the payment structure, then in one
/// transaction: inserts the ACTIVE tenancy, marks the unit OCCUPIED,
/// and for LEASE structures records the one up-front LEASE payment
/// dated today with status PAID. The invitation email goes out only
/// after the transaction commits and can never fail the creation.
pub async fn create_tenancy(
    db: &DatabaseConnection,
    notifier: &Arc<dyn Notifier>,
    notify_cfg: &Notifications,
    caller: &Caller,
    input: NewTenancy,
) -> Result<entities::tenancy::Model, PortalError> {
    if !caller.role.satisfies(Role::Owner) {
        return Err(PortalError::Forbidden("only owners can create tenancies"));
    }

    let unit = entities::Unit::find_by_id(input.unit_id)
        .one(db)
        .await?
        .ok_or(PortalError::NotFound("Unit"))?;

    // Resolve tenant: link a registered account by email, otherwise
    // keep the contact details inline as an offline tenant.
    let mut tenant_id = None;
    if let Some(email) = &input.tenant_email {
        if let Some(account) = identity::account_by_email(db, email).await? {
            tenant_id = Some(account.id);
        }
    }
    if tenant_id.is_none() && input.tenant_name.is_none() {
        return Err(PortalError::Validation(
            "must provide tenant email (registered) or tenant name (offline)".to_string(),
        ));
    }

    validate_structure(
        input.payment_structure,
        input.rent_amount,
        input.lease_amount,
    )?;

    let txn = db.begin().await?;

    let tenancy = entities::tenancy::ActiveModel {
        unit_id: Set(input.unit_id),
        tenant_id: Set(tenant_id),
        tenant_name: Set(input.tenant_name.clone()),
        tenant_email: Set(input.tenant_email.clone()),
        tenant_phone: Set(input.tenant_phone.clone()),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        status: Set(TenancyStatus::Active),
        vacation_notice_date: Set(None),
        payment_structure: Set(input.payment_structure),
        rent_amount: Set(input.rent_amount),
        lease_amount: Set(input.lease_amount),
        advance_amount: Set(input.advance_amount),
        agreement_url: Set(input.agreement_url.clone()),
        ..Default::default()
    };
    let tenancy = tenancy.insert(&txn).await.map_err(PortalError::from_db)?;

    // Occupancy is a stored field, written here and nowhere else.
    let mut unit_active: entities::unit::ActiveModel = unit.clone().into();
    unit_active.status = Set(UnitStatus::Occupied);
    unit_active.update(&txn).await?;

    // A LEASE tenancy settles its lump sum immediately. The amount is
    // present here because the structure was validated above.
    if let (PaymentStructure::Lease, Some(lease_amount)) =
        (input.payment_structure, input.lease_amount)
    {
        let payment = entities::payment::ActiveModel {
            tenancy_id: Set(Some(tenancy.id)),
            unit_id: Set(None),
            amount: Set(lease_amount),
            payment_type: Set(PaymentType::Lease),
            payment_date: Set(Utc::now().date_naive()),
            status: Set(PaymentStatus::Paid),
            ..Default::default()
        };
        payment.insert(&txn).await.map_err(PortalError::from_db)?;
    }

    txn.commit().await?;

    // Post-commit, fire-and-forget.
    if let Some(email) = &input.tenant_email {
        let property = entities::Property::find_by_id(unit.property_id).one(db).await?;
        let property_name = property.map(|p| p.name).unwrap_or_default();
        let tenant_name = input.tenant_name.clone().unwrap_or_else(|| email.clone());
        let (subject, html) = notify::invite_email(
            notify_cfg,
            email,
            &tenant_name,
            &property_name,
            &unit.unit_number,
        );
        notify::dispatch(Arc::clone(notifier), email.clone(), subject, html);
    }

    Ok(tenancy)
}

/// Record a vacation notice: ACTIVE → NOTICE plus the notice date.
///
/// Deliberately does not touch the unit's stored status and never
/// transitions to HISTORIC on its own; both are operator-driven.
pub async fn record_vacation_notice(
    db: &DatabaseConnection,
    caller: &Caller,
    tenancy_id: i32,
    notice_date: NaiveDate,
) -> Result<entities::tenancy::Model, PortalError> {
    let tenancy = entities::Tenancy::find_by_id(tenancy_id)
        .one(db)
        .await?
        .ok_or(PortalError::NotFound("Tenancy"))?;

    // The linked tenant, an owner, or an admin may give notice.
    let is_linked_tenant = tenancy.tenant_id == Some(caller.account_id);
    if !is_linked_tenant && !caller.role.satisfies(Role::Owner) {
        return Err(PortalError::Forbidden("not a party to this tenancy"));
    }

    let mut active: entities::tenancy::ActiveModel = tenancy.into();
    active.status = Set(TenancyStatus::Notice);
    active.vacation_notice_date = Set(Some(notice_date));

    Ok(active.update(db).await.map_err(PortalError::from_db)?)
}

/// The most recently started ACTIVE or NOTICE tenancy for an account.
pub async fn active_tenancy_for_tenant(
    db: &DatabaseConnection,
    account_id: i32,
) -> Result<entities::tenancy::Model, PortalError> {
    use entities::tenancy::{Column, Entity};

    Entity::find()
        .filter(Column::TenantId.eq(account_id))
        .filter(Column::Status.is_in([TenancyStatus::Active, TenancyStatus::Notice]))
        .order_by_desc(Column::StartDate)
        .one(db)
        .await?
        .ok_or(PortalError::NotFound("Active lease"))
}
