//! Read-only cross-entity rollups: occupancy, financials, alerts.

use crate::entities;
use crate::entities::account::Role;
use crate::entities::payment::PaymentType;
use crate::entities::tenancy::TenancyStatus;
use crate::entities::unit::UnitStatus;
use crate::errors::PortalError;
use crate::identity::Caller;
use crate::registry::owns_or_admin;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct OccupancyStats {
    pub total_units: i64,
    pub occupied: i64,
    pub vacant: i64,
    pub under_maintenance: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyRevenue {
    /// Abbreviated month name, e.g. "Jan".
    pub month: String,
    pub year: i32,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialStats {
    pub current_month_projected_rent: f64,
    /// Placeholder: nothing computes this yet. Kept in the shape so
    /// downstream consumers are unaffected when it lands.
    pub pending_rent: f64,
    pub total_revenue_6_months: f64,
    pub monthly_breakdown: Vec<MonthlyRevenue>,
    pub maintenance_spend_6_months: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertItem {
    #[serde(rename = "type")]
    pub alert_type: String,
    pub message: String,
    pub severity: String,
    pub unit_number: Option<String>,
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyAnalytics {
    pub occupancy: OccupancyStats,
    pub financials: FinancialStats,
    pub alerts: Vec<AlertItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerStats {
    pub total_properties: i64,
    pub active_tenants: i64,
    pub monthly_revenue: f64,
    pub occupancy_rate: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub users: i64,
    pub properties: i64,
    pub active_tenancies: i64,
}

/// The six trailing calendar months ending with the current one,
/// oldest first, as (year, month) pairs. True month boundaries, not
/// 30-day slices.
pub fn trailing_months(today: NaiveDate) -> Vec<(i32, u32)> {
    let mut months = Vec::with_capacity(6);
    for i in (0..6).rev() {
        let mut year = today.year();
        let mut month = today.month() as i32 - i;
        while month <= 0 {
            month += 12;
            year -= 1;
        }
        months.push((year, month as u32));
    }
    months
}

fn month_abbr(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b").to_string())
        .unwrap_or_default()
}

/// Per-property dashboard rollup for the owner (or an admin).
pub async fn property_analytics(
    db: &DatabaseConnection,
    caller: &Caller,
    property_id: i32,
) -> Result<PropertyAnalytics, PortalError> {
    let property = entities::Property::find_by_id(property_id)
        .one(db)
        .await?
        .ok_or(PortalError::NotFound("Property"))?;

    if !owns_or_admin(caller, &property) {
        return Err(PortalError::Forbidden("not the property owner"));
    }

    let today = Utc::now().date_naive();
    let window_start = today - Duration::days(180);

    // Occupancy: group-count of the property's units by stored status.
    let units = entities::Unit::find()
        .filter(entities::unit::Column::PropertyId.eq(property_id))
        .all(db)
        .await?;
    let occupancy = OccupancyStats {
        total_units: units.len() as i64,
        occupied: units
            .iter()
            .filter(|u| u.status == UnitStatus::Occupied)
            .count() as i64,
        vacant: units
            .iter()
            .filter(|u| u.status == UnitStatus::Vacant)
            .count() as i64,
        under_maintenance: units
            .iter()
            .filter(|u| u.status == UnitStatus::UnderMaintenance)
            .count() as i64,
    };

    let unit_ids: Vec<i32> = units.iter().map(|u| u.id).collect();
    let unit_numbers: HashMap<i32, String> = units
        .iter()
        .map(|u| (u.id, u.unit_number.clone()))
        .collect();

    let tenancies = entities::Tenancy::find()
        .filter(entities::tenancy::Column::UnitId.is_in(unit_ids.clone()))
        .all(db)
        .await?;
    let tenancy_ids: Vec<i32> = tenancies.iter().map(|t| t.id).collect();

    // Projected recurring rent over ACTIVE tenancies. LEASE-structure
    // tenancies have no rent_amount and contribute nothing here.
    let current_month_projected_rent: f64 = tenancies
        .iter()
        .filter(|t| t.status == TenancyStatus::Active)
        .filter_map(|t| t.rent_amount)
        .sum();

    // RENT revenue in the trailing 180 days, bucketed by calendar
    // month. Payments reach the property through their tenancy.
    let rent_payments = entities::Payment::find()
        .filter(entities::payment::Column::TenancyId.is_in(tenancy_ids.clone()))
        .filter(entities::payment::Column::PaymentType.eq(PaymentType::Rent))
        .filter(entities::payment::Column::PaymentDate.gte(window_start))
        .all(db)
        .await?;

    let mut monthly_map: HashMap<(i32, u32), f64> = HashMap::new();
    for payment in &rent_payments {
        let key = (payment.payment_date.year(), payment.payment_date.month());
        *monthly_map.entry(key).or_insert(0.0) += payment.amount;
    }

    let mut monthly_breakdown = Vec::with_capacity(6);
    let mut total_revenue_6_months = 0.0;
    for (year, month) in trailing_months(today) {
        let amount = monthly_map.get(&(year, month)).copied().unwrap_or(0.0);
        total_revenue_6_months += amount;
        monthly_breakdown.push(MonthlyRevenue {
            month: month_abbr(year, month),
            year,
            amount,
        });
    }

    // Everything that is not RENT counts as spend for this metric,
    // whether it reached the property through a tenancy or a direct
    // unit link.
    let maintenance_spend_6_months: f64 = entities::Payment::find()
        .filter(
            Condition::any()
                .add(entities::payment::Column::TenancyId.is_in(tenancy_ids))
                .add(entities::payment::Column::UnitId.is_in(unit_ids)),
        )
        .filter(entities::payment::Column::PaymentType.ne(PaymentType::Rent))
        .filter(entities::payment::Column::PaymentDate.gte(window_start))
        .all(db)
        .await?
        .iter()
        .map(|p| p.amount)
        .sum();

    // Alerts: ACTIVE tenancies ending within 90 days, plus a single
    // aggregate alert when any unit sits vacant.
    let expiry_threshold = today + Duration::days(90);
    let mut alerts = Vec::new();
    for tenancy in &tenancies {
        if tenancy.status != TenancyStatus::Active {
            continue;
        }
        let Some(end_date) = tenancy.end_date else {
            continue;
        };
        if end_date < today || end_date > expiry_threshold {
            continue;
        }
        let days_left = (end_date - today).num_days();
        alerts.push(AlertItem {
            alert_type: "EXPIRING_LEASE".to_string(),
            message: format!("Lease ends in {} days", days_left),
            severity: if days_left < 30 { "HIGH" } else { "MEDIUM" }.to_string(),
            unit_number: unit_numbers.get(&tenancy.unit_id).cloned(),
            target_date: Some(end_date),
        });
    }
    if occupancy.vacant > 0 {
        alerts.push(AlertItem {
            alert_type: "VACANT_UNIT".to_string(),
            message: format!("{} units are currently vacant", occupancy.vacant),
            severity: "HIGH".to_string(),
            unit_number: None,
            target_date: None,
        });
    }

    Ok(PropertyAnalytics {
        occupancy,
        financials: FinancialStats {
            current_month_projected_rent,
            pending_rent: 0.0,
            total_revenue_6_months,
            monthly_breakdown,
            maintenance_spend_6_months,
        },
        alerts,
    })
}

/// Portfolio-level stats for an owner's dashboard.
pub async fn owner_stats(
    db: &DatabaseConnection,
    caller: &Caller,
) -> Result<OwnerStats, PortalError> {
    if !caller.role.satisfies(Role::Owner) {
        return Err(PortalError::Forbidden("owner role required"));
    }

    let properties = entities::Property::find()
        .filter(entities::property::Column::OwnerId.eq(caller.account_id))
        .all(db)
        .await?;
    let property_ids: Vec<i32> = properties.iter().map(|p| p.id).collect();

    let units = entities::Unit::find()
        .filter(entities::unit::Column::PropertyId.is_in(property_ids))
        .all(db)
        .await?;
    let unit_ids: Vec<i32> = units.iter().map(|u| u.id).collect();

    let tenancies = entities::Tenancy::find()
        .filter(entities::tenancy::Column::UnitId.is_in(unit_ids))
        .all(db)
        .await?;
    let active_tenants = tenancies
        .iter()
        .filter(|t| t.status == TenancyStatus::Active)
        .count() as i64;
    let tenancy_ids: Vec<i32> = tenancies.iter().map(|t| t.id).collect();

    let thirty_days_ago = Utc::now().date_naive() - Duration::days(30);
    let monthly_revenue: f64 = entities::Payment::find()
        .filter(entities::payment::Column::TenancyId.is_in(tenancy_ids))
        .filter(entities::payment::Column::PaymentType.eq(PaymentType::Rent))
        .filter(entities::payment::Column::PaymentDate.gte(thirty_days_ago))
        .all(db)
        .await?
        .iter()
        .map(|p| p.amount)
        .sum();

    // Occupancy rate trusts the stored unit status.
    let total_units = units.len() as i64;
    let occupancy_rate = if total_units > 0 {
        let occupied = units
            .iter()
            .filter(|u| u.status == UnitStatus::Occupied)
            .count() as i64;
        ((occupied * 100) / total_units) as i32
    } else {
        0
    };

    Ok(OwnerStats {
        total_properties: properties.len() as i64,
        active_tenants,
        monthly_revenue,
        occupancy_rate,
    })
}

/// Platform-wide counts, admin only.
pub async fn admin_stats(
    db: &DatabaseConnection,
    caller: &Caller,
) -> Result<AdminStats, PortalError> {
    if !caller.role.satisfies(Role::Admin) {
        return Err(PortalError::Forbidden("admin role required"));
    }

    let users = entities::Account::find().count(db).await? as i64;
    let properties = entities::Property::find().count(db).await? as i64;
    let active_tenancies = entities::Tenancy::find()
        .filter(entities::tenancy::Column::Status.eq(TenancyStatus::Active))
        .count(db)
        .await? as i64;

    Ok(AdminStats {
        users,
        properties,
        active_tenancies,
    })
}
