mod helpers;

use chrono::{NaiveDate, Utc};
use helpers::{AccountBuilder, PropertyBuilder, TenancyBuilder, TestDb, UnitBuilder};
use quarters::entities;
use quarters::entities::account::Role;
use quarters::entities::payment::{PaymentStatus, PaymentType};
use quarters::entities::tenancy::TenancyStatus;
use quarters::entities::unit::UnitStatus;
use quarters::errors::PortalError;
use quarters::identity::Caller;
use quarters::ledger;
use quarters::payments::{self, PaymentLink};
use quarters::registry;
use sea_orm::EntityTrait;

#[tokio::test]
async fn test_tenancy_lifecycle_end_to_end() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();

    let owner = AccountBuilder::new("owner-1")
        .with_role(Role::Owner)
        .create_caller(db)
        .await;
    let tenant = AccountBuilder::new("tenant-1")
        .with_email("tenant-1@example.com")
        .create(db)
        .await;
    let tenant_caller = Caller::from_account(&tenant);

    let property = PropertyBuilder::new("Hillview").create(db, &owner).await;
    let unit = UnitBuilder::new("A-1").create(db, &owner, property.id).await;

    let tenancy = TenancyBuilder::new(unit.id)
        .with_tenant_email("tenant-1@example.com")
        .with_rent(950.0)
        .create(db, &owner)
        .await;

    // The registered account is linked and the unit marked occupied.
    assert_eq!(tenancy.tenant_id, Some(tenant.id));
    assert_eq!(tenancy.status, TenancyStatus::Active);
    let unit = entities::Unit::find_by_id(unit.id)
        .one(db)
        .await
        .expect("Query failed")
        .expect("Unit not found");
    assert_eq!(unit.status, UnitStatus::Occupied);

    // The tenant's portal view resolves to this tenancy.
    let current = ledger::active_tenancy_for_tenant(db, tenant.id)
        .await
        .expect("Should find current tenancy");
    assert_eq!(current.id, tenancy.id);

    // The tenant gives notice; the tenancy stays their current one.
    let notice_date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    let updated = ledger::record_vacation_notice(db, &tenant_caller, tenancy.id, notice_date)
        .await
        .expect("Failed to record notice");
    assert_eq!(updated.status, TenancyStatus::Notice);
    assert_eq!(updated.vacation_notice_date, Some(notice_date));

    let current = ledger::active_tenancy_for_tenant(db, tenant.id)
        .await
        .expect("Should still find current tenancy");
    assert_eq!(current.status, TenancyStatus::Notice);
}

#[tokio::test]
async fn test_lease_tenancy_payment_shows_in_unit_overview() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();

    let owner = AccountBuilder::new("owner-1")
        .with_role(Role::Owner)
        .create_caller(db)
        .await;
    let property = PropertyBuilder::new("Hillview").create(db, &owner).await;
    let unit = UnitBuilder::new("A-1").create(db, &owner, property.id).await;

    let tenancy = TenancyBuilder::new(unit.id)
        .with_lease(24000.0)
        .create(db, &owner)
        .await;

    let overview = registry::get_unit_overview(db, &owner, unit.id)
        .await
        .expect("Failed to load overview");

    assert_eq!(overview.current_tenancy.as_ref().map(|t| t.id), Some(tenancy.id));
    assert_eq!(overview.tenancies.len(), 1);
    assert_eq!(overview.payments.len(), 1);
    assert_eq!(overview.payments[0].amount, 24000.0);
    assert_eq!(overview.payments[0].payment_type, PaymentType::Lease);
    assert_eq!(overview.payments[0].status, PaymentStatus::Paid);
}

#[tokio::test]
async fn test_payment_listing_is_role_scoped() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();

    let owner_a = AccountBuilder::new("owner-a")
        .with_role(Role::Owner)
        .create_caller(db)
        .await;
    let owner_b = AccountBuilder::new("owner-b")
        .with_role(Role::Owner)
        .create_caller(db)
        .await;
    let admin = AccountBuilder::new("admin-1")
        .with_role(Role::Admin)
        .create_caller(db)
        .await;
    let tenant = AccountBuilder::new("tenant-1")
        .with_email("tenant-1@example.com")
        .create(db)
        .await;
    let tenant_caller = Caller::from_account(&tenant);

    let property_a = PropertyBuilder::new("North").create(db, &owner_a).await;
    let unit_a = UnitBuilder::new("N-1").create(db, &owner_a, property_a.id).await;
    let tenancy_a = TenancyBuilder::new(unit_a.id)
        .with_tenant_email("tenant-1@example.com")
        .create(db, &owner_a)
        .await;

    let property_b = PropertyBuilder::new("South").create(db, &owner_b).await;
    let unit_b = UnitBuilder::new("S-1").create(db, &owner_b, property_b.id).await;
    let tenancy_b = TenancyBuilder::new(unit_b.id).create(db, &owner_b).await;

    let today = Utc::now().date_naive();
    payments::record_payment(
        db,
        &owner_a,
        PaymentLink::Tenancy {
            tenancy_id: tenancy_a.id,
        },
        900.0,
        PaymentType::Rent,
        today,
    )
    .await
    .expect("Failed to record payment");
    payments::record_payment(
        db,
        &owner_b,
        PaymentLink::Tenancy {
            tenancy_id: tenancy_b.id,
        },
        700.0,
        PaymentType::Rent,
        today,
    )
    .await
    .expect("Failed to record payment");

    // Each owner only sees payments reachable through their own
    // properties.
    let for_a = payments::list_payments(db, &owner_a).await.expect("Query failed");
    assert_eq!(for_a.len(), 1);
    assert_eq!(for_a[0].amount, 900.0);

    let for_b = payments::list_payments(db, &owner_b).await.expect("Query failed");
    assert_eq!(for_b.len(), 1);
    assert_eq!(for_b[0].amount, 700.0);

    let for_admin = payments::list_payments(db, &admin).await.expect("Query failed");
    assert_eq!(for_admin.len(), 2);

    let for_tenant = payments::list_payments(db, &tenant_caller)
        .await
        .expect("Query failed");
    assert_eq!(for_tenant.len(), 1);
    assert_eq!(for_tenant[0].tenancy_id, Some(tenancy_a.id));
}

#[tokio::test]
async fn test_tenant_cannot_record_payments() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();

    let owner = AccountBuilder::new("owner-1")
        .with_role(Role::Owner)
        .create_caller(db)
        .await;
    let tenant = AccountBuilder::new("tenant-1")
        .with_email("tenant-1@example.com")
        .create_caller(db)
        .await;

    let property = PropertyBuilder::new("Hillview").create(db, &owner).await;
    let unit = UnitBuilder::new("A-1").create(db, &owner, property.id).await;
    let tenancy = TenancyBuilder::new(unit.id)
        .with_tenant_email("tenant-1@example.com")
        .create(db, &owner)
        .await;

    let err = payments::record_payment(
        db,
        &tenant,
        PaymentLink::Tenancy {
            tenancy_id: tenancy.id,
        },
        900.0,
        PaymentType::Rent,
        Utc::now().date_naive(),
    )
    .await
    .expect_err("Should reject");
    assert!(matches!(err, PortalError::Forbidden(_)));
}

#[tokio::test]
async fn test_property_access_is_owner_scoped() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();

    let owner_a = AccountBuilder::new("owner-a")
        .with_role(Role::Owner)
        .create_caller(db)
        .await;
    let owner_b = AccountBuilder::new("owner-b")
        .with_role(Role::Owner)
        .create_caller(db)
        .await;
    let admin = AccountBuilder::new("admin-1")
        .with_role(Role::Admin)
        .create_caller(db)
        .await;

    let property = PropertyBuilder::new("North").create(db, &owner_a).await;
    PropertyBuilder::new("South").create(db, &owner_b).await;

    assert_eq!(registry::list_properties(db, &owner_a).await.expect("Query failed").len(), 1);
    assert_eq!(registry::list_properties(db, &admin).await.expect("Query failed").len(), 2);

    let err = registry::get_property(db, &owner_b, property.id)
        .await
        .expect_err("Should reject");
    assert!(matches!(err, PortalError::Forbidden(_)));

    // Admin can read any property.
    let view = registry::get_property(db, &admin, property.id)
        .await
        .expect("Admin should read");
    assert_eq!(view.property.name, "North");
}
