use chrono::NaiveDate;
use quarters::entities;
use quarters::entities::account::Role;
use quarters::entities::tenancy::PaymentStructure;
use quarters::identity::{self, Caller};
use quarters::ledger::{self, NewTenancy};
use quarters::registry::{self, NewProperty, NewUnit};
use sea_orm::DatabaseConnection;

/// Builder for creating test accounts
pub struct AccountBuilder {
    subject: String,
    email: String,
    role: Role,
    name: Option<String>,
}

impl AccountBuilder {
    pub fn new(subject: &str) -> Self {
        Self {
            subject: subject.to_string(),
            email: format!("{subject}@example.com"),
            role: Role::Tenant,
            name: None,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = email.to_string();
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> entities::account::Model {
        identity::register_account(db, &self.subject, &self.email, self.role, self.name)
            .await
            .expect("Failed to create test account")
    }

    /// Shorthand for the common case of only needing the caller.
    pub async fn create_caller(self, db: &DatabaseConnection) -> Caller {
        Caller::from_account(&self.create(db).await)
    }
}

/// Builder for creating test properties
pub struct PropertyBuilder {
    name: String,
    address: String,
}

impl PropertyBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            address: "1 Test Street".to_string(),
        }
    }

    pub async fn create(self, db: &DatabaseConnection, owner: &Caller) -> entities::property::Model {
        registry::create_property(
            db,
            owner,
            NewProperty {
                name: self.name,
                address: self.address,
                description: None,
                property_type: None,
                units_count: None,
                location_lat: None,
                location_lng: None,
                amenities: vec![],
                highlights: vec![],
                house_rules: vec![],
                nearby_places: vec![],
                images: vec![],
                documents: vec![],
            },
        )
        .await
        .expect("Failed to create test property")
    }
}

/// Builder for creating test units
pub struct UnitBuilder {
    unit_number: String,
}

impl UnitBuilder {
    pub fn new(unit_number: &str) -> Self {
        Self {
            unit_number: unit_number.to_string(),
        }
    }

    pub async fn create(
        self,
        db: &DatabaseConnection,
        owner: &Caller,
        property_id: i32,
    ) -> entities::unit::Model {
        registry::create_unit(
            db,
            owner,
            property_id,
            NewUnit {
                unit_number: self.unit_number,
                specifications: None,
                size_sqft: None,
                facing: None,
                construction_date: None,
            },
        )
        .await
        .expect("Failed to create test unit")
    }
}

/// Builder for creating test tenancies. Defaults to a RENT structure
/// with an offline tenant.
pub struct TenancyBuilder {
    unit_id: i32,
    tenant_email: Option<String>,
    tenant_name: Option<String>,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    payment_structure: PaymentStructure,
    rent_amount: Option<f64>,
    lease_amount: Option<f64>,
}

impl TenancyBuilder {
    pub fn new(unit_id: i32) -> Self {
        Self {
            unit_id,
            tenant_email: None,
            tenant_name: Some("Test Tenant".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
            payment_structure: PaymentStructure::Rent,
            rent_amount: Some(900.0),
            lease_amount: None,
        }
    }

    pub fn with_tenant_email(mut self, email: &str) -> Self {
        self.tenant_email = Some(email.to_string());
        self
    }

    pub fn with_rent(mut self, amount: f64) -> Self {
        self.payment_structure = PaymentStructure::Rent;
        self.rent_amount = Some(amount);
        self.lease_amount = None;
        self
    }

    pub fn with_lease(mut self, amount: f64) -> Self {
        self.payment_structure = PaymentStructure::Lease;
        self.lease_amount = Some(amount);
        self.rent_amount = None;
        self
    }

    pub async fn create(
        self,
        db: &DatabaseConnection,
        owner: &Caller,
    ) -> entities::tenancy::Model {
        ledger::create_tenancy(
            db,
            &super::log_notifier(),
            &super::notify_cfg(),
            owner,
            NewTenancy {
                unit_id: self.unit_id,
                tenant_email: self.tenant_email,
                tenant_name: self.tenant_name,
                tenant_phone: None,
                start_date: self.start_date,
                end_date: self.end_date,
                payment_structure: self.payment_structure,
                rent_amount: self.rent_amount,
                lease_amount: self.lease_amount,
                advance_amount: None,
                agreement_url: None,
            },
        )
        .await
        .expect("Failed to create test tenancy")
    }
}
