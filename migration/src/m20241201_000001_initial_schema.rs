use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Enable foreign keys for SQLite
        if manager.get_database_backend() == sea_orm::DatabaseBackend::Sqlite {
            manager
                .get_connection()
                .execute_unprepared("PRAGMA foreign_keys = ON")
                .await?;
        }

        // Create accounts table
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(pk_auto(Accounts::Id))
                    .col(
                        ColumnDef::new(Accounts::Subject)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(string(Accounts::Role))
                    .col(string_null(Accounts::Name))
                    .col(json_null(Accounts::Documents))
                    .col(big_integer(Accounts::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create properties table
        manager
            .create_table(
                Table::create()
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(pk_auto(Properties::Id))
                    .col(integer(Properties::OwnerId))
                    .col(string(Properties::Name))
                    .col(text(Properties::Address))
                    .col(text_null(Properties::Description))
                    .col(string_null(Properties::PropertyType))
                    .col(integer_null(Properties::UnitsCount))
                    .col(double_null(Properties::LocationLat))
                    .col(double_null(Properties::LocationLng))
                    .col(json_null(Properties::Amenities))
                    .col(json_null(Properties::Highlights))
                    .col(json_null(Properties::HouseRules))
                    .col(json_null(Properties::NearbyPlaces))
                    .col(json_null(Properties::Images))
                    .col(json_null(Properties::Documents))
                    .col(big_integer(Properties::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create units table
        manager
            .create_table(
                Table::create()
                    .table(Units::Table)
                    .if_not_exists()
                    .col(pk_auto(Units::Id))
                    .col(integer(Units::PropertyId))
                    .col(string(Units::UnitNumber))
                    .col(json_null(Units::Specifications))
                    .col(double_null(Units::SizeSqft))
                    .col(string_null(Units::Facing))
                    .col(date_null(Units::ConstructionDate))
                    .col(json_null(Units::Images))
                    .col(json_null(Units::Documents))
                    .col(
                        ColumnDef::new(Units::Status)
                            .string()
                            .not_null()
                            .default("VACANT"),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index on units.property_id
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_units_property")
                    .table(Units::Table)
                    .col(Units::PropertyId)
                    .to_owned(),
            )
            .await?;

        // Create tenancies table. The CHECK constraint is the standing
        // defense against payment-structure rows that bypass the
        // validation layer.
        manager
            .create_table(
                Table::create()
                    .table(Tenancies::Table)
                    .if_not_exists()
                    .col(pk_auto(Tenancies::Id))
                    .col(integer(Tenancies::UnitId))
                    .col(integer_null(Tenancies::TenantId))
                    .col(string_null(Tenancies::TenantName))
                    .col(string_null(Tenancies::TenantEmail))
                    .col(string_null(Tenancies::TenantPhone))
                    .col(date(Tenancies::StartDate))
                    .col(date_null(Tenancies::EndDate))
                    .col(
                        ColumnDef::new(Tenancies::Status)
                            .string()
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(date_null(Tenancies::VacationNoticeDate))
                    .col(
                        ColumnDef::new(Tenancies::PaymentStructure)
                            .string()
                            .not_null()
                            .check(Expr::cust(
                                "(payment_structure = 'LEASE' AND lease_amount IS NOT NULL \
                                 AND rent_amount IS NULL) OR \
                                 (payment_structure = 'RENT' AND rent_amount IS NOT NULL \
                                 AND lease_amount IS NULL)",
                            )),
                    )
                    .col(double_null(Tenancies::RentAmount))
                    .col(double_null(Tenancies::LeaseAmount))
                    .col(double_null(Tenancies::AdvanceAmount))
                    .col(string_null(Tenancies::AgreementUrl))
                    .to_owned(),
            )
            .await?;

        // Create index on tenancies.unit_id
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tenancies_unit")
                    .table(Tenancies::Table)
                    .col(Tenancies::UnitId)
                    .to_owned(),
            )
            .await?;

        // Create payments table
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(pk_auto(Payments::Id))
                    .col(integer_null(Payments::TenancyId))
                    .col(integer_null(Payments::UnitId))
                    .col(double(Payments::Amount))
                    .col(string(Payments::PaymentType))
                    .col(date(Payments::PaymentDate))
                    .col(
                        ColumnDef::new(Payments::Status)
                            .string()
                            .not_null()
                            .default("PAID"),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index on payments.payment_date
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payments_date")
                    .table(Payments::Table)
                    .col(Payments::PaymentDate)
                    .to_owned(),
            )
            .await?;

        // Create maintenance_requests table
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceRequests::Table)
                    .if_not_exists()
                    .col(pk_auto(MaintenanceRequests::Id))
                    .col(integer(MaintenanceRequests::UnitId))
                    .col(integer_null(MaintenanceRequests::TenantId))
                    .col(integer(MaintenanceRequests::ReportedById))
                    .col(string(MaintenanceRequests::Title))
                    .col(text(MaintenanceRequests::Description))
                    .col(json_null(MaintenanceRequests::Images))
                    .col(
                        ColumnDef::new(MaintenanceRequests::Status)
                            .string()
                            .not_null()
                            .default("OPEN"),
                    )
                    .col(big_integer(MaintenanceRequests::CreatedAt))
                    .col(big_integer_null(MaintenanceRequests::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MaintenanceRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tenancies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Units::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Subject,
    Email,
    Role,
    Name,
    Documents,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Properties {
    Table,
    Id,
    OwnerId,
    Name,
    Address,
    Description,
    PropertyType,
    UnitsCount,
    LocationLat,
    LocationLng,
    Amenities,
    Highlights,
    HouseRules,
    NearbyPlaces,
    Images,
    Documents,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Units {
    Table,
    Id,
    PropertyId,
    UnitNumber,
    Specifications,
    SizeSqft,
    Facing,
    ConstructionDate,
    Images,
    Documents,
    Status,
}

#[derive(DeriveIden)]
enum Tenancies {
    Table,
    Id,
    UnitId,
    TenantId,
    TenantName,
    TenantEmail,
    TenantPhone,
    StartDate,
    EndDate,
    Status,
    VacationNoticeDate,
    PaymentStructure,
    RentAmount,
    LeaseAmount,
    AdvanceAmount,
    AgreementUrl,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    TenancyId,
    UnitId,
    Amount,
    PaymentType,
    PaymentDate,
    Status,
}

#[derive(DeriveIden)]
enum MaintenanceRequests {
    Table,
    Id,
    UnitId,
    TenantId,
    ReportedById,
    Title,
    Description,
    Images,
    Status,
    CreatedAt,
    UpdatedAt,
}
