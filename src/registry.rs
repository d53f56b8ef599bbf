//! Property and unit records, including the stored unit occupancy
//! status that occupancy reporting trusts as-is.

use crate::entities;
use crate::entities::account::Role;
use crate::entities::unit::UnitStatus;
use crate::errors::PortalError;
use crate::identity::Caller;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProperty {
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub property_type: Option<String>,
    #[serde(default)]
    pub units_count: Option<i32>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub house_rules: Vec<String>,
    #[serde(default)]
    pub nearby_places: Vec<Value>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub documents: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUnit {
    pub unit_number: String,
    pub specifications: Option<Value>,
    pub size_sqft: Option<f64>,
    pub facing: Option<String>,
    pub construction_date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyWithUnits {
    #[serde(flatten)]
    pub property: entities::property::Model,
    pub units: Vec<entities::unit::Model>,
}

/// Unit detail view: the unit, its property, the current ACTIVE
/// tenancy (if any), the full tenancy history, and the payment ledger.
#[derive(Debug, Clone, Serialize)]
pub struct UnitOverview {
    pub unit: entities::unit::Model,
    pub property: entities::property::Model,
    pub current_tenancy: Option<entities::tenancy::Model>,
    pub tenancies: Vec<entities::tenancy::Model>,
    pub payments: Vec<entities::payment::Model>,
}

/// Property mutation rule: its owner, or an admin.
pub fn owns_or_admin(caller: &Caller, property: &entities::property::Model) -> bool {
    caller.role == Role::Admin || property.owner_id == caller.account_id
}

pub async fn create_property(
    db: &DatabaseConnection,
    caller: &Caller,
    input: NewProperty,
) -> Result<entities::property::Model, PortalError> {
    if !caller.role.satisfies(Role::Owner) {
        return Err(PortalError::Forbidden("owner role required"));
    }

    let property = entities::property::ActiveModel {
        owner_id: Set(caller.account_id),
        name: Set(input.name),
        address: Set(input.address),
        description: Set(input.description),
        property_type: Set(input.property_type),
        units_count: Set(input.units_count),
        location_lat: Set(input.location_lat),
        location_lng: Set(input.location_lng),
        amenities: Set(Some(Value::from(input.amenities))),
        highlights: Set(Some(Value::from(input.highlights))),
        house_rules: Set(Some(Value::from(input.house_rules))),
        nearby_places: Set(Some(Value::from(input.nearby_places))),
        images: Set(Some(Value::from(input.images))),
        documents: Set(Some(Value::from(input.documents))),
        created_at: Set(Utc::now().timestamp()),
        ..Default::default()
    };

    Ok(property.insert(db).await?)
}

/// Admin sees every property, everyone else their own.
pub async fn list_properties(
    db: &DatabaseConnection,
    caller: &Caller,
) -> Result<Vec<entities::property::Model>, PortalError> {
    use entities::property::{Column, Entity};

    let query = if caller.role == Role::Admin {
        Entity::find()
    } else {
        Entity::find().filter(Column::OwnerId.eq(caller.account_id))
    };

    Ok(query.order_by_asc(Column::Id).all(db).await?)
}

pub async fn get_property(
    db: &DatabaseConnection,
    caller: &Caller,
    property_id: i32,
) -> Result<PropertyWithUnits, PortalError> {
    let property = entities::Property::find_by_id(property_id)
        .one(db)
        .await?
        .ok_or(PortalError::NotFound("Property"))?;

    if !owns_or_admin(caller, &property) {
        return Err(PortalError::Forbidden("not the property owner"));
    }

    let units = entities::Unit::find()
        .filter(entities::unit::Column::PropertyId.eq(property_id))
        .order_by_asc(entities::unit::Column::Id)
        .all(db)
        .await?;

    Ok(PropertyWithUnits { property, units })
}

pub async fn update_property_documents(
    db: &DatabaseConnection,
    caller: &Caller,
    property_id: i32,
    documents: Vec<Value>,
) -> Result<entities::property::Model, PortalError> {
    let property = entities::Property::find_by_id(property_id)
        .one(db)
        .await?
        .ok_or(PortalError::NotFound("Property"))?;

    if !owns_or_admin(caller, &property) {
        return Err(PortalError::Forbidden("not the property owner"));
    }

    let mut active: entities::property::ActiveModel = property.into();
    active.documents = Set(Some(Value::from(documents)));

    Ok(active.update(db).await?)
}

pub async fn create_unit(
    db: &DatabaseConnection,
    caller: &Caller,
    property_id: i32,
    input: NewUnit,
) -> Result<entities::unit::Model, PortalError> {
    let property = entities::Property::find_by_id(property_id)
        .one(db)
        .await?
        .ok_or(PortalError::NotFound("Property"))?;

    if !owns_or_admin(caller, &property) {
        return Err(PortalError::Forbidden("not the property owner"));
    }

    let unit = entities::unit::ActiveModel {
        property_id: Set(property_id),
        unit_number: Set(input.unit_number),
        specifications: Set(input.specifications),
        size_sqft: Set(input.size_sqft),
        facing: Set(input.facing),
        construction_date: Set(input.construction_date),
        images: Set(None),
        documents: Set(None),
        status: Set(UnitStatus::Vacant),
        ..Default::default()
    };

    Ok(unit.insert(db).await?)
}

pub async fn get_unit_overview(
    db: &DatabaseConnection,
    caller: &Caller,
    unit_id: i32,
) -> Result<UnitOverview, PortalError> {
    use entities::tenancy::{Column as TenancyColumn, TenancyStatus};

    let unit = entities::Unit::find_by_id(unit_id)
        .one(db)
        .await?
        .ok_or(PortalError::NotFound("Unit"))?;

    let property = entities::Property::find_by_id(unit.property_id)
        .one(db)
        .await?
        .ok_or(PortalError::NotFound("Property"))?;

    if !owns_or_admin(caller, &property) {
        return Err(PortalError::Forbidden("not the property owner"));
    }

    let tenancies = entities::Tenancy::find()
        .filter(TenancyColumn::UnitId.eq(unit_id))
        .order_by_desc(TenancyColumn::StartDate)
        .all(db)
        .await?;

    let current_tenancy = tenancies
        .iter()
        .find(|t| t.status == TenancyStatus::Active)
        .cloned();

    let tenancy_ids: Vec<i32> = tenancies.iter().map(|t| t.id).collect();
    let payments = entities::Payment::find()
        .filter(
            sea_orm::Condition::any()
                .add(entities::payment::Column::UnitId.eq(unit_id))
                .add(entities::payment::Column::TenancyId.is_in(tenancy_ids)),
        )
        .order_by_asc(entities::payment::Column::Id)
        .all(db)
        .await?;

    Ok(UnitOverview {
        unit,
        property,
        current_tenancy,
        tenancies,
        payments,
    })
}
