//! Maintenance requests and their append-only comment threads.

use crate::entities;
use crate::entities::account::Role;
use crate::entities::maintenance_request::RequestStatus;
use crate::entities::tenancy::TenancyStatus;
use crate::errors::PortalError;
use crate::identity::Caller;
use crate::registry::owns_or_admin;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::Value;

/// Pluggable authorization hook for commenting.
///
/// Whether commenting should require visibility of the parent request
/// (property owner, tenant, or reporter) is an open product decision;
/// until it lands, the default policy keeps the open collaboration
/// model: any authenticated caller may comment.
// TODO: replace OpenCollaboration with a visibility-based policy once
// request visibility rules are decided.
pub trait CommentPolicy: Send + Sync {
    fn may_comment(&self, caller: &Caller, request: &entities::maintenance_request::Model) -> bool;
}

pub struct OpenCollaboration;

impl CommentPolicy for OpenCollaboration {
    fn may_comment(
        &self,
        _caller: &Caller,
        _request: &entities::maintenance_request::Model,
    ) -> bool {
        true
    }
}

/// File a maintenance request against a unit.
///
/// A tenant reporter becomes the request's tenant reference. For an
/// owner or admin reporter, the unit's current ACTIVE tenancy supplies
/// the tenant reference (left null for a vacant unit). The reporter
/// reference is always the actual caller.
pub async fn create_request(
    db: &DatabaseConnection,
    caller: &Caller,
    unit_id: i32,
    title: String,
    description: String,
    images: Option<Value>,
) -> Result<entities::maintenance_request::Model, PortalError> {
    entities::Unit::find_by_id(unit_id)
        .one(db)
        .await?
        .ok_or(PortalError::NotFound("Unit"))?;

    let tenant_id = if caller.role == Role::Tenant {
        Some(caller.account_id)
    } else {
        entities::Tenancy::find()
            .filter(entities::tenancy::Column::UnitId.eq(unit_id))
            .filter(entities::tenancy::Column::Status.eq(TenancyStatus::Active))
            .one(db)
            .await?
            .and_then(|t| t.tenant_id)
    };

    let request = entities::maintenance_request::ActiveModel {
        unit_id: Set(unit_id),
        tenant_id: Set(tenant_id),
        reported_by_id: Set(caller.account_id),
        title: Set(title),
        description: Set(description),
        images: Set(images),
        status: Set(RequestStatus::Open),
        created_at: Set(Utc::now().timestamp()),
        updated_at: Set(None),
        ..Default::default()
    };

    Ok(request.insert(db).await?)
}

/// Role-scoped listing, newest-created-first.
pub async fn list_requests(
    db: &DatabaseConnection,
    caller: &Caller,
) -> Result<Vec<entities::maintenance_request::Model>, PortalError> {
    use entities::maintenance_request::{Column, Entity};

    let query = match caller.role {
        Role::Admin => Entity::find(),
        Role::Owner => {
            let unit_ids = owned_unit_ids(db, caller.account_id).await?;
            Entity::find().filter(Column::UnitId.is_in(unit_ids))
        }
        Role::Tenant => Entity::find().filter(Column::TenantId.eq(caller.account_id)),
    };

    Ok(query
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .all(db)
        .await?)
}

/// Move a request through its lifecycle. Owner of the unit's property
/// or admin.
pub async fn update_request_status(
    db: &DatabaseConnection,
    caller: &Caller,
    request_id: i32,
    status: RequestStatus,
) -> Result<entities::maintenance_request::Model, PortalError> {
    let request = entities::MaintenanceRequest::find_by_id(request_id)
        .one(db)
        .await?
        .ok_or(PortalError::NotFound("Maintenance request"))?;

    let unit = entities::Unit::find_by_id(request.unit_id)
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

    let mut active: entities::maintenance_request::ActiveModel = request.into();
    active.status = Set(status);
    active.updated_at = Set(Some(Utc::now().timestamp()));

    Ok(active.update(db).await?)
}

/// Append a comment to a request's thread.
pub async fn add_comment(
    db: &DatabaseConnection,
    policy: &dyn CommentPolicy,
    caller: &Caller,
    request_id: i32,
    content: String,
) -> Result<entities::maintenance_comment::Model, PortalError> {
    let request = entities::MaintenanceRequest::find_by_id(request_id)
        .one(db)
        .await?
        .ok_or(PortalError::NotFound("Maintenance request"))?;

    if !policy.may_comment(caller, &request) {
        return Err(PortalError::Forbidden(
            "not allowed to comment on this request",
        ));
    }

    let comment = entities::maintenance_comment::ActiveModel {
        request_id: Set(request_id),
        author_id: Set(caller.account_id),
        content: Set(content),
        created_at: Set(Utc::now().timestamp()),
        ..Default::default()
    };

    Ok(comment.insert(db).await?)
}

/// Chronological comment thread for a request.
pub async fn list_comments(
    db: &DatabaseConnection,
    request_id: i32,
) -> Result<Vec<entities::maintenance_comment::Model>, PortalError> {
    use entities::maintenance_comment::{Column, Entity};

    entities::MaintenanceRequest::find_by_id(request_id)
        .one(db)
        .await?
        .ok_or(PortalError::NotFound("Maintenance request"))?;

    Ok(Entity::find()
        .filter(Column::RequestId.eq(request_id))
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

async fn owned_unit_ids(db: &DatabaseConnection, owner_id: i32) -> Result<Vec<i32>, PortalError> {
    let property_ids: Vec<i32> = entities::Property::find()
        .filter(entities::property::Column::OwnerId.eq(owner_id))
        .all(db)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    Ok(entities::Unit::find()
        .filter(entities::unit::Column::PropertyId.is_in(property_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect())
}
