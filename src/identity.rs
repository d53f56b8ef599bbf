//! Maps externally verified identities to local account records.
//!
//! Credential verification itself (token checking, revocation) is an
//! external collaborator; this module starts from the stable subject
//! identifier it produces.

use crate::entities;
use crate::entities::account::Role;
use crate::errors::PortalError;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde_json::Value;

/// Resolved caller identity, passed to every authorized operation.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub account_id: i32,
    pub role: Role,
}

impl Caller {
    pub fn from_account(account: &entities::account::Model) -> Self {
        Self {
            account_id: account.id,
            role: account.role,
        }
    }
}

/// Create the local account for an externally verified subject. The
/// role is fixed at registration; nothing mutates it afterwards.
pub async fn register_account(
    db: &DatabaseConnection,
    subject: &str,
    email: &str,
    role: Role,
    name: Option<String>,
) -> Result<entities::account::Model, PortalError> {
    if account_by_subject(db, subject).await?.is_some() {
        return Err(PortalError::Validation(
            "account already registered for this identity".to_string(),
        ));
    }

    let account = entities::account::ActiveModel {
        subject: Set(subject.to_string()),
        email: Set(email.to_string()),
        role: Set(role),
        name: Set(name),
        documents: Set(None),
        created_at: Set(Utc::now().timestamp()),
        ..Default::default()
    };

    Ok(account.insert(db).await?)
}

pub async fn account_by_subject(
    db: &DatabaseConnection,
    subject: &str,
) -> Result<Option<entities::account::Model>, PortalError> {
    use entities::account::{Column, Entity};

    Ok(Entity::find()
        .filter(Column::Subject.eq(subject))
        .one(db)
        .await?)
}

pub async fn account_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<entities::account::Model>, PortalError> {
    use entities::account::{Column, Entity};

    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

/// Update the caller's own display name and document attachments.
pub async fn update_profile(
    db: &DatabaseConnection,
    caller: &Caller,
    name: Option<String>,
    documents: Option<Value>,
) -> Result<entities::account::Model, PortalError> {
    use entities::account::Entity;

    let account = Entity::find_by_id(caller.account_id)
        .one(db)
        .await?
        .ok_or(PortalError::NotFound("Account"))?;

    let mut active: entities::account::ActiveModel = account.into();
    if let Some(name) = name {
        active.name = Set(Some(name));
    }
    if let Some(documents) = documents {
        active.documents = Set(Some(documents));
    }

    Ok(active.update(db).await?)
}

/// All registered accounts, admin only.
pub async fn list_accounts(
    db: &DatabaseConnection,
    caller: &Caller,
) -> Result<Vec<entities::account::Model>, PortalError> {
    use entities::account::Entity;

    if !caller.role.satisfies(Role::Admin) {
        return Err(PortalError::Forbidden("admin role required"));
    }

    Ok(Entity::find().all(db).await?)
}
