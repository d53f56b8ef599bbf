//! HTTP surface. Handlers stay thin: extract the caller, delegate to
//! the domain modules, serialize the result. Every error becomes a
//! JSON body with a `detail` field and a status derived from the
//! error kind.

use crate::analytics;
use crate::entities;
use crate::entities::account::Role;
use crate::entities::maintenance_request::RequestStatus;
use crate::entities::payment::PaymentType;
use crate::errors::PortalError;
use crate::identity::{self, Caller};
use crate::ledger::{self, NewTenancy};
use crate::maintenance::{self, CommentPolicy};
use crate::notify::Notifier;
use crate::payments::{self, PaymentLink};
use crate::registry::{self, NewProperty, NewUnit};
use crate::settings::Settings;
use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use miette::IntoDiagnostic;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Turns a bearer token into the stable subject identifier it was
/// issued for. Production wires an OIDC token verifier here.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, PortalError>;
}

/// Development verifier: the bearer token IS the subject. Useful for
/// local runs and tests; never deploy this.
pub struct StaticSubjectVerifier;

#[async_trait]
impl IdentityVerifier for StaticSubjectVerifier {
    async fn verify(&self, token: &str) -> Result<String, PortalError> {
        if token.is_empty() {
            return Err(PortalError::Unauthorized);
        }
        Ok(token.to_string())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: DatabaseConnection,
    pub notifier: Arc<dyn Notifier>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub comment_policy: Arc<dyn CommentPolicy>,
}

impl PortalError {
    fn status_code(&self) -> StatusCode {
        match self {
            PortalError::NotFound(_) => StatusCode::NOT_FOUND,
            PortalError::Validation(_) | PortalError::Constraint(_) => StatusCode::BAD_REQUEST,
            PortalError::Forbidden(_) => StatusCode::FORBIDDEN,
            PortalError::Unauthorized => StatusCode::UNAUTHORIZED,
            PortalError::Dependency(_) => StatusCode::BAD_GATEWAY,
            PortalError::Io(_)
            | PortalError::Config(_)
            | PortalError::Serde(_)
            | PortalError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Extract and verify the bearer token, without requiring a local
/// account to exist yet. Registration is the one caller of this.
async fn verified_subject(state: &AppState, headers: &HeaderMap) -> Result<String, PortalError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(PortalError::Unauthorized)?;
    state.verifier.verify(token).await
}

/// Resolve the full local account behind the bearer token.
async fn current_account(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<entities::account::Model, PortalError> {
    let subject = verified_subject(state, headers).await?;
    identity::account_by_subject(&state.db, &subject)
        .await?
        .ok_or(PortalError::Unauthorized)
}

async fn caller(state: &AppState, headers: &HeaderMap) -> Result<Caller, PortalError> {
    Ok(Caller::from_account(&current_account(state, headers).await?))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me).patch(update_me))
        .route("/properties", post(create_property).get(list_properties))
        .route("/properties/{id}", get(get_property))
        .route("/properties/{id}/documents", axum::routing::patch(update_documents))
        .route("/properties/{id}/analytics", get(property_analytics))
        .route("/properties/{id}/units", post(create_unit))
        .route("/units/{id}", get(unit_overview))
        .route("/tenancies", post(create_tenancy))
        .route("/tenancies/me", get(my_tenancy))
        .route("/tenancies/{id}/vacate", post(vacate))
        .route("/payments", post(record_payment).get(list_payments))
        .route("/maintenance", post(create_request).get(list_requests))
        .route("/maintenance/{id}/status", axum::routing::patch(update_status))
        .route(
            "/maintenance/{id}/comments",
            post(add_comment).get(list_comments),
        )
        .route("/owner/stats", get(owner_stats))
        .route("/admin/stats", get(admin_stats))
        .route("/admin/users", get(list_users))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState) -> miette::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        state.settings.server.host, state.settings.server.port
    )
    .parse()
    .map_err(|e| miette::miette!("bad listen addr: {e}"))?;

    let app = router(state);

    tracing::info!(%addr, "Portal API listening");
    let listener = tokio::net::TcpListener::bind(addr).await.into_diagnostic()?;
    axum::serve(listener, app).await.into_diagnostic()?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct RegisterBody {
    email: String,
    role: Role,
    name: Option<String>,
}

async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterBody>,
) -> Result<Json<entities::account::Model>, PortalError> {
    let subject = verified_subject(&state, &headers).await?;
    let account =
        identity::register_account(&state.db, &subject, &body.email, body.role, body.name).await?;
    Ok(Json(account))
}

async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<entities::account::Model>, PortalError> {
    Ok(Json(current_account(&state, &headers).await?))
}

#[derive(Debug, Deserialize)]
struct ProfileUpdate {
    name: Option<String>,
    documents: Option<Value>,
}

async fn update_me(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<entities::account::Model>, PortalError> {
    let caller = caller(&state, &headers).await?;
    let account = identity::update_profile(&state.db, &caller, body.name, body.documents).await?;
    Ok(Json(account))
}

async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<entities::account::Model>>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(identity::list_accounts(&state.db, &caller).await?))
}

async fn create_property(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewProperty>,
) -> Result<Json<entities::property::Model>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(
        registry::create_property(&state.db, &caller, body).await?,
    ))
}

async fn list_properties(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<entities::property::Model>>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(registry::list_properties(&state.db, &caller).await?))
}

async fn get_property(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Result<Json<registry::PropertyWithUnits>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(registry::get_property(&state.db, &caller, id).await?))
}

#[derive(Debug, Deserialize)]
struct DocumentsUpdate {
    documents: Vec<Value>,
}

async fn update_documents(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(body): Json<DocumentsUpdate>,
) -> Result<Json<entities::property::Model>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(
        registry::update_property_documents(&state.db, &caller, id, body.documents).await?,
    ))
}

async fn property_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Result<Json<analytics::PropertyAnalytics>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(
        analytics::property_analytics(&state.db, &caller, id).await?,
    ))
}

async fn create_unit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(body): Json<NewUnit>,
) -> Result<Json<entities::unit::Model>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(
        registry::create_unit(&state.db, &caller, id, body).await?,
    ))
}

async fn unit_overview(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Result<Json<registry::UnitOverview>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(
        registry::get_unit_overview(&state.db, &caller, id).await?,
    ))
}

async fn create_tenancy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewTenancy>,
) -> Result<Json<entities::tenancy::Model>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(
        ledger::create_tenancy(
            &state.db,
            &state.notifier,
            &state.settings.notifications,
            &caller,
            body,
        )
        .await?,
    ))
}

async fn my_tenancy(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<entities::tenancy::Model>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(
        ledger::active_tenancy_for_tenant(&state.db, caller.account_id).await?,
    ))
}

#[derive(Debug, Deserialize)]
struct VacateBody {
    /// Defaults to today when omitted.
    notice_date: Option<NaiveDate>,
}

async fn vacate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(body): Json<VacateBody>,
) -> Result<Json<entities::tenancy::Model>, PortalError> {
    let caller = caller(&state, &headers).await?;
    let notice_date = body.notice_date.unwrap_or_else(|| Utc::now().date_naive());
    Ok(Json(
        ledger::record_vacation_notice(&state.db, &caller, id, notice_date).await?,
    ))
}

#[derive(Debug, Deserialize)]
struct NewPayment {
    #[serde(flatten)]
    link: PaymentLink,
    amount: f64,
    payment_type: PaymentType,
    /// Defaults to today when omitted.
    payment_date: Option<NaiveDate>,
}

async fn record_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewPayment>,
) -> Result<Json<entities::payment::Model>, PortalError> {
    let caller = caller(&state, &headers).await?;
    let payment_date = body.payment_date.unwrap_or_else(|| Utc::now().date_naive());
    Ok(Json(
        payments::record_payment(
            &state.db,
            &caller,
            body.link,
            body.amount,
            body.payment_type,
            payment_date,
        )
        .await?,
    ))
}

async fn list_payments(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<entities::payment::Model>>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(payments::list_payments(&state.db, &caller).await?))
}

#[derive(Debug, Deserialize)]
struct NewRequest {
    unit_id: i32,
    title: String,
    description: String,
    images: Option<Value>,
}

async fn create_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewRequest>,
) -> Result<Json<entities::maintenance_request::Model>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(
        maintenance::create_request(
            &state.db,
            &caller,
            body.unit_id,
            body.title,
            body.description,
            body.images,
        )
        .await?,
    ))
}

async fn list_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<entities::maintenance_request::Model>>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(maintenance::list_requests(&state.db, &caller).await?))
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: RequestStatus,
}

async fn update_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<entities::maintenance_request::Model>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(
        maintenance::update_request_status(&state.db, &caller, id, body.status).await?,
    ))
}

#[derive(Debug, Deserialize)]
struct NewComment {
    content: String,
}

async fn add_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(body): Json<NewComment>,
) -> Result<Json<entities::maintenance_comment::Model>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(
        maintenance::add_comment(
            &state.db,
            state.comment_policy.as_ref(),
            &caller,
            id,
            body.content,
        )
        .await?,
    ))
}

async fn list_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Result<Json<Vec<entities::maintenance_comment::Model>>, PortalError> {
    caller(&state, &headers).await?;
    Ok(Json(maintenance::list_comments(&state.db, id).await?))
}

async fn owner_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<analytics::OwnerStats>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(analytics::owner_stats(&state.db, &caller).await?))
}

async fn admin_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<analytics::AdminStats>, PortalError> {
    let caller = caller(&state, &headers).await?;
    Ok(Json(analytics::admin_stats(&state.db, &caller).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_verifier_passes_token_through() {
        let subject = StaticSubjectVerifier
            .verify("subject-123")
            .await
            .expect("Should verify");
        assert_eq!(subject, "subject-123");

        let err = StaticSubjectVerifier
            .verify("")
            .await
            .expect_err("Should reject empty token");
        assert!(matches!(err, PortalError::Unauthorized));
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            PortalError::NotFound("Unit").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PortalError::Validation("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PortalError::Constraint("check failed".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PortalError::Forbidden("nope").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            PortalError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_payment_body_accepts_any_link_shape() {
        let by_tenancy: NewPayment = serde_json::from_value(json!({
            "tenancy_id": 4, "amount": 900.0, "payment_type": "RENT"
        }))
        .expect("Should deserialize");
        assert_eq!(by_tenancy.link.tenancy_id(), Some(4));
        assert_eq!(by_tenancy.link.unit_id(), None);

        let by_unit: NewPayment = serde_json::from_value(json!({
            "unit_id": 7, "amount": 80.0, "payment_type": "TAX",
            "payment_date": "2024-05-01"
        }))
        .expect("Should deserialize");
        assert_eq!(by_unit.link.unit_id(), Some(7));

        let both: NewPayment = serde_json::from_value(json!({
            "tenancy_id": 4, "unit_id": 7, "amount": 80.0, "payment_type": "MAINTENANCE"
        }))
        .expect("Should deserialize");
        assert_eq!(both.link.tenancy_id(), Some(4));
        assert_eq!(both.link.unit_id(), Some(7));
    }
}
