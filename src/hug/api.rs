use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header::USER_AGENT, request::Parts},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::auth::{AdminCredentials, SessionStore, bearer_token, client_ip, record_login, require_admin};
use super::conversation::{self, ReplyOutcome};
use super::db::DbHandle;
use super::geo::ReverseGeocoder;
use super::intake::{OrderSubmission, submit_order};
use super::lifecycle::update_status;
use super::listing::{DashboardStats, ListingParams, filter_orders};
use super::mail::{Mailer, ReplyTemplate};
use super::models::{AdminLogin, Conversation, Location, Order, Reply};
use crate::errors::{ErrorKind, FieldError, HugError};

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub db: DbHandle,
    pub mailer: Arc<dyn Mailer>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub sessions: SessionStore,
    pub credentials: AdminCredentials,
    /// Sender name on admin replies when none is given.
    pub display_name: String,
    pub reply_template: ReplyTemplate,
    /// Offset the dashboard's "today" is evaluated in.
    pub dashboard_offset: FixedOffset,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    fn dashboard_now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.dashboard_offset)
    }
}

// ── Request / response payload types ──────────────────────────────────

/// Where the admin logged in from, as reported by the browser.
#[derive(Deserialize)]
pub struct LoginLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub location: Option<LoginLocation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub display_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminReplyRequest {
    pub message: String,
    pub sender_name: Option<String>,
}

#[derive(Deserialize)]
pub struct ClientReplyRequest {
    pub email: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Deserialize)]
pub struct LoginsParams {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderExport {
    pub exported_at: DateTime<Utc>,
    pub total: usize,
    pub stats: DashboardStats,
    pub orders: Vec<Order>,
}

// ── Error handling ────────────────────────────────────────────────────

impl IntoResponse for HugError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::DependencyFailure => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        };
        if status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(error = ?self, "dependency failure");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "error": self.to_string(),
        });
        if !self.fields().is_empty() {
            body["fields"] = serde_json::json!(self.fields());
        }
        (status, Json(body)).into_response()
    }
}

// ── Extractors ────────────────────────────────────────────────────────

/// JSON body whose decode failures come back as `HugError::Validation`.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HugError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(HugError::Validation(vec![decode_error(
                &rejection.body_text(),
            )])),
        }
    }
}

/// Query string whose decode failures come back as `HugError::Validation`.
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HugError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(HugError::Validation(vec![decode_error(
                &rejection.body_text(),
            )])),
        }
    }
}

const DECODE_PREFIXES: [&str; 3] = [
    "Failed to deserialize the JSON body into the target type: ",
    "Failed to parse the request body as JSON: ",
    "Failed to deserialize query string: ",
];

/// Name the offending field from a decode error, or `body` when serde
/// does not say.
fn decode_error(text: &str) -> FieldError {
    let detail = DECODE_PREFIXES
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .unwrap_or(text)
        .trim();

    if let Some(rest) = detail.split_once("missing field `").map(|(_, rest)| rest)
        && let Some((field, _)) = rest.split_once('`')
    {
        return FieldError::new(field, "is required");
    }
    if let Some((path, message)) = detail.split_once(": ")
        && !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '[' | ']'))
    {
        return FieldError::new(path, message);
    }
    FieldError::new("body", detail)
}

// ── Router ────────────────────────────────────────────────────────────

/// Public routes plus the admin routes behind the session guard.
pub fn api_router(state: &SharedState) -> Router<SharedState> {
    let admin = Router::new()
        .route("/api/admin/logout", post(logout))
        .route("/api/admin/orders", get(list_orders))
        .route("/api/admin/orders/{id}", get(get_conversation))
        .route("/api/admin/orders/{id}/replies", post(add_admin_reply))
        .route("/api/admin/orders/{id}/status", patch(change_status))
        .route("/api/admin/replies/{id}/read", post(mark_reply_read))
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/unread-count", get(unread_count))
        .route("/api/admin/export", get(export_orders))
        .route("/api/admin/logins", get(recent_logins))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/api/orders", post(create_order))
        .route("/api/orders/{id}/replies", post(add_client_reply))
        .route("/api/admin/login", post(login))
        .route("/health", get(health_check))
        .merge(admin)
}

fn place_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

fn user_agent(headers: &HeaderMap) -> Option<&str> {
    headers.get(USER_AGENT).and_then(|v| v.to_str().ok())
}

async fn snapshot(db: &DbHandle) -> Result<(Vec<Order>, i64), HugError> {
    db.call(|db| Ok((db.list_orders()?, db.count_unread_client_replies()?)))
        .await
        .map_err(HugError::Store)
}

// ── Public handlers ───────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn create_order(
    State(state): State<SharedState>,
    headers: HeaderMap,
    JsonBody(submission): JsonBody<OrderSubmission>,
) -> Result<impl IntoResponse, HugError> {
    let order = submit_order(
        &state.db,
        state.geocoder.as_ref(),
        submission,
        user_agent(&headers),
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": order.id }))))
}

async fn add_client_reply(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<ClientReplyRequest>,
) -> Result<(StatusCode, Json<Reply>), HugError> {
    let reply =
        conversation::append_client_reply(&state.db, &id, &req.email, &req.message, Utc::now())
            .await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

async fn login(
    State(state): State<SharedState>,
    headers: HeaderMap,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, HugError> {
    if !state.credentials.verify(&req.username, &req.password) {
        tracing::warn!(username = %req.username, "rejected admin login");
        return Err(HugError::Unauthorized("invalid username or password".to_string()));
    }

    let now = Utc::now();
    let session = state.sessions.issue(now);
    record_login(
        &state.db,
        state.geocoder.as_ref(),
        req.location.map(|l| Location {
            latitude: l.latitude,
            longitude: l.longitude,
            city: place_name(l.city),
            country: place_name(l.country),
        }),
        client_ip(&headers).unwrap_or_else(|| "unknown".to_string()),
        user_agent(&headers).unwrap_or_default().to_string(),
        now,
    )
    .await;

    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        display_name: state.display_name.clone(),
    }))
}

// ── Admin handlers ────────────────────────────────────────────────────

async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.revoke(token);
    }
    StatusCode::NO_CONTENT
}

async fn list_orders(
    State(state): State<SharedState>,
    QueryParams(params): QueryParams<ListingParams>,
) -> Result<Json<Vec<Order>>, HugError> {
    let query = params.into_query()?;
    let (orders, _) = snapshot(&state.db).await?;
    Ok(Json(filter_orders(&orders, &query, &state.dashboard_now())))
}

async fn get_conversation(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, HugError> {
    Ok(Json(conversation::get_conversation(&state.db, &id).await?))
}

async fn add_admin_reply(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<AdminReplyRequest>,
) -> Result<(StatusCode, Json<ReplyOutcome>), HugError> {
    let sender_name = req
        .sender_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(&state.display_name);
    let outcome = conversation::append_admin_reply(
        &state.db,
        state.mailer.as_ref(),
        &state.reply_template,
        &id,
        sender_name,
        &req.message,
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn change_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<StatusRequest>,
) -> Result<Json<Order>, HugError> {
    Ok(Json(update_status(&state.db, &id, &req.status).await?))
}

async fn mark_reply_read(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Reply>, HugError> {
    Ok(Json(conversation::mark_read(&state.db, &id).await?))
}

async fn stats(State(state): State<SharedState>) -> Result<Json<DashboardStats>, HugError> {
    let (orders, unread) = snapshot(&state.db).await?;
    Ok(Json(DashboardStats::compute(&orders, unread, &state.dashboard_now())))
}

async fn unread_count(State(state): State<SharedState>) -> Result<impl IntoResponse, HugError> {
    let count = conversation::unread_count(&state.db).await?;
    Ok(Json(serde_json::json!({ "count": count })))
}

async fn export_orders(
    State(state): State<SharedState>,
    QueryParams(params): QueryParams<ListingParams>,
) -> Result<Json<OrderExport>, HugError> {
    let query = params.into_query()?;
    let (orders, unread) = snapshot(&state.db).await?;
    let now = state.dashboard_now();
    let stats = DashboardStats::compute(&orders, unread, &now);
    let orders = filter_orders(&orders, &query, &now);
    tracing::info!(count = orders.len(), "orders exported");
    Ok(Json(OrderExport {
        exported_at: now.with_timezone(&Utc),
        total: orders.len(),
        stats,
        orders,
    }))
}

async fn recent_logins(
    State(state): State<SharedState>,
    QueryParams(params): QueryParams<LoginsParams>,
) -> Result<Json<Vec<AdminLogin>>, HugError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 500);
    let logins = state
        .db
        .call(move |db| db.recent_admin_logins(limit))
        .await
        .map_err(HugError::Store)?;
    Ok(Json(logins))
}
