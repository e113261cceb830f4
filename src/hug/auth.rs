//! Admin credentials, server-side sessions and the login audit trail.
//!
//! A session is an opaque token handed out at login and remembered here with
//! its expiry. Every admin route goes through [`require_admin`], which asks
//! the store whether the presented token is still valid.

use std::collections::HashMap;
use std::sync::Mutex;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::api::SharedState;
use super::db::DbHandle;
use super::geo::{ReverseGeocoder, enrich_location};
use super::models::Location;
use crate::errors::HugError;

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 120;

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: Option<String>,
}

impl AdminCredentials {
    /// Without a configured password no login can succeed.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        match &self.password {
            Some(expected) if !expected.is_empty() => {
                self.username == username.trim() && expected == password
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCheck {
    Authorized,
    Expired,
    Absent,
}

/// In-memory token store. Tokens do not survive a restart.
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn sessions(&self) -> std::sync::MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn issue(&self, now: DateTime<Utc>) -> Session {
        let token = Uuid::new_v4().to_string();
        let expires_at = now + self.ttl;
        let mut sessions = self.sessions();
        sessions.retain(|_, exp| *exp > now);
        sessions.insert(token.clone(), expires_at);
        Session { token, expires_at }
    }

    /// Expired tokens are evicted on the check that finds them.
    pub fn check(&self, token: &str, now: DateTime<Utc>) -> SessionCheck {
        let mut sessions = self.sessions();
        match sessions.get(token) {
            Some(exp) if *exp > now => SessionCheck::Authorized,
            Some(_) => {
                sessions.remove(token);
                SessionCheck::Expired
            }
            None => SessionCheck::Absent,
        }
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions().remove(token).is_some()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.sessions().len()
    }
}

/// Token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Client address as reported by the fronting proxy, first hop only.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    ["x-forwarded-for", "x-real-ip", "cf-connecting-ip"]
        .iter()
        .filter_map(|name| headers.get(*name)?.to_str().ok())
        .filter_map(|value| value.split(',').next())
        .map(str::trim)
        .find(|ip| !ip.is_empty())
        .map(str::to_string)
}

/// `"City, Country (lat, lon)"`, dropping whichever place names are unknown.
pub fn describe_login_location(
    latitude: f64,
    longitude: f64,
    city: Option<&str>,
    country: Option<&str>,
) -> String {
    let place: Vec<&str> = [city, country].into_iter().flatten().collect();
    let coords = format!("({:.4}, {:.4})", latitude, longitude);
    if place.is_empty() {
        coords
    } else {
        format!("{} {}", place.join(", "), coords)
    }
}

/// Write an `admin_logins` row. Failures are logged, never returned.
pub async fn record_login(
    db: &DbHandle,
    geocoder: &dyn ReverseGeocoder,
    location: Option<Location>,
    ip_address: String,
    user_agent: String,
    now: DateTime<Utc>,
) {
    let location = match location {
        Some(location) => {
            let loc = enrich_location(geocoder, location).await;
            Some(describe_login_location(
                loc.latitude,
                loc.longitude,
                loc.city.as_deref(),
                loc.country.as_deref(),
            ))
        }
        None => None,
    };

    let result = db
        .call(move |db| db.insert_admin_login(location.as_deref(), &ip_address, &user_agent, now))
        .await;
    match result {
        Ok(login) => tracing::info!(login_id = %login.id, ip = %login.ip_address, "admin login recorded"),
        Err(e) => tracing::warn!(error = %e, "failed to record admin login"),
    }
}

/// Guard for every admin route.
pub async fn require_admin(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    let check = match bearer_token(req.headers()) {
        Some(token) => state.sessions.check(token, Utc::now()),
        None => SessionCheck::Absent,
    };
    match check {
        SessionCheck::Authorized => next.run(req).await,
        SessionCheck::Expired => HugError::SessionExpired.into_response(),
        SessionCheck::Absent => {
            HugError::Unauthorized("admin session required".to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hug::db::HugDb;
    use crate::hug::geo::{NoopGeocoder, Place};
    use async_trait::async_trait;
    use axum::http::HeaderValue;

    fn creds(password: Option<&str>) -> AdminCredentials {
        AdminCredentials {
            username: "admin".into(),
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn test_verify_credentials() {
        let c = creds(Some("s3cret"));
        assert!(c.verify("admin", "s3cret"));
        assert!(c.verify(" admin ", "s3cret"));
        assert!(!c.verify("admin", "wrong"));
        assert!(!c.verify("root", "s3cret"));
        assert!(!creds(None).verify("admin", ""));
        assert!(!creds(Some("")).verify("admin", ""));
    }

    #[test]
    fn test_session_lifecycle() {
        let store = SessionStore::new(Duration::minutes(120));
        let now = Utc::now();
        let session = store.issue(now);
        assert_eq!(session.expires_at, now + Duration::minutes(120));

        assert_eq!(store.check(&session.token, now), SessionCheck::Authorized);
        assert_eq!(
            store.check(&session.token, now + Duration::minutes(119)),
            SessionCheck::Authorized
        );
        assert_eq!(
            store.check(&session.token, now + Duration::minutes(121)),
            SessionCheck::Expired
        );
        assert_eq!(
            store.check(&session.token, now + Duration::minutes(121)),
            SessionCheck::Absent
        );
        assert_eq!(store.check("made-up", now), SessionCheck::Absent);
    }

    #[test]
    fn test_revoke() {
        let store = SessionStore::new(Duration::minutes(5));
        let now = Utc::now();
        let session = store.issue(now);
        assert!(store.revoke(&session.token));
        assert!(!store.revoke(&session.token));
        assert_eq!(store.check(&session.token, now), SessionCheck::Absent);
    }

    #[test]
    fn test_issue_evicts_expired_sessions() {
        let store = SessionStore::new(Duration::minutes(5));
        let now = Utc::now();
        store.issue(now);
        store.issue(now);
        assert_eq!(store.len(), 2);
        store.issue(now + Duration::minutes(10));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc-123"));
        assert_eq!(bearer_token(&headers), Some("abc-123"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), None);
        headers.insert("cf-connecting-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(client_ip(&headers).as_deref(), Some("9.9.9.9"));
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_describe_login_location() {
        assert_eq!(
            describe_login_location(18.5204, 73.8567, Some("Pune"), Some("India")),
            "Pune, India (18.5204, 73.8567)"
        );
        assert_eq!(
            describe_login_location(1.0, 2.0, None, Some("India")),
            "India (1.0000, 2.0000)"
        );
        assert_eq!(describe_login_location(1.0, 2.0, None, None), "(1.0000, 2.0000)");
    }

    struct PuneGeocoder;

    #[async_trait]
    impl ReverseGeocoder for PuneGeocoder {
        async fn reverse_geocode(&self, _lat: f64, _lon: f64) -> anyhow::Result<Place> {
            Ok(Place {
                city: Some("Pune".into()),
                country: Some("India".into()),
            })
        }
    }

    fn pune(city: Option<&str>, country: Option<&str>) -> Location {
        Location {
            latitude: 18.5204,
            longitude: 73.8567,
            city: city.map(str::to_string),
            country: country.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_record_login_writes_audit_row() {
        let db = DbHandle::new(HugDb::new_in_memory().unwrap());
        record_login(
            &db,
            &PuneGeocoder,
            Some(pune(None, None)),
            "203.0.113.7".into(),
            "curl/8".into(),
            Utc::now(),
        )
        .await;
        record_login(&db, &NoopGeocoder, None, "unknown".into(), "".into(), Utc::now()).await;

        let logins = db.lock_sync().unwrap().recent_admin_logins(10).unwrap();
        assert_eq!(logins.len(), 2);
        let with_place = logins
            .iter()
            .find(|l| l.ip_address == "203.0.113.7")
            .unwrap();
        assert_eq!(
            with_place.location.as_deref(),
            Some("Pune, India (18.5204, 73.8567)")
        );
        assert!(logins.iter().any(|l| l.location.is_none()));
    }

    #[tokio::test]
    async fn test_record_login_keeps_supplied_place_names() {
        let db = DbHandle::new(HugDb::new_in_memory().unwrap());
        record_login(
            &db,
            &NoopGeocoder,
            Some(pune(Some("Pune"), Some("India"))),
            "203.0.113.9".into(),
            "curl/8".into(),
            Utc::now(),
        )
        .await;
        record_login(
            &db,
            &PuneGeocoder,
            Some(pune(Some("Mumbai"), None)),
            "203.0.113.10".into(),
            "curl/8".into(),
            Utc::now(),
        )
        .await;

        let logins = db.lock_sync().unwrap().recent_admin_logins(10).unwrap();
        let location = |ip: &str| {
            logins
                .iter()
                .find(|l| l.ip_address == ip)
                .and_then(|l| l.location.clone())
        };
        assert_eq!(
            location("203.0.113.9").as_deref(),
            Some("Pune, India (18.5204, 73.8567)")
        );
        assert_eq!(
            location("203.0.113.10").as_deref(),
            Some("Mumbai, India (18.5204, 73.8567)")
        );
    }
}
