use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::api::{self, AppState, SharedState};
use super::auth::{AdminCredentials, SessionStore};
use super::db::{DbHandle, HugDb};
use super::geo::{BigDataCloudGeocoder, NoopGeocoder, ReverseGeocoder};
use super::mail::{DisabledMailer, HttpMailer, Mailer, ReplyTemplate};
use crate::config::HugToml;

/// Listener settings for the service.
pub struct ServerConfig {
    pub port: u16,
    pub db_path: PathBuf,
    pub dev_mode: bool,
}

/// Wire the configured collaborators around an open database.
pub fn build_state(settings: &HugToml, db: HugDb) -> Result<SharedState> {
    let mailer: Arc<dyn Mailer> = match settings.mail.api_key.as_deref() {
        Some(key) if settings.mail.is_enabled() => Arc::new(HttpMailer::new(
            &settings.mail.endpoint,
            key.trim(),
            &settings.mail.from,
            Duration::from_secs(settings.mail.timeout_secs),
        )?),
        _ => Arc::new(DisabledMailer),
    };

    let geocoder: Arc<dyn ReverseGeocoder> = if settings.geocoding.enabled {
        Arc::new(BigDataCloudGeocoder::new(
            &settings.geocoding.endpoint,
            Duration::from_secs(settings.geocoding.timeout_secs),
        )?)
    } else {
        Arc::new(NoopGeocoder)
    };

    let ttl_minutes = settings.admin.session_ttl_minutes.max(1);

    Ok(Arc::new(AppState {
        db: DbHandle::new(db),
        mailer,
        geocoder,
        sessions: SessionStore::new(chrono::Duration::minutes(ttl_minutes)),
        credentials: AdminCredentials {
            username: settings.admin.username.clone(),
            password: settings.admin.password.clone(),
        },
        display_name: settings.admin.display_name.clone(),
        reply_template: ReplyTemplate {
            subject: settings.mail.subject.clone(),
        },
        dashboard_offset: settings.dashboard.offset()?,
    }))
}

/// Full application router with request tracing.
pub fn build_router(state: SharedState, dev_mode: bool) -> Router {
    let mut app = api::api_router(&state)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if dev_mode {
        app = app.layer(CorsLayer::permissive());
    }
    app
}

/// Open the database, start listening and serve until Ctrl+C.
pub async fn start_server(config: ServerConfig, settings: &HugToml) -> Result<()> {
    if let Some(parent) = config.db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let db = HugDb::new(&config.db_path).context("Failed to initialize order database")?;
    let state = build_state(settings, db)?;
    let app = build_router(state, config.dev_mode);

    let host = if config.dev_mode { "0.0.0.0" } else { "127.0.0.1" };
    let addr = format!("{}:{}", host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    tracing::info!(
        addr = %local_addr,
        db = %config.db_path.display(),
        mail = settings.mail.is_enabled(),
        "The Written Hug is listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_router(dev_mode: bool) -> Router {
        let mut settings = HugToml::default();
        settings.geocoding.enabled = false;
        let state = build_state(&settings, HugDb::new_in_memory().unwrap()).unwrap();
        build_router(state, dev_mode)
    }

    #[tokio::test]
    async fn test_health_via_full_router() {
        let app = test_router(false);
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_routes_guarded() {
        let app = test_router(false);
        let req = Request::builder()
            .uri("/api/admin/orders")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = test_router(false);
        let req = Request::builder()
            .uri("/api/nothing-here")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dev_mode_allows_cors() {
        let app = test_router(true);
        let req = Request::builder()
            .uri("/health")
            .header("origin", "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }

    #[test]
    fn test_build_state_without_password_rejects_logins() {
        let mut settings = HugToml::default();
        settings.geocoding.enabled = false;
        let state = build_state(&settings, HugDb::new_in_memory().unwrap()).unwrap();
        assert!(!state.credentials.verify("admin", ""));
        assert_eq!(state.display_name, "CEO");
        assert_eq!(state.sessions.ttl(), chrono::Duration::minutes(120));
    }

    #[test]
    fn test_build_state_rejects_bad_offset() {
        let mut settings = HugToml::default();
        settings.geocoding.enabled = false;
        settings.dashboard.utc_offset = "nope".into();
        assert!(build_state(&settings, HugDb::new_in_memory().unwrap()).is_err());
    }
}
