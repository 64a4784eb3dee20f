use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::routing::get;
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;

use crate::api;
use crate::config::Config;
use crate::core::oauth2::Registry;
use crate::core::session::SessionManager;
use crate::server::auth;
use crate::service::AuthService;

const REAP_INTERVAL: Duration = Duration::from_secs(60);

pub async fn run(config: Config) -> anyhow::Result<()> {
    let host = config.host.clone();
    let port = config.port;
    let server_url = format!("{host}:{port}");

    tracing::info!("Server starting at {server_url}");

    let mut registry = Registry::with_builtin_providers();
    for source in &config.sources {
        let callback_url = config.callback_url(&source.name);
        registry
            .add_source(source.clone(), &callback_url)
            .with_context(|| format!("Failed to configure login source {}", source.name))?;
    }
    if config.sources.is_empty() {
        tracing::warn!("No login sources configured");
    }

    let registry = Arc::new(registry);
    let sessions = Arc::new(
        SessionManager::new().with_ttl(Duration::from_secs(config.session_ttl_secs)),
    );
    let reaper = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(REAP_INTERVAL);
        loop {
            interval.tick().await;
            let reaped = reaper.reap();
            if reaped > 0 {
                tracing::debug!(reaped, live = reaper.count(), "Reaped expired login sessions");
            }
        }
    });
    let auth_svc = Arc::new(AuthService::new(
        registry.clone(),
        sessions,
        config.jwt_secret.clone(),
        config.token_expire_days,
    ));

    let state = Arc::new(AppState {
        auth_svc,
        registry,
        config,
    });

    let listener = tokio::net::TcpListener::bind(&server_url)
        .await
        .context("Listening failed")?;

    axum::serve(listener, router(state))
        .await
        .context("Server failed")?;
    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
        .max_age(std::time::Duration::from_secs(3600));

    let public_routes = Router::new()
        .route("/user/oauth2", get(api::auth::list_sources))
        .route("/user/oauth2/{source}", get(api::auth::begin_login))
        .route("/user/oauth2/{source}/qrcode", get(api::auth::login_qrcode))
        .route("/user/oauth2/{source}/callback", get(api::auth::callback));

    let protected_routes = Router::new()
        .route("/user/me", get(api::user::get_current_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::auth));

    public_routes
        .merge(protected_routes)
        .layer(cors)
        .with_state(state)
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_svc: Arc<AuthService>,
    pub(crate) registry: Arc<Registry>,
    pub(crate) config: Config,
}
