use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use serde::{Deserialize, Serialize};

use crate::core::oauth2::CustomUrlSettings;
use crate::server::AppState;
use crate::service::{Error, LoginInfo, QrCodeLogin};

const ICON_SIZE: u32 = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceResponse {
    pub name: String,
    pub provider: String,
    pub display_name: String,
    pub icon_html: String,
    /// Endpoints an administrator may point elsewhere, if any.
    pub custom_url_settings: Option<CustomUrlSettings>,
}

pub async fn list_sources(State(state): State<Arc<AppState>>) -> Json<Vec<SourceResponse>> {
    let sources = state
        .registry
        .sources()
        .into_iter()
        .map(|(source, provider)| SourceResponse {
            name: source.name.clone(),
            provider: provider.name().to_string(),
            display_name: provider.display_name().to_string(),
            icon_html: provider.icon_html(ICON_SIZE),
            custom_url_settings: provider.custom_url_settings(),
        })
        .collect();
    Json(sources)
}

pub async fn begin_login(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
) -> Result<Redirect, Error> {
    let begin = state.auth_svc.begin(&source)?;
    Ok(Redirect::temporary(&begin.auth_url))
}

pub async fn login_qrcode(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
) -> Result<Json<QrCodeLogin>, Error> {
    Ok(Json(state.auth_svc.qrcode(&source)?))
}

pub async fn callback(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<LoginInfo>, Error> {
    match state.auth_svc.callback(&source, &params).await {
        Ok(info) => Ok(Json(info)),
        Err(e) => {
            tracing::error!("OAuth2 callback for {} failed: {}", source, e);
            Err(e)
        }
    }
}
