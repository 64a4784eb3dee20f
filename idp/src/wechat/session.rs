use std::any::Any;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::provider::{Params, Provider, Session};
use crate::wechat::WeChatProvider;

/// Login state carried between `begin_auth` and the callback.
///
/// Serialized with the field names the session storage has always used, so
/// sessions written by older deployments still restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeChatSession {
    #[serde(rename = "AuthURL")]
    pub auth_url: String,
    #[serde(rename = "AccessToken")]
    pub access_token: String,
    #[serde(rename = "RefreshToken")]
    pub refresh_token: String,
    #[serde(rename = "OpenID")]
    pub open_id: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "ExpiresAt", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[async_trait]
impl Session for WeChatSession {
    fn get_auth_url(&self) -> Result<String> {
        if self.auth_url.is_empty() {
            return Err(Error::NoAuthUrl);
        }
        Ok(self.auth_url.clone())
    }

    async fn authorize(&mut self, provider: &dyn Provider, params: &dyn Params) -> Result<String> {
        let provider = provider
            .as_any()
            .downcast_ref::<WeChatProvider>()
            .ok_or_else(|| Error::ProviderMismatch(provider.name().to_string()))?;

        let code = params
            .get("code")
            .filter(|code| !code.is_empty())
            .ok_or(Error::MissingParam("code"))?;

        let token = provider.exchange_code(code).await?;
        tracing::debug!(openid = %token.openid, scope = %token.scope, "WeChat code exchanged");

        self.access_token = token.access_token;
        self.refresh_token = token.refresh_token;
        self.open_id = token.openid;
        self.expires_at = Duration::try_seconds(token.expires_in)
            .filter(|ttl| *ttl > Duration::zero())
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
        Ok(self.access_token.clone())
    }

    fn marshal(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
