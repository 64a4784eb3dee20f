//! WeChat web login (`snsapi_userinfo` authorization code flow).

use std::any::Any;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::provider::{Provider, Session, Token, User};

mod api;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
mod session;

pub use api::{ApiStatus, TokenResponse, WeChatUser};
pub use session::WeChatSession;

pub const AUTH_URL: &str = "https://open.weixin.qq.com/connect/oauth2/authorize";
pub const TOKEN_URL: &str = "https://api.weixin.qq.com/sns/oauth2/access_token";
pub const PROFILE_URL: &str = "https://api.weixin.qq.com/sns/userinfo";

const DEFAULT_NAME: &str = "wechat";
const DEFAULT_SCOPE: &str = "snsapi_userinfo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub auth_url: String,
    pub token_url: String,
    pub profile_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            profile_url: PROFILE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeChatProvider {
    client_key: String,
    secret: String,
    callback_url: String,
    scopes: Vec<String>,
    endpoints: Endpoints,
    client: Client,
    provider_name: String,
    debug: bool,
}

impl WeChatProvider {
    pub fn new(
        client_key: impl Into<String>,
        secret: impl Into<String>,
        callback_url: impl Into<String>,
        scopes: Vec<String>,
    ) -> Result<Self> {
        let scopes = if scopes.is_empty() {
            vec![DEFAULT_SCOPE.to_string()]
        } else {
            scopes
        };
        Ok(Self {
            client_key: client_key.into(),
            secret: secret.into(),
            callback_url: callback_url.into(),
            scopes,
            endpoints: Endpoints::default(),
            client: Client::new(None)?,
            provider_name: DEFAULT_NAME.to_string(),
            debug: false,
        })
    }

    /// Points the provider at different API hosts.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// WeChat's variant of the authorization URL: `appid` instead of
    /// `client_id`, comma-joined scopes and a `#wechat_redirect` fragment.
    fn auth_code_url(&self, state: &str) -> Result<String> {
        let scope = self.scopes.join(",");
        let mut url = Url::parse_with_params(
            &self.endpoints.auth_url,
            [
                ("appid", self.client_key.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("state", state),
            ],
        )?;
        url.set_fragment(Some("wechat_redirect"));
        Ok(url.into())
    }

    pub(crate) async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let token: TokenResponse = self
            .get_json(
                &self.endpoints.token_url,
                &[
                    ("appid", self.client_key.as_str()),
                    ("secret", self.secret.as_str()),
                    ("code", code),
                    ("grant_type", "authorization_code"),
                ],
            )
            .await?;
        token.status.check()?;
        Ok(token)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let body = self.client.get_text(url, query).await?;
        if self.debug {
            tracing::debug!(provider = %self.provider_name, "WeChat response body: {}", body);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Provider for WeChatProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn set_name(&mut self, name: &str) {
        self.provider_name = name.to_string();
    }

    fn debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    fn begin_auth(&self, state: &str) -> Result<Box<dyn Session>> {
        Ok(Box::new(WeChatSession {
            auth_url: self.auth_code_url(state)?,
            state: state.to_string(),
            ..Default::default()
        }))
    }

    fn unmarshal_session(&self, data: &str) -> Result<Box<dyn Session>> {
        let session: WeChatSession = serde_json::from_str(data)?;
        Ok(Box::new(session))
    }

    async fn fetch_user(&self, session: &dyn Session) -> Result<User> {
        let session = session
            .as_any()
            .downcast_ref::<WeChatSession>()
            .ok_or_else(|| Error::SessionMismatch(self.provider_name.clone()))?;
        if session.access_token.is_empty() {
            return Err(Error::NotAuthorized);
        }

        let resp: api::UserInfoResponse = self
            .get_json(
                &self.endpoints.profile_url,
                &[
                    ("access_token", session.access_token.as_str()),
                    ("openid", session.open_id.as_str()),
                    ("lang", "zh_CN"),
                ],
            )
            .await?;
        resp.status.check()?;

        let wechat_user = resp.user;
        tracing::debug!(openid = %wechat_user.openid, "WeChat user fetched");
        Ok(User {
            raw_data: wechat_user.raw_data(),
            provider: self.provider_name.clone(),
            name: wechat_user.nickname.clone(),
            nick_name: wechat_user.nickname.clone(),
            location: wechat_user.location(),
            avatar_url: wechat_user.headimgurl,
            user_id: wechat_user.openid,
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at: session.expires_at,
            ..Default::default()
        })
    }

    fn refresh_token_available(&self) -> bool {
        false
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<Token> {
        Err(Error::RefreshNotSupported("WeChat".to_string()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
