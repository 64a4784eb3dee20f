use std::collections::HashMap;
use std::sync::Arc;

use qrcode::QrCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::jwt;
use crate::core::oauth2::Registry;
use crate::core::session::{SessionManager, Store, StoreExt};
use crate::service::Error;

/// Marshalled flow session of the provider.
pub(crate) const SESSION_KEY: &str = "oauth2_session";
/// Login source the flow was started for.
pub(crate) const SOURCE_KEY: &str = "oauth2_source";

#[derive(Debug, Clone, Serialize)]
pub struct BeginAuth {
    pub state: String,
    pub auth_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QrCodeLogin {
    pub state: String,
    pub svg: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInfo {
    pub user: idp::User,
    pub token: String,
}

pub struct AuthService {
    registry: Arc<Registry>,
    sessions: Arc<SessionManager>,
    jwt_secret: String,
    token_expire_days: i64,
}

impl AuthService {
    pub fn new(
        registry: Arc<Registry>,
        sessions: Arc<SessionManager>,
        jwt_secret: impl Into<String>,
        token_expire_days: i64,
    ) -> Self {
        Self {
            registry,
            sessions,
            jwt_secret: jwt_secret.into(),
            token_expire_days,
        }
    }

    fn goth_provider(&self, source: &str) -> Result<Arc<dyn idp::Provider>, Error> {
        self.registry
            .goth_provider(source)
            .ok_or_else(|| Error::NotFound(format!("login source {}", source)))
    }

    /// Starts a login through `source`. The returned state keys the pending
    /// session until the provider redirects back.
    pub fn begin(&self, source: &str) -> Result<BeginAuth, Error> {
        let provider = self.goth_provider(source)?;
        let state = Uuid::new_v4().simple().to_string();
        let session = provider.begin_auth(&state)?;
        let auth_url = session.get_auth_url()?;

        let store = self.sessions.start(&state);
        store.set_value(SOURCE_KEY, source)?;
        store.set_value(SESSION_KEY, session.marshal().as_str())?;
        store.release()?;

        tracing::debug!(source, state = %state, "OAuth2 login started");
        Ok(BeginAuth { state, auth_url })
    }

    /// Same as [`begin`](Self::begin), with the auth URL rendered as an SVG
    /// QR code for scanning from a phone.
    pub fn qrcode(&self, source: &str) -> Result<QrCodeLogin, Error> {
        let BeginAuth { state, auth_url } = self.begin(source)?;
        let code = QrCode::new(auth_url.as_bytes()).map_err(|e| {
            tracing::error!("Failed to generate QR code: {}", e);
            Error::InternalServerError(e.to_string())
        })?;
        let svg = code
            .render::<qrcode::render::svg::Color>()
            .min_dimensions(200, 200)
            .build();
        Ok(QrCodeLogin { state, svg })
    }

    /// Finishes the login the provider redirected back for.
    ///
    /// The pending session is claimed before anything else happens and
    /// destroyed whatever the outcome, so a state can only be used once.
    pub async fn callback(
        &self,
        source: &str,
        params: &HashMap<String, String>,
    ) -> Result<LoginInfo, Error> {
        let state = params
            .get("state")
            .filter(|state| !state.is_empty())
            .ok_or_else(|| Error::BadRequest("missing state parameter".to_string()))?;
        let unknown_state = || Error::Unauthorized("unknown or expired login state".to_string());

        // A state presented to the wrong source is rejected without using it up.
        let pending = self.sessions.read(state).ok_or_else(unknown_state)?;
        let started_for: Option<String> = pending.get_value(SOURCE_KEY)?;
        if started_for.as_deref() != Some(source) {
            return Err(Error::Unauthorized(
                "login state belongs to another source".to_string(),
            ));
        }
        let store = self.sessions.take(state).ok_or_else(unknown_state)?;

        let result = self.complete(source, store.as_ref(), params).await;
        if let Err(e) = store.destroy() {
            tracing::error!("Failed to destroy login session {}: {}", state, e);
        }
        let user = result?;

        let token = jwt::create_token(&user, self.token_expire_days, &self.jwt_secret)?;
        tracing::info!(
            source,
            user_id = %user.user_id,
            "User {} logged in",
            user.name
        );
        Ok(LoginInfo { user, token })
    }

    async fn complete(
        &self,
        source: &str,
        store: &dyn Store,
        params: &HashMap<String, String>,
    ) -> Result<idp::User, Error> {
        let raw: String = store
            .get_value(SESSION_KEY)?
            .ok_or_else(|| Error::Unauthorized("login session is empty".to_string()))?;

        let provider = self.goth_provider(source)?;
        let mut session = provider.unmarshal_session(&raw)?;
        session.authorize(provider.as_ref(), params).await?;
        store.set_value(SESSION_KEY, session.marshal().as_str())?;

        let user = provider.fetch_user(session.as_ref()).await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use idp::wechat::{WeChatSession, fake};

    use super::*;
    use crate::core::jwt::verify_token;
    use crate::test_support::{self, MockStores};

    async fn service() -> (AuthService, Arc<SessionManager>, MockStores) {
        let (sessions, stores) = test_support::mock_sessions();
        let (svc, sessions) = service_with(sessions).await;
        (svc, sessions, stores)
    }

    async fn service_with(sessions: SessionManager) -> (AuthService, Arc<SessionManager>) {
        let registry = test_support::registry(fake::spawn().await);
        let sessions = Arc::new(sessions);
        let svc = AuthService::new(
            Arc::new(registry),
            sessions.clone(),
            test_support::JWT_SECRET,
            30,
        );
        (svc, sessions)
    }

    fn callback_params(state: &str, code: Option<&str>) -> HashMap<String, String> {
        let mut params = HashMap::from([("state".to_string(), state.to_string())]);
        if let Some(code) = code {
            params.insert("code".to_string(), code.to_string());
        }
        params
    }

    fn stored_session(stores: &MockStores) -> WeChatSession {
        let stores = stores.lock().unwrap();
        let raw: String = stores[0].get_value(SESSION_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn test_login_flow() {
        let (svc, sessions, stores) = service().await;
        let begin = svc.begin("wechat").unwrap();
        assert!(begin.auth_url.contains(&format!("state={}", begin.state)));
        assert_eq!(sessions.count(), 1);

        let info = svc
            .callback("wechat", &callback_params(&begin.state, Some(fake::CODE)))
            .await
            .unwrap();
        assert_eq!(info.user.user_id, fake::OPEN_ID);
        assert_eq!(info.user.provider, "wechat");
        assert_eq!(info.user.location, "China, Guangdong, Shenzhen");

        let claims = verify_token(&info.token, test_support::JWT_SECRET).unwrap();
        assert_eq!(claims.sub, fake::OPEN_ID);
        assert_eq!(claims.provider, "wechat");

        // Destroyed for the manager, still readable through the mock store.
        assert_eq!(sessions.count(), 0);
        let session = stored_session(&stores);
        assert_eq!(session.state, begin.state);
        assert_eq!(session.access_token, fake::ACCESS_TOKEN);
        assert_eq!(session.open_id, fake::OPEN_ID);
    }

    #[tokio::test]
    async fn test_state_is_single_use() {
        let (svc, _, _) = service().await;
        let begin = svc.begin("wechat").unwrap();
        let params = callback_params(&begin.state, Some(fake::CODE));
        svc.callback("wechat", &params).await.unwrap();
        let err = svc.callback("wechat", &params).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_concurrent_callbacks_share_one_login() {
        let (svc, sessions, _) = service().await;
        let begin = svc.begin("wechat").unwrap();
        let params = callback_params(&begin.state, Some(fake::CODE));

        let (first, second) = tokio::join!(
            svc.callback("wechat", &params),
            svc.callback("wechat", &params)
        );
        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(Error::Unauthorized(_))))
        );
        assert_eq!(sessions.count(), 0);
    }

    #[tokio::test]
    async fn test_expired_state() {
        let (sessions, stores) = test_support::mock_sessions();
        let (svc, sessions) = service_with(sessions.with_ttl(Duration::ZERO)).await;
        let begin = svc.begin("wechat").unwrap();

        let err = svc
            .callback("wechat", &callback_params(&begin.state, Some(fake::CODE)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
        assert_eq!(sessions.count(), 0);
        assert!(stored_session(&stores).access_token.is_empty());
    }

    #[tokio::test]
    async fn test_missing_state() {
        let (svc, _, _) = service().await;
        let params = HashMap::from([("code".to_string(), fake::CODE.to_string())]);
        let err = svc.callback("wechat", &params).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_unknown_state() {
        let (svc, _, _) = service().await;
        let err = svc
            .callback("wechat", &callback_params("forged", Some(fake::CODE)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_state_from_other_source() {
        let (svc, _, _) = service().await;
        let begin = svc.begin("wechat").unwrap();
        let err = svc
            .callback("wechat-intl", &callback_params(&begin.state, Some(fake::CODE)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));

        svc.callback("wechat", &callback_params(&begin.state, Some(fake::CODE)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_code() {
        let (svc, sessions, stores) = service().await;
        let begin = svc.begin("wechat").unwrap();
        let err = svc
            .callback("wechat", &callback_params(&begin.state, None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        assert_eq!(sessions.count(), 0);

        let session = stored_session(&stores);
        assert!(session.access_token.is_empty());
        assert!(!session.auth_url.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_code() {
        let (svc, _, stores) = service().await;
        let begin = svc.begin("wechat").unwrap();
        let err = svc
            .callback(
                "wechat",
                &callback_params(&begin.state, Some(fake::INVALID_CODE)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadGateway(_)));
        assert!(err.to_string().contains("invalid code"));
        assert!(stored_session(&stores).access_token.is_empty());
    }

    #[tokio::test]
    async fn test_qrcode_login() {
        let (svc, sessions, _) = service().await;
        let login = svc.qrcode("wechat").unwrap();
        assert!(login.svg.contains("<svg"));
        assert!(sessions.read(&login.state).is_some());

        let info = svc
            .callback("wechat", &callback_params(&login.state, Some(fake::CODE)))
            .await
            .unwrap();
        assert_eq!(info.user.nick_name, "Tea Drinker");
    }

    #[tokio::test]
    async fn test_unknown_source() {
        let (svc, sessions, _) = service().await;
        assert!(matches!(svc.begin("github"), Err(Error::NotFound(_))));
        assert_eq!(sessions.count(), 0);
    }
}
