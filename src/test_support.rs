//! Helpers shared by the unit tests.

use std::sync::{Arc, Mutex};

use idp::Provider as _;
use idp::wechat::{Endpoints, WeChatProvider, fake};

use crate::config::Config;
use crate::core::oauth2::{Registry, Source};
use crate::core::session::{MockStore, SessionManager};
use crate::server::AppState;
use crate::service::AuthService;

pub const JWT_SECRET: &str = "test-jwt-secret";

/// Every store a mock-backed [`SessionManager`] created, in order.
pub type MockStores = Arc<Mutex<Vec<Arc<MockStore>>>>;

/// Registry with `wechat` and `wechat-intl` sources talking to `endpoints`.
pub fn registry(endpoints: Endpoints) -> Registry {
    let mut registry = Registry::with_builtin_providers();
    for name in ["wechat", "wechat-intl"] {
        let source = Source {
            name: name.to_string(),
            provider: "wechat".to_string(),
            client_id: fake::APP_ID.to_string(),
            client_secret: fake::APP_SECRET.to_string(),
            scopes: vec![],
        };
        let mut goth = WeChatProvider::new(
            fake::APP_ID,
            fake::APP_SECRET,
            format!("http://localhost:3000/user/oauth2/{name}/callback"),
            vec![],
        )
        .unwrap()
        .with_endpoints(endpoints.clone());
        goth.set_name(name);
        registry.insert_source(source, Arc::new(goth));
    }
    registry
}

pub fn mock_sessions() -> (SessionManager, MockStores) {
    let stores: MockStores = Arc::default();
    let recorder = stores.clone();
    let manager = SessionManager::with_factory(move |sid| {
        let store = Arc::new(MockStore::new(sid));
        recorder.lock().unwrap().push(store.clone());
        store
    });
    (manager, stores)
}

pub fn app_state(endpoints: Endpoints) -> Arc<AppState> {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        app_url: "http://localhost:3000".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        token_expire_days: 30,
        session_ttl_secs: 600,
        sources: vec![],
    };
    let registry = Arc::new(registry(endpoints));
    let auth_svc = Arc::new(AuthService::new(
        registry.clone(),
        Arc::new(SessionManager::new()),
        JWT_SECRET,
        config.token_expire_days,
    ));
    Arc::new(AppState {
        auth_svc,
        registry,
        config,
    })
}
