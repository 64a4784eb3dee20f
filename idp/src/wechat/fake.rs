//! Local stand-in for the WeChat token and profile endpoints.

use std::collections::HashMap;

use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::json;

use super::{AUTH_URL, Endpoints};

pub const APP_ID: &str = "wx520c15f417810387";
pub const APP_SECRET: &str = "fake-app-secret";
pub const CODE: &str = "061Ab2ll2dNQf44gJpkl2bJ7zK0Ab2lv";
/// Answered with `errcode` 40029.
pub const INVALID_CODE: &str = "invalid-code";
/// Answered with a body that is not JSON.
pub const GARBLED_CODE: &str = "garbled";
pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
pub const REFRESH_TOKEN: &str = "REFRESH_TOKEN";
pub const OPEN_ID: &str = "oLVPpjqs9BhvzwPj5A-vTYAX3GLc";
pub const UNION_ID: &str = "o6_bmasdasdsad6_2sgVt7hMZOPfL";

/// Starts the fake on an ephemeral port and returns endpoints pointing at it.
///
/// The auth endpoint stays the real one since it is only ever a redirect target.
pub async fn spawn() -> Endpoints {
    let app = Router::new()
        .route("/sns/oauth2/access_token", get(access_token))
        .route("/sns/userinfo", get(user_info));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake WeChat server");
    let addr = listener
        .local_addr()
        .expect("Failed to read fake WeChat address");
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Fake WeChat server failed");
    });
    tracing::trace!("Fake WeChat server listening on {}", addr);
    Endpoints {
        auth_url: AUTH_URL.to_string(),
        token_url: format!("http://{addr}/sns/oauth2/access_token"),
        profile_url: format!("http://{addr}/sns/userinfo"),
    }
}

/// Endpoints on a port nobody listens on.
pub async fn unreachable() -> Endpoints {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener
        .local_addr()
        .expect("Failed to read probe address");
    drop(listener);
    Endpoints {
        auth_url: AUTH_URL.to_string(),
        token_url: format!("http://{addr}/sns/oauth2/access_token"),
        profile_url: format!("http://{addr}/sns/userinfo"),
    }
}

async fn access_token(Query(q): Query<HashMap<String, String>>) -> Response {
    let arg = |key: &str| q.get(key).map(String::as_str).unwrap_or_default();
    if arg("appid") != APP_ID || arg("secret") != APP_SECRET {
        return Json(json!({"errcode": 40001, "errmsg": "invalid credential"})).into_response();
    }
    if arg("grant_type") != "authorization_code" {
        return Json(json!({"errcode": 40002, "errmsg": "invalid grant_type"})).into_response();
    }
    match arg("code") {
        GARBLED_CODE => "<html>502 Bad Gateway</html>".into_response(),
        CODE => Json(json!({
            "access_token": ACCESS_TOKEN,
            "expires_in": 7200,
            "refresh_token": REFRESH_TOKEN,
            "openid": OPEN_ID,
            "scope": "snsapi_userinfo",
            "unionid": UNION_ID,
        }))
        .into_response(),
        _ => Json(json!({"errcode": 40029, "errmsg": "invalid code"})).into_response(),
    }
}

async fn user_info(Query(q): Query<HashMap<String, String>>) -> Response {
    if q.get("access_token").map(String::as_str) != Some(ACCESS_TOKEN) {
        return Json(json!({"errcode": 42001, "errmsg": "access_token expired"})).into_response();
    }
    Json(json!({
        "openid": q.get("openid").cloned().unwrap_or_default(),
        "nickname": "Tea Drinker",
        "sex": 2,
        "province": "Guangdong",
        "city": "Shenzhen",
        "country": "China",
        "headimgurl": "https://thirdwx.qlogo.cn/mmopen/avatar/132",
        "privilege": [],
        "unionid": UNION_ID,
    }))
    .into_response()
}
