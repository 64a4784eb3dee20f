use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::core::jwt::Claims;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: String,
    pub provider: String,
    pub name: String,
    pub expires_at: i64,
}

impl From<Claims> for UserResponse {
    fn from(claims: Claims) -> Self {
        UserResponse {
            user_id: claims.sub,
            provider: claims.provider,
            name: claims.name,
            expires_at: claims.exp,
        }
    }
}

pub async fn get_current_user(Extension(claims): Extension<Claims>) -> Json<UserResponse> {
    Json(UserResponse::from(claims))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use idp::wechat::fake;
    use tower::ServiceExt;

    use super::*;
    use crate::core::jwt;
    use crate::server::router;
    use crate::test_support;

    fn me(token: Option<&str>) -> Request<Body> {
        let mut request = Request::get("/user/me");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        request.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_current_user() {
        let state = test_support::app_state(fake::unreachable().await);
        let user = idp::User {
            user_id: fake::OPEN_ID.to_string(),
            provider: "wechat".to_string(),
            name: "Tea Drinker".to_string(),
            ..Default::default()
        };
        let token = jwt::create_token(&user, 1, test_support::JWT_SECRET).unwrap();

        let response = router(state).oneshot(me(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: UserResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.user_id, fake::OPEN_ID);
        assert_eq!(body.provider, "wechat");
        assert_eq!(body.name, "Tea Drinker");
    }

    #[tokio::test]
    async fn test_requires_token() {
        let state = test_support::app_state(fake::unreachable().await);
        let response = router(state.clone()).oneshot(me(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router(state).oneshot(me(Some("garbage"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
