use axum::http::StatusCode;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id at the identity provider.
    pub sub: String,
    /// Login source the user signed in through.
    pub provider: String,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug)]
pub enum JwtError {
    InvalidToken,
    TokenCreation,
    TokenExpired,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::InvalidToken => write!(f, "Invalid JWT token"),
            JwtError::TokenCreation => write!(f, "Failed to create JWT token"),
            JwtError::TokenExpired => write!(f, "JWT token has expired"),
        }
    }
}

impl std::error::Error for JwtError {}

impl From<JwtError> for StatusCode {
    fn from(error: JwtError) -> Self {
        match error {
            JwtError::InvalidToken => StatusCode::UNAUTHORIZED,
            JwtError::TokenCreation => StatusCode::INTERNAL_SERVER_ERROR,
            JwtError::TokenExpired => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::InvalidToken,
        }
    }
}

pub fn create_token(user: &idp::User, expire_days: i64, jwt_secret: &str) -> Result<String, JwtError> {
    let now = Utc::now();
    let expire_time = now + Duration::days(expire_days);

    let claims = Claims {
        sub: user.user_id.clone(),
        provider: user.provider.clone(),
        name: user.name.clone(),
        exp: expire_time.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|_| JwtError::TokenCreation)
}

pub fn verify_token(token: &str, jwt_secret: &str) -> Result<Claims, JwtError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}
