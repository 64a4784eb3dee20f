use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::core::jwt::JwtError;
use crate::core::session;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// The identity provider failed or answered with an error.
    #[error("Bad Gateway: {0}")]
    BadGateway(String),
    #[error("InternalServerError: {0}")]
    InternalServerError(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Error::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<idp::Error> for Error {
    fn from(error: idp::Error) -> Self {
        match error {
            idp::Error::MissingParam(_) => Error::BadRequest(error.to_string()),
            idp::Error::Transport(_) | idp::Error::Decode(_) | idp::Error::Api { .. } => {
                Error::BadGateway(error.to_string())
            }
            _ => Error::InternalServerError(error.to_string()),
        }
    }
}

impl From<session::Error> for Error {
    fn from(error: session::Error) -> Self {
        Error::InternalServerError(error.to_string())
    }
}

impl From<JwtError> for Error {
    fn from(error: JwtError) -> Self {
        Error::InternalServerError(error.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
