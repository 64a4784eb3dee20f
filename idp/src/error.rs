use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The request never produced a readable response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The provider answered with something that is not the expected JSON.
    #[error("failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("missing {0} parameter")]
    MissingParam(&'static str),
    /// The provider reported a failure in its response body.
    #[error("{provider} API error {code}: {message}")]
    Api {
        provider: String,
        code: i64,
        message: String,
    },
    #[error("session has no access token, authorize it first")]
    NotAuthorized,
    #[error("no auth URL available")]
    NoAuthUrl,
    #[error("refresh token not supported for {0} provider")]
    RefreshNotSupported(String),
    #[error("session was not created by the {0} provider")]
    SessionMismatch(String),
    #[error("session cannot be authorized by provider {0}")]
    ProviderMismatch(String),
}
