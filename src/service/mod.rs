pub(crate) mod auth;
mod errors;
pub use auth::{AuthService, LoginInfo, QrCodeLogin};
pub use errors::Error;
