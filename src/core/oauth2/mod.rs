//! Login providers as seen by the application, and the registry of
//! configured login sources built from them.

use serde::{Deserialize, Serialize};

mod registry;
mod wechat;

pub use registry::Registry;
pub use wechat::WeChatProvider;

/// A configured login source.
#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    /// Unique name, used in the login URLs.
    pub name: String,
    /// Kind of provider backing this source, e.g. `wechat`.
    pub provider: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Endpoint overrides for providers that can be self-hosted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomUrlSettings {
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    pub profile_url: Option<String>,
}

pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn display_name(&self) -> &str;

    fn icon_html(&self, size: u32) -> String;

    fn custom_url_settings(&self) -> Option<CustomUrlSettings>;

    /// Builds the provider that runs the OAuth2 flow for `source`.
    fn create_goth_provider(
        &self,
        provider_name: &str,
        callback_url: &str,
        source: &Source,
    ) -> idp::Result<Box<dyn idp::Provider>>;
}

/// Name and display name shared by every provider.
#[derive(Debug, Clone)]
pub(crate) struct BaseProvider {
    pub(crate) name: String,
    pub(crate) display_name: String,
}
