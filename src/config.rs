use std::path::PathBuf;

use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;

use crate::core::oauth2::Source;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Public base URL, used to build the OAuth2 callback URLs.
    pub app_url: String,
    pub jwt_secret: String,
    #[serde(default = "default_token_expire_days")]
    pub token_expire_days: i64,
    /// Seconds a started login may take before its state is rejected.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    #[serde(default)]
    pub sources: Vec<Source>,
}

fn default_token_expire_days() -> i64 {
    30
}

fn default_session_ttl_secs() -> u64 {
    600
}

impl Config {
    pub fn load(config_file: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let config = ConfigLoader::builder()
            .add_source(File::from(config_file.into()).required(false))
            .add_source(Environment::with_prefix("TEAAUTH").separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Where the provider sends the user back to after login through `source`.
    pub fn callback_url(&self, source: &str) -> String {
        format!(
            "{}/user/oauth2/{}/callback",
            self.app_url.trim_end_matches('/'),
            source
        )
    }
}
