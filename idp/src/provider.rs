//! Capability contracts shared by every identity provider adapter.
//!
//! A [`Provider`] starts the authorization code flow and fetches the user
//! profile; the [`Session`] it hands out carries the flow state across the
//! redirect round-trip and performs the code exchange.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Query parameters handed back by the provider's redirect.
pub trait Params: Send + Sync {
    fn get(&self, key: &str) -> Option<&str>;
}

impl Params for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        HashMap::get(self, key).map(String::as_str)
    }
}

impl Params for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        BTreeMap::get(self, key).map(String::as_str)
    }
}

#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn set_name(&mut self, name: &str);

    fn debug(&mut self, debug: bool);

    /// Builds a fresh session whose auth URL embeds `state`.
    fn begin_auth(&self, state: &str) -> Result<Box<dyn Session>>;

    /// Restores a session previously produced by [`Session::marshal`].
    fn unmarshal_session(&self, data: &str) -> Result<Box<dyn Session>>;

    async fn fetch_user(&self, session: &dyn Session) -> Result<User>;

    fn refresh_token_available(&self) -> bool;

    async fn refresh_token(&self, refresh_token: &str) -> Result<Token>;

    fn as_any(&self) -> &dyn Any;
}

#[async_trait]
pub trait Session: Send + Sync + Debug {
    fn get_auth_url(&self) -> Result<String>;

    /// Exchanges the `code` in `params` for an access token and keeps it on
    /// the session. Returns the access token.
    async fn authorize(&mut self, provider: &dyn Provider, params: &dyn Params) -> Result<String>;

    fn marshal(&self) -> String;

    fn as_any(&self) -> &dyn Any;
}

/// Provider-neutral user profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub raw_data: Map<String, Value>,
    pub provider: String,
    pub email: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub nick_name: String,
    pub description: String,
    pub user_id: String,
    pub avatar_url: String,
    pub location: String,
    pub access_token: String,
    pub refresh_token: String,
    /// When the access token stops being accepted, if the provider said.
    pub expires_at: Option<DateTime<Utc>>,
    pub id_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    pub expires_in: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_lookup() {
        let map = HashMap::from([("code".to_string(), "abc".to_string())]);
        let params: &dyn Params = &map;
        assert_eq!(params.get("code"), Some("abc"));
        assert_eq!(params.get("state"), None);

        let map = BTreeMap::from([("state".to_string(), "xyz".to_string())]);
        let params: &dyn Params = &map;
        assert_eq!(params.get("state"), Some("xyz"));
    }
}
