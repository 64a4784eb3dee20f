use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{Error, Result};

/// `errcode`/`errmsg` pair present in every WeChat API body.
///
/// | errcode | meaning                         |
/// | ------- | ------------------------------- |
/// | 0       | success (often omitted)         |
/// | 40001   | invalid credential / app secret |
/// | 40029   | invalid code                    |
/// | 42001   | access token expired            |
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiStatus {
    pub errcode: i64,
    pub errmsg: String,
}

impl ApiStatus {
    pub fn check(&self) -> Result<()> {
        if self.errcode != 0 {
            return Err(Error::Api {
                provider: "WeChat".to_string(),
                code: self.errcode,
                message: self.errmsg.clone(),
            });
        }
        Ok(())
    }
}

/// Body of `sns/oauth2/access_token`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub openid: String,
    pub scope: String,
    pub unionid: String,
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// Body of `sns/userinfo`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WeChatUser {
    pub openid: String,
    pub unionid: String,
    pub nickname: String,
    /// 1 male, 2 female, 0 unknown.
    pub sex: i64,
    pub province: String,
    pub city: String,
    pub country: String,
    pub headimgurl: String,
    pub privilege: Vec<String>,
}

impl WeChatUser {
    pub fn location(&self) -> String {
        format!("{}, {}, {}", self.country, self.province, self.city)
    }

    pub fn raw_data(&self) -> Map<String, Value> {
        let mut raw = Map::new();
        raw.insert("openid".into(), json!(self.openid));
        raw.insert("unionid".into(), json!(self.unionid));
        raw.insert("nickname".into(), json!(self.nickname));
        raw.insert("sex".into(), json!(self.sex));
        raw.insert("province".into(), json!(self.province));
        raw.insert("city".into(), json!(self.city));
        raw.insert("country".into(), json!(self.country));
        raw.insert("headimgurl".into(), json!(self.headimgurl));
        raw.insert("privilege".into(), json!(self.privilege));
        raw
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct UserInfoResponse {
    #[serde(flatten)]
    pub(crate) user: WeChatUser,
    #[serde(flatten)]
    pub(crate) status: ApiStatus,
}
