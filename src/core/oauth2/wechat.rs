use idp::Provider as _;

use super::{BaseProvider, CustomUrlSettings, Provider, Source};
use crate::core::svg;

/// WeChat login, backed by [`idp::wechat::WeChatProvider`].
#[derive(Debug, Clone)]
pub struct WeChatProvider {
    base: BaseProvider,
    scopes: Vec<String>,
}

impl WeChatProvider {
    pub fn new(name: &str, display_name: &str, scopes: Vec<String>) -> Self {
        Self {
            base: BaseProvider {
                name: name.to_string(),
                display_name: display_name.to_string(),
            },
            scopes,
        }
    }
}

impl Provider for WeChatProvider {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn display_name(&self) -> &str {
        &self.base.display_name
    }

    fn icon_html(&self, size: u32) -> String {
        svg::render_html_or("gitea-wechat", "gitea-openid", size, "tw-mr-2")
    }

    fn custom_url_settings(&self) -> Option<CustomUrlSettings> {
        None
    }

    fn create_goth_provider(
        &self,
        provider_name: &str,
        callback_url: &str,
        source: &Source,
    ) -> idp::Result<Box<dyn idp::Provider>> {
        let scopes = self
            .scopes
            .iter()
            .chain(source.scopes.iter())
            .cloned()
            .collect();
        let mut provider = idp::wechat::WeChatProvider::new(
            &source.client_id,
            &source.client_secret,
            callback_url,
            scopes,
        )?;
        provider.set_name(provider_name);
        Ok(Box::new(provider))
    }
}
