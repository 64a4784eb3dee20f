use std::time::Duration;

use delegate::delegate;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};

use crate::error::Result;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin wrapper around the HTTP client shared by the provider adapters.
#[derive(Clone, Debug)]
pub(crate) struct Client {
    client: reqwest::Client,
}

impl Client {
    /// Creates a new `Client` with optional default headers.
    /// # Arguments
    /// * `headers`: headers sent with every request, `None` for the defaults.
    pub(crate) fn new(headers: Option<HeaderMap>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .default_headers(headers.unwrap_or_else(Self::default_header))
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// GETs `url` with `query` and returns the raw body, whatever the status.
    ///
    /// The providers report failures inside a 200 body, so status codes are
    /// left for the caller's decoding step.
    pub(crate) async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let response = self.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::trace!(%status, url, "Provider response: {}", body);
        Ok(body)
    }

    fn default_header() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("teaauth-idp/", env!("CARGO_PKG_VERSION"))),
        );
        headers
    }
}

impl Client {
    delegate! {
        to self.client {
            pub(crate) fn get(&self, url: &str) -> reqwest::RequestBuilder;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::Router;
    use axum::extract::Query;
    use axum::routing::get;

    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let headers = HeaderMap::new();
        assert!(Client::new(Some(headers)).is_ok());
    }

    #[tokio::test]
    async fn test_get_text_sends_query() {
        let app = Router::new().route(
            "/echo",
            get(async |Query(q): Query<HashMap<String, String>>| {
                format!("{}-{}", q["a"], q["b"])
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let client = Client::new(None).unwrap();
        let body = client
            .get_text(&format!("http://{addr}/echo"), &[("a", "1"), ("b", "x y")])
            .await
            .unwrap();
        assert_eq!(body, "1-x y");
    }
}
