use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to reach {endpoint} with params {params}: {source}")]
    Connection {
        endpoint: String,
        params: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("API returned {code} {reason}: {body}")]
    WrongStatus {
        code: u16,
        reason: String,
        body: String,
    },
    #[error("API returned invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of raw homework status payloads.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    async fn fetch(&self, from_date: i64) -> Result<Value, ApiError>;
}

#[derive(Clone)]
pub struct PracticumClient {
    http: Client,
    endpoint: Url,
    token: String,
}

impl fmt::Debug for PracticumClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PracticumClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl PracticumClient {
    pub fn from_config(cfg: &Config) -> Result<Self, crate::config::ConfigError> {
        Ok(Self::with_endpoint(
            cfg.secrets.practicum_token.clone(),
            cfg.endpoint()?,
        ))
    }

    pub fn with_endpoint(token: String, endpoint: Url) -> Self {
        let http = Client::builder()
            .user_agent(concat!("homework-bot/", env!("CARGO_PKG_VERSION")))
            .no_proxy()
            .build()
            .unwrap_or_default();
        Self {
            http,
            endpoint,
            token,
        }
    }

    pub fn build_request(&self, from_date: i64) -> reqwest::Result<reqwest::Request> {
        self.http
            .get(self.endpoint.clone())
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .build()
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value, ApiError> {
        let params = format!("from_date={}", from_date);
        let connection = |source: reqwest::Error| ApiError::Connection {
            endpoint: self.endpoint.to_string(),
            params: params.clone(),
            source,
        };

        let request = self.build_request(from_date).map_err(connection)?;
        debug!(url=%request.url(), from_date, "requesting homework statuses");
        let res = self.http.execute(request).await.map_err(connection)?;

        let status = res.status();
        if status != StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::WrongStatus {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let body = res.bytes().await.map_err(connection)?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PracticumClient {
        PracticumClient::with_endpoint(
            "secret".into(),
            Url::parse("https://practicum.example/api/user_api/homework_statuses/").unwrap(),
        )
    }

    #[test]
    fn request_carries_oauth_header_and_from_date() {
        let req = client().build_request(1_700_000_000).unwrap();
        assert_eq!(req.method(), reqwest::Method::GET);
        assert_eq!(
            req.headers().get("Authorization").unwrap(),
            "OAuth secret"
        );
        assert_eq!(req.url().query(), Some("from_date=1700000000"));
        assert_eq!(req.url().path(), "/api/user_api/homework_statuses/");
    }

    #[test]
    fn debug_hides_token() {
        let dbg = format!("{:?}", client());
        assert!(!dbg.contains("secret"));
    }
}
