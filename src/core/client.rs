use crate::core::query::Query;
use crate::domain::ports::{ConfigProvider, DataSource};
use crate::domain::session::Session;
use crate::utils::error::{PortalError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// REST client for the hosted data API (`/rest/v1` tables, `/storage/v1` objects).
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: Url,
    anon_key: String,
    access_token: Option<String>,
}

impl RestClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()?;
        let base_url = Url::parse(config.api_url().trim_end_matches('/'))?;

        Ok(Self {
            client,
            base_url,
            anon_key: config.anon_key().to_string(),
            access_token: None,
        })
    }

    /// Requests made through the returned client carry the session's token.
    pub fn with_session(mut self, session: &Session) -> Self {
        self.access_token = Some(session.access_token.clone());
        self
    }

    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl DataSource for RestClient {
    async fn select(&self, query: &Query) -> Result<Vec<serde_json::Value>> {
        let endpoint = self.endpoint(&format!("rest/v1/{}", query.table_name()));
        let pairs = query.to_pairs();

        tracing::debug!("Selecting from {} with {:?}", endpoint, pairs);
        let response = self
            .client
            .get(&endpoint)
            .query(&pairs)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                "Query on '{}' failed with {}: {}",
                query.table_name(),
                status,
                body
            );
            return Err(PortalError::StatusError {
                status: status.as_u16(),
                body,
            });
        }

        let json_data: serde_json::Value = response.json().await?;
        let rows = match json_data {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Null => Vec::new(),
            // A single object is treated as a one-row result.
            other => vec![other],
        };

        tracing::debug!("Received {} rows from '{}'", rows.len(), query.table_name());
        Ok(rows)
    }

    fn public_object_url(&self, bucket: &str, path: &str) -> Result<String> {
        if bucket.is_empty() || path.trim_matches('/').is_empty() {
            return Err(PortalError::validation("Object bucket and path are required"));
        }
        let url = Url::parse(&self.endpoint(&format!(
            "storage/v1/object/public/{}/{}",
            bucket,
            path.trim_start_matches('/')
        )))?;
        Ok(url.to_string())
    }
}
