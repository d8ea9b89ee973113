use crate::core::query::Query;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Remote data API as seen by the feeds: row selection and public object URLs.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn select(&self, query: &Query) -> Result<Vec<serde_json::Value>>;

    fn public_object_url(&self, bucket: &str, path: &str) -> Result<String>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_url(&self) -> &str;
    fn anon_key(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
}
