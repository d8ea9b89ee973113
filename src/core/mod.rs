pub mod client;
pub mod feeds;
pub mod identifier;
pub mod portal;
pub mod query;
pub mod resource;
pub mod search;

pub use crate::domain::ports::{ConfigProvider, DataSource};
pub use crate::utils::error::Result;
