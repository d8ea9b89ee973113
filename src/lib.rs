pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::config::PortalConfig;
pub use crate::core::client::RestClient;
pub use crate::core::identifier::{
    format_identifier, is_valid_email_domain, is_valid_identifier, CorporateEmail, Cpf,
};
pub use crate::core::portal::Portal;
pub use crate::core::resource::Resource;
pub use crate::domain::session::Session;
pub use crate::utils::error::{PortalError, Result};
