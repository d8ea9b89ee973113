use crate::domain::model::{PeriodFilter, Role, StatusFilter};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "portal")]
#[command(about = "Corporate portal client: CPF tools and data API queries")]
pub struct CliConfig {
    /// TOML configuration file; falls back to PORTAL_* environment variables
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    /// Access token of the signed-in user; the anon key is used otherwise
    #[arg(long, env = "PORTAL_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// User id the token belongs to
    #[arg(long, env = "PORTAL_USER_ID")]
    pub user: Option<String>,

    #[arg(long, default_value = "broker", value_parser = parse_role)]
    pub role: Role,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Taxpayer identifier tools
    Cpf {
        #[command(subcommand)]
        action: CpfAction,
    },
    /// Check that an email belongs to an allowed domain
    Email { email: String },
    News {
        #[arg(long)]
        category: Option<i64>,
    },
    Categories,
    Links,
    Commissions {
        #[arg(long, default_value = "month", value_parser = parse_period)]
        period: PeriodFilter,
        /// Another user's commissions (admins and managers only)
        #[arg(long)]
        of: Option<String>,
    },
    Metas {
        #[arg(long)]
        all: bool,
    },
    Appointments {
        #[arg(long, default_value = "all", value_parser = parse_status)]
        status: StatusFilter,
    },
    Champions {
        #[arg(long, default_value = "month", value_parser = parse_period)]
        period: PeriodFilter,
        #[arg(long)]
        limit: Option<usize>,
    },
    Profile {
        id: Option<String>,
    },
    /// Search people by name
    Search { term: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum CpfAction {
    Validate { cpf: String },
    Format { cpf: String },
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse().map_err(|e: crate::utils::error::PortalError| e.to_string())
}

fn parse_period(raw: &str) -> Result<PeriodFilter, String> {
    raw.parse().map_err(|e: crate::utils::error::PortalError| e.to_string())
}

fn parse_status(raw: &str) -> Result<StatusFilter, String> {
    raw.parse().map_err(|e: crate::utils::error::PortalError| e.to_string())
}
