use clap::Parser;
use portal_client::config::cli::{Command, CpfAction};
use portal_client::core::search::SearchOutcome;
use portal_client::utils::error::ErrorSeverity;
use portal_client::utils::{logger, validation::Validate};
use portal_client::{
    format_identifier, is_valid_identifier, CliConfig, CorporateEmail, Portal,
    PortalConfig, PortalError, Resource, RestClient, Session,
};
use serde::Serialize;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli.command);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            if e.is_retryable() {
                eprintln!("🔁 This failure is usually temporary; run the command again");
            }
            exit_code_for(e.severity())
        }
    };

    std::process::exit(exit_code);
}

fn exit_code_for(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<i32, PortalError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(0)
}

/// Prints the loaded data, or reports the error the resource captured.
fn report<T: Serialize>(resource: &Resource<T>) -> Result<i32, PortalError> {
    match (resource.data(), resource.error()) {
        (_, Some(message)) => {
            eprintln!("❌ {}", message);
            Ok(resource.error_severity().map_or(1, exit_code_for))
        }
        (Some(data), None) => print_json(data),
        (None, None) => Ok(0),
    }
}

fn load_config(cli: &CliConfig) -> Result<PortalConfig, PortalError> {
    let config = match &cli.config {
        Some(path) => PortalConfig::from_file(path)?,
        None => PortalConfig::from_env()?,
    };
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e);
    }
    Ok(config)
}

async fn run(cli: CliConfig) -> Result<i32, PortalError> {
    // Identifier tools are pure and never need the API.
    match &cli.command {
        Command::Cpf { action } => {
            return Ok(match action {
                CpfAction::Validate { cpf } => {
                    let valid = is_valid_identifier(cpf);
                    println!("{}", if valid { "valid" } else { "invalid" });
                    if valid {
                        0
                    } else {
                        1
                    }
                }
                CpfAction::Format { cpf } => {
                    println!("{}", format_identifier(cpf));
                    0
                }
            });
        }
        Command::Email { email } => {
            return Ok(match CorporateEmail::parse(email) {
                Ok(email) => {
                    println!("allowed: {}", email);
                    0
                }
                Err(e) => {
                    println!("not allowed: {}", e.user_friendly_message());
                    1
                }
            });
        }
        _ => {}
    }

    let config = load_config(&cli)?;
    let session = match (&cli.user, &cli.token) {
        (Some(user), Some(token)) => Some(Session::new(user.clone(), token.clone(), cli.role)),
        _ => None,
    };

    let mut client = RestClient::new(&config)?;
    if let Some(session) = &session {
        client = client.with_session(session);
    }
    let portal = Portal::new(client, session, &config);
    let today = chrono::Local::now().date_naive();

    tracing::info!("Running {:?} against {}", cli.command, config.api.url);

    match cli.command {
        Command::Cpf { .. } | Command::Email { .. } => Ok(0),
        Command::News { category } => {
            let mut news = Resource::new();
            report(news.load(portal.news(category)).await)
        }
        Command::Categories => {
            let mut categories = Resource::new();
            report(categories.load(portal.categories()).await)
        }
        Command::Links => {
            let mut links = Resource::new();
            report(links.load(portal.useful_links()).await)
        }
        Command::Commissions { period, of } => {
            let (rows, totals) = portal.commissions(of.as_deref(), period, today).await?;
            print_json(&serde_json::json!({ "commissions": rows, "totals": totals }))
        }
        Command::Metas { all } => {
            let mut metas = Resource::new();
            report(metas.load(portal.metas(all)).await)
        }
        Command::Appointments { status } => {
            let mut appointments = Resource::new();
            report(appointments.load(portal.appointments(status)).await)
        }
        Command::Champions { period, limit } => {
            let mut champions = Resource::new();
            report(champions.load(portal.champions(period, today, limit)).await)
        }
        Command::Profile { id } => {
            let (profile, avatar_url) = portal.profile(id.as_deref()).await?;
            print_json(&serde_json::json!({ "profile": profile, "avatar_url": avatar_url }))
        }
        Command::Search { term } => match portal.search_users(&term).await? {
            SearchOutcome::Results(profiles) => print_json(&profiles),
            SearchOutcome::Superseded => Ok(0),
        },
    }
}
