//! Strategic Execution Monitoring gateway - organization hierarchy API.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use domain::Role;
use gateway_lib::config::GatewayConfig;
use gateway_lib::middleware::SessionUser;
use org_service_lib::MigrateAction;

#[derive(Parser)]
#[command(name = "gateway")]
#[command(about = "Organization hierarchy service for Strategic Execution Monitoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        #[arg(long, env = "SERVER_HOST")]
        host: Option<String>,
        #[arg(long, env = "SERVER_PORT")]
        port: Option<u16>,
        /// Keep records, sessions and rate limits in process
        #[arg(long)]
        in_memory: bool,
    },
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommand,
    },
    /// Session token commands
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },
}

#[derive(Subcommand)]
enum MigrateCommand {
    /// Run all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Drop all tables and re-run migrations
    Fresh,
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Mint a session token for a user
    Issue {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        name: String,
        /// admin, operator or viewer
        #[arg(long, default_value = "viewer")]
        role: Role,
    },
    /// Invalidate a session token
    Revoke {
        #[arg(long)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = GatewayConfig::from_env();

    match cli.command {
        Commands::Serve {
            host,
            port,
            in_memory,
        } => {
            let mut config = if in_memory { config.in_memory() } else { config };
            if let Some(host) = host {
                config.service.host = host;
            }
            if let Some(port) = port {
                config.service.port = port;
            }
            gateway_lib::run_server(config).await?;
        }
        Commands::Migrate { action } => {
            let action = match action {
                MigrateCommand::Up => MigrateAction::Up,
                MigrateCommand::Down => MigrateAction::Down,
                MigrateCommand::Status => MigrateAction::Status,
                MigrateCommand::Fresh => MigrateAction::Fresh,
            };
            org_service_lib::run_migrations(action).await?;
        }
        Commands::Session { action } => match action {
            SessionCommand::Issue {
                user_id,
                name,
                role,
            } => {
                let user = SessionUser {
                    user_id,
                    name,
                    role,
                };
                let token = gateway_lib::issue_session(&config, user).await?;
                println!("{}", token);
            }
            SessionCommand::Revoke { token } => {
                gateway_lib::revoke_session(&config, &token).await?;
            }
        },
    }

    Ok(())
}
