use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use users_service::{api::server, config::Settings, db::repo};

#[derive(Parser)]
#[command(name = "users-service")]
#[command(about = "User registry web service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Insert the development fixture users
    SeedDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "users_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let settings = Settings::load()?;
    settings.validate()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            tracing::info!("Starting users service");
            server::start_server(&settings).await?;
        }
        Commands::SeedDb => {
            let pool = server::prepare_database(&settings).await?;
            repo::seed(&pool).await?;
            tracing::info!("Seeded fixture users");
        }
    }

    Ok(())
}
