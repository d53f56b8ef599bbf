use clap::Parser;
use miette::{IntoDiagnostic, Result};
use quarters::maintenance::OpenCollaboration;
use quarters::notify::LogNotifier;
use quarters::settings::Settings;
use quarters::web::{self, AppState, StaticSubjectVerifier};
use migration::MigratorTrait;
use sea_orm::Database;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "quarters", version, about = "Property management portal API")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    // load settings
    let settings = Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    // init storage and bring the schema up to date
    let db = Database::connect(&settings.database.url)
        .await
        .into_diagnostic()?;
    migration::Migrator::up(&db, None).await.into_diagnostic()?;

    let state = AppState {
        settings: Arc::new(settings),
        db,
        notifier: Arc::new(LogNotifier),
        verifier: Arc::new(StaticSubjectVerifier),
        comment_policy: Arc::new(OpenCollaboration),
    };

    web::serve(state).await?;
    Ok(())
}
