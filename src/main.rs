use chika::{import, settings, storage, web};
use clap::{Parser, Subcommand};
use miette::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "chika",
    version,
    about = "Average land-price records over a REST API"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Replace the stored properties with rows from a survey JSON export
    Import {
        /// Path to the exported survey file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    // load settings
    let settings = settings::Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    // init storage (database + schema)
    let db = storage::init(&settings.database).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => web::serve(settings, db).await?,
        Command::Import { path } => {
            let report = import::import_file(&db, &path).await?;
            println!(
                "Imported {} properties ({} rows read, {} dropped)",
                report.inserted, report.read, report.dropped
            );
        }
    }
    Ok(())
}
