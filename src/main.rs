use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notebot::api::{self, ApiAuth};
use notebot::bot::NoteBot;
use notebot::config::BotConfig;
use notebot::max::{self, MaxClient};
use notebot::store::NoteStore;

#[derive(Parser)]
#[command(name = "notebot")]
#[command(about = "Conversational note-taking bot")]
struct Cli {
    /// Path of the JSON note store (overrides NOTEBOT_DATA_FILE)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Long-poll the Max Bot API and answer users (default)
    Run,
    /// Serve the HTTP event API for an external chat adapter
    Serve {
        /// Port for the HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "notebot=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_store(cli_path: Option<PathBuf>, config: &BotConfig) -> anyhow::Result<NoteStore> {
    let store = match cli_path.or_else(|| config.data_file.clone()) {
        Some(path) => NoteStore::open(path),
        None => NoteStore::open_default(),
    }
    .context("Failed to open note store")?;

    let users = store.users().context("Failed to read note store")?;
    tracing::info!("Note store holds notes for {} users", users.len());

    Ok(store.with_id_strategy(config.id_strategy))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    let config = BotConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    let store = open_store(cli.data, &config)?;
    let bot = Arc::new(NoteBot::new(store));

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let client = MaxClient::new(&config.api_url, &config.token);
            max::run_polling(bot, client, config.poll_timeout_secs).await?;
        }
        Commands::Serve { port } => {
            tracing::info!("Starting notebot event API on port {}", port);

            let app = api::create_router(bot, ApiAuth::with_token(&config.token));

            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!("notebot listening on http://127.0.0.1:{}", port);

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    tokio::signal::ctrl_c().await.ok();
                })
                .await?;
        }
    }

    Ok(())
}
