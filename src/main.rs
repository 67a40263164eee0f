use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use withdrawal_desk::api::routes::{create_router, AppState};
use withdrawal_desk::auth::StaticKeyVerifier;
use withdrawal_desk::config::load_config;
use withdrawal_desk::db::client::open_store;
use withdrawal_desk::init_tracing;
use withdrawal_desk::telegram::TelegramClient;

#[derive(Debug, Parser)]
#[command(name = "withdrawal_desk", about = "Withdrawal processing service")]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    init_tracing(&config.logging.level);
    info!("Starting withdrawal processing service");

    let store = open_store(&config).await?;

    let telegram = config.telegram.as_ref().and_then(TelegramClient::from_config);
    if config.telegram.is_some() && telegram.is_none() {
        warn!("Telegram section present but TELEGRAM_BOT_TOKEN is not set, alerts disabled");
    }

    let state = Arc::new(AppState {
        store,
        verifier: Arc::new(StaticKeyVerifier::new(config.admin.operator_key.clone())),
        telegram,
    });

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Listening on http://{}", address);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down withdrawal processing service");
        })
        .await?;

    Ok(())
}
