pub mod api;
pub mod auth;
pub mod banks;
pub mod config;
pub mod db;
pub mod desk;
pub mod http;
pub mod telegram;
pub mod withdrawal;

/// Sets up `tracing` with `RUST_LOG`, falling back to the given level.
pub fn init_tracing(default_level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
