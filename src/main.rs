use tracing::info;
use tracing_subscriber::EnvFilter;

use propdesk::infrastructure::config::AppConfig;
use propdesk::interfaces::http::start_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    info!(db = %config.database_path, "Loaded configuration");

    let state = propdesk::build_state(&config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    start_server(&config, state)?.await
}
