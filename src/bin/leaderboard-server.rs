//! Leaderboard service entry point
//!
//! Opens the score store and serves the REST API. An unreadable store at
//! startup is fatal.

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use ball_jump::server::{ServerConfig, Store, serve};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();
    log::info!("Leaderboard starting with store {}", config.db_path);

    let store = match Store::open(&config.db_path) {
        Ok(store) => store,
        Err(e) => {
            log::error!("Store connection error: {}", e);
            std::process::exit(1);
        }
    };

    serve(config, store).await
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The service only runs natively
}
