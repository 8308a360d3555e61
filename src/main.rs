//! Runs the user record server on port 8080.
//!
//! Log output is controlled with `RUST_LOG` (default `info`).

use env_logger::Env;
use log::info;

use microcrud_rs::{api, HttpServer, ServerConfig, UserStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let store = UserStore::seeded();
    info!("Seeded store with {count} users", count = store.len());

    let server = HttpServer::new(ServerConfig::default());
    api::register_routes(&server, store.into_shared()).await;

    // A bind failure ends the process with a non-zero status.
    server.start().await?;

    Ok(())
}
