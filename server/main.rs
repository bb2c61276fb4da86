/// sightline server
///
/// Accepts photos over HTTP and answers with one sentence: a scene
/// description, a banknote denomination, or the printed text in the image.
/// Results can be sent back to `/speak` to be read aloud on the host.
///
/// Run with:
///   cargo run --bin sightline-server --release -- --help
/// Then open http://127.0.0.1:5000

mod config;
mod state;
mod routes;
mod handlers;
mod util;

use std::error::Error;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use env_logger::{Builder, Env};
use log::info;
use tiny_http::Server;

use config::ServerConfig;
use state::AppState;

fn main() -> Result<(), Box<dyn Error>> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let config = ServerConfig::parse();

    let shared_state = Arc::new(AppState::from_config(&config)?);
    let server = Server::http(&config.addr)
        .map_err(|e| format!("failed to bind {}: {}", config.addr, e))?;

    info!("listening on http://{}", config.addr);
    info!(
        "uploads go to {}; currency model {}",
        config.upload_dir.display(),
        if shared_state.assistant.currency_loaded() { "loaded" } else { "not loaded" }
    );

    // One thread per request so a slow engine call does not stall others.
    for request in server.incoming_requests() {
        let state = Arc::clone(&shared_state);
        thread::spawn(move || routes::dispatch(request, state));
    }
    Ok(())
}
