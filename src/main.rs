use tracing::{error, info};

use effuse::chat::ChatState;
use effuse::server::{handle_connection, ChatServer};
use effuse::Config;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = effuse::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        effuse::logging::init_console_only(&config.logging.level);
    }

    info!("Effuse - Denizens of the Internet Effusing");

    let server = match ChatServer::bind(&config.server).await {
        Ok(server) => server,
        Err(e) => {
            error!(
                "Failed to bind {}:{}: {}",
                config.server.host, config.server.port, e
            );
            std::process::exit(1);
        }
    };

    let state = ChatState::shared();
    if let Err(e) = server
        .run(move |stream, addr| handle_connection(stream, addr, state.clone()))
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
