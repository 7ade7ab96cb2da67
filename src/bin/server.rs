use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, error, info};
use warp::{self, Filter};

use noughts::config::ServerConfig;
use noughts::constants::WS_PATH;
use noughts::core::server::{GameServer, SharedGameServer};
use noughts::handlers::websocket::handle_ws_client;

#[tokio::main]
async fn main() {
    // Load .env before logging is configured; RUST_LOG may come from it
    let dotenv_result = dotenvy::dotenv();

    // Initialize logging
    env_logger::init();

    match dotenv_result {
        Ok(path) => info!("Environment variables loaded from {}", path.display()),
        Err(_) => debug!("No .env file found"),
    }

    // Load config from the environment
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration: host={}, port={}", config.host, config.port);

    // Create the game server
    let server: SharedGameServer = Arc::new(GameServer::new());

    // Create WebSocket route
    let ws_route = warp::path(WS_PATH)
        .and(warp::ws())
        .and(with_server(server.clone()))
        .map(|ws: warp::ws::Ws, server| {
            info!("New websocket connection");
            ws.on_upgrade(move |socket| handle_ws_client(socket, server))
        });

    // Create health check route
    let health_route = warp::path("health").map(|| "OK");

    // Allow the configured browser origins
    let cors = warp::cors()
        .allow_origins(config.allowed_origins.iter().map(|origin| origin.as_str()))
        .allow_methods(vec!["GET"]);

    // Combine routes
    let routes = ws_route.or(health_route).with(cors);

    // Build the server address
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    // Start the server
    info!("Starting noughts server on {}", addr);

    warp::serve(routes).run(addr).await;
}

// Helper function to include the game server in request handling
fn with_server(
    server: SharedGameServer,
) -> impl Filter<Extract = (SharedGameServer,), Error = Infallible> + Clone {
    warp::any().map(move || server.clone())
}
