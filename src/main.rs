//! RPS Arena - unified CLI for the server and the terminal client.

use anyhow::Result;
use clap::Parser;
use rps_arena::{AppState, Cli, Command, Config, GameService, PlayerRepository, TokenKey};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            host,
            port,
            db_path,
        } => run_server(host, port, db_path).await,
        Command::Play {
            data_file,
            server_url,
        } => run_play(data_file, server_url).await,
    }
}

/// Run the REST API server.
async fn run_server(
    host: Option<String>,
    port: Option<u16>,
    db_path: Option<String>,
) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = Config::from_env();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(db_path) = db_path {
        config.database_url = db_path;
    }

    info!(
        db = %config.database_url,
        production = config.production,
        "Starting RPS Arena server"
    );

    let repository = PlayerRepository::new(config.database_url.clone())?;
    // Production keeps serving when the database is down at startup; every
    // request fails individually until it comes back. Development fails fast.
    match repository.run_migrations() {
        Ok(()) => info!("Database ready"),
        Err(e) if config.production => {
            warn!(error = %e, "Continuing without database connection");
        }
        Err(e) => return Err(e.into()),
    }

    let service = GameService::new(repository, TokenKey::new(config.jwt_secret.clone()));
    let state = AppState::new(service, config.production);

    let app = rps_arena::router(state).layer(tower::util::MapRequestLayer::new(
        |req: axum::extract::Request| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        },
    ));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Server ready at http://{}:{}/", config.host, config.port);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the terminal client.
async fn run_play(data_file: std::path::PathBuf, server_url: String) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    rps_arena::run_repl(data_file, server_url).await
}
