use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filebrowser::{AppState, Config};

#[derive(Parser, Debug)]
#[command(name = "filebrowser")]
#[command(about = "Minimal HTTP file browser with directory listings and downloads")]
#[command(version)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "FILEBROWSER_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, env = "FILEBROWSER_BIND")]
    bind: Option<String>,

    /// Root directory to serve files from
    #[arg(short, long, env = "FILEBROWSER_ROOT")]
    root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, env = "FILEBROWSER_VERBOSE")]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long, env = "FILEBROWSER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "filebrowser=debug,tower_http=debug"
    } else {
        "filebrowser=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config from file if provided, otherwise use defaults
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };

    // Command line and environment override the file
    if let Some(root) = cli.root {
        config.root_directory = root;
    }
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    if !config.root_directory.exists() {
        return Err(format!(
            "Root directory does not exist: {}",
            config.root_directory.display()
        )
        .into());
    }

    if !config.root_directory.is_dir() {
        return Err(format!(
            "Root path is not a directory: {}",
            config.root_directory.display()
        )
        .into());
    }

    // Resolve root directory to absolute path
    let root_dir = config.root_directory.canonicalize()?;
    info!("Serving files from: {}", root_dir.display());

    let addr = config.socket_addr()?;
    let app = filebrowser::app(AppState::new(root_dir));

    info!("Server started at {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
