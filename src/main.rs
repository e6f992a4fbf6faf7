//! Server entry point: configuration, tracing, composition, and shutdown.

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use nursease_admin::{build_application, AppState, Config, APP_TITLE, APP_VERSION};

/// NurseEase Admin API server.
#[derive(Parser)]
#[command(name = "nursease-admin", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default when no subcommand given).
    Serve {
        /// Path to TOML config file.
        #[arg(long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { config }) => run_server(config.as_deref()).await,
        None => run_server(None).await,
    }
}

async fn run_server(config_path: Option<&str>) {
    let config = Config::load(config_path);

    // Initialize tracing
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone());
    tracing_subscriber::fmt().with_env_filter(log_filter).init();

    info!("{APP_TITLE} v{APP_VERSION} starting");
    info!("Listening on {}", config.server.listen);

    if config.auth.admin_password == "change-me" {
        warn!("Using default admin password — set NURSEEASE_ADMIN_PASSWORD or update config");
    }

    let state = AppState::new(config);

    let app = match build_application(state.clone()) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to compose application: {e}");
            std::process::exit(1);
        }
    };

    let listener = TcpListener::bind(&state.config.server.listen)
        .await
        .expect("Failed to bind");

    info!("Server ready");

    // Periodic sweep: drop expired session tokens
    let sessions = state.sessions.clone();
    let sweep_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            let swept = sessions.sweep_expired().await;
            if swept > 0 {
                tracing::debug!(swept, "expired sessions removed");
            }
        }
    });

    // Graceful shutdown
    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("Failed to register SIGTERM");
            tokio::select! {
                _ = ctrl_c => info!("Received SIGINT"),
                _ = sigterm.recv() => info!("Received SIGTERM"),
            }
        }
        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
            info!("Received SIGINT");
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .expect("Server error");

    info!("Shutting down...");
    sweep_task.abort();
    info!("Goodbye");
}
