//! gi-server - gallery and exhibition lookup service
//!
//! Serves the read-only JSON API, or with `import` loads gallery fixtures
//! into the database and exits.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gi_common::config::{resolve_database_path, DATABASE_ENV_VAR};
use gi_common::db::{init_database, Repositories};
use gi_common::import::import_fixture;
use gi_server::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for gi-server
#[derive(Parser, Debug)]
#[command(name = "gi-server")]
#[command(about = "Gallery and exhibition information service")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080", env = "GALLERYINFO_HTTP")]
    http: SocketAddr,

    /// SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Maximum pooled database connections
    #[arg(long, default_value_t = 4)]
    max_connections: u32,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import gallery descriptors (JSON) and their exhibition feeds
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gi_server=info,gi_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting gi-server v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let db_path = resolve_database_path(args.database.as_deref(), DATABASE_ENV_VAR);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path, args.max_connections)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    let repos = Repositories::new(pool.clone());

    if let Some(Command::Import { files }) = args.command {
        for file in &files {
            let summary = import_fixture(&repos, file)
                .await
                .with_context(|| format!("Failed to import {}", file.display()))?;
            info!(
                "Imported gallery {} ({} feeds, {} exhibitions)",
                summary.gallery_id, summary.feeds, summary.exhibitions
            );
        }
        pool.close().await;
        return Ok(());
    }

    let app = build_router(AppState::new(repos));

    let listener = tokio::net::TcpListener::bind(args.http)
        .await
        .with_context(|| format!("Failed to bind {}", args.http))?;
    info!("Listening on http://{}", args.http);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
