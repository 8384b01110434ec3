//! faceoff-td (Tournament Director) - Tournament bracket and voting service
//!
//! Generates quadrant-seeded single-elimination brackets, collects
//! per-matchup votes, advances winners round by round, and lets
//! administrators break tied matchups.

use anyhow::Result;
use clap::Parser;
use faceoff_common::config;
use faceoff_common::db::init_database;
use faceoff_td::{build_router, AppState};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "faceoff-td", about = "Faceoff Tournament Director service")]
struct Args {
    /// Root folder holding the database (overrides FACEOFF_ROOT_FOLDER
    /// and the config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// HTTP listen port
    #[arg(long, default_value_t = 5780)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Faceoff Tournament Director (faceoff-td) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), "FACEOFF_ROOT_FOLDER");
    config::ensure_root_folder(&root_folder)?;

    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("faceoff-td listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
