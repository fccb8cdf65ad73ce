//! lifer-quiz service entry point

use anyhow::Result;
use clap::Parser;
use tracing::info;

use lifer_common::events::EventBus;
use lifer_quiz::list_store::ListStore;
use lifer_quiz::{build_router, AppState};

/// Bird list curation and identification quiz service
#[derive(Debug, Parser)]
#[command(name = "lifer-quiz", version)]
struct Args {
    /// Root folder holding the database (overrides env var and config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// Bind address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Listen port
    #[arg(long, default_value_t = 5741)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting lifer-quiz v{}", env!("CARGO_PKG_VERSION"));

    // Resolve the root folder and open (or create) the database
    let root_folder = lifer_common::config::resolve_root_folder(args.root_folder.as_deref());
    let db_path = lifer_common::config::prepare_root_folder(&root_folder)?;
    info!("Database: {}", db_path.display());

    let db_pool = lifer_common::db::init_database_pool(&db_path).await?;

    // Event bus for SSE broadcasting
    let event_bus = EventBus::new(100);

    // Rebuild list state from the persisted blobs
    let store = ListStore::hydrate(&db_pool).await?;
    info!(
        species = store.current().len(),
        saved_lists = store.saved_lists().len(),
        "List store hydrated"
    );

    let state = AppState::new(db_pool, event_bus, store)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;
    info!("Listening on http://{}:{}", args.host, args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
