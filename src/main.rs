//! points_ledger server
//!
//! Startup order: config, logging, database (schema + optional sample
//! members), orchestrator wiring, HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use points_ledger::config::AppConfig;
use points_ledger::db::Database;
use points_ledger::ledger::SqliteLedgerStore;
use points_ledger::logging::init_logging;
use points_ledger::member::SqliteAccountDirectory;
use points_ledger::server::{AppState, build_router};
use points_ledger::transfer::{SqliteTransferStore, TransferOrchestrator};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _guard = init_logging(&config);

    let db = Database::connect(&config.database.url).await?;
    db.init_schema().await?;
    if config.database.seed_sample_data {
        db.seed_members().await?;
    }

    let pool = db.pool().clone();
    let orchestrator = Arc::new(TransferOrchestrator::new(
        pool,
        Arc::new(SqliteAccountDirectory),
        Arc::new(SqliteLedgerStore),
        Arc::new(SqliteTransferStore),
    ));

    let state = Arc::new(AppState {
        db: Arc::new(db),
        orchestrator,
    });
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!(%addr, env = %env, "points_ledger listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
