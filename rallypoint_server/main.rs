use std::sync::Arc;

use rallypoint_app::{
    app::RallyPointEngine, arrivals::worker::MovementWorker, clock::SystemClock, config::Config,
};
use rallypoint_db::uow::InMemoryUnitOfWorkProvider;
use rallypoint_game::{
    battle::StandardCombatResolver,
    catalog::{StandardUnitCatalog, UnitCatalog},
    night::DisabledNightPolicy,
};
use rallypoint_types::{Result, errors::ApplicationError};

mod logs;
use logs::setup_logging;

#[tokio::main]
#[cfg(not(tarpaulin_include))]
async fn main() -> Result<(), ApplicationError> {
    setup_logging();
    let (config, worker) = setup_app();

    tracing::info!(
        world_size = config.world_size,
        speed = config.speed,
        tick_interval_ms = config.tick_interval_ms,
        "Rally point engine started."
    );
    let handle = worker.run();
    let abort = handle.abort_handle();

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.map_err(|e| ApplicationError::Infrastructure(e.to_string()))?;
            tracing::info!("Shutdown requested, stopping movement worker.");
            abort.abort();
        }
        result = handle => {
            if let Err(e) = result {
                tracing::error!("Movement worker stopped unexpectedly: {e}");
                return Err(ApplicationError::Infrastructure(e.to_string()));
            }
        }
    }

    Ok(())
}

fn setup_app() -> (Arc<Config>, Arc<MovementWorker>) {
    let config = Arc::new(Config::from_env());
    let uow_provider = Arc::new(InMemoryUnitOfWorkProvider::new());
    let catalog: Arc<dyn UnitCatalog> = Arc::new(StandardUnitCatalog::new());

    let engine = Arc::new(RallyPointEngine::new(
        config.clone(),
        uow_provider,
        catalog.clone(),
        Arc::new(StandardCombatResolver::new(catalog)),
        Arc::new(DisabledNightPolicy),
        Arc::new(SystemClock),
    ));
    let worker = Arc::new(MovementWorker::new(engine));

    (config, worker)
}
