use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time};
use tracing::{error, info};

use rallypoint_types::errors::ApplicationError;

use crate::app::{RallyPointEngine, ResolvedMovement};

/// Periodically resolves due movements.
pub struct MovementWorker {
    engine: Arc<RallyPointEngine>,
    interval: Duration,
}

impl MovementWorker {
    pub fn new(engine: Arc<RallyPointEngine>) -> Self {
        let interval = Duration::from_millis(engine.config().tick_interval_ms.max(1));
        Self { engine, interval }
    }

    /// Run worker loop inside a tokio task.
    pub fn run(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = time::interval(self.interval);
            info!(interval_ms = self.interval.as_millis() as u64, "Movement worker started.");

            loop {
                interval.tick().await;
                if let Err(e) = self.tick().await {
                    error!(error = %e, "Error while resolving due movements");
                }
            }
        })
    }

    /// A single pass over the due movements.
    pub async fn tick(&self) -> Result<Vec<ResolvedMovement>, ApplicationError> {
        self.engine.resolve_due_movements(None).await
    }
}
