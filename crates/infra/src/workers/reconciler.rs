use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::lifecycle::ApplicationLifecycle;

/// Handle to stop and join the background counter reconciler.
#[derive(Debug)]
pub struct ReconcilerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl ReconcilerHandle {
    /// Request shutdown and wait for the current pass (if any) to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = self.join.await;
    }
}

/// Periodic applicant-counter reconciliation.
#[derive(Debug)]
pub struct CounterReconciler;

impl CounterReconciler {
    /// Spawn on the current tokio runtime. The first pass runs after one
    /// full `every`.
    pub fn spawn(lifecycle: ApplicationLifecycle, every: Duration) -> ReconcilerHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let join = tokio::spawn(async move {
            info!(interval_secs = every.as_secs(), "counter reconciler started");
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        match lifecycle.reconcile_all().await {
                            Ok(report) => debug!(checked = report.checked, repaired = report.repaired.len(), "reconcile pass"),
                            Err(e) => error!(error = %e, "reconcile pass failed"),
                        }
                    }
                }
            }
            info!("counter reconciler stopped");
        });

        ReconcilerHandle {
            shutdown: Some(shutdown_tx),
            join,
        }
    }
}
