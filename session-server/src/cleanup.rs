//! Background sweep of expired sessions

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::model::Model;

/// Starts the background task purging expired sessions every `interval`
pub fn start_expiration_sweep(model: Model, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval_timer = tokio::time::interval(interval);

        loop {
            interval_timer.tick().await;
            run_sweep(&model).await;
        }
    })
}

async fn run_sweep(model: &Model) {
    debug!("Running expiration sweep");

    match model.sessions().purge_expired().await {
        Ok(0) => {}
        Ok(purged) => info!(purged, "Expired sessions swept"),
        Err(err) => error!(error = %err, "Failed to sweep expired sessions"),
    }
}
