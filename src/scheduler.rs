//! Cron-driven cycle scheduling.
//!
//! Each cycle runs to completion before the next fire time is computed,
//! so a single loop never overlaps its own runs.

use std::future::Future;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::error::{ConfigError, Error};

/// Parse a cron expression and compute the next fire time from now.
pub fn next_cron_fire(expr: &str) -> Result<Option<DateTime<Utc>>, ConfigError> {
    let schedule = cron::Schedule::from_str(expr).map_err(|e| ConfigError::InvalidValue {
        key: "cron".to_string(),
        message: e.to_string(),
    })?;
    Ok(schedule.upcoming(Utc).next())
}

/// Spawn a background task that runs `cycle` on a cron cadence.
///
/// Cycle failures are logged and the loop keeps going.
pub fn spawn_cron_loop<F, Fut>(
    name: &'static str,
    expr: String,
    cycle: F,
) -> tokio::task::JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), Error>> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let next = match next_cron_fire(&expr) {
                Ok(Some(next)) => next,
                Ok(None) => {
                    warn!(task = name, "Cron schedule has no upcoming fire, stopping");
                    return;
                }
                Err(e) => {
                    error!(task = name, error = %e, "Invalid cron expression, stopping");
                    return;
                }
            };

            let wait = (next - Utc::now()).to_std().unwrap_or_default();
            info!(task = name, next = %next, "Waiting for next scheduled run");
            tokio::time::sleep(wait).await;

            if let Err(e) = cycle().await {
                error!(task = name, error = %e, "Scheduled cycle failed");
            }
        }
    })
}
