//! Ingestion jobs, one per data domain. Each job is independently
//! triggered, independently guarded against overlapping runs, and contains
//! its own failures: one domain breaking must not block the others.

pub mod fuel_prices;
pub mod fx_banks;
pub mod fx_history;
pub mod fx_market;
pub mod gold_history;
pub mod gold_spot;

use std::future::Future;
use tokio::sync::Mutex;
use tokio::time::{interval, Duration};

use crate::AppState;

type JobResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// One in-flight guard per job. A trigger (scheduled or manual) that finds a
/// job still running skips that job rather than queueing behind it:
/// overlapping runs of the same job would race the change-detection gate and
/// double-insert latest rows.
#[derive(Default)]
pub struct JobLocks {
    fx_market: Mutex<()>,
    fx_history: Mutex<()>,
    fx_banks: Mutex<()>,
    gold_spot: Mutex<()>,
    gold_history: Mutex<()>,
    fuel_prices: Mutex<()>,
}

async fn run_guarded<F>(name: &str, lock: &Mutex<()>, job: F)
where
    F: Future<Output = JobResult>,
{
    let Ok(_guard) = lock.try_lock() else {
        tracing::warn!("[{}] previous run still in flight, skipping this trigger", name);
        return;
    };

    if let Err(e) = job.await {
        tracing::error!("[{}] job failed: {}", name, e);
    }
}

/// Run the full job set. Failures are contained per job; this never fails.
pub async fn run_all_jobs(state: &AppState) {
    tracing::info!("=== Running all jobs ===");

    let locks = &state.job_locks;
    run_guarded("FX_MARKET", &locks.fx_market, fx_market::run(state)).await;
    run_guarded("FX_HISTORY", &locks.fx_history, fx_history::run(state)).await;
    run_guarded("FX_BANK", &locks.fx_banks, fx_banks::run(state)).await;
    run_guarded("GOLD_SPOT", &locks.gold_spot, gold_spot::run(state)).await;
    run_guarded("GOLD_HISTORY", &locks.gold_history, gold_history::run(state)).await;
    run_guarded("FUEL", &locks.fuel_prices, fuel_prices::run(state)).await;

    tracing::info!("=== All jobs finished ===");
}

/// Spawn the recurring trigger. The first tick fires immediately, so the
/// job set also runs once at startup.
pub fn start_scheduler(state: AppState) {
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(300)); // Every 5 minutes

        loop {
            interval.tick().await;
            tracing::info!("Scheduler tick");
            run_all_jobs(&state).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_run_guarded_skips_while_in_flight() {
        let lock = Mutex::new(());
        let ran = AtomicUsize::new(0);

        {
            let _held = lock.try_lock().unwrap();
            run_guarded("TEST", &lock, async {
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;
        }
        assert_eq!(ran.load(Ordering::SeqCst), 0, "skipped while held");

        run_guarded("TEST", &lock, async {
            ran.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
