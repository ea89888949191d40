//! Periodic driver for the execution engine.
//!
//! Owns its own start/stop lifecycle: a tokio task ticks at a fixed interval,
//! runs the due-plan pass on every tick, and runs the balance-sufficiency
//! sweep once per calendar day. Shutdown is signalled through a watch
//! channel; the task finishes its current tick before exiting.

use log::{error, info};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::constants::SCHEDULER_TICK_SECS;
use crate::executions::ExecutionEngineTrait;
use crate::utils::Clock;

pub struct PlanScheduler {
    engine: Arc<dyn ExecutionEngineTrait>,
    clock: Arc<dyn Clock>,
    tick: Duration,
    shutdown: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl PlanScheduler {
    pub fn new(engine: Arc<dyn ExecutionEngineTrait>, clock: Arc<dyn Clock>) -> Self {
        Self {
            engine,
            clock,
            tick: Duration::from_secs(SCHEDULER_TICK_SECS),
            shutdown: None,
            handle: None,
        }
    }

    /// Overrides the tick interval (tests use short ticks).
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawns the scheduling task. Starting an already-running scheduler is a
    /// no-op.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let engine = self.engine.clone();
        let clock = self.clock.clone();
        let tick = self.tick;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut last_sweep: Option<NaiveDate> = None;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(err) = engine.run_due_plans().await {
                            error!("Due-plan pass failed: {err}");
                        }
                        let today = clock.today();
                        if last_sweep != Some(today) {
                            match engine.sweep_insufficient_balance().await {
                                Ok(raised) => {
                                    if raised > 0 {
                                        info!("Balance sweep raised {raised} reminders");
                                    }
                                    last_sweep = Some(today);
                                }
                                Err(err) => error!("Balance sweep failed: {err}"),
                            }
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        self.shutdown = Some(shutdown_tx);
        self.handle = Some(handle);
        info!("Plan scheduler started (tick {:?})", self.tick);
    }

    /// Signals the task to stop and waits for it to finish its current tick.
    pub async fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!("Plan scheduler stopped");
    }
}

impl Drop for PlanScheduler {
    fn drop(&mut self) {
        // A dropped scheduler must not leave a detached task ticking.
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use crate::errors::Result;
    use crate::executions::{ExecutionRecord, OneTimeBuyInput, SweepSummary};
    use crate::utils::FixedClock;

    #[derive(Default)]
    struct CountingEngine {
        runs: AtomicUsize,
        sweeps: AtomicUsize,
    }

    #[async_trait]
    impl ExecutionEngineTrait for CountingEngine {
        async fn run_due_plans(&self) -> Result<SweepSummary> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(SweepSummary::default())
        }

        async fn execute_one_time_buy(&self, _input: OneTimeBuyInput) -> Result<ExecutionRecord> {
            unimplemented!()
        }

        async fn sweep_insufficient_balance(&self) -> Result<usize> {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }

        fn list_records(
            &self,
            _user_id: &str,
            _plan_id: Option<&str>,
        ) -> Result<Vec<ExecutionRecord>> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn ticks_run_the_engine_and_sweep_once_per_day() {
        let engine = Arc::new(CountingEngine::default());
        let clock = Arc::new(FixedClock::new(
            NaiveDate::from_ymd_opt(2025, 6, 10)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        ));
        let mut scheduler = PlanScheduler::new(engine.clone(), clock.clone())
            .with_tick(Duration::from_millis(10));

        scheduler.start();
        assert!(scheduler.is_running());
        tokio::time::sleep(Duration::from_millis(60)).await;
        scheduler.stop().await;
        assert!(!scheduler.is_running());

        let runs = engine.runs.load(Ordering::SeqCst);
        assert!(runs >= 2, "expected multiple ticks, got {runs}");
        // The calendar date never changed, so the sweep fired exactly once
        assert_eq!(engine.sweeps.load(Ordering::SeqCst), 1);

        // A stopped scheduler stays stopped
        let runs_after_stop = engine.runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(engine.runs.load(Ordering::SeqCst), runs_after_stop);
    }
}
