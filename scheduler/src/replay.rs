use crate::store::{reconstruct_signal, ScheduledOrderStore};
use prism_calendar::MarketCalendar;
use prism_execution::Coordinator;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Default spacing between replay attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Background loop replaying deferred orders once their market reopens.
/// Runs on its own task; `run` returns once `shutdown` fires and the
/// in-flight iteration (if any) completes.
pub struct ReplayLoop {
    store: ScheduledOrderStore,
    coordinator: Arc<Coordinator>,
    calendar: Arc<MarketCalendar>,
    poll_interval: Duration,
}

impl ReplayLoop {
    pub fn new(
        store: ScheduledOrderStore,
        coordinator: Arc<Coordinator>,
        calendar: Arc<MarketCalendar>,
    ) -> Self {
        Self::with_poll_interval(store, coordinator, calendar, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(
        store: ScheduledOrderStore,
        coordinator: Arc<Coordinator>,
        calendar: Arc<MarketCalendar>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            coordinator,
            calendar,
            poll_interval,
        }
    }

    /// Runs until `shutdown` fires. The first iteration fires immediately
    /// on entry; `MissedTickBehavior::Skip` keeps a slow iteration from
    /// triggering a burst of catch-up ticks.
    pub async fn run(&self, shutdown: &prism_core::ShutdownHandle) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_one_iteration(chrono::Utc::now()).await;
                }
                _ = shutdown.triggered() => {
                    info!("replay loop shutting down; pending rows remain for next process");
                    break;
                }
            }
        }
    }

    /// One pass over rows ready as of `now`. Takes `now` explicitly (rather
    /// than sampling the wall clock itself) so tests can exercise a fixed,
    /// known-open instant.
    pub async fn run_one_iteration(&self, now: chrono::DateTime<chrono::Utc>) {
        let ready = match self.store.take_ready(now).await {
            Ok(rows) => rows,
            Err(err) => {
                error!(%err, "failed to load ready scheduled orders");
                return;
            }
        };

        for order in ready {
            if !self.calendar.is_open(order.market, now) {
                // execute_after already elapsed but the market slipped back
                // closed (e.g. a holiday miscalculation); leave it pending.
                continue;
            }

            let signal = match reconstruct_signal(&order) {
                Ok(signal) => signal,
                Err(err) => {
                    warn!(id = order.id, %err, "dropping unreplayable scheduled order");
                    let _ = self.store.mark_failed(order.id, err.to_string()).await;
                    continue;
                }
            };

            match self.coordinator.submit(&signal).await {
                Ok(outcome) if outcome.success() => {
                    if let Err(err) = self.store.mark_executed(order.id).await {
                        error!(id = order.id, %err, "failed to mark scheduled order executed");
                    }
                }
                Ok(outcome) => {
                    let message = outcome.message();
                    if let Err(err) = self.store.mark_failed(order.id, message).await {
                        error!(id = order.id, %err, "failed to mark scheduled order failed");
                    }
                }
                Err(err) => {
                    if let Err(store_err) = self.store.mark_failed(order.id, err.to_string()).await {
                        error!(id = order.id, %store_err, "failed to mark scheduled order failed");
                    }
                }
            }
        }
    }
}
