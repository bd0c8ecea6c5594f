#![forbid(unsafe_code)]
#![warn(unused, missing_debug_implementations, rust_2018_idioms)]

//! Wiring root: loads configuration, builds the execution coordinator over
//! every configured market, starts the subscriber/dispatcher and the
//! market-hours replay loop, and drains the coordinator on shutdown. The
//! venue transport wired here is always the in-memory reference transport —
//! a concrete brokerage SDK is an externally-supplied dependency.

mod config;
mod error;

pub use config::{AppConfig, LedgerConfig, LoggingConfig, MarketConfig, SchedulerConfig};
pub use error::AppError;

use prism_broker::{BrokerClient, MockVenueTransport};
use prism_calendar::MarketCalendar;
use prism_core::{Market, ShutdownHandle};
use prism_dispatcher::{Dispatcher, InProcessBus, MessageBus, Mode};
use prism_execution::Coordinator;
use prism_ledger::Ledger;
use prism_notifier::NotifierManager;
use prism_scheduler::{ReplayLoop, ScheduledOrderStore};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A fully wired process, ready to run. `bus` is exposed so whatever feeds
/// signals into this process — a pubsub subscription, a test harness — can
/// publish directly onto it; this crate draws no opinion about where
/// signals originate, mirroring how `prism-broker::VenueTransport` draws no
/// opinion about the wire protocol underneath it.
pub struct App {
    pub bus: Arc<InProcessBus>,
    dispatcher: Arc<Dispatcher>,
    replay: ReplayLoop,
    coordinator: Arc<Coordinator>,
    shutdown: ShutdownHandle,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").finish_non_exhaustive()
    }
}

impl App {
    /// Builds every component from `config`, opening (and migrating) the
    /// ledger and scheduled-order databases. Any failure here is a startup
    /// configuration error — `main` is responsible for turning it into a
    /// non-zero exit code.
    pub fn build(config: AppConfig) -> Result<Self, AppError> {
        let mode = Mode::from_str(&config.mode)?;

        let mut brokers = HashMap::new();
        if let Some(kr) = &config.kr {
            brokers.insert(
                Market::Kr,
                BrokerClient::new(Market::Kr, Arc::new(MockVenueTransport::new()), kr.per_order_budget, kr.auto_trading),
            );
        }
        if let Some(us) = &config.us {
            brokers.insert(
                Market::Us,
                BrokerClient::new(Market::Us, Arc::new(MockVenueTransport::new()), us.per_order_budget, us.auto_trading),
            );
        }
        if brokers.is_empty() {
            return Err(AppError::NoMarketsConfigured);
        }

        let calendar = Arc::new(MarketCalendar::new(config.kr_holidays.clone()));

        let ledger = Arc::new(Ledger::connect_with_limits(
            &config.ledger.database_path,
            config.ledger.position_limit,
            config.ledger.sector_limit,
            config.ledger.sector_ratio,
        )?);

        let store = ScheduledOrderStore::connect(&config.scheduler.database_path)?;

        let coordinator = Arc::new(Coordinator::new(brokers, calendar.clone()).with_ledger(ledger));

        let slack_webhook = std::env::var("PRISM_SLACK_WEBHOOK_URL").ok();
        let discord_webhook = std::env::var("PRISM_DISCORD_WEBHOOK_URL").ok();
        let notifier = Arc::new(NotifierManager::from_webhooks(slack_webhook, discord_webhook));

        let bus = Arc::new(InProcessBus::new());

        let dispatcher = Arc::new(Dispatcher::new(
            bus.clone() as Arc<dyn MessageBus>,
            coordinator.clone(),
            store.clone(),
            calendar.clone(),
            notifier,
            mode,
        ));

        let replay = ReplayLoop::with_poll_interval(
            store,
            coordinator.clone(),
            calendar,
            Duration::from_secs(config.scheduler.poll_interval_secs),
        );

        info!(%mode, "prism wired");

        Ok(Self {
            bus,
            dispatcher,
            replay,
            coordinator,
            shutdown: ShutdownHandle::new(),
        })
    }

    /// Runs the dispatcher and the replay loop until an OS shutdown signal
    /// arrives, then drains in-flight coordinator work before returning.
    pub async fn run(self) {
        self.shutdown.watch_ctrl_c();

        tokio::select! {
            () = self.dispatcher.run() => {
                info!("dispatcher exited; bus must have closed");
            }
            () = self.replay.run(&self.shutdown) => {}
            () = self.shutdown.triggered() => {
                info!("shutdown signal received");
            }
        }

        self.coordinator.shutdown().await;
        info!("coordinator drained, exiting");
    }
}
