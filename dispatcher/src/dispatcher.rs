use crate::bus::{BusMessage, MessageBus};
use crate::error::DispatchError;
use crate::mode::Mode;
use crate::volatility::{self, VolatilityBuffer, DEFAULT_THRESHOLD_PCT};
use prism_calendar::MarketCalendar;
use prism_core::Classify;
use prism_execution::Coordinator;
use prism_notifier::{Color, NotifierManager};
use prism_scheduler::ScheduledOrderStore;
use prism_signal::{Signal, SignalType};
use std::sync::Arc;
use tracing::{info, warn};

/// The single entry point between the signal bus and the rest of the
/// system. Owns no persistence of its own —
/// every durable effect happens inside [`Coordinator`] or
/// [`ScheduledOrderStore`].
pub struct Dispatcher {
    bus: Arc<dyn MessageBus>,
    coordinator: Arc<Coordinator>,
    store: ScheduledOrderStore,
    calendar: Arc<MarketCalendar>,
    notifier: Arc<NotifierManager>,
    mode: Mode,
    volatility: VolatilityBuffer,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").field("mode", &self.mode).finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(
        bus: Arc<dyn MessageBus>,
        coordinator: Arc<Coordinator>,
        store: ScheduledOrderStore,
        calendar: Arc<MarketCalendar>,
        notifier: Arc<NotifierManager>,
        mode: Mode,
    ) -> Self {
        Self {
            bus,
            coordinator,
            store,
            calendar,
            notifier,
            mode,
            volatility: VolatilityBuffer::new(),
        }
    }

    /// Pulls messages from the bus until it closes, handling each in turn
    /// on a single worker.
    pub async fn run(&self) {
        while let Some(message) = self.bus.recv().await {
            self.handle_message(message).await;
        }
        info!("bus closed, dispatcher exiting");
    }

    /// Parses and routes one bus message, then acks or nacks it: ack only
    /// once the handoff to the coordinator or the persistent enqueue has
    /// completed; nack anything that failed before that point so the bus
    /// redelivers.
    pub(crate) async fn handle_message(&self, message: BusMessage) {
        match self.dispatch(&message.payload).await {
            Ok(()) => self.bus.ack(&message).await,
            Err(err) => {
                warn!(error = %err, kind = ?err.kind(), "dispatch failed");
                self.bus.nack(&message).await;
            }
        }
    }

    async fn dispatch(&self, payload: &[u8]) -> Result<(), DispatchError> {
        let signal = Signal::parse(payload)?;

        if let Some(price) = signal.price {
            self.note_volatility(&signal.ticker, price).await;
        }

        match signal.signal_type {
            SignalType::Event => {
                self.handle_event(&signal).await;
                Ok(())
            }
            SignalType::Buy | SignalType::Sell => self.route_order(&signal).await,
        }
    }

    async fn handle_event(&self, signal: &Signal) {
        info!(ticker = %signal.ticker, market = ?signal.market, "event signal received");
        self.notifier
            .send(&format!("EVENT: {}", signal.ticker), Some("PRISM INSIGHT"), Some(Color::Blue))
            .await;
    }

    async fn note_volatility(&self, ticker: &str, price: rust_decimal::Decimal) {
        if let Some(stats) = self.volatility.record(ticker, price) {
            if volatility::exceeds_threshold(stats, DEFAULT_THRESHOLD_PCT) {
                info!(
                    ticker,
                    change_pct = stats.change_pct,
                    moving_average = stats.moving_average,
                    "volatility alert"
                );
                self.notifier
                    .send(
                        &format!(
                            "{ticker} moved {:.2}% (last {:.2}, MA5 {:.2})",
                            stats.change_pct, stats.current, stats.moving_average
                        ),
                        Some("Volatility Alert"),
                        Some(Color::Yellow),
                    )
                    .await;
            }
        }
    }

    async fn route_order(&self, signal: &Signal) -> Result<(), DispatchError> {
        match self.mode {
            Mode::DryRun => {
                info!(ticker = %signal.ticker, side = ?signal.signal_type, "dry-run: logging only, no broker call");
                Ok(())
            }
            Mode::Real => self.submit(signal).await,
            Mode::Demo => {
                if self.calendar.is_open(signal.market, signal.timestamp) {
                    self.submit(signal).await
                } else {
                    let next_open = self.calendar.next_open(signal.market, signal.timestamp);
                    self.store.enqueue(signal, next_open).await?;
                    info!(ticker = %signal.ticker, %next_open, "market closed, signal scheduled for replay");
                    Ok(())
                }
            }
        }
    }

    async fn submit(&self, signal: &Signal) -> Result<(), DispatchError> {
        let result = self.coordinator.submit(signal).await?;
        let color = if result.success() { Color::Green } else { Color::Red };
        self.notifier
            .send(
                &format!("{:?} {}: {}", signal.signal_type, signal.ticker, result.message()),
                Some("PRISM INSIGHT"),
                Some(color),
            )
            .await;
        Ok(())
    }
}
