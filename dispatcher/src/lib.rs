#![forbid(unsafe_code)]
#![warn(unused, missing_debug_implementations, rust_2018_idioms)]

//! Subscriber and dispatcher: pulls signals off a publish/subscribe bus,
//! validates them, and routes BUY/SELL to the
//! execution coordinator or the scheduled-order store per the
//! real/demo/dry-run × market-open policy matrix. EVENT signals never
//! reach a broker; they only drive the volatility buffer and notifier.

mod bus;
mod dispatcher;
mod error;
mod mode;
mod volatility;

pub use bus::{BusMessage, InProcessBus, MessageBus};
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use mode::{Mode, UnknownMode};
pub use volatility::{PriceStats, VolatilityBuffer, DEFAULT_THRESHOLD_PCT};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use prism_broker::{BrokerClient, MockVenueTransport};
    use prism_calendar::MarketCalendar;
    use prism_core::Market;
    use prism_execution::Coordinator;
    use prism_notifier::NotifierManager;
    use prism_scheduler::ScheduledOrderStore;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Arc;

    // 2026-01-20 is a Tuesday; 15:00 UTC is 10:00 US/Eastern, inside the
    // regular session with no holiday in play.
    fn market_open_instant() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 20, 15, 0, 0).unwrap()
    }

    fn signal_json(ticker: &str, signal_type: &str, market: &str, timestamp: chrono::DateTime<Utc>) -> Vec<u8> {
        format!(
            r#"{{"ticker":"{ticker}","signal_type":"{signal_type}","market":"{market}","timestamp":"{}"}}"#,
            timestamp.to_rfc3339()
        )
        .into_bytes()
    }

    fn harness(mode: Mode) -> (Arc<InProcessBus>, Dispatcher, ScheduledOrderStore) {
        let transport = MockVenueTransport::new().with_price("AAPL", dec!(150));
        let broker = BrokerClient::new(Market::Us, Arc::new(transport), dec!(10_000), true);
        let mut brokers = HashMap::new();
        brokers.insert(Market::Us, broker);
        let calendar = Arc::new(MarketCalendar::new(Vec::new()));
        let coordinator = Arc::new(Coordinator::new(brokers, calendar.clone()));
        let store = ScheduledOrderStore::connect(":memory:").unwrap();
        let bus = Arc::new(InProcessBus::new());
        let notifier = Arc::new(NotifierManager::new());

        let dispatcher = Dispatcher::new(
            bus.clone() as Arc<dyn MessageBus>,
            coordinator,
            store.clone(),
            calendar,
            notifier,
            mode,
        );
        (bus, dispatcher, store)
    }

    #[tokio::test]
    async fn real_mode_submits_even_though_the_market_is_closed() {
        let (bus, dispatcher, _store) = harness(Mode::Real);
        let closed_instant = Utc.with_ymd_and_hms(2026, 1, 20, 3, 0, 0).unwrap();
        bus.publish(signal_json("AAPL", "BUY", "US", closed_instant));
        let msg = bus.recv().await.unwrap();
        // `handle_message` both routes and acks/nacks; call it directly so
        // the test doesn't need a background task pumping `run`.
        dispatcher.handle_message(msg).await;
    }

    #[tokio::test]
    async fn demo_mode_enqueues_when_the_market_is_closed() {
        let (bus, dispatcher, store) = harness(Mode::Demo);
        let closed_instant = Utc.with_ymd_and_hms(2026, 1, 20, 3, 0, 0).unwrap();
        bus.publish(signal_json("AAPL", "BUY", "US", closed_instant));
        let msg = bus.recv().await.unwrap();
        dispatcher.handle_message(msg).await;

        assert_eq!(store.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn demo_mode_submits_directly_when_the_market_is_open() {
        let (bus, dispatcher, store) = harness(Mode::Demo);
        bus.publish(signal_json("AAPL", "BUY", "US", market_open_instant()));
        let msg = bus.recv().await.unwrap();
        dispatcher.handle_message(msg).await;

        assert_eq!(store.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn dry_run_never_touches_the_store_or_a_broker() {
        let (bus, dispatcher, store) = harness(Mode::DryRun);
        bus.publish(signal_json("AAPL", "BUY", "US", market_open_instant()));
        let msg = bus.recv().await.unwrap();
        dispatcher.handle_message(msg).await;

        assert_eq!(store.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn a_malformed_payload_is_dropped_without_panicking() {
        let (bus, dispatcher, _store) = harness(Mode::DryRun);
        bus.publish(b"not json at all".to_vec());
        let msg = bus.recv().await.unwrap();
        dispatcher.handle_message(msg).await;
    }

    #[tokio::test]
    async fn event_signals_never_reach_the_scheduled_store_or_a_broker() {
        let (bus, dispatcher, store) = harness(Mode::Real);
        bus.publish(signal_json("AAPL", "EVENT", "US", market_open_instant()));
        let msg = bus.recv().await.unwrap();
        dispatcher.handle_message(msg).await;

        assert_eq!(store.pending_count().await.unwrap(), 0);
    }
}
