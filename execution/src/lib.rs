#![forbid(unsafe_code)]
#![warn(unused, missing_debug_implementations, rust_2018_idioms)]

//! Execution coordinator: the only path by which a validated
//! [`prism_signal::Signal`] turns into a broker call. Serializes per-ticker
//! (so a rapid BUY/SELL pair on the same name never interleaves), bounds
//! global concurrency to `K` in-flight operations, and enforces a timeout
//! and inter-call pacing around every submission.

mod error;

pub use error::ExecutionError;

use chrono::{DateTime, Utc};
use fnv::FnvHasher;
use parking_lot::Mutex as SyncMutex;
use prism_broker::{BrokerClient, FailureReason, OrderOutcome, OrderResult, Side, SkipReason};
use prism_calendar::MarketCalendar;
use prism_core::Market;
use prism_ledger::{Ledger, TradeLogEntry};
use prism_signal::{Signal, SignalType};
use smol_str::SmolStr;
use std::collections::HashMap;
use std::hash::Hasher;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, Semaphore};
use tracing::{info, warn};

/// Number of shards in the per-ticker lock table. Bounds memory rather than
/// letting one entry accumulate per ticker ever seen.
const SHARD_COUNT: usize = 16;

/// Maximum number of broker operations in flight at once.
const DEFAULT_CONCURRENCY: usize = 3;

/// Hard ceiling on a single price-read → quantity → submit sequence.
const OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum spacing enforced between broker calls, to stay polite to rate
/// limits a venue transport doesn't itself enforce.
const INTER_CALL_PACING: Duration = Duration::from_millis(500);

/// Pause after a fill before the permit is released, giving the venue's own
/// bookkeeping (holdings, cash balance) a moment to catch up.
const POST_SUBMIT_SETTLE: Duration = Duration::from_millis(100);

type TickerLock = Arc<AsyncMutex<()>>;

fn shard_index(ticker: &str) -> usize {
    let mut hasher = FnvHasher::default();
    hasher.write(ticker.as_bytes());
    (hasher.finish() as usize) % SHARD_COUNT
}

/// Coordinates order submission across every market the bot trades.
pub struct Coordinator {
    brokers: HashMap<Market, BrokerClient>,
    calendar: Arc<MarketCalendar>,
    shards: Vec<SyncMutex<HashMap<SmolStr, TickerLock>>>,
    semaphore: Arc<Semaphore>,
    concurrency: usize,
    last_call: AsyncMutex<Option<tokio::time::Instant>>,
    accepting: AtomicBool,
    /// Recorded into on every fill and attempt; `None` runs the coordinator
    /// with no position bookkeeping, e.g. in tests that only exercise
    /// broker interaction.
    ledger: Option<Arc<Ledger>>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("markets", &self.brokers.keys().collect::<Vec<_>>())
            .field("concurrency", &self.concurrency)
            .field("accepting", &self.accepting.load(Ordering::SeqCst))
            .finish()
    }
}

impl Coordinator {
    pub fn new(brokers: HashMap<Market, BrokerClient>, calendar: Arc<MarketCalendar>) -> Self {
        Self::with_concurrency(brokers, calendar, DEFAULT_CONCURRENCY)
    }

    pub fn with_concurrency(
        brokers: HashMap<Market, BrokerClient>,
        calendar: Arc<MarketCalendar>,
        concurrency: usize,
    ) -> Self {
        Self {
            brokers,
            calendar,
            shards: (0..SHARD_COUNT).map(|_| SyncMutex::new(HashMap::new())).collect(),
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            last_call: AsyncMutex::new(None),
            accepting: AtomicBool::new(true),
            ledger: None,
        }
    }

    /// Wires a ledger into this coordinator so buy admission is checked
    /// before every purchase and every fill/attempt is recorded. Without
    /// one, the coordinator talks only to brokers.
    pub fn with_ledger(mut self, ledger: Arc<Ledger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    fn ticker_lock(&self, ticker: &str) -> TickerLock {
        let shard = &self.shards[shard_index(ticker)];
        let mut shard = shard.lock();
        shard
            .entry(SmolStr::new(ticker))
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Sleeps just long enough to keep broker calls at least
    /// [`INTER_CALL_PACING`] apart, process-wide.
    async fn pace(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < INTER_CALL_PACING {
                tokio::time::sleep(INTER_CALL_PACING - elapsed).await;
            }
        }
        *last_call = Some(tokio::time::Instant::now());
    }

    /// Applies one [`OrderResult`] to the ledger: a fill updates the
    /// position set, and every attempt (filled, skipped, or failed) appends
    /// one trade-log row. Ledger write failures are logged and never change
    /// what `submit` returns — the ledger is a sink, not a gate, once a
    /// broker call has actually happened.
    async fn record_to_ledger(&self, ledger: &Ledger, market: Market, result: &OrderResult, now: DateTime<Utc>) {
        if result.outcome == OrderOutcome::Filled {
            if let Some(price) = result.price {
                let outcome = match result.side {
                    Side::Buy => ledger.record_buy(market, &result.ticker, price, now, None, None).await.map(|_| ()),
                    Side::Sell => ledger.record_sell(market, &result.ticker, price, now).await.map(|_| ()),
                };
                if let Err(err) = outcome {
                    warn!(ticker = %result.ticker, %err, "failed to update ledger position");
                }
            }
        }

        let entry = TradeLogEntry {
            ticker: result.ticker.clone(),
            market,
            action: result.side,
            quantity: result.quantity,
            price: result.price,
            total_amount: result.total_amount,
            timestamp: now,
            order_no: result.order_no.clone(),
            success: result.success(),
            message: result.message(),
        };
        if let Err(err) = ledger.append_trade_log(entry).await {
            warn!(ticker = %result.ticker, %err, "failed to append trade log");
        }
    }

    /// Turns a validated signal into a broker call. BUY and SELL route to
    /// the matching market's broker under the per-ticker lock and the
    /// global concurrency bound; EVENT is never executable here — the
    /// dispatcher handles it upstream without ever calling `submit`.
    pub async fn submit(
        &self,
        signal: &Signal,
    ) -> Result<prism_broker::OrderResult, ExecutionError> {
        if signal.signal_type == SignalType::Event {
            return Err(ExecutionError::NoBrokerForMarket(signal.market));
        }
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(ExecutionError::ShuttingDown);
        }

        let broker = self
            .brokers
            .get(&signal.market)
            .ok_or(ExecutionError::NoBrokerForMarket(signal.market))?;

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ExecutionError::ShuttingDown)?;

        let ticker_lock = self.ticker_lock(&signal.ticker);
        let ticker = signal.ticker.clone();
        let signal_type = signal.signal_type;
        let now = signal.timestamp;
        let market = signal.market;

        let _guard = ticker_lock.lock().await;
        self.pace().await;

        let side = match signal_type {
            SignalType::Buy => Side::Buy,
            SignalType::Sell => Side::Sell,
            SignalType::Event => unreachable!("EVENT never reaches submit"),
        };

        let admission_refusal = if signal_type == SignalType::Buy {
            // Sector isn't carried by a Signal, so concentration admission
            // only ever evaluates the position-count limit for buys routed
            // through this path.
            match &self.ledger {
                Some(ledger) => ledger.check_admission(&ticker, None).await.err().map(|err| {
                    warn!(%ticker, %err, "buy refused at ledger admission");
                    OrderResult::skipped(ticker.clone(), Side::Buy, SkipReason::AdmissionRefused(err.to_string()))
                }),
                None => None,
            }
        } else {
            None
        };

        // Only the broker round trip itself is bounded by the deadline — a
        // timeout is an ordinary order outcome, not a coordinator failure,
        // so the ledger write and settle delay below always run regardless
        // of whether the broker answered in time.
        let outcome = match admission_refusal {
            Some(result) => result,
            None => {
                let broker_call = async {
                    match signal_type {
                        SignalType::Buy => broker.smart_buy_market(&ticker, &self.calendar, now).await,
                        SignalType::Sell => broker.smart_sell_all(&ticker, &self.calendar, now).await,
                        SignalType::Event => unreachable!("EVENT never reaches submit"),
                    }
                };
                match tokio::time::timeout(OPERATION_TIMEOUT, broker_call).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(%ticker, ?side, "order timed out");
                        OrderResult::failed(ticker.clone(), side, FailureReason::Timeout)
                    }
                }
            }
        };

        if let Some(ledger) = &self.ledger {
            self.record_to_ledger(ledger, market, &outcome, now).await;
        }

        tokio::time::sleep(POST_SUBMIT_SETTLE).await;

        if outcome.success() {
            info!(ticker = %signal.ticker, side = ?signal_type, "order executed");
        } else {
            warn!(ticker = %signal.ticker, side = ?signal_type, outcome = %outcome.message(), "order not filled");
        }

        Ok(outcome)
    }

    /// Stops accepting new submissions, then waits for every in-flight
    /// operation to finish (drain) before returning. A `submit` racing this
    /// call either completes normally or observes `accepting = false` and
    /// is rejected outright — there is no half-submitted state.
    pub async fn shutdown(&self) {
        self.accepting.store(false, Ordering::SeqCst);
        let _ = self.semaphore.acquire_many(self.concurrency as u32).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_broker::MockVenueTransport;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn signal(ticker: &str, signal_type: SignalType, market: Market) -> Signal {
        Signal {
            ticker: SmolStr::new(ticker),
            company_name: None,
            signal_type,
            price: None,
            market,
            timestamp: chrono::Utc::now(),
            source: None,
        }
    }

    fn coordinator_with(transport: MockVenueTransport) -> Coordinator {
        let broker = BrokerClient::new(Market::Kr, Arc::new(transport), dec!(1_000_000), true);
        let mut brokers = HashMap::new();
        brokers.insert(Market::Kr, broker);
        Coordinator::new(brokers, Arc::new(MarketCalendar::new(Vec::new())))
    }

    #[tokio::test]
    async fn submit_buy_fills_through_to_broker() {
        let transport = MockVenueTransport::new().with_price("005930", dec!(70_000));
        let coordinator = coordinator_with(transport);
        let signal = signal("005930", SignalType::Buy, Market::Kr);
        let result = coordinator.submit(&signal).await.unwrap();
        assert!(result.success());
    }

    #[tokio::test]
    async fn submit_event_never_reaches_a_broker() {
        let coordinator = coordinator_with(MockVenueTransport::new());
        let signal = signal("005930", SignalType::Event, Market::Kr);
        let err = coordinator.submit(&signal).await.unwrap_err();
        assert!(matches!(err, ExecutionError::NoBrokerForMarket(_)));
    }

    #[tokio::test]
    async fn submit_rejects_unknown_market() {
        let coordinator = coordinator_with(MockVenueTransport::new());
        let signal = signal("AAPL", SignalType::Buy, Market::Us);
        let err = coordinator.submit(&signal).await.unwrap_err();
        assert!(matches!(err, ExecutionError::NoBrokerForMarket(Market::Us)));
    }

    #[tokio::test]
    async fn shutdown_refuses_further_submissions() {
        let transport = MockVenueTransport::new().with_price("005930", dec!(70_000));
        let coordinator = coordinator_with(transport);
        coordinator.shutdown().await;
        let signal = signal("005930", SignalType::Buy, Market::Kr);
        let err = coordinator.submit(&signal).await.unwrap_err();
        assert!(matches!(err, ExecutionError::ShuttingDown));
    }

    #[tokio::test]
    async fn same_ticker_buy_and_sell_serialize_without_deadlock() {
        let transport = MockVenueTransport::new().with_price("005930", dec!(70_000));
        let coordinator = Arc::new(coordinator_with(transport));
        let buy = signal("005930", SignalType::Buy, Market::Kr);
        let sell = signal("005930", SignalType::Sell, Market::Kr);

        let c1 = coordinator.clone();
        let h1 = tokio::spawn(async move { c1.submit(&buy).await });
        let c2 = coordinator.clone();
        let h2 = tokio::spawn(async move { c2.submit(&sell).await });

        let (r1, r2) = tokio::join!(h1, h2);
        r1.unwrap().unwrap();
        r2.unwrap().unwrap();
    }

    #[test]
    fn shard_index_is_stable_for_same_ticker() {
        assert_eq!(shard_index("005930"), shard_index("005930"));
    }

    #[test]
    fn market_from_str_still_resolves_for_unknown_market_error_path() {
        assert!(Market::from_str("jp").is_err());
    }

    fn coordinator_with_ledger(transport: MockVenueTransport, ledger: prism_ledger::Ledger) -> Coordinator {
        let broker = BrokerClient::new(Market::Kr, Arc::new(transport), dec!(1_000_000), true);
        let mut brokers = HashMap::new();
        brokers.insert(Market::Kr, broker);
        Coordinator::new(brokers, Arc::new(MarketCalendar::new(Vec::new()))).with_ledger(Arc::new(ledger))
    }

    #[tokio::test]
    async fn a_filled_buy_is_recorded_as_a_position_in_the_ledger() {
        let ledger = prism_ledger::Ledger::connect(":memory:").unwrap();
        let transport = MockVenueTransport::new().with_price("005930", dec!(70_000));
        let coordinator = coordinator_with_ledger(transport, ledger);
        let signal = signal("005930", SignalType::Buy, Market::Kr);

        let result = coordinator.submit(&signal).await.unwrap();
        assert!(result.success());
        let positions = coordinator.ledger.as_ref().unwrap().holdings().await.unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].ticker.as_str(), "005930");
    }

    #[tokio::test]
    async fn buy_past_the_position_limit_is_refused_before_any_broker_call() {
        let ledger = prism_ledger::Ledger::connect_with_limits(":memory:", 1, 10, 1.0).unwrap();
        ledger
            .record_buy(Market::Kr, "000660", dec!(1), chrono::Utc::now(), None, None)
            .await
            .unwrap();

        let transport = MockVenueTransport::new().with_price("005930", dec!(70_000));
        let coordinator = coordinator_with_ledger(transport, ledger);
        let signal = signal("005930", SignalType::Buy, Market::Kr);

        let result = coordinator.submit(&signal).await.unwrap();
        assert!(matches!(
            result.outcome,
            OrderOutcome::Skipped(SkipReason::AdmissionRefused(_))
        ));
    }
}
