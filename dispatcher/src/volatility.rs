use parking_lot::Mutex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};

/// Default ring buffer depth.
const DEFAULT_CAPACITY: usize = 50;

/// Default volatility alert threshold: a ±2% move from the previous sample.
pub const DEFAULT_THRESHOLD_PCT: f64 = 2.0;

/// Stats derived from a ticker's recent price samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStats {
    pub current: f64,
    pub change_pct: f64,
    pub moving_average: f64,
}

/// Bounded per-ticker price history used to flag sudden moves on incoming
/// signal prices. Holds plain `f64` — this is an observability aid, not a
/// ledger of record.
#[derive(Debug, Default)]
pub struct VolatilityBuffer {
    buffers: Mutex<HashMap<String, VecDeque<f64>>>,
    capacity: usize,
}

impl VolatilityBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffers: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Appends `price` to `ticker`'s buffer and returns the freshly
    /// computed stats, or `None` if this is the buffer's first sample for
    /// that ticker (no prior price to compare against).
    pub fn record(&self, ticker: &str, price: Decimal) -> Option<PriceStats> {
        let price = price.to_f64()?;
        let mut buffers = self.buffers.lock();
        let buffer = buffers.entry(ticker.to_string()).or_insert_with(|| VecDeque::with_capacity(self.capacity));

        if buffer.len() == self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(price);

        if buffer.len() < 2 {
            return None;
        }

        let current = *buffer.back().unwrap();
        let previous = buffer[buffer.len() - 2];
        let change_pct = if previous != 0.0 { ((current - previous) / previous) * 100.0 } else { 0.0 };

        let window = buffer.len().min(5);
        let window_sum: f64 = buffer.iter().rev().take(window).sum();
        let moving_average = window_sum / window as f64;

        Some(PriceStats { current, change_pct, moving_average })
    }
}

/// Whether `stats` is large enough a move to warrant a volatility note.
pub fn exceeds_threshold(stats: PriceStats, threshold_pct: f64) -> bool {
    stats.change_pct.abs() > threshold_pct
}
