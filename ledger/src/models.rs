use crate::schema::{stock_holdings, trade_logs, trading_history};
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use prism_broker::Side;
use prism_core::Market;
use rust_decimal::Decimal;
use smol_str::SmolStr;
use std::str::FromStr;

/// The bot's own view of a currently held ticker. Quantity is deliberately
/// absent — the broker's holdings snapshot is
/// authoritative on quantity; this core only tracks presence/absence plus
/// the buy-side context needed to compute P&L on exit.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub market: Market,
    pub ticker: SmolStr,
    pub buy_price: Decimal,
    pub buy_date: DateTime<Utc>,
    pub current_price: Decimal,
    pub last_updated: DateTime<Utc>,
    pub target_price: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub trigger_type: Option<String>,
    pub sector: Option<String>,
    /// Opaque JSON blob (original buy rationale); never interpreted by
    /// this core.
    pub scenario: Option<String>,
}

#[derive(Queryable)]
pub(crate) struct PositionRow {
    pub id: i32,
    pub market: String,
    pub ticker: String,
    pub buy_price: String,
    pub buy_date: NaiveDateTime,
    pub current_price: String,
    pub last_updated: NaiveDateTime,
    pub target_price: Option<String>,
    pub stop_loss: Option<String>,
    pub trigger_type: Option<String>,
    pub sector: Option<String>,
    pub scenario: Option<String>,
}

impl TryFrom<PositionRow> for Position {
    type Error = String;

    fn try_from(row: PositionRow) -> Result<Self, Self::Error> {
        Ok(Position {
            market: Market::from_str(&row.market).map_err(|e| e.to_string())?,
            ticker: SmolStr::new(row.ticker),
            buy_price: Decimal::from_str(&row.buy_price).map_err(|e| e.to_string())?,
            buy_date: DateTime::from_naive_utc_and_offset(row.buy_date, Utc),
            current_price: Decimal::from_str(&row.current_price).map_err(|e| e.to_string())?,
            last_updated: DateTime::from_naive_utc_and_offset(row.last_updated, Utc),
            target_price: row.target_price.map(|p| Decimal::from_str(&p)).transpose().map_err(|e| e.to_string())?,
            stop_loss: row.stop_loss.map(|p| Decimal::from_str(&p)).transpose().map_err(|e| e.to_string())?,
            trigger_type: row.trigger_type,
            sector: row.sector,
            scenario: row.scenario,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = stock_holdings)]
pub(crate) struct NewPositionRow {
    pub market: String,
    pub ticker: String,
    pub buy_price: String,
    pub buy_date: NaiveDateTime,
    pub current_price: String,
    pub last_updated: NaiveDateTime,
    pub sector: Option<String>,
    pub scenario: Option<String>,
}

/// A closed round-trip, appended once on every successful SELL.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeHistoryEntry {
    pub market: Market,
    pub ticker: SmolStr,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub buy_date: DateTime<Utc>,
    pub sell_date: DateTime<Utc>,
    pub profit_rate: Decimal,
    pub holding_days: i64,
    pub sector: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = trading_history)]
pub(crate) struct NewTradeHistoryRow {
    pub market: String,
    pub ticker: String,
    pub buy_price: String,
    pub sell_price: String,
    pub buy_date: NaiveDateTime,
    pub sell_date: NaiveDateTime,
    pub profit_rate: String,
    pub holding_days: i32,
    pub sector: Option<String>,
}

impl From<&TradeHistoryEntry> for NewTradeHistoryRow {
    fn from(entry: &TradeHistoryEntry) -> Self {
        Self {
            market: entry.market.to_string(),
            ticker: entry.ticker.to_string(),
            buy_price: entry.buy_price.to_string(),
            sell_price: entry.sell_price.to_string(),
            buy_date: entry.buy_date.naive_utc(),
            sell_date: entry.sell_date.naive_utc(),
            profit_rate: entry.profit_rate.to_string(),
            holding_days: entry.holding_days as i32,
            sector: entry.sector.clone(),
        }
    }
}

/// One row per attempted order, success or failure, never updated after
/// insert.
#[derive(Debug, Clone)]
pub struct TradeLogEntry {
    pub ticker: SmolStr,
    pub market: Market,
    pub action: Side,
    pub quantity: u64,
    pub price: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
    pub order_no: Option<String>,
    pub success: bool,
    pub message: String,
}

#[derive(Insertable)]
#[diesel(table_name = trade_logs)]
pub(crate) struct NewTradeLogRow {
    pub ticker: String,
    pub market: String,
    pub action: String,
    pub quantity: i64,
    pub price: Option<String>,
    pub total_amount: Option<String>,
    pub timestamp: NaiveDateTime,
    pub order_no: Option<String>,
    pub success: bool,
    pub message: Option<String>,
}

impl From<&TradeLogEntry> for NewTradeLogRow {
    fn from(entry: &TradeLogEntry) -> Self {
        Self {
            ticker: entry.ticker.to_string(),
            market: entry.market.to_string(),
            action: match entry.action {
                Side::Buy => "BUY".to_string(),
                Side::Sell => "SELL".to_string(),
            },
            quantity: entry.quantity as i64,
            price: entry.price.map(|p| p.to_string()),
            total_amount: entry.total_amount.map(|a| a.to_string()),
            timestamp: entry.timestamp.naive_utc(),
            order_no: entry.order_no.clone(),
            success: entry.success,
            message: Some(entry.message.clone()),
        }
    }
}
