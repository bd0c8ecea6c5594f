use crate::error::LedgerError;
use crate::models::{
    NewPositionRow, NewTradeHistoryRow, NewTradeLogRow, Position, PositionRow, TradeHistoryEntry,
    TradeLogEntry,
};
use crate::schema::{stock_holdings, trade_logs, trading_history};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use prism_core::Market;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::info;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Position set never holds more than this many rows.
pub const DEFAULT_POSITION_LIMIT: usize = 10;
/// No more than this many positions may share a sector.
pub const DEFAULT_SECTOR_LIMIT: usize = 2;
/// No sector may exceed this fraction of total positions.
pub const DEFAULT_SECTOR_RATIO: f64 = 0.40;

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// What the bot believes it holds, every trade it has ever closed, and an
/// append-only record of every order it has attempted.
#[derive(Clone)]
pub struct Ledger {
    pool: SqlitePool,
    position_limit: usize,
    sector_limit: usize,
    sector_ratio: f64,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("position_limit", &self.position_limit)
            .field("sector_limit", &self.sector_limit)
            .field("sector_ratio", &self.sector_ratio)
            .finish_non_exhaustive()
    }
}

impl Ledger {
    pub fn connect(database_url: &str) -> Result<Self, LedgerError> {
        Self::connect_with_limits(
            database_url,
            DEFAULT_POSITION_LIMIT,
            DEFAULT_SECTOR_LIMIT,
            DEFAULT_SECTOR_RATIO,
        )
    }

    pub fn connect_with_limits(
        database_url: &str,
        position_limit: usize,
        sector_limit: usize,
        sector_ratio: f64,
    ) -> Result<Self, LedgerError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| LedgerError::Connection(e.to_string()))?;
        {
            let mut conn = pool.get()?;
            conn.run_pending_migrations(MIGRATIONS)
                .map_err(|e| LedgerError::Migration(e.to_string()))?;
        }
        info!(database_url, "ledger ready");
        Ok(Self {
            pool,
            position_limit,
            sector_limit,
            sector_ratio,
        })
    }

    fn load_positions(conn: &mut SqliteConnection) -> Result<Vec<Position>, LedgerError> {
        use crate::schema::stock_holdings::dsl::*;
        let rows: Vec<PositionRow> = stock_holdings.load(conn)?;
        rows.into_iter()
            .map(|row| Position::try_from(row).map_err(LedgerError::Corrupt))
            .collect()
    }

    /// Refuses a prospective buy that would violate the position-slot limit
    /// or sector-concentration rule, *before* any broker call is made. A
    /// ticker already held always passes — the subsequent buy no-ops rather
    /// than adding a slot.
    pub async fn check_admission(&self, ticker: &str, sector: Option<&str>) -> Result<(), LedgerError> {
        let pool = self.pool.clone();
        let ticker = ticker.to_string();
        let sector = sector.map(str::to_string);
        let position_limit = self.position_limit;
        let sector_limit = self.sector_limit;
        let sector_ratio = self.sector_ratio;

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let positions = Self::load_positions(&mut conn)?;

            if positions.iter().any(|p| p.ticker.as_str() == ticker) {
                return Ok(());
            }

            if positions.len() >= position_limit {
                return Err(LedgerError::PositionLimitExceeded {
                    held: positions.len(),
                    limit: position_limit,
                });
            }

            if let Some(sector) = sector {
                let held_in_sector = positions.iter().filter(|p| p.sector.as_deref() == Some(sector.as_str())).count();
                let would_hold = held_in_sector + 1;
                let total_after = positions.len() + 1;
                let ratio = would_hold as f64 / total_after as f64;
                if would_hold > sector_limit || ratio > sector_ratio {
                    return Err(LedgerError::SectorConcentration {
                        sector,
                        would_hold,
                        limit: sector_limit,
                        ratio: sector_ratio * 100.0,
                    });
                }
            }

            Ok(())
        })
        .await
        .map_err(|e| LedgerError::Query(e.to_string()))?
    }

    /// Inserts a new position on a successful BUY, or no-ops if one is
    /// already present — positions are never averaged into. Returns
    /// whether a row was actually inserted.
    pub async fn record_buy(
        &self,
        market: Market,
        ticker: &str,
        fill_price: Decimal,
        now: DateTime<Utc>,
        sector: Option<String>,
        scenario: Option<String>,
    ) -> Result<bool, LedgerError> {
        let pool = self.pool.clone();
        let market_str = market.to_string();
        let ticker = ticker.to_string();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let already_held: i64 = stock_holdings::table
                .filter(stock_holdings::market.eq(&market_str))
                .filter(stock_holdings::ticker.eq(&ticker))
                .count()
                .get_result(&mut conn)?;
            if already_held > 0 {
                return Ok(false);
            }

            let new_row = NewPositionRow {
                market: market_str,
                ticker,
                buy_price: fill_price.to_string(),
                buy_date: now.naive_utc(),
                current_price: fill_price.to_string(),
                last_updated: now.naive_utc(),
                sector,
                scenario,
            };
            diesel::insert_into(stock_holdings::table)
                .values(&new_row)
                .execute(&mut conn)?;
            Ok::<_, LedgerError>(true)
        })
        .await
        .map_err(|e| LedgerError::Query(e.to_string()))?
    }

    /// Closes a position on a successful SELL: computes profit rate and
    /// holding days, appends to trade history, and deletes the position row.
    /// No-ops (returns `Ok(None)`) if the ticker isn't held — the trade log
    /// still records the attempt via [`Ledger::append_trade_log`] (spec
    /// §4.H, and the coordinator's open-question decision that SELL on an
    /// unheld ticker is never short-circuited before reaching the broker).
    pub async fn record_sell(
        &self,
        market: Market,
        ticker: &str,
        sell_price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Option<TradeHistoryEntry>, LedgerError> {
        let pool = self.pool.clone();
        let market_str = market.to_string();
        let ticker_owned = ticker.to_string();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let existing: Option<PositionRow> = stock_holdings::table
                .filter(stock_holdings::market.eq(&market_str))
                .filter(stock_holdings::ticker.eq(&ticker_owned))
                .first(&mut conn)
                .optional()?;

            let Some(row) = existing else {
                return Ok(None);
            };
            let position = Position::try_from(row).map_err(LedgerError::Corrupt)?;

            let profit_rate = (sell_price - position.buy_price) / position.buy_price;
            let holding_days = (now - position.buy_date).num_days();

            let entry = TradeHistoryEntry {
                market: position.market,
                ticker: position.ticker.clone(),
                buy_price: position.buy_price,
                sell_price,
                buy_date: position.buy_date,
                sell_date: now,
                profit_rate,
                holding_days,
                sector: position.sector.clone(),
            };

            let new_row = NewTradeHistoryRow::from(&entry);
            diesel::insert_into(trading_history::table)
                .values(&new_row)
                .execute(&mut conn)?;
            diesel::delete(
                stock_holdings::table
                    .filter(stock_holdings::market.eq(&market_str))
                    .filter(stock_holdings::ticker.eq(&ticker_owned)),
            )
            .execute(&mut conn)?;

            Ok::<_, LedgerError>(Some(entry))
        })
        .await
        .map_err(|e| LedgerError::Query(e.to_string()))?
    }

    /// Appends one row to the execution log for any attempted order,
    /// success or failure. Never updated after insert.
    pub async fn append_trade_log(&self, entry: TradeLogEntry) -> Result<(), LedgerError> {
        let pool = self.pool.clone();
        let new_row = NewTradeLogRow::from(&entry);
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            diesel::insert_into(trade_logs::table)
                .values(&new_row)
                .execute(&mut conn)?;
            Ok::<_, LedgerError>(())
        })
        .await
        .map_err(|e| LedgerError::Query(e.to_string()))?
    }

    pub async fn holdings(&self) -> Result<Vec<Position>, LedgerError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            Self::load_positions(&mut conn)
        })
        .await
        .map_err(|e| LedgerError::Query(e.to_string()))?
    }

    pub async fn position(&self, market: Market, ticker: &str) -> Result<Option<Position>, LedgerError> {
        let pool = self.pool.clone();
        let market_str = market.to_string();
        let ticker = ticker.to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let row: Option<PositionRow> = stock_holdings::table
                .filter(stock_holdings::market.eq(market_str))
                .filter(stock_holdings::ticker.eq(ticker))
                .first(&mut conn)
                .optional()?;
            row.map(|r| Position::try_from(r).map_err(LedgerError::Corrupt)).transpose()
        })
        .await
        .map_err(|e| LedgerError::Query(e.to_string()))?
    }

    pub async fn sector_counts(&self) -> Result<HashMap<String, usize>, LedgerError> {
        let positions = self.holdings().await?;
        let mut counts = HashMap::new();
        for sector in positions.into_iter().filter_map(|p| p.sector) {
            *counts.entry(sector).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
