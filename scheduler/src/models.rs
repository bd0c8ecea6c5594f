use crate::schema::scheduled_orders;
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use prism_core::Market;
use prism_signal::SignalType;
use rust_decimal::Decimal;
use smol_str::SmolStr;
use std::str::FromStr;

/// Lifecycle state of a [`ScheduledOrder`]. Once `Executed` or `Failed`,
/// never revived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Executed,
    Failed,
}

impl OrderStatus {
    fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Executed => "executed",
            OrderStatus::Failed => "failed",
        }
    }

    fn parse(s: &str) -> Result<Self, String> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "executed" => Ok(OrderStatus::Executed),
            "failed" => Ok(OrderStatus::Failed),
            other => Err(format!("unknown status {other}")),
        }
    }
}

/// A deferred signal, persisted until its market reopens.
#[derive(Debug, Clone)]
pub struct ScheduledOrder {
    pub id: i32,
    pub ticker: SmolStr,
    pub market: Market,
    pub signal_type: SignalType,
    pub price: Option<Decimal>,
    pub company_name: Option<String>,
    pub execute_after: DateTime<Utc>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    /// Full original payload, kept for faithful reconstruction into a
    /// `prism_signal::Signal` at replay time.
    pub signal_payload: String,
}

#[derive(Queryable)]
pub(crate) struct Row {
    pub id: i32,
    pub ticker: String,
    pub market: String,
    pub signal_type: String,
    pub price: Option<String>,
    pub company_name: Option<String>,
    pub execute_after: NaiveDateTime,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub executed_at: Option<NaiveDateTime>,
    pub error_message: Option<String>,
    pub signal_payload: String,
}

impl TryFrom<Row> for ScheduledOrder {
    type Error = String;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(ScheduledOrder {
            id: row.id,
            ticker: SmolStr::new(row.ticker),
            market: Market::from_str(&row.market).map_err(|e| e.to_string())?,
            signal_type: SignalType::from_str(&row.signal_type).map_err(|e| e.to_string())?,
            price: row
                .price
                .map(|p| Decimal::from_str(&p))
                .transpose()
                .map_err(|e| e.to_string())?,
            company_name: row.company_name,
            execute_after: DateTime::from_naive_utc_and_offset(row.execute_after, Utc),
            status: OrderStatus::parse(&row.status)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            executed_at: row
                .executed_at
                .map(|t| DateTime::from_naive_utc_and_offset(t, Utc)),
            error_message: row.error_message,
            signal_payload: row.signal_payload,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = scheduled_orders)]
pub(crate) struct NewRow {
    pub ticker: String,
    pub market: String,
    pub signal_type: String,
    pub price: Option<String>,
    pub company_name: Option<String>,
    pub execute_after: NaiveDateTime,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub signal_payload: String,
}

impl NewRow {
    pub fn pending(
        ticker: &str,
        market: Market,
        signal_type: SignalType,
        price: Option<Decimal>,
        company_name: Option<String>,
        execute_after: DateTime<Utc>,
        created_at: DateTime<Utc>,
        signal_payload: String,
    ) -> Self {
        Self {
            ticker: ticker.to_string(),
            market: market.to_string(),
            signal_type: signal_type.to_string(),
            price: price.map(|p| p.to_string()),
            company_name,
            execute_after: execute_after.naive_utc(),
            status: OrderStatus::Pending.as_str().to_string(),
            created_at: created_at.naive_utc(),
            signal_payload,
        }
    }
}

pub(crate) fn status_str(status: OrderStatus) -> &'static str {
    status.as_str()
}
