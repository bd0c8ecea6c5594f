#![forbid(unsafe_code)]
#![warn(unused, missing_debug_implementations, rust_2018_idioms)]

//! Market calendar: the authoritative oracle for "is market X open right
//! now" and "when does it next open".

mod holidays;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::{Tz, US::Eastern, Asia::Seoul};
use prism_core::Market;
use std::collections::HashSet;

/// Session window in a market's own local time.
#[derive(Debug, Clone, Copy)]
struct Session {
    tz: Tz,
    open: NaiveTime,
    close: NaiveTime,
    /// Local hour/minute `next_open` clamps to — KR tolerates a few minutes
    /// of startup drift past the literal open.
    next_open_clamp: NaiveTime,
}

trait MarketSession {
    fn session(self) -> Session;
}

impl MarketSession for Market {
    fn session(self) -> Session {
        match self {
            Market::Kr => Session {
                tz: Seoul,
                open: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                close: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
                next_open_clamp: NaiveTime::from_hms_opt(9, 5, 0).unwrap(),
            },
            Market::Us => Session {
                tz: Eastern,
                open: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
                close: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
                next_open_clamp: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            },
        }
    }
}

/// Human-readable session status, meant for startup and diagnostic logging.
#[derive(Debug, Clone)]
pub struct MarketStatus {
    pub market: Market,
    pub is_trading_day: bool,
    pub is_open: bool,
    pub reason: Option<String>,
    pub next_open: DateTime<Utc>,
}

/// Authoritative market-hours oracle for KR and US. KR's holiday set is
/// supplied externally; US holidays are computed from the NYSE rules in
/// [`holidays::nyse_holidays`].
#[derive(Debug, Clone)]
pub struct MarketCalendar {
    kr_holidays: HashSet<NaiveDate>,
}

impl MarketCalendar {
    /// Builds a calendar with the given externally-supplied KR holiday set.
    pub fn new(kr_holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            kr_holidays: kr_holidays.into_iter().collect(),
        }
    }

    fn is_holiday(&self, market: Market, date: NaiveDate) -> bool {
        match market {
            Market::Kr => self.kr_holidays.contains(&date),
            Market::Us => holidays::nyse_holidays(date.year()).contains(&date),
        }
    }

    fn is_trading_day(&self, market: Market, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.is_holiday(market, date)
    }

    /// Is `market` accepting orders at `instant`?
    pub fn is_open(&self, market: Market, instant: DateTime<Utc>) -> bool {
        let session = market.session();
        let local = instant.with_timezone(&session.tz);
        let date = local.date_naive();

        if !self.is_trading_day(market, date) {
            return false;
        }

        let time = local.time();
        time >= session.open && time <= session.close
    }

    /// Earliest instant at or after which `market` will be accepting orders,
    /// assuming it is currently closed. Always lands inside an open session.
    pub fn next_open(&self, market: Market, instant: DateTime<Utc>) -> DateTime<Utc> {
        let session = market.session();
        let local = instant.with_timezone(&session.tz);

        // If currently within today's session and before close, "next open"
        // is simply now — the market is already open.
        if self.is_open(market, instant) {
            return instant;
        }

        let mut candidate_date = local.date_naive();
        // If we're before today's open on a trading day, today still works.
        let today_is_candidate =
            self.is_trading_day(market, candidate_date) && local.time() < session.open;

        if !today_is_candidate {
            candidate_date += chrono::Duration::days(1);
            while !self.is_trading_day(market, candidate_date) {
                candidate_date += chrono::Duration::days(1);
            }
        }

        let local_open = session
            .tz
            .from_local_datetime(&candidate_date.and_time(session.next_open_clamp))
            .single()
            .expect("next-open clamp time is unambiguous");

        local_open.with_timezone(&Utc)
    }

    /// Most recent trading day on or before `date` — used to pick a
    /// reference date that tolerates weekend/holiday runs.
    pub fn last_trading_day(&self, market: Market, date: NaiveDate) -> NaiveDate {
        let mut candidate = date;
        while !self.is_trading_day(market, candidate) {
            candidate -= chrono::Duration::days(1);
        }
        candidate
    }

    /// Structured status for startup/diagnostic logging.
    pub fn status(&self, market: Market, instant: DateTime<Utc>) -> MarketStatus {
        let session = market.session();
        let local = instant.with_timezone(&session.tz);
        let date = local.date_naive();
        let is_trading_day = self.is_trading_day(market, date);
        let is_open = self.is_open(market, instant);

        let reason = if !is_trading_day {
            Some(if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                "weekend".to_string()
            } else {
                "holiday".to_string()
            })
        } else if !is_open {
            Some(if local.hour() < session.open.hour() {
                "before session open".to_string()
            } else {
                "after session close".to_string()
            })
        } else {
            None
        };

        MarketStatus {
            market,
            is_trading_day,
            is_open,
            reason,
            next_open: self.next_open(market, instant),
        }
    }
}
