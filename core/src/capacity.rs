//! Daily used capacity: a non-persistent, per-process record of "has this
//! (user, command) pair already run today", used to enforce one heavy
//! analysis per user per day by a caller outside this core. This module
//! exposes only the admission primitive; wiring it to a concrete
//! heavy-analysis feature is left to that caller.

use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;

/// In-memory `(user, command) -> last used date` guard. Safe for a
/// single-node deployment only — state is process-local and not shared
/// across instances.
#[derive(Debug, Default)]
pub struct DailyCapacityGuard<U, C> {
    used: Mutex<HashMap<(U, C), NaiveDate>>,
}

impl<U, C> DailyCapacityGuard<U, C>
where
    U: Eq + Hash + Clone,
    C: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            used: Mutex::new(HashMap::new()),
        }
    }

    /// Attempts to consume today's capacity for `(user, command)`. Returns
    /// `true` and records today's date the first time it's called for a
    /// given pair on a given date; returns `false` on every subsequent call
    /// that day.
    pub fn try_acquire(&self, user: U, command: C, today: NaiveDate) -> bool {
        let mut used = self.used.lock();
        let key = (user, command);
        match used.get(&key) {
            Some(date) if *date == today => false,
            _ => {
                used.insert(key, today);
                true
            }
        }
    }
}
