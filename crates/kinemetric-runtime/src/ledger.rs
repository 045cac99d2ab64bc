//! In-memory credit ledger

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use kinemetric_core::AthleteId;

use crate::CreditLedger;

/// One balance movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub athlete: AthleteId,
    /// Positive for deposits and refunds, negative for debits
    pub delta: i64,
    pub reason: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<AthleteId, i64>,
    entries: Vec<LedgerEntry>,
}

impl LedgerState {
    fn record(&mut self, athlete: AthleteId, delta: i64, reason: &str) {
        *self.balances.entry(athlete).or_insert(0) += delta;
        self.entries.push(LedgerEntry {
            athlete,
            delta,
            reason: reason.to_string(),
            at: Utc::now(),
        });
    }
}

/// Credit ledger backed by a single lock
///
/// Every operation, including the balance check inside `debit`, runs under
/// the same lock, so concurrent debits for one athlete cannot overdraw.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add credits to an athlete's balance
    pub fn deposit(&self, athlete: AthleteId, units: u32) {
        self.state.lock().record(athlete, i64::from(units), "deposit");
    }

    /// Movement history, oldest first
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.state.lock().entries.clone()
    }

    /// Movements for one athlete
    pub fn entries_for(&self, athlete: AthleteId) -> Vec<LedgerEntry> {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|e| e.athlete == athlete)
            .cloned()
            .collect()
    }
}

impl CreditLedger for InMemoryLedger {
    fn get_balance(&self, athlete: AthleteId) -> i64 {
        self.state.lock().balances.get(&athlete).copied().unwrap_or(0)
    }

    fn debit(&self, athlete: AthleteId, units: u32) -> bool {
        let mut state = self.state.lock();
        let balance = state.balances.get(&athlete).copied().unwrap_or(0);
        let units = i64::from(units);
        if balance < units {
            debug!(athlete = %athlete, balance, units, "debit rejected");
            return false;
        }
        state.record(athlete, -units, "debit");
        true
    }

    fn refund(&self, athlete: AthleteId, units: u32, reason: &str) {
        warn!(athlete = %athlete, units, reason, "refunding credits");
        self.state.lock().record(athlete, i64::from(units), reason);
    }
}
