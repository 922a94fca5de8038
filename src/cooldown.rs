// =============================================================================
// Cooldown Gate — suppresses repeated signals for the same key
// =============================================================================
//
// `allow` is a single check-and-record: the lock is held across reading the
// last-fired instant and writing the new one, so two callers can never both
// be admitted for the same key inside one window.
//
// State lives only in memory. After a restart the map is empty, so a signal
// already sent shortly before the restart may be sent once more.
// =============================================================================

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::types::Side;

/// Cooldown key. `side` is `None` when both sides share one cooldown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CooldownKey {
    pub symbol: String,
    pub side: Option<Side>,
}

impl std::fmt::Display for CooldownKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.side {
            Some(side) => write!(f, "{}:{}", self.symbol, side),
            None => write!(f, "{}", self.symbol),
        }
    }
}

/// How a strategy keys its cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CooldownScope {
    /// Any fire on the symbol blocks both sides.
    PerSymbol,
    /// BUY and SELL cool down independently.
    PerSymbolSide,
}

impl CooldownScope {
    pub fn key(&self, symbol: &str, side: Side) -> CooldownKey {
        CooldownKey {
            symbol: symbol.to_string(),
            side: match self {
                Self::PerSymbol => None,
                Self::PerSymbolSide => Some(side),
            },
        }
    }
}

/// One entry of the cooldown map, for the status API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CooldownEntry {
    pub key: String,
    pub last_fired: DateTime<Utc>,
    /// Seconds until the key may fire again; 0 once the window has passed.
    pub remaining_secs: i64,
}

/// A window of `minutes`, or `None` when it does not fit a `Duration`.
pub fn window_minutes(minutes: u64) -> Option<Duration> {
    i64::try_from(minutes).ok().and_then(Duration::try_minutes)
}

fn time_left(last: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> Option<Duration> {
    // Only a clock running backwards can overflow here; the key stays blocked.
    let left = window.checked_sub(&(now - last)).unwrap_or(Duration::MAX);
    (left > Duration::zero()).then_some(left)
}

#[derive(Default)]
pub struct CooldownGate {
    last_fired: Mutex<HashMap<CooldownKey, DateTime<Utc>>>,
}

impl CooldownGate {
    pub fn new() -> Self {
        Self::with_entries(std::iter::empty())
    }

    /// Seed the gate with fires recorded elsewhere (e.g. a persistent store).
    pub fn with_entries(entries: impl IntoIterator<Item = (CooldownKey, DateTime<Utc>)>) -> Self {
        Self {
            last_fired: Mutex::new(entries.into_iter().collect()),
        }
    }

    /// Admit `key` if it never fired or its last fire is at least `window`
    /// before `now`. An admitted call records `now` as the new last fire.
    pub fn allow(&self, key: &CooldownKey, now: DateTime<Utc>, window: Duration) -> bool {
        let mut map = self.last_fired.lock();
        let admitted = match map.get(key) {
            Some(&last) => now - last >= window,
            None => true,
        };
        if admitted {
            map.insert(key.clone(), now);
        }
        admitted
    }

    pub fn last_fired(&self, key: &CooldownKey) -> Option<DateTime<Utc>> {
        self.last_fired.lock().get(key).copied()
    }

    /// Snapshot of all entries as of `now`, sorted by key.
    pub fn entries(&self, now: DateTime<Utc>, window: Duration) -> Vec<CooldownEntry> {
        let mut entries: Vec<CooldownEntry> = self
            .last_fired
            .lock()
            .iter()
            .map(|(k, &t)| CooldownEntry {
                key: k.to_string(),
                last_fired: t,
                remaining_secs: time_left(t, now, window).map_or(0, |d| d.num_seconds()),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    pub fn len(&self) -> usize {
        self.last_fired.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
