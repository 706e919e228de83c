//! Where generated trail cores go.

use std::collections::BTreeMap;

use keccakf::TrailCore;

/// Returned by a [`TrailFetcher`] to tell the generator whether it wants more trail cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Receives every trail core a generator accepts, exactly once.
pub trait TrailFetcher {
    fn fetch_trail(&mut self, trail: TrailCore) -> Flow;
}

impl TrailFetcher for Vec<TrailCore> {
    fn fetch_trail(&mut self, trail: TrailCore) -> Flow {
        self.push(trail);
        Flow::Continue
    }
}

/// Counts trail cores per weight, optionally stopping the search after `limit` of them.
#[derive(Debug, Clone, Default)]
pub struct TrailCounter {
    per_weight: BTreeMap<u32, u64>,
    total: u64,
    limit: Option<u64>,
}

impl TrailCounter {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of trail cores seen, per weight.
    pub fn per_weight(&self) -> &BTreeMap<u32, u64> {
        &self.per_weight
    }
}

impl TrailFetcher for TrailCounter {
    fn fetch_trail(&mut self, trail: TrailCore) -> Flow {
        *self.per_weight.entry(trail.weight()).or_insert(0) += 1;
        self.total += 1;
        match self.limit {
            Some(limit) if self.total >= limit => Flow::Stop,
            _ => Flow::Continue,
        }
    }
}
