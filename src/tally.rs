//! Per-region order counts with a stable "most frequent" pick

use std::collections::HashMap;

use crate::error::ValidationError;

/// Order count for one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTally {
    region: String,
    order_count: u64,
}

impl RegionTally {
    /// Starts a tally for a region that has just been seen once
    pub fn new(region: impl Into<String>) -> Result<Self, ValidationError> {
        let region = region.into();
        if region.trim().is_empty() {
            return Err(ValidationError::EmptyRegion);
        }

        Ok(Self {
            region,
            order_count: 1,
        })
    }

    /// Region key, exactly as first observed
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Number of orders observed for this region
    pub fn order_count(&self) -> u64 {
        self.order_count
    }

    fn increment(&mut self) {
        self.order_count += 1;
    }
}

/// Occurrence counts per region, kept in first-seen order
///
/// Keys are compared by exact text: `"East"` and `" East"` are different
/// regions. Tallies are never removed.
#[derive(Debug, Clone, Default)]
pub struct RegionFrequency {
    /// Tallies in the order their region was first observed
    tallies: Vec<RegionTally>,
    /// Region key to its slot in `tallies`
    index: HashMap<String, usize>,
    /// Sum of every tally's count
    observations: u64,
}

impl RegionFrequency {
    /// Constructs an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that `region` would be accepted by [`Self::observe`]
    pub fn check_key(region: &str) -> Result<(), ValidationError> {
        if region.trim().is_empty() {
            Err(ValidationError::EmptyRegion)
        } else {
            Ok(())
        }
    }

    /// Records one occurrence of `region`
    pub fn observe(&mut self, region: &str) -> Result<(), ValidationError> {
        Self::check_key(region)?;

        match self.index.get(region) {
            Some(&slot) => self.tallies[slot].increment(),
            None => {
                let tally = RegionTally::new(region)?;
                self.index.insert(region.to_owned(), self.tallies.len());
                self.tallies.push(tally);
            }
        }
        self.observations += 1;

        Ok(())
    }

    /// Region with the highest count
    ///
    /// Among regions sharing the highest count, the one observed first wins.
    /// Returns [`None`] if nothing has been observed.
    pub fn most_frequent(&self) -> Option<&str> {
        let mut best: Option<&RegionTally> = None;
        for tally in &self.tallies {
            // Strictly greater, so earlier regions keep ties
            if best.map_or(true, |b| tally.order_count > b.order_count) {
                best = Some(tally);
            }
        }

        best.map(RegionTally::region)
    }

    /// All tallies in first-seen order
    pub fn tallies(&self) -> &[RegionTally] {
        &self.tallies
    }

    /// Count for a single region, zero if never observed
    pub fn count_of(&self, region: &str) -> u64 {
        self.index
            .get(region)
            .map_or(0, |&slot| self.tallies[slot].order_count)
    }

    /// Sum of all region counts
    pub fn total_observations(&self) -> u64 {
        self.observations
    }
}
