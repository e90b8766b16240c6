//! Streaming aggregation of sale records

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::error::{RecordPosition, ReportError, ValidationError};
use crate::median::RunningMedian;
use crate::record::{local_now, SaleRecord};
use crate::report::SalesReport;
use crate::tally::RegionFrequency;

/// Running totals for one aggregation run
///
/// The [`Self::new`] constructor creates an empty aggregator that validates
/// against the local clock; [`Self::with_reference_time`] pins that clock.
/// Records are fed one at a time with [`Self::accept`], and once the input is
/// exhausted [`Self::finalize`] consumes the aggregator into a [`SalesReport`].
///
/// A rejected record leaves every total, tally and the median untouched.
#[derive(Debug, Clone)]
pub struct SalesAggregator {
    /// Fixed validation clock, or [`None`] to read the local clock per record
    reference_time: Option<NaiveDateTime>,

    regions: RegionFrequency,
    unit_costs: RunningMedian,

    total_revenue: Decimal,
    first_order: Option<NaiveDateTime>,
    last_order: Option<NaiveDateTime>,

    /// Records offered so far, accepted or not
    offered: u64,
    /// Records admitted into the totals
    accepted: u64,
}

impl Default for SalesAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl SalesAggregator {
    /// Constructs an empty aggregator that validates against the local clock
    pub fn new() -> Self {
        Self {
            reference_time: None,
            regions: RegionFrequency::new(),
            unit_costs: RunningMedian::new(),
            total_revenue: Decimal::ZERO,
            first_order: None,
            last_order: None,
            offered: 0,
            accepted: 0,
        }
    }

    /// Constructs an empty aggregator that treats `now` as the present moment
    pub fn with_reference_time(now: NaiveDateTime) -> Self {
        Self {
            reference_time: Some(now),
            ..Self::new()
        }
    }

    /// Offers the next record in the stream
    ///
    /// The record's position is its zero-based index among offered records.
    pub fn accept(&mut self, record: &SaleRecord) -> Result<(), ReportError> {
        self.accept_at(RecordPosition::at_index(self.offered), record)
    }

    /// Offers the next record, reporting failures against `position`
    pub fn accept_at(
        &mut self,
        position: RecordPosition,
        record: &SaleRecord,
    ) -> Result<(), ReportError> {
        self.offered += 1;

        let admitted = self
            .admit(record)
            .map_err(|source| ReportError::InvalidRecord { position, source });

        #[cfg(feature = "log")]
        {
            match &admitted {
                Ok(()) => log::debug!("Accepted {position}: region {:?}", record.region),
                Err(e) => log::warn!("Rejected sale record. {e}"),
            }
        }

        admitted?;
        self.check_invariants()
    }

    /// Offers every record of `records` in order, stopping at the first failure
    pub fn accept_all<'a, I>(&mut self, records: I) -> Result<(), ReportError>
    where
        I: IntoIterator<Item = &'a SaleRecord>,
    {
        for record in records {
            self.accept(record)?;
        }

        Ok(())
    }

    /// Validates every field, then applies all updates
    ///
    /// Everything that can fail is checked before the first mutation.
    fn admit(&mut self, record: &SaleRecord) -> Result<(), ValidationError> {
        let now = self.reference_time.unwrap_or_else(local_now);
        record.validate_at(now)?;

        let order_date = record.checked_order_date(now)?;
        let total_revenue = self
            .total_revenue
            .checked_add(record.total_revenue)
            .ok_or(ValidationError::RevenueOverflow(record.total_revenue))?;

        self.regions.observe(&record.region)?;
        self.unit_costs.insert(record.unit_cost);
        self.total_revenue = total_revenue;
        self.first_order = Some(self.first_order.map_or(order_date, |d| d.min(order_date)));
        self.last_order = Some(self.last_order.map_or(order_date, |d| d.max(order_date)));
        self.accepted += 1;

        Ok(())
    }

    /// Number of records offered, including rejected ones
    pub fn offered(&self) -> u64 {
        self.offered
    }

    /// Number of records admitted into the totals
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Sum of revenue over accepted records
    pub fn total_revenue(&self) -> Decimal {
        self.total_revenue
    }

    /// Earliest accepted order date
    pub fn first_order(&self) -> Option<NaiveDateTime> {
        self.first_order
    }

    /// Latest accepted order date
    pub fn last_order(&self) -> Option<NaiveDateTime> {
        self.last_order
    }

    /// Whole days from the first to the last order, zero with fewer than two records
    pub fn days_between(&self) -> i64 {
        match (self.first_order, self.last_order) {
            (Some(first), Some(last)) => (last - first).num_days(),
            _ => 0,
        }
    }

    /// Region tallies collected so far
    pub fn regions(&self) -> &RegionFrequency {
        &self.regions
    }

    /// Median engine fed with every accepted unit cost
    pub fn unit_costs(&self) -> &RunningMedian {
        &self.unit_costs
    }

    /// Cross-checks the counts kept by each component
    pub fn check_invariants(&self) -> Result<(), ReportError> {
        self.unit_costs.check_invariants()?;

        let tallied = self.regions.total_observations();
        if tallied != self.accepted {
            return Err(violation(format!(
                "region tallies sum to {tallied} but {} records were accepted",
                self.accepted
            )));
        }

        if self.unit_costs.len() != self.accepted {
            return Err(violation(format!(
                "median holds {} costs but {} records were accepted",
                self.unit_costs.len(),
                self.accepted
            )));
        }

        if let (Some(first), Some(last)) = (self.first_order, self.last_order) {
            if first > last {
                return Err(violation(format!(
                    "first order {first} is after last order {last}"
                )));
            }
        }

        Ok(())
    }

    /// Ends the run and assembles the report
    ///
    /// Fails with [`ReportError::EmptyStream`] if no record was accepted.
    pub fn finalize(self) -> Result<SalesReport, ReportError> {
        SalesReport::build(&self)
    }
}

fn violation(message: String) -> ReportError {
    #[cfg(feature = "log")]
    log::error!("Sales aggregation invariant violated: {message}");

    ReportError::InvariantViolation(message)
}
