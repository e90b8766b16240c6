//! Sale records and the admission check they must pass

use chrono::{Local, NaiveDateTime};
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::tally::RegionFrequency;

/// One decoded sales row
///
/// Constructed by whatever decodes the input, validated once, then handed to
/// [`SalesAggregator::accept`](crate::SalesAggregator::accept) by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRecord {
    /// Region key the order is attributed to
    pub region: String,
    /// Cost of a single unit
    pub unit_cost: Decimal,
    /// When the order was placed. [`None`] means the source left it unset.
    pub order_date: Option<NaiveDateTime>,
    /// Revenue for the whole order
    pub total_revenue: Decimal,
}

impl SaleRecord {
    /// Builds a record with every field set
    pub fn new(
        region: impl Into<String>,
        unit_cost: Decimal,
        order_date: NaiveDateTime,
        total_revenue: Decimal,
    ) -> Self {
        Self {
            region: region.into(),
            unit_cost,
            order_date: Some(order_date),
            total_revenue,
        }
    }

    /// Checks the record against the local wall clock
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_at(local_now())
    }

    /// Checks the record, treating `now` as the present moment
    ///
    /// Fields are checked in declaration order and the first failure is
    /// returned. Has no side effects.
    pub fn validate_at(&self, now: NaiveDateTime) -> Result<(), ValidationError> {
        RegionFrequency::check_key(&self.region)?;

        if self.unit_cost <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveUnitCost(self.unit_cost));
        }

        self.checked_order_date(now)?;

        if self.total_revenue < Decimal::ZERO {
            return Err(ValidationError::NegativeRevenue(self.total_revenue));
        }

        Ok(())
    }

    /// Order date, provided it is set and not later than `now`
    pub(crate) fn checked_order_date(
        &self,
        now: NaiveDateTime,
    ) -> Result<NaiveDateTime, ValidationError> {
        match self.order_date {
            None => Err(ValidationError::MissingOrderDate),
            Some(date) if date > now => Err(ValidationError::FutureOrderDate { date, now }),
            Some(date) => Ok(date),
        }
    }
}

/// Current local time, the clock records are validated against by default
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
