//! Final sales report and its response shape

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::SalesAggregator;
use crate::error::ReportError;

/// Summary of one completed aggregation run
///
/// Holds owned copies of every figure, so it outlives the aggregator it was
/// built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesReport {
    most_common_region: String,
    first_order: NaiveDateTime,
    last_order: NaiveDateTime,
    total_revenue: Decimal,
    median_unit_cost: Decimal,
}

impl SalesReport {
    /// Reads the terminal state of `aggregator` into a report
    ///
    /// Fails with [`ReportError::EmptyStream`] if no record was accepted. A
    /// missing date or region alongside a defined median is reported as an
    /// [`ReportError::InvariantViolation`].
    pub(crate) fn build(aggregator: &SalesAggregator) -> Result<Self, ReportError> {
        aggregator.check_invariants()?;

        let Some(median_unit_cost) = aggregator.unit_costs().median() else {
            #[cfg(feature = "log")]
            log::warn!(
                "Sales report requested after {} offered records, none accepted",
                aggregator.offered()
            );

            return Err(ReportError::EmptyStream);
        };

        let (Some(first_order), Some(last_order)) =
            (aggregator.first_order(), aggregator.last_order())
        else {
            return Err(ReportError::InvariantViolation(
                "median is defined but order dates are unset".into(),
            ));
        };

        let most_common_region = aggregator
            .regions()
            .most_frequent()
            .ok_or_else(|| {
                ReportError::InvariantViolation("median is defined but no region was tallied".into())
            })?
            .to_owned();

        if median_unit_cost < Decimal::ZERO {
            return Err(ReportError::InvariantViolation(format!(
                "median unit cost {median_unit_cost} is negative"
            )));
        }

        #[cfg(feature = "log")]
        log::info!(
            "Sales report built from {} records: revenue {}, median unit cost {}",
            aggregator.accepted(),
            aggregator.total_revenue(),
            median_unit_cost
        );

        Ok(Self {
            most_common_region,
            first_order,
            last_order,
            total_revenue: aggregator.total_revenue(),
            median_unit_cost,
        })
    }

    /// Region with the most orders, earliest-seen on ties
    pub fn most_common_region(&self) -> &str {
        &self.most_common_region
    }

    /// Earliest order date
    pub fn first_order(&self) -> NaiveDateTime {
        self.first_order
    }

    /// Latest order date
    pub fn last_order(&self) -> NaiveDateTime {
        self.last_order
    }

    /// Whole days between the first and last order
    pub fn days_between_orders(&self) -> i64 {
        (self.last_order - self.first_order).num_days()
    }

    /// Sum of revenue across all orders
    pub fn total_revenue(&self) -> Decimal {
        self.total_revenue
    }

    /// Median of all unit costs
    pub fn median_unit_cost(&self) -> Decimal {
        self.median_unit_cost
    }
}

/// Serializable view of a [`SalesReport`]
///
/// Field names are camelCase. Decimals serialize as strings so no precision
/// is lost in transit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportResponse {
    /// Region with the most orders
    pub most_common_region: String,
    /// Earliest order date
    pub first_order: NaiveDateTime,
    /// Latest order date
    pub last_order: NaiveDateTime,
    /// Whole days between first and last order
    pub days_between_orders: i64,
    /// Sum of revenue
    pub total_revenue: Decimal,
    /// Median unit cost
    pub median_unit_cost: Decimal,
}

impl From<&SalesReport> for SalesReportResponse {
    fn from(report: &SalesReport) -> Self {
        Self {
            most_common_region: report.most_common_region.clone(),
            first_order: report.first_order,
            last_order: report.last_order,
            days_between_orders: report.days_between_orders(),
            total_revenue: report.total_revenue,
            median_unit_cost: report.median_unit_cost,
        }
    }
}

impl From<SalesReport> for SalesReportResponse {
    fn from(report: SalesReport) -> Self {
        Self::from(&report)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;

    use super::*;
    use crate::record::SaleRecord;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn scenario() -> SalesAggregator {
        let mut agg = SalesAggregator::with_reference_time(date(2024, 1, 1));
        agg.accept_all(&[
            SaleRecord::new("East", d("10"), date(2023, 1, 10), d("100")),
            SaleRecord::new("West", d("20"), date(2023, 1, 20), d("200")),
            SaleRecord::new("East", d("30"), date(2023, 1, 15), d("150")),
        ])
        .unwrap();
        agg
    }

    #[test]
    fn end_to_end_scenario() {
        let report = scenario().finalize().unwrap();

        assert_eq!(report.total_revenue(), d("450"));
        assert_eq!(report.first_order(), date(2023, 1, 10));
        assert_eq!(report.last_order(), date(2023, 1, 20));
        assert_eq!(report.days_between_orders(), 10);
        assert_eq!(report.most_common_region(), "East");
        assert_eq!(report.median_unit_cost(), d("20"));
    }

    #[test]
    fn empty_stream_has_no_report() {
        let agg = SalesAggregator::new();
        assert_eq!(agg.finalize(), Err(ReportError::EmptyStream));
    }

    #[test]
    fn only_rejected_records_is_still_empty() {
        let mut agg = SalesAggregator::with_reference_time(date(2024, 1, 1));
        let _ = agg.accept(&SaleRecord::new("East", d("0"), date(2023, 1, 1), d("1")));

        let err = agg.finalize().unwrap_err();
        assert_eq!(err, ReportError::EmptyStream);
        assert!(err.is_caller_error());
    }

    #[test]
    fn report_survives_aggregator() {
        let report = scenario().finalize().unwrap();
        assert_eq!(report.most_common_region(), "East");
    }

    #[test]
    fn response_serializes_camel_case() {
        let response = SalesReportResponse::from(scenario().finalize().unwrap());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["mostCommonRegion"], "East");
        assert_eq!(json["daysBetweenOrders"], 10);
        assert_eq!(json["totalRevenue"], "450");
        assert_eq!(json["medianUnitCost"], "20");
        assert_eq!(json["firstOrder"], "2023-01-10T00:00:00");
        assert_eq!(json["lastOrder"], "2023-01-20T00:00:00");
    }
}
