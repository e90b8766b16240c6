//! A more fully-fledged example, feeding records into a [`SalesAggregator`] one at a time
//!
//! Bad records are skipped here rather than aborting the run, and the totals are
//! inspected as we go before the final report is built.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sales_report::{SaleRecord, SalesAggregator, SalesReportResponse};

fn main() {
    let day = |m, d| {
        NaiveDate::from_ymd_opt(2023, m, d)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .unwrap()
    };

    let records = [
        SaleRecord::new("East", Decimal::new(1000, 2), day(1, 10), Decimal::new(10000, 2)),
        SaleRecord::new("West", Decimal::new(2000, 2), day(1, 20), Decimal::new(20000, 2)),
        // Rejected: unit cost must be positive
        SaleRecord::new("West", Decimal::ZERO, day(1, 21), Decimal::new(500, 2)),
        SaleRecord::new("East", Decimal::new(3000, 2), day(1, 15), Decimal::new(15000, 2)),
    ];

    let mut aggregator = SalesAggregator::new();
    for record in &records {
        // Skipping is the caller's choice: the aggregator is untouched by a rejected record
        if let Err(e) = aggregator.accept(record) {
            println!("Skipping: {e}");
            continue;
        }

        println!(
            "Accepted {} of {} records, revenue so far {}",
            aggregator.accepted(),
            aggregator.offered(),
            aggregator.total_revenue()
        );
    }

    match aggregator.finalize() {
        Ok(report) => {
            let response = SalesReportResponse::from(report);
            println!("{response:#?}");
        }
        Err(e) => println!("No report: {e}"),
    }
}
