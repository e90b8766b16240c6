//! Builds a report straight from a CSV file
//!
//! Usage: `cargo run --example from_csv -- path/to/sales.csv`

use std::fs::File;

use sales_report::{ingest, validate_upload, CsvOptions, SalesAggregator, SalesReportResponse};

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "test_data/sales_records.csv".to_owned());

    let len = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    if let Err(e) = validate_upload(&path, len) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Unable to open {path}: {e}");
            std::process::exit(1);
        }
    };

    match ingest(file, CsvOptions::default(), SalesAggregator::new()) {
        Ok(report) => println!("{:#?}", SalesReportResponse::from(report)),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    }
}
