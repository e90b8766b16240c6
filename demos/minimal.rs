//! A basic example showing minimal usage
//!
//! We construct a [`RunningMedian`], fill it with data, and then read out the exact median

use rust_decimal::Decimal;
use sales_report::RunningMedian;

/// Some unit costs to calculate the median for, in cents
///
/// In practice, this will probably be a much larger stream
/// Note that the exact median is 44.50
const DATA: [i64; 15] = [
    1860, 8310, 2150, 2140, 6340, 6410, 460, 9270, 3110, 9480, 240, 4450, 7000, 1710, 6100,
];

fn main() {
    let mut median = RunningMedian::new();

    // Read data points from our data source, and fold them into the median
    for cents in DATA {
        median.insert(Decimal::new(cents, 2));
    }

    // An empty stream has no median, so this is an Option
    match median.median() {
        Some(m) => println!("Median unit cost: {m}"),
        None => println!("No data"),
    }
}
