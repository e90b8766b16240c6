#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod aggregate;
pub mod decode;
pub mod error;
pub mod median;
pub mod record;
pub mod report;
pub mod tally;

pub use aggregate::SalesAggregator;
pub use decode::{ingest, validate_upload, CsvOptions, CsvSaleReader};
pub use error::{DecodeError, IngestError, RecordPosition, ReportError, ValidationError};
pub use median::RunningMedian;
pub use record::{local_now, SaleRecord};
pub use report::{SalesReport, SalesReportResponse};
pub use tally::{RegionFrequency, RegionTally};
