//! Error types for record admission, report finalization and CSV decoding

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use thiserror::Error;

/// Why a single [`SaleRecord`](crate::SaleRecord) was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Region key is empty or whitespace-only
    #[error("Region Description is required")]
    EmptyRegion,

    /// Unit cost is zero or negative
    #[error("Unit Cost must be greater than zero (got {0})")]
    NonPositiveUnitCost(Decimal),

    /// Order date was never set
    #[error("Order Date must be a valid date and cannot be in the future (date is missing)")]
    MissingOrderDate,

    /// Order date is later than the validation clock
    #[error("Order Date must be a valid date and cannot be in the future (got {date}, now is {now})")]
    FutureOrderDate {
        /// Date carried by the record
        date: NaiveDateTime,
        /// Clock reading the record was checked against
        now: NaiveDateTime,
    },

    /// Revenue is below zero
    #[error("Total Revenue cannot be negative (got {0})")]
    NegativeRevenue(Decimal),

    /// Adding the revenue would overflow the running total
    #[error("Total Revenue {0} overflows the running total")]
    RevenueOverflow(Decimal),
}

/// Where in the input stream a record came from
///
/// `index` counts every record offered to the aggregator, starting at zero.
/// `line` is the 1-based source line when the record was decoded from text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordPosition {
    /// Zero-based position among offered records
    pub index: u64,
    /// 1-based source line, if known
    pub line: Option<u64>,
}

impl RecordPosition {
    /// Position of a record that was not decoded from a text source
    pub fn at_index(index: u64) -> Self {
        Self { index, line: None }
    }

    /// Position of a record decoded from the given source line
    pub fn at_line(index: u64, line: u64) -> Self {
        Self {
            index,
            line: Some(line),
        }
    }
}

impl fmt::Display for RecordPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line} (record {})", self.index),
            None => write!(f, "record {}", self.index),
        }
    }
}

/// Failure surfaced by the aggregation core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// A record failed validation; nothing from it was admitted
    #[error("Error on {position}: {source}")]
    InvalidRecord {
        /// Where the record sat in the stream
        position: RecordPosition,
        /// What was wrong with it
        #[source]
        source: ValidationError,
    },

    /// Finalization was requested before any record was accepted
    #[error("Unable to calculate Median Unit Cost: no records were accepted")]
    EmptyStream,

    /// Internal bookkeeping disagrees with itself. This is a bug in the crate.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl ReportError {
    /// Whether the error is attributable to caller input rather than a defect
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::InvariantViolation(_))
    }
}

/// Failure while turning CSV text into records
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Upload was missing or had no bytes
    #[error("No file was provided or file is empty.")]
    EmptyFile,

    /// Upload did not carry a `.csv` extension
    #[error("Only CSV files are allowed.")]
    NotCsv,

    /// Header row lacks a required column
    #[error("Missing required column '{0}' in header")]
    MissingColumn(String),

    /// A cell could not be parsed into its column's type
    #[error("Error on line: {line}, column '{column}' has invalid value '{value}'")]
    InvalidCell {
        /// 1-based source line
        line: u64,
        /// Header name of the offending column
        column: String,
        /// Raw cell text
        value: String,
    },

    /// Underlying reader or CSV framing failure
    #[error("Unable to read CSV input: {0}")]
    Csv(#[from] csv::Error),
}

/// Anything that can stop a one-shot [`ingest`](crate::ingest) run
#[derive(Error, Debug)]
pub enum IngestError {
    /// Input could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Aggregation refused a record or had nothing to report
    #[error(transparent)]
    Report(#[from] ReportError),
}
