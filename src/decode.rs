//! CSV decoding of sale records
//!
//! Columns are bound by header name, so extra columns and any column order are
//! fine. Numbers and dates are parsed culture-invariantly.

use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{StringRecord, StringRecordsIntoIter};
use rust_decimal::Decimal;

use crate::aggregate::SalesAggregator;
use crate::error::{DecodeError, IngestError, RecordPosition};
use crate::record::SaleRecord;
use crate::report::SalesReport;

/// How to read a sales CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter
    pub delimiter: u8,
    /// Header of the region column
    pub region_column: String,
    /// Header of the unit cost column
    pub unit_cost_column: String,
    /// Header of the order date column
    pub order_date_column: String,
    /// Header of the total revenue column
    pub total_revenue_column: String,
    /// `chrono` formats tried in order for order dates.
    ///
    /// Date-only formats yield midnight.
    pub date_formats: Vec<String>,
}

impl Default for CsvOptions {
    /// Comma-delimited, with the column names of the usual sales export
    fn default() -> Self {
        Self {
            delimiter: b',',
            region_column: "Region".into(),
            unit_cost_column: "Unit Cost".into(),
            order_date_column: "Order Date".into(),
            total_revenue_column: "Total Revenue".into(),
            date_formats: ["%m/%d/%Y", "%Y-%m-%d", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Rejects uploads that are empty or not named `*.csv`
pub fn validate_upload(file_name: &str, len: u64) -> Result<(), DecodeError> {
    if len == 0 {
        return Err(DecodeError::EmptyFile);
    }

    let is_csv = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(DecodeError::NotCsv);
    }

    Ok(())
}

/// Column slots of the four bound fields
#[derive(Debug, Clone, Copy)]
struct Columns {
    region: usize,
    unit_cost: usize,
    order_date: usize,
    total_revenue: usize,
}

/// Lazy reader yielding one [`SaleRecord`] per CSV row
///
/// Each item carries the row's [`RecordPosition`], with the 1-based line the
/// row started on.
pub struct CsvSaleReader<R> {
    rows: StringRecordsIntoIter<R>,
    columns: Columns,
    options: CsvOptions,
    index: u64,
}

impl<R: Read> CsvSaleReader<R> {
    /// Reads the header row and binds the required columns
    pub fn new(reader: R, options: CsvOptions) -> Result<Self, DecodeError> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv.headers()?.clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(DecodeError::EmptyFile);
        }

        let columns = Columns {
            region: bind(&headers, &options.region_column)?,
            unit_cost: bind(&headers, &options.unit_cost_column)?,
            order_date: bind(&headers, &options.order_date_column)?,
            total_revenue: bind(&headers, &options.total_revenue_column)?,
        };

        Ok(Self {
            rows: csv.into_records(),
            columns,
            options,
            index: 0,
        })
    }

    fn decode(&self, row: &StringRecord, line: u64) -> Result<SaleRecord, DecodeError> {
        let cell = |slot: usize| row.get(slot).unwrap_or("");
        let invalid = |column: &str, value: &str| DecodeError::InvalidCell {
            line,
            column: column.to_owned(),
            value: value.to_owned(),
        };

        let unit_cost_raw = cell(self.columns.unit_cost);
        let unit_cost = parse_decimal(unit_cost_raw)
            .ok_or_else(|| invalid(&self.options.unit_cost_column, unit_cost_raw))?;

        let revenue_raw = cell(self.columns.total_revenue);
        let total_revenue = parse_decimal(revenue_raw)
            .ok_or_else(|| invalid(&self.options.total_revenue_column, revenue_raw))?;

        let date_raw = cell(self.columns.order_date);
        let order_date = if date_raw.is_empty() {
            None
        } else {
            Some(
                parse_date(date_raw, &self.options.date_formats)
                    .ok_or_else(|| invalid(&self.options.order_date_column, date_raw))?,
            )
        };

        Ok(SaleRecord {
            region: cell(self.columns.region).to_owned(),
            unit_cost,
            order_date,
            total_revenue,
        })
    }
}

impl<R: Read> Iterator for CsvSaleReader<R> {
    type Item = Result<(RecordPosition, SaleRecord), DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e.into())),
        };

        let line = row.position().map_or(self.index + 2, |p| p.line());
        let position = RecordPosition::at_line(self.index, line);
        self.index += 1;

        let decoded = self.decode(&row, line);

        #[cfg(feature = "log")]
        if let Err(e) = &decoded {
            log::warn!("Failed to decode sales row. {e}");
        }

        Some(decoded.map(|record| (position, record)))
    }
}

/// Decodes `reader` and aggregates every row into a report
///
/// Stops at the first row that fails to decode or validate.
pub fn ingest<R: Read>(
    reader: R,
    options: CsvOptions,
    mut aggregator: SalesAggregator,
) -> Result<SalesReport, IngestError> {
    #[cfg(feature = "log")]
    log::info!("Generating sales report...");

    for item in CsvSaleReader::new(reader, options)? {
        let (position, record) = item?;
        aggregator.accept_at(position, &record)?;
    }

    Ok(aggregator.finalize()?)
}

fn bind(headers: &StringRecord, column: &str) -> Result<usize, DecodeError> {
    let wanted = normalize_header(column);
    headers
        .iter()
        .position(|h| normalize_header(h) == wanted)
        .ok_or_else(|| DecodeError::MissingColumn(column.to_owned()))
}

fn normalize_header(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    if raw.is_empty() {
        return None;
    }

    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn parse_date(raw: &str, formats: &[String]) -> Option<NaiveDateTime> {
    formats.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(raw, format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, format)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    })
}
