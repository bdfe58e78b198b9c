use csv::StringRecord;

use crate::config::TimeBasis;
use crate::errors::TimestampError;
use crate::timestamps::timestamp_and_year;
use crate::types::{EpochSeconds, RowPosition, Year};

/// Ordered column names of a CSV file plus the resolved timestamp column.
#[derive(Clone, Debug, PartialEq)]
pub struct CsvHeader {
    columns: StringRecord,
    timestamp_index: Option<usize>,
}

impl CsvHeader {
    /// Wrap the header record and locate `timestamp_column` (first match wins).
    pub fn new(columns: StringRecord, timestamp_column: &str) -> Self {
        let timestamp_index = columns.iter().position(|name| name == timestamp_column);
        Self {
            columns,
            timestamp_index,
        }
    }

    /// Header record exactly as read.
    pub fn columns(&self) -> &StringRecord {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True for a headerless (empty) input.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// True when the configured timestamp column was found.
    pub fn has_timestamp_column(&self) -> bool {
        self.timestamp_index.is_some()
    }

    /// Timestamp field of `record`, `None` when the column or the value is absent.
    pub fn timestamp_field<'a>(&self, record: &'a StringRecord) -> Option<&'a str> {
        self.timestamp_index.and_then(|idx| record.get(idx))
    }
}

/// One data row, kept as the raw field values in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct CsvRow {
    /// Zero-based position among data rows.
    pub position: RowPosition,
    /// Field values as read; may be shorter or longer than the header.
    pub fields: StringRecord,
}

impl CsvRow {
    /// Wrap the fields read at `position`.
    pub fn new(position: RowPosition, fields: StringRecord) -> Self {
        Self { position, fields }
    }

    /// Raw timestamp field, `None` when the column or the value is absent.
    pub fn raw_timestamp<'a>(&'a self, header: &CsvHeader) -> Option<&'a str> {
        header.timestamp_field(&self.fields)
    }

    /// Attach the parsed timestamp and derived year, or explain why that is impossible.
    pub fn into_timed(
        self,
        header: &CsvHeader,
        basis: TimeBasis,
    ) -> Result<TimedRow, TimestampError> {
        let (timestamp, year) = timestamp_and_year(self.raw_timestamp(header), basis)?;
        Ok(TimedRow {
            timestamp,
            year,
            row: self,
        })
    }

    /// Field values padded with empty trailing values up to the header width.
    ///
    /// Rows longer than the header keep every field.
    pub fn padded_fields<'a>(&'a self, header: &CsvHeader) -> impl Iterator<Item = &'a str> {
        let width = header.len().max(self.fields.len());
        (0..width).map(move |idx| self.fields.get(idx).unwrap_or(""))
    }
}

/// A row whose timestamp parsed and resolved to a calendar year.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedRow {
    /// Parsed epoch seconds; the output sort key.
    pub timestamp: EpochSeconds,
    /// Calendar year on the configured clock.
    pub year: Year,
    /// The untouched source row.
    pub row: CsvRow,
}
