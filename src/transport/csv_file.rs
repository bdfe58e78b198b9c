use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Writer, WriterBuilder};

use crate::config::LineTerminator;
use crate::data::{CsvHeader, CsvRow};
use crate::errors::PrepError;
use crate::types::RowPosition;

/// Streams data rows of a headed CSV in file order.
///
/// Rows may carry more or fewer fields than the header; blank lines are skipped.
pub struct CsvStream<R: Read> {
    reader: csv::Reader<R>,
    header: CsvHeader,
    record: StringRecord,
    next_position: RowPosition,
}

impl CsvStream<File> {
    /// Open `path` for streaming.
    pub fn open(path: &Path, timestamp_column: &str) -> Result<Self, PrepError> {
        let file = File::open(path)?;
        Self::from_reader(file, timestamp_column)
    }
}

impl<R: Read> CsvStream<R> {
    /// Wrap any reader and consume its header row.
    pub fn from_reader(input: R, timestamp_column: &str) -> Result<Self, PrepError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);
        let columns = reader.headers()?.clone();
        Ok(Self {
            reader,
            header: CsvHeader::new(columns, timestamp_column),
            record: StringRecord::new(),
            next_position: 0,
        })
    }

    /// Header read when the stream was opened.
    pub fn header(&self) -> &CsvHeader {
        &self.header
    }

    /// Number of data rows yielded so far.
    pub fn rows_read(&self) -> RowPosition {
        self.next_position
    }

    /// Advance to the next row without cloning it.
    ///
    /// Returns the row position, or `None` at end of input.
    pub fn advance(&mut self) -> Result<Option<RowPosition>, PrepError> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        let position = self.next_position;
        self.next_position += 1;
        Ok(Some(position))
    }

    /// Fields of the row most recently returned by [`CsvStream::advance`].
    pub fn current(&self) -> &StringRecord {
        &self.record
    }
}

impl<R: Read> Iterator for CsvStream<R> {
    type Item = Result<CsvRow, PrepError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(Some(position)) => Some(Ok(CsvRow::new(position, self.record.clone()))),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// Writes a header followed by rows padded to at least the header width.
pub struct CsvSink<W: Write> {
    writer: Writer<W>,
    rows_written: usize,
}

impl CsvSink<File> {
    /// Create (or truncate) `path` for writing.
    pub fn create(path: &Path, terminator: LineTerminator) -> Result<Self, PrepError> {
        let file = File::create(path)?;
        Ok(Self::from_writer(file, terminator))
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap any writer; rows may be wider than the header.
    pub fn from_writer(output: W, terminator: LineTerminator) -> Self {
        let writer = WriterBuilder::new()
            .flexible(true)
            .terminator(terminator.into())
            .from_writer(output);
        Self {
            writer,
            rows_written: 0,
        }
    }

    /// Write the header line unchanged. Headerless inputs produce no header line.
    pub fn write_header(&mut self, header: &CsvHeader) -> Result<(), PrepError> {
        if header.is_empty() {
            return Ok(());
        }
        self.writer.write_record(header.columns())?;
        Ok(())
    }

    /// Write one row, padding short rows to the width of `header`.
    pub fn write_row(&mut self, header: &CsvHeader, row: &CsvRow) -> Result<(), PrepError> {
        self.writer.write_record(row.padded_fields(header))?;
        self.rows_written += 1;
        Ok(())
    }

    /// Data rows written so far, header excluded.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush buffered output and hand back the underlying writer.
    pub fn finish(self) -> Result<W, PrepError> {
        self.writer
            .into_inner()
            .map_err(|err| PrepError::Io(err.into_error()))
    }
}
