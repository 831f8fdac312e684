/// CSV persistence for segment tables
///
/// Layout: a `start,text` header, one row per segment, then an optional
/// trailing `Title:,<title>` metadata row.
use super::{Segment, SegmentTable, TITLE_MARKER};
use crate::error::{ChapterizerError, Result};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

const START_COLUMN: &str = "start";
const TEXT_COLUMN: &str = "text";

impl SegmentTable {
    /// Load a transcript CSV written by [`SegmentTable::save_csv`]
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("📄 Loading transcript from: {}", path.display());
        let file = std::fs::File::open(path)?;
        let table = Self::from_csv_reader(file)?;
        info!("✅ Loaded {} segments", table.len());
        Ok(table)
    }

    /// Parse a transcript CSV from any reader
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let start_idx = column_index(&headers, START_COLUMN)?;
        let text_idx = column_index(&headers, TEXT_COLUMN)?;

        let mut records = Vec::new();
        for record in csv_reader.records() {
            records.push(record?);
        }

        let title = match records.last() {
            Some(last) if last.get(0).map(str::trim) == Some(TITLE_MARKER) => {
                let title = last.get(1).unwrap_or_default().to_string();
                records.pop();
                debug!("Stripped title row: {}", title);
                Some(title)
            }
            _ => None,
        };

        let mut segments = Vec::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            // Row numbers are reported 1-based and after the header line
            let line = row + 2;
            let raw_start = record.get(start_idx).ok_or_else(|| {
                ChapterizerError::MalformedSegmentTable(format!("line {}: missing '{}' field", line, START_COLUMN))
            })?;
            let start: f64 = raw_start.trim().parse().map_err(|_| {
                ChapterizerError::MalformedSegmentTable(format!(
                    "line {}: non-numeric timestamp '{}'",
                    line, raw_start
                ))
            })?;
            if !start.is_finite() {
                return Err(ChapterizerError::MalformedSegmentTable(format!(
                    "line {}: timestamp '{}' is not finite",
                    line, raw_start
                )));
            }
            if start < 0.0 {
                return Err(ChapterizerError::MalformedSegmentTable(format!(
                    "line {}: negative timestamp '{}'",
                    line, raw_start
                )));
            }
            let text = record.get(text_idx).ok_or_else(|| {
                ChapterizerError::MalformedSegmentTable(format!("line {}: missing '{}' field", line, TEXT_COLUMN))
            })?;
            segments.push(Segment::new(start, text));
        }

        let table = SegmentTable::new(segments);
        Ok(match title {
            Some(title) => table.with_title(title),
            None => table,
        })
    }

    /// Write the table as CSV, appending the title row when one is set
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::File::create(path)?;
        self.write_csv(file)?;
        info!("💾 Transcript saved to {}", path.display());
        Ok(())
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);

        csv_writer.write_record([START_COLUMN, TEXT_COLUMN])?;
        for segment in self.segments() {
            csv_writer.write_record([segment.start.to_string().as_str(), segment.text.as_str()])?;
        }
        if let Some(title) = self.title() {
            csv_writer.write_record([TITLE_MARKER, title])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| ChapterizerError::MalformedSegmentTable(format!("missing required column '{}'", name)))
}
