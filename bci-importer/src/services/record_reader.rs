//! Record Reader
//!
//! Turns a delimited byte stream into a lazy sequence of [`Record`]s.
//! The first line is the header; each later line is paired with it by
//! position.
//!
//! - Short rows: trailing fields are `None`
//! - Long rows: extra values are ignored
//! - Blank rows (every value empty): skipped and counted
//! - Invalid UTF-8: replaced lossily, never an error

use csv::{ByteRecord, ReaderBuilder};
use std::io::Read;

use crate::error::{ImportError, ImportResult};
use crate::models::Record;

/// One-pass iterator over the records of a tabular file
pub struct RecordReader<R: Read> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    buffer: ByteRecord,
    rows_read: u64,
    blank_rows: usize,
}

impl<R: Read> std::fmt::Debug for RecordReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordReader")
            .field("headers", &self.headers)
            .field("rows_read", &self.rows_read)
            .field("blank_rows", &self.blank_rows)
            .finish()
    }
}

fn map_csv_error(err: csv::Error) -> ImportError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => ImportError::Io(io),
        _ => ImportError::Format(message),
    }
}

fn decode(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

impl<R: Read> RecordReader<R> {
    /// Read the header row
    ///
    /// **Errors:** `Format` for an empty stream or a header with no names,
    /// `Io` when the stream cannot be read.
    pub fn new(input: R) -> ImportResult<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(input);

        let mut header_record = ByteRecord::new();
        let has_header = reader
            .read_byte_record(&mut header_record)
            .map_err(map_csv_error)?;
        if !has_header {
            return Err(ImportError::Format("File is empty".to_string()));
        }

        let headers: Vec<String> = header_record
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let name = decode(field);
                let name = if i == 0 {
                    name.trim_start_matches('\u{feff}').to_string()
                } else {
                    name
                };
                name.trim().to_string()
            })
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::Format(
                "Header row contains no field names".to_string(),
            ));
        }

        tracing::debug!(columns = headers.len(), "Parsed header row");

        Ok(Self {
            reader,
            headers,
            buffer: ByteRecord::new(),
            rows_read: 0,
            blank_rows: 0,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Blank rows skipped so far
    pub fn blank_rows(&self) -> usize {
        self.blank_rows
    }

    fn to_record(&self, line: u64) -> Record {
        if self.buffer.len() > self.headers.len() {
            tracing::debug!(
                line,
                extra = self.buffer.len() - self.headers.len(),
                "Ignoring values beyond the header"
            );
        }

        let fields = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), self.buffer.get(i).map(decode)))
            .collect();

        Record::new(line, fields)
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = ImportResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_byte_record(&mut self.buffer) {
                Ok(false) => return None,
                Ok(true) => {}
                Err(e) => return Some(Err(map_csv_error(e))),
            }

            self.rows_read += 1;
            // Header is line 1
            let line = self
                .buffer
                .position()
                .map(|p| p.line())
                .unwrap_or(self.rows_read + 1);

            let record = self.to_record(line);
            if record.is_blank() {
                self.blank_rows += 1;
                tracing::debug!(line, "Skipping blank row");
                continue;
            }

            return Some(Ok(record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(input: &str) -> (Vec<Record>, usize) {
        let mut reader = RecordReader::new(Cursor::new(input.as_bytes().to_vec())).unwrap();
        let records = reader.by_ref().collect::<ImportResult<Vec<_>>>().unwrap();
        (records, reader.blank_rows())
    }

    #[test]
    fn test_header_pairs_values_by_position() {
        let (records, _) = read_all("a,b,c\n1,2,3\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("a"), Some("1"));
        assert_eq!(records[0].get("c"), Some("3"));
        assert_eq!(records[0].line(), 2);
    }

    #[test]
    fn test_short_row_yields_absent_values() {
        let (records, _) = read_all("a,b,c\n1\n");
        assert_eq!(records[0].get("a"), Some("1"));
        assert_eq!(records[0].get("b"), None);
        assert_eq!(records[0].get("c"), None);
    }

    #[test]
    fn test_blank_rows_are_skipped_and_counted() {
        let (records, blank) = read_all("a,b\n,\n1,2\n , \n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line(), 3);
        assert_eq!(blank, 2);
    }

    #[test]
    fn test_quoted_fields_and_bom() {
        let (records, _) = read_all("\u{feff}name,note\n\"Lee, Ana\",\"said \"\"hi\"\"\"\n");
        assert_eq!(records[0].get("name"), Some("Lee, Ana"));
        assert_eq!(records[0].get("note"), Some("said \"hi\""));
    }

    #[test]
    fn test_empty_stream_is_format_error() {
        let result = RecordReader::new(Cursor::new(Vec::new()));
        assert!(matches!(result, Err(ImportError::Format(_))));
    }

    #[test]
    fn test_header_without_names_is_format_error() {
        let result = RecordReader::new(Cursor::new(b", ,\n1,2,3\n".to_vec()));
        assert!(matches!(result, Err(ImportError::Format(_))));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut input = b"name\n".to_vec();
        input.extend_from_slice(&[0x41, 0xff, 0x42, b'\n']);

        let mut reader = RecordReader::new(Cursor::new(input)).unwrap();
        let record = reader.next().unwrap().unwrap();
        assert_eq!(record.get("name"), Some("A\u{fffd}B"));
    }
}
