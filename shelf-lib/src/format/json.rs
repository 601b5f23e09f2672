use log::trace;
use serde_json::value::RawValue;

use super::Format;
use crate::{record::Record, Error, ErrorKind};

/// Pretty printed JSON array of record objects.
///
/// Each record keeps the field order `title`, `author`, `isbn` so the file diffs cleanly.
#[derive(Debug)]
pub struct Json(String);

impl Format for Json {
    fn new(val: String) -> Self {
        Self(val)
    }

    fn parse(self) -> Result<Vec<Record>, Error> {
        trace!("Parsing {} bytes of JSON into records", self.0.len());
        let entries: Vec<&RawValue> = serde_json::from_str(&self.0).map_err(|e| {
            Error::wrap_with(ErrorKind::Parse, e, "Content is not a JSON array")
        })?;

        entries
            .into_iter()
            .map(|entry| Self::parse_record(entry.get()))
            .collect()
    }

    fn compose(records: &[Record]) -> Self {
        if records.is_empty() {
            return Self("[]\n".to_owned());
        }

        let mut raw = String::from("[\n");
        for (i, record) in records.iter().enumerate() {
            if i > 0 {
                raw.push_str(",\n");
            }
            for line in Self::compose_record(record).lines() {
                raw.push_str("  ");
                raw.push_str(line);
                raw.push('\n');
            }
            raw.pop();
        }
        raw.push_str("\n]\n");
        Self(raw)
    }

    fn compose_record(record: &Record) -> String {
        // Serializing plain string fields cannot fail.
        serde_json::to_string_pretty(record).unwrap_or_default()
    }

    fn parse_record(text: &str) -> Result<Record, Error> {
        serde_json::from_str(text)
            .map_err(|e| Error::wrap_with(ErrorKind::Parse, e, "Entry is not a record"))
    }

    fn raw(self) -> String {
        self.0
    }

    fn name() -> &'static str {
        "JSON"
    }
}
