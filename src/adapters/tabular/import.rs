use serde::Deserialize;
use std::io::Read;

use super::TabularError;
use crate::domain::instance::RawInstanceRow;

/// Columns an import file must carry, in any order.
pub const IMPORT_HEADER: [&str; 5] = ["region", "size", "quantity", "hours", "pricing_model"];

#[derive(Debug, Deserialize)]
struct ImportRecord {
    region: Option<String>,
    size: Option<String>,
    quantity: Option<String>,
    hours: Option<String>,
    pricing_model: Option<String>,
}

impl From<ImportRecord> for RawInstanceRow {
    fn from(record: ImportRecord) -> Self {
        RawInstanceRow {
            id: None,
            region: record.region,
            size: record.size,
            quantity: record.quantity,
            hours: record.hours,
            pricing_model: record.pricing_model,
        }
    }
}

/// Reads raw rows from CSV with a header line.
///
/// Values are trimmed and left unvalidated; empty cells become `None`.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawInstanceRow>, TabularError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in IMPORT_HEADER {
        if !headers.iter().any(|h| h == column) {
            return Err(TabularError::MissingColumn(column.to_string()));
        }
    }

    let mut rows = Vec::new();
    for record in rdr.deserialize::<ImportRecord>() {
        rows.push(RawInstanceRow::from(record?));
    }
    Ok(rows)
}
