//! Conversions between SQL text columns and domain values
//!
//! Decimals and timestamps are stored as TEXT (exact decimal strings and
//! RFC 3339). A value that fails to parse back is corruption, surfaced as a
//! conversion failure on the offending column.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rust_decimal::Decimal;
use std::str::FromStr;

pub(crate) fn decimal_from_sql(idx: usize, raw: &str) -> rusqlite::Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn timestamp_from_sql(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
