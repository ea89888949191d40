//! Conversion helpers between stored TEXT columns and domain types.
//!
//! Decimals, dates, and times are stored as TEXT to keep SQLite exact; the
//! helpers here are the single place those encodings are defined.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parses a stored decimal, falling back to zero on corrupt data.
///
/// Mirrors the write path, which always stores `Decimal::to_string` output;
/// a parse failure indicates out-of-band tampering and is logged rather than
/// failing the whole read.
pub fn parse_decimal(value: &str, field_name: &str) -> Decimal {
    match Decimal::from_str(value) {
        Ok(d) => d,
        Err(e) => {
            log::error!("Failed to parse {field_name} '{value}' as decimal: {e}. Using ZERO.");
            Decimal::ZERO
        }
    }
}

pub fn parse_optional_decimal(value: Option<&str>, field_name: &str) -> Option<Decimal> {
    value.map(|v| parse_decimal(v, field_name))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str, field_name: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, DATE_FORMAT).unwrap_or_else(|e| {
        log::error!("Failed to parse {field_name} '{value}' as date: {e}. Using epoch.");
        NaiveDate::default()
    })
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn parse_time(value: &str, field_name: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, TIME_FORMAT).unwrap_or_else(|e| {
        log::error!("Failed to parse {field_name} '{value}' as time: {e}. Using midnight.");
        NaiveTime::default()
    })
}

pub fn format_datetime(datetime: NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

pub fn parse_datetime(value: &str, field_name: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT).unwrap_or_else(|e| {
        log::error!("Failed to parse {field_name} '{value}' as datetime: {e}. Using epoch.");
        NaiveDateTime::default()
    })
}
