use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::types::{NormalizedSale, RawSalesRecord};

/// Candidate names for the transaction timestamp, tried in order. Export
/// feeds name the field inconsistently depending on report type.
const DATE_FIELDS: [&str; 4] = ["date", "acceptanceDate", "saleDt", "lastChangeDate"];

/// Candidate names for the monetary total, tried in order; a zero value
/// falls through to the next candidate.
const REVENUE_FIELDS: [&str; 2] = ["totalPrice", "forPay"];

/// Candidate names for the per-unit price used to approximate a unit count
/// when no explicit quantity is present.
const PRICE_FIELDS: [&str; 2] = ["retailPrice", "priceWithDisc"];

/// Records older than this window relative to the run time are dropped.
pub const LOOKBACK_DAYS: i64 = 540;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingSku,
    MissingTimestamp,
    UnparseableTimestamp,
    Stale,
}

/// Extract a usable sale from one raw record, or say why it is unusable.
///
/// Negative quantities and totals (returns, cancellations) are floored to
/// zero rather than netted against demand. The upstream feed has always
/// been accumulated this way and published history depends on it.
pub fn normalize(
    record: &RawSalesRecord,
    now: DateTime<Utc>,
) -> std::result::Result<NormalizedSale, RejectReason> {
    if record.sku.trim().is_empty() {
        return Err(RejectReason::MissingSku);
    }

    let raw_date = DATE_FIELDS
        .iter()
        .find_map(|key| string_field(&record.raw, key))
        .ok_or(RejectReason::MissingTimestamp)?;
    let timestamp = parse_timestamp(raw_date).ok_or(RejectReason::UnparseableTimestamp)?;

    if timestamp < now - Duration::days(LOOKBACK_DAYS) {
        return Err(RejectReason::Stale);
    }

    let revenue = REVENUE_FIELDS
        .iter()
        .filter_map(|key| number_field(&record.raw, key))
        .find(|value| *value != 0.0)
        .unwrap_or(0.0);

    let mut units = number_field(&record.raw, "quantity").unwrap_or(0.0);
    if units <= 0.0 && revenue > 0.0 {
        let price = PRICE_FIELDS
            .iter()
            .filter_map(|key| number_field(&record.raw, key))
            .find(|value| *value != 0.0)
            .unwrap_or(1.0);
        units = revenue / price;
    }

    Ok(NormalizedSale {
        sku: record.sku.clone(),
        timestamp,
        units: units.max(0.0),
        revenue: revenue.max(0.0),
    })
}

/// Accepts RFC 3339 (with the trailing `Z` the feed usually emits), a naive
/// `YYYY-MM-DDTHH:MM:SS` prefix treated as UTC, or a bare calendar date.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Some(head) = text.get(..19) {
        if let Ok(naive) = NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S") {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn string_field<'a>(bag: &'a Value, key: &str) -> Option<&'a str> {
    match bag.get(key)? {
        Value::String(text) if !text.is_empty() => Some(text),
        _ => None,
    }
}

/// The feed serializes amounts as JSON numbers or numeric strings
/// interchangeably.
fn number_field(bag: &Value, key: &str) -> Option<f64> {
    match bag.get(key)? {
        Value::Number(num) => num.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
