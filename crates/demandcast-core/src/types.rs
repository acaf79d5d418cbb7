// crates/demandcast-core/src/types.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One raw sales row as stored by the import feed. The `raw` bag has no
/// fixed schema; the normalizer probes it for dates and amounts.
#[derive(Debug, Clone, FromRow)]
pub struct RawSalesRecord {
    pub sku: String,
    pub raw: serde_json::Value,
}

/// A sale the normalizer accepted. Units and revenue are already clamped
/// to be non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSale {
    pub sku: String,
    pub timestamp: DateTime<Utc>,
    pub units: f64,
    pub revenue: f64,
}

/// Accumulated totals for one (sku, week_start) bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeeklyCell {
    pub units: f64,
    pub revenue: f64,
}

/// Point estimate plus dispersion for one SKU's weekly demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandEstimate {
    pub mu: f64,
    pub sigma: f64,
}

/// The persisted output unit. `week_start` is always an ISO-week Monday;
/// (tenant, sku, week_start) is the upsert key.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ForecastRow {
    pub tenant: String,
    pub sku: String,
    pub week_start: NaiveDate,
    pub mu: f64,
    pub sigma: f64,
    pub model: String,
}
