use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::aggregate::week_start_of;
use crate::types::{DemandEstimate, ForecastRow};

/// Default number of future weeks projected per run.
pub const DEFAULT_HORIZON_WEEKS: u32 = 12;

/// Monday of the ISO week after the one containing `now` — the first week
/// a fresh forecast can apply to.
pub fn next_week_start(now: DateTime<Utc>) -> NaiveDate {
    week_start_of(now + Duration::weeks(1))
}

/// Expand one SKU estimate into a row per horizon week. Flat projection:
/// every row carries the same mu/sigma/model.
pub fn project(
    tenant: &str,
    sku: &str,
    estimate: DemandEstimate,
    model: &str,
    base_week: NaiveDate,
    horizon_weeks: u32,
) -> Vec<ForecastRow> {
    (0..horizon_weeks)
        .map(|offset| ForecastRow {
            tenant: tenant.to_string(),
            sku: sku.to_string(),
            week_start: base_week + Duration::weeks(i64::from(offset)),
            mu: estimate.mu,
            sigma: estimate.sigma,
            model: model.to_string(),
        })
        .collect()
}
