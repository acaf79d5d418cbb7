use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::aggregate::WeeklyLedger;
use crate::db::DbPool;
use crate::error::{PipelineError, Result};
use crate::estimator::{default_estimator, DemandEstimator};
use crate::horizon::{next_week_start, project};
use crate::normalize::{normalize, RejectReason};
use crate::publish::{publish_forecasts, PublishSummary};
use crate::store;
use crate::types::ForecastRow;

#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Tenant to forecast for; resolved from the store when absent.
    pub tenant: Option<String>,
    pub horizon_weeks: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RecordSummary {
    pub total: usize,
    pub accepted: usize,
    pub missing_sku: usize,
    pub missing_timestamp: usize,
    pub unparseable_timestamp: usize,
    pub stale: usize,
}

impl RecordSummary {
    fn reject(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::MissingSku => self.missing_sku += 1,
            RejectReason::MissingTimestamp => self.missing_timestamp += 1,
            RejectReason::UnparseableTimestamp => self.unparseable_timestamp += 1,
            RejectReason::Stale => self.stale += 1,
        }
    }
}

/// Structured result of one forecast run, for operational visibility.
#[derive(Debug, Serialize)]
pub struct RunReceipt {
    pub run_id: Uuid,
    pub tenant: String,
    pub model: String,
    pub horizon_weeks: u32,
    pub records: RecordSummary,
    pub sku_count: usize,
    pub forecast_rows: usize,
    pub publish: PublishSummary,
}

/// One full batch pass with the baseline estimator.
pub async fn run_forecast(
    pool: &DbPool,
    request: RunRequest,
    now: DateTime<Utc>,
) -> Result<RunReceipt> {
    run_forecast_with(pool, request, now, default_estimator()).await
}

/// One full batch pass: resolve tenant, load sales, aggregate weekly,
/// estimate per SKU, project the horizon, publish. Record-level problems
/// are absorbed and tallied; configuration and transport failures abort.
pub async fn run_forecast_with(
    pool: &DbPool,
    request: RunRequest,
    now: DateTime<Utc>,
    estimator: &dyn DemandEstimator,
) -> Result<RunReceipt> {
    if request.horizon_weeks == 0 {
        return Err(PipelineError::Config(
            "horizon_weeks must be at least 1".to_string(),
        ));
    }

    let run_id = Uuid::new_v4();
    let tenant = store::resolve_tenant(pool, request.tenant).await?;
    info!(
        %run_id,
        %tenant,
        horizon_weeks = request.horizon_weeks,
        model = estimator.code_identifier(),
        "starting forecast run"
    );

    let sales = store::fetch_sales(pool, &tenant).await?;

    let mut records = RecordSummary {
        total: sales.len(),
        ..RecordSummary::default()
    };
    let mut ledger = WeeklyLedger::new();
    for record in &sales {
        match normalize(record, now) {
            Ok(sale) => {
                records.accepted += 1;
                ledger.add(&sale);
            }
            Err(reason) => records.reject(reason),
        }
    }
    debug!(
        accepted = records.accepted,
        rejected = records.total - records.accepted,
        skus = ledger.sku_count(),
        "aggregated weekly cells"
    );

    let base_week = next_week_start(now);
    let mut rows: Vec<ForecastRow> = Vec::new();
    for (sku, series) in ledger.recent_series() {
        let Some(estimate) = estimator.estimate(&series) else {
            continue;
        };
        rows.extend(project(
            &tenant,
            sku,
            estimate,
            estimator.code_identifier(),
            base_week,
            request.horizon_weeks,
        ));
    }

    let publish = publish_forecasts(pool, &rows).await?;
    info!(%run_id, rows = rows.len(), "forecast run complete");

    Ok(RunReceipt {
        run_id,
        tenant,
        model: estimator.code_identifier().to_string(),
        horizon_weeks: request.horizon_weeks,
        records,
        sku_count: ledger.sku_count(),
        forecast_rows: rows.len(),
        publish,
    })
}
