use serde::Serialize;
use tracing::debug;

use crate::db::DbPool;
use crate::error::{PipelineError, Result};
use crate::types::ForecastRow;

/// Rows per upsert batch; keeps each round-trip under the store's payload
/// limits. Each batch commits atomically in its own transaction.
pub const UPSERT_BATCH_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PublishSummary {
    pub rows: usize,
    pub batches: usize,
}

/// Idempotently upsert the run's forecast rows keyed by
/// (tenant, sku, week_start). A failed batch aborts the run; the error
/// names the batch and how many committed before it. No retries here.
pub async fn publish_forecasts(pool: &DbPool, rows: &[ForecastRow]) -> Result<PublishSummary> {
    let mut committed = 0usize;

    for (batch, chunk) in rows.chunks(UPSERT_BATCH_SIZE).enumerate() {
        upsert_batch(pool, chunk)
            .await
            .map_err(|source| PipelineError::Publish {
                batch,
                committed,
                source,
            })?;
        committed += 1;
        debug!(batch, rows = chunk.len(), "forecast batch committed");
    }

    Ok(PublishSummary {
        rows: rows.len(),
        batches: committed,
    })
}

async fn upsert_batch(pool: &DbPool, chunk: &[ForecastRow]) -> std::result::Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for row in chunk {
        sqlx::query(
            r#"
                INSERT INTO demand_forecasts (tenant, sku, week_start, mu, sigma, model)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (tenant, sku, week_start)
                DO UPDATE SET mu = EXCLUDED.mu,
                              sigma = EXCLUDED.sigma,
                              model = EXCLUDED.model,
                              updated_at = now()
            "#,
        )
        .bind(&row.tenant)
        .bind(&row.sku)
        .bind(row.week_start)
        .bind(row.mu)
        .bind(row.sigma)
        .bind(&row.model)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
