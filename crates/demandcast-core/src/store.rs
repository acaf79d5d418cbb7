use tracing::info;

use crate::db::DbPool;
use crate::error::{PipelineError, Result};
use crate::types::RawSalesRecord;

/// Upper bound on rows read in one run.
pub const FETCH_LIMIT: i64 = 500_000;

/// Load the tenant's raw sales history from the store.
pub async fn fetch_sales(pool: &DbPool, tenant: &str) -> Result<Vec<RawSalesRecord>> {
    let records = sqlx::query_as::<_, RawSalesRecord>(
        r#"
            SELECT sku, raw
            FROM sales_records
            WHERE tenant = $1
            LIMIT $2
        "#,
    )
    .bind(tenant)
    .bind(FETCH_LIMIT)
    .fetch_all(pool)
    .await?;

    info!(tenant, rows = records.len(), "loaded raw sales");
    Ok(records)
}

/// An explicitly configured tenant wins; otherwise fall back to the first
/// tenant with any sales history. Finding neither is a configuration error.
pub async fn resolve_tenant(pool: &DbPool, configured: Option<String>) -> Result<String> {
    if let Some(tenant) = configured.filter(|t| !t.is_empty()) {
        return Ok(tenant);
    }

    let found: Option<String> = sqlx::query_scalar(r#"SELECT tenant FROM sales_records LIMIT 1"#)
        .fetch_optional(pool)
        .await?;

    found.ok_or_else(|| {
        PipelineError::Config("no tenant configured and none found in sales_records".to_string())
    })
}
