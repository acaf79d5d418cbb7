// crates/demandcast-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("forecast upsert batch {batch} failed ({committed} batches committed before it): {source}")]
    Publish {
        batch: usize,
        committed: usize,
        #[source]
        source: sqlx::Error,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
