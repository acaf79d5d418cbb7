use once_cell::sync::Lazy;

use crate::types::DemandEstimate;

/// Smoothing factor for the baseline moving average.
pub const DEFAULT_ALPHA: f64 = 0.3;

/// Contract between a SKU's weekly series and its forecast distribution.
/// Alternate models plug in here without touching aggregation or
/// publishing. An empty series yields `None` and the SKU is skipped.
pub trait DemandEstimator: Send + Sync {
    fn code_identifier(&self) -> &'static str;
    fn estimate(&self, series: &[f64]) -> Option<DemandEstimate>;
}

/// Baseline: exponentially-weighted mean seeded at zero, spread from the
/// Bessel-corrected sample variance.
pub struct EmaBaseline {
    alpha: f64,
}

impl EmaBaseline {
    pub const fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl DemandEstimator for EmaBaseline {
    fn code_identifier(&self) -> &'static str {
        "baseline_ema_v1"
    }

    fn estimate(&self, series: &[f64]) -> Option<DemandEstimate> {
        if series.is_empty() {
            return None;
        }

        let mut ema = 0.0;
        for &units in series {
            ema = self.alpha * units + (1.0 - self.alpha) * ema;
        }

        let n = series.len() as f64;
        let mean = series.iter().sum::<f64>() / n;
        let denom = (series.len() - 1).max(1) as f64;
        let var = series
            .iter()
            .map(|units| (units - mean) * (units - mean))
            .sum::<f64>()
            / denom;
        // Floating rounding can push the radicand a hair below zero.
        let sigma = var.max(0.0).sqrt();

        Some(DemandEstimate { mu: ema, sigma })
    }
}

static BASELINE: EmaBaseline = EmaBaseline::new(DEFAULT_ALPHA);

static ESTIMATORS: Lazy<Vec<&'static dyn DemandEstimator>> =
    Lazy::new(|| vec![&BASELINE as &dyn DemandEstimator]);

pub fn all_estimators() -> &'static [&'static dyn DemandEstimator] {
    ESTIMATORS.as_slice()
}

pub fn default_estimator() -> &'static dyn DemandEstimator {
    ESTIMATORS[0]
}
