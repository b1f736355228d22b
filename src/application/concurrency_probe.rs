//! Concurrency speed probe
//!
//! Times the image resolver over a fixed sample of codes at increasing
//! concurrency levels and recommends the level with the lowest average time
//! per request. Resolution is uncached so every level does the same work.

use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::info;

use crate::domain::ProductCode;
use crate::infrastructure::{BoundedFetchPool, ImageResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeLevel {
    pub concurrency: usize,
    pub total: Duration,
    pub per_request: Duration,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProbeReport {
    pub levels: Vec<ProbeLevel>,
}

impl ProbeReport {
    /// Level with the lowest average time per request; ties go to the lower level
    pub fn best(&self) -> Option<&ProbeLevel> {
        self.levels
            .iter()
            .min_by(|a, b| a.per_request.cmp(&b.per_request).then(a.concurrency.cmp(&b.concurrency)))
    }
}

/// Concurrency levels `min..=max` in steps of `step`
pub fn probe_levels(min: usize, max: usize, step: usize) -> Vec<usize> {
    let min = min.max(1);
    (min..=max.max(min)).step_by(step.max(1)).collect()
}

pub async fn probe_concurrency(
    resolver: &ImageResolver,
    codes: &[ProductCode],
    min: usize,
    max: usize,
    step: usize,
) -> ProbeReport {
    let mut report = ProbeReport::default();
    if codes.is_empty() {
        return report;
    }

    for concurrency in probe_levels(min, max, step) {
        let pool = BoundedFetchPool::new(concurrency, codes.len());
        let started = Instant::now();
        pool.run_all("speed-probe", codes.to_vec(), move |code| async move {
            resolver.resolve(&code).await
        })
        .await;
        let total = started.elapsed();
        let per_request = total / u32::try_from(codes.len()).unwrap_or(u32::MAX);

        info!(
            "⏱️ Concurrency {}: {:?} total, {:?} per request",
            concurrency, total, per_request
        );
        report.levels.push(ProbeLevel {
            concurrency,
            total,
            per_request,
        });
    }

    if let Some(best) = report.best() {
        info!("🏁 Recommended concurrency: {}", best.concurrency);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_levels() {
        assert_eq!(probe_levels(5, 11, 2), vec![5, 7, 9, 11]);
        assert_eq!(probe_levels(0, 0, 0), vec![1]);
        assert_eq!(probe_levels(8, 3, 2), vec![8]);
    }

    #[test]
    fn test_best_prefers_fastest_then_lowest() {
        let level = |concurrency, ms| ProbeLevel {
            concurrency,
            total: Duration::from_millis(ms * 5),
            per_request: Duration::from_millis(ms),
        };
        let report = ProbeReport {
            levels: vec![level(2, 40), level(4, 20), level(6, 20), level(8, 30)],
        };
        assert_eq!(report.best().unwrap().concurrency, 4);
        assert!(ProbeReport::default().best().is_none());
    }
}
