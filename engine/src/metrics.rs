//! Performance metrics and operation timing
//!
//! [`PerformanceMetrics`] is owned by the engine and mutated after every
//! tracked operation. The [`tracked!`](crate::tracked) and
//! [`tracked_async!`](crate::tracked_async) macros wrap one public operation
//! each: they log `operation` and `elapsed_ms` via tracing and add the
//! elapsed time to the metrics.

use serde::Serialize;
use std::time::Duration;

/// Time a synchronous expression and feed the elapsed time into `metrics`
///
/// Logs via `tracing::info!` with fields:
/// - `operation`: the operation label
/// - `elapsed_ms`: elapsed time in milliseconds
///
/// `$metrics` is only borrowed after `$block` has finished, so the block
/// may itself borrow the owner of the metrics mutably.
#[macro_export]
macro_rules! tracked {
    ($metrics:expr, $label:expr, $block:expr) => {{
        let __start = ::std::time::Instant::now();
        let __result = $block;
        let __elapsed = __start.elapsed();
        ::tracing::info!(
            operation = $label,
            elapsed_ms = __elapsed.as_millis() as u64,
            "Operation completed"
        );
        $metrics.record_operation(__elapsed);
        __result
    }};
}

/// Async counterpart of [`tracked!`](crate::tracked); awaits `$future`
#[macro_export]
macro_rules! tracked_async {
    ($metrics:expr, $label:expr, $future:expr) => {{
        let __start = ::std::time::Instant::now();
        let __result = $future.await;
        let __elapsed = __start.elapsed();
        ::tracing::info!(
            operation = $label,
            elapsed_ms = __elapsed.as_millis() as u64,
            "Operation completed"
        );
        $metrics.record_operation(__elapsed);
        __result
    }};
}

/// Counters and running means describing engine activity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub ideas_generated: u64,
    pub specifications_developed: u64,
    pub concepts_refined: u64,
    pub ethical_reviews_conducted: u64,
    pub average_feasibility: f64,
    pub average_impact: f64,
    pub diversity_score: f64,
    /// Cumulative wall time of tracked operations, in seconds
    pub processing_time_secs: f64,
    pub operations_tracked: u64,
    #[serde(skip)]
    feasibility_samples: u64,
    #[serde(skip)]
    impact_samples: u64,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_operation(&mut self, elapsed: Duration) {
        self.operations_tracked += 1;
        self.processing_time_secs += elapsed.as_secs_f64();
    }

    pub fn record_ideas(&mut self, count: usize) {
        self.ideas_generated += count as u64;
    }

    pub fn record_specification(&mut self) {
        self.specifications_developed += 1;
    }

    pub fn record_refinement(&mut self) {
        self.concepts_refined += 1;
    }

    pub fn record_review(&mut self) {
        self.ethical_reviews_conducted += 1;
    }

    /// Fold one feasibility score into the running mean
    pub fn record_feasibility(&mut self, score: f64) {
        self.feasibility_samples += 1;
        self.average_feasibility +=
            (score - self.average_feasibility) / self.feasibility_samples as f64;
    }

    /// Fold one impact score into the running mean
    pub fn record_impact(&mut self, score: f64) {
        self.impact_samples += 1;
        self.average_impact += (score - self.average_impact) / self.impact_samples as f64;
    }

    pub fn record_diversity(&mut self, score: f64) {
        self.diversity_score = score;
    }

    /// Mean of average feasibility, average impact and diversity
    pub fn overall_performance(&self) -> f64 {
        (self.average_feasibility + self.average_impact + self.diversity_score) / 3.0
    }

    /// "label: value" lines in a fixed order
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("ideas_generated: {}", self.ideas_generated),
            format!("specifications_developed: {}", self.specifications_developed),
            format!("concepts_refined: {}", self.concepts_refined),
            format!(
                "ethical_reviews_conducted: {}",
                self.ethical_reviews_conducted
            ),
            format!("average_feasibility: {:.3}", self.average_feasibility),
            format!("average_impact: {:.3}", self.average_impact),
            format!("diversity_score: {:.3}", self.diversity_score),
            format!("processing_time: {:.3}s", self.processing_time_secs),
        ]
    }
}
