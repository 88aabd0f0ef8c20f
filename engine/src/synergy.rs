//! Tag-graph diversity analysis

use crate::knowledge_store::TagCount;
use serde::Serialize;

/// Diversity score with the distribution it was computed from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiversityReport {
    pub diversity_score: f64,
    pub tag_distribution: Vec<TagCount>,
}

/// `1 - max/total` over the per-tag concept counts; 0.0 when there are no tags
pub fn diversity_score(distribution: &[TagCount]) -> f64 {
    let total: u64 = distribution.iter().map(|t| u64::from(t.concepts)).sum();
    if total == 0 {
        return 0.0;
    }
    let max = distribution
        .iter()
        .map(|t| u64::from(t.concepts))
        .max()
        .unwrap_or(0);
    (1.0 - max as f64 / total as f64).clamp(0.0, 1.0)
}

impl DiversityReport {
    pub fn from_distribution(tag_distribution: Vec<TagCount>) -> Self {
        Self {
            diversity_score: diversity_score(&tag_distribution),
            tag_distribution,
        }
    }
}
