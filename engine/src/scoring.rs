//! Heuristic feasibility and impact scoring
//!
//! Pure functions over a [`Specification`]:
//!
//! ```text
//! technical   = clamp(1 - (0.1*|features| + 0.05*|integration| + 0.15*|challenges|))
//! resource    = clamp(1 - 0.2*|resources|)
//! ethical     = clamp(0.2 * |keyword classes present in any consideration|)
//! feasibility = clamp(mean(technical, resource, ethical))
//! impact      = clamp(0.2*|features| + 0.15*|integration| + 0.1*|considerations|)
//! ```
//!
//! Every output is clamped to `[0.0, 1.0]`.

use crate::specification::Specification;
use serde::Serialize;

/// Keyword classes the ethical score looks for
pub const ETHICAL_KEYWORDS: [&str; 5] = [
    "privacy",
    "fairness",
    "transparency",
    "accountability",
    "safety",
];

const FEATURE_COMPLEXITY: f64 = 0.1;
const INTEGRATION_COMPLEXITY: f64 = 0.05;
const CHALLENGE_COMPLEXITY: f64 = 0.15;
const RESOURCE_COST: f64 = 0.2;
const ETHICAL_KEYWORD_WEIGHT: f64 = 0.2;

const FEATURE_IMPACT: f64 = 0.2;
const INTEGRATION_IMPACT: f64 = 0.15;
const ETHICS_IMPACT: f64 = 0.1;

/// Breakdown of feasibility components (for explainability)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeasibilityScores {
    pub technical: f64,
    pub resource: f64,
    pub ethical: f64,
    /// Mean of the three components
    pub overall: f64,
}

/// Rough resource needs, proportional to features and challenges
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceEstimate {
    /// Abstract compute units
    pub computing_power: u32,
    /// Gigabytes
    pub storage_gb: u32,
    /// Weeks
    pub development_weeks: u32,
}

fn clamp_unit(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

pub fn technical_feasibility(spec: &Specification) -> f64 {
    let complexity = FEATURE_COMPLEXITY * spec.key_features.len() as f64
        + INTEGRATION_COMPLEXITY * spec.integration_points.len() as f64
        + CHALLENGE_COMPLEXITY * spec.potential_challenges.len() as f64;
    clamp_unit(1.0 - complexity)
}

pub fn resource_feasibility(spec: &Specification) -> f64 {
    clamp_unit(1.0 - RESOURCE_COST * spec.required_resources.len() as f64)
}

/// 0.2 per keyword class found (case-insensitively) in any consideration
pub fn ethical_feasibility(spec: &Specification) -> f64 {
    let lowered: Vec<String> = spec
        .ethical_considerations
        .iter()
        .map(|c| c.to_lowercase())
        .collect();

    let present = ETHICAL_KEYWORDS
        .iter()
        .filter(|kw| lowered.iter().any(|c| c.contains(*kw)))
        .count();

    clamp_unit(ETHICAL_KEYWORD_WEIGHT * present as f64)
}

pub fn assess_feasibility(spec: &Specification) -> FeasibilityScores {
    let technical = technical_feasibility(spec);
    let resource = resource_feasibility(spec);
    let ethical = ethical_feasibility(spec);
    FeasibilityScores {
        technical,
        resource,
        ethical,
        overall: clamp_unit((technical + resource + ethical) / 3.0),
    }
}

pub fn estimate_impact(spec: &Specification) -> f64 {
    clamp_unit(
        FEATURE_IMPACT * spec.key_features.len() as f64
            + INTEGRATION_IMPACT * spec.integration_points.len() as f64
            + ETHICS_IMPACT * spec.ethical_considerations.len() as f64,
    )
}

pub fn estimate_resources(spec: &Specification) -> ResourceEstimate {
    let features = spec.key_features.len() as u32;
    let challenges = spec.potential_challenges.len() as u32;
    ResourceEstimate {
        computing_power: features * 10,
        storage_gb: features * 5,
        development_weeks: features * 2 + challenges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_with(
        features: usize,
        resources: usize,
        challenges: usize,
        integration: usize,
        considerations: &[&str],
    ) -> Specification {
        let items = |prefix: &str, n: usize| -> Vec<String> {
            (0..n).map(|i| format!("{prefix} {i}")).collect()
        };
        Specification {
            name: "test concept".to_string(),
            purpose: "testing".to_string(),
            key_features: items("Feature related to", features),
            required_resources: items("resource", resources),
            potential_challenges: items("challenge", challenges),
            integration_points: items("system", integration),
            ethical_considerations: considerations.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_ethical_two_keyword_classes() {
        let spec = spec_with(
            3,
            2,
            2,
            2,
            &[
                "Privacy: Ensure user data is protected",
                "Fairness: Avoid bias",
            ],
        );
        assert!((ethical_feasibility(&spec) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_ethical_keyword_counted_once_per_class() {
        let spec = spec_with(
            3,
            2,
            2,
            2,
            &["Safety: first", "AI safety review", "SAFETY again"],
        );
        assert!((ethical_feasibility(&spec) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_resource_two_items() {
        let spec = spec_with(3, 2, 2, 2, &[]);
        assert!((resource_feasibility(&spec) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_technical_fresh_spec() {
        // 1 - (0.3 + 0.1 + 0.3)
        let spec = spec_with(3, 2, 2, 2, &[]);
        assert!((technical_feasibility(&spec) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_scores_clamped() {
        let spec = spec_with(40, 9, 9, 9, &[]);
        assert_eq!(technical_feasibility(&spec), 0.0);
        assert_eq!(resource_feasibility(&spec), 0.0);
        assert_eq!(estimate_impact(&spec), 1.0);

        let scores = assess_feasibility(&spec);
        for s in [scores.technical, scores.resource, scores.ethical, scores.overall] {
            assert!((0.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn test_overall_is_mean() {
        let spec = spec_with(3, 2, 2, 2, &["Privacy: x", "Fairness: y"]);
        let scores = assess_feasibility(&spec);
        assert!((scores.overall - (0.3 + 0.6 + 0.4) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_impact() {
        // 0.6 + 0.3 + 0.1
        let spec = spec_with(3, 2, 2, 2, &["Privacy: x"]);
        assert!((estimate_impact(&spec) - 1.0).abs() < 1e-9);

        let spec = spec_with(1, 2, 2, 0, &[]);
        assert!((estimate_impact(&spec) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_resource_estimate() {
        let spec = spec_with(3, 2, 2, 2, &[]);
        assert_eq!(
            estimate_resources(&spec),
            ResourceEstimate {
                computing_power: 30,
                storage_gb: 15,
                development_weeks: 8,
            }
        );
    }
}
