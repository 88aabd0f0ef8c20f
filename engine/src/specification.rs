//! Specification builder and exporter
//!
//! Turns a concept string into a structured [`Specification`] with
//! randomized features, resources, challenges, integration points and
//! ethical considerations.

use crate::errors::{IdeationError, Result};
use crate::vocabulary::{
    INTEGRATION_SYSTEMS, RESOURCES, SPEC_CHALLENGES, Vocabulary, sample_distinct,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Marker whose trailing text becomes the purpose
const PURPOSE_MARKER: &str = "address ";

/// Features drawn for a fresh specification
pub const INITIAL_FEATURES: usize = 3;

/// Items drawn from each two-of-N catalog
const CATALOG_DRAW: usize = 2;

/// Probability of including each ethical guideline
const GUIDELINE_INCLUSION: f64 = 0.5;

/// Structured elaboration of a concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub name: String,
    pub purpose: String,
    pub key_features: Vec<String>,
    pub required_resources: Vec<String>,
    pub potential_challenges: Vec<String>,
    pub integration_points: Vec<String>,
    pub ethical_considerations: Vec<String>,
}

/// Text after the last `"address "` marker, or the whole concept
pub fn derive_purpose(concept: &str) -> String {
    match concept.rfind(PURPOSE_MARKER) {
        Some(idx) => concept[idx + PURPOSE_MARKER.len()..].to_string(),
        None => concept.to_string(),
    }
}

/// Build a fresh specification for `concept`
pub fn build_specification<R: Rng + ?Sized>(
    concept: &str,
    vocab: &Vocabulary,
    rng: &mut R,
) -> Result<Specification> {
    let mut key_features = Vec::with_capacity(INITIAL_FEATURES);
    for _ in 0..INITIAL_FEATURES {
        let related = vocab.random_concept(rng)?;
        key_features.push(format!("Feature related to {related}"));
    }

    let required_resources = draw_two("resources", &RESOURCES, rng)?;
    let potential_challenges = draw_two("specification challenges", &SPEC_CHALLENGES, rng)?;
    let integration_points = draw_two("integration systems", &INTEGRATION_SYSTEMS, rng)?;

    Ok(Specification {
        name: concept.to_string(),
        purpose: derive_purpose(concept),
        key_features,
        required_resources,
        potential_challenges,
        integration_points,
        ethical_considerations: generate_ethical_considerations(vocab, rng),
    })
}

fn draw_two<R: Rng + ?Sized>(
    catalog_name: &'static str,
    catalog: &[&str],
    rng: &mut R,
) -> Result<Vec<String>> {
    Ok(sample_distinct(catalog_name, catalog, CATALOG_DRAW, rng)?
        .into_iter()
        .map(|s| (*s).to_string())
        .collect())
}

/// Include each guideline independently with probability one half
pub fn generate_ethical_considerations<R: Rng + ?Sized>(
    vocab: &Vocabulary,
    rng: &mut R,
) -> Vec<String> {
    vocab
        .guidelines()
        .iter()
        .filter(|_| rng.random_bool(GUIDELINE_INCLUSION))
        .map(|g| g.as_consideration())
        .collect()
}

/// Keep alphanumerics, space, `-` and `_`; trim trailing whitespace
pub fn safe_filename(concept: &str) -> String {
    concept
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Path of the exported file for `concept` inside `dir`
pub fn export_path(dir: &Path, concept: &str) -> PathBuf {
    dir.join(format!("{}.md", safe_filename(concept)))
}

/// Write `spec` as indented JSON to `path`
pub fn save_specification(spec: &Specification, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            IdeationError::export_with_source(
                format!("failed to create specs directory: {}", parent.display()),
                e,
            )
        })?;
    }

    let body = serde_json::to_string_pretty(spec)
        .map_err(|e| IdeationError::export_with_source("failed to serialize specification", e))?;

    std::fs::write(path, body).map_err(|e| {
        IdeationError::export_with_source(
            format!("failed to write specification to {}", path.display()),
            e,
        )
    })?;

    tracing::debug!(path = %path.display(), name = %spec.name, "Saved specification");
    Ok(())
}
