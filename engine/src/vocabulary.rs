//! Fixed catalogs the generators sample from
//!
//! The concept vocabulary and the ethical guidelines are owned by the engine
//! and may grow at runtime (advisor vocabulary growth, guideline adaptation);
//! every other catalog is a fixed constant.

use crate::errors::{IdeationError, Result};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Seed technology concepts combined into ideas and features
pub const DEFAULT_CONCEPTS: [&str; 6] = [
    "AI",
    "robotics",
    "quantum computing",
    "neural networks",
    "blockchain",
    "virtual reality",
];

/// City challenges an idea can address
pub const CITY_CHALLENGES: [&str; 4] = [
    "energy efficiency",
    "data privacy",
    "ethical decision-making",
    "human-AI collaboration",
];

/// Resources a specification can require
pub const RESOURCES: [&str; 4] = [
    "computing power",
    "data storage",
    "network bandwidth",
    "specialized hardware",
];

/// Delivery challenges a specification can face
pub const SPEC_CHALLENGES: [&str; 4] = [
    "scalability",
    "data privacy",
    "user adoption",
    "technical complexity",
];

/// Named external systems a specification can integrate with
pub const INTEGRATION_SYSTEMS: [&str; 3] = [
    "Cultural Evolution Simulator",
    "Community Cohesion Network",
    "Cartographer of Light",
];

/// SCAMPER creative problem-solving techniques
pub const SCAMPER_TECHNIQUES: [&str; 7] = [
    "Substitute",
    "Combine",
    "Adapt",
    "Modify",
    "Put to another use",
    "Eliminate",
    "Reverse",
];

/// Default ethical guidelines, in insertion order
pub const DEFAULT_GUIDELINES: [(&str, &str); 8] = [
    (
        "privacy",
        "Ensure user data is protected and used only with explicit consent",
    ),
    (
        "fairness",
        "Avoid bias and discrimination in AI decision-making processes",
    ),
    (
        "transparency",
        "Provide clear explanations of AI system functionality and decision rationale",
    ),
    (
        "accountability",
        "Establish clear lines of responsibility for AI system actions",
    ),
    (
        "safety",
        "Implement robust safeguards to prevent harm to individuals or society",
    ),
    (
        "human_oversight",
        "Maintain meaningful human control over critical AI systems",
    ),
    (
        "environmental_impact",
        "Minimize the ecological footprint of AI systems",
    ),
    (
        "social_good",
        "Prioritize AI applications that benefit humanity and the environment",
    ),
];

/// An ethical guideline key with its fixed description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guideline {
    pub key: String,
    pub description: String,
}

impl Guideline {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }

    /// "Capitalized-key: description"
    pub fn as_consideration(&self) -> String {
        format!("{}: {}", capitalize(&self.key), self.description)
    }
}

/// Upper-case the first character and lower-case the rest
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Guideline key of a consideration entry: text before the first colon,
/// trimmed and lower-cased
pub fn consideration_key(consideration: &str) -> String {
    consideration
        .split(':')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Mutable vocabulary owned by the engine
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub concepts: Vec<String>,
    pub challenges: Vec<String>,
    guidelines: Vec<Guideline>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            concepts: DEFAULT_CONCEPTS.iter().map(ToString::to_string).collect(),
            challenges: CITY_CHALLENGES.iter().map(ToString::to_string).collect(),
            guidelines: DEFAULT_GUIDELINES
                .iter()
                .map(|(k, d)| Guideline::new(*k, *d))
                .collect(),
        }
    }
}

impl Vocabulary {
    /// Vocabulary with an explicit concept list and default everything else
    pub fn with_concepts(concepts: Vec<String>) -> Self {
        Self {
            concepts,
            ..Self::default()
        }
    }

    pub fn guidelines(&self) -> &[Guideline] {
        &self.guidelines
    }

    pub fn guideline(&self, key: &str) -> Option<&Guideline> {
        self.guidelines.iter().find(|g| g.key == key)
    }

    /// Insert or overwrite guidelines, keeping first-insertion order
    pub fn update_guidelines<I, K, D>(&mut self, updates: I)
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<String>,
    {
        for (key, description) in updates {
            let key = key.into();
            let description = description.into();
            match self.guidelines.iter_mut().find(|g| g.key == key) {
                Some(existing) => existing.description = description,
                None => self.guidelines.push(Guideline::new(key, description)),
            }
        }
    }

    /// Pick one concept uniformly at random
    pub fn random_concept<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&str> {
        self.concepts
            .choose(rng)
            .map(String::as_str)
            .ok_or(IdeationError::InsufficientVocabulary {
                catalog: "concepts",
                requested: 1,
                available: 0,
            })
    }

    /// Pick one city challenge uniformly at random
    pub fn random_challenge<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&str> {
        self.challenges
            .choose(rng)
            .map(String::as_str)
            .ok_or(IdeationError::InsufficientVocabulary {
                catalog: "challenges",
                requested: 1,
                available: 0,
            })
    }

    /// Pick one guideline uniformly at random
    pub fn random_guideline<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Guideline> {
        self.guidelines
            .choose(rng)
            .ok_or(IdeationError::InsufficientVocabulary {
                catalog: "ethical guidelines",
                requested: 1,
                available: 0,
            })
    }
}

/// Draw `count` distinct items from `catalog`, in random order
pub fn sample_distinct<'a, T, R>(
    catalog_name: &'static str,
    catalog: &'a [T],
    count: usize,
    rng: &mut R,
) -> Result<Vec<&'a T>>
where
    R: Rng + ?Sized,
{
    if catalog.len() < count {
        return Err(IdeationError::InsufficientVocabulary {
            catalog: catalog_name,
            requested: count,
            available: catalog.len(),
        });
    }
    Ok(catalog.choose_multiple(rng, count).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_capitalize_matches_guideline_format() {
        assert_eq!(capitalize("privacy"), "Privacy");
        assert_eq!(capitalize("human_oversight"), "Human_oversight");
        assert_eq!(capitalize("AI"), "Ai");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_consideration_key() {
        assert_eq!(
            consideration_key("Human_oversight: Maintain meaningful human control"),
            "human_oversight"
        );
        assert_eq!(consideration_key("  Safety : x"), "safety");
        assert_eq!(consideration_key("no colon here"), "no colon here");
    }

    #[test]
    fn test_sample_distinct_without_replacement() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let picked = sample_distinct("resources", &RESOURCES, 2, &mut rng).expect("sample");
            assert_eq!(picked.len(), 2);
            assert_ne!(picked[0], picked[1]);
        }
    }

    #[test]
    fn test_sample_distinct_exhausted() {
        let mut rng = StdRng::seed_from_u64(3);
        let err = sample_distinct("integration systems", &INTEGRATION_SYSTEMS, 4, &mut rng)
            .expect_err("should fail");
        assert!(matches!(
            err,
            IdeationError::InsufficientVocabulary {
                requested: 4,
                available: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_concepts_is_error() {
        let vocab = Vocabulary::with_concepts(Vec::new());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(vocab.random_concept(&mut rng).is_err());
    }

    #[test]
    fn test_update_guidelines_overwrites_and_appends() {
        let mut vocab = Vocabulary::default();
        vocab.update_guidelines([
            ("privacy", "Updated privacy text"),
            ("diversity", "Increase focus on generating diverse ideas"),
        ]);
        assert_eq!(vocab.guidelines().len(), 9);
        assert_eq!(vocab.guidelines()[0].description, "Updated privacy text");
        assert_eq!(vocab.guidelines()[8].key, "diversity");
    }
}
