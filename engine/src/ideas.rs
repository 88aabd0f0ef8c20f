//! Idea string generators
//!
//! Ideas are plain strings combining vocabulary concepts, city challenges
//! and, for integrated ideas, data returned by the city simulators.

use crate::errors::Result;
use crate::vocabulary::{SCAMPER_TECHNIQUES, Vocabulary, sample_distinct};
use rand::Rng;

/// Items of each collaborator list combined into integrated ideas
pub const INTEGRATION_FANOUT: usize = 3;

/// "A {c1} system that uses {c2} to address {challenge} in the Cities of Light"
///
/// `c1` and `c2` are distinct vocabulary entries.
pub fn generate_ideas<R: Rng + ?Sized>(
    vocab: &Vocabulary,
    count: usize,
    rng: &mut R,
) -> Result<Vec<String>> {
    let mut ideas = Vec::with_capacity(count);
    for _ in 0..count {
        let pair = sample_distinct("concepts", &vocab.concepts, 2, rng)?;
        let challenge = vocab.random_challenge(rng)?;
        ideas.push(format!(
            "A {} system that uses {} to address {challenge} in the Cities of Light",
            pair[0], pair[1]
        ));
    }
    Ok(ideas)
}

/// One "{technique} {concept} to address {challenge}" prompt per SCAMPER technique
pub fn creative_problem_solving<R: Rng + ?Sized>(
    vocab: &Vocabulary,
    rng: &mut R,
) -> Result<Vec<String>> {
    SCAMPER_TECHNIQUES
        .iter()
        .map(|technique| {
            let concept = vocab.random_concept(rng)?;
            let challenge = vocab.random_challenge(rng)?;
            Ok(format!("{technique} {concept} to address {challenge}"))
        })
        .collect()
}

/// Combine the first three trends, needs and areas into ideas
///
/// Empty when any of the three inputs is empty.
pub fn integrated_ideas<R: Rng + ?Sized>(
    vocab: &Vocabulary,
    trends: &[String],
    needs: &[String],
    areas: &[String],
    rng: &mut R,
) -> Result<Vec<String>> {
    let mut ideas = Vec::new();
    if trends.is_empty() || needs.is_empty() || areas.is_empty() {
        return Ok(ideas);
    }

    for trend in trends.iter().take(INTEGRATION_FANOUT) {
        for need in needs.iter().take(INTEGRATION_FANOUT) {
            for area in areas.iter().take(INTEGRATION_FANOUT) {
                let concept = vocab.random_concept(rng)?;
                ideas.push(format!(
                    "A {concept} system that addresses {need} in {area}, inspired by the trend of {trend}"
                ));
            }
        }
    }
    Ok(ideas)
}
