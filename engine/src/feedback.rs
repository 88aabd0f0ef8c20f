//! Multi-panel feedback refinement
//!
//! Each round, three fixed panels (AI roles, human experts, the ethics
//! board) produce one "Role verb: sentence" line per role. One of the pooled
//! lines is merged into the specification as a new key feature, and one
//! random guideline is appended to the ethical considerations unless its key
//! is already present.

use crate::errors::{IdeationError, Result};
use crate::specification::Specification;
use crate::vocabulary::{Vocabulary, consideration_key};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Separator between the speaker and the sentence of a feedback line
pub const FEEDBACK_SEPARATOR: &str = ": ";

/// Panel a role sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Ai,
    HumanExperts,
    EthicsBoard,
}

impl Panel {
    pub const ALL: [Panel; 3] = [Panel::Ai, Panel::HumanExperts, Panel::EthicsBoard];

    pub fn roles(&self) -> &'static [Role] {
        match self {
            Self::Ai => &[
                Role::AiEthicsExpert,
                Role::TechnicalArchitect,
                Role::UserExperienceSpecialist,
                Role::ResourceManager,
                Role::IntegrationSpecialist,
            ],
            Self::HumanExperts => &[
                Role::CityPlanner,
                Role::EnvironmentalScientist,
                Role::SocialPsychologist,
                Role::TechnologyEthicist,
                Role::AiResearcher,
            ],
            Self::EthicsBoard => &[
                Role::EthicsCommitteeChair,
                Role::HumanRightsAdvocate,
                Role::AiSafetyResearcher,
                Role::PhilosophyProfessor,
                Role::PublicPolicyExpert,
            ],
        }
    }

    /// Verb joining a role to its sentence
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Ai => "suggests",
            Self::HumanExperts => "recommends",
            Self::EthicsBoard => "advises",
        }
    }
}

/// One seat on a feedback panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    AiEthicsExpert,
    TechnicalArchitect,
    UserExperienceSpecialist,
    ResourceManager,
    IntegrationSpecialist,
    CityPlanner,
    EnvironmentalScientist,
    SocialPsychologist,
    TechnologyEthicist,
    AiResearcher,
    EthicsCommitteeChair,
    HumanRightsAdvocate,
    AiSafetyResearcher,
    PhilosophyProfessor,
    PublicPolicyExpert,
}

impl Role {
    pub fn title(&self) -> &'static str {
        match self {
            Self::AiEthicsExpert => "AI Ethics Expert",
            Self::TechnicalArchitect => "Technical Architect",
            Self::UserExperienceSpecialist => "User Experience Specialist",
            Self::ResourceManager => "Resource Manager",
            Self::IntegrationSpecialist => "Integration Specialist",
            Self::CityPlanner => "City Planner",
            Self::EnvironmentalScientist => "Environmental Scientist",
            Self::SocialPsychologist => "Social Psychologist",
            Self::TechnologyEthicist => "Technology Ethicist",
            Self::AiResearcher => "AI Researcher",
            Self::EthicsCommitteeChair => "Ethics Committee Chair",
            Self::HumanRightsAdvocate => "Human Rights Advocate",
            Self::AiSafetyResearcher => "AI Safety Researcher",
            Self::PhilosophyProfessor => "Philosophy Professor",
            Self::PublicPolicyExpert => "Public Policy Expert",
        }
    }

    /// The role's sentence for `spec`, without the speaker prefix
    pub fn sentence<R: Rng + ?Sized>(
        &self,
        spec: &Specification,
        vocab: &Vocabulary,
        rng: &mut R,
    ) -> Result<String> {
        let sentence = match self {
            // AI panel
            Self::AiEthicsExpert => format!(
                "Consider the ethical implication of {}",
                pick("key features", &spec.key_features, rng)?
            ),
            Self::TechnicalArchitect => format!(
                "Optimize the implementation of {}",
                pick("key features", &spec.key_features, rng)?
            ),
            Self::UserExperienceSpecialist => {
                "Improve the user interface for better accessibility".to_string()
            }
            Self::ResourceManager => format!(
                "Reduce the resource requirement for {}",
                pick("required resources", &spec.required_resources, rng)?
            ),
            Self::IntegrationSpecialist => format!(
                "Enhance integration with {}",
                pick("integration points", &spec.integration_points, rng)?
            ),

            // Human experts
            Self::CityPlanner => "Consider the impact on urban infrastructure".to_string(),
            Self::EnvironmentalScientist => format!(
                "Evaluate the environmental sustainability of {}",
                pick("required resources", &spec.required_resources, rng)?
            ),
            Self::SocialPsychologist => {
                "Assess the social implications and potential behavioral changes".to_string()
            }
            Self::TechnologyEthicist => {
                let concern = match spec.ethical_considerations.choose(rng) {
                    Some(c) => c.clone(),
                    None => vocab.random_guideline(rng)?.key.clone(),
                };
                format!("Address the ethical concerns related to {concern}")
            }
            Self::AiResearcher => format!(
                "Explore potential advancements in AI algorithms to enhance {}",
                pick("key features", &spec.key_features, rng)?
            ),

            // Ethics board
            Self::EthicsCommitteeChair => format!(
                "Ensure compliance with ethical guideline: {}",
                vocab.random_guideline(rng)?.key
            ),
            Self::HumanRightsAdvocate => {
                "Consider the impact on individual rights and freedoms".to_string()
            }
            Self::AiSafetyResearcher => {
                "Implement additional safety measures to prevent unintended consequences"
                    .to_string()
            }
            Self::PhilosophyProfessor => {
                "Explore the long-term philosophical implications of this technology".to_string()
            }
            Self::PublicPolicyExpert => {
                "Assess the potential impact on existing policies and regulations".to_string()
            }
        };
        Ok(sentence)
    }
}

fn pick<'a, R: Rng + ?Sized>(
    field: &'static str,
    items: &'a [String],
    rng: &mut R,
) -> Result<&'a str> {
    items
        .choose(rng)
        .map(String::as_str)
        .ok_or(IdeationError::InsufficientVocabulary {
            catalog: field,
            requested: 1,
            available: 0,
        })
}

/// One "Role verb: sentence" line per role on `panel`
pub fn panel_feedback<R: Rng + ?Sized>(
    panel: Panel,
    spec: &Specification,
    vocab: &Vocabulary,
    rng: &mut R,
) -> Result<Vec<String>> {
    panel
        .roles()
        .iter()
        .map(|role| {
            let sentence = role.sentence(spec, vocab, rng)?;
            Ok(format!("{} {}: {sentence}", role.title(), panel.verb()))
        })
        .collect()
}

/// Pooled feedback of all three panels, in panel order
pub fn collect_round<R: Rng + ?Sized>(
    spec: &Specification,
    vocab: &Vocabulary,
    rng: &mut R,
) -> Result<Vec<String>> {
    let mut pooled = Vec::with_capacity(15);
    for panel in Panel::ALL {
        pooled.extend(panel_feedback(panel, spec, vocab, rng)?);
    }
    Ok(pooled)
}

/// Everything after the first `": "` of a feedback line
pub fn feedback_content(line: &str) -> Result<&str> {
    line.split_once(FEEDBACK_SEPARATOR)
        .map(|(_, rest)| rest)
        .ok_or_else(|| IdeationError::MalformedFeedback {
            line: line.to_string(),
        })
}

/// Merge one random line of `feedback` into `spec` and maybe add a guideline
pub fn incorporate_feedback<R: Rng + ?Sized>(
    spec: &mut Specification,
    feedback: &[String],
    vocab: &Vocabulary,
    rng: &mut R,
) -> Result<()> {
    let line = feedback
        .choose(rng)
        .ok_or_else(|| IdeationError::internal("no feedback lines to merge"))?;
    let new_feature = feedback_content(line)?.to_string();
    tracing::debug!(feature = %new_feature, "Merging panel feedback");
    spec.key_features.push(new_feature);

    let guideline = vocab.random_guideline(rng)?;
    let key = guideline.key.to_lowercase();
    let already_present = spec
        .ethical_considerations
        .iter()
        .any(|c| consideration_key(c) == key);
    if !already_present {
        spec.ethical_considerations
            .push(guideline.as_consideration());
    }

    Ok(())
}

/// Run `rounds` rounds of collect-and-merge over `spec`
pub fn refine_specification<R: Rng + ?Sized>(
    spec: &mut Specification,
    rounds: usize,
    vocab: &Vocabulary,
    rng: &mut R,
) -> Result<()> {
    for round in 1..=rounds {
        let feedback = collect_round(spec, vocab, rng)?;
        incorporate_feedback(spec, &feedback, vocab, rng)?;
        tracing::debug!(
            round,
            features = spec.key_features.len(),
            considerations = spec.ethical_considerations.len(),
            "Refinement round complete"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::build_specification;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    const IDEA: &str =
        "A AI system that uses robotics to address energy efficiency in the Cities of Light";

    fn fresh(rng: &mut StdRng) -> Specification {
        build_specification(IDEA, &Vocabulary::default(), rng).expect("build")
    }

    #[test]
    fn test_round_has_fifteen_well_formed_lines() {
        let mut rng = StdRng::seed_from_u64(1);
        let spec = fresh(&mut rng);
        let lines = collect_round(&spec, &Vocabulary::default(), &mut rng).expect("round");

        assert_eq!(lines.len(), 15);
        assert!(lines[0].starts_with("AI Ethics Expert suggests: Consider the ethical"));
        assert_eq!(
            lines[2],
            "User Experience Specialist suggests: Improve the user interface for better accessibility"
        );
        assert_eq!(
            lines[5],
            "City Planner recommends: Consider the impact on urban infrastructure"
        );
        assert!(lines[10].starts_with("Ethics Committee Chair advises: Ensure compliance"));
        for line in &lines {
            assert!(feedback_content(line).is_ok(), "malformed: {line}");
        }
    }

    #[test]
    fn test_human_panel_mixes_static_and_content_lines() {
        let mut rng = StdRng::seed_from_u64(8);
        let spec = fresh(&mut rng);
        let vocab = Vocabulary::default();
        let lines = panel_feedback(Panel::HumanExperts, &spec, &vocab, &mut rng).expect("panel");

        assert_eq!(lines.len(), 5);
        let env = feedback_content(&lines[1]).expect("content");
        assert!(
            spec.required_resources
                .iter()
                .any(|r| env.ends_with(r.as_str()))
        );
        let researcher = feedback_content(&lines[4]).expect("content");
        assert!(
            spec.key_features
                .iter()
                .any(|f| researcher.ends_with(f.as_str()))
        );
    }

    #[test]
    fn test_ethicist_without_considerations_uses_guideline_key() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut spec = fresh(&mut rng);
        spec.ethical_considerations.clear();
        let vocab = Vocabulary::default();

        let sentence = Role::TechnologyEthicist
            .sentence(&spec, &vocab, &mut rng)
            .expect("sentence");
        let key = sentence
            .strip_prefix("Address the ethical concerns related to ")
            .expect("prefix");
        assert!(vocab.guideline(key).is_some());
    }

    #[test]
    fn test_feedback_content_splits_on_first_separator() {
        let line =
            "Ethics Committee Chair advises: Ensure compliance with ethical guideline: privacy";
        assert_eq!(
            feedback_content(line).expect("content"),
            "Ensure compliance with ethical guideline: privacy"
        );
    }

    #[test]
    fn test_malformed_line_is_explicit_error() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut spec = fresh(&mut rng);
        let feedback = vec!["no separator in this line".to_string()];

        let err = incorporate_feedback(&mut spec, &feedback, &Vocabulary::default(), &mut rng)
            .expect_err("should fail");
        assert!(matches!(err, IdeationError::MalformedFeedback { .. }));
        assert_eq!(spec.key_features.len(), 3);
    }

    #[test]
    fn test_three_rounds_add_three_features() {
        let vocab = Vocabulary::default();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut spec = fresh(&mut rng);
            refine_specification(&mut spec, 3, &vocab, &mut rng).expect("refine");
            assert_eq!(spec.key_features.len(), 6);

            let keys: Vec<String> = spec
                .ethical_considerations
                .iter()
                .map(|c| consideration_key(c))
                .collect();
            let unique: HashSet<&String> = keys.iter().collect();
            assert_eq!(unique.len(), keys.len(), "duplicate guideline key: {keys:?}");
        }
    }

    #[test]
    fn test_guideline_not_duplicated_when_present() {
        let vocab = Vocabulary::with_concepts(vec!["AI".to_string()]);
        let mut rng = StdRng::seed_from_u64(6);
        let mut spec = fresh(&mut rng);
        spec.ethical_considerations = vocab
            .guidelines()
            .iter()
            .map(|g| g.as_consideration())
            .collect();

        let feedback = collect_round(&spec, &vocab, &mut rng).expect("round");
        incorporate_feedback(&mut spec, &feedback, &vocab, &mut rng).expect("merge");
        assert_eq!(spec.ethical_considerations.len(), 8);
        assert_eq!(spec.key_features.len(), 4);
    }
}
