//! Text reports, rollout phases and the enhancement plan

use crate::collaborators::{CommunityFeedback, CulturalImpact};
use crate::knowledge_store::Synergy;
use crate::review::EthicalReview;
use crate::specification::Specification;
use serde::Serialize;
use std::fmt::Write as _;

/// Rollout phase of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    CoreDevelopment,
    Integration,
    CollaborativeRefinement,
    Deployment,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::CoreDevelopment,
        Phase::Integration,
        Phase::CollaborativeRefinement,
        Phase::Deployment,
    ];

    pub fn number(&self) -> u8 {
        match self {
            Self::CoreDevelopment => 1,
            Self::Integration => 2,
            Self::CollaborativeRefinement => 3,
            Self::Deployment => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.number() == n)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::CoreDevelopment => "Core system development",
            Self::Integration => "Integration with existing systems",
            Self::CollaborativeRefinement => "Collaborative refinement and ethical alignment",
            Self::Deployment => "Full deployment and initial idea generation cycle",
        }
    }
}

/// One item of the future enhancement plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enhancement {
    pub name: &'static str,
    pub description: &'static str,
    pub steps: [&'static str; 3],
}

pub const FUTURE_ENHANCEMENTS: [Enhancement; 3] = [
    Enhancement {
        name: "Autonomous Development",
        description: "Develop capabilities for autonomous development of high-priority concepts",
        steps: [
            "Implement advanced machine learning algorithms for concept prioritization",
            "Create a sandbox environment for safe testing of autonomous development",
            "Develop fail-safe mechanisms and ethical constraints for autonomous operations",
        ],
    },
    Enhancement {
        name: "Predictive Modeling",
        description: "Enhance predictive modeling capabilities for anticipating future needs",
        steps: [
            "Integrate advanced time series analysis and forecasting techniques",
            "Develop a system for continuous data collection on emerging trends",
            "Implement a feedback loop for refining predictive models based on outcomes",
        ],
    },
    Enhancement {
        name: "Self-Modification",
        description: "Explore safe self-modification of ideation capabilities",
        steps: [
            "Research and implement advanced AI safety protocols",
            "Develop a staged approach to self-modification with human oversight",
            "Create a comprehensive testing framework for validating self-modifications",
        ],
    },
];

pub fn render_future_plan(plan: &[Enhancement]) -> String {
    let mut out = String::from("Future Enhancement Plans:\n");
    for item in plan {
        let _ = writeln!(out, "\n{}:", item.name);
        let _ = writeln!(out, "Description: {}", item.description);
        out.push_str("Steps:\n");
        for (i, step) in item.steps.iter().enumerate() {
            let _ = writeln!(out, "  {}. {step}", i + 1);
        }
    }
    out
}

fn bullet_section(out: &mut String, title: &str, items: impl IntoIterator<Item = String>) {
    let _ = writeln!(out, "{title}:");
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

/// Concepts, fresh ideas, capability gaps and top synergies
pub fn render_engine_report(
    concepts: &[String],
    ideas: &[String],
    gaps: &[String],
    synergies: &[Synergy],
) -> String {
    let mut out = String::from("AI Ideation Engine Report\n=========================\n\n");

    bullet_section(&mut out, "Current Concepts", concepts.iter().cloned());
    out.push('\n');
    bullet_section(&mut out, "Recent Ideas Generated", ideas.iter().cloned());
    out.push('\n');
    bullet_section(&mut out, "Identified Capability Gaps", gaps.iter().cloned());
    out.push('\n');
    bullet_section(
        &mut out,
        "Top Concept Synergies",
        synergies
            .iter()
            .map(|s| format!("{} + {} ({} common tags)", s.first, s.second, s.shared_tags)),
    );

    out
}

/// Ethical review plus whatever the simulators returned
pub fn render_ethical_impact_report(
    concept: &str,
    spec: &Specification,
    review: &EthicalReview,
    cultural: Option<&CulturalImpact>,
    community: Option<&CommunityFeedback>,
) -> String {
    let mut out = format!("Ethical Impact Report for: {concept}\n\n");
    let _ = writeln!(out, "Ethical Score: {:.2}", review.ethical_score);
    let _ = writeln!(out, "Approval Status: {}\n", review.approval_status);

    bullet_section(
        &mut out,
        "Ethical Considerations",
        spec.ethical_considerations.iter().cloned(),
    );
    out.push('\n');
    bullet_section(
        &mut out,
        "Ethical Review Board Comments",
        review.review_comments.iter().cloned(),
    );

    if let Some(impact) = cultural {
        let _ = writeln!(out, "\nCultural Impact Assessment: {:.2}", impact.impact_score);
        let _ = writeln!(out, "Cultural Impact Details: {}", impact.details_text());
    }

    if let Some(feedback) = community {
        let _ = writeln!(out, "\nCommunity Feedback Score: {:.2}", feedback.feedback_score);
        let _ = writeln!(out, "Community Concerns: {}", feedback.concerns.join(", "));
    }

    out
}
