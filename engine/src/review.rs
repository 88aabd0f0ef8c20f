//! Ethical review by the five-member board

use crate::errors::Result;
use crate::feedback::Panel;
use crate::scoring::ethical_feasibility;
use crate::specification::Specification;
use crate::vocabulary::Vocabulary;
use rand::Rng;
use serde::Serialize;

/// Outcome of an ethical review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ApprovalStatus {
    #[serde(rename = "Approved")]
    Approved,
    #[serde(rename = "Needs Revision")]
    NeedsRevision,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::NeedsRevision => "Needs Revision",
        }
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Approved" => Some(Self::Approved),
            "Needs Revision" => Some(Self::NeedsRevision),
            _ => None,
        }
    }

    /// Approved iff `score` strictly exceeds `threshold`
    pub fn for_score(score: f64, threshold: f64) -> Self {
        if score > threshold {
            Self::Approved
        } else {
            Self::NeedsRevision
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EthicalReview {
    pub ethical_score: f64,
    /// One comment per board member, in board order
    pub review_comments: Vec<String>,
    pub approval_status: ApprovalStatus,
}

/// Score `spec` and collect one comment per ethics board member
pub fn review_specification<R: Rng + ?Sized>(
    spec: &Specification,
    vocab: &Vocabulary,
    approval_threshold: f64,
    rng: &mut R,
) -> Result<EthicalReview> {
    let ethical_score = ethical_feasibility(spec);

    let review_comments = Panel::EthicsBoard
        .roles()
        .iter()
        .map(|role| role.sentence(spec, vocab, rng))
        .collect::<Result<Vec<_>>>()?;

    Ok(EthicalReview {
        ethical_score,
        review_comments,
        approval_status: ApprovalStatus::for_score(ethical_score, approval_threshold),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::build_specification;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(ApprovalStatus::for_score(0.7, 0.7), ApprovalStatus::NeedsRevision);
        assert_eq!(ApprovalStatus::for_score(0.8, 0.7), ApprovalStatus::Approved);
        assert_eq!(ApprovalStatus::for_score(0.0, 0.7), ApprovalStatus::NeedsRevision);
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [ApprovalStatus::Approved, ApprovalStatus::NeedsRevision] {
            assert_eq!(ApprovalStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ApprovalStatus::parse("approved"), None);
        assert_eq!(
            serde_json::to_string(&ApprovalStatus::NeedsRevision).expect("json"),
            "\"Needs Revision\""
        );
    }

    #[test]
    fn test_review_has_one_comment_per_board_member() {
        let vocab = Vocabulary::default();
        let mut rng = StdRng::seed_from_u64(21);
        let spec = build_specification("A test idea", &vocab, &mut rng).expect("build");

        let review = review_specification(&spec, &vocab, 0.7, &mut rng).expect("review");
        assert_eq!(review.review_comments.len(), 5);
        assert!(
            review.review_comments[0].starts_with("Ensure compliance with ethical guideline: ")
        );
        assert_eq!(
            review.review_comments[1],
            "Consider the impact on individual rights and freedoms"
        );
        assert_eq!(review.ethical_score, ethical_feasibility(&spec));
        assert_eq!(
            review.approval_status,
            ApprovalStatus::for_score(review.ethical_score, 0.7)
        );
    }
}
