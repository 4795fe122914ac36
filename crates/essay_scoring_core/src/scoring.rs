//! crates/essay_scoring_core/src/scoring.rs
//!
//! The fallback scoring engine: a deterministic heuristic based on answer length.
//! It is used whenever no AI scorer is configured or the AI scorer fails.

use async_trait::async_trait;

use crate::domain::{CriterionScore, EssayTest, Feedback, QuestionScore, ScoreBreakdown, Submission};
use crate::ports::{EssayScorer, PortResult};

/// A named slice of a question's total, as an integer percentage.
struct Criterion {
    name: &'static str,
    weight_percent: u32,
    comment: &'static str,
    reasoning: &'static str,
}

const QUESTION1_CRITERIA: [Criterion; 3] = [
    Criterion {
        name: "Grasp of key points",
        weight_percent: 40,
        comment: "The main points of the passage are understood.",
        reasoning: "Judged from length and content.",
    },
    Criterion {
        name: "Selection and organization",
        weight_percent: 30,
        comment: "The important points have been selected.",
        reasoning: "Judged from structure.",
    },
    Criterion {
        name: "Written expression",
        weight_percent: 30,
        comment: "The writing is appropriate.",
        reasoning: "Judged from length.",
    },
];

const QUESTION2_CRITERIA: [Criterion; 4] = [
    Criterion {
        name: "Logical reasoning",
        weight_percent: 30,
        comment: "The argument is logically structured.",
        reasoning: "Judged from the structure of the text.",
    },
    Criterion {
        name: "Originality",
        weight_percent: 20,
        comment: "The answer includes an independent point of view.",
        reasoning: "Judged from an analysis of the content.",
    },
    Criterion {
        name: "Expressive writing",
        weight_percent: 25,
        comment: "The writing is appropriate.",
        reasoning: "Assessment of expression.",
    },
    Criterion {
        name: "Relevance to the task",
        weight_percent: 25,
        comment: "The content fits the task.",
        reasoning: "Judged from relevance to the prompt.",
    },
];

/// Question 1 (summary, 30 points) score for an answer of `length` characters.
pub fn score_question1(length: usize) -> u32 {
    if (150..=250).contains(&length) {
        25
    } else if length >= 100 {
        20
    } else {
        15
    }
}

/// Question 2 (opinion, 70 points) score for an answer of `length` characters.
pub fn score_question2(length: usize) -> u32 {
    if (600..=800).contains(&length) {
        60
    } else if length >= 400 {
        50
    } else if length >= 200 {
        40
    } else {
        30
    }
}

/// Splits `total` across `criteria`, flooring each share. Leftover points are dropped.
fn split_total(total: u32, criteria: &[Criterion]) -> QuestionScore {
    QuestionScore {
        total,
        criteria: criteria
            .iter()
            .map(|c| CriterionScore {
                name: c.name.to_string(),
                score: total * c.weight_percent / 100,
                comment: c.comment.to_string(),
                reasoning: c.reasoning.to_string(),
            })
            .collect(),
    }
}

fn template_feedback(total: u32) -> Feedback {
    Feedback {
        strengths: vec![
            "The answers are written at an appropriate length.".to_string(),
            "The basic structure is in place.".to_string(),
        ],
        improvements: vec![
            "Including more concrete examples would help.".to_string(),
            "The logical development could be strengthened further.".to_string(),
        ],
        overall_assessment: format!(
            "Your total score is {} points. The basic requirements are met, but there is room for improvement.",
            total
        ),
    }
}

/// Scores two answers with the length heuristic.
pub fn fallback_breakdown(answer1: &str, answer2: &str) -> ScoreBreakdown {
    let question1 = score_question1(answer1.chars().count());
    let question2 = score_question2(answer2.chars().count());

    ScoreBreakdown {
        question1: split_total(question1, &QUESTION1_CRITERIA),
        question2: split_total(question2, &QUESTION2_CRITERIA),
        feedback: template_feedback(question1 + question2),
    }
}

/// The heuristic scorer behind the `EssayScorer` port. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackScorer;

#[async_trait]
impl EssayScorer for FallbackScorer {
    async fn score(&self, _test: &EssayTest, submission: &Submission) -> PortResult<ScoreBreakdown> {
        Ok(fallback_breakdown(&submission.answer1, &submission.answer2))
    }
}
