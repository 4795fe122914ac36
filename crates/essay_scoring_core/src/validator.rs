//! crates/essay_scoring_core/src/validator.rs
//!
//! Acceptance checks run on a pair of answers before they are scored.
//! The `Display` text of each error is shown to the user as-is.

use regex::Regex;
use std::sync::OnceLock;

/// Minimum trimmed length of the summary answer.
pub const MIN_SUMMARY_CHARS: usize = 10;
/// Minimum trimmed length of the opinion answer.
pub const MIN_OPINION_CHARS: usize = 30;
/// A summary longer than this is not a summary.
pub const MAX_SUMMARY_CHARS: usize = 400;
/// An opinion shorter than this says too little.
pub const MIN_OPINION_BODY_CHARS: usize = 50;
/// Number of instruction patterns that must match before an answer is rejected.
pub const INSTRUCTION_ECHO_THRESHOLD: usize = 3;

/// Which of the two questions an answer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Summary,
    Opinion,
}

impl QuestionKind {
    pub fn number(&self) -> u8 {
        match self {
            QuestionKind::Summary => 1,
            QuestionKind::Opinion => 2,
        }
    }
}

/// A content problem found in a single answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswerIssue {
    #[error("The answer is empty.")]
    Empty,
    #[error("The answer repeats the task instructions. Please enter your actual answer.")]
    InstructionEcho,
    #[error("The summary is too long. Please keep it to around 200 characters.")]
    SummaryTooLong,
    #[error("The opinion answer is too short. Please describe your opinion in more detail.")]
    OpinionTooShort,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please answer both questions.")]
    MissingAnswer,
    #[error("The answer to question {question} is too short. Please write at least {min} characters.")]
    TooShort { question: u8, min: usize },
    #[error("Question {question}: {issue}")]
    Answer { question: u8, issue: AnswerIssue },
}

fn instruction_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)summari[sz]e the main points of the passage in about \d+ characters",
            r"(?i)question\s*1\s*[:：].*summar",
            r"(?i)question\s*2\s*[:：].*opinion",
            r"(?i)\[\d+ points?\]",
            r"(?i)\(about \d+ characters\)",
            r"(?i)within \d+ characters",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("instruction pattern is a valid regex"))
        .collect()
    })
}

/// Counts how many of the fixed instruction patterns appear in `answer`.
/// Each pattern counts at most once.
pub fn instruction_echo_count(answer: &str) -> usize {
    instruction_patterns()
        .iter()
        .filter(|p| p.is_match(answer))
        .count()
}

/// Content checks for one answer. Lengths are raw (untrimmed) character counts.
pub fn validate_answer(answer: &str, kind: QuestionKind) -> Result<(), AnswerIssue> {
    if answer.trim().is_empty() {
        return Err(AnswerIssue::Empty);
    }

    if instruction_echo_count(answer) >= INSTRUCTION_ECHO_THRESHOLD {
        return Err(AnswerIssue::InstructionEcho);
    }

    let length = answer.chars().count();
    match kind {
        QuestionKind::Summary if length > MAX_SUMMARY_CHARS => Err(AnswerIssue::SummaryTooLong),
        QuestionKind::Opinion if length < MIN_OPINION_BODY_CHARS => {
            Err(AnswerIssue::OpinionTooShort)
        }
        _ => Ok(()),
    }
}

/// Full acceptance check for a submission. The first failing rule wins.
pub fn validate_submission(answer1: &str, answer2: &str) -> Result<(), ValidationError> {
    let trimmed1 = answer1.trim();
    let trimmed2 = answer2.trim();

    if trimmed1.is_empty() || trimmed2.is_empty() {
        return Err(ValidationError::MissingAnswer);
    }
    if trimmed1.chars().count() < MIN_SUMMARY_CHARS {
        return Err(ValidationError::TooShort {
            question: 1,
            min: MIN_SUMMARY_CHARS,
        });
    }
    if trimmed2.chars().count() < MIN_OPINION_CHARS {
        return Err(ValidationError::TooShort {
            question: 2,
            min: MIN_OPINION_CHARS,
        });
    }

    for (answer, kind) in [
        (answer1, QuestionKind::Summary),
        (answer2, QuestionKind::Opinion),
    ] {
        validate_answer(answer, kind).map_err(|issue| ValidationError::Answer {
            question: kind.number(),
            issue,
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> String {
        "The author argues that anonymity protects speech but weakens accountability.".to_string()
    }

    #[test]
    fn accepts_reasonable_answers() {
        let opinion = "I believe real-name rules would chill honest debate online.".to_string();
        assert_eq!(validate_submission(&summary(), &opinion), Ok(()));
    }

    #[test]
    fn rejects_blank_answers() {
        assert_eq!(
            validate_submission("   ", &"B".repeat(60)),
            Err(ValidationError::MissingAnswer)
        );
        assert_eq!(
            validate_submission(&summary(), "\n\t "),
            Err(ValidationError::MissingAnswer)
        );
    }

    #[test]
    fn enforces_minimum_trimmed_lengths() {
        assert_eq!(
            validate_submission("  short  ", &"B".repeat(60)),
            Err(ValidationError::TooShort { question: 1, min: 10 })
        );
        assert_eq!(
            validate_submission(&summary(), &format!("{}{}", "B".repeat(29), " ".repeat(40))),
            Err(ValidationError::TooShort { question: 2, min: 30 })
        );
    }

    #[test]
    fn opinion_of_49_chars_with_whitespace_padding_is_rejected() {
        let opinion = format!("{}{}", "B".repeat(30), " ".repeat(19));
        assert_eq!(opinion.chars().count(), 49);
        assert_eq!(
            validate_submission(&summary(), &opinion),
            Err(ValidationError::Answer {
                question: 2,
                issue: AnswerIssue::OpinionTooShort
            })
        );
    }

    #[test]
    fn opinion_of_50_chars_is_accepted() {
        assert_eq!(validate_submission(&summary(), &"B".repeat(50)), Ok(()));
    }

    #[test]
    fn summary_over_400_chars_is_rejected() {
        assert_eq!(validate_answer(&"A".repeat(400), QuestionKind::Summary), Ok(()));
        assert_eq!(
            validate_answer(&"A".repeat(401), QuestionKind::Summary),
            Err(AnswerIssue::SummaryTooLong)
        );
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        // 50 multi-byte characters.
        assert_eq!(validate_answer(&"論".repeat(50), QuestionKind::Opinion), Ok(()));
    }

    #[test]
    fn pasted_instructions_are_rejected() {
        let pasted = "Question 1: Summary [30 points] Summarize the main points of the passage \
                      in about 200 characters.";
        assert!(instruction_echo_count(pasted) >= 3);
        assert_eq!(
            validate_answer(pasted, QuestionKind::Summary),
            Err(AnswerIssue::InstructionEcho)
        );
    }

    #[test]
    fn two_instruction_matches_are_tolerated() {
        let answer = "My answer is within 200 characters [30 points] and covers the thesis.";
        assert_eq!(instruction_echo_count(answer), 2);
        assert_eq!(validate_answer(answer, QuestionKind::Summary), Ok(()));
    }

    #[test]
    fn error_text_names_the_question() {
        let err = ValidationError::Answer {
            question: 1,
            issue: AnswerIssue::SummaryTooLong,
        };
        assert_eq!(
            err.to_string(),
            "Question 1: The summary is too long. Please keep it to around 200 characters."
        );
    }
}
