//! services/api/src/adapters/ai_scorer.rs
//!
//! This module contains the adapter for the LLM-based essay scorer.
//! It implements the `EssayScorer` port from the `core` crate. Callers are expected
//! to bound it with a timeout and fall back to the heuristic scorer on any error.

use std::collections::HashSet;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use essay_scoring_core::{
    domain::{CriterionScore, EssayTest, Feedback, Question, QuestionScore, ScoreBreakdown, Submission},
    ports::{EssayScorer, PortError, PortResult},
};
use serde::Deserialize;

const SYSTEM_INSTRUCTIONS: &str = r#"You are an experienced grader of university entrance essays.
You will receive a reading passage, two questions and a student's two answers.
Question 1 asks for a summary of the passage. Question 2 asks for the student's opinion.

Grade each answer against the question's point value and reply with ONLY a JSON object of this shape:
{
  "question1": {"total": <int>, "breakdown": [{"name": "<criterion>", "score": <int>, "comment": "<text>", "reasoning": "<text>"}]},
  "question2": {"total": <int>, "breakdown": [{"name": "<criterion>", "score": <int>, "comment": "<text>", "reasoning": "<text>"}]},
  "feedback": {"strengths": ["<text>"], "improvements": ["<text>"], "overall_assessment": "<text>"}
}
Totals must not exceed the question's points and criterion scores must not exceed the total.
Each criterion name may appear only once per question."#;

//=========================================================================================
// Model Reply Structs
//=========================================================================================

#[derive(Deserialize)]
struct ReplyCriterion {
    name: String,
    score: u32,
    #[serde(default)]
    comment: String,
    #[serde(default)]
    reasoning: String,
}

#[derive(Deserialize)]
struct ReplyQuestion {
    total: u32,
    breakdown: Vec<ReplyCriterion>,
}

#[derive(Deserialize)]
struct ReplyFeedback {
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
    overall_assessment: String,
}

#[derive(Deserialize)]
struct ScoringReply {
    question1: ReplyQuestion,
    question2: ReplyQuestion,
    feedback: ReplyFeedback,
}

impl ReplyQuestion {
    fn to_domain(self, question: &Question, label: &str) -> PortResult<QuestionScore> {
        if self.total > question.points {
            return Err(PortError::Unexpected(format!(
                "{} total {} exceeds {} points",
                label, self.total, question.points
            )));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = self.breakdown.iter().find(|c| !seen.insert(c.name.as_str())) {
            return Err(PortError::Unexpected(format!(
                "{} lists the criterion '{}' more than once",
                label, duplicate.name
            )));
        }
        let criteria = self
            .breakdown
            .into_iter()
            .map(|c| CriterionScore {
                name: c.name,
                score: c.score,
                comment: c.comment,
                reasoning: c.reasoning,
            })
            .collect::<Vec<_>>();
        let sum: u32 = criteria.iter().map(|c| c.score).sum();
        if sum > self.total {
            return Err(PortError::Unexpected(format!(
                "{} criteria add up to {} but the total is {}",
                label, sum, self.total
            )));
        }
        Ok(QuestionScore {
            total: self.total,
            criteria,
        })
    }
}

/// Turns the model's text reply into a breakdown, rejecting anything out of range.
pub fn parse_scoring_reply(raw: &str, test: &EssayTest) -> PortResult<ScoreBreakdown> {
    let json = strip_code_fence(raw);
    let reply: ScoringReply = serde_json::from_str(json)
        .map_err(|e| PortError::Unexpected(format!("Unreadable scoring reply: {}", e)))?;

    Ok(ScoreBreakdown {
        question1: reply.question1.to_domain(&test.question1, "question1")?,
        question2: reply.question2.to_domain(&test.question2, "question2")?,
        feedback: Feedback {
            strengths: reply.feedback.strengths,
            improvements: reply.feedback.improvements,
            overall_assessment: reply.feedback.overall_assessment,
        },
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

fn build_prompt(test: &EssayTest, submission: &Submission) -> String {
    format!(
        "PASSAGE:\n{}\n\nMAIN THESIS: {}\nKEY POINTS: {}\n\n\
         QUESTION 1 ({} points): {}\nANSWER 1:\n{}\n\n\
         QUESTION 2 ({} points): {}\nANSWER 2:\n{}",
        test.essay_text,
        test.scoring_criteria.main_thesis,
        test.scoring_criteria.key_points.join("; "),
        test.question1.points,
        test.question1.description,
        submission.answer1,
        test.question2.points,
        test.question2.description,
        submission.answer2,
    )
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `EssayScorer` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiScoringAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiScoringAdapter {
    /// Creates a new `OpenAiScoringAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl EssayScorer for OpenAiScoringAdapter {
    async fn score(&self, test: &EssayTest, submission: &Submission) -> PortResult<ScoreBreakdown> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_prompt(test, submission))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .temperature(0.2)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Scoring LLM response contained no text content.".to_string())
            })?;

        parse_scoring_reply(&content, test)
    }
}
