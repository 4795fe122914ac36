//! Fixtures shared by the unit tests in this crate.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{EssayTest, Question, ScoredResult, ScoringCriteria};
use crate::ports::{PortResult, ResultRepository};

pub fn sample_test(id: &str) -> EssayTest {
    EssayTest {
        id: id.to_string(),
        title: "Anonymity and Responsibility Online".to_string(),
        description: "Read a passage on online anonymity and respond.".to_string(),
        reading_time: "15 minutes".to_string(),
        writing_time: "60 minutes".to_string(),
        total_points: 100,
        difficulty: "Standard".to_string(),
        category: "Society".to_string(),
        participants: 0,
        essay_text: "Anonymity lets people speak freely, yet it also weakens accountability.".to_string(),
        question1: Question {
            title: "Question 1: Summary".to_string(),
            description: "Summarize the main points of the passage in about 200 characters.".to_string(),
            points: 30,
            character_limit: "about 200 characters".to_string(),
        },
        question2: Question {
            title: "Question 2: Opinion".to_string(),
            description: "Give your opinion in 600 to 800 characters.".to_string(),
            points: 70,
            character_limit: "600-800 characters".to_string(),
        },
        scoring_criteria: ScoringCriteria {
            main_thesis: "Anonymity trades accountability for freedom of expression.".to_string(),
            key_points: vec!["freedom of expression".to_string(), "accountability".to_string()],
            question2_topic: "Should online platforms require real names?".to_string(),
        },
    }
}

/// A bare `ResultRepository` over a locked map.
#[derive(Default)]
pub struct MapRepository {
    results: Mutex<HashMap<String, ScoredResult>>,
}

#[async_trait]
impl ResultRepository for MapRepository {
    async fn get(&self, id: &str) -> PortResult<Option<ScoredResult>> {
        Ok(self.results.lock().unwrap().get(id).cloned())
    }

    async fn set(&self, id: &str, result: ScoredResult) -> PortResult<()> {
        self.results.lock().unwrap().insert(id.to_string(), result);
        Ok(())
    }

    async fn remove_if_expired(&self, id: &str, now: DateTime<Utc>) -> PortResult<bool> {
        let mut results = self.results.lock().unwrap();
        if results.get(id).is_some_and(|r| r.is_expired_at(now)) {
            results.remove(id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn list(&self) -> PortResult<Vec<ScoredResult>> {
        Ok(self.results.lock().unwrap().values().cloned().collect())
    }
}
