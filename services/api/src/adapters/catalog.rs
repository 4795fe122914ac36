//! services/api/src/adapters/catalog.rs
//!
//! The built-in essay tests. Implements the `TestCatalog` port over a fixed list.

use async_trait::async_trait;
use essay_scoring_core::{
    domain::{EssayTest, Question, ScoringCriteria},
    ports::{PortError, PortResult, TestCatalog},
};

/// A read-only catalog held in memory for the life of the process.
#[derive(Clone)]
pub struct StaticCatalog {
    tests: Vec<EssayTest>,
}

impl StaticCatalog {
    pub fn new(tests: Vec<EssayTest>) -> Self {
        Self { tests }
    }

    /// The catalog shipped with the service.
    pub fn builtin() -> Self {
        Self::new(vec![
            anonymity_test(),
            automation_test(),
            community_test(),
        ])
    }
}

#[async_trait]
impl TestCatalog for StaticCatalog {
    async fn list_tests(&self) -> PortResult<Vec<EssayTest>> {
        Ok(self.tests.clone())
    }

    async fn get_test(&self, test_id: &str) -> PortResult<EssayTest> {
        self.tests
            .iter()
            .find(|t| t.id == test_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Test {} not found", test_id)))
    }
}

//=========================================================================================
// Built-in Tests
//=========================================================================================

fn summary_question() -> Question {
    Question {
        title: "Question 1: Summary".to_string(),
        description: "Summarize the main points of the passage in about 200 characters.".to_string(),
        points: 30,
        character_limit: "about 200 characters".to_string(),
    }
}

fn opinion_question(prompt: &str) -> Question {
    Question {
        title: "Question 2: Opinion".to_string(),
        description: format!(
            "{} State your own position and support it with reasons, in 600 to 800 characters.",
            prompt
        ),
        points: 70,
        character_limit: "600-800 characters".to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn essay_test(
    id: &str,
    title: &str,
    description: &str,
    difficulty: &str,
    category: &str,
    participants: u32,
    essay_text: &str,
    prompt: &str,
    criteria: ScoringCriteria,
) -> EssayTest {
    EssayTest {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        reading_time: "15 minutes".to_string(),
        writing_time: "60 minutes".to_string(),
        total_points: 100,
        difficulty: difficulty.to_string(),
        category: category.to_string(),
        participants,
        essay_text: essay_text.to_string(),
        question1: summary_question(),
        question2: opinion_question(prompt),
        scoring_criteria: criteria,
    }
}

fn anonymity_test() -> EssayTest {
    essay_test(
        "t1",
        "Anonymity and Responsibility on Social Media",
        "Read a passage on anonymous speech online and discuss whether real-name rules are justified.",
        "Standard",
        "Society",
        1284,
        "Social media lets anyone publish an opinion to the world within seconds, and much of that \
         speech is anonymous. Anonymity protects people who would otherwise be silenced: employees \
         reporting misconduct, members of minorities, and citizens living under governments that \
         punish dissent. At the same time, the absence of a name lowers the cost of cruelty. \
         Harassment campaigns, defamation and coordinated misinformation thrive when no one has to \
         answer for what they write.\n\n\
         Some propose requiring real names on every platform. Supporters argue that accountability \
         would improve the quality of debate. Critics reply that the people most harmed by such a \
         rule are exactly those anonymity was meant to protect, while determined abusers simply \
         invent identities. A middle path keeps anonymity toward the public but requires platforms \
         to verify identity privately, disclosing it only under court order.\n\n\
         The question is not whether anonymity is good or bad, but how a society can keep the \
         freedom it enables while restoring responsibility for the harm it permits.",
        "Should social media platforms require users to post under their real names?",
        ScoringCriteria {
            main_thesis: "Anonymity enables free expression but weakens accountability; the task is \
                          to balance freedom with responsibility."
                .to_string(),
            key_points: vec![
                "Anonymity protects vulnerable speakers".to_string(),
                "Anonymity lowers the cost of harassment and misinformation".to_string(),
                "Real-name rules hurt the people anonymity protects".to_string(),
                "Private verification as a middle path".to_string(),
            ],
            question2_topic: "Real-name requirements on social media".to_string(),
        },
    )
}

fn automation_test() -> EssayTest {
    essay_test(
        "t2",
        "Artificial Intelligence and the Future of Work",
        "Read a passage on automation and employment and argue how society should respond.",
        "Advanced",
        "Technology",
        967,
        "Every wave of automation has been met with fears of mass unemployment. Looms, tractors and \
         spreadsheets each destroyed jobs, yet overall employment kept rising as new industries \
         appeared. Optimists expect artificial intelligence to follow the same pattern.\n\n\
         Others argue this time is different. Earlier machines replaced muscle or routine \
         calculation; today's systems draft contracts, diagnose images and write software. If \
         machines can learn new tasks faster than workers can retrain, the transition may leave \
         many people behind even if the economy as a whole grows. The benefits would flow to those \
         who own the systems, while the costs would fall on those whose skills lose value.\n\n\
         How societies respond matters more than the technology itself. Education that teaches \
         people how to keep learning, social insurance that supports workers between jobs, and \
         policies that share productivity gains widely can turn disruption into opportunity.",
        "Should governments actively manage the effects of AI on employment, or leave adjustment to the market?",
        ScoringCriteria {
            main_thesis: "Whether AI repeats past automation or differs from it, outcomes depend on \
                          how society manages the transition."
                .to_string(),
            key_points: vec![
                "Past automation created more jobs than it destroyed".to_string(),
                "AI may outpace workers' ability to retrain".to_string(),
                "Gains may concentrate among owners".to_string(),
                "Education and social insurance shape the outcome".to_string(),
            ],
            question2_topic: "Public policy for AI-driven job change".to_string(),
        },
    )
}

fn community_test() -> EssayTest {
    essay_test(
        "t3",
        "Urban Living and the Decline of Community",
        "Read a passage on city life and local ties and propose how communities can be rebuilt.",
        "Basic",
        "Culture",
        742,
        "More than half of the world's population now lives in cities, and the share keeps growing. \
         Cities offer jobs, culture and convenience, but many residents report feeling lonelier \
         than their grandparents did in small towns. Neighbors rarely know one another, and the \
         informal networks that once cared for children and the elderly have thinned.\n\n\
         Some see this as the price of freedom: city dwellers choose their relationships instead of \
         inheriting them. Others point out that weak local ties have real costs, from slower \
         recovery after disasters to isolation among older residents. Experiments such as shared \
         gardens, community kitchens and resident-run events suggest that connection can be \
         designed back into urban life, but only if people are willing to spend time on it.",
        "What role, if any, should individuals and local governments play in rebuilding community in cities?",
        ScoringCriteria {
            main_thesis: "Urbanization brings freedom and convenience but erodes local ties, which \
                          can be deliberately rebuilt."
                .to_string(),
            key_points: vec![
                "Urban loneliness is rising".to_string(),
                "Chosen relationships replace inherited ones".to_string(),
                "Weak ties have practical costs".to_string(),
                "Designed spaces and events can restore connection".to_string(),
            ],
            question2_topic: "Rebuilding community in cities".to_string(),
        },
    )
}
