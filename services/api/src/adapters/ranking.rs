//! services/api/src/adapters/ranking.rs
//!
//! A `RankingProvider` that fabricates plausible leaderboards for demos.
//! Nothing here is derived from stored results. Target university choices
//! are kept in memory per user.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use essay_scoring_core::{
    domain::{RankingEntry, TargetRanking, University, UniversityCategory},
    ports::{PortError, PortResult, RankingProvider},
    ranking::{summarize_target, CURRENT_USER_NICKNAME},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::sync::RwLock;
use tracing::info;

/// Entries shown on each side of the user in the national ranking.
const NATIONAL_NEIGHBOURS: u32 = 3;
const NATIONAL_TOP: u32 = 10;

fn university(
    id: &str,
    name: &str,
    short_name: &str,
    category: UniversityCategory,
    difficulty: &str,
    region: &str,
) -> University {
    University {
        id: id.to_string(),
        name: name.to_string(),
        short_name: short_name.to_string(),
        category,
        difficulty: difficulty.to_string(),
        region: region.to_string(),
    }
}

/// The universities a user can pick as targets.
pub fn default_universities() -> Vec<University> {
    use UniversityCategory::*;
    vec![
        university("tokyo-univ", "University of Tokyo", "Todai", National, "S", "Kanto"),
        university("kyoto-univ", "Kyoto University", "Kyodai", National, "S", "Kansai"),
        university("osaka-univ", "Osaka University", "Handai", National, "A", "Kansai"),
        university("tohoku-univ", "Tohoku University", "Tohokudai", National, "A", "Tohoku"),
        university("waseda-univ", "Waseda University", "Sodai", Private, "A", "Kanto"),
        university("keio-univ", "Keio University", "Keidai", Private, "A", "Kanto"),
    ]
}

fn days_ago<R: Rng>(rng: &mut R, now: DateTime<Utc>, max_days: i64) -> DateTime<Utc> {
    now - Duration::seconds(rng.gen_range(0..max_days * 24 * 60 * 60))
}

/// Generates a target ranking with `rng`. The first generated entry belongs to `user_id`.
pub fn generate_target_ranking<R: Rng>(
    rng: &mut R,
    university: &University,
    user_id: &str,
    now: DateTime<Utc>,
) -> TargetRanking {
    let total_participants: u32 = rng.gen_range(50..250);
    let generated = total_participants.min(20);

    let entries = (0..generated)
        .map(|i| {
            let score: u32 = rng.gen_range(60..100);
            let previous_score = score as i32 + rng.gen_range(-10..10);
            let is_me = i == 0;
            RankingEntry {
                user_id: if is_me { user_id.to_string() } else { format!("user-{}", i) },
                nickname: if is_me {
                    CURRENT_USER_NICKNAME.to_string()
                } else {
                    format!("Candidate {}", (b'A' + (i % 26) as u8) as char)
                },
                total_score: score,
                test_count: rng.gen_range(1..6),
                average_score: score,
                rank: i + 1,
                previous_rank: Some((i as i32 + rng.gen_range(-2..4)).max(1) as u32),
                score_change: Some(score as i32 - previous_score),
                last_test_date: days_ago(rng, now, 7),
            }
        })
        .collect();

    summarize_target(university, user_id, total_participants, entries, now)
}

/// Generates the national top ten plus the user and their neighbours, ordered by rank.
pub fn generate_national_ranking<R: Rng>(
    rng: &mut R,
    user_id: &str,
    now: DateTime<Utc>,
) -> Vec<RankingEntry> {
    let my_rank: u32 = rng.gen_range(500..1500);
    let my_score: u32 = rng.gen_range(70..100);

    let mut entries: Vec<RankingEntry> = (1..=NATIONAL_TOP)
        .map(|rank| RankingEntry {
            user_id: format!("top-user-{}", rank),
            nickname: format!("National #{}", rank),
            total_score: 101 - rank,
            test_count: rng.gen_range(5..15),
            average_score: 101 - rank,
            rank,
            previous_rank: None,
            score_change: Some(rng.gen_range(-5..5)),
            last_test_date: days_ago(rng, now, 3),
        })
        .collect();

    for rank in (my_rank - NATIONAL_NEIGHBOURS)..=(my_rank + NATIONAL_NEIGHBOURS) {
        let is_me = rank == my_rank;
        let score = if is_me {
            my_score
        } else {
            (my_score as i32 + rng.gen_range(-5..5)).clamp(0, 100) as u32
        };
        entries.push(RankingEntry {
            user_id: if is_me { user_id.to_string() } else { format!("user-{}", rank) },
            nickname: if is_me {
                CURRENT_USER_NICKNAME.to_string()
            } else {
                format!("Candidate {}", rank)
            },
            total_score: score,
            test_count: rng.gen_range(1..6),
            average_score: score,
            rank,
            previous_rank: Some((rank as i32 + rng.gen_range(-5..5)).max(1) as u32),
            score_change: Some(rng.gen_range(-5..10)),
            last_test_date: days_ago(rng, now, 7),
        });
    }

    entries.sort_by_key(|e| e.rank);
    entries
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

pub struct RandomRankingProvider {
    universities: Vec<University>,
    targets: RwLock<HashMap<String, Vec<String>>>,
}

impl RandomRankingProvider {
    pub fn new(universities: Vec<University>) -> Self {
        Self {
            universities,
            targets: RwLock::new(HashMap::new()),
        }
    }

    fn find(&self, university_id: &str) -> PortResult<&University> {
        self.universities
            .iter()
            .find(|u| u.id == university_id)
            .ok_or_else(|| PortError::NotFound(format!("University {} not found", university_id)))
    }
}

impl Default for RandomRankingProvider {
    fn default() -> Self {
        Self::new(default_universities())
    }
}

#[async_trait]
impl RankingProvider for RandomRankingProvider {
    async fn target_ranking(&self, university_id: &str, user_id: &str) -> PortResult<TargetRanking> {
        let university = self.find(university_id)?;

        let mut rng = StdRng::from_entropy();
        let ranking = generate_target_ranking(&mut rng, university, user_id, Utc::now());
        info!(
            "Generated target ranking for {} ({} participants)",
            university_id, ranking.total_participants
        );
        Ok(ranking)
    }

    async fn national_ranking(&self, user_id: &str) -> PortResult<Vec<RankingEntry>> {
        let mut rng = StdRng::from_entropy();
        Ok(generate_national_ranking(&mut rng, user_id, Utc::now()))
    }

    async fn save_targets(&self, user_id: &str, university_ids: Vec<String>) -> PortResult<Vec<String>> {
        let mut saved: Vec<String> = Vec::with_capacity(university_ids.len());
        for id in university_ids {
            self.find(&id)?;
            if !saved.contains(&id) {
                saved.push(id);
            }
        }

        self.targets
            .write()
            .await
            .insert(user_id.to_string(), saved.clone());
        info!("Saved {} target universities for {}", saved.len(), user_id);
        Ok(saved)
    }

    async fn targets(&self, user_id: &str) -> PortResult<Vec<String>> {
        Ok(self
            .targets
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}
