//! crates/essay_scoring_core/src/ranking.rs
//!
//! Leaderboard arithmetic shared by every `RankingProvider`.

use chrono::{DateTime, Utc};

use crate::domain::{RankingEntry, TargetRanking, University};

/// Number of entries shown on a target ranking board.
pub const BOARD_SIZE: usize = 10;
/// Score given to the current user when the generated board has no entry for them.
pub const DEFAULT_USER_SCORE: u32 = 70;
pub const CURRENT_USER_NICKNAME: &str = "You";
/// A user may follow at most this many target universities.
pub const MAX_TARGET_UNIVERSITIES: usize = 3;

/// Sorts by score, highest first, and renumbers ranks from 1.
/// The sort is stable, so equal scores keep their original order.
pub fn assign_ranks(entries: &mut [RankingEntry]) {
    entries.sort_by(|a, b| b.total_score.cmp(&a.total_score));
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index as u32 + 1;
    }
}

/// Builds a target ranking for `user_id` from a freshly generated set of entries.
pub fn summarize_target(
    university: &University,
    user_id: &str,
    total_participants: u32,
    mut entries: Vec<RankingEntry>,
    now: DateTime<Utc>,
) -> TargetRanking {
    assign_ranks(&mut entries);

    if !entries.iter().any(|e| e.user_id == user_id) {
        entries.push(RankingEntry {
            user_id: user_id.to_string(),
            nickname: CURRENT_USER_NICKNAME.to_string(),
            total_score: DEFAULT_USER_SCORE,
            test_count: 1,
            average_score: DEFAULT_USER_SCORE,
            rank: entries.len() as u32 + 1,
            previous_rank: None,
            score_change: None,
            last_test_date: now,
        });
        assign_ranks(&mut entries);
    }

    // The user always has an entry at this point.
    let me = entries
        .iter()
        .find(|e| e.user_id == user_id)
        .cloned()
        .unwrap_or_else(|| entries[0].clone());

    let top_score = entries.first().map(|e| e.total_score).unwrap_or(0);
    let average_score =
        entries.iter().map(|e| e.total_score).sum::<u32>() / entries.len().max(1) as u32;

    let gap_to = |other: &RankingEntry| (other.total_score + 1).saturating_sub(me.total_score);

    let points_to_next = entries
        .iter()
        .find(|e| e.rank + 1 == me.rank)
        .map(gap_to)
        .unwrap_or(0);

    let points_to_top10 = if me.rank as usize > BOARD_SIZE {
        entries
            .iter()
            .find(|e| e.rank as usize == BOARD_SIZE)
            .map(gap_to)
            .unwrap_or(0)
    } else {
        0
    };

    entries.truncate(BOARD_SIZE);

    TargetRanking {
        university_id: university.id.clone(),
        university_name: university.name.clone(),
        my_rank: me.rank,
        total_participants,
        my_score: me.total_score,
        top_score,
        average_score,
        points_to_next,
        points_to_top10,
        points_to_top: top_score.saturating_sub(me.total_score),
        entries,
    }
}

/// Renders a score delta the way the leaderboard shows it, e.g. `+3 pts`.
pub fn format_score_change(change: i32) -> String {
    match change {
        c if c > 0 => format!("+{} pts", c),
        c if c < 0 => format!("{} pts", c),
        _ => "±0 pts".to_string(),
    }
}

/// Describes movement from `previous` to `current`; empty when there is no history.
pub fn format_rank_change(current: u32, previous: Option<u32>) -> String {
    match previous {
        None => String::new(),
        Some(previous) if previous > current => format!("up {}", previous - current),
        Some(previous) if previous < current => format!("down {}", current - previous),
        Some(_) => "no change".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UniversityCategory;

    fn entry(user_id: &str, score: u32) -> RankingEntry {
        RankingEntry {
            user_id: user_id.to_string(),
            nickname: user_id.to_string(),
            total_score: score,
            test_count: 1,
            average_score: score,
            rank: 0,
            previous_rank: None,
            score_change: None,
            last_test_date: Utc::now(),
        }
    }

    fn university() -> University {
        University {
            id: "north-univ".to_string(),
            name: "Northern University".to_string(),
            short_name: "Northern".to_string(),
            category: UniversityCategory::National,
            difficulty: "A".to_string(),
            region: "North".to_string(),
        }
    }

    #[test]
    fn ranks_follow_descending_scores_with_stable_ties() {
        let mut entries = vec![entry("a", 70), entry("b", 90), entry("c", 70), entry("d", 80)];
        assign_ranks(&mut entries);

        let order: Vec<(&str, u32)> = entries
            .iter()
            .map(|e| (e.user_id.as_str(), e.rank))
            .collect();
        assert_eq!(order, vec![("b", 1), ("d", 2), ("a", 3), ("c", 4)]);
    }

    #[test]
    fn summary_computes_gaps() {
        let entries = vec![entry("me", 80), entry("x", 95), entry("y", 85), entry("z", 60)];
        let ranking = summarize_target(&university(), "me", 120, entries, Utc::now());

        assert_eq!(ranking.my_rank, 3);
        assert_eq!(ranking.my_score, 80);
        assert_eq!(ranking.top_score, 95);
        assert_eq!(ranking.average_score, 80);
        assert_eq!(ranking.points_to_next, 6);
        assert_eq!(ranking.points_to_top10, 0);
        assert_eq!(ranking.points_to_top, 15);
        assert_eq!(ranking.total_participants, 120);
        assert_eq!(ranking.university_name, "Northern University");
    }

    #[test]
    fn leader_has_no_gap() {
        let entries = vec![entry("me", 99), entry("x", 60)];
        let ranking = summarize_target(&university(), "me", 50, entries, Utc::now());

        assert_eq!(ranking.my_rank, 1);
        assert_eq!(ranking.points_to_next, 0);
        assert_eq!(ranking.points_to_top, 0);
    }

    #[test]
    fn missing_user_gets_default_entry() {
        let entries = vec![entry("x", 90), entry("y", 60)];
        let ranking = summarize_target(&university(), "me", 50, entries, Utc::now());

        assert_eq!(ranking.my_score, DEFAULT_USER_SCORE);
        assert_eq!(ranking.my_rank, 2);
        assert_eq!(ranking.entries.len(), 3);
        assert_eq!(ranking.entries[1].nickname, CURRENT_USER_NICKNAME);
    }

    #[test]
    fn outside_top_ten_reports_distance_and_board_is_truncated() {
        let mut entries: Vec<RankingEntry> =
            (0..12).map(|i| entry(&format!("u{i}"), 99 - i)).collect();
        entries.push(entry("me", 60));
        let ranking = summarize_target(&university(), "me", 200, entries, Utc::now());

        assert_eq!(ranking.my_rank, 13);
        // tenth place scored 90
        assert_eq!(ranking.points_to_top10, 31);
        // twelfth place scored 88
        assert_eq!(ranking.points_to_next, 29);
        assert_eq!(ranking.entries.len(), BOARD_SIZE);
        assert!(ranking.entries.windows(2).all(|w| w[0].total_score >= w[1].total_score));
    }

    #[test]
    fn change_labels() {
        assert_eq!(format_score_change(3), "+3 pts");
        assert_eq!(format_score_change(-2), "-2 pts");
        assert_eq!(format_score_change(0), "±0 pts");
        assert_eq!(format_rank_change(4, Some(7)), "up 3");
        assert_eq!(format_rank_change(7, Some(4)), "down 3");
        assert_eq!(format_rank_change(4, Some(4)), "no change");
        assert_eq!(format_rank_change(4, None), "");
    }
}
