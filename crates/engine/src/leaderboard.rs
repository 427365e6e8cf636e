//! Leaderboard assembly — turns a competition's submissions into display rows
//!
//! Without a rule the rows keep creation order and carry no rank. With a rule
//! the rows are sorted by its `RankingSpec` and ranked "1224"-style: rows that
//! compare equal on every ordered field share a rank and the next rank skips.

use crate::ranking::{RankingSpec, SortDirection, TieBreakField};
use crate::score::format_score;
use crate::types::ScoreFormat;
use persistence::repository::SubmissionRecord;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::warn;

/// One leaderboard row
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based rank, only set when a rule was applied
    pub rank: Option<usize>,
    pub submission_id: i64,
    pub participant_name: String,
    pub score: i64,
    pub display_score: String,
    pub submitted_at: Option<i64>,
}

/// A rendered leaderboard for one competition
#[derive(Debug, Clone, Serialize)]
pub struct Leaderboard {
    pub competition_id: i64,
    pub score_format: ScoreFormat,
    /// Canonical expression of the applied rule, if any
    pub ranking: Option<String>,
    pub entries: Vec<LeaderboardEntry>,
}

fn compare_direction(ord: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

/// Compare two submissions under a ranking spec, ignoring the final id fallback
fn compare_ranked(a: &SubmissionRecord, b: &SubmissionRecord, spec: &RankingSpec) -> Ordering {
    let primary = compare_direction(a.score.cmp(&b.score), spec.score);
    if primary != Ordering::Equal {
        return primary;
    }
    match &spec.tie_break {
        Some(tb) => {
            let ord = match tb.field {
                TieBreakField::SubmittedAt => a.created_at.cmp(&b.created_at),
                TieBreakField::ParticipantName => a.participant_name.cmp(&b.participant_name),
                TieBreakField::Id => a.id.cmp(&b.id),
            };
            compare_direction(ord, tb.direction)
        }
        None => Ordering::Equal,
    }
}

/// Order submissions under `spec`; rows that compare equal keep id order.
pub fn rank_submissions(submissions: &mut [SubmissionRecord], spec: &RankingSpec) {
    submissions.sort_by(|a, b| compare_ranked(a, b, spec).then_with(|| a.id.cmp(&b.id)));
}

/// Build the leaderboard for a competition.
///
/// `submissions` must all belong to `competition_id`; rows from other
/// competitions are dropped with a warning.
pub fn build_leaderboard(
    competition_id: i64,
    format: ScoreFormat,
    mut submissions: Vec<SubmissionRecord>,
    spec: Option<&RankingSpec>,
) -> Leaderboard {
    let before = submissions.len();
    submissions.retain(|s| s.competition_id == competition_id);
    if submissions.len() != before {
        warn!(
            competition_id,
            dropped = before - submissions.len(),
            "Ignoring submissions from other competitions"
        );
    }

    let mut ranks: Vec<Option<usize>> = vec![None; submissions.len()];
    if let Some(spec) = spec {
        rank_submissions(&mut submissions, spec);
        for i in 0..submissions.len() {
            let rank = if i > 0
                && compare_ranked(&submissions[i - 1], &submissions[i], spec) == Ordering::Equal
            {
                ranks[i - 1]
            } else {
                Some(i + 1)
            };
            ranks[i] = rank;
        }
    } else {
        submissions.sort_by_key(|s| s.id);
    }

    let entries = submissions
        .into_iter()
        .zip(ranks)
        .map(|(s, rank)| {
            // Display with the format recorded on the submission; it can drift
            // from the competition's if the competition was edited out-of-band.
            let entry_format = s.score_format.parse().unwrap_or(format);
            LeaderboardEntry {
                rank,
                submission_id: s.id,
                display_score: format_score(entry_format, s.score),
                participant_name: s.participant_name,
                score: s.score,
                submitted_at: s.created_at,
            }
        })
        .collect();

    Leaderboard {
        competition_id,
        score_format: format,
        ranking: spec.map(|s| s.to_string()),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(id: i64, name: &str, score: i64, created_at: i64) -> SubmissionRecord {
        SubmissionRecord {
            id,
            participant_name: name.to_string(),
            score,
            score_format: "time".to_string(),
            competition_id: 1,
            created_at: Some(created_at),
        }
    }

    fn names(board: &Leaderboard) -> Vec<&str> {
        board
            .entries
            .iter()
            .map(|e| e.participant_name.as_str())
            .collect()
    }

    fn ranks(board: &Leaderboard) -> Vec<Option<usize>> {
        board.entries.iter().map(|e| e.rank).collect()
    }

    #[test]
    fn test_no_rule_keeps_creation_order() {
        let subs = vec![sub(2, "bob", 50, 200), sub(1, "alice", 90, 100)];
        let board = build_leaderboard(1, ScoreFormat::Time, subs, None);
        assert_eq!(names(&board), vec!["alice", "bob"]);
        assert_eq!(ranks(&board), vec![None, None]);
        assert_eq!(board.ranking, None);
    }

    #[test]
    fn test_ascending_with_shared_rank() {
        let subs = vec![
            sub(1, "alice", 300, 100),
            sub(2, "bob", 200, 110),
            sub(3, "carol", 300, 120),
            sub(4, "dave", 400, 130),
        ];
        let spec: RankingSpec = "score asc".parse().unwrap();
        let board = build_leaderboard(1, ScoreFormat::Time, subs, Some(&spec));
        assert_eq!(names(&board), vec!["bob", "alice", "carol", "dave"]);
        assert_eq!(ranks(&board), vec![Some(1), Some(2), Some(2), Some(4)]);
        assert_eq!(board.ranking.as_deref(), Some("score asc"));
    }

    #[test]
    fn test_descending_with_name_tie_break() {
        let subs = vec![
            sub(1, "zoe", 10, 100),
            sub(2, "adam", 10, 110),
            sub(3, "mia", 20, 120),
        ];
        let spec: RankingSpec = "score desc, participant_name asc".parse().unwrap();
        let board = build_leaderboard(1, ScoreFormat::Count, subs, Some(&spec));
        assert_eq!(names(&board), vec!["mia", "adam", "zoe"]);
        assert_eq!(ranks(&board), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_submitted_at_tie_break_descending() {
        let subs = vec![sub(1, "early", 60, 100), sub(2, "late", 60, 200)];
        let spec: RankingSpec = "score asc, submitted_at desc".parse().unwrap();
        let board = build_leaderboard(1, ScoreFormat::Time, subs, Some(&spec));
        assert_eq!(names(&board), vec!["late", "early"]);
        assert_eq!(ranks(&board), vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_drops_foreign_submissions() {
        let mut foreign = sub(9, "intruder", 1, 100);
        foreign.competition_id = 2;
        let subs = vec![sub(1, "alice", 60, 100), foreign];
        let board = build_leaderboard(1, ScoreFormat::Time, subs, None);
        assert_eq!(names(&board), vec!["alice"]);
    }

    #[test]
    fn test_display_uses_submission_format() {
        let mut counted = sub(2, "bob", 3723, 100);
        counted.score_format = "count".to_string();
        let subs = vec![sub(1, "alice", 3723, 100), counted];
        let board = build_leaderboard(1, ScoreFormat::Time, subs, None);
        assert_eq!(board.entries[0].display_score, "1:02:03");
        assert_eq!(board.entries[1].display_score, "3723");
    }

    #[test]
    fn test_serializes_to_json() {
        let board = build_leaderboard(1, ScoreFormat::Time, vec![sub(1, "alice", 5, 1)], None);
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["score_format"], "time");
        assert_eq!(json["entries"][0]["display_score"], "0:00:05");
    }
}
