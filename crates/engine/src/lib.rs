//! Competition Board Engine — score normalization and leaderboard ranking
//!
//! Provides:
//! - Score format handling and duration → seconds normalization
//! - Closed ranking expressions for leaderboard rules
//! - Leaderboard assembly with shared ranks for ties

pub mod leaderboard;
pub mod ranking;
pub mod score;
pub mod types;

// Re-exports for convenience
pub use leaderboard::{build_leaderboard, rank_submissions, Leaderboard, LeaderboardEntry};
pub use ranking::{RankingParseError, RankingSpec, SortDirection, TieBreak, TieBreakField};
pub use score::{format_score, ScoreInput, ScoreInputError};
pub use types::*;
