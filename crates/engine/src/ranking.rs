//! Ranking expressions for leaderboard rules
//!
//! A rule orders submissions by score and optionally breaks ties on a second
//! field. Rules are written as a short expression:
//!
//! ```text
//! score <asc|desc> [, <submitted_at|participant_name|id> [asc|desc]]
//! ```
//!
//! Only this closed set is accepted; anything else is a parse error, so a
//! stored rule can never carry arbitrary query text.

use crate::types::ScoreFormat;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    fn parse(token: &str) -> Result<Self, RankingParseError> {
        match token {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            other => Err(RankingParseError::UnknownDirection(other.to_string())),
        }
    }
}

/// Secondary field used when two submissions have the same score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakField {
    SubmittedAt,
    ParticipantName,
    Id,
}

impl TieBreakField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubmittedAt => "submitted_at",
            Self::ParticipantName => "participant_name",
            Self::Id => "id",
        }
    }

    fn parse(token: &str) -> Result<Self, RankingParseError> {
        match token {
            "submitted_at" | "created_at" => Ok(Self::SubmittedAt),
            "participant_name" | "name" => Ok(Self::ParticipantName),
            "id" => Ok(Self::Id),
            other => Err(RankingParseError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieBreak {
    pub field: TieBreakField,
    pub direction: SortDirection,
}

/// A parsed ranking rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingSpec {
    pub score: SortDirection,
    pub tie_break: Option<TieBreak>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankingParseError {
    #[error("ranking expression is empty")]
    Empty,

    #[error("ranking must start with 'score', found '{0}'")]
    PrimaryNotScore(String),

    #[error("unknown tie-break field '{0}' (expected submitted_at, participant_name or id)")]
    UnknownField(String),

    #[error("unknown sort direction '{0}' (expected asc or desc)")]
    UnknownDirection(String),

    #[error("unexpected '{0}' in ranking expression")]
    Unexpected(String),

    #[error("at most one tie-break is supported")]
    TooManyTerms,
}

impl RankingSpec {
    /// The natural order for a score format: fastest time first, highest count first
    pub fn default_for(format: ScoreFormat) -> Self {
        let score = match format {
            ScoreFormat::Time => SortDirection::Asc,
            ScoreFormat::Count => SortDirection::Desc,
        };
        Self {
            score,
            tie_break: Some(TieBreak {
                field: TieBreakField::SubmittedAt,
                direction: SortDirection::Asc,
            }),
        }
    }
}

/// Split a term into its name and the remaining tokens
fn split_term(term: &str) -> Result<(&str, Vec<&str>), RankingParseError> {
    let mut tokens = term.split_whitespace();
    let name = tokens.next().ok_or(RankingParseError::Empty)?;
    Ok((name, tokens.collect()))
}

/// Parse the optional direction following a term name
fn parse_direction(rest: &[&str]) -> Result<SortDirection, RankingParseError> {
    match rest {
        [] => Ok(SortDirection::default()),
        [direction] => SortDirection::parse(direction),
        [_, extra, ..] => Err(RankingParseError::Unexpected(extra.to_string())),
    }
}

impl FromStr for RankingSpec {
    type Err = RankingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(RankingParseError::Empty);
        }

        let terms: Vec<&str> = normalized.split(',').collect();
        if terms.len() > 2 {
            return Err(RankingParseError::TooManyTerms);
        }

        let (primary, rest) = split_term(terms[0])?;
        if primary != "score" {
            return Err(RankingParseError::PrimaryNotScore(primary.to_string()));
        }
        let score = parse_direction(&rest)?;

        let tie_break = match terms.get(1) {
            Some(term) => {
                let (field, rest) = split_term(term)?;
                let field = TieBreakField::parse(field)?;
                Some(TieBreak {
                    field,
                    direction: parse_direction(&rest)?,
                })
            }
            None => None,
        };

        Ok(Self { score, tie_break })
    }
}

/// Canonical text form; this is what gets stored
impl std::fmt::Display for RankingSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "score {}", self.score.as_str())?;
        if let Some(tb) = &self.tie_break {
            write!(f, ", {} {}", tb.field.as_str(), tb.direction.as_str())?;
        }
        Ok(())
    }
}
