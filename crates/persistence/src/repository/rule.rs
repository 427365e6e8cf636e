//! Leaderboard rule repository — named ranking rules per competition

use crate::DbResult;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// A persisted leaderboard rule
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaderboardRuleRecord {
    pub id: i64,
    pub competition_id: i64,
    pub name: String,
    /// Canonical ranking expression, e.g. "score desc, submitted_at asc"
    pub ranking: String,
}

/// Repository for leaderboard rules
pub struct RuleRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RuleRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Attach a rule to a competition, returning its id
    pub async fn create(&self, competition_id: i64, name: &str, ranking: &str) -> DbResult<i64> {
        let result = sqlx::query(
            "INSERT INTO leaderboard_rules (competition_id, name, ranking) VALUES (?1, ?2, ?3)",
        )
        .bind(competition_id)
        .bind(name)
        .bind(ranking)
        .execute(self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<LeaderboardRuleRecord>> {
        let record = sqlx::query_as::<_, LeaderboardRuleRecord>(
            "SELECT id, competition_id, name, ranking FROM leaderboard_rules WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Rules of one competition, oldest first
    pub async fn list_for_competition(
        &self,
        competition_id: i64,
    ) -> DbResult<Vec<LeaderboardRuleRecord>> {
        let records = sqlx::query_as::<_, LeaderboardRuleRecord>(
            r#"SELECT id, competition_id, name, ranking
               FROM leaderboard_rules
               WHERE competition_id = ?1
               ORDER BY id ASC"#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// Update a rule's name and ranking. Returns false if the rule does not exist.
    pub async fn update(&self, id: i64, name: &str, ranking: &str) -> DbResult<bool> {
        let result =
            sqlx::query("UPDATE leaderboard_rules SET name = ?1, ranking = ?2 WHERE id = ?3")
                .bind(name)
                .bind(ranking)
                .bind(id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a rule. Returns false if the rule does not exist.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM leaderboard_rules WHERE id = ?1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
