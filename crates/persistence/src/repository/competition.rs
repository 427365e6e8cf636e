//! Competition repository

use crate::DbResult;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// A persisted competition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompetitionRecord {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    /// YYYY-MM-DD
    pub start_date: String,
    /// YYYY-MM-DD
    pub end_date: String,
    /// 'time' or 'count'
    pub score_format: String,
    pub created_at: Option<i64>,
}

/// Fields captured when creating a competition
#[derive(Debug, Clone)]
pub struct NewCompetition {
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
    pub score_format: String,
}

/// Repository for competitions
pub struct CompetitionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CompetitionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a competition, returning its id
    pub async fn create(&self, competition: &NewCompetition) -> DbResult<i64> {
        let result = sqlx::query(
            r#"INSERT INTO competitions
                (title, description, status, start_date, end_date, score_format)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&competition.title)
        .bind(&competition.description)
        .bind(&competition.status)
        .bind(&competition.start_date)
        .bind(&competition.end_date)
        .bind(&competition.score_format)
        .execute(self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get a competition by id
    pub async fn get(&self, id: i64) -> DbResult<Option<CompetitionRecord>> {
        let record = sqlx::query_as::<_, CompetitionRecord>(
            r#"SELECT id, title, description, status, start_date, end_date,
                      score_format, created_at
               FROM competitions
               WHERE id = ?1"#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// List all competitions, newest first
    pub async fn list(&self) -> DbResult<Vec<CompetitionRecord>> {
        let records = sqlx::query_as::<_, CompetitionRecord>(
            r#"SELECT id, title, description, status, start_date, end_date,
                      score_format, created_at
               FROM competitions
               ORDER BY id DESC"#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_competition as sample;
    use crate::Database;

    #[tokio::test]
    async fn test_create_and_get() {
        let db = Database::in_memory().await.unwrap();
        let repo = CompetitionRepository::new(db.pool());

        let mut new = sample("Spring 5k", "time");
        new.description = Some("Around the lake".to_string());
        let id = repo.create(&new).await.unwrap();

        let record = repo.get(id).await.unwrap().unwrap();
        assert_eq!(record.title, "Spring 5k");
        assert_eq!(record.description.as_deref(), Some("Around the lake"));
        assert_eq!(record.status, "ongoing");
        assert_eq!(record.start_date, "2024-05-01");
        assert_eq!(record.score_format, "time");
        assert!(record.created_at.is_some());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = Database::in_memory().await.unwrap();
        let repo = CompetitionRepository::new(db.pool());
        assert!(repo.get(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = Database::in_memory().await.unwrap();
        let repo = CompetitionRepository::new(db.pool());

        repo.create(&sample("first", "time")).await.unwrap();
        repo.create(&sample("second", "count")).await.unwrap();

        let titles: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_unknown_score_format_rejected_by_schema() {
        let db = Database::in_memory().await.unwrap();
        let repo = CompetitionRepository::new(db.pool());
        assert!(repo.create(&sample("bad", "points")).await.is_err());
    }
}
