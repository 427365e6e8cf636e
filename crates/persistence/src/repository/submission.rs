//! Submission repository — recorded scores per competition

use crate::DbResult;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// A persisted submission
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubmissionRecord {
    pub id: i64,
    pub participant_name: String,
    /// Seconds for time-based competitions, raw count otherwise
    pub score: i64,
    /// Copy of the competition's score format at submission time
    pub score_format: String,
    pub competition_id: i64,
    pub created_at: Option<i64>,
}

/// Fields captured when recording a submission
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub competition_id: i64,
    pub participant_name: String,
    pub score: i64,
    pub score_format: String,
}

/// Repository for submissions
pub struct SubmissionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SubmissionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a submission, returning its id
    pub async fn create(&self, submission: &NewSubmission) -> DbResult<i64> {
        let result = sqlx::query(
            r#"INSERT INTO submissions
                (participant_name, score, score_format, competition_id)
               VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&submission.participant_name)
        .bind(submission.score)
        .bind(&submission.score_format)
        .bind(submission.competition_id)
        .execute(self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// All submissions of one competition, in creation order
    pub async fn list_for_competition(&self, competition_id: i64) -> DbResult<Vec<SubmissionRecord>> {
        let records = sqlx::query_as::<_, SubmissionRecord>(
            r#"SELECT id, participant_name, score, score_format, competition_id, created_at
               FROM submissions
               WHERE competition_id = ?1
               ORDER BY id ASC"#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// Number of submissions recorded for a competition
    pub async fn count_for_competition(&self, competition_id: i64) -> DbResult<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM submissions WHERE competition_id = ?1")
                .bind(competition_id)
                .fetch_one(self.pool)
                .await?;

        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::CompetitionRepository;
    use crate::test_support::sample_competition;
    use crate::Database;

    fn entry(competition_id: i64, name: &str, score: i64) -> NewSubmission {
        NewSubmission {
            competition_id,
            participant_name: name.to_string(),
            score,
            score_format: "count".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_only_returns_own_competition() {
        let db = Database::in_memory().await.unwrap();
        let competitions = CompetitionRepository::new(db.pool());
        let a = competitions.create(&sample_competition("a", "count")).await.unwrap();
        let b = competitions.create(&sample_competition("b", "count")).await.unwrap();

        let repo = SubmissionRepository::new(db.pool());
        repo.create(&entry(a, "alice", 10)).await.unwrap();
        repo.create(&entry(b, "bob", 20)).await.unwrap();
        repo.create(&entry(a, "carol", 30)).await.unwrap();

        let listed = repo.list_for_competition(a).await.unwrap();
        let names: Vec<&str> = listed.iter().map(|s| s.participant_name.as_str()).collect();
        assert_eq!(names, vec!["alice", "carol"]);
        assert!(listed.iter().all(|s| s.competition_id == a));

        assert_eq!(repo.count_for_competition(a).await.unwrap(), 2);
        assert_eq!(repo.count_for_competition(b).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_negative_score_is_stored_as_is() {
        let db = Database::in_memory().await.unwrap();
        let competition = CompetitionRepository::new(db.pool())
            .create(&sample_competition("a", "count"))
            .await
            .unwrap();

        let repo = SubmissionRepository::new(db.pool());
        repo.create(&entry(competition, "dave", -5)).await.unwrap();

        let listed = repo.list_for_competition(competition).await.unwrap();
        assert_eq!(listed[0].score, -5);
        assert_eq!(listed[0].score_format, "count");
    }

    #[tokio::test]
    async fn test_foreign_key_enforced() {
        let db = Database::in_memory().await.unwrap();
        let repo = SubmissionRepository::new(db.pool());
        assert!(repo.create(&entry(42, "ghost", 1)).await.is_err());
    }
}
