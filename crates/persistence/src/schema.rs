//! Database schema definitions

/// SQL to create all tables
/// NOTE: Dates are stored as TEXT (YYYY-MM-DD), timestamps as unix seconds
pub const CREATE_TABLES: &str = r#"
-- Competitions
CREATE TABLE IF NOT EXISTS competitions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'ongoing',
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    score_format TEXT NOT NULL CHECK (score_format IN ('time', 'count')),
    created_at INTEGER DEFAULT (strftime('%s', 'now'))
);

-- Submissions (score is seconds for 'time', raw count for 'count')
CREATE TABLE IF NOT EXISTS submissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    participant_name TEXT NOT NULL,
    score INTEGER NOT NULL,
    score_format TEXT NOT NULL CHECK (score_format IN ('time', 'count')),
    competition_id INTEGER NOT NULL REFERENCES competitions(id),
    created_at INTEGER DEFAULT (strftime('%s', 'now'))
);

-- Named ranking rules attached to a competition
CREATE TABLE IF NOT EXISTS leaderboard_rules (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    competition_id INTEGER NOT NULL REFERENCES competitions(id),
    name TEXT NOT NULL,
    ranking TEXT NOT NULL
);

-- ========== INDEXES ==========

CREATE INDEX IF NOT EXISTS idx_submissions_competition ON submissions(competition_id);
CREATE INDEX IF NOT EXISTS idx_rules_competition ON leaderboard_rules(competition_id)
"#;

