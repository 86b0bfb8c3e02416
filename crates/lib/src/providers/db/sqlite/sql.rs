//! # SQLite Specific SQL Queries
//!
//! This module centralizes SQL query strings for the SQLite insight store.
//! Each record is stored as a JSON document in `data`, with the columns used
//! for lookup and ordering kept alongside it.

pub const CREATE_INSIGHTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS insights (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL,
        data TEXT NOT NULL
    );
";

pub const CREATE_INSIGHTS_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_insights_user_id ON insights (user_id);";

/// All statements needed to initialize the schema, in order.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[CREATE_INSIGHTS_TABLE, CREATE_INSIGHTS_USER_INDEX];

pub const INSERT_INSIGHT: &str =
    "INSERT INTO insights (id, user_id, status, created_at, data) VALUES (?, ?, ?, ?, ?)";

pub const SELECT_INSIGHT_BY_ID: &str = "SELECT data FROM insights WHERE id = ?";

/// Newest first; insertion order breaks timestamp ties.
pub const SELECT_INSIGHTS_BY_USER: &str =
    "SELECT data FROM insights WHERE user_id = ? ORDER BY created_at DESC, rowid DESC";

pub const SELECT_ALL_INSIGHTS: &str =
    "SELECT data FROM insights ORDER BY created_at DESC, rowid DESC";

pub const UPDATE_INSIGHT: &str = "UPDATE insights SET status = ?, data = ? WHERE id = ?";

pub const DELETE_INSIGHT: &str = "DELETE FROM insights WHERE id = ?";
