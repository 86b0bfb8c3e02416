use crate::{errors::InsightError, providers::db::storage::InsightStore, types::Insight};
use async_trait::async_trait;
use chrono::SecondsFormat;
use std::fmt::{self, Debug};
use tracing::debug;
use turso::{params, Database};

pub mod sql;

/// An insight store backed by a local SQLite database using Turso.
///
/// When cloned, it shares the same underlying database, allowing concurrent
/// access to the same database file or in-memory instance.
#[derive(Clone)]
pub struct SqliteInsightStore {
    /// The Turso database instance. It's cloneable and thread-safe.
    db: Database,
}

impl SqliteInsightStore {
    /// Opens (or creates) the database at `db_path` and ensures the schema exists.
    ///
    /// Use ":memory:" for an isolated in-memory database; clone the store to
    /// share it.
    pub async fn new(db_path: &str) -> Result<Self, InsightError> {
        let db = turso::Builder::new_local(db_path).build().await?;

        // Use `query` for PRAGMA statements that return a value to avoid "unexpected row" errors.
        let conn = db.connect()?;
        conn.query("PRAGMA journal_mode=WAL;", ()).await?;

        let store = Self { db };
        store.initialize_schema().await?;
        Ok(store)
    }

    /// Ensures that the insights table and its indexes exist. Idempotent.
    pub async fn initialize_schema(&self) -> Result<(), InsightError> {
        let conn = self.db.connect()?;
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ()).await?;
        }
        Ok(())
    }

    async fn query_insights(
        &self,
        query: &str,
        user_id: Option<&str>,
    ) -> Result<Vec<Insight>, InsightError> {
        let conn = self.db.connect()?;
        let mut rows = match user_id {
            Some(user_id) => conn.query(query, params![user_id]).await?,
            None => conn.query(query, ()).await?,
        };

        let mut insights = Vec::new();
        while let Some(row) = rows.next().await? {
            let data: String = row.get(0)?;
            insights.push(serde_json::from_str(&data)?);
        }
        Ok(insights)
    }
}

impl Debug for SqliteInsightStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteInsightStore").finish_non_exhaustive()
    }
}

/// Fixed-width timestamps so that text ordering matches time ordering.
fn sortable_timestamp(insight: &Insight) -> String {
    insight
        .created_at
        .to_rfc3339_opts(SecondsFormat::Nanos, true)
}

#[async_trait]
impl InsightStore for SqliteInsightStore {
    fn name(&self) -> &str {
        "SQLite"
    }

    async fn create(&self, insight: &Insight) -> Result<(), InsightError> {
        debug!(insight_id = %insight.id, "--> Inserting insight");
        let data = serde_json::to_string(insight)?;
        let conn = self.db.connect()?;
        conn.execute(
            sql::INSERT_INSIGHT,
            params![
                insight.id.clone(),
                insight.user_id.clone(),
                insight.status.as_str(),
                sortable_timestamp(insight),
                data
            ],
        )
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Insight>, InsightError> {
        let conn = self.db.connect()?;
        let mut rows = conn.query(sql::SELECT_INSIGHT_BY_ID, params![id]).await?;
        match rows.next().await? {
            Some(row) => {
                let data: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => Ok(None),
        }
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Insight>, InsightError> {
        self.query_insights(sql::SELECT_INSIGHTS_BY_USER, Some(user_id))
            .await
    }

    async fn find_all(&self) -> Result<Vec<Insight>, InsightError> {
        self.query_insights(sql::SELECT_ALL_INSIGHTS, None).await
    }

    async fn update(&self, insight: &Insight) -> Result<(), InsightError> {
        debug!(insight_id = %insight.id, status = insight.status.as_str(), "--> Updating insight");
        let data = serde_json::to_string(insight)?;
        let conn = self.db.connect()?;
        let changed = conn
            .execute(
                sql::UPDATE_INSIGHT,
                params![insight.status.as_str(), data, insight.id.clone()],
            )
            .await?;
        if changed == 0 {
            return Err(InsightError::NotFound(format!(
                "Insight '{}' not found",
                insight.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, InsightError> {
        let conn = self.db.connect()?;
        let changed = conn.execute(sql::DELETE_INSIGHT, params![id]).await?;
        Ok(changed > 0)
    }
}
