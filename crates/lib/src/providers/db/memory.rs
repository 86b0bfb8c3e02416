use crate::{errors::InsightError, providers::db::storage::InsightStore, types::Insight};
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<String, (u64, Insight)>,
    next_seq: u64,
}

/// An in-process store. Clones share the same underlying map.
#[derive(Clone, Debug, Default)]
pub struct MemoryInsightStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryInsightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Newest first; insertion order breaks timestamp ties.
fn newest_first<'a>(records: impl Iterator<Item = &'a (u64, Insight)>) -> Vec<Insight> {
    let mut rows: Vec<&(u64, Insight)> = records.collect();
    rows.sort_by(|(seq_a, a), (seq_b, b)| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| seq_b.cmp(seq_a))
    });
    rows.into_iter().map(|(_, insight)| insight.clone()).collect()
}

#[async_trait]
impl InsightStore for MemoryInsightStore {
    fn name(&self) -> &str {
        "Memory"
    }

    async fn create(&self, insight: &Insight) -> Result<(), InsightError> {
        let mut inner = self.inner.write().await;
        if inner.records.contains_key(&insight.id) {
            return Err(InsightError::Storage(format!(
                "insight '{}' already exists",
                insight.id
            )));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .records
            .insert(insight.id.clone(), (seq, insight.clone()));
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Insight>, InsightError> {
        Ok(self
            .inner
            .read()
            .await
            .records
            .get(id)
            .map(|(_, insight)| insight.clone()))
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Insight>, InsightError> {
        let inner = self.inner.read().await;
        Ok(newest_first(
            inner
                .records
                .values()
                .filter(|(_, insight)| insight.user_id == user_id),
        ))
    }

    async fn find_all(&self) -> Result<Vec<Insight>, InsightError> {
        let inner = self.inner.read().await;
        Ok(newest_first(inner.records.values()))
    }

    async fn update(&self, insight: &Insight) -> Result<(), InsightError> {
        let mut inner = self.inner.write().await;
        match inner.records.get_mut(&insight.id) {
            Some((_, stored)) => {
                *stored = insight.clone();
                Ok(())
            }
            None => Err(InsightError::NotFound(format!(
                "Insight '{}' not found",
                insight.id
            ))),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, InsightError> {
        Ok(self.inner.write().await.records.remove(id).is_some())
    }
}
