use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use kurteyt_core::repository::Result;
use kurteyt_core::{
    Page, PageRequest, PutCondition, ReadRepository, RecordChanges, Repository, ShortId,
    ShortUrlRecord, StorageError,
};
use tracing::trace;

/// In-memory implementation of the Repository trait using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. Conditional writes go through the entry API,
/// which holds the shard lock for the whole check-and-insert.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: DashMap<ShortId, ShortUrlRecord>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, id: &ShortId) -> Result<Option<ShortUrlRecord>> {
        let now = Timestamp::now();

        if self
            .storage
            .remove_if(id, |_, record| record.is_expired(now))
            .is_some()
        {
            trace!(short_id = %id, "dropped expired record");
            return Ok(None);
        }

        Ok(self.storage.get(id).map(|entry| entry.value().clone()))
    }

    async fn scan(&self, request: PageRequest) -> Result<Page> {
        let now = Timestamp::now();
        let limit = request.limit as usize;

        let mut live: Vec<ShortUrlRecord> = self
            .storage
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .filter(|entry| {
                request
                    .start_after
                    .as_ref()
                    .is_none_or(|start| entry.key() > start)
            })
            .map(|entry| entry.value().clone())
            .collect();
        live.sort_by(|a, b| a.short_id.cmp(&b.short_id));

        let has_more = live.len() > limit;
        live.truncate(limit);
        let last_evaluated = if has_more {
            live.last().map(|record| record.short_id.clone())
        } else {
            None
        };

        Ok(Page {
            records: live,
            last_evaluated,
        })
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn put(&self, record: &ShortUrlRecord, condition: PutCondition) -> Result<()> {
        let now = Timestamp::now();

        match self.storage.entry(record.short_id.clone()) {
            Entry::Occupied(mut existing) => {
                // An expired entry does not count as existing.
                if condition == PutCondition::NotExists && !existing.get().is_expired(now) {
                    return Err(StorageError::ConditionFailed(record.short_id.to_string()));
                }
                existing.insert(record.clone());
            }
            Entry::Vacant(vacant) => {
                vacant.insert(record.clone());
            }
        }

        Ok(())
    }

    async fn update(&self, id: &ShortId, changes: RecordChanges) -> Result<ShortUrlRecord> {
        let now = Timestamp::now();

        match self.storage.get_mut(id) {
            Some(mut entry) if !entry.is_expired(now) => {
                changes.apply(entry.value_mut());
                Ok(entry.value().clone())
            }
            _ => Err(StorageError::ConditionFailed(id.to_string())),
        }
    }

    async fn delete(&self, id: &ShortId) -> Result<bool> {
        Ok(self.storage.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;
    use kurteyt_core::record::epoch_seconds;
    use kurteyt_core::{ShortUrlCreate, ShortUrlUpdate};
    use std::sync::Arc;

    fn id(s: &str) -> ShortId {
        ShortId::new_unchecked(s)
    }

    fn record(short_id: &str, url: &str) -> ShortUrlRecord {
        ShortUrlRecord::build(ShortUrlCreate::new(url), id(short_id), Timestamp::now()).unwrap()
    }

    fn expired(short_id: &str, url: &str) -> ShortUrlRecord {
        let mut record = record(short_id, url);
        record.ttl = epoch_seconds(Timestamp::now() - SignedDuration::from_secs(1));
        record
    }

    #[tokio::test]
    async fn put_and_get() {
        let repo = InMemoryRepository::new();
        let stored = record("abc12345", "https://example.com");

        repo.put(&stored, PutCondition::NotExists).await.unwrap();

        let result = repo.get(&id("abc12345")).await.unwrap().unwrap();
        assert_eq!(result, stored);
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let repo = InMemoryRepository::new();
        assert!(repo.get(&id("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn conditional_put_conflict() {
        let repo = InMemoryRepository::new();

        repo.put(&record("abc12345", "https://example.com"), PutCondition::NotExists)
            .await
            .unwrap();

        let err = repo
            .put(&record("abc12345", "https://other.com"), PutCondition::NotExists)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::ConditionFailed(_)));
        let kept = repo.get(&id("abc12345")).await.unwrap().unwrap();
        assert_eq!(kept.target_url, "https://example.com");
    }

    #[tokio::test]
    async fn unconditional_put_overwrites() {
        let repo = InMemoryRepository::new();

        repo.put(&record("abc12345", "https://example.com"), PutCondition::Always)
            .await
            .unwrap();
        repo.put(&record("abc12345", "https://other.com"), PutCondition::Always)
            .await
            .unwrap();

        let result = repo.get(&id("abc12345")).await.unwrap().unwrap();
        assert_eq!(result.target_url, "https://other.com");
    }

    #[tokio::test]
    async fn conditional_put_over_expired_entry() {
        let repo = InMemoryRepository::new();

        repo.put(&expired("abc12345", "https://old.com"), PutCondition::Always)
            .await
            .unwrap();

        // Should succeed because the existing entry is expired.
        repo.put(&record("abc12345", "https://new.com"), PutCondition::NotExists)
            .await
            .unwrap();

        let result = repo.get(&id("abc12345")).await.unwrap().unwrap();
        assert_eq!(result.target_url, "https://new.com");
    }

    #[tokio::test]
    async fn expired_entry_returns_none() {
        let repo = InMemoryRepository::new();

        repo.put(&expired("abc12345", "https://example.com"), PutCondition::Always)
            .await
            .unwrap();

        assert!(repo.get(&id("abc12345")).await.unwrap().is_none());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn update_existing() {
        let repo = InMemoryRepository::new();
        let stored = record("abc12345", "https://example.com");
        repo.put(&stored, PutCondition::NotExists).await.unwrap();

        let now = Timestamp::now();
        let changes = RecordChanges::from_update(
            ShortUrlUpdate {
                target_url: Some("https://changed.example".to_string()),
                ..Default::default()
            },
            now,
        );
        let updated = repo.update(&id("abc12345"), changes).await.unwrap();

        assert_eq!(updated.target_url, "https://changed.example");
        assert_eq!(updated.updated_at, Some(now));
        assert_eq!(updated.ttl, stored.ttl);
        assert_eq!(repo.get(&id("abc12345")).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn update_missing_fails() {
        let repo = InMemoryRepository::new();
        let changes = RecordChanges::from_update(ShortUrlUpdate::default(), Timestamp::now());

        let err = repo.update(&id("nope"), changes).await.unwrap_err();
        assert!(matches!(err, StorageError::ConditionFailed(_)));
    }

    #[tokio::test]
    async fn delete_existing() {
        let repo = InMemoryRepository::new();

        repo.put(&record("abc12345", "https://example.com"), PutCondition::NotExists)
            .await
            .unwrap();

        assert!(repo.delete(&id("abc12345")).await.unwrap());
        assert!(repo.get(&id("abc12345")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_nonexistent() {
        let repo = InMemoryRepository::new();
        assert!(!repo.delete(&id("nope")).await.unwrap());
    }

    #[tokio::test]
    async fn scan_pages_in_id_order() {
        let repo = InMemoryRepository::new();
        for short_id in ["ccc", "aaa", "eee", "bbb", "ddd"] {
            repo.put(&record(short_id, "https://example.com"), PutCondition::NotExists)
                .await
                .unwrap();
        }
        repo.put(&expired("abb", "https://example.com"), PutCondition::Always)
            .await
            .unwrap();

        let first = repo
            .scan(PageRequest {
                limit: 2,
                start_after: None,
            })
            .await
            .unwrap();
        let ids: Vec<&str> = first.records.iter().map(|r| r.short_id.as_str()).collect();
        assert_eq!(ids, ["aaa", "bbb"]);
        assert_eq!(first.last_evaluated, Some(id("bbb")));

        let second = repo
            .scan(PageRequest {
                limit: 3,
                start_after: first.last_evaluated,
            })
            .await
            .unwrap();
        let ids: Vec<&str> = second.records.iter().map(|r| r.short_id.as_str()).collect();
        assert_eq!(ids, ["ccc", "ddd", "eee"]);
        assert_eq!(second.last_evaluated, None);
    }

    #[tokio::test]
    async fn concurrent_conditional_puts_have_one_winner() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = vec![];

        for i in 0..10u64 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                let r = record("samekey1", &format!("https://example{i}.com"));
                repo.put(&r, PutCondition::NotExists).await
            }));
        }

        let mut wins = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => wins += 1,
                Err(StorageError::ConditionFailed(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(conflicts, 9);
        assert_eq!(repo.len(), 1);
    }
}
