use crate::error::StorageError;
use crate::record::{OgSettings, RedirectType, ShortUrlRecord, ShortUrlUpdate};
use crate::short_id::ShortId;
use async_trait::async_trait;
use jiff::Timestamp;
use std::sync::Arc;

/// Type alias for repository results.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Precondition attached to a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PutCondition {
    /// Overwrite whatever is stored under the key.
    #[default]
    Always,
    /// Only write if no live record exists under the key.
    NotExists,
}

/// The fields an update may touch.
///
/// `ShortId`, `CreatedAt` and `TTL` are deliberately absent: they are fixed
/// at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordChanges {
    pub target_url: Option<String>,
    pub redirect_type: Option<RedirectType>,
    pub og_settings: Option<OgSettings>,
    pub updated_at: Timestamp,
}

impl RecordChanges {
    pub fn from_update(update: ShortUrlUpdate, updated_at: Timestamp) -> Self {
        Self {
            target_url: update.target_url,
            redirect_type: update.redirect_type,
            og_settings: update.og_settings,
            updated_at,
        }
    }

    /// Applies the changes to an in-memory copy of a record.
    pub fn apply(&self, record: &mut ShortUrlRecord) {
        if let Some(target_url) = &self.target_url {
            record.target_url = target_url.clone();
        }
        if let Some(redirect_type) = self.redirect_type {
            record.redirect_type = redirect_type;
        }
        if let Some(og_settings) = &self.og_settings {
            record.og_settings = Some(og_settings.clone());
        }
        record.updated_at = Some(self.updated_at);
    }
}

/// One page of a scan request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    /// Exclusive start key; `None` starts from the beginning.
    pub start_after: Option<ShortId>,
}

/// One page of records. Ordered by short id on backends that keep keys sorted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub records: Vec<ShortUrlRecord>,
    /// The last key of this page when more records may follow.
    pub last_evaluated: Option<ShortId>,
}

/// A read-only view of a record store.
///
/// The edge resolver only ever holds this view.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the live record for a given short id.
    /// Returns `None` if the id does not exist or the record has expired.
    async fn get(&self, id: &ShortId) -> Result<Option<ShortUrlRecord>>;

    /// Returns up to `request.limit` live records following `request.start_after`.
    async fn scan(&self, request: PageRequest) -> Result<Page>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Writes a record. With [`PutCondition::NotExists`] this returns
    /// `Err(ConditionFailed)` if a live record already exists under the id.
    async fn put(&self, record: &ShortUrlRecord, condition: PutCondition) -> Result<()>;

    /// Applies `changes` to the stored record and returns the new version.
    /// Returns `Err(ConditionFailed)` if there is no record to update.
    async fn update(&self, id: &ShortId, changes: RecordChanges) -> Result<ShortUrlRecord>;

    /// Deletes the record for a given short id.
    /// Returns `true` if the record existed and was removed.
    async fn delete(&self, id: &ShortId) -> Result<bool>;
}

#[async_trait]
impl<T: ReadRepository + ?Sized> ReadRepository for Arc<T> {
    async fn get(&self, id: &ShortId) -> Result<Option<ShortUrlRecord>> {
        (**self).get(id).await
    }

    async fn scan(&self, request: PageRequest) -> Result<Page> {
        (**self).scan(request).await
    }
}

#[async_trait]
impl<T: Repository + ?Sized> Repository for Arc<T> {
    async fn put(&self, record: &ShortUrlRecord, condition: PutCondition) -> Result<()> {
        (**self).put(record, condition).await
    }

    async fn update(&self, id: &ShortId, changes: RecordChanges) -> Result<ShortUrlRecord> {
        (**self).update(id, changes).await
    }

    async fn delete(&self, id: &ShortId) -> Result<bool> {
        (**self).delete(id).await
    }
}
