use crate::error::Result;
use crate::service::ShortUrlPage;
use async_trait::async_trait;
use kurteyt_core::{ShortId, ShortUrlCreate, ShortUrlRecord, ShortUrlUpdate};

/// Management operations on short URLs, as seen by the HTTP layer.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Mints a new short id for the request and stores the record.
    async fn create(&self, request: ShortUrlCreate) -> Result<ShortUrlRecord>;

    /// Retrieves the live record for `id`.
    async fn get(&self, id: &ShortId) -> Result<ShortUrlRecord>;

    /// Deletes the record for `id`, returning it as it was before deletion.
    async fn delete(&self, id: &ShortId) -> Result<ShortUrlRecord>;

    /// Applies the set fields of `update` to the record for `id`.
    async fn update(&self, id: &ShortId, update: ShortUrlUpdate) -> Result<ShortUrlRecord>;

    /// Returns one page of records and a cursor for the next one.
    async fn list(&self, limit: Option<u32>, cursor: Option<&str>) -> Result<ShortUrlPage>;
}
