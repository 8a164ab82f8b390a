use crate::error::{Result, ShortUrlError};
use crate::shortener::Shortener;
use async_trait::async_trait;
use kurteyt_core::{
    Clock, PageRequest, PaginationCursor, PutCondition, RecordChanges, RedirectType, Repository,
    ShortId, ShortUrlCreate, ShortUrlRecord, ShortUrlUpdate, StorageError, SystemClock,
};
use kurteyt_generator::Generator;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Smallest page a listing may ask for.
pub const MIN_PAGE_LIMIT: u32 = 10;
/// Largest page a listing may ask for; also the default.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortUrlPage {
    pub records: Vec<ShortUrlRecord>,
    /// Opaque cursor for the next page, absent on the last one.
    pub next_cursor: Option<String>,
}

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository`, a `Generator` and a `Clock` to handle:
/// - URL and Open-Graph validation
/// - Record construction (id, TTL, creation time)
/// - Mapping store failures onto `ShortUrlError`
///
/// Note: a generated id that collides with a live record surfaces as
/// `CreateConditionFailed`. No collision retry is performed.
#[derive(Debug, Clone)]
pub struct ShortUrlService<R, G, C = SystemClock> {
    repository: Arc<R>,
    generator: Arc<G>,
    clock: Arc<C>,
}

impl<R: Repository, G: Generator> ShortUrlService<R, G, SystemClock> {
    /// Creates a service reading the wall clock.
    pub fn with_system_clock(repository: R, generator: G) -> Self {
        Self::new(repository, generator, SystemClock)
    }
}

impl<R: Repository, G: Generator, C: Clock> ShortUrlService<R, G, C> {
    pub fn new(repository: R, generator: G, clock: C) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            clock: Arc::new(clock),
        }
    }

    /// Validates that the URL is absolute, http(s), and has a host.
    fn validate_url(raw: &str) -> Result<()> {
        if raw.chars().any(char::is_whitespace) {
            return Err(ShortUrlError::InvalidUrl(format!(
                "URL cannot contain whitespace: {raw}"
            )));
        }

        let parsed =
            Url::parse(raw).map_err(|e| ShortUrlError::InvalidUrl(format!("{raw}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ShortUrlError::InvalidUrl(format!(
                "URL scheme must be http or https: {}",
                parsed.scheme()
            )));
        }
        if parsed.host().is_none() {
            return Err(ShortUrlError::InvalidUrl(format!("URL must have a host: {raw}")));
        }

        Ok(())
    }

    /// Open-Graph settings belong to `OG_HTML` records only.
    ///
    /// Settings without an explicit type select `OG_HTML`; settings on a
    /// `DIRECT` record are dropped.
    fn normalize_og(mut request: ShortUrlCreate) -> Result<ShortUrlCreate> {
        match (request.redirect_type, &request.og_settings) {
            (Some(RedirectType::OgHtml), None) => {
                return Err(ShortUrlError::InvalidRequest(
                    "OgSettings is required when RedirectType is OG_HTML".to_string(),
                ));
            }
            (None, Some(_)) => request.redirect_type = Some(RedirectType::OgHtml),
            (Some(RedirectType::Direct), Some(_)) => request.og_settings = None,
            _ => {}
        }
        Ok(request)
    }

    fn page_limit(requested: Option<u32>, cursor: Option<&PaginationCursor>) -> Result<u32> {
        let limit = requested
            .or_else(|| cursor.map(|c| c.limit))
            .unwrap_or(MAX_PAGE_LIMIT);

        if !(MIN_PAGE_LIMIT..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(ShortUrlError::InvalidRequest(format!(
                "limit must be between {MIN_PAGE_LIMIT} and {MAX_PAGE_LIMIT}, got {limit}"
            )));
        }
        Ok(limit)
    }

    async fn fetch(&self, id: &ShortId) -> Result<ShortUrlRecord> {
        self.repository
            .get(id)
            .await
            .map_err(|e| ShortUrlError::from_storage(e, ShortUrlError::GetFailed))?
            .ok_or_else(|| ShortUrlError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<R: Repository, G: Generator, C: Clock> Shortener for ShortUrlService<R, G, C> {
    async fn create(&self, request: ShortUrlCreate) -> Result<ShortUrlRecord> {
        Self::validate_url(&request.target_url)?;
        if request.num_days_until_expire < 1 {
            return Err(ShortUrlError::InvalidRequest(format!(
                "NumDaysUntilExpire must be at least 1, got {}",
                request.num_days_until_expire
            )));
        }
        let request = Self::normalize_og(request)?;

        let short_id: ShortId = self.generator.generate().into();
        let record = ShortUrlRecord::build(request, short_id, self.clock.now())?;

        match self.repository.put(&record, PutCondition::NotExists).await {
            Ok(()) => {}
            Err(StorageError::ConditionFailed(key)) => {
                warn!(short_id = %record.short_id, "generated id collides with a live record");
                return Err(ShortUrlError::CreateConditionFailed(key));
            }
            Err(err) => return Err(ShortUrlError::from_storage(err, ShortUrlError::CreateFailed)),
        }

        info!(
            short_id = %record.short_id,
            redirect_type = %record.redirect_type,
            "created short url"
        );
        Ok(record)
    }

    async fn get(&self, id: &ShortId) -> Result<ShortUrlRecord> {
        self.fetch(id).await
    }

    async fn delete(&self, id: &ShortId) -> Result<ShortUrlRecord> {
        let snapshot = self.fetch(id).await?;

        let removed = self
            .repository
            .delete(id)
            .await
            .map_err(|e| ShortUrlError::from_storage(e, ShortUrlError::DeleteFailed))?;
        if !removed {
            // deleted concurrently between the read and the delete
            return Err(ShortUrlError::NotFound(id.to_string()));
        }

        info!(short_id = %id, "deleted short url");
        Ok(snapshot)
    }

    async fn update(&self, id: &ShortId, update: ShortUrlUpdate) -> Result<ShortUrlRecord> {
        if let Some(target_url) = &update.target_url {
            Self::validate_url(target_url)?;
        }

        let current = self.fetch(id).await?;
        let redirect_type = update.redirect_type.unwrap_or(current.redirect_type);
        if redirect_type == RedirectType::OgHtml
            && update.og_settings.is_none()
            && current.og_settings.is_none()
        {
            return Err(ShortUrlError::InvalidRequest(
                "OgSettings is required when RedirectType is OG_HTML".to_string(),
            ));
        }

        let changes = RecordChanges::from_update(update, self.clock.now());
        let updated = match self.repository.update(id, changes).await {
            Ok(record) => record,
            Err(StorageError::ConditionFailed(_)) => {
                return Err(ShortUrlError::NotFound(id.to_string()));
            }
            Err(err) => return Err(ShortUrlError::from_storage(err, ShortUrlError::UpdateFailed)),
        };

        debug!(short_id = %id, "updated short url");
        Ok(updated)
    }

    async fn list(&self, limit: Option<u32>, cursor: Option<&str>) -> Result<ShortUrlPage> {
        let cursor = cursor.map(PaginationCursor::decode).transpose()?;
        let limit = Self::page_limit(limit, cursor.as_ref())?;
        let start_after = match &cursor {
            Some(cursor) => cursor.to_page_request()?.start_after,
            None => None,
        };

        let page = self
            .repository
            .scan(PageRequest { limit, start_after })
            .await
            .map_err(|e| ShortUrlError::from_storage(e, ShortUrlError::ScanFailed))?;

        let next_cursor = page
            .last_evaluated
            .map(|id| PaginationCursor::after(&id, limit).encode())
            .transpose()
            .map_err(|e| ShortUrlError::ConvertFailed(e.to_string()))?;

        Ok(ShortUrlPage {
            records: page.records,
            next_cursor,
        })
    }
}
