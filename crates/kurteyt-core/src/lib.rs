//! Core types and traits for the kurteyt URL shortener.
//!
//! This crate provides the record model and the store contract shared by
//! the shortener service and the edge redirector.

pub mod clock;
pub mod error;
pub mod pagination;
pub mod record;
pub mod repository;
pub mod short_id;
pub mod update;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, StorageError};
pub use pagination::{PaginationCursor, PARTITION_KEY};
pub use record::{
    OgSettings, RedirectType, ShortUrlCreate, ShortUrlRecord, ShortUrlUpdate,
    DEFAULT_NUM_DAYS_UNTIL_EXPIRE,
};
pub use repository::{
    Page, PageRequest, PutCondition, ReadRepository, RecordChanges, Repository,
};
pub use short_id::ShortId;
pub use update::UpdateExpression;
