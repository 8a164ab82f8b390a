//! Short URL management service.
//!
//! This crate turns creation requests into stored records and maps store
//! failures onto the service error taxonomy. Core types are re-exported
//! from `kurteyt_core`.

pub mod error;
pub mod service;
pub mod shortener;

pub use error::ShortUrlError;
pub use service::{ShortUrlPage, ShortUrlService};
pub use shortener::Shortener;
