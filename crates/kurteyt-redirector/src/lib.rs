//! Edge redirect resolution.
//!
//! This crate provides a [`Resolver`] that decides, for one inbound request,
//! whether to let it through to the API, answer with an HTTP redirect, or
//! answer with an Open-Graph interstitial page. It reads the record store
//! directly through [`kurteyt_core::ReadRepository`] and holds no state
//! between requests.
//!
//! # Example
//!
//! ```rust
//! use kurteyt_redirector::{Resolution, Resolver, ResolverConfig};
//! use kurteyt_storage::InMemoryRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ResolverConfig::builder()
//!     .expired_redirect_url("https://example.com/expired")
//!     .build();
//! let resolver = Resolver::new(InMemoryRepository::new(), config);
//!
//! // API routes are never intercepted
//! assert_eq!(resolver.resolve("GET", "/shorten/abc").await?, Resolution::PassThrough);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod html;
pub mod resolver;
pub mod status;

pub use config::{ResolverConfig, DEFAULT_RESERVED_PREFIXES};
pub use error::{ResolverError, Result};
pub use event::{EdgeEvent, EdgeRequest, EdgeResponse, HeaderEntry};
pub use resolver::{Reply, Resolution, Resolver};
pub use status::RedirectStatus;
