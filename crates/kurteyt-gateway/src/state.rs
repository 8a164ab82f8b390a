use std::sync::Arc;

use kurteyt_core::{Repository, ShortId};
use kurteyt_redirector::Resolver;
use kurteyt_shortener::Shortener;

/// The record store shared by the management API and the resolver.
pub type SharedRepository = Arc<dyn Repository>;

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    resolver: Arc<Resolver<SharedRepository>>,
    base_url: String,
}

impl AppState {
    pub fn new(
        shortener: Arc<dyn Shortener>,
        resolver: Resolver<SharedRepository>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            shortener,
            resolver: Arc::new(resolver),
            base_url: public_base_url.into(),
        }
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn resolver(&self) -> &Resolver<SharedRepository> {
        &self.resolver
    }

    /// The public link for `id`.
    pub fn short_url(&self, id: &ShortId) -> String {
        id.to_url(&self.base_url)
    }
}
