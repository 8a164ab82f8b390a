use crate::config::ResolverConfig;
use crate::error::Result;
use crate::event::EdgeEvent;
use crate::html::InterstitialPage;
use askama::Template;
use kurteyt_core::{OgSettings, ReadRepository, RedirectType, ShortId};
use std::sync::Arc;
use tracing::{debug, error, trace};

/// A response the resolver answers with itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub status_description: &'static str,
    /// Headers to set on the outbound response, with canonical names.
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl Reply {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The outcome for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Not ours to answer; the request continues to the API.
    PassThrough,
    Respond(Reply),
}

/// Decides how an inbound request is answered at the edge.
///
/// Reads go straight to the store; nothing is cached between requests.
#[derive(Debug, Clone)]
pub struct Resolver<R> {
    repository: Arc<R>,
    config: ResolverConfig,
}

impl<R: ReadRepository> Resolver<R> {
    pub fn new(repository: R, config: ResolverConfig) -> Self {
        Self {
            repository: Arc::new(repository),
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Strips a single leading and a single trailing slash.
    fn slug(uri: &str) -> &str {
        let slug = uri.strip_prefix('/').unwrap_or(uri);
        slug.strip_suffix('/').unwrap_or(slug)
    }

    /// Resolves the request for `uri` (path only) made with `method`.
    ///
    /// Unknown, expired and malformed ids all resolve to the expired
    /// redirect; only store and render failures are errors.
    pub async fn resolve(&self, method: &str, uri: &str) -> Result<Resolution> {
        let slug = Self::slug(uri);

        if self.config.is_reserved(slug) {
            trace!(slug, "reserved route, passing through");
            return Ok(Resolution::PassThrough);
        }
        if method != "GET" {
            trace!(slug, method, "not a GET, passing through");
            return Ok(Resolution::PassThrough);
        }

        let record = match ShortId::new(slug) {
            Ok(id) => self.repository.get(&id).await.inspect_err(|e| {
                error!(short_id = %id, error = %e, "failed to read redirect record");
            })?,
            Err(_) => None,
        };

        let reply = match &record {
            Some(record) if record.redirect_type == RedirectType::OgHtml => {
                debug!(short_id = %record.short_id, "serving interstitial");
                self.interstitial(&record.target_url, record.og_settings.as_ref())?
            }
            Some(record) => {
                debug!(short_id = %record.short_id, target = %record.target_url, "redirecting");
                self.redirect(&record.target_url)
            }
            None => {
                debug!(slug, "no live record, redirecting to expired page");
                self.redirect(&self.config.expired_redirect_url)
            }
        };

        Ok(Resolution::Respond(reply))
    }

    /// Resolves an edge event in place.
    ///
    /// HSTS is set on the response whatever the outcome. On pass-through
    /// nothing else changes. Otherwise the resolver's headers are written
    /// over the inbound response's, which keeps every other header it
    /// already carried.
    pub async fn handle_event(&self, mut event: EdgeEvent) -> Result<EdgeEvent> {
        event.response.set_header(
            "Strict-Transport-Security",
            self.config.strict_transport_security.as_str(),
        );

        let resolution = self
            .resolve(&event.request.method, &event.request.uri)
            .await?;

        if let Resolution::Respond(reply) = resolution {
            let response = &mut event.response;
            response.status = reply.status.to_string();
            response.status_description = Some(reply.status_description.to_string());
            for (key, value) in reply.headers {
                response.set_header(key, value);
            }
            if reply.body.is_some() {
                response.body = reply.body;
            }
        }

        Ok(event)
    }

    fn common_headers(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "Strict-Transport-Security",
                self.config.strict_transport_security.clone(),
            ),
            (
                "Cache-Control",
                format!("max-age={}", self.config.cache_max_age),
            ),
        ]
    }

    fn redirect(&self, location: &str) -> Reply {
        let status = self.config.redirect_status;
        let mut headers = self.common_headers();
        headers.push(("Location", location.to_string()));

        Reply {
            status: status.code(),
            status_description: status.description(),
            headers,
            body: None,
        }
    }

    fn interstitial(&self, target_url: &str, og: Option<&OgSettings>) -> Result<Reply> {
        let body = InterstitialPage::new(target_url, og, self.config.interstitial_delay_secs)
            .render()
            .inspect_err(|e| error!(error = %e, "failed to render interstitial"))?;
        let mut headers = self.common_headers();
        headers.push(("Content-Type", "text/html; charset=utf-8".to_string()));

        Ok(Reply {
            status: 200,
            status_description: "OK",
            headers,
            body: Some(body),
        })
    }
}
