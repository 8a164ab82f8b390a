use crate::status::RedirectStatus;
use typed_builder::TypedBuilder;

/// Path prefixes that belong to the API and are never redirected.
pub const DEFAULT_RESERVED_PREFIXES: &[&str] =
    &["shorten", "health", "docs", "redoc", "openapi.json", "api"];

fn default_reserved_prefixes() -> Vec<String> {
    DEFAULT_RESERVED_PREFIXES
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Settings for [`crate::Resolver`], resolved once at startup.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ResolverConfig {
    /// Where requests for unknown or expired ids are sent.
    #[builder(setter(into))]
    pub expired_redirect_url: String,
    #[builder(default)]
    pub redirect_status: RedirectStatus,
    /// `max-age` of the `Cache-Control` header on resolver responses, in seconds.
    #[builder(default = 60)]
    pub cache_max_age: u32,
    #[builder(default = default_reserved_prefixes())]
    pub reserved_prefixes: Vec<String>,
    #[builder(default = "max-age=63072000".to_string(), setter(into))]
    pub strict_transport_security: String,
    /// Seconds the interstitial page waits before navigating.
    #[builder(default = 1)]
    pub interstitial_delay_secs: u32,
}

impl ResolverConfig {
    /// Whether `slug` falls under one of the reserved prefixes.
    ///
    /// A prefix only matches a whole leading path segment, so a short id
    /// that happens to begin with `api` is still resolved.
    pub fn is_reserved(&self, slug: &str) -> bool {
        self.reserved_prefixes.iter().any(|prefix| {
            slug.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ResolverConfig::builder()
            .expired_redirect_url("https://example.com/expired")
            .build();

        assert_eq!(config.redirect_status, RedirectStatus::MovedPermanently);
        assert_eq!(config.strict_transport_security, "max-age=63072000");
        assert_eq!(config.reserved_prefixes.len(), DEFAULT_RESERVED_PREFIXES.len());
    }

    #[test]
    fn reserved_prefixes_match_by_prefix() {
        let config = ResolverConfig::builder()
            .expired_redirect_url("https://example.com/expired")
            .build();

        assert!(config.is_reserved("shorten/public"));
        assert!(config.is_reserved("api/health"));
        assert!(config.is_reserved("openapi.json"));
        assert!(config.is_reserved("docs"));
        assert!(!config.is_reserved("abc12345"));
        assert!(!config.is_reserved(""));
    }

    #[test]
    fn ids_sharing_a_reserved_prefix_are_not_reserved() {
        let config = ResolverConfig::builder()
            .expired_redirect_url("https://example.com/expired")
            .build();

        for slug in ["apiQ7xZ2", "docsK9a1", "healthZ1", "shorten1", "redocAb9"] {
            assert!(!config.is_reserved(slug), "{slug} should resolve");
        }
        assert!(config.is_reserved("docs/index.html"));
        assert!(!config.is_reserved("openapi.jsonx"));
    }
}
