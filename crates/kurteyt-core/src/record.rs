use crate::error::{CoreError, Result};
use crate::short_id::ShortId;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Default lifetime of a short URL when the request does not specify one.
pub const DEFAULT_NUM_DAYS_UNTIL_EXPIRE: i64 = 90;

const SECONDS_PER_DAY: i64 = 86_400;

/// How the redirector answers for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RedirectType {
    /// Answer with an HTTP redirect status and a `Location` header.
    #[default]
    #[serde(rename = "DIRECT")]
    Direct,
    /// Answer with an HTML page carrying Open-Graph tags that navigates
    /// to the target after a short delay.
    #[serde(rename = "OG_HTML")]
    OgHtml,
}

impl RedirectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectType::Direct => "DIRECT",
            RedirectType::OgHtml => "OG_HTML",
        }
    }
}

impl Display for RedirectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedirectType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "DIRECT" => Ok(RedirectType::Direct),
            "OG_HTML" => Ok(RedirectType::OgHtml),
            other => Err(format!("unknown redirect type: {other}")),
        }
    }
}

/// Social preview metadata rendered into the interstitial page.
///
/// Every field is optional; missing fields render as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OgSettings {
    #[serde(default)]
    pub og_title: Option<String>,
    #[serde(default)]
    pub og_description: Option<String>,
    #[serde(default)]
    pub og_url: Option<String>,
    #[serde(default)]
    pub og_image: Option<String>,
    #[serde(default)]
    pub og_image_alt: Option<String>,
}

/// Properties received on short URL creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShortUrlCreate {
    pub target_url: String,
    #[serde(default = "default_num_days_until_expire")]
    pub num_days_until_expire: i64,
    #[serde(default)]
    pub redirect_type: Option<RedirectType>,
    #[serde(default)]
    pub og_settings: Option<OgSettings>,
}

fn default_num_days_until_expire() -> i64 {
    DEFAULT_NUM_DAYS_UNTIL_EXPIRE
}

impl ShortUrlCreate {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            num_days_until_expire: DEFAULT_NUM_DAYS_UNTIL_EXPIRE,
            redirect_type: None,
            og_settings: None,
        }
    }

    pub fn with_og_settings(mut self, og_settings: OgSettings) -> Self {
        self.redirect_type = Some(RedirectType::OgHtml);
        self.og_settings = Some(og_settings);
        self
    }

    pub fn with_days_until_expire(mut self, days: i64) -> Self {
        self.num_days_until_expire = days;
        self
    }
}

/// Properties accepted on short URL update. Unset fields are left alone.
///
/// The expiry is fixed at creation, so there is no way to move it here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShortUrlUpdate {
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub redirect_type: Option<RedirectType>,
    #[serde(default)]
    pub og_settings: Option<OgSettings>,
}

impl ShortUrlUpdate {
    pub fn is_empty(&self) -> bool {
        self.target_url.is_none() && self.redirect_type.is_none() && self.og_settings.is_none()
    }
}

/// A stored short URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShortUrlRecord {
    pub short_id: ShortId,
    pub target_url: String,
    #[serde(default)]
    pub redirect_type: RedirectType,
    #[serde(default)]
    pub og_settings: Option<OgSettings>,
    pub num_days_until_expire: i64,
    /// Unix epoch seconds at which the record expires.
    #[serde(rename = "TTL")]
    pub ttl: f64,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl ShortUrlRecord {
    /// Builds a fully populated record from a creation request.
    ///
    /// This performs no I/O: the id and the creation instant are supplied by
    /// the caller, so the result is fully determined by the arguments.
    pub fn build(request: ShortUrlCreate, short_id: ShortId, now: Timestamp) -> Result<Self> {
        let ttl = expiry_ttl(now, request.num_days_until_expire)?;

        Ok(Self {
            short_id,
            target_url: request.target_url,
            redirect_type: request.redirect_type.unwrap_or_default(),
            og_settings: request.og_settings,
            num_days_until_expire: request.num_days_until_expire,
            ttl,
            created_at: now,
            updated_at: None,
        })
    }

    /// Whether the record's TTL has passed at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.ttl <= epoch_seconds(now)
    }
}

/// Computes the TTL epoch for a record created at `now` living `days` days.
pub fn expiry_ttl(now: Timestamp, days: i64) -> Result<f64> {
    let seconds = days.checked_mul(SECONDS_PER_DAY).ok_or_else(|| {
        CoreError::InvalidExpiry(format!("{days} days overflows the expiry range"))
    })?;
    let expire_at = now
        .checked_add(SignedDuration::from_secs(seconds))
        .map_err(|e| CoreError::InvalidExpiry(format!("{days} days from {now}: {e}")))?;
    Ok(epoch_seconds(expire_at))
}

/// Unix epoch seconds as a float, the representation used for `TTL`.
pub fn epoch_seconds(ts: Timestamp) -> f64 {
    ts.as_duration().as_secs_f64()
}
