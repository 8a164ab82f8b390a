use kurteyt_core::ShortUrlRecord;
use serde::{Deserialize, Serialize};

/// The public view of a record: every stored field except the store's
/// key attributes, plus the full short link.
#[derive(Debug, Serialize)]
pub struct ShortUrl {
    #[serde(flatten)]
    pub record: ShortUrlRecord,
    #[serde(rename = "ShortUrl")]
    pub short_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShortUrlList {
    pub items: Vec<ShortUrl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}
