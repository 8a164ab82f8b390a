mod health;
mod short_url;

pub use health::HealthResponse;
pub use short_url::{ListQuery, ShortUrl, ShortUrlList};
