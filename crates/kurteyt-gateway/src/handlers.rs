mod health;
mod short_url;

pub use health::health_handler;
pub use short_url::{
    create_short_url_handler, delete_short_url_handler, get_short_url_handler,
    list_short_urls_handler,
};
