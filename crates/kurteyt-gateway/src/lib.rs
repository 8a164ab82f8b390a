//! HTTP surface of the shortener.
//!
//! Every request first meets the edge resolver; whatever it passes through
//! is routed to the management API under `/shorten` or to `/health`.

pub mod app;
pub mod edge;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::{AppState, SharedRepository};
