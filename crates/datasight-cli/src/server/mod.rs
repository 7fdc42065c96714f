//! HTTP API server.

mod app;
mod error;
mod handlers;
mod state;

pub use app::run_server;
pub use state::AppState;
