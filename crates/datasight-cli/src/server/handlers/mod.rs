//! API request handlers.

mod ai;
mod overview;

pub use ai::{get_recommended_questions, post_query};
pub use overview::get_metrics;
