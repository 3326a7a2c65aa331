//! Guided self-care activities: catalog, completions, favorites,
//! mood-based recommendations, and progress summaries.

pub mod handlers;
pub mod model;
pub mod seed;
