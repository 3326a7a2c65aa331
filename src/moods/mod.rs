//! Mood tracking: append-only log of how the user feels.

pub mod handlers;
pub mod model;
