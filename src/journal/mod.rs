//! Journal entries: private free-form writing with an optional mood emoji.

pub mod handlers;
pub mod model;
