//! HTTP request handlers.

pub mod health;
pub mod items;

// Re-export common handler utilities
pub use health::health_check;
