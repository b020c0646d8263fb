//! Long-poll adapter

pub mod service;

// Re-export the main types for convenience
pub use service::{LongPoller, UpdateSource, prepare_bot};
