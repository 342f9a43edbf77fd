//! Text-generation backends

pub mod local;

// Re-export for convenience
pub use local::LocalClient;
