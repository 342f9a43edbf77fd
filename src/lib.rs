//! quill: topic-to-text generation against a local chat-completions
//! server, with prompt styles and an append-only audit trail.
//!
//! ```text
//! POST /generate ─► GenerationService ─► StyleRegistry (template)
//!                          │
//!                          ├─► LocalClient (one POST, bounded timeout)
//!                          └─► AuditLog (one JSON line per generation)
//! ```

pub mod error;
pub mod config;
pub mod styles;
pub mod providers;
pub mod request;
pub mod audit;
pub mod service;
pub mod server;

pub use config::QuillConfig;
pub use error::Error;
pub use request::{GenerationRequest, GenerationResult, AuditRecord};
pub use service::{Generation, GenerationOutcome, GenerationService};
pub use styles::StyleRegistry;
