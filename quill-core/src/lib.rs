//! Quill Core - Core data structures shared by the notes and news sites
//!
//! Domain types, slug derivation, the unified error type, configuration and logging setup

pub mod config;
pub mod error;
pub mod logging;
pub mod slug;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use slug::slugify;
pub use types::*;

// Re-export commonly used external types
pub use tracing;
