//! Page contexts returned by the handlers

pub mod common;
pub mod news;
pub mod notes;

pub use common::*;
pub use news::*;
pub use notes::*;
