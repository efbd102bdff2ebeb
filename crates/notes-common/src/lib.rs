//! Shared types and utilities for the notes store.

pub mod paths;
pub mod types;

pub use paths::*;
pub use types::*;
