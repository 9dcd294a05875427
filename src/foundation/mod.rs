//! Shared building blocks: error taxonomy, animation metadata, configuration and the
//! invalidation hub.

pub mod config;
pub mod core;
pub mod error;
pub mod observe;
