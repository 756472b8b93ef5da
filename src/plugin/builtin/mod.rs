//! Built-in Plugin Implementations
//!
//! Plugins shipped with the binary. Each registers itself through the
//! macros in [`api`], so adding a plugin only means adding a module here.

pub mod api;
pub mod google_analytics;
pub mod simple_map;
