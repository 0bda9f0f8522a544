//! Application services built on the cache registry.

pub mod error;
pub mod soak;
