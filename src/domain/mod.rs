//! Engine-side objects the cache stores snapshots of.

pub mod error;
pub mod geometry;
pub mod material;
pub mod mesh;
pub mod texture;

pub use error::DomainError;
