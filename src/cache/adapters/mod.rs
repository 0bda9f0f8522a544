//! Typed façades over the registry for engine objects.
//!
//! Each adapter fixes a namespace, a TTL and a clone policy. Adapters hold
//! nothing but a borrow of the registry, so expiry and access counters have a
//! single source of truth.

mod bounds;
mod material;
mod snapshot;
mod texture;

pub use bounds::{BOUNDS_NAMESPACE, BoundsCache};
pub use material::{MATERIAL_NAMESPACE, MaterialCache};
pub use snapshot::{Snapshot, SnapshotCache, SnapshotPolicy};
pub use texture::{TEXTURE_NAMESPACE, TextureCache};
