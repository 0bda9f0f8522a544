//! Cached world-space bounding volumes, keyed by mesh id.

use tracing::debug;

use crate::cache::registry::CacheRegistry;
use crate::domain::mesh::{BoundedMesh, MeshBounds};

pub const BOUNDS_NAMESPACE: &str = "bounds";

/// Bounds are plain values, so caching them never aliases the mesh's own box.
pub struct BoundsCache<'a> {
    registry: &'a CacheRegistry,
}

impl<'a> BoundsCache<'a> {
    pub(crate) fn new(registry: &'a CacheRegistry) -> Self {
        Self { registry }
    }

    pub fn set(&self, mesh_id: &str, bounds: MeshBounds) {
        self.registry.set_with_ttl(
            BOUNDS_NAMESPACE,
            mesh_id,
            bounds,
            self.registry.config().bounds_ttl(),
        );
    }

    pub fn get(&self, mesh_id: &str) -> Option<MeshBounds> {
        self.registry.get(BOUNDS_NAMESPACE, mesh_id)
    }

    /// Cached bounds for `mesh`, measuring and caching them on a miss.
    ///
    /// A mesh moved after caching keeps reporting the cached bounds until the
    /// entry expires or is deleted.
    pub fn get_or_compute<M>(&self, mesh: &M) -> MeshBounds
    where
        M: BoundedMesh + ?Sized,
    {
        let key = mesh.cache_key();
        if let Some(bounds) = self.get(key) {
            return bounds;
        }

        let bounds = MeshBounds::from_box(&mesh.world_bounding_box());
        self.set(key, bounds);
        debug!(mesh = key, "Calculated and cached mesh bounds");
        bounds
    }

    /// Forget the cached bounds, e.g. after the mesh geometry changes.
    pub fn invalidate(&self, mesh_id: &str) -> bool {
        self.registry.delete(BOUNDS_NAMESPACE, mesh_id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crate::cache::{CacheConfig, CacheRegistry};
    use crate::domain::geometry::{BoundingBox, Vector3};
    use crate::domain::mesh::Mesh;

    use super::*;

    /// Counts how often the bounding box is measured.
    struct CountingMesh {
        inner: Mesh,
        measured: Cell<u32>,
    }

    impl BoundedMesh for CountingMesh {
        fn id(&self) -> &str {
            self.inner.id()
        }

        fn name(&self) -> &str {
            self.inner.name()
        }

        fn world_bounding_box(&self) -> BoundingBox {
            self.measured.set(self.measured.get() + 1);
            self.inner.world_bounding_box()
        }
    }

    #[test]
    fn computes_once_then_hits() {
        let cache = CacheRegistry::new(CacheConfig::default());
        let mesh = CountingMesh {
            inner: Mesh::cuboid("meshA", 2.0, 2.0, 2.0),
            measured: Cell::new(0),
        };

        let first = cache.bounds().get_or_compute(&mesh);
        let second = cache.bounds().get_or_compute(&mesh);

        assert_eq!(first, second);
        assert_eq!(mesh.measured.get(), 1);
        assert_eq!(cache.stats()[BOUNDS_NAMESPACE].total_access_count, 1);
    }

    #[test]
    fn cached_value_is_a_copy_not_a_live_view() {
        let cache = CacheRegistry::new(CacheConfig::default());
        let mut mesh = Mesh::cuboid("meshA", 2.0, 2.0, 2.0);

        let before = cache.bounds().get_or_compute(&mesh);
        mesh.set_position(Vector3::new(100.0, 0.0, 0.0));

        assert_eq!(cache.bounds().get("meshA"), Some(before));
        assert_eq!(before.center, Vector3::ZERO);

        assert!(cache.bounds().invalidate("meshA"));
        let after = cache.bounds().get_or_compute(&mesh);
        assert_eq!(after.center, Vector3::new(100.0, 0.0, 0.0));
    }

    #[test]
    fn unnamed_mesh_ids_fall_back_to_name() {
        let cache = CacheRegistry::new(CacheConfig::default());
        let mesh = Mesh::new("", "sofa", Vector3::ZERO, Vector3::new(2.0, 1.0, 1.0));

        let bounds = cache.bounds().get_or_compute(&mesh);
        assert_eq!(cache.bounds().get("sofa"), Some(bounds));
        assert_eq!(bounds.width, 2.0);
    }

    #[test]
    fn explicit_set_uses_bounds_ttl() {
        let cache = CacheRegistry::new(CacheConfig::default());
        let mesh = Mesh::cuboid("meshA", 1.0, 1.0, 1.0);
        cache
            .bounds()
            .set("meshA", MeshBounds::from_box(&mesh.world_bounding_box()));

        let info = cache
            .entry_info(BOUNDS_NAMESPACE, "meshA")
            .expect("entry info");
        assert_eq!(info.ttl, cache.config().bounds_ttl());
    }
}
