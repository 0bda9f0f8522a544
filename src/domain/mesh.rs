//! Mesh geometry as seen by the cache: an identity and a world-space box.

use serde::Serialize;

use super::geometry::{BoundingBox, Vector3};

/// Anything the bounds cache can key and measure.
///
/// Engine meshes implement this so the cache never needs to know about the
/// scene graph.
pub trait BoundedMesh {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    /// Current world-space axis-aligned bounding box.
    fn world_bounding_box(&self) -> BoundingBox;

    /// Stable cache key: the mesh id, or its name when the id is empty.
    fn cache_key(&self) -> &str {
        let id = self.id();
        if id.is_empty() { self.name() } else { id }
    }
}

/// Bounding volume copied out of a mesh at the time it was measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeshBounds {
    pub min: Vector3,
    pub max: Vector3,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub center: Vector3,
}

impl MeshBounds {
    pub fn from_box(bbox: &BoundingBox) -> Self {
        let extent = bbox.extent();
        Self {
            min: bbox.minimum_world,
            max: bbox.maximum_world,
            width: extent.x,
            height: extent.y,
            depth: extent.z,
            center: bbox.center_world(),
        }
    }
}

/// A mesh with a local-space box placed in the world by translation and scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    id: String,
    name: String,
    local_min: Vector3,
    local_max: Vector3,
    position: Vector3,
    scaling: Vector3,
}

impl Mesh {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        local_min: Vector3,
        local_max: Vector3,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            local_min,
            local_max,
            position: Vector3::ZERO,
            scaling: Vector3::ONE,
        }
    }

    /// Axis-aligned box centred on the origin.
    pub fn cuboid(id: impl Into<String>, width: f32, height: f32, depth: f32) -> Self {
        let half = Vector3::new(width, height, depth) * 0.5;
        let id = id.into();
        Self::new(id.clone(), id, Vector3::ZERO - half, half)
    }

    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
    }

    pub fn set_scaling(&mut self, scaling: Vector3) {
        self.scaling = scaling;
    }
}

impl BoundedMesh for Mesh {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn world_bounding_box(&self) -> BoundingBox {
        let a = self.local_min.scaled_by(self.scaling) + self.position;
        let b = self.local_max.scaled_by(self.scaling) + self.position;
        BoundingBox::from_corners(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_box_follows_transform() {
        let mut mesh = Mesh::cuboid("crate", 2.0, 4.0, 6.0);
        mesh.set_position(Vector3::new(10.0, 0.0, 0.0));
        mesh.set_scaling(Vector3::new(-1.0, 1.0, 2.0));

        let bounds = MeshBounds::from_box(&mesh.world_bounding_box());
        assert_eq!(bounds.min, Vector3::new(9.0, -2.0, -6.0));
        assert_eq!(bounds.max, Vector3::new(11.0, 2.0, 6.0));
        assert_eq!((bounds.width, bounds.height, bounds.depth), (2.0, 4.0, 12.0));
        assert_eq!(bounds.center, Vector3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn cache_key_falls_back_to_name() {
        let named = Mesh::new("", "chair", Vector3::ZERO, Vector3::ONE);
        assert_eq!(named.cache_key(), "chair");

        let identified = Mesh::new("mesh-7", "chair", Vector3::ZERO, Vector3::ONE);
        assert_eq!(identified.cache_key(), "mesh-7");
    }
}
