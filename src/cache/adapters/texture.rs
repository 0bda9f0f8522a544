use std::time::Duration;

use crate::cache::config::CacheConfig;
use crate::domain::DomainError;
use crate::domain::texture::Texture;

use super::snapshot::{Snapshot, SnapshotCache, SnapshotPolicy};

pub const TEXTURE_NAMESPACE: &str = "textures";

pub type TextureCache<'a> = SnapshotCache<'a, Texture>;

impl Snapshot for Texture {
    fn snapshot(&self, _cache_id: &str) -> Result<Self, DomainError> {
        self.try_clone()
    }
}

impl SnapshotPolicy for Texture {
    const NAMESPACE: &'static str = TEXTURE_NAMESPACE;
    const KIND: &'static str = "texture";

    fn ttl(config: &CacheConfig) -> Duration {
        config.texture_ttl()
    }
}

#[cfg(test)]
mod tests {
    use crate::cache::{CacheConfig, CacheError, CacheRegistry};
    use crate::domain::texture::Texture;

    use super::*;

    #[test]
    fn pixel_edits_on_either_side_stay_isolated() {
        let cache = CacheRegistry::new(CacheConfig::default());
        let mut live = Texture::solid("wood", 2, 2, [120, 80, 40, 255]);
        cache.textures().set("wood", &live).expect("snapshot");

        live.pixels.fill(0);
        let mut copy = cache.textures().get("wood").expect("cached texture");
        assert_eq!(&copy.pixels[..4], &[120, 80, 40, 255]);

        copy.pixels.fill(255);
        let again = cache.textures().get("wood").expect("cached texture");
        assert_eq!(&again.pixels[..4], &[120, 80, 40, 255]);
        assert!(live.pixels.iter().all(|&b| b == 0));
    }

    #[test]
    fn corrupt_texture_is_not_cached() {
        let cache = CacheRegistry::new(CacheConfig::default());
        let live = Texture::new("broken", Some("broken.png".to_string()), 8, 8, vec![0; 3]);

        let err = cache.textures().set("broken", &live).expect_err("bad buffer");
        assert!(matches!(err, CacheError::Snapshot { kind: "texture", .. }));
        assert!(cache.stats().get(TEXTURE_NAMESPACE).is_none());
    }

    #[test]
    fn delete_removes_the_snapshot() {
        let cache = CacheRegistry::new(CacheConfig::default());
        cache
            .textures()
            .set("wood", &Texture::solid("wood", 1, 1, [0; 4]))
            .expect("snapshot");

        assert!(cache.textures().delete("wood"));
        assert!(cache.textures().get("wood").is_none());
    }

    #[test]
    fn textures_outlive_materials() {
        let cache = CacheRegistry::new(CacheConfig::default());
        cache
            .textures()
            .set("wood", &Texture::solid("wood", 1, 1, [0; 4]))
            .expect("snapshot");

        let info = cache
            .entry_info(TEXTURE_NAMESPACE, "wood")
            .expect("entry info");
        assert_eq!(info.ttl, cache.config().texture_ttl());
        assert!(info.ttl > cache.config().material_ttl());
    }
}
