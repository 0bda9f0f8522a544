//! Many collaborators hitting one registry from plain OS threads.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use scenecache::cache::{CacheConfig, CacheRegistry, TEXTURE_NAMESPACE};
use scenecache::domain::texture::Texture;

const THREADS: usize = 8;
const ROUNDS: usize = 500;

#[test]
fn concurrent_writers_readers_and_cleanup_stay_consistent() {
    let registry = Arc::new(CacheRegistry::new(CacheConfig::default()));
    let barrier = Arc::new(Barrier::new(THREADS + 1));

    let workers: Vec<_> = (0..THREADS)
        .map(|worker| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let namespace = format!("worker-{worker}");
                for round in 0..ROUNDS {
                    let key = format!("k{}", round % 16);
                    registry.set(&namespace, &key, round);
                    let seen = registry.get::<usize>(&namespace, &key);
                    assert!(seen.is_some_and(|value| value <= round));
                    registry.set("shared", &key, worker);
                    registry.get::<usize>("shared", &key);
                }
            })
        })
        .collect();

    let sweeper = {
        let registry = registry.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            barrier.wait();
            (0..ROUNDS).map(|_| registry.cleanup()).sum::<usize>()
        })
    };

    for worker in workers {
        worker.join().expect("worker thread");
    }
    let swept = sweeper.join().expect("sweeper thread");

    assert_eq!(swept, 0, "nothing expires under the default TTL");
    let stats = registry.stats();
    assert_eq!(stats.len(), THREADS + 1);
    assert_eq!(stats["shared"].entries, 16);
    let last_key = format!("k{}", (ROUNDS - 1) % 16);
    for worker in 0..THREADS {
        let namespace = format!("worker-{worker}");
        assert_eq!(registry.get::<usize>(&namespace, &last_key), Some(ROUNDS - 1));
        assert_eq!(registry.get::<usize>(&namespace, "k15"), Some(ROUNDS - 5));
    }
}

#[test]
fn short_ttl_churn_never_returns_expired_values() {
    let config = CacheConfig {
        default_ttl_ms: 1,
        ..CacheConfig::default()
    };
    let registry = Arc::new(CacheRegistry::new(config));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for round in 0..ROUNDS / 5 {
                    let key = format!("k{}", round % 4);
                    registry.set("churn", &key, (worker, round));
                    if round % 10 == 0 {
                        thread::sleep(Duration::from_millis(2));
                        registry.cleanup();
                    }
                    registry.has("churn", &key);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("churn thread");
    }

    thread::sleep(Duration::from_millis(5));
    for round in 0..4 {
        assert_eq!(
            registry.get::<(usize, usize)>("churn", &format!("k{round}")),
            None
        );
    }
    assert_eq!(registry.cleanup(), 0);
    assert_eq!(registry.len("churn"), 0);
}

#[test]
fn concurrent_texture_snapshots_do_not_share_buffers() {
    let registry = Arc::new(CacheRegistry::new(CacheConfig::default()));
    let live = Texture::solid("grass", 16, 16, [10, 200, 10, 255]);
    registry.textures().set("grass", &live).expect("snapshot");

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let registry = registry.clone();
            thread::spawn(move || {
                let mut copy = registry.textures().get("grass").expect("cached texture");
                copy.pixels.fill(worker as u8);
                copy
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("reader thread");
    }

    let cached = registry.textures().get("grass").expect("cached texture");
    assert_eq!(cached.pixels, live.pixels);
    assert_eq!(
        registry.stats()[TEXTURE_NAMESPACE].total_access_count,
        THREADS as u64 + 1
    );
}
