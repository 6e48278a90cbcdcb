//! Mutex-guarded cache for use from more than one thread.
//!
//! [`GraphicsCache`] itself assumes confinement to the thread that owns the
//! device. When several producers (for example an asset streaming thread)
//! must reach it, wrap it in a [`SharedGraphicsCache`]: one lock guards the
//! whole acquire/release critical section, device call included, so the map
//! update and the device work appear atomic to every other user.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::backend::GraphicsDevice;
use crate::cache::GraphicsCache;

/// Cloneable, thread-safe handle to one [`GraphicsCache`]
pub struct SharedGraphicsCache<D: GraphicsDevice> {
    inner: Arc<Mutex<GraphicsCache<D>>>,
}

impl<D: GraphicsDevice> SharedGraphicsCache<D> {
    pub fn new(cache: GraphicsCache<D>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Lock the cache for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, GraphicsCache<D>> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access to the cache.
    pub fn with<R>(&self, f: impl FnOnce(&mut GraphicsCache<D>) -> R) -> R {
        let mut cache = self.inner.lock();
        f(&mut cache)
    }

    /// Recover the cache if this is the last handle to it.
    pub fn try_unwrap(self) -> Result<GraphicsCache<D>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<D: GraphicsDevice> Clone for SharedGraphicsCache<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{MemoryAssets, PixelData};
    use crate::backend::{ObjectKind, RecordingDevice};
    use crate::config::CacheConfig;

    #[test]
    fn test_concurrent_acquire_and_release() {
        let assets = MemoryAssets::new().with_pixels("tex.png", PixelData::solid_color([255; 4]));
        let shared = SharedGraphicsCache::new(GraphicsCache::new(
            RecordingDevice::new(),
            assets,
            CacheConfig::default(),
        ));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        shared.with(|cache| cache.acquire_texture("tex.png")).unwrap();
                        shared.with(|cache| cache.release_texture("tex.png"));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let Ok(cache) = shared.try_unwrap() else {
            panic!("workers still hold the cache");
        };
        assert!(cache.textures().is_empty());
        let stats = cache.device().stats(ObjectKind::Texture);
        assert_eq!(stats.created, stats.destroyed);
        assert!(cache.device().faults().is_empty());
    }

    #[test]
    fn test_lock_spans_operations() {
        let shared = SharedGraphicsCache::new(GraphicsCache::new(
            RecordingDevice::new(),
            MemoryAssets::new(),
            CacheConfig::default(),
        ));
        let mut cache = shared.lock();
        let first = cache.acquire_ui_buffer().unwrap();
        let second = cache.acquire_ui_buffer().unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.buffers().ref_count("ui"), Some(2));
        cache.teardown_all();
    }
}
