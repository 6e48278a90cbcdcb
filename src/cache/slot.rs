//! Reference-counted slot cache.
//!
//! A [`SlotCache`] maps a key to a device handle plus a count of live
//! holders. The first acquisition of a key builds the resource, later ones
//! share it, and the release that brings the count to zero destroys it on the
//! device and removes the entry in the same call. An entry with a count of
//! zero never exists.
//!
//! There is no capacity bound and no expiry: an entry lives exactly as long
//! as at least one holder has not released it.

use std::borrow::Borrow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::backend::{GraphicsDevice, ProgramHandle, ShaderHandle, TextureHandle};
use crate::keys::ResourceKind;

/// A handle type the cache knows how to destroy on device `D`.
pub trait DeviceResource<D: ?Sized> {
    /// Destroy the device object(s) behind this handle.
    fn destroy(self, device: &mut D);
}

impl<D: GraphicsDevice + ?Sized> DeviceResource<D> for TextureHandle {
    fn destroy(self, device: &mut D) {
        device.destroy_texture(self);
    }
}

impl<D: GraphicsDevice + ?Sized> DeviceResource<D> for ShaderHandle {
    fn destroy(self, device: &mut D) {
        device.destroy_shader(self);
    }
}

impl<D: GraphicsDevice + ?Sized> DeviceResource<D> for ProgramHandle {
    fn destroy(self, device: &mut D) {
        device.destroy_program(self);
    }
}

/// One cached resource.
#[derive(Debug, Clone)]
pub struct CacheEntry<H> {
    handle: H,
    ref_count: usize,
    serial: u64,
}

impl<H> CacheEntry<H> {
    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn ref_count(&self) -> usize {
        self.ref_count
    }
}

/// What a [`SlotCache::release`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The key was not cached; nothing happened.
    Absent,
    /// The count dropped but holders remain.
    Decremented { remaining: usize },
    /// The last holder released; the resource was destroyed.
    Destroyed,
}

/// Reference-counted key → handle map for one resource kind.
pub struct SlotCache<K, H> {
    kind: ResourceKind,
    entries: HashMap<K, CacheEntry<H>>,
    next_serial: u64,
}

impl<K, H> SlotCache<K, H>
where
    K: Eq + Hash + fmt::Display,
    H: Clone,
{
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
            next_serial: 0,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Take another reference to an existing entry.
    ///
    /// Returns `None` without side effects when the key is not cached.
    pub fn acquire_existing<Q>(&mut self, key: &Q) -> Option<H>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.get_mut(key)?;
        entry.ref_count += 1;
        let handle = entry.handle.clone();
        log::trace!(
            "{} cache: shared '{}' ({} users)",
            self.kind.name(),
            display_key(&self.entries, key),
            entry_count(&self.entries, key)
        );
        Some(handle)
    }

    /// Insert a freshly built resource with a count of one.
    ///
    /// The key must not already be cached. If it is, the new handle is
    /// returned to the caller unused and the existing entry is kept, so a
    /// handle never changes for the lifetime of its entry.
    pub fn insert(&mut self, key: K, handle: H) -> Result<H, H> {
        match self.entries.entry(key) {
            Entry::Occupied(_) => Err(handle),
            Entry::Vacant(vacant) => {
                let serial = self.next_serial;
                self.next_serial += 1;
                log::debug!("{} cache: created '{}'", self.kind.name(), vacant.key());
                vacant.insert(CacheEntry {
                    handle: handle.clone(),
                    ref_count: 1,
                    serial,
                });
                Ok(handle)
            }
        }
    }

    /// Acquire `key`, building the resource with `build` on a miss.
    ///
    /// A failing `build` leaves the cache unchanged.
    pub fn acquire_with<Q, E, F>(&mut self, key: &Q, build: F) -> Result<H, E>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> Result<H, E>,
    {
        if let Some(handle) = self.acquire_existing(key) {
            return Ok(handle);
        }
        let handle = build()?;
        // The key was absent above and `build` cannot reach this cache.
        Ok(self.insert(key.to_owned(), handle).unwrap_or_else(|h| h))
    }

    /// Drop one reference to `key`, destroying the resource at zero.
    ///
    /// Releasing an absent key is a no-op, so an extra release can never
    /// corrupt a count.
    pub fn release<Q, D>(&mut self, key: &Q, device: &mut D) -> ReleaseOutcome
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        H: DeviceResource<D>,
        D: ?Sized,
    {
        let Some(entry) = self.entries.get_mut(key) else {
            log::trace!("{} cache: release of uncached key ignored", self.kind.name());
            return ReleaseOutcome::Absent;
        };

        entry.ref_count -= 1;
        if entry.ref_count > 0 {
            let remaining = entry.ref_count;
            log::trace!(
                "{} cache: released '{}' ({} users)",
                self.kind.name(),
                display_key(&self.entries, key),
                remaining
            );
            return ReleaseOutcome::Decremented { remaining };
        }

        if let Some((key, entry)) = self.entries.remove_entry(key) {
            log::debug!("{} cache: destroyed '{}'", self.kind.name(), key);
            entry.handle.destroy(device);
        }
        ReleaseOutcome::Destroyed
    }

    /// Destroy every entry regardless of its count, in creation order.
    ///
    /// Returns the number of entries destroyed. The cache is empty afterwards.
    pub fn drain<D>(&mut self, device: &mut D) -> usize
    where
        H: DeviceResource<D>,
        D: ?Sized,
    {
        let mut entries: Vec<_> = self.entries.drain().collect();
        entries.sort_by_key(|(_, entry)| entry.serial);
        let count = entries.len();
        for (key, entry) in entries {
            log::debug!(
                "{} cache: teardown of '{}' ({} users outstanding)",
                self.kind.name(),
                key,
                entry.ref_count
            );
            entry.handle.destroy(device);
        }
        count
    }

    /// Current count of `key`, or `None` if it is not cached.
    pub fn ref_count<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|e| e.ref_count)
    }

    /// Handle cached under `key` without taking a reference.
    pub fn get<Q>(&self, key: &Q) -> Option<&H>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|e| &e.handle)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Number of distinct cached resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all reference counts.
    pub fn total_refs(&self) -> usize {
        self.entries.values().map(|e| e.ref_count).sum()
    }

    /// All entries as `(key, handle, count)`, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &H, usize)> + '_ {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by_key(|(_, entry)| entry.serial);
        entries
            .into_iter()
            .map(|(key, entry)| (key, &entry.handle, entry.ref_count))
    }
}

impl<K, H> fmt::Debug for SlotCache<K, H>
where
    K: fmt::Debug,
    H: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotCache")
            .field("kind", &self.kind)
            .field("entries", &self.entries)
            .finish()
    }
}

fn display_key<K, H, Q>(entries: &HashMap<K, CacheEntry<H>>, key: &Q) -> String
where
    K: Eq + Hash + Borrow<Q> + fmt::Display,
    Q: Hash + Eq + ?Sized,
{
    entries
        .get_key_value(key)
        .map(|(k, _)| k.to_string())
        .unwrap_or_default()
}

fn entry_count<K, H, Q>(entries: &HashMap<K, CacheEntry<H>>, key: &Q) -> usize
where
    K: Eq + Hash + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
{
    entries.get(key).map(|e| e.ref_count).unwrap_or(0)
}
