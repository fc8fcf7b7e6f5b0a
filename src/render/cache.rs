use std::collections::HashMap;

use crate::foundation::ids::{CacheKey, NodeId};
use crate::raster::bitmap::Bitmap;
use crate::scene::layer::Layer;

struct CacheEntry {
    revision: u64,
    bitmap: Bitmap,
}

/// Counters reported by the debug overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub bytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Rasterized bitmaps keyed by entity, each tagged with the content revision it was baked from.
///
/// There is no eviction under memory pressure; entries leave only through
/// [`RenderCache::invalidate`], [`RenderCache::evict_for_layer`] or a revision mismatch.
#[derive(Default)]
pub struct RenderCache {
    entries: HashMap<CacheKey, CacheEntry>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bitmap baked at exactly `revision`. A stale entry is dropped and reported as a miss.
    pub fn get(&mut self, key: impl Into<CacheKey>, revision: u64) -> Option<Bitmap> {
        let key = key.into();
        match self.entries.get(&key) {
            Some(e) if e.revision == revision => {
                self.hits = self.hits.saturating_add(1);
                Some(e.bitmap.clone())
            }
            Some(_) => {
                tracing::trace!(?key, "render cache entry is stale");
                self.entries.remove(&key);
                self.misses = self.misses.saturating_add(1);
                None
            }
            None => {
                self.misses = self.misses.saturating_add(1);
                None
            }
        }
    }

    pub fn contains(&self, key: impl Into<CacheKey>) -> bool {
        self.entries.contains_key(&key.into())
    }

    pub fn insert(&mut self, key: impl Into<CacheKey>, revision: u64, bitmap: Bitmap) {
        self.entries
            .insert(key.into(), CacheEntry { revision, bitmap });
    }

    /// Drop one entry. Returns whether anything was removed.
    pub fn invalidate(&mut self, key: impl Into<CacheKey>) -> bool {
        let removed = self.entries.remove(&key.into()).is_some();
        if removed {
            self.evictions = self.evictions.saturating_add(1);
        }
        removed
    }

    pub fn evict_nodes(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        for id in ids {
            self.invalidate(id);
        }
    }

    /// Drop the entries of every node in `layer`.
    pub fn evict_for_layer(&mut self, layer: &Layer) {
        let before = self.entries.len();
        self.evict_nodes(layer.nodes().iter().map(|n| n.id()));
        tracing::debug!(
            layer = layer.id().0,
            evicted = before - self.entries.len(),
            "evicted layer from render cache"
        );
    }

    pub fn clear(&mut self) {
        self.evictions = self.evictions.saturating_add(self.entries.len() as u64);
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            bytes: self.entries.values().map(|e| e.bitmap.byte_len()).sum(),
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cache.rs"]
mod tests;
