//! Output caching for production mode
//!
//! Compiled pages are cached per path, keyed by a hash of the source
//! content so edits invalidate stale entries. The lock keeps independent
//! parallel compilations coordination-free.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct RenderCache {
    entries: RwLock<HashMap<String, (u64, String)>>,
}

impl RenderCache {
    pub fn new() -> Self {
        RenderCache::default()
    }

    /// Hash source content for staleness checks.
    pub fn content_hash(content: &str) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        content.hash(&mut hasher);
        hasher.finish()
    }

    /// Cached output for `key`, if present and not stale.
    pub fn get(&self, key: &str, hash: u64) -> Option<String> {
        let entries = self.entries.read().ok()?;
        match entries.get(key) {
            Some((stored, output)) if *stored == hash => Some(output.clone()),
            _ => None,
        }
    }

    pub fn store(&self, key: &str, hash: u64, output: String) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), (hash, output));
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}
