//! Single-entry memoization for derived geometry.
//!
//! The cache keeps the last key and value; a call with an equal key returns
//! the stored value without recomputing. Shared inputs are compared by
//! pointer through `ByPtr`, so republishing the same `Arc` is a hit while a
//! freshly loaded, structurally equal grid is a miss.
use std::fmt;
use std::sync::Arc;

/// `Arc` wrapper whose equality is pointer identity.
pub struct ByPtr<T>(pub Arc<T>);

impl<T> Clone for ByPtr<T> {
    fn clone(&self) -> Self {
        ByPtr(Arc::clone(&self.0))
    }
}

impl<T> PartialEq for ByPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> fmt::Debug for ByPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByPtr({:p})", Arc::as_ptr(&self.0))
    }
}

/// Last-value cache keyed on `K`.
#[derive(Debug)]
pub struct Memo<K, V> {
    slot: Option<(K, Arc<V>)>,
    hits: u64,
    misses: u64,
}

impl<K: PartialEq, V> Memo<K, V> {
    pub fn new() -> Self {
        Self { slot: None, hits: 0, misses: 0 }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce() -> V) -> Arc<V> {
        if let Some(value) = self.lookup(&key) {
            return value;
        }
        self.store(key, compute())
    }

    /// Like `get_or_compute`, for computations that may produce nothing.
    /// A `None` result is not cached.
    pub fn get_or_try_compute(&mut self, key: K, compute: impl FnOnce() -> Option<V>) -> Option<Arc<V>> {
        if let Some(value) = self.lookup(&key) {
            return Some(value);
        }
        Some(self.store(key, compute()?))
    }

    fn lookup(&mut self, key: &K) -> Option<Arc<V>> {
        match &self.slot {
            Some((cached_key, value)) if cached_key == key => {
                self.hits += 1;
                log::debug!("memo hit ({} hits, {} misses)", self.hits, self.misses);
                Some(Arc::clone(value))
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    fn store(&mut self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.slot = Some((key, Arc::clone(&value)));
        value
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    /// (hits, misses) since construction.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

impl<K: PartialEq, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
