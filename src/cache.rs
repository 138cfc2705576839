//! The per-key index of byte locations inside a document's storage.

use indexmap::IndexMap;

use crate::spec::ElementType;

/// Where one field of a document currently lives in its storage.
///
/// A field occupies `1 + key_len + value_len` bytes starting at `from`: the type tag, the key with
/// its nul terminator, then the value body including any length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// The type tag currently stored at `from`.
    pub element_type: ElementType,

    /// Offset of the type tag byte.
    pub from: usize,

    /// Length of the key bytes plus the nul terminator.
    pub key_len: usize,

    /// Length of the value body, including any length prefix.
    pub value_len: usize,
}

impl Dimensions {
    /// Offset of the first byte of the value body.
    pub fn value_start(&self) -> usize {
        self.from + 1 + self.key_len
    }

    /// Offset one past the last byte of the field.
    pub fn end(&self) -> usize {
        self.value_start() + self.value_len
    }

    /// Total length of the field: tag, key and value.
    pub fn field_len(&self) -> usize {
        1 + self.key_len + self.value_len
    }
}

/// An ordered mapping from key to [`Dimensions`].
///
/// Iteration order is insertion order, which is also the order the fields appear in the buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentCache {
    entries: IndexMap<String, Dimensions>,
}

impl DocumentCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached location of `key`, if it has been written.
    pub fn lookup(&self, key: &str) -> Option<Dimensions> {
        self.entries.get(key).copied()
    }

    /// Appends a new entry. The caller guarantees `key` is not already present.
    pub fn insert(&mut self, key: impl Into<String>, dimensions: Dimensions) {
        let key = key.into();
        debug_assert!(!self.entries.contains_key(&key), "duplicate cache key {key:?}");
        self.entries.insert(key, dimensions);
    }

    /// Replaces the entry for an existing key, keeping its position.
    pub fn update(&mut self, key: &str, dimensions: Dimensions) {
        if let Some(entry) = self.entries.get_mut(key) {
            *entry = dimensions;
        }
    }

    /// Removes `key`, keeping the relative order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Dimensions> {
        self.entries.shift_remove(key)
    }

    /// Moves every entry that starts after `after` by `delta` bytes.
    pub fn shift_following(&mut self, after: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        for dimensions in self.entries.values_mut() {
            if dimensions.from > after {
                dimensions.from = dimensions.from.wrapping_add_signed(delta);
            }
        }
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` has an entry.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Entries in buffer order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dimensions)> {
        self.entries.iter().map(|(k, d)| (k.as_str(), d))
    }
}
