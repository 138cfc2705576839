//! The growable byte buffer backing a [`Document`](crate::Document).

use crate::error::{Error, Result};

/// An owned, growable byte buffer.
///
/// The used length is the length of the underlying `Vec`; its capacity grows geometrically as
/// bytes are appended. Every mutating operation other than [`Storage::append`] is restricted to
/// the used region and is rejected without touching any byte if the requested range is not
/// inside it.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Storage {
    data: Vec<u8>,
}

impl Storage {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Creates an empty buffer able to hold `capacity` bytes without reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes in use.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether no bytes are in use.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of bytes the buffer can hold before it has to grow.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// The used region.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Copies `bytes` to the end of the used region.
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Appends a single byte.
    pub fn push(&mut self, byte: u8) {
        self.data.push(byte);
    }

    /// Removes `old_len` bytes starting at `offset` and inserts `bytes` in their place. Everything
    /// after the replaced range moves by `bytes.len() - old_len`.
    pub fn replace_range(&mut self, offset: usize, old_len: usize, bytes: &[u8]) -> Result<()> {
        let end = self.check_range(offset, old_len)?;
        if old_len == bytes.len() {
            self.data[offset..end].copy_from_slice(bytes);
        } else {
            self.data.splice(offset..end, bytes.iter().copied());
        }
        Ok(())
    }

    /// Removes `len` bytes starting at `offset`.
    pub fn truncate_from(&mut self, offset: usize, len: usize) -> Result<()> {
        self.replace_range(offset, len, &[])
    }

    /// Overwrites the byte at `offset` without changing the used length.
    pub(crate) fn set(&mut self, offset: usize, byte: u8) -> Result<()> {
        self.check_range(offset, 1)?;
        self.data[offset] = byte;
        Ok(())
    }

    pub(crate) fn into_vec(self) -> Vec<u8> {
        self.data
    }

    fn check_range(&self, offset: usize, len: usize) -> Result<usize> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(end),
            _ => Err(Error::out_of_bounds(offset, len, self.data.len())),
        }
    }
}

impl From<Vec<u8>> for Storage {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl AsRef<[u8]> for Storage {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("data", &hex::encode(&self.data))
            .finish()
    }
}
