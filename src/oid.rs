//! Module containing functionality related to BSON ObjectIds.

use std::{
    fmt,
    str::FromStr,
    sync::{
        LazyLock,
        atomic::{AtomicUsize, Ordering},
    },
    time::SystemTime,
};

use crate::error::{Error, Result};

const TIMESTAMP_SIZE: usize = 4;
const PROCESS_ID_SIZE: usize = 5;
const COUNTER_SIZE: usize = 3;

const TIMESTAMP_OFFSET: usize = 0;
const PROCESS_ID_OFFSET: usize = TIMESTAMP_OFFSET + TIMESTAMP_SIZE;
const COUNTER_OFFSET: usize = PROCESS_ID_OFFSET + PROCESS_ID_SIZE;

const MAX_U24: usize = 0xFF_FFFF;

static OID_COUNTER: LazyLock<AtomicUsize> =
    LazyLock::new(|| AtomicUsize::new(rand::random_range(0..=MAX_U24)));

static PROCESS_UNIQUE: LazyLock<[u8; PROCESS_ID_SIZE]> = LazyLock::new(rand::random);

/// A wrapper around a raw 12-byte ObjectId.
///
/// ```
/// use indexed_bson::oid::ObjectId;
///
/// let oid = ObjectId::parse_str("507f1f77bcf86cd799439011")?;
/// assert_eq!(oid.to_hex(), "507f1f77bcf86cd799439011");
/// # Ok::<(), indexed_bson::error::Error>(())
/// ```
#[derive(Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct ObjectId {
    id: [u8; 12],
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s)
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        Self { id: bytes }
    }
}

impl ObjectId {
    /// Generates a new ObjectId from the current time, a per-process random value and a counter.
    /// See the [docs](http://www.mongodb.com/docs/manual/reference/object-id/)
    /// for more information.
    pub fn new() -> ObjectId {
        let timestamp = Self::gen_timestamp();
        let counter = Self::gen_count();

        let mut buf = [0u8; 12];
        buf[TIMESTAMP_OFFSET..PROCESS_ID_OFFSET].copy_from_slice(&timestamp);
        buf[PROCESS_ID_OFFSET..COUNTER_OFFSET].copy_from_slice(&*PROCESS_UNIQUE);
        buf[COUNTER_OFFSET..COUNTER_OFFSET + COUNTER_SIZE].copy_from_slice(&counter);

        ObjectId::from_bytes(buf)
    }

    /// Constructs a new ObjectId wrapper around the raw byte representation.
    pub const fn from_bytes(bytes: [u8; 12]) -> ObjectId {
        ObjectId { id: bytes }
    }

    /// Creates an ObjectId from a 24-character hexadecimal string.
    pub fn parse_str(s: impl AsRef<str>) -> Result<ObjectId> {
        let s = s.as_ref();
        let bytes: Vec<u8> = hex::decode(s.as_bytes())
            .map_err(|e| Error::parse(format!("invalid ObjectId hex {s:?}: {e}")))?;
        let id: [u8; 12] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            Error::parse(format!(
                "ObjectId must be 12 bytes, got {} from {s:?}",
                bytes.len()
            ))
        })?;
        Ok(ObjectId::from_bytes(id))
    }

    /// Retrieves the timestamp (in seconds since the epoch) embedded in the ObjectId.
    pub fn timestamp_secs(&self) -> u32 {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&self.id[TIMESTAMP_OFFSET..PROCESS_ID_OFFSET]);
        u32::from_be_bytes(buf)
    }

    /// Returns the raw byte representation of an ObjectId.
    pub const fn bytes(&self) -> [u8; 12] {
        self.id
    }

    /// Convert this [`ObjectId`] to its hex string representation.
    pub fn to_hex(self) -> String {
        hex::encode(self.id)
    }

    // Seconds since the epoch, big-endian so ObjectIds sort by creation time.
    fn gen_timestamp() -> [u8; 4] {
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        (secs as u32).to_be_bytes()
    }

    fn gen_count() -> [u8; 3] {
        let u_counter = OID_COUNTER.fetch_add(1, Ordering::SeqCst);
        let u = u_counter % (MAX_U24 + 1);

        let buf = (u as u32).to_be_bytes();
        [buf[1], buf[2], buf[3]]
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ObjectId").field(&self.to_hex()).finish()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        ObjectId::parse_str(&s).map_err(serde::de::Error::custom)
    }
}
