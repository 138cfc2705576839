use std::fmt::{self, Display};

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{
    error::{Error, Result},
    spec::BinarySubtype,
};

/// Represents a BSON binary value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    /// The subtype of the bytes.
    pub subtype: BinarySubtype,

    /// The binary bytes.
    pub bytes: Vec<u8>,
}

impl Display for Binary {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "Binary({:#x}, {})",
            u8::from(self.subtype),
            STANDARD.encode(&self.bytes)
        )
    }
}

impl Binary {
    /// Creates a generic [`Binary`] from raw bytes.
    pub fn generic(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            subtype: BinarySubtype::Generic,
            bytes: bytes.into(),
        }
    }

    /// Creates a [`Binary`] from a base64 string and optional [`BinarySubtype`]. If the
    /// `subtype` argument is [`None`], the [`Binary`] constructed will default to
    /// [`BinarySubtype::Generic`].
    ///
    /// ```rust
    /// # use indexed_bson::Binary;
    /// let binary = Binary::from_base64("aGVsbG8=", None)?;
    /// assert_eq!(binary.bytes, b"hello");
    /// # Ok::<(), indexed_bson::error::Error>(())
    /// ```
    pub fn from_base64(
        input: impl AsRef<str>,
        subtype: impl Into<Option<BinarySubtype>>,
    ) -> Result<Self> {
        let bytes = STANDARD.decode(input.as_ref()).map_err(Error::parse)?;
        let subtype = subtype.into().unwrap_or(BinarySubtype::Generic);
        Ok(Binary { subtype, bytes })
    }
}

#[cfg(feature = "uuid-1")]
impl From<uuid::Uuid> for Binary {
    fn from(uuid: uuid::Uuid) -> Self {
        Self {
            subtype: BinarySubtype::Uuid,
            bytes: uuid.as_bytes().to_vec(),
        }
    }
}
