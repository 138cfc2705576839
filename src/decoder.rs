//! Decoding of wire bytes: building a [`DocumentCache`] from an existing buffer and reading a
//! single value back out at its cached [`Dimensions`].

use crate::{
    Binary,
    DateTime,
    Decimal128,
    Document,
    bson::Bson,
    cache::{Dimensions, DocumentCache},
    error::{Error, Result},
    oid::ObjectId,
    spec::{BinarySubtype, ElementType, Layout},
};

/// The smallest complete document: a length field and a terminator.
pub(crate) const MIN_BSON_DOCUMENT_SIZE: i32 = 4 + 1;

fn read_le_i32(bytes: &[u8], at: usize) -> Result<i32> {
    let field: [u8; 4] = read_array(bytes, at)?;
    Ok(i32::from_le_bytes(field))
}

fn read_array<const N: usize>(bytes: &[u8], at: usize) -> Result<[u8; N]> {
    at.checked_add(N)
        .and_then(|end| bytes.get(at..end))
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            Error::malformed_bytes(format!("expected {N} bytes at offset {at}, buffer ends first"))
        })
}

fn try_to_str(bytes: &[u8]) -> Result<&str> {
    simdutf8::basic::from_utf8(bytes).map_err(|_| Error::malformed_bytes("invalid UTF-8"))
}

/// Checks the framing of a complete document: the length field matches the buffer and the last
/// byte is the terminator.
pub(crate) fn check_frame(data: &[u8]) -> Result<()> {
    if data.len() < MIN_BSON_DOCUMENT_SIZE as usize {
        return Err(Error::malformed_bytes(format!(
            "document too short: {} bytes",
            data.len()
        )));
    }
    let length = read_le_i32(data, 0)?;
    if usize::try_from(length).ok() != Some(data.len()) {
        return Err(Error::malformed_bytes(format!(
            "length field {length} does not match buffer length {}",
            data.len()
        )));
    }
    if data[data.len() - 1] != 0 {
        return Err(Error::malformed_bytes("document not null-terminated"));
    }
    Ok(())
}

/// Walks every element of a complete document, checking each value decodes, and records where
/// each one lives.
pub(crate) fn index_document(data: &[u8]) -> Result<DocumentCache> {
    check_frame(data)?;

    let end = data.len() - 1;
    let mut cache = DocumentCache::new();
    let mut offset = 4;
    while offset < end {
        let from = offset;
        let tag = data[from];
        let element_type = ElementType::from(tag).ok_or_else(|| {
            Error::malformed_bytes(format!("unsupported element type {tag:#04x} at offset {from}"))
        })?;

        let key_start = from + 1;
        let key_nul = data[key_start..end]
            .iter()
            .position(|b| *b == 0)
            .map(|p| key_start + p)
            .ok_or_else(|| Error::malformed_bytes("key not null-terminated"))?;
        let key = try_to_str(&data[key_start..key_nul])?;
        let key_len = key_nul - key_start + 1;

        let value_start = key_nul + 1;
        let value_len = value_body_len(data, element_type, value_start).map_err(|e| e.with_key(key))?;
        let field_end = value_start
            .checked_add(value_len)
            .filter(|field_end| *field_end <= end)
            .ok_or_else(|| {
                Error::malformed_bytes(format!("value of {value_len} bytes overruns document"))
                    .with_key(key)
            })?;

        if cache.contains_key(key) {
            return Err(Error::malformed_bytes("duplicate key").with_key(key));
        }
        let dimensions = Dimensions {
            element_type,
            from,
            key_len,
            value_len,
        };
        read_value(data, &dimensions).map_err(|e| e.with_key(key))?;
        cache.insert(key, dimensions);
        offset = field_end;
    }

    tracing::debug!(fields = cache.len(), bytes = data.len(), "indexed document");
    Ok(cache)
}

fn value_body_len(data: &[u8], element_type: ElementType, value_start: usize) -> Result<usize> {
    let len = match element_type.layout() {
        Layout::Fixed(width) => return Ok(width),
        Layout::Marker => return Ok(0),
        Layout::LengthPrefixed => {
            let length = read_le_i32(data, value_start)?;
            match element_type {
                ElementType::String if length >= 1 => 4 + length as usize,
                ElementType::Binary if length >= 0 => 4 + 1 + length as usize,
                _ => {
                    return Err(Error::malformed_bytes(format!(
                        "invalid length {length} for {element_type:?}"
                    )));
                }
            }
        }
        Layout::Nested => {
            let length = read_le_i32(data, value_start)?;
            if length < MIN_BSON_DOCUMENT_SIZE {
                return Err(Error::malformed_bytes(format!(
                    "nested document length {length} too small"
                )));
            }
            length as usize
        }
    };
    Ok(len)
}

/// Reads the value described by `dimensions` out of `data`.
pub(crate) fn read_value(data: &[u8], dimensions: &Dimensions) -> Result<Bson> {
    let value = data
        .get(dimensions.value_start()..dimensions.end())
        .ok_or_else(|| {
            Error::out_of_bounds(dimensions.value_start(), dimensions.value_len, data.len())
        })?;

    let bson = match dimensions.element_type {
        ElementType::Double => Bson::Double(f64::from_le_bytes(read_array(value, 0)?)),
        ElementType::String => Bson::String(read_string(value)?.to_owned()),
        ElementType::EmbeddedDocument => {
            Bson::Document(Document::decode(value.to_vec(), false)?)
        }
        ElementType::Array => Bson::Document(Document::decode(value.to_vec(), true)?),
        ElementType::Binary => Bson::Binary(read_binary(value)?),
        ElementType::ObjectId => Bson::ObjectId(ObjectId::from_bytes(read_array(value, 0)?)),
        ElementType::Boolean => match value {
            [0] => Bson::Boolean(false),
            [1] => Bson::Boolean(true),
            _ => return Err(Error::malformed_bytes("boolean must be 0 or 1")),
        },
        ElementType::DateTime => {
            Bson::DateTime(DateTime::from_millis(i64::from_le_bytes(read_array(value, 0)?)))
        }
        ElementType::Null => Bson::Null,
        ElementType::Int32 => Bson::Int32(i32::from_le_bytes(read_array(value, 0)?)),
        ElementType::Int64 => Bson::Int64(i64::from_le_bytes(read_array(value, 0)?)),
        ElementType::Decimal128 => Bson::Decimal128(Decimal128::from_bytes(read_array(value, 0)?)),
        ElementType::MaxKey => Bson::MaxKey,
        ElementType::MinKey => Bson::MinKey,
    };
    Ok(bson)
}

fn read_string(value: &[u8]) -> Result<&str> {
    let length = read_le_i32(value, 0)?;
    if length < 1 || value.len() != 4 + length as usize {
        return Err(Error::malformed_bytes(format!("invalid string length {length}")));
    }
    match value.split_last() {
        Some((0, text)) => try_to_str(&text[4..]),
        _ => Err(Error::malformed_bytes("string not null-terminated")),
    }
}

fn read_binary(value: &[u8]) -> Result<Binary> {
    let length = read_le_i32(value, 0)?;
    let subtype = BinarySubtype::from(read_array::<1>(value, 4)?[0]);
    let bytes = &value[5..];
    if bytes.len() as i64 != length as i64 {
        return Err(Error::malformed_bytes(format!("invalid binary length {length}")));
    }

    let bytes = if let BinarySubtype::BinaryOld = subtype {
        let inner = read_le_i32(bytes, 0)?;
        if inner as i64 != length as i64 - 4 {
            return Err(Error::malformed_bytes(format!(
                "old binary inner length {inner} does not match outer length {length}"
            )));
        }
        &bytes[4..]
    } else {
        bytes
    };

    Ok(Binary {
        subtype,
        bytes: bytes.to_vec(),
    })
}
