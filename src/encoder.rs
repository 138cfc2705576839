//! Byte-level encoding of keys and value bodies.

use crate::{
    bson::Bson,
    error::{Error, Result},
    spec::BinarySubtype,
};

/// The largest length a BSON length field can describe.
pub(crate) const MAX_BSON_SIZE: usize = i32::MAX as usize;

/// Rejects keys that cannot be written as a BSON cstring.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.as_bytes().contains(&0) {
        return Err(Error::invalid_key(format!(
            "cstring with interior null: {key:?}"
        )));
    }
    Ok(())
}

/// Encodes a length as the 4-byte little-endian field used by strings, binaries and documents.
pub(crate) fn length_field(len: usize) -> Result<[u8; 4]> {
    if len > MAX_BSON_SIZE {
        return Err(Error::too_large(len));
    }
    Ok((len as i32).to_le_bytes())
}

fn write_string(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    buf.extend(length_field(s.len() + 1)?);
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
    Ok(())
}

fn write_binary(buf: &mut Vec<u8>, bytes: &[u8], subtype: BinarySubtype) -> Result<()> {
    if let BinarySubtype::BinaryOld = subtype {
        buf.extend(length_field(bytes.len() + 4)?);
        buf.push(subtype.into());
        buf.extend(length_field(bytes.len())?);
    } else {
        buf.extend(length_field(bytes.len())?);
        buf.push(subtype.into());
    }
    buf.extend_from_slice(bytes);
    Ok(())
}

/// Appends the value body of `value` to `buf`: the length prefix, if the layout has one, followed
/// by the payload. Returns the number of bytes written.
pub(crate) fn write_value(buf: &mut Vec<u8>, value: &Bson) -> Result<usize> {
    let start = buf.len();
    match value {
        Bson::Double(d) => buf.extend(d.to_le_bytes()),
        Bson::String(s) => write_string(buf, s)?,
        Bson::Document(doc) => doc.encode_to(buf)?,
        Bson::Binary(b) => write_binary(buf, &b.bytes, b.subtype)?,
        Bson::ObjectId(oid) => buf.extend(oid.bytes()),
        Bson::Boolean(b) => buf.push(*b as u8),
        Bson::DateTime(dt) => buf.extend(dt.timestamp_millis().to_le_bytes()),
        Bson::Int32(i) => buf.extend(i.to_le_bytes()),
        Bson::Int64(i) => buf.extend(i.to_le_bytes()),
        Bson::Decimal128(d) => buf.extend(d.bytes()),
        Bson::Null | Bson::MaxKey | Bson::MinKey => {}
    }
    Ok(buf.len() - start)
}
