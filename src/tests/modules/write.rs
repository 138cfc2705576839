use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use crate::{
    Binary,
    Bson,
    DateTime,
    Decimal128,
    Document,
    error::ErrorKind,
    oid::ObjectId,
    spec::ElementType,
    tests::assert_consistent,
};

/// The storage bytes after the length field.
fn fields(doc: &Document) -> &[u8] {
    &doc.as_bytes()[4..]
}

#[test]
fn int32_append_then_overwrite() {
    let mut doc = Document::new();
    doc.write("x", Bson::Int32(1)).unwrap();
    assert_eq!(fields(&doc), &[0x10, b'x', 0x00, 0x01, 0x00, 0x00, 0x00]);

    let len = doc.as_bytes().len();
    doc.write("x", Bson::Int32(2)).unwrap();
    assert_eq!(fields(&doc), &[0x10, b'x', 0x00, 0x02, 0x00, 0x00, 0x00]);
    assert_eq!(doc.as_bytes().len(), len);
    assert_consistent(&doc);
}

#[test]
fn string_overwrite_rewrites_prefix() {
    let mut doc = Document::new();
    doc.write("s", "hi").unwrap();
    assert_eq!(
        fields(&doc),
        &[0x02, b's', 0x00, 0x03, 0x00, 0x00, 0x00, b'h', b'i', 0x00]
    );

    let len = doc.as_bytes().len();
    doc.write("s", "longer").unwrap();
    assert_eq!(
        fields(&doc),
        &[0x02, b's', 0x00, 0x07, 0x00, 0x00, 0x00, b'l', b'o', b'n', b'g', b'e', b'r', 0x00]
    );
    assert_eq!(doc.as_bytes().len(), len + 4);
    assert_eq!(doc.dimensions("s").unwrap().value_len, 11);
    assert_consistent(&doc);
}

#[test]
fn equal_length_overwrite_is_idempotent() {
    let mut doc = Document::new();
    doc.write("a", 1_i32).unwrap();
    doc.write("n", 42_i64).unwrap();
    doc.write("z", "tail").unwrap();
    let before = doc.as_bytes().to_vec();

    doc.write("n", 42_i64).unwrap();
    assert_eq!(doc.as_bytes(), before.as_slice());
    assert_consistent(&doc);
}

#[test]
fn longer_overwrite_shifts_following_fields() {
    let mut doc = Document::new();
    doc.write("a", "x").unwrap();
    doc.write("b", "a much longer string value").unwrap();
    doc.write("c", 3_i32).unwrap();

    let b_before = doc.dimensions("b").unwrap();
    doc.write("a", "now somewhat longer").unwrap();
    let b_after = doc.dimensions("b").unwrap();

    assert_eq!(b_after.from, b_before.from + 18);
    assert_eq!(b_after.value_len, b_before.value_len);
    assert_eq!(doc.get_str("b").unwrap(), "a much longer string value");
    assert_eq!(doc.get_i32("c").unwrap(), 3);
    assert_consistent(&doc);
}

#[test]
fn shorter_overwrite_shifts_following_fields_back() {
    let mut doc = Document::new();
    doc.write("a", "quite a long value").unwrap();
    doc.write("b", true).unwrap();

    doc.write("a", "").unwrap();
    assert_eq!(doc.get_str("a").unwrap(), "");
    assert!(doc.get_bool("b").unwrap());
    assert_consistent(&doc);
}

#[test]
fn overwrite_with_different_type_rewrites_tag() {
    let mut doc = Document::new();
    doc.write("v", 5_i32).unwrap();
    doc.write("after", 1.5).unwrap();

    doc.write("v", "five").unwrap();
    let dimensions = doc.dimensions("v").unwrap();
    assert_eq!(dimensions.element_type, ElementType::String);
    assert_eq!(doc.as_bytes()[dimensions.from], ElementType::String as u8);
    assert_eq!(doc.get_str("v").unwrap(), "five");
    assert_eq!(doc.get_f64("after").unwrap(), 1.5);
    assert_consistent(&doc);

    doc.write("v", Bson::Null).unwrap();
    assert_eq!(doc.get("v").unwrap(), Some(Bson::Null));
    assert_eq!(doc.dimensions("v").unwrap().value_len, 0);
    assert_consistent(&doc);

    let reparsed = Document::from_bytes(doc.to_bytes().unwrap()).unwrap();
    assert_eq!(reparsed, doc);
}

#[test]
fn zero_length_markers() {
    let mut doc = Document::new();
    doc.write("null", Bson::Null).unwrap();
    doc.write("min", Bson::MinKey).unwrap();
    doc.write("max", Bson::MaxKey).unwrap();
    assert_eq!(
        fields(&doc),
        &[0x0A, b'n', b'u', b'l', b'l', 0, 0xFF, b'm', b'i', b'n', 0, 0x7F, b'm', b'a', b'x', 0]
    );

    doc.write("min", Bson::MinKey).unwrap();
    assert_eq!(doc.get("min").unwrap(), Some(Bson::MinKey));
    assert_eq!(doc.get("max").unwrap(), Some(Bson::MaxKey));
    assert_consistent(&doc);
}

#[test]
fn every_variant_round_trips() {
    let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
    let mut nested = Document::new();
    nested.write("inner", 1_i32).unwrap();
    let mut array = Document::new_array();
    array.push("zero").unwrap();
    array.push(1_i64).unwrap();

    let values = vec![
        ("double", Bson::Double(-12.25)),
        ("string", Bson::String("héllo".to_owned())),
        ("document", Bson::Document(nested)),
        ("array", Bson::Document(array)),
        ("binary", Bson::Binary(Binary::generic(vec![0, 1, 2, 255]))),
        ("oid", Bson::ObjectId(oid)),
        ("true", Bson::Boolean(true)),
        ("date", Bson::DateTime(DateTime::from_millis(-1_000))),
        ("null", Bson::Null),
        ("i32", Bson::Int32(i32::MIN)),
        ("i64", Bson::Int64(i64::MAX)),
        ("decimal", Bson::Decimal128(Decimal128::from_bytes([7; 16]))),
        ("max", Bson::MaxKey),
        ("min", Bson::MinKey),
    ];

    let mut doc = Document::new();
    for (key, value) in &values {
        doc.write(*key, value.clone()).unwrap();
    }
    assert_consistent(&doc);

    let decoded = Document::from_bytes(doc.into_bytes().unwrap()).unwrap();
    for (key, value) in &values {
        assert_eq!(decoded.get(key).unwrap().as_ref(), Some(value), "key {key}");
    }
    assert_eq!(
        decoded.dimensions("array").unwrap().element_type,
        ElementType::Array
    );
    assert!(decoded.get_array("array").unwrap().is_array());
}

#[test]
fn nul_in_key_is_rejected_without_mutation() {
    let mut doc = Document::new();
    doc.write("ok", 1_i32).unwrap();
    doc.finalize().unwrap();
    let before = doc.as_bytes().to_vec();

    let err = doc.write("bad\0key", 2_i32).unwrap_err();
    assert_matches!(err.kind, ErrorKind::InvalidKey { .. });
    assert_eq!(err.key.as_deref(), Some("bad\0key"));
    assert_eq!(doc.as_bytes(), before.as_slice());
    assert!(doc.is_null_terminated());
    assert_eq!(doc.len(), 1);
}

#[test]
fn empty_key_is_allowed() {
    let mut doc = Document::new();
    doc.write("", 0_i32).unwrap();
    assert!(doc.contains_key(""));
    assert_eq!(fields(&doc), &[0x10, 0x00, 0, 0, 0, 0]);
    assert_eq!(doc.dimensions("").unwrap().key_len, 1);
}

#[test]
fn write_strips_terminator() {
    let mut doc = Document::new();
    assert!(doc.is_null_terminated());
    assert_eq!(doc.as_bytes(), &[5, 0, 0, 0, 0]);

    doc.write("k", false).unwrap();
    assert!(!doc.is_null_terminated());
    assert_eq!(doc.as_bytes(), &[5, 0, 0, 0, 0x08, b'k', 0, 0]);

    doc.finalize().unwrap();
    assert!(doc.is_null_terminated());
    assert_eq!(doc.as_bytes(), &[9, 0, 0, 0, 0x08, b'k', 0, 0, 0]);
}

#[test]
fn embedded_document_is_finalized_when_written() {
    let mut inner = Document::new();
    inner.write("a", 1_i32).unwrap();
    assert!(!inner.is_null_terminated());

    let mut outer = Document::new();
    outer.write("inner", inner.clone()).unwrap();
    let dimensions = outer.dimensions("inner").unwrap();
    assert_eq!(dimensions.element_type, ElementType::EmbeddedDocument);
    assert_eq!(dimensions.value_len, 12);

    let value_start = dimensions.value_start();
    assert_eq!(
        &outer.as_bytes()[value_start..dimensions.end()],
        inner.to_bytes().unwrap().as_slice()
    );
    assert_eq!(outer.get_document("inner").unwrap(), inner);
}
