use pretty_assertions::assert_eq;

use crate::{
    Bson,
    DateTime,
    Document,
    doc,
    oid::ObjectId,
    spec::ElementType,
    tests::assert_consistent,
};

#[test]
fn ordered_write() {
    let mut doc = Document::new();
    doc.write("first", Bson::Int32(1)).unwrap();
    doc.write("second", Bson::String("foo".to_owned())).unwrap();
    doc.write("alphanumeric", "bar".to_owned()).unwrap();
    doc.write("first", 10_i32).unwrap();

    let keys: Vec<_> = doc.keys().collect();
    assert_eq!(keys, vec!["first", "second", "alphanumeric"]);
    assert_eq!(doc.len(), 3);
}

#[test]
fn test_getters() {
    let datetime = DateTime::now();
    let oid = ObjectId::new();
    let doc = doc! {
        "floating_point": 10.0,
        "string": "a value",
        "array": [10, 20, 30],
        "doc": { "key": 1 },
        "bool": true,
        "i32": 1_i32,
        "i64": 1_i64,
        "datetime": datetime,
        "oid": oid,
    };

    assert_eq!(doc.get("nonsense").unwrap(), None);
    assert!(doc.get_str("nonsense").unwrap_err().is_value_access_not_present());
    assert!(doc
        .get_str("floating_point")
        .unwrap_err()
        .is_value_access_unexpected_type());

    assert_eq!(doc.get_f64("floating_point").unwrap(), 10.0);
    assert_eq!(doc.get_str("string").unwrap(), "a value");
    assert_eq!(doc.get_array("array").unwrap().get_i32("2").unwrap(), 30);
    assert_eq!(doc.get_document("doc").unwrap().get_i32("key").unwrap(), 1);
    assert!(doc.get_document("array").is_err());
    assert!(doc.get_bool("bool").unwrap());
    assert_eq!(doc.get_i32("i32").unwrap(), 1);
    assert_eq!(doc.get_i64("i64").unwrap(), 1);
    assert_eq!(doc.get_datetime("datetime").unwrap(), datetime);
    assert_eq!(doc.get_object_id("oid").unwrap(), oid);
}

#[test]
fn remove_shifts_following_fields() {
    let mut doc = doc! {
        "a": 1_i32,
        "b": "removed",
        "c": 3_i64,
        "d": "last",
    };

    let removed = doc.remove("b").unwrap();
    assert_eq!(removed, Some(Bson::String("removed".to_owned())));
    assert_eq!(doc.remove("b").unwrap(), None);

    assert_consistent(&doc);
    assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["a", "c", "d"]);
    assert_eq!(doc.get_i64("c").unwrap(), 3);
    assert_eq!(doc.get_str("d").unwrap(), "last");

    let expected = doc! { "a": 1_i32, "c": 3_i64, "d": "last" };
    assert_eq!(doc.to_bytes().unwrap(), expected.to_bytes().unwrap());

    doc.write("b", "back").unwrap();
    assert_eq!(doc.keys().last(), Some("b"));
    assert_consistent(&doc);
}

#[test]
fn push_uses_positions_as_keys() {
    let mut array = Document::new_array();
    array.push("a").unwrap();
    array.push(2_i32).unwrap();
    array.push(Bson::Null).unwrap();

    assert!(array.is_array());
    assert_eq!(array.keys().collect::<Vec<_>>(), vec!["0", "1", "2"]);

    let mut doc = Document::new();
    doc.write("list", array).unwrap();
    assert_eq!(
        doc.dimensions("list").unwrap().element_type,
        ElementType::Array
    );
}

#[test]
fn push_after_remove_keeps_existing_elements() {
    let mut array = Document::new_array();
    array.push("a").unwrap();
    array.push("b").unwrap();
    assert_eq!(array.remove("0").unwrap(), Some(Bson::String("a".into())));

    array.push("c").unwrap();
    assert_eq!(array.len(), 2);
    assert_eq!(array.keys().collect::<Vec<_>>(), vec!["1", "2"]);
    assert_eq!(array.get_str("1").unwrap(), "b");
    assert_eq!(array.get_str("2").unwrap(), "c");
    assert_consistent(&array);

    let mut decoded = Document::decode(array.into_bytes().unwrap(), true).unwrap();
    decoded.push("d").unwrap();
    assert_eq!(decoded.keys().collect::<Vec<_>>(), vec!["1", "2", "3"]);
}

#[test]
fn finalize_and_copies() {
    let mut doc = Document::new();
    doc.write("a", 1_i32).unwrap();

    let copy = doc.to_bytes().unwrap();
    assert!(!doc.is_null_terminated());
    assert_eq!(copy, b"\x0c\x00\x00\x00\x10a\x00\x01\x00\x00\x00\x00");

    doc.finalize().unwrap();
    assert_eq!(doc.as_bytes(), copy.as_slice());

    // finalizing twice changes nothing
    doc.finalize().unwrap();
    assert_eq!(doc.as_bytes(), copy.as_slice());
    assert_eq!(doc.into_bytes().unwrap(), copy);
}

#[test]
fn from_bytes_then_write() {
    let original = doc! { "name": "bson", "year": 2009 };
    let mut doc = Document::from_bytes(original.to_bytes().unwrap()).unwrap();
    assert!(doc.is_null_terminated());

    doc.write("name", "indexed bson").unwrap();
    doc.write("stars", 5_i64).unwrap();
    assert_consistent(&doc);

    let expected = doc! { "name": "indexed bson", "year": 2009, "stars": 5_i64 };
    assert_eq!(doc.into_bytes().unwrap(), expected.to_bytes().unwrap());
}

#[test]
fn equality_ignores_terminator_state() {
    let mut a = doc! { "x": 1 };
    let b = doc! { "x": 1 };
    a.finalize().unwrap();
    assert!(a.is_null_terminated());
    assert!(!b.is_null_terminated());
    assert_eq!(a, b);

    let mut c = Document::new_array();
    c.write("x", 1).unwrap();
    assert_ne!(a, c);
}

#[test]
fn display() {
    let doc = doc! {
        "string": "hello",
        "array": ["testing", 1],
        "doc": { "fish": "in", "a": "barrel" },
        "bool": true,
        "null": null,
        "i64": (-55_i64),
    };

    assert_eq!(
        doc.to_string(),
        "{ \"string\": \"hello\", \"array\": [ \"testing\", 1 ], \"doc\": { \"fish\": \"in\", \
         \"a\": \"barrel\" }, \"bool\": true, \"null\": null, \"i64\": -55 }"
    );
    assert_eq!(Document::new().to_string(), "{}");
    assert_eq!(Document::new_array().to_string(), "[]");
}

#[test]
fn debug_shows_hex() {
    let doc = doc! { "x": 1 };
    let debug = format!("{doc:?}");
    assert!(debug.contains("05000000107800010000"), "{debug}");
}
