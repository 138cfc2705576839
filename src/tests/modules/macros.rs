use crate::{Binary, Bson, Document, bson, doc, spec::ElementType};

#[test]
fn nested_literals() {
    let doc = doc! {
        "float": 2.4,
        "string": "hello",
        "array": ["testing", 1, [true]],
        "doc": {
            "fish": "in",
            "!": 1,
        },
        "null": null,
        "with_wrapped_parens": (-20),
        "binary": (Binary::generic(b"thingies".to_vec())),
    };

    assert_eq!(doc.len(), 7);
    assert_eq!(doc.get_f64("float").unwrap(), 2.4);
    let array = doc.get_array("array").unwrap();
    assert_eq!(array.len(), 3);
    assert_eq!(
        array.dimensions("2").unwrap().element_type,
        ElementType::Array
    );
    assert_eq!(doc.get_document("doc").unwrap().get_i32("!").unwrap(), 1);
    assert_eq!(doc.get("null").unwrap(), Some(Bson::Null));
    assert_eq!(doc.get_i32("with_wrapped_parens").unwrap(), -20);
    assert_eq!(doc.get_binary("binary").unwrap().bytes, b"thingies");
}

#[test]
fn empty_forms() {
    assert_eq!(doc! {}, Document::new());
    assert_eq!(bson!([]), Bson::Document(Document::new_array()));
    assert_eq!(bson!({}), Bson::Document(Document::new()));
    assert_eq!(bson!(null), Bson::Null);
    assert_eq!(bson!("x"), Bson::String("x".to_owned()));
}
