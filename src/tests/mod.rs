
use crate::Document;

/// Checks that every cached field describes exactly the bytes in storage and that the fields tile
/// the body of the document with no gaps.
pub(crate) fn assert_consistent(doc: &Document) {
    let data = doc.as_bytes();
    let body_end = data.len() - usize::from(doc.is_null_terminated());
    let mut expected_from = 4;

    for (key, dimensions) in doc.cache().iter() {
        assert_eq!(dimensions.from, expected_from, "field {key:?} is not contiguous");
        assert!(dimensions.end() <= body_end, "field {key:?} overruns storage");
        assert_eq!(data[dimensions.from], dimensions.element_type as u8);
        assert_eq!(
            &data[dimensions.from + 1..dimensions.value_start()],
            [key.as_bytes(), &[0u8][..]].concat().as_slice()
        );
        expected_from = dimensions.end();
    }
    assert_eq!(expected_from, body_end);
}
