/// Construct a [`Bson`](crate::Bson) value from a literal, an expression, or nested
/// document/array syntax.
///
/// ```
/// use indexed_bson::{bson, Bson};
///
/// let value = bson!({ "a": [1, "two", null] });
/// assert!(matches!(value, Bson::Document(_)));
/// ```
///
/// Keys and values are written as with [`Document::write`](crate::Document::write); a key
/// containing a nul byte panics.
#[macro_export]
macro_rules! bson {
    (null) => {
        $crate::Bson::Null
    };

    ([]) => {
        $crate::Bson::Document($crate::Document::new_array())
    };

    ([ $($val:tt),* $(,)? ]) => {{
        let mut array = $crate::Document::new_array();
        $(
            array
                .push($crate::bson!($val))
                .expect("bson! array element could not be written");
        )*
        $crate::Bson::Document(array)
    }};

    ({ $($key:literal : $val:tt),* $(,)? }) => {
        $crate::Bson::Document($crate::doc! { $($key: $val),* })
    };

    ($val:expr) => {
        <$crate::Bson as ::std::convert::From<_>>::from($val)
    };
}

/// Construct a [`Document`](crate::Document), writing the fields in the order given.
///
/// ```
/// use indexed_bson::doc;
///
/// let doc = doc! {
///     "name": "Herman Melville",
///     "books": ["Moby-Dick", "Typee"],
///     "born": 1819,
/// };
/// assert_eq!(doc.get_i32("born")?, 1819);
/// assert_eq!(doc.get_array("books")?.get_str("1")?, "Typee");
/// # Ok::<(), indexed_bson::error::Error>(())
/// ```
#[macro_export]
macro_rules! doc {
    () => {{ $crate::Document::new() }};

    ( $($key:literal : $val:tt),* $(,)? ) => {{
        let mut document = $crate::Document::new();
        $(
            document
                .write($key, $crate::bson!($val))
                .expect("doc! field could not be written");
        )*
        document
    }};
}
