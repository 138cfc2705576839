//! A BSON document held as its wire bytes, with a per-key index into them.

use std::fmt::{self, Debug, Display, Formatter};

use crate::{
    Binary,
    DateTime,
    bson::Bson,
    cache::{Dimensions, DocumentCache},
    decoder::{self, MIN_BSON_DOCUMENT_SIZE},
    encoder::{self, MAX_BSON_SIZE},
    error::{Error, Result},
    oid::ObjectId,
    spec::ElementType,
    storage::Storage,
};

/// A BSON document stored as a single contiguous buffer of wire bytes.
///
/// The buffer is the document: writes either overwrite a field's value in place or append a new
/// field to the end, and a [`DocumentCache`] remembers where every top-level key lives so neither
/// requires rescanning from the start.
///
/// Writing strips the trailing terminator and leaves the leading length field stale; call
/// [`Document::finalize`] (or use [`Document::to_bytes`]/[`Document::into_bytes`]) before handing
/// the bytes to anything that expects a complete document.
///
/// ```
/// use indexed_bson::Document;
///
/// let mut doc = Document::new();
/// doc.write("x", 1_i32)?;
/// doc.write("x", 2_i32)?;
/// assert_eq!(doc.get_i32("x")?, 2);
///
/// assert_eq!(doc.into_bytes()?, b"\x0c\x00\x00\x00\x10x\x00\x02\x00\x00\x00\x00");
/// # Ok::<(), indexed_bson::error::Error>(())
/// ```
#[derive(Clone)]
pub struct Document {
    storage: Storage,
    cache: DocumentCache,
    is_array: bool,
    null_terminated: bool,
    next_index: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::with_capacity(MIN_BSON_DOCUMENT_SIZE as usize)
    }

    /// Creates an empty array. Arrays are documents whose keys are the element positions; they
    /// only differ in the type tag used when they are embedded in another document.
    pub fn new_array() -> Self {
        let mut doc = Self::new();
        doc.is_array = true;
        doc
    }

    /// Creates an empty document whose storage can hold `capacity` bytes before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut storage = Storage::with_capacity(capacity.max(MIN_BSON_DOCUMENT_SIZE as usize));
        storage.append(&MIN_BSON_DOCUMENT_SIZE.to_le_bytes());
        storage.push(0);
        Self {
            storage,
            cache: DocumentCache::new(),
            is_array: false,
            null_terminated: true,
            next_index: 0,
        }
    }

    /// Takes ownership of a complete encoded document and indexes its top-level fields.
    ///
    /// ```
    /// use indexed_bson::Document;
    ///
    /// let doc = Document::from_bytes(b"\x13\x00\x00\x00\x02hi\x00\x06\x00\x00\x00y'all\x00\x00".to_vec())?;
    /// assert_eq!(doc.get_str("hi")?, "y'all");
    /// # Ok::<(), indexed_bson::error::Error>(())
    /// ```
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::decode(data, false)
    }

    pub(crate) fn decode(data: Vec<u8>, is_array: bool) -> Result<Self> {
        let cache = decoder::index_document(&data)?;
        let next_index = cache.len();
        Ok(Self {
            storage: Storage::from(data),
            cache,
            is_array,
            null_terminated: true,
            next_index,
        })
    }

    /// Whether this document is written with the array type tag when embedded.
    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// Whether the storage currently ends with the document terminator.
    pub fn is_null_terminated(&self) -> bool {
        self.null_terminated
    }

    /// The storage as it currently is. The length field and terminator are only accurate after
    /// [`Document::finalize`].
    pub fn as_bytes(&self) -> &[u8] {
        self.storage.as_bytes()
    }

    /// The index of top-level fields.
    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    /// Where the field for `key` currently lives in the storage.
    pub fn dimensions(&self, key: impl AsRef<str>) -> Option<Dimensions> {
        self.cache.lookup(key.as_ref())
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Whether a field named `key` exists.
    pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
        self.cache.contains_key(key.as_ref())
    }

    /// The keys, in the order their fields appear in the buffer.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cache.iter().map(|(key, _)| key)
    }

    /// Decodes every field in buffer order.
    pub fn iter(&self) -> impl Iterator<Item = Result<(&str, Bson)>> {
        let data = self.storage.as_bytes();
        self.cache.iter().map(move |(key, dimensions)| {
            decoder::read_value(data, dimensions)
                .map(|value| (key, value))
                .map_err(|e| e.with_key(key))
        })
    }

    /// Writes `value` under `key`.
    ///
    /// If `key` already exists its value bytes are replaced in place (and its type tag rewritten
    /// if the type changed), moving every later field by the change in length. Otherwise a new
    /// field is appended. Nothing is modified if an error is returned.
    pub fn write(&mut self, key: impl AsRef<str>, value: impl Into<Bson>) -> Result<()> {
        let key = key.as_ref();
        let value = value.into();

        encoder::validate_key(key).map_err(|e| e.with_key(key))?;
        let element_type = value.element_type();
        let mut body = Vec::new();
        encoder::write_value(&mut body, &value).map_err(|e| e.with_key(key))?;

        let existing = self.cache.lookup(key);
        let body_len = self.storage.len() - usize::from(self.null_terminated);
        let projected = match existing {
            Some(dimensions) => body_len - dimensions.value_len + body.len(),
            None => body_len + 1 + key.len() + 1 + body.len(),
        } + 1;
        if projected > MAX_BSON_SIZE {
            return Err(Error::too_large(projected).with_key(key));
        }

        self.strip_terminator()?;
        match existing {
            Some(dimensions) => self.overwrite(key, dimensions, element_type, &body),
            None => {
                self.append(key, element_type, &body);
                Ok(())
            }
        }
    }

    /// Appends `value` with the next position as its key, for use with arrays.
    ///
    /// Positions are never reused: after a [`Document::remove`] the next push still goes past
    /// every position handed out so far.
    pub fn push(&mut self, value: impl Into<Bson>) -> Result<()> {
        let mut index = self.next_index.max(self.cache.len());
        while self.cache.contains_key(&index.to_string()) {
            index += 1;
        }
        self.write(index.to_string(), value)?;
        self.next_index = index + 1;
        Ok(())
    }

    /// Removes the field for `key`, returning its value. Later fields move down by the removed
    /// field's length.
    pub fn remove(&mut self, key: impl AsRef<str>) -> Result<Option<Bson>> {
        let key = key.as_ref();
        let Some(dimensions) = self.cache.lookup(key) else {
            return Ok(None);
        };
        let value =
            decoder::read_value(self.storage.as_bytes(), &dimensions).map_err(|e| e.with_key(key))?;

        self.strip_terminator()?;
        self.storage
            .truncate_from(dimensions.from, dimensions.field_len())?;
        self.cache.remove(key);
        self.cache
            .shift_following(dimensions.from, -(dimensions.field_len() as isize));

        tracing::trace!(key, removed = dimensions.field_len(), "removed field");
        Ok(Some(value))
    }

    /// Restores the terminator and rewrites the leading length field so the storage is a complete
    /// document again.
    pub fn finalize(&mut self) -> Result<()> {
        if !self.null_terminated {
            self.storage.push(0);
            self.null_terminated = true;
        }
        let length = encoder::length_field(self.storage.len())?;
        self.storage.replace_range(0, 4, &length)?;

        tracing::debug!(bytes = self.storage.len(), "finalized document");
        Ok(())
    }

    /// A complete encoded copy of this document, leaving `self` untouched.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_to(&mut buf)?;
        Ok(buf)
    }

    /// Finalizes the document and returns its storage.
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        self.finalize()?;
        Ok(self.storage.into_vec())
    }

    /// Appends the complete encoding of this document to `buf`.
    pub(crate) fn encode_to(&self, buf: &mut Vec<u8>) -> Result<()> {
        buf.extend(encoder::length_field(self.encoded_len())?);
        buf.extend_from_slice(self.fields());
        buf.push(0);
        Ok(())
    }

    /// Gets the value for `key`, or [`None`] if the key is absent.
    pub fn get(&self, key: impl AsRef<str>) -> Result<Option<Bson>> {
        let key = key.as_ref();
        self.cache
            .lookup(key)
            .map(|dimensions| {
                decoder::read_value(self.storage.as_bytes(), &dimensions)
                    .map_err(|e| e.with_key(key))
            })
            .transpose()
    }

    fn get_with<T>(
        &self,
        key: impl AsRef<str>,
        expected: ElementType,
        f: impl FnOnce(Bson) -> Option<T>,
    ) -> Result<T> {
        let key = key.as_ref();
        let dimensions = self
            .cache
            .lookup(key)
            .ok_or_else(|| Error::value_access_not_present().with_key(key))?;
        if dimensions.element_type != expected {
            return Err(
                Error::value_access_unexpected_type(dimensions.element_type, expected)
                    .with_key(key),
            );
        }
        let value = decoder::read_value(self.storage.as_bytes(), &dimensions)
            .map_err(|e| e.with_key(key))?;
        f(value).ok_or_else(|| {
            Error::value_access_unexpected_type(dimensions.element_type, expected).with_key(key)
        })
    }

    /// Gets the floating point value for `key`, or an error if it is absent or not a double.
    pub fn get_f64(&self, key: impl AsRef<str>) -> Result<f64> {
        self.get_with(key, ElementType::Double, |b| b.as_f64())
    }

    /// Gets the string value for `key`, or an error if it is absent or not a string.
    pub fn get_str(&self, key: impl AsRef<str>) -> Result<String> {
        self.get_with(key, ElementType::String, |b| match b {
            Bson::String(s) => Some(s),
            _ => None,
        })
    }

    /// Gets the embedded document for `key`, or an error if it is absent or not a document.
    pub fn get_document(&self, key: impl AsRef<str>) -> Result<Document> {
        self.get_with(key, ElementType::EmbeddedDocument, into_document)
    }

    /// Gets the array for `key`, or an error if it is absent or not an array.
    pub fn get_array(&self, key: impl AsRef<str>) -> Result<Document> {
        self.get_with(key, ElementType::Array, into_document)
    }

    /// Gets the binary value for `key`, or an error if it is absent or not binary.
    pub fn get_binary(&self, key: impl AsRef<str>) -> Result<Binary> {
        self.get_with(key, ElementType::Binary, |b| match b {
            Bson::Binary(binary) => Some(binary),
            _ => None,
        })
    }

    /// Gets the ObjectId for `key`, or an error if it is absent or not an ObjectId.
    pub fn get_object_id(&self, key: impl AsRef<str>) -> Result<ObjectId> {
        self.get_with(key, ElementType::ObjectId, |b| b.as_object_id())
    }

    /// Gets the boolean for `key`, or an error if it is absent or not a boolean.
    pub fn get_bool(&self, key: impl AsRef<str>) -> Result<bool> {
        self.get_with(key, ElementType::Boolean, |b| b.as_bool())
    }

    /// Gets the datetime for `key`, or an error if it is absent or not a datetime.
    pub fn get_datetime(&self, key: impl AsRef<str>) -> Result<DateTime> {
        self.get_with(key, ElementType::DateTime, |b| b.as_datetime())
    }

    /// Gets the 32-bit integer for `key`, or an error if it is absent or not an int32.
    pub fn get_i32(&self, key: impl AsRef<str>) -> Result<i32> {
        self.get_with(key, ElementType::Int32, |b| b.as_i32())
    }

    /// Gets the 64-bit integer for `key`, or an error if it is absent or not an int64.
    pub fn get_i64(&self, key: impl AsRef<str>) -> Result<i64> {
        self.get_with(key, ElementType::Int64, |b| b.as_i64())
    }

    fn strip_terminator(&mut self) -> Result<()> {
        if self.null_terminated {
            let last = self.storage.len() - 1;
            self.storage.truncate_from(last, 1)?;
            self.null_terminated = false;
        }
        Ok(())
    }

    fn overwrite(
        &mut self,
        key: &str,
        old: Dimensions,
        element_type: ElementType,
        body: &[u8],
    ) -> Result<()> {
        self.storage
            .replace_range(old.value_start(), old.value_len, body)?;
        if old.element_type != element_type {
            self.storage.set(old.from, element_type as u8)?;
        }

        let delta = body.len() as isize - old.value_len as isize;
        self.cache.shift_following(old.from, delta);
        self.cache.update(
            key,
            Dimensions {
                element_type,
                value_len: body.len(),
                ..old
            },
        );

        tracing::trace!(key, ?element_type, delta, "overwrote field");
        Ok(())
    }

    fn append(&mut self, key: &str, element_type: ElementType, body: &[u8]) {
        let from = self.storage.len();
        self.storage.push(element_type as u8);
        self.storage.append(key.as_bytes());
        self.storage.push(0);
        self.storage.append(body);

        self.cache.insert(
            key,
            Dimensions {
                element_type,
                from,
                key_len: key.len() + 1,
                value_len: body.len(),
            },
        );

        tracing::trace!(key, ?element_type, from, len = body.len(), "appended field");
    }

    /// The encoded fields, without the length field or terminator.
    fn fields(&self) -> &[u8] {
        let end = self.storage.len() - usize::from(self.null_terminated);
        &self.storage.as_bytes()[4..end]
    }

    fn encoded_len(&self) -> usize {
        4 + self.fields().len() + 1
    }
}

fn into_document(bson: Bson) -> Option<Document> {
    match bson {
        Bson::Document(doc) => Some(doc),
        _ => None,
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.is_array == other.is_array && self.fields() == other.fields()
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("data", &hex::encode(self.storage.as_bytes()))
            .field("is_array", &self.is_array)
            .field("null_terminated", &self.null_terminated)
            .finish()
    }
}

impl Display for Document {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        let (open, close) = if self.is_array { ("[", "]") } else { ("{", "}") };
        fmt.write_str(open)?;

        let mut first = true;
        for field in self.iter() {
            let (key, value) = field.map_err(|_| fmt::Error)?;
            if first {
                first = false;
                fmt.write_str(" ")?;
            } else {
                fmt.write_str(", ")?;
            }
            if self.is_array {
                write!(fmt, "{value}")?;
            } else {
                write!(fmt, "\"{key}\": {value}")?;
            }
        }

        write!(fmt, "{}{}", if !first { " " } else { "" }, close)
    }
}
