// The MIT License (MIT)

// Copyright (c) 2015 Y. T. Chung <zonyitoo@gmail.com>

// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:

// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! BSON is a binary format in which zero or more key/value pairs are stored as a single entity.
//! We call this entity a document.
//!
//! This crate keeps a document as its encoded bytes and mutates those bytes directly. A
//! [`Document`] owns one contiguous buffer that is simultaneously a valid BSON document and a
//! mutable data structure, plus an index from each top-level key to the exact byte range of its
//! field, so repeated reads and writes do not rescan the buffer.
//!
//! ## Basic usage
//!
//! ```rust
//! use indexed_bson::{Bson, Document};
//!
//! let mut doc = Document::new();
//! doc.write("s", "hi")?;
//! doc.write("n", 7_i64)?;
//!
//! // overwriting with a longer value shifts everything after it
//! doc.write("s", "longer")?;
//! assert_eq!(doc.get_i64("n")?, 7);
//!
//! let bytes = doc.into_bytes()?;
//! let doc = Document::from_bytes(bytes)?;
//! assert_eq!(doc.get("s")?, Some(Bson::String("longer".to_owned())));
//! # Ok::<(), indexed_bson::error::Error>(())
//! ```
//!
//! ## Terminator handling
//!
//! A complete BSON document starts with its total length and ends with a `0x00` byte. Writes
//! strip that terminator and do not maintain the length field; [`Document::finalize`] restores
//! both. [`Document::to_bytes`] and [`Document::into_bytes`] always produce a complete document.

#![cfg_attr(docsrs, feature(doc_cfg))]

#[doc(inline)]
pub use self::{
    binary::Binary,
    bson::Bson,
    cache::{Dimensions, DocumentCache},
    datetime::DateTime,
    decimal128::Decimal128,
    document::Document,
    storage::Storage,
};

#[macro_use]
mod macros;
mod binary;
mod bson;
pub mod cache;
pub mod datetime;
mod decimal128;
mod decoder;
mod document;
mod encoder;
pub mod error;
pub mod oid;
pub mod spec;
pub mod storage;

#[cfg(test)]
mod tests;
