/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_cfg))]
/* End of automatically managed default lints */

//! Field codec resolution and item assembly for `ddb-record`.
//!
//! This crate holds the engine behind `#[derive(Record)]`:
//!
//! - [`tag`] parses the per-field annotation (`#[ddb("pk,n=id")]`)
//! - [`probe`] discovers at compile time which codecs a field type supports
//! - [`codec`] contains the codecs themselves
//! - [`cache`] builds and memoizes the [`RecordMetadata`] of each record type
//! - [`item`] converts records to items, items to records, and extracts keys
//!
//! Most users depend on `ddb-record`, which re-exports this crate together with the derive.
//!
//! # Example
//!
//! ```ignore
//! use ddb_record::Record;
//!
//! #[derive(Record)]
//! struct Session {
//!     #[ddb("pk,n=id")]
//!     session_id: String,
//!     #[ddb("opt")]
//!     user: Option<String>,
//!     expires: time::Duration,
//! }
//!
//! let item = ddb_record::encode(&session)?;
//! ```

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms
)]

pub mod cache;
pub mod codec;
pub mod error;
pub mod item;
#[doc(hidden)]
pub mod probe;
pub mod record;
pub mod render;
pub mod tag;

mod resolve;

pub use cache::MetadataCache;
pub use codec::marshal::{
    BinaryMarshal, BinaryUnmarshal, DocumentMarshal, DocumentUnmarshal, TextMarshal,
    TextUnmarshal,
};
pub use error::{
    BoxError, CodecError, CodecErrorKind, ItemError, ItemErrorKind, NoItemError,
    RegistrationError, RegistrationErrorKind,
};
pub use item::{decode, encode, key, Item};
pub use probe::{IsZero, TypeInfo};
pub use record::{FieldAccess, FieldDescriptor, FieldSpec, Record, RecordMetadata};
pub use render::DisplayAttributeValue;
pub use tag::EncodingKind;

pub use aws_sdk_dynamodb::types::AttributeValue;
