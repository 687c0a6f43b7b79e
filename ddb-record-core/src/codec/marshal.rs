/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Capability-based codecs.
//!
//! A field type that is not a built-in scalar can opt in by implementing one of three marshal
//! pairs. Each pair is only considered when both halves are implemented:
//!
//! | pair                                        | stored as |
//! |---------------------------------------------|-----------|
//! | [`TextMarshal`] + [`TextUnmarshal`]         | `S`       |
//! | [`DocumentMarshal`] + [`DocumentUnmarshal`] | `S`       |
//! | [`BinaryMarshal`] + [`BinaryUnmarshal`]     | `B`       |
//!
//! Failures returned by these operations reach callers as [`CodecErrorKind::Marshal`] with the
//! original error as the source.
//!
//! [`CodecErrorKind::Marshal`]: crate::error::CodecErrorKind::Marshal

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use serde::de::DeserializeOwned;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::{expect_b, expect_s, Codec};
use crate::error::{BoxError, CodecError};

/// Renders a value as text.
pub trait TextMarshal {
    /// Returns the textual form of this value.
    fn marshal_text(&self) -> Result<String, BoxError>;
}

/// Parses a value from text.
pub trait TextUnmarshal: Sized {
    /// Parses `text` into a new value.
    fn unmarshal_text(text: &str) -> Result<Self, BoxError>;
}

/// Renders a value as a JSON document.
pub trait DocumentMarshal {
    /// Returns the JSON text of this value.
    fn marshal_document(&self) -> Result<String, BoxError>;
}

/// Parses a value from a JSON document.
pub trait DocumentUnmarshal: Sized {
    /// Parses the JSON text `document` into a new value.
    fn unmarshal_document(document: &str) -> Result<Self, BoxError>;
}

/// Renders a value as bytes.
pub trait BinaryMarshal {
    /// Returns the binary form of this value.
    fn marshal_binary(&self) -> Result<Vec<u8>, BoxError>;
}

/// Parses a value from bytes.
pub trait BinaryUnmarshal: Sized {
    /// Parses `bytes` into a new value.
    fn unmarshal_binary(bytes: &[u8]) -> Result<Self, BoxError>;
}

/// Codec over a text marshal pair.
pub fn text_codec<T>() -> Codec<T>
where
    T: TextMarshal + TextUnmarshal + 'static,
{
    Codec::new(
        "text",
        |value: &T| {
            value
                .marshal_text()
                .map(AttributeValue::S)
                .map_err(CodecError::marshal)
        },
        |av| T::unmarshal_text(expect_s(av)?).map_err(CodecError::marshal),
    )
}

/// Codec over a document marshal pair.
pub fn document_codec<T>() -> Codec<T>
where
    T: DocumentMarshal + DocumentUnmarshal + 'static,
{
    Codec::new(
        "document",
        |value: &T| {
            value
                .marshal_document()
                .map(AttributeValue::S)
                .map_err(CodecError::marshal)
        },
        |av| T::unmarshal_document(expect_s(av)?).map_err(CodecError::marshal),
    )
}

/// Codec over a binary marshal pair.
pub fn binary_codec<T>() -> Codec<T>
where
    T: BinaryMarshal + BinaryUnmarshal + 'static,
{
    Codec::new(
        "binary",
        |value: &T| {
            value
                .marshal_binary()
                .map(|bytes| AttributeValue::B(Blob::new(bytes)))
                .map_err(CodecError::marshal)
        },
        |av| T::unmarshal_binary(expect_b(av)?).map_err(CodecError::marshal),
    )
}

/// Serializes any serde type as JSON text. Used for `t=json` when the type has no document
/// marshal pair.
pub fn structural_codec<T>() -> Codec<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    Codec::new(
        "json",
        |value: &T| {
            serde_json::to_string(value)
                .map(AttributeValue::S)
                .map_err(CodecError::marshal)
        },
        |av| serde_json::from_str(expect_s(av)?).map_err(CodecError::marshal),
    )
}

impl TextMarshal for OffsetDateTime {
    fn marshal_text(&self) -> Result<String, BoxError> {
        Ok(self.format(&Rfc3339)?)
    }
}

impl TextUnmarshal for OffsetDateTime {
    fn unmarshal_text(text: &str) -> Result<Self, BoxError> {
        Ok(OffsetDateTime::parse(text, &Rfc3339)?)
    }
}

macro_rules! display_text_marshal {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl TextMarshal for $ty {
                fn marshal_text(&self) -> Result<String, BoxError> {
                    Ok(self.to_string())
                }
            }

            impl TextUnmarshal for $ty {
                fn unmarshal_text(text: &str) -> Result<Self, BoxError> {
                    Ok(text.parse::<$ty>()?)
                }
            }
        )+
    };
}

display_text_marshal!(IpAddr, Ipv4Addr, Ipv6Addr);

impl DocumentMarshal for serde_json::Value {
    fn marshal_document(&self) -> Result<String, BoxError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl DocumentUnmarshal for serde_json::Value {
    fn unmarshal_document(document: &str) -> Result<Self, BoxError> {
        Ok(serde_json::from_str(document)?)
    }
}
