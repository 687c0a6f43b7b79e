/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Field codecs.
//!
//! A [`Codec`] is a pair of functions converting one field type to and from an
//! [`AttributeValue`]. The resolver picks one codec per field from the candidates a type offers:
//!
//! - [`scalar`]: strings, integers, floats, booleans and `Vec<u8>`
//! - [`duration`] and [`instant`]: `time::Duration` and `time::OffsetDateTime`
//! - [`marshal`]: types that marshal themselves to text, documents or bytes, and the serde_json
//!   structural fallback

use std::fmt;
use std::sync::Arc;

use aws_sdk_dynamodb::types::AttributeValue;

use crate::error::CodecError;

pub mod duration;
pub mod instant;
pub mod marshal;
pub mod scalar;

type EncodeFn<T> = dyn Fn(&T) -> Result<AttributeValue, CodecError> + Send + Sync;
type DecodeFn<T> = dyn Fn(&AttributeValue) -> Result<T, CodecError> + Send + Sync;

/// An encode/decode function pair for values of type `T`.
pub struct Codec<T> {
    name: &'static str,
    encode: Arc<EncodeFn<T>>,
    decode: Arc<DecodeFn<T>>,
}

impl<T> Codec<T> {
    /// Creates a codec. `name` identifies the strategy in logs and debug output.
    pub fn new(
        name: &'static str,
        encode: impl Fn(&T) -> Result<AttributeValue, CodecError> + Send + Sync + 'static,
        decode: impl Fn(&AttributeValue) -> Result<T, CodecError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        }
    }

    /// The name of the encoding strategy.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Encodes `value`.
    pub fn encode(&self, value: &T) -> Result<AttributeValue, CodecError> {
        (self.encode)(value)
    }

    /// Decodes a new value from `av`.
    pub fn decode(&self, av: &AttributeValue) -> Result<T, CodecError> {
        (self.decode)(av)
    }
}

impl<T: 'static> Codec<T> {
    /// Lifts this codec to `Option<T>`.
    ///
    /// Decoding always produces `Some`. Encoding `None` fails: an absent value is only legal on
    /// an optional field, where the assembler omits it before the codec is reached.
    pub fn optional(self) -> Codec<Option<T>> {
        let Codec {
            name,
            encode,
            decode,
        } = self;
        Codec::new(
            name,
            move |value: &Option<T>| match value {
                Some(inner) => encode(inner),
                None => Err(CodecError::invalid_value(
                    "field has no value and is not optional",
                )),
            },
            move |av| decode(av).map(Some),
        )
    }
}

impl<T> Clone for Codec<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            encode: self.encode.clone(),
            decode: self.decode.clone(),
        }
    }
}

impl<T> fmt::Debug for Codec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec").field("name", &self.name).finish()
    }
}

/// The codecs of a well-known composite type such as a duration or an instant.
#[derive(Debug, Clone)]
pub struct WellKnown<T> {
    pub(crate) autodetect: Option<Codec<T>>,
    pub(crate) nanoseconds: Codec<T>,
    pub(crate) seconds: Codec<T>,
}

/// A composite type with a fixed family of encodings selectable with `t=nanoseconds` and
/// `t=seconds`.
pub trait WellKnownValue: Sized + 'static {
    /// Returns the codecs of this type.
    fn well_known() -> WellKnown<Self>;
}

impl WellKnownValue for time::Duration {
    fn well_known() -> WellKnown<Self> {
        WellKnown {
            autodetect: Some(duration::string_codec()),
            nanoseconds: duration::nanoseconds_codec(),
            seconds: duration::seconds_codec(),
        }
    }
}

// Instants autodetect through their RFC 3339 text pair rather than a dedicated codec.
impl WellKnownValue for time::OffsetDateTime {
    fn well_known() -> WellKnown<Self> {
        WellKnown {
            autodetect: None,
            nanoseconds: instant::nanoseconds_codec(),
            seconds: instant::epoch_codec(),
        }
    }
}

pub(crate) fn expect_s<'a>(av: &'a AttributeValue) -> Result<&'a str, CodecError> {
    match av {
        AttributeValue::S(s) => Ok(s),
        other => Err(CodecError::unexpected_variant("S", other)),
    }
}

pub(crate) fn expect_n<'a>(av: &'a AttributeValue) -> Result<&'a str, CodecError> {
    match av {
        AttributeValue::N(n) => Ok(n),
        other => Err(CodecError::unexpected_variant("N", other)),
    }
}

pub(crate) fn expect_b<'a>(av: &'a AttributeValue) -> Result<&'a [u8], CodecError> {
    match av {
        AttributeValue::B(b) => Ok(b.as_ref()),
        other => Err(CodecError::unexpected_variant("B", other)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn string_codec() -> Codec<String> {
        Codec::new(
            "string",
            |v: &String| Ok(AttributeValue::S(v.clone())),
            |av| expect_s(av).map(str::to_string),
        )
    }

    #[test]
    fn optional_decodes_to_some() {
        let codec = string_codec().optional();
        let decoded = codec.decode(&AttributeValue::S("x".into())).unwrap();
        assert_eq!(decoded, Some("x".to_string()));
        assert_eq!(codec.name(), "string");
    }

    #[test]
    fn optional_refuses_to_encode_none() {
        let codec = string_codec().optional();
        assert!(codec.encode(&None).is_err());
        assert_eq!(
            codec.encode(&Some("y".into())).unwrap(),
            AttributeValue::S("y".into())
        );
    }

    #[test]
    fn variant_mismatch() {
        let err = expect_n(&AttributeValue::Bool(true)).unwrap_err();
        assert_eq!(err.to_string(), "expected attribute of type N, got BOOL");
    }
}
