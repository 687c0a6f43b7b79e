/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Codecs for the fixed set of scalar field types.

use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;

use super::{expect_b, expect_n, Codec};
use crate::error::CodecError;

/// The family a scalar type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ScalarKind {
    /// `String`, stored as `S`.
    String,
    /// Any integer width, stored as `N`.
    Integer,
    /// `f32` and `f64`, stored as `N`.
    Float,
    /// `bool`, stored as `BOOL`.
    Bool,
    /// `Vec<u8>`, stored as `B`.
    Bytes,
}

impl ScalarKind {
    /// A short name for this family.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
            ScalarKind::Bytes => "bytes",
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A type with a built-in scalar codec.
///
/// This trait is sealed: the scalar set is fixed. Other types take part through the marshal
/// traits in [`super::marshal`].
pub trait ScalarValue: sealed::Sealed + Sized + Send + Sync + 'static {
    /// The family this type belongs to.
    const KIND: ScalarKind;

    /// Encodes this value.
    fn encode(&self) -> Result<AttributeValue, CodecError>;

    /// Decodes a value of this type.
    fn decode(av: &AttributeValue) -> Result<Self, CodecError>;

    /// Builds a value from a `def=` directive. Only string-kind types accept defaults.
    fn from_default(_value: &str) -> Option<Self> {
        None
    }
}

/// Returns the codec of a scalar type.
pub fn codec<T: ScalarValue>() -> Codec<T> {
    Codec::new(T::KIND.as_str(), T::encode, T::decode)
}

impl sealed::Sealed for String {}

impl ScalarValue for String {
    const KIND: ScalarKind = ScalarKind::String;

    fn encode(&self) -> Result<AttributeValue, CodecError> {
        Ok(AttributeValue::S(self.clone()))
    }

    fn decode(av: &AttributeValue) -> Result<Self, CodecError> {
        super::expect_s(av).map(str::to_string)
    }

    fn from_default(value: &str) -> Option<Self> {
        Some(value.to_string())
    }
}

impl sealed::Sealed for bool {}

impl ScalarValue for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn encode(&self) -> Result<AttributeValue, CodecError> {
        Ok(AttributeValue::Bool(*self))
    }

    fn decode(av: &AttributeValue) -> Result<Self, CodecError> {
        match av {
            AttributeValue::Bool(b) => Ok(*b),
            other => Err(CodecError::unexpected_variant("BOOL", other)),
        }
    }
}

impl sealed::Sealed for Vec<u8> {}

impl ScalarValue for Vec<u8> {
    const KIND: ScalarKind = ScalarKind::Bytes;

    fn encode(&self) -> Result<AttributeValue, CodecError> {
        Ok(AttributeValue::B(Blob::new(self.clone())))
    }

    fn decode(av: &AttributeValue) -> Result<Self, CodecError> {
        expect_b(av).map(<[u8]>::to_vec)
    }
}

/// Parses the text of an `N` attribute into an integer of type `T`.
///
/// Well-formed numbers outside the range of `T` are reported as overflow, including negative
/// numbers for unsigned targets.
pub(crate) fn parse_integer<T>(text: &str, target: &'static str) -> Result<T, CodecError>
where
    T: FromStr<Err = ParseIntError>,
{
    text.parse::<T>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            CodecError::overflow(text, target)
        }
        _ if is_negative_integer(text) => CodecError::overflow(text, target),
        _ => CodecError::parse(text, target),
    })
}

fn is_negative_integer(text: &str) -> bool {
    text.strip_prefix('-')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

macro_rules! integer_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl ScalarValue for $ty {
                const KIND: ScalarKind = ScalarKind::Integer;

                fn encode(&self) -> Result<AttributeValue, CodecError> {
                    Ok(AttributeValue::N(itoa::Buffer::new().format(*self).to_owned()))
                }

                fn decode(av: &AttributeValue) -> Result<Self, CodecError> {
                    parse_integer::<$ty>(expect_n(av)?, stringify!($ty))
                }
            }
        )+
    };
}

integer_scalar!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Formats a finite float with the shortest representation that parses back to the same value.
pub(crate) fn format_float<F: ryu::Float>(value: F, is_finite: bool) -> Result<String, CodecError> {
    if !is_finite {
        return Err(CodecError::invalid_value(
            "NaN and infinite numbers cannot be stored",
        ));
    }
    Ok(ryu::Buffer::new().format_finite(value).to_owned())
}

fn looks_non_finite(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("inf") || lower.contains("nan")
}

macro_rules! float_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl ScalarValue for $ty {
                const KIND: ScalarKind = ScalarKind::Float;

                fn encode(&self) -> Result<AttributeValue, CodecError> {
                    format_float(*self, self.is_finite()).map(AttributeValue::N)
                }

                fn decode(av: &AttributeValue) -> Result<Self, CodecError> {
                    let text = expect_n(av)?;
                    if looks_non_finite(text) {
                        return Err(CodecError::parse(text, stringify!($ty)));
                    }
                    match text.parse::<$ty>() {
                        Ok(value) if value.is_finite() => Ok(value),
                        Ok(_) => Err(CodecError::overflow(text, stringify!($ty))),
                        Err(_) => Err(CodecError::parse(text, stringify!($ty))),
                    }
                }
            }
        )+
    };
}

float_scalar!(f32, f64);

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn n(text: &str) -> AttributeValue {
        AttributeValue::N(text.to_string())
    }

    #[test]
    fn narrowing_overflows() {
        assert!(i16::decode(&n("65536")).unwrap_err().is_overflow());
        assert!(u16::decode(&n("65536")).unwrap_err().is_overflow());
        assert!(i8::decode(&n("-129")).unwrap_err().is_overflow());
        assert!(u64::decode(&n("18446744073709551616"))
            .unwrap_err()
            .is_overflow());
    }

    #[test]
    fn negative_into_unsigned_overflows() {
        assert!(u32::decode(&n("-1")).unwrap_err().is_overflow());
        assert!(usize::decode(&n("-12")).unwrap_err().is_overflow());
    }

    #[test]
    fn garbage_is_a_parse_error() {
        for text in ["pickle", "", "1.5", "-", "0x10", "1e3"] {
            assert!(i64::decode(&n(text)).unwrap_err().is_parse(), "{text}");
            assert!(u8::decode(&n(text)).unwrap_err().is_parse(), "{text}");
        }
        assert!(f64::decode(&n("pickle")).unwrap_err().is_parse());
        assert!(f32::decode(&n("NaN")).unwrap_err().is_parse());
        assert!(f64::decode(&n("-inf")).unwrap_err().is_parse());
    }

    #[test]
    fn float_overflow() {
        assert!(f32::decode(&n("1e39")).unwrap_err().is_overflow());
        assert!(f64::decode(&n("-1e309")).unwrap_err().is_overflow());
        assert_eq!(f32::decode(&n("3.5")).unwrap(), 3.5);
    }

    #[test]
    fn non_finite_floats_cannot_be_encoded() {
        assert!(f64::NAN.encode().is_err());
        assert!(f32::INFINITY.encode().is_err());
    }

    #[test]
    fn wrong_variant() {
        let err = i32::decode(&AttributeValue::S("1".into())).unwrap_err();
        assert_eq!(err.to_string(), "expected attribute of type N, got S");
        assert!(bool::decode(&n("1")).is_err());
        assert!(String::decode(&n("1")).is_err());
    }

    #[test]
    fn bytes_are_copied() {
        let source = vec![1_u8, 2, 3];
        let encoded = source.encode().unwrap();
        let decoded = Vec::<u8>::decode(&encoded).unwrap();
        assert_eq!(decoded, source);
        assert_eq!(encoded, AttributeValue::B(Blob::new(vec![1, 2, 3])));
    }

    #[test]
    fn only_strings_take_defaults() {
        assert_eq!(String::from_default("x"), Some("x".to_string()));
        assert_eq!(i32::from_default("1"), None);
    }

    #[test]
    fn codec_names() {
        assert_eq!(codec::<u8>().name(), "integer");
        assert_eq!(codec::<String>().name(), "string");
        assert_eq!(codec::<Vec<u8>>().name(), "bytes");
    }

    fn round_trip<T: ScalarValue>(value: &T) -> T {
        let codec = codec::<T>();
        codec.decode(&codec.encode(value).unwrap()).unwrap()
    }

    proptest! {
        #[test]
        fn integers_round_trip(a: i8, b: i64, c: i128, d: u16, e: u128, f: usize) {
            prop_assert_eq!(round_trip(&a), a);
            prop_assert_eq!(round_trip(&b), b);
            prop_assert_eq!(round_trip(&c), c);
            prop_assert_eq!(round_trip(&d), d);
            prop_assert_eq!(round_trip(&e), e);
            prop_assert_eq!(round_trip(&f), f);
        }

        #[test]
        fn floats_round_trip(a in proptest::num::f64::NORMAL | proptest::num::f64::ZERO, b in proptest::num::f32::NORMAL) {
            prop_assert_eq!(round_trip(&a), a);
            prop_assert_eq!(round_trip(&b), b);
        }

        #[test]
        fn strings_and_bytes_round_trip(s: String, bytes: Vec<u8>, flag: bool) {
            prop_assert_eq!(round_trip(&s), s);
            prop_assert_eq!(round_trip(&bytes), bytes);
            prop_assert_eq!(round_trip(&flag), flag);
        }
    }
}
