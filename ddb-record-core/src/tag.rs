/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Per-field annotation parsing.
//!
//! A field annotation is a comma separated list of directives:
//!
//! | directive   | meaning                                  |
//! |-------------|------------------------------------------|
//! | `pk`        | the field is the partition key           |
//! | `sk`        | the field is the sort key                |
//! | `n=<name>`  | store the field under another attribute  |
//! | `t=<kind>`  | force an encoding, see [`EncodingKind`]  |
//! | `def=<val>` | value written when the field is zero     |
//! | `opt`       | omit the attribute when the field is zero |
//!
//! Directives may appear in any order; a repeated directive overwrites the earlier one.

use std::fmt;
use std::str::FromStr;

use crate::error::RegistrationError;

/// Directives parsed from one field annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTag {
    partition_key: bool,
    sort_key: bool,
    name: Option<String>,
    encoding: Option<String>,
    default_value: Option<String>,
    optional: bool,
}

impl FieldTag {
    /// Parses the annotation `raw` of the field declared as `field`.
    ///
    /// An empty annotation yields no directives.
    pub fn parse(field: &str, raw: &str) -> Result<Self, RegistrationError> {
        let mut tag = FieldTag::default();
        if raw.is_empty() {
            return Ok(tag);
        }
        for token in raw.split(',') {
            match token.split_once('=') {
                None => match token {
                    "pk" => tag.partition_key = true,
                    "sk" => tag.sort_key = true,
                    "opt" => tag.optional = true,
                    _ => return Err(RegistrationError::tag_syntax(field, raw)),
                },
                Some((_, "")) => return Err(RegistrationError::tag_syntax(field, raw)),
                Some(("n", value)) => tag.name = Some(value.to_string()),
                Some(("t", value)) => tag.encoding = Some(value.to_string()),
                Some(("def", value)) => tag.default_value = Some(value.to_string()),
                Some(_) => return Err(RegistrationError::tag_syntax(field, raw)),
            }
        }
        Ok(tag)
    }

    /// True if the field is annotated `pk`.
    pub fn is_partition_key(&self) -> bool {
        self.partition_key
    }

    /// True if the field is annotated `sk`.
    pub fn is_sort_key(&self) -> bool {
        self.sort_key
    }

    /// True if the field is annotated `opt`.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// The attribute name override from `n=`.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The raw encoding literal from `t=`, not yet validated.
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// The default value from `def=`.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }
}

/// An explicit field encoding requested with `t=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EncodingKind {
    /// `string`: a string field, or a type with a text marshal pair.
    String,
    /// `binary` or `bytes`: `Vec<u8>`, or a type with a binary marshal pair.
    Binary,
    /// `json`: a document marshal pair, falling back to serde_json.
    Json,
    /// `nanoseconds` or `nano`: durations and instants as integer nanoseconds.
    Nanoseconds,
    /// `epoch` or `seconds`: durations and instants as seconds.
    Seconds,
}

impl EncodingKind {
    /// The canonical literal for this encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingKind::String => "string",
            EncodingKind::Binary => "binary",
            EncodingKind::Json => "json",
            EncodingKind::Nanoseconds => "nanoseconds",
            EncodingKind::Seconds => "seconds",
        }
    }
}

impl fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The literal given to `t=` is not a known encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEncodingKind(String);

impl fmt::Display for UnknownEncodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown encoding kind {:?}", self.0)
    }
}

impl std::error::Error for UnknownEncodingKind {}

impl FromStr for EncodingKind {
    type Err = UnknownEncodingKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(EncodingKind::String),
            "binary" | "bytes" => Ok(EncodingKind::Binary),
            "json" => Ok(EncodingKind::Json),
            "nanoseconds" | "nano" => Ok(EncodingKind::Nanoseconds),
            "epoch" | "seconds" => Ok(EncodingKind::Seconds),
            other => Err(UnknownEncodingKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::RegistrationErrorKind;

    #[test]
    fn empty_annotation() {
        assert_eq!(FieldTag::parse("F", "").unwrap(), FieldTag::default());
    }

    #[test]
    fn all_directives() {
        let tag = FieldTag::parse("F", "sk,n=other,t=json,def=x,opt").unwrap();
        assert!(tag.is_sort_key());
        assert!(!tag.is_partition_key());
        assert!(tag.is_optional());
        assert_eq!(tag.name(), Some("other"));
        assert_eq!(tag.encoding(), Some("json"));
        assert_eq!(tag.default_value(), Some("x"));
    }

    #[test]
    fn later_directive_wins() {
        let tag = FieldTag::parse("F", "n=first,pk,n=second").unwrap();
        assert_eq!(tag.name(), Some("second"));
        assert!(tag.is_partition_key());
    }

    #[test]
    fn values_may_contain_equals() {
        let tag = FieldTag::parse("F", "def=a=b").unwrap();
        assert_eq!(tag.default_value(), Some("a=b"));
    }

    #[test]
    fn encoding_is_not_validated_by_parser() {
        let tag = FieldTag::parse("F", "t=morse").unwrap();
        assert_eq!(tag.encoding(), Some("morse"));
        assert!("morse".parse::<EncodingKind>().is_err());
    }

    #[test]
    fn syntax_errors() {
        for raw in ["bogus", "pk,", ",pk", "n=", "x=1", "pk,,sk", "PK", " pk"] {
            let err = FieldTag::parse("Field", raw).expect_err(raw);
            assert_eq!(err.field(), Some("Field"));
            match err.kind() {
                RegistrationErrorKind::TagSyntax { tag } => assert_eq!(tag, raw),
                other => panic!("unexpected error kind {other:?}"),
            }
        }
    }

    #[test]
    fn encoding_aliases() {
        assert_eq!("bytes".parse(), Ok(EncodingKind::Binary));
        assert_eq!("binary".parse(), Ok(EncodingKind::Binary));
        assert_eq!("nano".parse(), Ok(EncodingKind::Nanoseconds));
        assert_eq!("epoch".parse(), Ok(EncodingKind::Seconds));
        assert_eq!("seconds".parse(), Ok(EncodingKind::Seconds));
        assert_eq!("string".parse(), Ok(EncodingKind::String));
        assert_eq!("json".parse(), Ok(EncodingKind::Json));
    }
}
