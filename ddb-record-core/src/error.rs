/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Error types for record registration, field codecs and item assembly.
//!
//! Errors are layered the same way the engine is:
//!
//! - [`RegistrationError`] is raised once per record type, while directives are parsed and codecs
//!   are resolved. A type that fails registration can never be encoded or decoded.
//! - [`CodecError`] is raised by a single field codec. It never crosses the public boundary on its
//!   own; the item assembler wraps it exactly once into an [`ItemError`].
//! - [`ItemError`] is what `encode`, `decode` and `key` return.
//! - [`NoItemError`] is produced by store-access code when a key matched nothing.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use aws_sdk_dynamodb::types::AttributeValue;

use crate::render::DisplayAttributeValue;
use crate::tag::EncodingKind;

/// A boxed [std::error::Error] trait object that's [Send] and [Sync]
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error raised while building the metadata of a record type.
#[derive(Debug)]
pub struct RegistrationError {
    record: Option<&'static str>,
    field: Option<String>,
    kind: RegistrationErrorKind,
}

/// The kind of registration failure.
#[derive(Debug)]
#[non_exhaustive]
pub enum RegistrationErrorKind {
    /// The field annotation could not be parsed.
    TagSyntax {
        /// The raw annotation string.
        tag: String,
    },
    /// The directives are valid on their own but contradict each other or the record layout.
    Configuration {
        /// What is wrong.
        reason: Cow<'static, str>,
    },
    /// No codec is available for the field's type (with the requested encoding, if any).
    UnsupportedType {
        /// The Rust type of the field.
        type_name: &'static str,
        /// The explicit encoding that was requested, or `None` for autodetection.
        encoding: Option<EncodingKind>,
    },
    /// The `t=` directive named an encoding that does not exist.
    UnknownEncodingKind {
        /// The literal that was given.
        kind: String,
    },
}

impl RegistrationError {
    pub(crate) fn new(kind: RegistrationErrorKind) -> Self {
        Self {
            record: None,
            field: None,
            kind,
        }
    }

    pub(crate) fn tag_syntax(field: &str, tag: &str) -> Self {
        Self::new(RegistrationErrorKind::TagSyntax {
            tag: tag.to_string(),
        })
        .with_field(field)
    }

    pub(crate) fn configuration(field: &str, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::new(RegistrationErrorKind::Configuration {
            reason: reason.into(),
        })
        .with_field(field)
    }

    pub(crate) fn unsupported_type(
        field: &str,
        type_name: &'static str,
        encoding: Option<EncodingKind>,
    ) -> Self {
        Self::new(RegistrationErrorKind::UnsupportedType {
            type_name,
            encoding,
        })
        .with_field(field)
    }

    pub(crate) fn unknown_encoding_kind(field: &str, kind: &str) -> Self {
        Self::new(RegistrationErrorKind::UnknownEncodingKind {
            kind: kind.to_string(),
        })
        .with_field(field)
    }

    pub(crate) fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub(crate) fn with_record(mut self, record: &'static str) -> Self {
        self.record = Some(record);
        self
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &RegistrationErrorKind {
        &self.kind
    }

    /// Returns the declared name of the offending field, if the error is about a single field.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the name of the record type being registered.
    pub fn record(&self) -> Option<&'static str> {
        self.record
    }
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record {
            Some(record) => write!(f, "cannot register record `{record}`")?,
            None => write!(f, "cannot register record")?,
        }
        if let Some(field) = &self.field {
            write!(f, ": field `{field}`")?;
        }
        match &self.kind {
            RegistrationErrorKind::TagSyntax { tag } => {
                write!(f, ": could not parse annotation {tag:?}")
            }
            RegistrationErrorKind::Configuration { reason } => write!(f, ": {reason}"),
            RegistrationErrorKind::UnsupportedType {
                type_name,
                encoding: None,
            } => write!(f, ": unable to guess an encoding for type {type_name}"),
            RegistrationErrorKind::UnsupportedType {
                type_name,
                encoding: Some(encoding),
            } => write!(f, ": type {type_name} cannot be encoded as {encoding}"),
            RegistrationErrorKind::UnknownEncodingKind { kind } => {
                write!(f, ": unknown encoding kind {kind:?}")
            }
        }
    }
}

impl std::error::Error for RegistrationError {}

/// Error raised by a single field codec.
#[derive(Debug)]
pub struct CodecError {
    kind: CodecErrorKind,
}

/// The kind of codec failure.
#[derive(Debug)]
#[non_exhaustive]
pub enum CodecErrorKind {
    /// The number is well formed but does not fit the destination type.
    Overflow {
        /// The offending number text.
        value: String,
        /// The destination type.
        target: &'static str,
    },
    /// The text is not a number (or duration) of the expected form.
    Parse {
        /// The offending text.
        value: String,
        /// The destination type.
        target: &'static str,
    },
    /// The attribute value holds a different variant than the codec works with.
    UnexpectedVariant {
        /// The variant the codec expected.
        expected: &'static str,
        /// The variant that was found.
        actual: &'static str,
    },
    /// The value cannot be represented on the wire.
    InvalidValue {
        /// Why the value was rejected.
        message: Cow<'static, str>,
    },
    /// The field type's own marshal or unmarshal operation failed.
    Marshal {
        /// The error returned by the type.
        source: BoxError,
    },
}

impl CodecError {
    pub(crate) fn overflow(value: impl Into<String>, target: &'static str) -> Self {
        Self {
            kind: CodecErrorKind::Overflow {
                value: value.into(),
                target,
            },
        }
    }

    pub(crate) fn parse(value: impl Into<String>, target: &'static str) -> Self {
        Self {
            kind: CodecErrorKind::Parse {
                value: value.into(),
                target,
            },
        }
    }

    pub(crate) fn unexpected_variant(expected: &'static str, actual: &AttributeValue) -> Self {
        Self {
            kind: CodecErrorKind::UnexpectedVariant {
                expected,
                actual: crate::render::variant_name(actual),
            },
        }
    }

    pub(crate) fn invalid_value(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: CodecErrorKind::InvalidValue {
                message: message.into(),
            },
        }
    }

    /// Wraps an error returned by a field type's marshal or unmarshal operation.
    pub fn marshal(source: impl Into<BoxError>) -> Self {
        Self {
            kind: CodecErrorKind::Marshal {
                source: source.into(),
            },
        }
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &CodecErrorKind {
        &self.kind
    }

    /// True if a number did not fit its destination type.
    pub fn is_overflow(&self) -> bool {
        matches!(self.kind, CodecErrorKind::Overflow { .. })
    }

    /// True if text could not be parsed as the destination type.
    pub fn is_parse(&self) -> bool {
        matches!(self.kind, CodecErrorKind::Parse { .. })
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CodecErrorKind::Overflow { value, target } => {
                write!(f, "value {value:?} overflows {target}")
            }
            CodecErrorKind::Parse { value, target } => {
                write!(f, "cannot convert {value:?} to {target}")
            }
            CodecErrorKind::UnexpectedVariant { expected, actual } => {
                write!(f, "expected attribute of type {expected}, got {actual}")
            }
            CodecErrorKind::InvalidValue { message } => write!(f, "invalid value: {message}"),
            CodecErrorKind::Marshal { .. } => write!(f, "marshal operation failed"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            CodecErrorKind::Marshal { source } => Some(source.as_ref()),
            CodecErrorKind::Overflow { .. }
            | CodecErrorKind::Parse { .. }
            | CodecErrorKind::UnexpectedVariant { .. }
            | CodecErrorKind::InvalidValue { .. } => None,
        }
    }
}

/// Error returned when encoding a record, decoding an item, or extracting a key.
#[derive(Debug)]
pub struct ItemError {
    record: &'static str,
    kind: ItemErrorKind,
}

/// The kind of item failure.
#[derive(Debug)]
#[non_exhaustive]
pub enum ItemErrorKind {
    /// The record type could not be registered.
    Registration(RegistrationError),
    /// The operation needs a key but no field is annotated `pk`.
    MissingPartitionKey,
    /// A field that is not optional has no attribute in the item.
    MissingAttribute {
        /// The attribute name.
        field: String,
    },
    /// An optional field has no attribute but the destination already holds a non-zero value.
    StaleOptional {
        /// The attribute name.
        field: String,
    },
    /// A field value could not be encoded.
    Encode {
        /// The attribute name.
        field: String,
        /// The Rust type of the field.
        type_name: &'static str,
        /// The codec failure.
        source: CodecError,
    },
    /// An attribute could not be decoded into its field.
    Decode {
        /// The attribute name.
        field: String,
        /// The Rust type of the field.
        type_name: &'static str,
        /// The rendered attribute value that failed to decode.
        value: String,
        /// The codec failure.
        source: CodecError,
    },
}

impl ItemError {
    pub(crate) fn new(record: &'static str, kind: ItemErrorKind) -> Self {
        Self { record, kind }
    }

    pub(crate) fn missing_attribute(record: &'static str, field: &str) -> Self {
        Self::new(
            record,
            ItemErrorKind::MissingAttribute {
                field: field.to_string(),
            },
        )
    }

    pub(crate) fn stale_optional(record: &'static str, field: &str) -> Self {
        Self::new(
            record,
            ItemErrorKind::StaleOptional {
                field: field.to_string(),
            },
        )
    }

    pub(crate) fn encode(
        record: &'static str,
        field: &str,
        type_name: &'static str,
        source: CodecError,
    ) -> Self {
        Self::new(
            record,
            ItemErrorKind::Encode {
                field: field.to_string(),
                type_name,
                source,
            },
        )
    }

    pub(crate) fn decode(
        record: &'static str,
        field: &str,
        type_name: &'static str,
        value: &AttributeValue,
        source: CodecError,
    ) -> Self {
        Self::new(
            record,
            ItemErrorKind::Decode {
                field: field.to_string(),
                type_name,
                value: DisplayAttributeValue(value).to_string(),
                source,
            },
        )
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &ItemErrorKind {
        &self.kind
    }

    /// Returns the name of the record type involved.
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// Returns the underlying codec failure for `Encode` and `Decode` errors.
    pub fn codec_error(&self) -> Option<&CodecError> {
        match &self.kind {
            ItemErrorKind::Encode { source, .. } | ItemErrorKind::Decode { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }

    /// Returns the registration failure, if the record type could not be registered.
    pub fn registration_error(&self) -> Option<&RegistrationError> {
        match &self.kind {
            ItemErrorKind::Registration(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RegistrationError> for ItemError {
    fn from(err: RegistrationError) -> Self {
        Self {
            record: err.record.unwrap_or("<unknown>"),
            kind: ItemErrorKind::Registration(err),
        }
    }
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record;
        match &self.kind {
            ItemErrorKind::Registration(_) => write!(f, "record `{record}` is not usable"),
            ItemErrorKind::MissingPartitionKey => write!(
                f,
                "no field of `{record}` is annotated as the partition key (pk)"
            ),
            ItemErrorKind::MissingAttribute { field } => write!(
                f,
                "decoding into `{record}`: missing attribute for field {field:?} not annotated optional"
            ),
            ItemErrorKind::StaleOptional { field } => write!(
                f,
                "decoding into `{record}`: field {field:?} is optional, value is not zero, and no attribute was returned"
            ),
            ItemErrorKind::Encode {
                field, type_name, ..
            } => write!(f, "failed to encode {field:?} ({type_name}) of `{record}`"),
            ItemErrorKind::Decode {
                field,
                type_name,
                value,
                ..
            } => write!(
                f,
                "failed to decode {field:?} ({type_name}) of `{record}` from {value}"
            ),
        }
    }
}

impl std::error::Error for ItemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ItemErrorKind::Registration(err) => Some(err),
            ItemErrorKind::Encode { source, .. } | ItemErrorKind::Decode { source, .. } => {
                Some(source)
            }
            ItemErrorKind::MissingPartitionKey
            | ItemErrorKind::MissingAttribute { .. }
            | ItemErrorKind::StaleOptional { .. } => None,
        }
    }
}

/// The store holds no item matching a key.
#[derive(Debug, Clone)]
pub struct NoItemError {
    key: HashMap<String, AttributeValue>,
}

impl NoItemError {
    /// Creates an error for the given key.
    pub fn new(key: HashMap<String, AttributeValue>) -> Self {
        Self { key }
    }

    /// Returns the key that matched nothing.
    pub fn key(&self) -> &HashMap<String, AttributeValue> {
        &self.key
    }
}

impl fmt::Display for NoItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            return write!(f, "no item found (empty key)");
        }
        let mut names: Vec<&String> = self.key.keys().collect();
        names.sort();
        write!(f, "no item found matching key ")?;
        for (idx, name) in names.into_iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "{name:?}={}", DisplayAttributeValue(&self.key[name]))?;
        }
        Ok(())
    }
}

impl std::error::Error for NoItemError {}
