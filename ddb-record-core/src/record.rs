/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Record types and their field metadata.

use std::any::type_name;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use aws_sdk_dynamodb::types::AttributeValue;
use tracing::trace;

use crate::codec::Codec;
use crate::error::{CodecError, RegistrationError};
use crate::probe::TypeInfo;
use crate::resolve::resolve;
use crate::tag::{EncodingKind, FieldTag};

/// A struct that maps to a DynamoDB item.
///
/// Implemented by `#[derive(Record)]`; the derive lists every field with its annotation and type
/// capabilities. Metadata is built from that list once per type, see
/// [`MetadataCache`](crate::cache::MetadataCache).
pub trait Record: Sized + 'static {
    /// Describes the fields of this record in declaration order.
    fn fields() -> Vec<FieldSpec<Self>>;
}

/// Type-erased access to one field of a record.
pub trait FieldAccess<R>: Send + Sync {
    /// The Rust type of the field.
    fn type_name(&self) -> &'static str;

    /// True if the field of `record` holds its zero value. Always false for types without one.
    fn is_zero(&self, record: &R) -> bool;

    /// Encodes the field of `record`.
    fn encode(&self, record: &R) -> Result<AttributeValue, CodecError>;

    /// Decodes `av` and stores the result in the field of `record`.
    fn decode(&self, record: &mut R, av: &AttributeValue) -> Result<(), CodecError>;
}

struct BoundField<R, T> {
    type_name: &'static str,
    codec: Codec<T>,
    zero: Option<Arc<dyn Fn(&T) -> bool + Send + Sync>>,
    get: fn(&R) -> &T,
    get_mut: fn(&mut R) -> &mut T,
}

impl<R, T> FieldAccess<R> for BoundField<R, T> {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn is_zero(&self, record: &R) -> bool {
        self.zero
            .as_ref()
            .is_some_and(|is_zero| is_zero((self.get)(record)))
    }

    fn encode(&self, record: &R) -> Result<AttributeValue, CodecError> {
        self.codec.encode((self.get)(record))
    }

    fn decode(&self, record: &mut R, av: &AttributeValue) -> Result<(), CodecError> {
        *(self.get_mut)(record) = self.codec.decode(av)?;
        Ok(())
    }
}

/// A field as declared on a record, before its directives are applied.
pub struct FieldSpec<R> {
    name: &'static str,
    index: usize,
    tag: &'static str,
    binder: Box<dyn BindField<R>>,
}

impl<R: 'static> FieldSpec<R> {
    /// Declares the field `name` at position `index`, annotated with `tag`.
    ///
    /// `get` and `get_mut` project a record onto the field.
    pub fn new<T: 'static>(
        name: &'static str,
        index: usize,
        tag: &'static str,
        info: TypeInfo<T>,
        get: fn(&R) -> &T,
        get_mut: fn(&mut R) -> &mut T,
    ) -> Self {
        Self {
            name,
            index,
            tag,
            binder: Box::new(Unbound { info, get, get_mut }),
        }
    }

    /// The declared name of the field.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The raw annotation of the field.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    fn bind(self) -> Result<FieldDescriptor<R>, RegistrationError> {
        let field = self.name;
        let tag = FieldTag::parse(field, self.tag)?;
        let bound = self.binder.bind(field, &tag)?;

        if (tag.is_partition_key() || tag.is_sort_key()) && tag.is_optional() {
            return Err(RegistrationError::configuration(
                field,
                "key fields cannot be optional",
            ));
        }
        if let Some(default) = tag.default_value() {
            if tag.is_optional() {
                return Err(RegistrationError::configuration(
                    field,
                    "a field with a default value cannot be optional",
                ));
            }
            if bound.default.is_none() {
                return Err(RegistrationError::configuration(
                    field,
                    format!(
                        "default value {default:?} is not supported for type {}",
                        bound.access.type_name()
                    ),
                ));
            }
        }
        if tag.is_optional() && !bound.has_zero {
            return Err(RegistrationError::configuration(
                field,
                format!(
                    "type {} has no zero value and cannot be optional",
                    bound.access.type_name()
                ),
            ));
        }

        Ok(FieldDescriptor {
            attribute_name: tag.name().unwrap_or(field).to_string(),
            name: field,
            index: self.index,
            partition_key: tag.is_partition_key(),
            sort_key: tag.is_sort_key(),
            optional: tag.is_optional(),
            default_value: tag.default_value().map(str::to_string),
            encoded_default: bound.default,
            encoding: bound.encoding,
            codec_name: bound.codec_name,
            access: bound.access,
        })
    }
}

impl<R> fmt::Debug for FieldSpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("tag", &self.tag)
            .finish()
    }
}

struct Bound<R> {
    access: Arc<dyn FieldAccess<R>>,
    encoding: Option<EncodingKind>,
    codec_name: &'static str,
    has_zero: bool,
    default: Option<AttributeValue>,
}

trait BindField<R> {
    fn bind(self: Box<Self>, field: &str, tag: &FieldTag) -> Result<Bound<R>, RegistrationError>;
}

struct Unbound<R, T> {
    info: TypeInfo<T>,
    get: fn(&R) -> &T,
    get_mut: fn(&mut R) -> &mut T,
}

impl<R: 'static, T: 'static> BindField<R> for Unbound<R, T> {
    fn bind(self: Box<Self>, field: &str, tag: &FieldTag) -> Result<Bound<R>, RegistrationError> {
        let resolution = resolve(field, tag, &self.info)?;
        let default = match (tag.default_value(), &self.info.from_default) {
            (Some(raw), Some(from_default)) => match from_default(raw) {
                Some(value) => Some(resolution.codec.encode(&value).map_err(|err| {
                    RegistrationError::configuration(
                        field,
                        format!("default value {raw:?} cannot be encoded: {err}"),
                    )
                })?),
                None => None,
            },
            _ => None,
        };
        let Unbound {
            info,
            get,
            get_mut,
        } = *self;
        Ok(Bound {
            codec_name: resolution.codec.name(),
            encoding: resolution.encoding,
            has_zero: info.zero.is_some(),
            default,
            access: Arc::new(BoundField {
                type_name: info.type_name,
                codec: resolution.codec,
                zero: info.zero,
                get,
                get_mut,
            }),
        })
    }
}

/// A record field with its directives applied and codec bound.
pub struct FieldDescriptor<R> {
    attribute_name: String,
    name: &'static str,
    index: usize,
    partition_key: bool,
    sort_key: bool,
    optional: bool,
    default_value: Option<String>,
    encoded_default: Option<AttributeValue>,
    encoding: Option<EncodingKind>,
    codec_name: &'static str,
    access: Arc<dyn FieldAccess<R>>,
}

impl<R> FieldDescriptor<R> {
    /// The name of the attribute this field is stored under.
    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    /// The declared name of the field.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declaration position of the field.
    pub fn index(&self) -> usize {
        self.index
    }

    /// True if the field is the partition key.
    pub fn is_partition_key(&self) -> bool {
        self.partition_key
    }

    /// True if the field is the sort key.
    pub fn is_sort_key(&self) -> bool {
        self.sort_key
    }

    /// True if the attribute is omitted while the field holds its zero value.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// The value written in place of a zero field.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub(crate) fn encoded_default(&self) -> Option<&AttributeValue> {
        self.encoded_default.as_ref()
    }

    /// The explicit encoding, or `None` if the codec was autodetected.
    pub fn encoding(&self) -> Option<EncodingKind> {
        self.encoding
    }

    /// The name of the bound codec.
    pub fn codec_name(&self) -> &'static str {
        self.codec_name
    }

    /// The Rust type of the field.
    pub fn type_name(&self) -> &'static str {
        self.access.type_name()
    }

    /// Access to the field value through its codec.
    pub fn access(&self) -> &dyn FieldAccess<R> {
        self.access.as_ref()
    }
}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("attribute_name", &self.attribute_name)
            .field("name", &self.name)
            .field("index", &self.index)
            .field("partition_key", &self.partition_key)
            .field("sort_key", &self.sort_key)
            .field("optional", &self.optional)
            .field("default_value", &self.default_value)
            .field("encoding", &self.encoding)
            .field("codec", &self.codec_name)
            .field("type_name", &self.type_name())
            .finish()
    }
}

/// The fields of a record type and its key fields.
pub struct RecordMetadata<R> {
    record: &'static str,
    fields: Vec<FieldDescriptor<R>>,
    partition_key: Option<usize>,
    sort_key: Option<usize>,
}

impl<R: Record> RecordMetadata<R> {
    /// Builds the metadata of `R` from its declared fields.
    ///
    /// This does not consult or populate any cache.
    pub fn build() -> Result<Self, RegistrationError> {
        let record = type_name::<R>();
        Self::from_specs(record, R::fields()).map_err(|err| err.with_record(record))
    }

    fn from_specs(
        record: &'static str,
        specs: Vec<FieldSpec<R>>,
    ) -> Result<Self, RegistrationError> {
        let mut fields = Vec::with_capacity(specs.len());
        let mut partition_key = None;
        let mut sort_key = None;
        let mut attribute_names = HashSet::new();
        for spec in specs {
            let descriptor = spec.bind()?;
            let position = fields.len();
            if descriptor.partition_key && partition_key.replace(position).is_some() {
                return Err(RegistrationError::configuration(
                    descriptor.name,
                    "only one field may be annotated as the partition key (pk)",
                ));
            }
            if descriptor.sort_key && sort_key.replace(position).is_some() {
                return Err(RegistrationError::configuration(
                    descriptor.name,
                    "only one field may be annotated as the sort key (sk)",
                ));
            }
            if !attribute_names.insert(descriptor.attribute_name.clone()) {
                return Err(RegistrationError::configuration(
                    descriptor.name,
                    format!(
                        "attribute name {:?} is used by more than one field",
                        descriptor.attribute_name
                    ),
                ));
            }
            trace!(
                record = record,
                field = descriptor.name,
                attribute = %descriptor.attribute_name,
                codec = descriptor.codec_name,
                "bound field codec"
            );
            fields.push(descriptor);
        }
        Ok(Self {
            record,
            fields,
            partition_key,
            sort_key,
        })
    }
}

impl<R> RecordMetadata<R> {
    /// The name of the record type.
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// The fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }

    /// The partition key field, if one is annotated.
    pub fn partition_key(&self) -> Option<&FieldDescriptor<R>> {
        self.partition_key.map(|idx| &self.fields[idx])
    }

    /// The sort key field, if one is annotated.
    pub fn sort_key(&self) -> Option<&FieldDescriptor<R>> {
        self.sort_key.map(|idx| &self.fields[idx])
    }

    /// Looks up a field by attribute name.
    pub fn field(&self, attribute_name: &str) -> Option<&FieldDescriptor<R>> {
        self.fields
            .iter()
            .find(|field| field.attribute_name == attribute_name)
    }
}

impl<R> fmt::Debug for RecordMetadata<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordMetadata")
            .field("record", &self.record)
            .field("fields", &self.fields)
            .field("partition_key", &self.partition_key)
            .field("sort_key", &self.sort_key)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::RegistrationErrorKind;
    use std::net::IpAddr;

    #[derive(Default)]
    struct Account {
        id: String,
        region: String,
        balance: i64,
        note: Option<String>,
    }

    impl Record for Account {
        fn fields() -> Vec<FieldSpec<Self>> {
            vec![
                FieldSpec::new(
                    "id",
                    0,
                    "pk",
                    crate::type_info!(String),
                    |r: &Self| &r.id,
                    |r: &mut Self| &mut r.id,
                ),
                FieldSpec::new(
                    "region",
                    1,
                    "sk,n=Region",
                    crate::type_info!(String),
                    |r: &Self| &r.region,
                    |r: &mut Self| &mut r.region,
                ),
                FieldSpec::new(
                    "balance",
                    2,
                    "t=nano",
                    crate::type_info!(i64),
                    |r: &Self| &r.balance,
                    |r: &mut Self| &mut r.balance,
                ),
                FieldSpec::new(
                    "note",
                    3,
                    "opt",
                    crate::type_info!(String).optional(),
                    |r: &Self| &r.note,
                    |r: &mut Self| &mut r.note,
                ),
            ]
        }
    }

    struct Ledger {
        owner: String,
        entries: u32,
    }

    impl Record for Ledger {
        fn fields() -> Vec<FieldSpec<Self>> {
            vec![
                FieldSpec::new(
                    "owner",
                    0,
                    "pk",
                    crate::type_info!(String),
                    |r: &Self| &r.owner,
                    |r: &mut Self| &mut r.owner,
                ),
                FieldSpec::new(
                    "entries",
                    1,
                    "n=owner",
                    crate::type_info!(u32),
                    |r: &Self| &r.entries,
                    |r: &mut Self| &mut r.entries,
                ),
            ]
        }
    }

    struct Ranking {
        board: String,
        score: u32,
        player: String,
    }

    impl Record for Ranking {
        fn fields() -> Vec<FieldSpec<Self>> {
            vec![
                FieldSpec::new(
                    "board",
                    0,
                    "pk",
                    crate::type_info!(String),
                    |r: &Self| &r.board,
                    |r: &mut Self| &mut r.board,
                ),
                FieldSpec::new(
                    "score",
                    1,
                    "sk",
                    crate::type_info!(u32),
                    |r: &Self| &r.score,
                    |r: &mut Self| &mut r.score,
                ),
                FieldSpec::new(
                    "player",
                    2,
                    "sk",
                    crate::type_info!(String),
                    |r: &Self| &r.player,
                    |r: &mut Self| &mut r.player,
                ),
            ]
        }
    }

    fn single<T: 'static>(tag: &'static str, info: TypeInfo<T>) -> RegistrationError {
        struct Holder;
        let spec: FieldSpec<Holder> = FieldSpec {
            name: "F",
            index: 0,
            tag,
            binder: Box::new(Unbound::<Holder, T> {
                info,
                get: |_| unreachable!(),
                get_mut: |_| unreachable!(),
            }),
        };
        match spec.bind() {
            Ok(_) => panic!("expected {tag:?} to be rejected"),
            Err(err) => err,
        }
    }

    #[test]
    fn registration_failure_names_record_and_field() {
        let err = RecordMetadata::<Account>::build().unwrap_err();
        assert_eq!(err.field(), Some("balance"));
        assert!(err.record().unwrap().ends_with("Account"));
        assert!(matches!(
            err.kind(),
            RegistrationErrorKind::UnsupportedType { .. }
        ));
    }

    #[test]
    fn attribute_names_must_be_unique() {
        let err = RecordMetadata::<Ledger>::build().unwrap_err();
        assert_eq!(err.field(), Some("entries"));
        assert!(err
            .to_string()
            .contains("attribute name \"owner\" is used by more than one field"));
    }

    #[test]
    fn only_one_sort_key() {
        let err = RecordMetadata::<Ranking>::build().unwrap_err();
        assert_eq!(err.field(), Some("player"));
        match err.kind() {
            RegistrationErrorKind::Configuration { reason } => assert_eq!(
                reason,
                "only one field may be annotated as the sort key (sk)"
            ),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn directive_conflicts() {
        for (tag, expected) in [
            ("pk,opt", "key fields cannot be optional"),
            ("sk,opt", "key fields cannot be optional"),
            ("def=x,opt", "a field with a default value cannot be optional"),
        ] {
            let err = single(tag, crate::type_info!(String));
            match err.kind() {
                RegistrationErrorKind::Configuration { reason } => assert_eq!(reason, expected),
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn defaults_only_on_strings() {
        let err = single("def=7", crate::type_info!(u32));
        assert!(err.to_string().contains("default value \"7\" is not supported"));
    }

    #[test]
    fn optional_needs_a_zero_value() {
        let err = single("opt", crate::type_info!(IpAddr));
        assert!(err.to_string().contains("has no zero value"));
    }

    #[test]
    fn bad_annotation() {
        let err = single("pk,", crate::type_info!(String));
        assert!(matches!(err.kind(), RegistrationErrorKind::TagSyntax { .. }));
    }
}
