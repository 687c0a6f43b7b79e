/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Conversion between records and items.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use tracing::trace;

use crate::cache::MetadataCache;
use crate::error::{ItemError, ItemErrorKind};
use crate::record::{FieldDescriptor, Record, RecordMetadata};

/// A DynamoDB item: attribute name to value.
pub type Item = HashMap<String, AttributeValue>;

/// Encodes `record` into an item, using the process-wide metadata cache.
///
/// See [`RecordMetadata::encode`].
pub fn encode<R: Record>(record: &R) -> Result<Item, ItemError> {
    MetadataCache::global().get::<R>()?.encode(record)
}

/// Decodes `item` into `record`, using the process-wide metadata cache.
///
/// See [`RecordMetadata::decode`].
pub fn decode<R: Record>(item: &Item, record: &mut R) -> Result<(), ItemError> {
    MetadataCache::global().get::<R>()?.decode(item, record)
}

/// Extracts the key of `record`, using the process-wide metadata cache.
///
/// See [`RecordMetadata::key`].
pub fn key<R: Record>(record: &R) -> Result<Item, ItemError> {
    MetadataCache::global().get::<R>()?.key(record)
}

impl<R> RecordMetadata<R> {
    /// Encodes `record` into an item.
    ///
    /// Fields are visited in declaration order. An optional field holding its zero value is left
    /// out; a zero field with a default value is stored as the default. `record` is not modified.
    pub fn encode(&self, record: &R) -> Result<Item, ItemError> {
        let mut item = HashMap::with_capacity(self.fields().len());
        for field in self.fields() {
            if let Some(av) = self.encode_field(field, record)? {
                item.insert(field.attribute_name().to_string(), av);
            }
        }
        Ok(item)
    }

    /// Decodes `item` into `record`.
    ///
    /// Key fields are skipped; they are expected to be set already. An attribute missing from the
    /// item is only accepted for an optional field that currently holds its zero value. On error,
    /// fields visited before the failing one have already been updated.
    pub fn decode(&self, item: &Item, record: &mut R) -> Result<(), ItemError> {
        for field in self.fields() {
            if field.is_partition_key() || field.is_sort_key() {
                continue;
            }
            let name = field.attribute_name();
            let access = field.access();
            match item.get(name) {
                Some(av) => access.decode(record, av).map_err(|err| {
                    ItemError::decode(self.record(), name, field.type_name(), av, err)
                })?,
                None if !field.is_optional() => {
                    return Err(ItemError::missing_attribute(self.record(), name));
                }
                None if access.is_zero(record) => {
                    trace!(record = self.record(), field = name, "optional attribute absent");
                }
                None => return Err(ItemError::stale_optional(self.record(), name)),
            }
        }
        Ok(())
    }

    /// Extracts the key of `record`: its partition key and, if one is annotated, its sort key.
    pub fn key(&self, record: &R) -> Result<Item, ItemError> {
        let partition_key = self
            .partition_key()
            .ok_or_else(|| ItemError::new(self.record(), ItemErrorKind::MissingPartitionKey))?;
        let mut key = HashMap::with_capacity(2);
        for field in std::iter::once(partition_key).chain(self.sort_key()) {
            if let Some(av) = self.encode_field(field, record)? {
                key.insert(field.attribute_name().to_string(), av);
            }
        }
        Ok(key)
    }

    fn encode_field(
        &self,
        field: &FieldDescriptor<R>,
        record: &R,
    ) -> Result<Option<AttributeValue>, ItemError> {
        let access = field.access();
        if (field.is_optional() || field.encoded_default().is_some()) && access.is_zero(record) {
            if field.is_optional() {
                trace!(
                    record = self.record(),
                    field = field.attribute_name(),
                    "omitting zero optional field"
                );
                return Ok(None);
            }
            if let Some(default) = field.encoded_default() {
                trace!(
                    record = self.record(),
                    field = field.attribute_name(),
                    "substituting default value"
                );
                return Ok(Some(default.clone()));
            }
        }
        access.encode(record).map(Some).map_err(|err| {
            ItemError::encode(
                self.record(),
                field.attribute_name(),
                field.type_name(),
                err,
            )
        })
    }
}
