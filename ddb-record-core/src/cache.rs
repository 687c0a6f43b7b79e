/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Process-wide memoization of record metadata.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use tracing::{debug, trace};

use crate::error::RegistrationError;
use crate::record::{Record, RecordMetadata};

type Entry = Arc<dyn Any + Send + Sync>;

static GLOBAL: LazyLock<MetadataCache> = LazyLock::new(MetadataCache::new);

/// A table from record type to its [`RecordMetadata`].
///
/// Metadata is built on first use and kept for the lifetime of the cache. Lookup, build and
/// insertion all happen under one lock, so concurrent first use of a type builds it exactly once.
/// Failed builds are not remembered: a type that fails registration fails again on every call.
pub struct MetadataCache {
    entries: Mutex<HashMap<TypeId, Entry>>,
}

impl MetadataCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The cache shared by the whole process.
    pub fn global() -> &'static MetadataCache {
        &GLOBAL
    }

    /// Returns the metadata of `R`, building it if this is the first request.
    pub fn get<R: Record>(&self) -> Result<Arc<RecordMetadata<R>>, RegistrationError> {
        let record = type_name::<R>();
        // Entries are only inserted fully built; a poisoned table is still consistent.
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get(&TypeId::of::<R>()) {
            if let Ok(metadata) = Arc::clone(entry).downcast::<RecordMetadata<R>>() {
                trace!(record = record, "record metadata cache hit");
                return Ok(metadata);
            }
        }

        match RecordMetadata::<R>::build() {
            Ok(metadata) => {
                let metadata = Arc::new(metadata);
                debug!(
                    record = record,
                    fields = metadata.fields().len(),
                    partition_key = ?metadata.partition_key().map(|f| f.attribute_name()),
                    sort_key = ?metadata.sort_key().map(|f| f.attribute_name()),
                    "built record metadata"
                );
                entries.insert(TypeId::of::<R>(), metadata.clone());
                Ok(metadata)
            }
            Err(err) => {
                debug!(record = record, error = %err, "record registration failed");
                Err(err)
            }
        }
    }

    /// The number of record types cached.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if no record type has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataCache")
            .field("records", &self.len())
            .finish()
    }
}
