/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Reading and writing records through an `aws_sdk_dynamodb::Client`.

use std::error::Error as StdError;
use std::fmt;

use aws_sdk_dynamodb::Client;
use ddb_record_core::{ItemError, MetadataCache, NoItemError, Record};
use tracing::debug;

/// A DynamoDB table that records are stored in.
///
/// ```ignore
/// let table = Table::builder()
///     .client(aws_sdk_dynamodb::Client::new(&sdk_config))
///     .table_name("devices")
///     .build()?;
///
/// table.put(&device).await?;
/// ```
#[derive(Clone, Debug)]
pub struct Table {
    client: Client,
    table_name: String,
}

impl Table {
    /// Builder struct for [`Table`]
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    /// Returns the name of the table.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Loads the item matching the key fields of `record` and decodes it into `record`.
    ///
    /// Fails with [`OperationError::NoItem`] if the table has no item with that key.
    pub async fn get<R: Record>(&self, record: &mut R) -> Result<(), OperationError> {
        let metadata = MetadataCache::global()
            .get::<R>()
            .map_err(ItemError::from)?;
        let key = metadata.key(record)?;
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key.clone()))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        let Some(item) = output.item() else {
            debug!(table = %self.table_name, record = metadata.record(), "no item for key");
            return Err(NoItemError::new(key).into());
        };
        metadata.decode(item, record)?;
        Ok(())
    }

    /// Encodes `record` and writes it, replacing any item with the same key.
    pub async fn put<R: Record>(&self, record: &R) -> Result<(), OperationError> {
        let item = ddb_record_core::encode(record)?;
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(())
    }

    /// Deletes the item matching the key fields of `record`.
    pub async fn delete<R: Record>(&self, record: &R) -> Result<(), OperationError> {
        let key = ddb_record_core::key(record)?;
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(())
    }
}

/// Builder struct for [`Table`]
#[derive(Debug, Default)]
pub struct TableBuilder {
    client: Option<Client>,
    table_name: Option<String>,
}

impl TableBuilder {
    /// Sets the client used for every request.
    pub fn client(mut self, client: Client) -> Self {
        self.set_client(Some(client));
        self
    }

    /// Sets the client used for every request.
    pub fn set_client(&mut self, client: Option<Client>) {
        self.client = client;
    }

    /// Sets the name of the table.
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.set_table_name(Some(table_name.into()));
        self
    }

    /// Sets the name of the table.
    pub fn set_table_name(&mut self, table_name: Option<String>) {
        self.table_name = table_name;
    }

    /// Builds a [`Table`], otherwise returns a [`TableBuilderError`] if a required field is unset.
    pub fn build(self) -> Result<Table, TableBuilderError> {
        let client = self
            .client
            .ok_or(BuilderErrorKind::MissingRequiredField("client"))?;
        let table_name = self
            .table_name
            .ok_or(BuilderErrorKind::MissingRequiredField("table_name"))?;
        Ok(Table { client, table_name })
    }
}

#[derive(Debug)]
enum BuilderErrorKind {
    MissingRequiredField(&'static str),
}

impl From<BuilderErrorKind> for TableBuilderError {
    fn from(kind: BuilderErrorKind) -> Self {
        Self { kind }
    }
}

/// The error type returned when failing to build [`Table`] from the builder
#[derive(Debug)]
pub struct TableBuilderError {
    kind: BuilderErrorKind,
}

impl fmt::Display for TableBuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BuilderErrorKind::MissingRequiredField(name) => {
                write!(f, "`{name}` is required")
            }
        }
    }
}

impl StdError for TableBuilderError {}

/// Failure of a [`Table`] operation.
#[derive(Debug)]
#[non_exhaustive]
pub enum OperationError {
    /// The record could not be converted to or from an item.
    Item(ItemError),
    /// No item matched the key.
    NoItem(NoItemError),
    /// DynamoDB rejected the request, or it could not be sent.
    Service(aws_sdk_dynamodb::Error),
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationError::Item(_) => write!(f, "failed to convert record"),
            OperationError::NoItem(err) => write!(f, "{err}"),
            OperationError::Service(_) => write!(f, "DynamoDB request failed"),
        }
    }
}

impl StdError for OperationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            OperationError::Item(err) => Some(err),
            OperationError::NoItem(_) => None,
            OperationError::Service(err) => Some(err),
        }
    }
}

impl From<ItemError> for OperationError {
    fn from(err: ItemError) -> Self {
        OperationError::Item(err)
    }
}

impl From<NoItemError> for OperationError {
    fn from(err: NoItemError) -> Self {
        OperationError::NoItem(err)
    }
}

impl From<aws_sdk_dynamodb::Error> for OperationError {
    fn from(err: aws_sdk_dynamodb::Error) -> Self {
        OperationError::Service(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_requires_client_and_table_name() {
        let err = Table::builder().table_name("t").build().unwrap_err();
        assert_eq!(err.to_string(), "`client` is required");

        let conf = aws_sdk_dynamodb::Config::builder()
            .with_test_defaults()
            .region(aws_sdk_dynamodb::config::Region::from_static("us-east-1"))
            .build();
        let err = Table::builder()
            .client(Client::from_conf(conf))
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "`table_name` is required");
    }
}
