/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::HashMap;

use aws_sdk_dynamodb::operation::delete_item::DeleteItemOutput;
use aws_sdk_dynamodb::operation::get_item::{GetItemError, GetItemOutput};
use aws_sdk_dynamodb::operation::put_item::PutItemOutput;
use aws_sdk_dynamodb::types::error::ResourceNotFoundException;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use aws_smithy_mocks::{mock, mock_client};
use ddb_record::client::{OperationError, Table};
use ddb_record::Record;
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

#[derive(Debug, Default, PartialEq, Record)]
struct Device {
    #[ddb("pk,n=id")]
    device_id: String,
    #[ddb("sk")]
    revision: u32,
    #[ddb("def=unknown")]
    vendor: String,
    #[ddb("opt")]
    label: Option<String>,
}

fn stored_item() -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("id".to_string(), AttributeValue::S("d-1".into())),
        ("revision".to_string(), AttributeValue::N("3".into())),
        ("vendor".to_string(), AttributeValue::S("acme".into())),
        ("label".to_string(), AttributeValue::S("kitchen".into())),
    ])
}

fn table(client: Client) -> Table {
    Table::builder()
        .client(client)
        .table_name("devices")
        .build()
        .expect("client and table name are set")
}

fn lookup() -> Device {
    Device {
        device_id: "d-1".into(),
        revision: 3,
        ..Default::default()
    }
}

#[tokio::test]
async fn get_decodes_the_stored_item() {
    let get = mock!(Client::get_item)
        .match_requests(|req| {
            req.table_name() == Some("devices")
                && req.key().map(|key| key.len()) == Some(2)
                && req.key().and_then(|key| key.get("id")) == Some(&AttributeValue::S("d-1".into()))
        })
        .then_output(|| GetItemOutput::builder().set_item(Some(stored_item())).build());
    let table = table(mock_client!(aws_sdk_dynamodb, [&get]));

    let mut device = lookup();
    table.get(&mut device).await.expect("item exists");
    assert_eq!(
        device,
        Device {
            device_id: "d-1".into(),
            revision: 3,
            vendor: "acme".into(),
            label: Some("kitchen".into()),
        }
    );
    assert_eq!(get.num_calls(), 1);
}

#[traced_test]
#[tokio::test]
async fn get_without_item_reports_the_key() {
    let get = mock!(Client::get_item).then_output(|| GetItemOutput::builder().build());
    let table = table(mock_client!(aws_sdk_dynamodb, [&get]));

    let err = table.get(&mut lookup()).await.unwrap_err();
    match err {
        OperationError::NoItem(err) => {
            assert_eq!(err.key().len(), 2);
            assert_eq!(
                err.to_string(),
                "no item found matching key \"id\"=\"d-1\",\"revision\"=3"
            );
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(logs_contain("no item for key"));
}

#[tokio::test]
async fn service_errors_are_passed_through() {
    let get = mock!(Client::get_item).then_error(|| {
        GetItemError::ResourceNotFoundException(
            ResourceNotFoundException::builder()
                .message("no such table")
                .build(),
        )
    });
    let table = table(mock_client!(aws_sdk_dynamodb, [&get]));

    let err = table.get(&mut lookup()).await.unwrap_err();
    assert!(matches!(
        err,
        OperationError::Service(aws_sdk_dynamodb::Error::ResourceNotFoundException(_))
    ));
}

#[tokio::test]
async fn put_sends_the_encoded_item() {
    let put = mock!(Client::put_item)
        .match_requests(|req| {
            req.table_name() == Some("devices")
                && req.item().and_then(|item| item.get("vendor"))
                    == Some(&AttributeValue::S("unknown".into()))
                && req.item().map(|item| item.contains_key("label")) == Some(false)
        })
        .then_output(|| PutItemOutput::builder().build());
    let table = table(mock_client!(aws_sdk_dynamodb, [&put]));

    table.put(&lookup()).await.expect("request matches");
    assert_eq!(put.num_calls(), 1);
}

#[tokio::test]
async fn delete_sends_only_the_key() {
    let delete = mock!(Client::delete_item)
        .match_requests(|req| {
            req.key().map(|key| {
                let mut names: Vec<_> = key.keys().cloned().collect();
                names.sort();
                names
            }) == Some(vec!["id".to_string(), "revision".to_string()])
        })
        .then_output(|| DeleteItemOutput::builder().build());
    let table = table(mock_client!(aws_sdk_dynamodb, [&delete]));

    let mut device = lookup();
    device.label = Some("garage".into());
    table.delete(&device).await.expect("request matches");
    assert_eq!(delete.num_calls(), 1);
}

#[tokio::test]
async fn conversion_errors_happen_before_any_request() {
    #[derive(Record)]
    struct Unkeyed {
        value: String,
    }

    let delete = mock!(Client::delete_item).then_output(|| DeleteItemOutput::builder().build());
    let table = table(mock_client!(aws_sdk_dynamodb, [&delete]));

    let err = table
        .delete(&Unkeyed {
            value: "v".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, OperationError::Item(_)));
    assert_eq!(delete.num_calls(), 0);
}
