/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_cfg))]
/* End of automatically managed default lints */

//! Declarative mapping between Rust structs and DynamoDB items.
//!
//! Derive [`Record`] on a struct and annotate its fields to control how each one is stored:
//!
//! ```ignore
//! use ddb_record::Record;
//!
//! #[derive(Debug, Default, Record)]
//! struct Device {
//!     #[ddb("pk,n=id")]
//!     device_id: String,
//!     #[ddb("sk")]
//!     revision: u32,
//!     #[ddb("def=unknown")]
//!     vendor: String,
//!     #[ddb("opt")]
//!     address: Option<std::net::IpAddr>,
//!     #[ddb("t=seconds")]
//!     uptime: time::Duration,
//!     #[ddb(skip)]
//!     dirty: bool,
//! }
//!
//! let item = ddb_record::encode(&device)?;
//! let mut copy = Device { device_id: device.device_id.clone(), revision: 1, ..Default::default() };
//! ddb_record::decode(&item, &mut copy)?;
//! ```
//!
//! The directives are:
//!
//! | directive | meaning |
//! |---|---|
//! | `pk` / `sk` | the field is the partition / sort key |
//! | `n=<name>` | store the field under `<name>` instead of the field name |
//! | `t=<kind>` | force an encoding: `string`, `binary` (`bytes`), `json`, `nanoseconds` (`nano`), `seconds` (`epoch`) |
//! | `def=<value>` | store `<value>` when the field holds its zero value |
//! | `opt` | leave the attribute out when the field holds its zero value |
//!
//! Directives are checked the first time a record type is used. A mistake is reported as a
//! [`RegistrationError`] from every operation on that type.
//!
//! With the `client` feature, [`client::Table`] reads and writes records through an
//! `aws_sdk_dynamodb::Client`.

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms
)]

pub use ddb_record_core::*;
pub use ddb_record_core::Record;
pub use ddb_record_macros::Record;

#[cfg(feature = "client")]
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
pub mod client;
