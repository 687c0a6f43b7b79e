/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_cfg))]
/* End of automatically managed default lints */

//! Derive macro for `ddb-record`.
//!
//! Use it through the `ddb-record` crate, which re-exports it.

extern crate proc_macro;

use proc_macro::TokenStream;
use syn::DeriveInput;

use crate::derive_impl::derive_record_impl;

mod derive_impl;

/// Implements `ddb_record::Record` for a struct with named fields.
///
/// Each field may carry one annotation:
///
/// - `#[ddb("...")]` with a comma separated list of directives: `pk`, `sk`, `n=<name>`,
///   `t=<encoding>`, `def=<value>` and `opt`
/// - `#[ddb(skip)]` to leave the field out of the item entirely
///
/// Fields of type `Option<T>` are encoded as `T`; `None` is their zero value.
///
/// Directives are validated when the record type is first used, not at compile time.
#[proc_macro_derive(Record, attributes(ddb))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    derive_record_impl(input).into()
}
