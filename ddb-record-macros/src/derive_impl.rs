/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr, Type};

/// The argument of a `#[ddb(...)]` field attribute.
enum DdbAttr {
    /// `#[ddb("pk,n=id")]`
    Tag(LitStr),
    /// `#[ddb(skip)]`
    Skip,
}

impl Parse for DdbAttr {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        if input.peek(LitStr) {
            return Ok(DdbAttr::Tag(input.parse()?));
        }
        let ident: Ident = input.parse()?;
        if ident == "skip" {
            Ok(DdbAttr::Skip)
        } else {
            Err(syn::Error::new_spanned(
                ident,
                "expected a directive string such as `\"pk\"`, or `skip`",
            ))
        }
    }
}

struct RecordField {
    ident: Ident,
    name: String,
    index: usize,
    tag: String,
    ty: Type,
}

/// Implementation of `#[derive(Record)]`.
///
/// Generates `Record::fields`, listing every field that is not skipped with its declared name,
/// position, raw annotation, probed type capabilities and accessors.
pub(crate) fn derive_record_impl(input: DeriveInput) -> TokenStream2 {
    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &input.generics,
            "`Record` cannot be derived for generic types",
        )
        .to_compile_error();
    }
    let Data::Struct(data) = &input.data else {
        return syn::Error::new_spanned(&input.ident, "`Record` can only be derived for structs")
            .to_compile_error();
    };
    let Fields::Named(fields) = &data.fields else {
        return syn::Error::new_spanned(
            &input.ident,
            "`Record` can only be derived for structs with named fields",
        )
        .to_compile_error();
    };

    let mut record_fields = Vec::new();
    for (index, field) in fields.named.iter().enumerate() {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let tag = match field_attr(&field.attrs) {
            Ok(Some(DdbAttr::Skip)) => continue,
            Ok(Some(DdbAttr::Tag(tag))) => tag.value(),
            Ok(None) => String::new(),
            Err(e) => return e.to_compile_error(),
        };
        record_fields.push(RecordField {
            name: ident.unraw().to_string(),
            ident,
            index,
            tag,
            ty: field.ty.clone(),
        });
    }

    let record = &input.ident;
    let specs = record_fields.iter().map(|field| {
        let RecordField {
            ident,
            name,
            index,
            tag,
            ty,
        } = field;
        let info = match option_inner_type(ty) {
            Some(inner) => quote! { ::ddb_record::type_info!(#inner).optional() },
            None => quote! { ::ddb_record::type_info!(#ty) },
        };
        quote! {
            ::ddb_record::FieldSpec::new(
                #name,
                #index,
                #tag,
                #info,
                |record: &Self| &record.#ident,
                |record: &mut Self| &mut record.#ident,
            )
        }
    });

    quote! {
        #[automatically_derived]
        impl ::ddb_record::Record for #record {
            fn fields() -> ::std::vec::Vec<::ddb_record::FieldSpec<Self>> {
                ::std::vec![#(#specs),*]
            }
        }
    }
}

/// Reads the single `#[ddb(...)]` attribute of a field, if any.
fn field_attr(attrs: &[Attribute]) -> syn::Result<Option<DdbAttr>> {
    let mut found = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("ddb")) {
        if found.is_some() {
            return Err(syn::Error::new(
                attr.span(),
                "a field may carry at most one `#[ddb(...)]` attribute",
            ));
        }
        found = Some(attr.parse_args::<DdbAttr>()?);
    }
    Ok(found)
}

/// Returns `T` if `ty` is written as `Option<T>` (with or without a `std::option` or
/// `core::option` path).
///
/// Examples:
/// - `String` → `None`
/// - `Option<String>` → `Some(String)`
/// - `std::option::Option<Vec<u8>>` → `Some(Vec<u8>)`
/// - `Vec<Option<u8>>` → `None`
fn option_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }
    let segments = &type_path.path.segments;
    let prefix_ok = match segments.len() {
        1 => true,
        3 => {
            (segments[0].ident == "std" || segments[0].ident == "core")
                && segments[1].ident == "option"
        }
        _ => false,
    };
    let last = segments.last()?;
    if !prefix_ok || last.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(input: DeriveInput) -> String {
        derive_record_impl(input).to_string()
    }

    fn assert_compile_error(output: &str, message: &str) {
        assert!(output.contains("compile_error"), "{output}");
        assert!(output.contains(message), "{output}");
    }

    #[test]
    fn lists_fields_with_annotations() {
        let input: DeriveInput = syn::parse_quote! {
            struct User {
                #[ddb("pk,n=id")]
                user_id: String,
                #[ddb(skip)]
                cache: Vec<u8>,
                age: u8,
            }
        };
        let output = derive_record_impl(input);
        let item: syn::ItemImpl = syn::parse2(output).expect("should parse generated impl");
        let expected: syn::ItemImpl = syn::parse_quote! {
            #[automatically_derived]
            impl ::ddb_record::Record for User {
                fn fields() -> ::std::vec::Vec<::ddb_record::FieldSpec<Self>> {
                    ::std::vec![
                        ::ddb_record::FieldSpec::new(
                            "user_id",
                            0usize,
                            "pk,n=id",
                            ::ddb_record::type_info!(String),
                            |record: &Self| &record.user_id,
                            |record: &mut Self| &mut record.user_id,
                        ),
                        ::ddb_record::FieldSpec::new(
                            "age",
                            2usize,
                            "",
                            ::ddb_record::type_info!(u8),
                            |record: &Self| &record.age,
                            |record: &mut Self| &mut record.age,
                        )
                    ]
                }
            }
        };
        assert_eq!(quote!(#item).to_string(), quote!(#expected).to_string());
    }

    #[test]
    fn option_fields_are_lifted() {
        let input: DeriveInput = syn::parse_quote! {
            struct Profile {
                #[ddb("opt")]
                nickname: Option<String>,
                raw: std::option::Option<Vec<u8>>,
                nested: Vec<Option<u8>>,
            }
        };
        let output = expand(input);
        assert!(output.contains(
            &quote!(::ddb_record::type_info!(String).optional()).to_string()
        ));
        assert!(output.contains(
            &quote!(::ddb_record::type_info!(Vec<u8>).optional()).to_string()
        ));
        assert!(output.contains(&quote!(::ddb_record::type_info!(Vec<Option<u8> >)).to_string()));
    }

    #[test]
    fn raw_identifiers_use_plain_names() {
        let input: DeriveInput = syn::parse_quote! {
            struct Keyword {
                r#type: String,
            }
        };
        let output = expand(input);
        assert!(output.contains("\"type\""), "{output}");
        assert!(output.contains("record . r#type"), "{output}");
    }

    #[test]
    fn rejects_generics() {
        let input: DeriveInput = syn::parse_quote! {
            struct Wrapper<T> {
                value: T,
            }
        };
        assert_compile_error(&expand(input), "cannot be derived for generic types");
    }

    #[test]
    fn rejects_tuple_structs_and_enums() {
        let input: DeriveInput = syn::parse_quote! {
            struct Pair(String, u8);
        };
        assert_compile_error(&expand(input), "structs with named fields");

        let input: DeriveInput = syn::parse_quote! {
            enum Choice { A, B }
        };
        assert_compile_error(&expand(input), "can only be derived for structs");
    }

    #[test]
    fn rejects_bad_attributes() {
        let input: DeriveInput = syn::parse_quote! {
            struct Twice {
                #[ddb("pk")]
                #[ddb("opt")]
                id: String,
            }
        };
        assert_compile_error(&expand(input), "at most one");

        let input: DeriveInput = syn::parse_quote! {
            struct Unknown {
                #[ddb(hidden)]
                id: String,
            }
        };
        assert_compile_error(&expand(input), "expected a directive string");
    }
}
