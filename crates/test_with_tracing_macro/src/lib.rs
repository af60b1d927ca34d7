// Copyright (C) Microsoft Corporation. All rights reserved.

//! Proc macro for the `#[test_with_tracing::test]` attribute.
//!
//! The attribute replaces `#[test]`: the annotated function keeps its
//! signature, attributes and body, and a call to `test_with_tracing::init()`
//! is inserted as the first statement so a subscriber is installed before any
//! code under test runs.
//!
//! # Examples
//!
//! ```ignore
//! use test_with_tracing::test;
//!
//! #[test]
//! fn test_update() {
//!     tracing::info!("captured by the test writer");
//! }
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::parse_macro_input;
use syn::spanned::Spanned;
use syn::ItemFn;

/// Attribute macro that marks a test and initializes tracing for it.
///
/// See the [crate-level documentation](crate) for usage details.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = parse_macro_input!(item as ItemFn);

    expand_test(attr.into(), item)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn expand_test(
    attr: proc_macro2::TokenStream,
    item: ItemFn,
) -> syn::Result<proc_macro2::TokenStream> {
    if !attr.is_empty() {
        return Err(syn::Error::new(
            attr.span(),
            "#[test_with_tracing::test] does not take arguments",
        ));
    }

    if item.sig.asyncness.is_some() {
        return Err(syn::Error::new(
            item.sig.fn_token.span(),
            "#[test_with_tracing::test] does not support async functions",
        ));
    }

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = item;
    let stmts = &block.stmts;

    Ok(quote! {
        #[::core::prelude::v1::test]
        #(#attrs)*
        #vis #sig {
            ::test_with_tracing::init();
            #(#stmts)*
        }
    })
}
