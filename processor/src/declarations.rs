/*
Copyright 2026 Google LLC

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    https://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! `#[scope]` and `#[qualifier]` declare marker types.

use crate::error::{spanned_compile_error, CompileError};
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;

pub fn handle_marker_struct_attribute(
    marker: &str,
    input: TokenStream,
) -> Result<TokenStream, TokenStream> {
    let span = input.span();
    let item: syn::ItemStruct = syn::parse2(input).map_spanned_compile_error(
        span,
        &format!("#[{}] must be placed on a unit struct", marker),
    )?;
    if !matches!(item.fields, syn::Fields::Unit) {
        return spanned_compile_error(
            item.fields.span(),
            &format!("#[{}] must be placed on a unit struct", marker),
        );
    }
    Ok(quote! {#item})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_unit_struct() {
        assert!(handle_marker_struct_attribute("scope", quote! {pub struct Singleton;}).is_ok());
    }

    #[test]
    fn rejects_fields() {
        assert!(handle_marker_struct_attribute("qualifier", quote! {pub struct Red { i: i32 }}).is_err());
    }
}
