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

use crate::error::{spanned_compile_error, CompileError};
use crate::parsing;
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{FnArg, ImplItem};

pub fn handle_injectable_attribute(
    attr: TokenStream,
    input: TokenStream,
) -> Result<TokenStream, TokenStream> {
    if !attr.is_empty() {
        return spanned_compile_error(attr.span(), "#[injectable] takes no arguments");
    }
    let span = input.span();
    let mut item: syn::ItemImpl = syn::parse2(input).map_spanned_compile_error(
        span,
        "#[injectable] must be placed on an impl block",
    )?;
    if item.trait_.is_some() {
        return spanned_compile_error(
            item.span(),
            "#[injectable] must be placed on an inherent impl block",
        );
    }
    parsing::strip_markers(&mut item.attrs);

    let mut constructors = 0;
    for impl_item in item.items.iter_mut() {
        let ImplItem::Fn(ref mut method) = impl_item else {
            continue;
        };
        let is_constructor = parsing::has_attribute(&method.attrs, "inject")
            || parsing::has_attribute(&method.attrs, "assisted_inject");
        if is_constructor {
            constructors += 1;
            if let Some(FnArg::Receiver(receiver)) = method.sig.inputs.first() {
                return spanned_compile_error(
                    receiver.span(),
                    "injected constructors must not take self",
                );
            }
        }
        parsing::strip_markers(&mut method.attrs);
        parsing::strip_parameter_markers(&mut method.sig);
    }
    if constructors == 0 {
        return spanned_compile_error(
            item.self_ty.span(),
            "#[injectable] impl blocks need an #[inject] or #[assisted_inject] constructor",
        );
    }
    Ok(quote! {#item})
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_markers() {
        let result = handle_injectable_attribute(
            quote! {},
            quote! {
                #[scoped(crate::Singleton)]
                impl Foo {
                    #[inject]
                    pub fn new(#[qualified(crate::Red)] name: String) -> Self {
                        Foo
                    }
                }
            },
        )
        .unwrap();
        assert_eq!(
            result.to_string(),
            quote! {
                impl Foo {
                    pub fn new(name: String) -> Self {
                        Foo
                    }
                }
            }
            .to_string()
        );
    }

    #[test]
    fn requires_constructor() {
        let result = handle_injectable_attribute(
            quote! {},
            quote! {
                impl Foo {
                    pub fn new() -> Self { Foo }
                }
            },
        );
        assert!(result.unwrap_err().to_string().contains("need an #[inject]"));
    }

    #[test]
    fn rejects_struct() {
        let result = handle_injectable_attribute(quote! {}, quote! {pub struct Foo;});
        assert!(result.is_err());
    }
}
