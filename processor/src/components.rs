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

//! Components, subcomponents, their creators and assisted factories are all declared on traits.

use crate::error::CompileError;
use crate::parsing;
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::TraitItem;

pub fn handle_trait_attribute(
    marker: &str,
    input: TokenStream,
) -> Result<TokenStream, TokenStream> {
    let span = input.span();
    let mut item: syn::ItemTrait = syn::parse2(input).map_spanned_compile_error(
        span,
        &format!("#[{}] must be placed on a trait", marker),
    )?;
    parsing::strip_markers(&mut item.attrs);
    for trait_item in item.items.iter_mut() {
        if let TraitItem::Fn(ref mut method) = trait_item {
            parsing::strip_markers(&mut method.attrs);
            parsing::strip_parameter_markers(&mut method.sig);
        }
    }
    Ok(quote! {#item})
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_method_and_parameter_markers() {
        let result = handle_trait_attribute(
            "subcomponent_builder",
            quote! {
                #[scoped(crate::Session)]
                pub trait SessionBuilder {
                    fn name(&mut self, #[bind_instance] #[qualified(crate::Red)] name: String);
                    #[qualified(crate::Red)]
                    fn build(self: Box<Self>) -> std::sync::Arc<dyn crate::Session>;
                }
            },
        )
        .unwrap();
        assert_eq!(
            result.to_string(),
            quote! {
                pub trait SessionBuilder {
                    fn name(&mut self, name: String);
                    fn build(self: Box<Self>) -> std::sync::Arc<dyn crate::Session>;
                }
            }
            .to_string()
        );
    }

    #[test]
    fn rejects_struct() {
        let result = handle_trait_attribute("component_builder", quote! {pub struct AppBuilder;});
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("#[component_builder] must be placed on a trait"));
    }
}
