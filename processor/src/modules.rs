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
use syn::{FnArg, ImplItem, ImplItemFn, Pat, PathArguments, ReturnType, Type};

pub fn handle_module_attribute(
    _attr: TokenStream,
    input: TokenStream,
) -> Result<TokenStream, TokenStream> {
    let span = input.span();
    let mut item: syn::ItemImpl = syn::parse2(input)
        .map_spanned_compile_error(span, "#[module] must be placed on an impl block")?;
    parsing::strip_markers(&mut item.attrs);

    let mut removed = Vec::new();
    for (i, impl_item) in item.items.iter_mut().enumerate() {
        let ImplItem::Fn(ref mut method) = impl_item else {
            continue;
        };
        if parsing::has_attribute(&method.attrs, "binds") {
            fill_binds_body(method)?;
        } else if parsing::has_attribute(&method.attrs, "binds_option_of")
            || parsing::has_attribute(&method.attrs, "multibinds")
        {
            removed.push(i);
        }
        parsing::strip_markers(&mut method.attrs);
        parsing::strip_parameter_markers(&mut method.sig);
    }
    for i in removed.into_iter().rev() {
        item.items.remove(i);
    }
    Ok(quote! {#item})
}

/// `#[binds]` methods are declared with an empty body. The body converts the parameter to the
/// bound type: `Arc<dyn T>`/`Box<dyn T>` wrap it, anything else is returned as is.
fn fill_binds_body(method: &mut ImplItemFn) -> Result<(), TokenStream> {
    if !method.block.stmts.is_empty() {
        return spanned_compile_error(method.block.span(), "#[binds] methods must have an empty body");
    }
    if method.sig.inputs.len() != 1 {
        return spanned_compile_error(
            method.sig.span(),
            "#[binds] methods must take exactly one parameter",
        );
    }
    let parameter = match method.sig.inputs.first() {
        Some(FnArg::Typed(parameter)) => parameter,
        Some(receiver) => {
            return spanned_compile_error(receiver.span(), "#[binds] methods must not take self")
        }
        None => return spanned_compile_error(method.sig.span(), "missing parameter"),
    };
    let Pat::Ident(ref name) = *parameter.pat else {
        return spanned_compile_error(parameter.pat.span(), "identifier expected");
    };
    let name = &name.ident;
    let ReturnType::Type(_, ref return_type) = method.sig.output else {
        return spanned_compile_error(method.sig.span(), "#[binds] methods must return a value");
    };

    let body = match wrapper(return_type) {
        Some(wrapper) if !same_wrapper(&parameter.ty, &wrapper) => quote! {{ #wrapper::new(#name) }},
        _ => quote! {{ #name }},
    };
    method.block = syn::parse2(body).map_spanned_compile_error(method.block.span(), "invalid body")?;
    Ok(())
}

/// The path of a smart pointer to a trait object, without its generic arguments.
fn wrapper(ty: &Type) -> Option<syn::Path> {
    let Type::Path(ref type_path) = *ty else {
        return None;
    };
    let last = type_path.path.segments.last()?;
    let PathArguments::AngleBracketed(ref args) = last.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(Type::TraitObject(_)) => {}
        _ => return None,
    }
    let mut path = type_path.path.clone();
    if let Some(last) = path.segments.last_mut() {
        last.arguments = PathArguments::None;
    }
    Some(path)
}

/// Whether `ty` is already wrapped in `wrapper`, e.g. `Box<Impl>` bound as `Box<dyn T>`.
fn same_wrapper(ty: &Type, wrapper: &syn::Path) -> bool {
    let Type::Path(ref type_path) = *ty else {
        return false;
    };
    match (type_path.path.segments.last(), wrapper.segments.last()) {
        (Some(a), Some(b)) => a.ident == b.ident,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn module(input: TokenStream) -> String {
        handle_module_attribute(quote! {}, input).unwrap().to_string()
    }

    #[test]
    fn strips_provides() {
        assert_eq!(
            module(quote! {
                impl M {
                    #[provides]
                    #[scoped(crate::Singleton)]
                    pub fn name(&self, #[qualified(crate::Red)] color: String) -> String { color }
                }
            }),
            quote! {
                impl M {
                    pub fn name(&self, color: String) -> String { color }
                }
            }
            .to_string()
        );
    }

    #[test]
    fn binds_to_trait_object_wraps_parameter() {
        assert_eq!(
            module(quote! {
                impl M {
                    #[binds]
                    pub fn bind(greeter: crate::GreeterImpl) -> std::sync::Arc<dyn crate::Greeter> {}
                }
            }),
            quote! {
                impl M {
                    pub fn bind(greeter: crate::GreeterImpl) -> std::sync::Arc<dyn crate::Greeter> {
                        std::sync::Arc::new(greeter)
                    }
                }
            }
            .to_string()
        );
    }

    #[test]
    fn binds_wrapped_parameter_is_coerced() {
        assert_eq!(
            module(quote! {
                impl M {
                    #[binds]
                    pub fn bind(greeter: Box<crate::GreeterImpl>) -> Box<dyn crate::Greeter> {}
                }
            }),
            quote! {
                impl M {
                    pub fn bind(greeter: Box<crate::GreeterImpl>) -> Box<dyn crate::Greeter> {
                        greeter
                    }
                }
            }
            .to_string()
        );
    }

    #[test]
    fn declarations_are_removed() {
        assert_eq!(
            module(quote! {
                impl M {
                    #[binds_option_of]
                    pub fn maybe() -> Option<crate::Foo> {}
                    #[multibinds]
                    pub fn all() -> Vec<crate::Foo> {}
                }
            }),
            quote! {
                impl M {}
            }
            .to_string()
        );
    }

    #[test]
    fn binds_with_body_is_an_error() {
        let result = handle_module_attribute(
            quote! {},
            quote! {
                impl M {
                    #[binds]
                    pub fn bind(s: String) -> String { s }
                }
            },
        );
        assert!(result.is_err());
    }
}
