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

use crate::manifest::{Constructor, Injectable, ItemKind, Manifest, Visibility};
use crate::manifest_parser::{impl_type, Mod};
use crate::parsing;
use anyhow::{bail, Result};
use syn::Item;

pub fn handle_injectable_attribute(item: &Item, mod_: &Mod) -> Result<Manifest> {
    let mut injectable = Injectable::new();
    match item {
        Item::Impl(item_impl) => {
            if item_impl.trait_.is_some() {
                bail!("#[injectable] must be placed on an inherent impl block");
            }
            let (type_data, type_params) = impl_type(item_impl, mod_)?;
            let impl_mod = mod_.with_type_params(&type_params);
            injectable.type_data = type_data;
            injectable.type_params = type_params;
            injectable.scopes = parsing::get_scopes(&item_impl.attrs, &impl_mod)?;
            injectable.qualifiers = parsing::get_qualifiers(&item_impl.attrs, &impl_mod)?;
            injectable.location = parsing::location(
                syn::spanned::Spanned::span(&item_impl.self_ty),
                mod_,
            );
            for impl_item in &item_impl.items {
                if let syn::ImplItem::Fn(ref method) = impl_item {
                    if let Some(constructor) = parse_constructor(
                        &method.attrs,
                        &method.sig,
                        parsing::get_visibility(&method.vis),
                        &impl_mod,
                    )? {
                        injectable.constructors.push(constructor);
                    }
                }
            }
        }
        Item::Trait(item_trait) => {
            injectable.kind = ItemKind::Trait;
            injectable.type_data = mod_.resolve_declare_path(&item_trait.ident.to_string());
            injectable.type_params = parsing::get_type_params(&item_trait.generics);
            injectable.scopes = parsing::get_scopes(&item_trait.attrs, mod_)?;
            injectable.location = parsing::location(item_trait.ident.span(), mod_);
            for trait_item in &item_trait.items {
                if let syn::TraitItem::Fn(ref method) = trait_item {
                    if let Some(constructor) =
                        parse_constructor(&method.attrs, &method.sig, Visibility::Public, mod_)?
                    {
                        injectable.constructors.push(constructor);
                    }
                }
            }
        }
        _ => bail!("#[injectable] must be placed on an impl block"),
    }
    let mut manifest = Manifest::new();
    manifest.injectables.push(injectable);
    Ok(manifest)
}

fn parse_constructor(
    attrs: &[syn::Attribute],
    sig: &syn::Signature,
    visibility: Visibility,
    mod_: &Mod,
) -> Result<Option<Constructor>> {
    let inject = parsing::has_attribute(attrs, "inject");
    let assisted_inject = parsing::has_attribute(attrs, "assisted_inject");
    if !inject && !assisted_inject {
        return Ok(None);
    }
    if inject && assisted_inject {
        bail!("constructors cannot be annotated with both #[inject] and #[assisted_inject]");
    }
    if sig.receiver().is_some() {
        bail!("#[inject] methods must not take self");
    }
    let fallible = match parsing::get_return_type(sig, mod_)? {
        Some(return_type) => return_type.is_global("std::result::Result"),
        None => bail!("#[inject] methods must return Self"),
    };
    Ok(Some(Constructor {
        name: sig.ident.to_string(),
        visibility,
        assisted_inject,
        fallible,
        dependencies: parsing::get_dependencies(sig, mod_)?,
        location: parsing::location(sig.ident.span(), mod_),
    }))
}

#[cfg(test)]
mod tests {
    use crate::manifest::Visibility;
    use crate::manifest_parser::parse_source;

    #[test]
    fn parses_constructors() {
        let manifest = parse_source(
            "lib.rs",
            r#"
            pub struct Foo<T> { t: T }
            #[injectable]
            #[scoped(crate::Singleton)]
            impl<T> Foo<T> {
                #[inject]
                fn new(#[qualified(crate::Red)] bar: crate::Bar, t: T) -> Self { todo!() }
                #[assisted_inject]
                pub fn assisted(#[assisted] x: i32) -> Result<Self, String> { todo!() }
                pub fn other() {}
            }
            "#,
            false,
        )
        .unwrap();
        let foo = &manifest.injectables[0];
        assert_eq!(foo.type_params, vec!["T"]);
        assert!(foo.type_data.has_parameters());
        assert_eq!(foo.scopes[0].readable(), "crate::Singleton");
        assert_eq!(foo.constructors.len(), 2);
        let new = &foo.constructors[0];
        assert_eq!(new.visibility, Visibility::Private);
        assert_eq!(new.dependencies[0].qualifiers[0].readable(), "crate::Red");
        assert!(new.dependencies[1].type_data.has_parameters());
        let assisted = &foo.constructors[1];
        assert!(assisted.assisted_inject);
        assert!(assisted.fallible);
        assert_eq!(assisted.dependencies[0].assisted, Some("".to_owned()));
    }
}
