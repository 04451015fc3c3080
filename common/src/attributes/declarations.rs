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

//! `#[scope]`, `#[qualifier]` and `Default` detection.

use crate::manifest::Manifest;
use crate::manifest_parser::{impl_type, Mod};
use crate::parsing::is_attribute;
use crate::type_data::TypeData;
use anyhow::{bail, Result};
use syn::{Attribute, Item};

pub fn handle_scope_attribute(item: &Item, mod_: &Mod) -> Result<Manifest> {
    let mut manifest = Manifest::new();
    manifest.scopes.push(declared_type(item, mod_, "scope")?);
    Ok(manifest)
}

pub fn handle_qualifier_attribute(item: &Item, mod_: &Mod) -> Result<Manifest> {
    let mut manifest = Manifest::new();
    manifest.qualifiers.push(declared_type(item, mod_, "qualifier")?);
    Ok(manifest)
}

fn declared_type(item: &Item, mod_: &Mod, attribute: &str) -> Result<TypeData> {
    match item {
        Item::Struct(_) | Item::Enum(_) => item_type(item, mod_),
        _ => bail!("#[{}] must be placed on a struct", attribute),
    }
}

/// Type declared or implemented by the item.
pub fn item_type(item: &Item, mod_: &Mod) -> Result<TypeData> {
    match item {
        Item::Struct(i) => Ok(mod_.resolve_declare_path(&i.ident.to_string())),
        Item::Enum(i) => Ok(mod_.resolve_declare_path(&i.ident.to_string())),
        Item::Impl(i) => Ok(impl_type(i, mod_)?.0),
        _ => bail!("struct, enum or impl expected"),
    }
}

pub fn derives_default(attrs: &[Attribute]) -> bool {
    attrs
        .iter()
        .filter(|attr| is_attribute(attr, "derive"))
        .any(|attr| {
            let mut found = false;
            attr.parse_nested_meta(|meta| {
                found |= meta
                    .path
                    .segments
                    .last()
                    .map(|segment| segment.ident == "Default")
                    .unwrap_or(false);
                Ok(())
            })
            .is_ok()
                && found
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::ItemStruct;

    fn attrs(src: &str) -> Vec<Attribute> {
        syn::parse_str::<ItemStruct>(src).unwrap().attrs
    }

    #[test]
    fn default_derives() {
        assert!(derives_default(&attrs("#[derive(Debug, Default)] struct Foo;")));
        assert!(derives_default(&attrs("#[derive(std::default::Default)] struct Foo;")));
        assert!(!derives_default(&attrs("#[derive(Debug, Clone)] struct Foo;")));
        assert!(!derives_default(&attrs("#[derive = \"Default\"] struct Foo;")));
        assert!(!derives_default(&attrs("struct Foo;")));
    }
}
