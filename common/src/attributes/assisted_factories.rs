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

use crate::manifest::{AssistedFactory, ItemKind, Manifest};
use crate::manifest_parser::Mod;
use crate::parsing;
use anyhow::{bail, Result};
use syn::Item;

pub fn handle_assisted_factory_attribute(item: &Item, mod_: &Mod) -> Result<Manifest> {
    let mut factory = AssistedFactory::default();
    match item {
        Item::Trait(item_trait) => {
            factory.kind = ItemKind::Trait;
            factory.type_data = mod_.resolve_declare_path(&item_trait.ident.to_string());
            factory.type_params = parsing::get_type_params(&item_trait.generics);
            factory.supertraits = parsing::get_supertraits(item_trait, mod_)?;
            factory.methods = parsing::get_trait_methods(item_trait, mod_)?;
            factory.location = parsing::location(item_trait.ident.span(), mod_);
        }
        Item::Struct(item_struct) => {
            factory.kind = ItemKind::Struct;
            factory.type_data = mod_.resolve_declare_path(&item_struct.ident.to_string());
            factory.location = parsing::location(item_struct.ident.span(), mod_);
        }
        Item::Enum(item_enum) => {
            factory.kind = ItemKind::Enum;
            factory.type_data = mod_.resolve_declare_path(&item_enum.ident.to_string());
            factory.location = parsing::location(item_enum.ident.span(), mod_);
        }
        _ => bail!("#[assisted_factory] must be placed on a trait"),
    }
    let mut manifest = Manifest::new();
    manifest.assisted_factories.push(factory);
    Ok(manifest)
}
