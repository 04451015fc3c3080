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

use std::collections::HashSet;

use crate::manifest::{Component, ComponentType, Creator, CreatorKind, ItemKind, Manifest};
use crate::manifest_parser::Mod;
use crate::parsing;
use crate::type_data::TypeData;
use anyhow::{bail, Result};
use lazy_static::lazy_static;
use syn::Item;

lazy_static! {
    static ref COMPONENT_METADATA_KEYS: HashSet<String> = {
        let mut set = HashSet::<String>::new();
        set.insert("modules".to_owned());
        set.insert("dependencies".to_owned());
        set
    };
}

/// Identity, declared kind and location of the annotated item.
fn describe_item(item: &Item, mod_: &Mod) -> Result<(TypeData, ItemKind, Vec<String>, crate::manifest::Location)> {
    let (ident, kind, generics) = match item {
        Item::Trait(i) => (&i.ident, ItemKind::Trait, &i.generics),
        Item::Struct(i) => (&i.ident, ItemKind::Struct, &i.generics),
        Item::Enum(i) => (&i.ident, ItemKind::Enum, &i.generics),
        Item::Union(i) => (&i.ident, ItemKind::Other, &i.generics),
        _ => bail!("expected a trait"),
    };
    Ok((
        mod_.resolve_declare_path(&ident.to_string()),
        kind,
        parsing::get_type_params(generics),
        parsing::location(ident.span(), mod_),
    ))
}

pub fn handle_component_attribute(
    attr: &syn::Attribute,
    item: &Item,
    component_type: ComponentType,
    mod_: &Mod,
) -> Result<Manifest> {
    let attributes = parsing::get_parenthesized_field_values(&attr.meta)?;
    for key in attributes.keys() {
        if !COMPONENT_METADATA_KEYS.contains(key) {
            bail!("unknown key: {}", key);
        }
    }
    if component_type == ComponentType::Subcomponent && attributes.contains_key("dependencies") {
        bail!("#[subcomponent] cannot declare dependencies");
    }

    let (type_data, kind, type_params, location) = describe_item(item, mod_)?;
    let mut component = Component::new();
    component.type_data = type_data;
    component.kind = kind;
    component.component_type = component_type;
    component.type_params = type_params;
    component.location = location;
    component.modules = parsing::get_types(attributes.get("modules"), mod_)?;
    component.dependencies = parsing::get_types(attributes.get("dependencies"), mod_)?;
    if let Item::Trait(item_trait) = item {
        component.scopes = parsing::get_scopes(&item_trait.attrs, mod_)?;
        component.supertraits = parsing::get_supertraits(item_trait, mod_)?;
        component.methods = parsing::get_trait_methods(item_trait, mod_)?;
    }

    let mut manifest = Manifest::new();
    manifest.components.push(component);
    Ok(manifest)
}

pub fn handle_creator_attribute(
    attr: &syn::Attribute,
    item: &Item,
    creator_kind: CreatorKind,
    for_subcomponent: bool,
    mod_: &Mod,
) -> Result<Manifest> {
    let (type_data, kind, type_params, location) = describe_item(item, mod_)?;
    let mut creator = Creator {
        type_data,
        kind,
        creator_kind,
        for_subcomponent,
        component: parsing::get_parenthesized_type(attr, mod_)?,
        type_params,
        location,
        ..Default::default()
    };
    if let Item::Trait(item_trait) = item {
        creator.supertraits = parsing::get_supertraits(item_trait, mod_)?;
        creator.methods = parsing::get_trait_methods(item_trait, mod_)?;
    }
    let mut manifest = Manifest::new();
    manifest.creators.push(creator);
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use crate::manifest::{ComponentType, CreatorKind, ItemKind, Receiver};
    use crate::manifest_parser::parse_source;

    #[test]
    fn parses_component_and_creator() {
        let manifest = parse_source(
            "lib.rs",
            r#"
            #[component(modules: [crate::AppModule], dependencies: [crate::Dep])]
            #[scoped(crate::Singleton)]
            pub trait App: Send + Sync {
                fn foo(&self) -> crate::Foo;
                fn describe(&self) -> String { String::new() }
            }

            #[component_builder(crate::App)]
            pub trait AppBuilder {
                fn dep(&mut self, dep: std::sync::Arc<dyn crate::Dep>);
                fn name(&mut self, #[bind_instance] name: String);
                fn build(self: Box<Self>) -> std::sync::Arc<dyn crate::App>;
            }

            #[subcomponent_factory(crate::Child)]
            pub struct NotATrait;
            "#,
            false,
        )
        .unwrap();
        let app = &manifest.components[0];
        assert_eq!(app.component_type, ComponentType::Component);
        assert_eq!(app.modules[0].readable(), "crate::AppModule");
        assert_eq!(app.dependencies[0].readable(), "crate::Dep");
        assert_eq!(app.scopes[0].readable(), "crate::Singleton");
        assert!(app.supertraits.is_empty());
        assert!(app.methods[1].has_default);

        let builder = &manifest.creators[0];
        assert_eq!(builder.creator_kind, CreatorKind::Builder);
        assert_eq!(builder.component.readable(), "crate::App");
        assert!(builder.methods[1].parameters[0].bind_instance);
        assert_eq!(builder.methods[2].receiver, Receiver::Boxed);

        let factory = &manifest.creators[1];
        assert!(factory.for_subcomponent);
        assert_eq!(factory.kind, ItemKind::Struct);
    }
}
