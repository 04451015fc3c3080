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

use crate::manifest::BindingType::{Binds, BindsOptionOf, Multibinds, Provides};
use crate::manifest::{
    Binding, ItemKind, Manifest, Module, MultibindingMapKey, MultibindingType, Receiver,
};
use crate::manifest_parser::{impl_type, Mod};
use crate::parsing;
use crate::parsing::{get_parenthesized_field_values, FieldValue};
use crate::type_data::{self, TypeData};
use anyhow::Result;
use anyhow::{bail, Context};
use lazy_static::lazy_static;
use std::convert::TryFrom;
use syn::spanned::Spanned;
use syn::{ImplItemFn, Item};

lazy_static! {
    static ref MODULE_METADATA_KEYS: HashSet<String> = {
        let mut set = HashSet::<String>::new();
        set.insert("includes".to_owned());
        set.insert("subcomponents".to_owned());
        set
    };
}

pub fn handle_module_attribute(attr: &syn::Attribute, item: &Item, mod_: &Mod) -> Result<Manifest> {
    let attributes = get_parenthesized_field_values(&attr.meta)?;

    for key in attributes.keys() {
        if !MODULE_METADATA_KEYS.contains(key) {
            bail!("unknown key: {}", key);
        }
    }

    let mut module = Module::new();
    module.includes = parsing::get_types(attributes.get("includes"), mod_)?;
    module.subcomponents = parsing::get_types(attributes.get("subcomponents"), mod_)?;

    match item {
        Item::Impl(item_impl) => {
            let (module_type, type_params) = impl_type(item_impl, mod_)?;
            let impl_mod = mod_.with_type_params(&type_params);
            module.type_data = module_type;
            module.type_params = type_params;
            module.location = parsing::location(item_impl.self_ty.span(), mod_);
            for impl_item in &item_impl.items {
                if let syn::ImplItem::Fn(ref method) = impl_item {
                    if let Some(binding) = parse_binding(method, &impl_mod)? {
                        module.bindings.push(binding);
                    }
                }
            }
        }
        Item::Struct(item_struct) => {
            bail!(
                "#[module] must be placed on the impl block of {}, not the struct",
                item_struct.ident
            )
        }
        Item::Trait(item_trait) => {
            module.kind = ItemKind::Trait;
            module.type_data = mod_.resolve_declare_path(&item_trait.ident.to_string());
            module.location = parsing::location(item_trait.ident.span(), mod_);
        }
        _ => bail!("#[module] must be placed on an impl block"),
    }

    let mut manifest = Manifest::new();
    manifest.modules.push(module);
    Ok(manifest)
}

const BINDING_MARKERS: &str = "#[provides]/#[binds]/#[binds_option_of]/#[multibinds]";

/// Returns `None` for methods that carry no binding marker.
fn parse_binding(method: &ImplItemFn, mod_: &Mod) -> Result<Option<Binding>> {
    let type_params = parsing::get_type_params(&method.sig.generics);
    let mod_ = &mod_.with_type_params(&type_params);
    let mut option_binding: Option<Binding> = None;
    let mut multibinding = MultibindingType::None;
    let mut map_keys = Vec::new();
    for attr in &method.attrs {
        let binding_type = match parsing::get_attribute(attr).as_str() {
            "provides" => Provides,
            "binds" => Binds,
            "binds_option_of" => BindsOptionOf,
            "multibinds" => Multibinds,
            "into_vec" | "elements_into_vec" | "into_map" => {
                if multibinding != MultibindingType::None {
                    bail!("only one of #[into_vec]/#[elements_into_vec]/#[into_map] is allowed");
                }
                multibinding = match parsing::get_attribute(attr).as_str() {
                    "into_vec" => MultibindingType::IntoVec,
                    "elements_into_vec" => MultibindingType::ElementsIntoVec,
                    _ => {
                        map_keys.extend(parse_map_keys(attr, mod_)?);
                        MultibindingType::IntoMap
                    }
                };
                continue;
            }
            _ => continue,
        };
        if option_binding.is_some() {
            bail!(
                "#[module] methods can only be annotated by one of {}",
                BINDING_MARKERS
            );
        }
        option_binding = Some(Binding::new(binding_type));
    }
    let Some(mut binding) = option_binding else {
        if multibinding != MultibindingType::None {
            bail!(
                "multibinding markers must be used together with one of {}",
                BINDING_MARKERS
            );
        }
        return Ok(None);
    };
    binding.name = method.sig.ident.to_string();
    binding.receiver = parsing::get_receiver(&method.sig);
    binding.visibility = parsing::get_visibility(&method.vis);
    binding.dependencies = parsing::get_dependencies(&method.sig, mod_)?;
    binding.scopes = parsing::get_scopes(&method.attrs, mod_)?;
    binding.qualifiers = parsing::get_qualifiers(&method.attrs, mod_)?;
    binding.multibinding_type = multibinding;
    binding.map_keys = map_keys;
    binding.type_params = type_params;
    binding.has_body = !method.block.stmts.is_empty();
    binding.nullable = parsing::has_attribute(&method.attrs, "nullable");
    binding.location = parsing::location(method.sig.ident.span(), mod_);
    binding.type_data = match parsing::get_return_type(&method.sig, mod_)? {
        Some(return_type) => return_type,
        None => TypeData::primitive(type_data::UNIT),
    };
    if binding.receiver == Receiver::Value {
        bail!("#[module] methods should not consume self");
    }
    Ok(Some(binding))
}

fn parse_map_keys(attr: &syn::Attribute, mod_: &Mod) -> Result<Vec<MultibindingMapKey>> {
    let fields = get_parenthesized_field_values(&attr.meta)?;
    let mut result = Vec::new();
    if let Some(field) = fields.get("string_key") {
        if let FieldValue::StringLiteral(ref string) = field {
            result.push(MultibindingMapKey::String(string.clone()));
        } else {
            bail!("string literal expected for string_key");
        }
    }
    if let Some(field) = fields.get("i32_key") {
        if let FieldValue::IntLiteral(ref int) = field {
            result.push(MultibindingMapKey::I32(
                i32::try_from(*int).with_context(|| "key overflows i32")?,
            ));
        } else {
            bail!("i32 literal expected for i32_key");
        }
    }
    if let Some(field) = fields.get("enum_key") {
        if let FieldValue::Path(ref path) = field {
            let value_type = type_data::from_path(path, mod_)?;
            let mut enum_type = value_type.clone();
            enum_type.path.truncate(
                enum_type
                    .path
                    .rfind("::")
                    .with_context(|| "enum value should have at least one segment")?,
            );
            result.push(MultibindingMapKey::Enum(enum_type, value_type));
        } else {
            bail!("enum value expected for enum_key");
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use crate::manifest::{BindingType, MultibindingMapKey, MultibindingType, Receiver};
    use crate::manifest_parser::parse_source;

    #[test]
    fn parses_bindings() {
        let manifest = parse_source(
            "lib.rs",
            r#"
            use std::sync::Arc;
            pub struct AppModule;
            #[module(includes: [crate::Other], subcomponents: [crate::Child])]
            impl AppModule {
                #[provides]
                #[scoped(crate::Singleton)]
                pub fn provide_foo(&self, bar: crate::Bar) -> crate::Foo { todo!() }

                #[binds]
                pub fn bind_greeter(impl_: crate::GreeterImpl) -> Arc<dyn crate::Greeter> {}

                #[provides]
                #[into_map(string_key: "a")]
                pub fn a() -> i32 { 1 }

                #[provides]
                #[nullable]
                #[qualified(crate::Red)]
                pub fn maybe() -> Option<String> { None }

                pub fn helper() {}
            }
            "#,
            false,
        )
        .unwrap();
        let module = &manifest.modules[0];
        assert_eq!(module.includes[0].readable(), "crate::Other");
        assert_eq!(module.subcomponents[0].readable(), "crate::Child");
        assert_eq!(module.bindings.len(), 4);

        let provide_foo = &module.bindings[0];
        assert_eq!(provide_foo.receiver, Receiver::Ref);
        assert_eq!(provide_foo.scopes[0].readable(), "crate::Singleton");
        assert_eq!(provide_foo.dependencies[0].name, "bar");

        let binds = &module.bindings[1];
        assert_eq!(binds.binding_type, BindingType::Binds);
        assert!(!binds.has_body);
        assert_eq!(
            binds.type_data.readable(),
            "std::sync::Arc<dyn crate::Greeter>"
        );

        let a = &module.bindings[2];
        assert_eq!(a.multibinding_type, MultibindingType::IntoMap);
        assert_eq!(a.map_keys, vec![MultibindingMapKey::String("a".to_owned())]);

        let maybe = &module.bindings[3];
        assert!(maybe.nullable);
        assert_eq!(
            maybe.type_data.readable(),
            "std::option::Option<std::string::String>"
        );
        assert_eq!(maybe.qualifiers[0].readable(), "crate::Red");
    }

    #[test]
    fn rejects_two_binding_markers() {
        let result = parse_source(
            "lib.rs",
            r#"
            #[module]
            impl M {
                #[provides]
                #[binds]
                fn x() -> i32 { 1 }
            }
            "#,
            false,
        );
        assert!(result.is_err());
    }
}
