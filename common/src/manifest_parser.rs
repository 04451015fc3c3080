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

//! Walks a crate's source tree and collects dirk declarations into a [`Manifest`].

use crate::attributes;
use crate::attributes::cfg::CfgEval;
use crate::manifest::{ComponentType, CreatorKind, Manifest, TraitDecl, TypeRoot};
use crate::parsing::{find_attribute, get_attribute, location};
use crate::type_data;
use crate::type_data::TypeData;
use anyhow::{bail, Context, Result};
use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use syn::spanned::Spanned;
use syn::{Attribute, Item, ItemUse, Meta, UseTree};

const DEFAULT_DEPS: [&str; 4] = ["std", "core", "alloc", "dirk"];

/// Parses the crate rooted at `src_path` (`src/lib.rs` or `src/main.rs`), following `mod x;`
/// declarations into their files.
pub fn parse_crate(src_path: &Path, cfg_test: bool) -> Result<Manifest> {
    let dir = src_path
        .parent()
        .with_context(|| format!("{:?} has no parent directory", src_path))?
        .to_owned();
    parse_file(src_path, &dir, &Vec::new(), cfg_test)
}

/// Parses a single source file. Out-of-line `mod x;` declarations are not followed.
pub fn parse_source(file_name: &str, src: &str, cfg_test: bool) -> Result<Manifest> {
    let syn_file =
        syn::parse_file(src).with_context(|| format!("{} is not valid rust", file_name))?;
    let context = FileContext {
        file: file_name.to_owned(),
        dir: None,
        cfg_test,
    };
    parse_mods(&context, &syn_file.items, &Vec::new())
}

/// Every source file visited while parsing the crate, for `rerun-if-changed`.
pub fn source_files(src_path: &Path, cfg_test: bool) -> Result<Vec<PathBuf>> {
    let mut result = vec![src_path.to_owned()];
    let dir = src_path
        .parent()
        .with_context(|| format!("{:?} has no parent directory", src_path))?
        .to_owned();
    collect_files(src_path, &dir, cfg_test, &mut result)?;
    Ok(result)
}

struct FileContext {
    file: String,
    /// Directory holding the files of child modules. `None` when only a single file is parsed.
    dir: Option<PathBuf>,
    cfg_test: bool,
}

fn read_file(src_path: &Path) -> Result<syn::File> {
    let src = std::fs::read_to_string(src_path)
        .with_context(|| format!("unable to read source {:?}", src_path))?;
    syn::parse_file(&src).with_context(|| format!("{:?} is not valid rust", src_path))
}

fn parse_file(src_path: &Path, dir: &Path, mod_path: &Vec<String>, cfg_test: bool) -> Result<Manifest> {
    let syn_file = read_file(src_path)?;
    let context = FileContext {
        file: src_path.to_string_lossy().replace('\\', "/"),
        dir: Some(dir.to_owned()),
        cfg_test,
    };
    parse_mods(&context, &syn_file.items, mod_path)
}

fn collect_files(src_path: &Path, dir: &Path, cfg_test: bool, result: &mut Vec<PathBuf>) -> Result<()> {
    let syn_file = read_file(src_path)?;
    collect_mod_files(&syn_file.items, dir, cfg_test, result)
}

fn collect_mod_files(items: &[Item], dir: &Path, cfg_test: bool, result: &mut Vec<PathBuf>) -> Result<()> {
    for item in items {
        if !is_enabled(&item_attrs(item), cfg_test)? {
            continue;
        }
        if let Item::Mod(item_mod) = item {
            let mod_name = item_mod.ident.to_string();
            if let Some((_, ref items)) = item_mod.content {
                collect_mod_files(items, &dir.join(&mod_name), cfg_test, result)?;
            } else {
                let (file, child_dir) = find_mod_file(dir, &mod_name)?;
                result.push(file.clone());
                collect_files(&file, &child_dir, cfg_test, result)?;
            }
        }
    }
    Ok(())
}

fn find_mod_file(dir: &Path, mod_name: &str) -> Result<(PathBuf, PathBuf)> {
    let flat = dir.join(format!("{}.rs", mod_name));
    if flat.exists() {
        return Ok((flat, dir.join(mod_name)));
    }
    let nested = dir.join(mod_name).join("mod.rs");
    if nested.exists() {
        return Ok((nested, dir.join(mod_name)));
    }
    bail!("cannot find any of {:?}, {:?}", flat, nested)
}

fn is_enabled(attrs: &[Attribute], cfg_test: bool) -> Result<bool> {
    if let Some(cfg) = find_attribute(attrs, "cfg") {
        if let Meta::List(meta_list) = &cfg.meta {
            return Ok(attributes::cfg::handle_cfg(meta_list)?.eval(cfg_test));
        }
    }
    Ok(true)
}

fn parse_mods(context: &FileContext, items: &[Item], mod_path: &Vec<String>) -> Result<Manifest> {
    let mut local_mods = HashSet::new();
    for item in items {
        if let Item::Mod(item_mod) = item {
            local_mods.insert(item_mod.ident.to_string());
        }
    }
    let mod_ = Mod {
        file: context.file.clone(),
        path: mod_path.clone(),
        uses: get_uses(items, mod_path, &local_mods, context.cfg_test)?,
        local_mods,
        type_params: Vec::new(),
    };
    let mut result = Manifest::new();
    for item in items.iter() {
        let attrs = item_attrs(item);
        if !is_enabled(&attrs, context.cfg_test)? {
            continue;
        }

        if let Item::Mod(item_mod) = item {
            result.merge_from(&parse_mod_item(context, item_mod, mod_path)?);
            continue;
        }

        let derived_default = attributes::declarations::derives_default(&attrs)
            && matches!(item, Item::Struct(_) | Item::Enum(_));
        if derived_default || is_default_impl(item) {
            result
                .default_constructibles
                .push(attributes::declarations::item_type(item, &mod_)?);
        }

        let mut handled = false;
        for attribute in attrs.iter() {
            let manifest = match get_attribute(attribute).as_str() {
                "injectable" => attributes::injectables::handle_injectable_attribute(item, &mod_),
                "module" => attributes::modules::handle_module_attribute(attribute, item, &mod_),
                "component" => attributes::components::handle_component_attribute(
                    attribute,
                    item,
                    ComponentType::Component,
                    &mod_,
                ),
                "subcomponent" => attributes::components::handle_component_attribute(
                    attribute,
                    item,
                    ComponentType::Subcomponent,
                    &mod_,
                ),
                "component_builder" => attributes::components::handle_creator_attribute(
                    attribute,
                    item,
                    CreatorKind::Builder,
                    false,
                    &mod_,
                ),
                "component_factory" => attributes::components::handle_creator_attribute(
                    attribute,
                    item,
                    CreatorKind::Factory,
                    false,
                    &mod_,
                ),
                "subcomponent_builder" => attributes::components::handle_creator_attribute(
                    attribute,
                    item,
                    CreatorKind::Builder,
                    true,
                    &mod_,
                ),
                "subcomponent_factory" => attributes::components::handle_creator_attribute(
                    attribute,
                    item,
                    CreatorKind::Factory,
                    true,
                    &mod_,
                ),
                "assisted_factory" => {
                    attributes::assisted_factories::handle_assisted_factory_attribute(item, &mod_)
                }
                "scope" => attributes::declarations::handle_scope_attribute(item, &mod_),
                "qualifier" => attributes::declarations::handle_qualifier_attribute(item, &mod_),
                _ => continue,
            };
            handled = true;
            result.merge_from(&manifest.with_context(|| {
                format!(
                    "{}: unable to process #[{}]",
                    location(attribute.span(), &mod_),
                    get_attribute(attribute)
                )
            })?);
        }

        if !handled {
            if let Item::Trait(item_trait) = item {
                result.traits.push(TraitDecl {
                    type_data: mod_.resolve_declare_path(&item_trait.ident.to_string()),
                    supertraits: crate::parsing::get_supertraits(item_trait, &mod_)?,
                    methods: crate::parsing::get_trait_methods(item_trait, &mod_)?,
                    location: location(item_trait.ident.span(), &mod_),
                });
            }
        }
    }
    Ok(result)
}

fn is_default_impl(item: &Item) -> bool {
    if let Item::Impl(item_impl) = item {
        if let Some((_, ref path, _)) = item_impl.trait_ {
            return path
                .segments
                .last()
                .map(|s| s.ident == "Default")
                .unwrap_or(false);
        }
    }
    false
}

pub(crate) fn item_attrs(item: &Item) -> Vec<Attribute> {
    match item {
        Item::Const(i) => i.attrs.clone(),
        Item::Enum(i) => i.attrs.clone(),
        Item::ExternCrate(i) => i.attrs.clone(),
        Item::Fn(i) => i.attrs.clone(),
        Item::ForeignMod(i) => i.attrs.clone(),
        Item::Impl(i) => i.attrs.clone(),
        Item::Macro(i) => i.attrs.clone(),
        Item::Mod(i) => i.attrs.clone(),
        Item::Static(i) => i.attrs.clone(),
        Item::Struct(i) => i.attrs.clone(),
        Item::Trait(i) => i.attrs.clone(),
        Item::TraitAlias(i) => i.attrs.clone(),
        Item::Type(i) => i.attrs.clone(),
        Item::Union(i) => i.attrs.clone(),
        Item::Use(i) => i.attrs.clone(),
        _ => Vec::new(),
    }
}

fn parse_mod_item(
    context: &FileContext,
    item_mod: &syn::ItemMod,
    parents: &Vec<String>,
) -> Result<Manifest> {
    let mod_name = item_mod.ident.to_string();
    let mut mod_path = parents.clone();
    mod_path.push(mod_name.clone());
    if let Some((_, ref items)) = item_mod.content {
        let child_context = FileContext {
            file: context.file.clone(),
            dir: context.dir.as_ref().map(|dir| dir.join(&mod_name)),
            cfg_test: context.cfg_test,
        };
        return parse_mods(&child_context, items, &mod_path);
    }
    let Some(ref dir) = context.dir else {
        return Ok(Manifest::new());
    };
    let (file, child_dir) = find_mod_file(dir, &mod_name)?;
    parse_file(&file, &child_dir, &mod_path, context.cfg_test)
}

fn get_uses(
    items: &[Item],
    mod_path: &Vec<String>,
    local_mods: &HashSet<String>,
    cfg_test: bool,
) -> Result<HashMap<String, UsePath>> {
    let mut deps: HashSet<String> = DEFAULT_DEPS.iter().map(|dep| dep.to_string()).collect();
    let mut result = HashMap::<String, UsePath>::new();
    for item in items.iter() {
        if !is_enabled(&item_attrs(item), cfg_test)? {
            continue;
        }
        if let Item::ExternCrate(extern_crate) = item {
            deps.insert(extern_crate.ident.to_string());
        }
    }
    for item in items.iter() {
        if !is_enabled(&item_attrs(item), cfg_test)? {
            continue;
        }
        if let Item::Use(item_use) = item {
            result.extend(process_use(item_use, &deps, mod_path, local_mods));
        }
    }
    for dep in &deps {
        if !result.contains_key(dep) && !local_mods.contains(dep) {
            result.insert(
                dep.clone(),
                UsePath {
                    path: dep.clone(),
                    root: TypeRoot::GLOBAL,
                },
            );
        }
    }
    Ok(result)
}

/// Name resolution scope of a module.
#[derive(Debug, Clone, Default)]
pub struct Mod {
    pub file: String,
    /// Module path from the crate root.
    pub path: Vec<String>,
    pub uses: HashMap<String, UsePath>,
    pub local_mods: HashSet<String>,
    /// Generic parameters of the item being parsed.
    pub type_params: Vec<String>,
}

impl Mod {
    pub fn crate_root() -> Mod {
        let mut result = Mod::default();
        for dep in DEFAULT_DEPS {
            result.uses.insert(
                dep.to_owned(),
                UsePath {
                    path: dep.to_owned(),
                    root: TypeRoot::GLOBAL,
                },
            );
        }
        result
    }

    pub fn with_type_params(&self, type_params: &[String]) -> Mod {
        let mut result = self.clone();
        result.type_params.extend(type_params.iter().cloned());
        result
    }

    /// Path of an item declared in this module.
    pub fn resolve_declare_path(&self, identifier: &str) -> TypeData {
        let mut path = self.path.clone();
        path.push(identifier.to_owned());
        TypeData::local(&path.join("::"))
    }

    pub fn resolve_path(&self, identifier: &str) -> Option<TypeData> {
        match identifier {
            "crate" => Some(TypeData::local("")),
            "self" => Some(TypeData::local(&self.path.join("::"))),
            "super" => {
                let parent = &self.path[..self.path.len().saturating_sub(1)];
                Some(TypeData::local(&parent.join("::")))
            }
            _ => self.uses.get(identifier).map(|use_path| TypeData {
                root: use_path.root.clone(),
                path: use_path.path.clone(),
                ..Default::default()
            }),
        }
    }
}

#[derive(Clone)]
pub struct UsePath {
    pub path: String,
    pub root: TypeRoot,
}

impl Debug for UsePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut result = String::new();
        if self.root == TypeRoot::CRATE {
            result.push_str("crate");
        }
        result.push_str("::");
        result.push_str(&self.path);
        write!(f, "{}", result)
    }
}

fn process_use(
    use_item: &ItemUse,
    deps: &HashSet<String>,
    mod_path: &Vec<String>,
    local_mods: &HashSet<String>,
) -> HashMap<String, UsePath> {
    let mut items = Vec::new();
    get_use_items(&use_item.tree, &mut Vec::new(), &mut items);

    let mut result = HashMap::<String, UsePath>::new();
    for (segments, name) in items {
        let Some(first) = segments.first() else {
            continue;
        };
        let (root, path) = if use_item.leading_colon.is_some()
            || (deps.contains(first) && !local_mods.contains(first))
        {
            (TypeRoot::GLOBAL, segments.clone())
        } else if first == "crate" || first == "self" || first == "super" || local_mods.contains(first)
        {
            let mut path = mod_path.clone();
            for segment in &segments {
                match segment.as_str() {
                    "crate" => path.clear(),
                    "self" => {}
                    "super" => {
                        path.pop();
                    }
                    _ => path.push(segment.clone()),
                }
            }
            (TypeRoot::CRATE, path)
        } else {
            (TypeRoot::GLOBAL, segments.clone())
        };
        result.insert(
            name,
            UsePath {
                path: path.join("::"),
                root,
            },
        );
    }
    result
}

/// Flattens a use tree into (full segments, imported name). Glob imports are skipped.
fn get_use_items(tree: &UseTree, prefix: &mut Vec<String>, result: &mut Vec<(Vec<String>, String)>) {
    match tree {
        UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            get_use_items(&path.tree, prefix, result);
            prefix.pop();
        }
        UseTree::Name(name) => {
            let mut segments = prefix.clone();
            let ident = name.ident.to_string();
            if ident == "self" {
                if let Some(last) = prefix.last() {
                    result.push((segments, last.clone()));
                }
                return;
            }
            segments.push(ident.clone());
            result.push((segments, ident));
        }
        UseTree::Rename(rename) => {
            let mut segments = prefix.clone();
            if rename.ident != "self" {
                segments.push(rename.ident.to_string());
            }
            result.push((segments, rename.rename.to_string()));
        }
        UseTree::Glob(_) => {}
        UseTree::Group(group) => {
            for item in group.items.iter() {
                get_use_items(item, prefix, result);
            }
        }
    }
}

/// Resolves the self type of an impl block, binding the impl's generic parameters.
pub(crate) fn impl_type(item_impl: &syn::ItemImpl, mod_: &Mod) -> Result<(TypeData, Vec<String>)> {
    let type_params = crate::parsing::get_type_params(&item_impl.generics);
    let impl_mod = mod_.with_type_params(&type_params);
    let type_data = type_data::from_syn_type(&item_impl.self_ty, &impl_mod)?;
    Ok((type_data, type_params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_uses_and_relative_paths() {
        let manifest = parse_source(
            "src/lib.rs",
            r#"
            mod a {
                use super::b::Bar;
                use std::sync::Arc;
                use dirk::{component, Provider as P};

                #[component]
                pub trait App {
                    fn bar(&self) -> Bar;
                    fn shared(&self) -> Arc<Bar>;
                    fn provider(&self) -> P<crate::b::Bar>;
                }
            }
            mod b {
                pub struct Bar;
            }
            "#,
            false,
        )
        .unwrap();
        let app = &manifest.components[0];
        assert_eq!(app.type_data.readable(), "crate::a::App");
        let returns: Vec<String> = app
            .methods
            .iter()
            .map(|m| m.return_type.as_ref().unwrap().readable())
            .collect();
        assert_eq!(
            returns,
            vec![
                "crate::b::Bar",
                "std::sync::Arc<crate::b::Bar>",
                "dirk::Provider<crate::b::Bar>"
            ]
        );
    }

    #[test]
    fn cfg_test_items_are_skipped_outside_tests() {
        let src = r#"
            #[cfg(test)]
            #[scope]
            pub struct TestScope;
            #[scope]
            pub struct Singleton;
        "#;
        assert_eq!(parse_source("lib.rs", src, false).unwrap().scopes.len(), 1);
        assert_eq!(parse_source("lib.rs", src, true).unwrap().scopes.len(), 2);
    }

    #[test]
    fn default_constructible_types() {
        let manifest = parse_source(
            "lib.rs",
            r#"
            #[derive(Default)]
            pub struct A;
            pub struct B;
            impl Default for B { fn default() -> Self { B } }
            pub struct C;
            "#,
            false,
        )
        .unwrap();
        let names: Vec<String> = manifest
            .default_constructibles
            .iter()
            .map(|t| t.readable())
            .collect();
        assert_eq!(names, vec!["crate::A", "crate::B"]);
    }
}
