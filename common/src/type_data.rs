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

use serde::{Deserialize, Serialize};

use crate::manifest::TypeRoot;
use crate::manifest_parser::Mod;
use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

lazy_static! {
    /// auto used types that does not need fully qualified paths.
    static ref PRELUDE_V1: HashMap<String, String> = {
        let mut m = HashMap::<String, String>::new();
        m.insert("Box".into(), "std::boxed::Box".into());
        m.insert("Option".into(), "std::option::Option".into());
        m.insert("Result".into(), "std::result::Result".into());
        m.insert("String".into(), "std::string::String".into());
        m.insert("Vec".into(), "std::vec::Vec".into());
        m.insert("Provider".into(),"dirk::Provider".into() );
        m.insert("Lazy".into(),"dirk::Lazy".into() );
        m.insert("Producer".into(),"dirk::Producer".into() );
        m
    };
}

lazy_static! {
    /// primitive data types with no path
    static ref PRIMITIVES: HashSet<String> = {
        let mut m = HashSet::<String>::new();
        m.insert("i8".to_owned());
        m.insert("u8".to_owned());
        m.insert("i16".to_owned());
        m.insert("u16".to_owned());
        m.insert("i32".to_owned());
        m.insert("u32".to_owned());
        m.insert("i64".to_owned());
        m.insert("u64".to_owned());
        m.insert("i128".to_owned());
        m.insert("u128".to_owned());
        m.insert("isize".to_owned());
        m.insert("usize".to_owned());
        m.insert("f32".to_owned());
        m.insert("f64".to_owned());
        m.insert("bool".to_owned());
        m.insert("char".to_owned());
        m.insert("str".to_owned());
        m
    };
}

lazy_static! {
    /// marker traits that may follow the main trait of a trait object.
    static ref AUTO_TRAITS: HashSet<String> = {
        let mut m = HashSet::<String>::new();
        m.insert("Send".to_owned());
        m.insert("Sync".to_owned());
        m.insert("Unpin".to_owned());
        m
    };
}

pub const UNIT: &str = "()";
pub const STATIC_STR: &str = "&'static str";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TypeData {
    pub root: TypeRoot,
    pub path: String,
    pub args: Vec<TypeData>,
    pub trait_object: bool,
    /// Auto trait bounds of a trait object, e.g. `Send`.
    pub bounds: Vec<String>,
    pub identifier_suffix: String,
    pub qualifier: Option<Box<TypeData>>,
}

impl PartialEq for TypeData {
    fn eq(&self, other: &Self) -> bool {
        self.identifier_string().eq(&other.identifier_string())
    }
}

impl Eq for TypeData {}

impl Hash for TypeData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier_string().hash(state)
    }
}

impl PartialOrd for TypeData {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeData {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identifier_string().cmp(&other.identifier_string())
    }
}

impl TypeData {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn global(path: &str, args: Vec<TypeData>) -> Self {
        TypeData {
            root: TypeRoot::GLOBAL,
            path: path.to_owned(),
            args,
            ..Default::default()
        }
    }

    pub fn local(path: &str) -> Self {
        TypeData {
            root: TypeRoot::CRATE,
            path: path.to_owned(),
            ..Default::default()
        }
    }

    pub fn primitive(name: &str) -> Self {
        TypeData {
            root: TypeRoot::PRIMITIVE,
            path: name.to_owned(),
            ..Default::default()
        }
    }

    pub fn parameter(name: &str) -> Self {
        TypeData {
            root: TypeRoot::PARAMETER,
            path: name.to_owned(),
            ..Default::default()
        }
    }

    /// `dyn` form of the type.
    pub fn trait_object(mut self) -> Self {
        self.trait_object = true;
        self
    }

    /// Parses an absolute type such as `crate::Foo<::std::string::String>`.
    pub fn from_str(string: &str) -> Result<TypeData> {
        let syn_type: syn::Type =
            syn::parse_str(string).with_context(|| format!("type expected: {}", string))?;
        from_syn_type(&syn_type, &Mod::crate_root())
    }

    /// Full path of the type as it appears in generated code.
    pub fn canonical_string_path(&self) -> String {
        format!("{}{}", self.get_prefix(), self.path_with_args(false))
            + &self.get_suffix()
    }

    pub fn canonical_string_path_without_args(&self) -> String {
        let base = match self.root {
            TypeRoot::GLOBAL => format!("::{}", self.path),
            TypeRoot::CRATE => format!("crate::{}", self.path),
            _ => self.path.clone(),
        };
        format!("{}{}", self.get_prefix(), base)
    }

    fn get_prefix(&self) -> String {
        let mut prefix = String::new();
        if self.trait_object {
            prefix.push_str("dyn ");
        }
        prefix
    }

    fn get_suffix(&self) -> String {
        let mut suffix = String::new();
        for bound in &self.bounds {
            suffix.push_str(" + ");
            suffix.push_str(bound);
        }
        suffix
    }

    /// Unique identifier token representing the type.
    ///
    /// The qualifier and multibinding suffix are included.
    pub fn identifier_string(&self) -> String {
        let prefix = self
            .qualifier
            .as_ref()
            .map(|qualifier| format!("ᑕ{}ᑐ_", qualifier.identifier_string()))
            .unwrap_or("".to_owned());
        format!(
            "{}{}_{}",
            prefix,
            self.canonical_string_path()
                .replace("::", "ⵆ")
                .replace("<", "ᐸ")
                .replace(">", "ᐳ")
                .replace(" ", "_")
                .replace("\'", "ᐠ")
                .replace("&", "ε")
                .replace(",", "ᒧ"),
            self.identifier_suffix
        )
    }

    /// Human readable form.
    pub fn readable(&self) -> String {
        let mut prefix = String::new();
        if let Some(ref qualifier) = self.qualifier {
            prefix.push_str(&format!("#[qualified({})] ", qualifier.readable()));
        }
        format!("{}{}", prefix, self.readable_without_qualifier())
    }

    /// Human readable form without the qualifier.
    pub fn readable_without_qualifier(&self) -> String {
        format!("{}{}", self.get_prefix(), self.path_with_args(true)) + &self.get_suffix()
    }

    fn path_with_args(&self, readable: bool) -> String {
        let base = match self.root {
            TypeRoot::GLOBAL if !readable => format!("::{}", self.path),
            TypeRoot::CRATE => format!("crate::{}", self.path),
            _ => self.path.clone(),
        };
        if self.args.is_empty() {
            return base;
        }
        let args = self
            .args
            .iter()
            .map(|t| {
                if readable {
                    t.readable_without_qualifier()
                } else {
                    t.canonical_string_path()
                }
            })
            .collect::<Vec<String>>()
            .join(", ");
        format!("{}<{}>", base, args)
    }

    /// Last segment of the path, without generic arguments.
    pub fn simple_name(&self) -> String {
        self.path
            .rsplit("::")
            .next()
            .unwrap_or(&self.path)
            .to_owned()
    }

    /// Whether the type is `path` (a global path without leading `::`, generic args ignored).
    pub fn is_global(&self, path: &str) -> bool {
        self.root == TypeRoot::GLOBAL && self.path == path
    }

    pub fn is_unit(&self) -> bool {
        self.root == TypeRoot::PRIMITIVE && self.path == UNIT
    }

    pub fn is_primitive(&self) -> bool {
        self.root == TypeRoot::PRIMITIVE
    }

    /// The same type with the qualifier replaced.
    pub fn with_qualifier(&self, qualifier: Option<&TypeData>) -> TypeData {
        let mut result = self.clone();
        result.qualifier = qualifier.map(|q| Box::new(q.clone()));
        result
    }

    pub fn without_qualifier(&self) -> TypeData {
        self.with_qualifier(None)
    }

    /// Whether a generic parameter appears anywhere in the type.
    pub fn has_parameters(&self) -> bool {
        self.root == TypeRoot::PARAMETER || self.args.iter().any(|arg| arg.has_parameters())
    }

    /// Replaces generic parameters with concrete types. `params` and `args` are matched by index.
    pub fn substitute(&self, params: &[String], args: &[TypeData]) -> TypeData {
        if self.root == TypeRoot::PARAMETER {
            if let Some(index) = params.iter().position(|p| p == &self.path) {
                if let Some(arg) = args.get(index) {
                    let mut result = arg.clone();
                    if self.qualifier.is_some() {
                        result.qualifier = self.qualifier.clone();
                    }
                    result.identifier_suffix = self.identifier_suffix.clone();
                    return result;
                }
            }
        }
        let mut result = self.clone();
        result.args = self
            .args
            .iter()
            .map(|arg| arg.substitute(params, args))
            .collect();
        result
    }

    pub fn syn_type(&self) -> Result<syn::Type> {
        syn::parse_str(&self.canonical_string_path())
            .with_context(|| format!("unable to render type {}", self.readable()))
    }
}

pub fn from_syn_type(syn_type: &syn::Type, mod_: &Mod) -> Result<TypeData> {
    match syn_type {
        syn::Type::Path(ref type_path) => {
            if type_path.qself.is_some() {
                bail!("qualified self types are not supported");
            }
            from_path(&type_path.path, mod_)
        }
        syn::Type::TraitObject(ref trait_object) => {
            let mut result: Option<TypeData> = None;
            let mut bounds = Vec::new();
            for bound in &trait_object.bounds {
                if let syn::TypeParamBound::Trait(ref trait_) = bound {
                    let name = trait_
                        .path
                        .segments
                        .last()
                        .map(|s| s.ident.to_string())
                        .unwrap_or_default();
                    if AUTO_TRAITS.contains(&name) {
                        bounds.push(name);
                        continue;
                    }
                    if result.is_some() {
                        bail!("one and only one trait expected");
                    }
                    result = Some(from_path(&trait_.path, mod_)?);
                }
            }
            let mut t = result.with_context(|| "one and only one trait expected")?;
            t.trait_object = true;
            t.bounds = bounds;
            Ok(t)
        }
        syn::Type::Paren(ref paren) => from_syn_type(&paren.elem, mod_),
        syn::Type::Group(ref group) => from_syn_type(&group.elem, mod_),
        syn::Type::Tuple(ref tuple) if tuple.elems.is_empty() => Ok(TypeData::primitive(UNIT)),
        syn::Type::Reference(ref reference) => {
            let is_static = reference
                .lifetime
                .as_ref()
                .map(|l| l.ident == "static")
                .unwrap_or(false);
            if let syn::Type::Path(ref path) = *reference.elem {
                if is_static && reference.mutability.is_none() && path.path.is_ident("str") {
                    return Ok(TypeData::primitive(STATIC_STR));
                }
            }
            bail!("references cannot be injected, only &'static str is supported")
        }
        _ => bail!("unable to handle type {}", quote::quote!(#syn_type)),
    }
}

pub fn from_path(syn_path: &syn::Path, mod_: &Mod) -> Result<TypeData> {
    let segments: Vec<&syn::PathSegment> = syn_path.segments.iter().collect();
    let last = segments.last().with_context(|| "empty path")?;
    for segment in &segments[..segments.len() - 1] {
        if !segment.arguments.is_empty() {
            bail!("arguments only supported in the last segment of the path");
        }
    }
    let names: Vec<String> = segments.iter().map(|s| s.ident.to_string()).collect();
    let mut result = if syn_path.leading_colon.is_some() {
        TypeData::global(&names.join("::"), Vec::new())
    } else if names.len() == 1 && mod_.type_params.contains(&names[0]) {
        TypeData::parameter(&names[0])
    } else if names.len() == 1 && PRIMITIVES.contains(&names[0]) {
        TypeData::primitive(&names[0])
    } else {
        let mut resolved = match mod_.resolve_path(&names[0]) {
            Some(resolved) => resolved,
            None if names.len() == 1 => PRELUDE_V1
                .get(&names[0])
                .map(|prelude| TypeData::global(prelude, Vec::new()))
                .unwrap_or_else(|| mod_.resolve_declare_path(&names[0])),
            None if mod_.local_mods.contains(&names[0]) => mod_.resolve_declare_path(&names[0]),
            // anything else is assumed to be an external crate.
            None => TypeData::global(&names[0], Vec::new()),
        };
        for name in &names[1..] {
            if resolved.path.is_empty() {
                resolved.path.push_str(name);
            } else {
                resolved.path.push_str("::");
                resolved.path.push_str(name);
            }
        }
        resolved
    };
    result.args.extend(get_args(last, mod_)?);
    Ok(result)
}

fn get_args(segment: &syn::PathSegment, mod_: &Mod) -> Result<Vec<TypeData>> {
    let mut result = Vec::<TypeData>::new();
    if let syn::PathArguments::AngleBracketed(ref angle) = segment.arguments {
        for generic_arg in &angle.args {
            match generic_arg {
                syn::GenericArgument::Type(ref type_) => result.push(from_syn_type(type_, mod_)?),
                syn::GenericArgument::Lifetime(ref _lifetime) => {
                    // Do nothing
                }
                _ => bail!("unable to handle generic argument"),
            }
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_and_readable_paths() {
        let t = TypeData::from_str("::std::vec::Vec<crate::foo::Bar>").unwrap();
        assert_eq!(t.canonical_string_path(), "::std::vec::Vec<crate::foo::Bar>");
        assert_eq!(t.readable(), "std::vec::Vec<crate::foo::Bar>");
        assert_eq!(t.args[0].simple_name(), "Bar");
    }

    #[test]
    fn trait_object_keeps_auto_traits() {
        let t = TypeData::from_str("::std::sync::Arc<dyn crate::App + Send + Sync>").unwrap();
        assert_eq!(
            t.canonical_string_path(),
            "::std::sync::Arc<dyn crate::App + Send + Sync>"
        );
        assert!(t.args[0].trait_object);
    }

    #[test]
    fn qualifier_changes_identity() {
        let foo = TypeData::from_str("crate::Foo").unwrap();
        let red = TypeData::from_str("crate::Red").unwrap();
        let qualified = foo.with_qualifier(Some(&red));
        assert_ne!(foo, qualified);
        assert_eq!(qualified.readable(), "#[qualified(crate::Red)] crate::Foo");
        assert_eq!(qualified.without_qualifier(), foo);
    }

    #[test]
    fn substitute_replaces_parameters() {
        let mut list = TypeData::from_str("::std::vec::Vec<crate::Foo>").unwrap();
        list.args[0] = TypeData::parameter("T");
        let string = TypeData::from_str("::std::string::String").unwrap();
        let result = list.substitute(&["T".to_owned()], &[string]);
        assert_eq!(
            result.canonical_string_path(),
            "::std::vec::Vec<::std::string::String>"
        );
        assert!(!result.has_parameters());
    }

    #[test]
    fn prelude_and_primitives() {
        let t = TypeData::from_str("Option<i32>").unwrap();
        assert_eq!(t.canonical_string_path(), "::std::option::Option<i32>");
        let s = TypeData::from_str("&'static str").unwrap();
        assert_eq!(s.canonical_string_path(), "&'static str");
        assert!(TypeData::from_str("()").unwrap().is_unit());
    }
}
