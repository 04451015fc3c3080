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

use crate::manifest::{Dependency, Location, Method, Receiver, Visibility, REUSABLE_SCOPE};
use crate::manifest_parser::Mod;
use crate::type_data::TypeData;
use anyhow::{bail, Context, Result};
use proc_macro2::{Span, TokenStream};
use std::collections::HashMap;
use syn::parse::Parser;
use syn::spanned::Spanned;
use syn::{Attribute, Meta};

pub fn is_attribute(syn_attr: &Attribute, attr: &str) -> bool {
    get_attribute(syn_attr).eq(attr)
}

/// Name of a dirk helper attribute, accepting both `#[name]` and `#[dirk::name]`.
pub fn get_attribute(syn_attr: &Attribute) -> String {
    let segments = &syn_attr.meta.path().segments;
    match segments.len() {
        1 => segments[0].ident.to_string(),
        2 if segments[0].ident == "dirk" => segments[1].ident.to_string(),
        _ => "".to_owned(),
    }
}

pub fn find_attribute<'a>(attrs: &'a [Attribute], attr: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|a| is_attribute(a, attr))
}

pub fn has_attribute(attrs: &[Attribute], attr: &str) -> bool {
    attrs.iter().any(|a| is_attribute(a, attr))
}

pub fn get_parenthesized_field_values(meta: &Meta) -> Result<HashMap<String, FieldValue>> {
    match meta {
        Meta::Path(_) => Ok(HashMap::new()),
        Meta::List(list) => get_attribute_field_values(list.tokens.clone()),
        Meta::NameValue(_) => {
            bail!("list expected")
        }
    }
}

/// Parses the single path argument of attributes like `#[qualified(crate::Red)]`.
pub fn get_parenthesized_type(attr: &Attribute, mod_: &Mod) -> Result<TypeData> {
    match attr.meta {
        Meta::List(ref list) => get_type(&list.tokens, mod_),
        _ => bail!("#[{}(path)] expected", get_attribute(attr)),
    }
}

pub fn get_type(attr: &TokenStream, mod_: &Mod) -> Result<TypeData> {
    if attr.is_empty() {
        bail!("path expected");
    }
    crate::type_data::from_path(
        &syn::parse2(attr.clone()).with_context(|| "path expected")?,
        mod_,
    )
}

#[derive(Debug, Clone)]
pub enum FieldValue {
    StringLiteral(String),
    IntLiteral(i64),
    BoolLiteral(bool),
    Path(syn::Path),
    Array(Vec<FieldValue>),
}

/// Converts #[attr(key1 : "value1", key2 : value2)] to key-value map.
pub fn get_attribute_field_values(attr: TokenStream) -> Result<HashMap<String, FieldValue>> {
    let parser = syn::punctuated::Punctuated::<syn::FieldValue, syn::Token![,]>::parse_terminated;
    if attr.is_empty() {
        return Ok(HashMap::new());
    }

    let field_values = parser
        .parse2(attr.clone())
        .with_context(|| "FieldValue (key: value, ...) expected")?;

    let mut result = HashMap::new();
    for field in field_values.iter() {
        if let syn::Member::Named(ref name) = field.member {
            result.insert(name.to_string(), parse_field_value(&field.expr)?);
        } else {
            bail!("field should have named member");
        }
    }
    Ok(result)
}

fn parse_field_value(expr: &syn::Expr) -> Result<FieldValue> {
    match expr {
        syn::Expr::Lit(ref lit) => match lit.lit {
            syn::Lit::Str(ref str_) => Ok(FieldValue::StringLiteral(str_.value())),
            syn::Lit::Bool(ref bool_) => Ok(FieldValue::BoolLiteral(bool_.value())),
            syn::Lit::Int(ref int) => Ok(FieldValue::IntLiteral(
                int.base10_parse::<i64>()
                    .with_context(|| "unable to parse integer to i64")?,
            )),
            _ => bail!("unable to handle literal value"),
        },
        syn::Expr::Unary(ref unary) => {
            if let (syn::UnOp::Neg(_), FieldValue::IntLiteral(value)) =
                (&unary.op, parse_field_value(&unary.expr)?)
            {
                return Ok(FieldValue::IntLiteral(-value));
            }
            bail!("invalid field value")
        }
        syn::Expr::Path(ref path) => Ok(FieldValue::Path(path.path.clone())),
        syn::Expr::Array(ref array) => {
            let mut values: Vec<FieldValue> = Vec::new();
            for expr in &array.elems {
                values.push(parse_field_value(expr)?);
            }
            Ok(FieldValue::Array(values))
        }
        _ => bail!("invalid field value"),
    }
}

/// Parses "foo::Bar, foo::Baz" to a list of types.
pub fn get_types(types: Option<&FieldValue>, mod_: &Mod) -> Result<Vec<TypeData>> {
    let Some(types) = types else {
        return Ok(Vec::new());
    };
    match types {
        FieldValue::Path(ref path) => Ok(vec![crate::type_data::from_path(path, mod_)?]),
        FieldValue::Array(ref paths) => {
            let mut result = Vec::new();
            for field in paths {
                if let FieldValue::Path(ref path) = field {
                    result.push(crate::type_data::from_path(path, mod_)?);
                } else {
                    bail!("field in array is not a path");
                }
            }
            Ok(result)
        }
        _ => bail!("path or [path, ...] expected"),
    }
}

pub fn location(span: Span, mod_: &Mod) -> Location {
    Location::new(&mod_.file, span.start().line)
}

pub fn get_visibility(vis: &syn::Visibility) -> Visibility {
    match vis {
        syn::Visibility::Public(_) => Visibility::Public,
        syn::Visibility::Restricted(_) => Visibility::Restricted,
        syn::Visibility::Inherited => Visibility::Private,
    }
}

pub fn get_type_params(generics: &syn::Generics) -> Vec<String> {
    generics
        .type_params()
        .map(|param| param.ident.to_string())
        .collect()
}

/// All `#[qualified(..)]` on an item. More than one is reported by the compiler.
pub fn get_qualifiers(attrs: &[Attribute], mod_: &Mod) -> Result<Vec<TypeData>> {
    attrs
        .iter()
        .filter(|attr| is_attribute(attr, "qualified"))
        .map(|attr| get_parenthesized_type(attr, mod_))
        .collect()
}

/// All `#[scoped(..)]` and `#[reusable]` on an item.
pub fn get_scopes(attrs: &[Attribute], mod_: &Mod) -> Result<Vec<TypeData>> {
    let mut result = Vec::new();
    for attr in attrs {
        match get_attribute(attr).as_str() {
            "scoped" => result.push(get_parenthesized_type(attr, mod_)?),
            "reusable" => result.push(TypeData::global(REUSABLE_SCOPE, Vec::new())),
            _ => {}
        }
    }
    Ok(result)
}

pub fn get_receiver(sig: &syn::Signature) -> Receiver {
    let Some(receiver) = sig.receiver() else {
        return Receiver::None;
    };
    if receiver.colon_token.is_some() {
        if let syn::Type::Path(ref path) = *receiver.ty {
            if path
                .path
                .segments
                .last()
                .map(|s| s.ident == "Box")
                .unwrap_or(false)
            {
                return Receiver::Boxed;
            }
        }
    }
    match (&receiver.reference, &receiver.mutability) {
        (Some(_), Some(_)) => Receiver::RefMut,
        (Some(_), None) => Receiver::Ref,
        (None, _) => Receiver::Value,
    }
}

/// Parses a typed fn parameter with its dirk attributes.
pub fn get_dependency(pat_type: &syn::PatType, mod_: &Mod) -> Result<Dependency> {
    let mut dependency = Dependency::new();
    dependency.name = match *pat_type.pat {
        syn::Pat::Ident(ref ident) => ident.ident.to_string(),
        syn::Pat::Wild(_) => "_".to_owned(),
        _ => bail!("parameters must be plain identifiers"),
    };
    dependency.type_data = crate::type_data::from_syn_type(&pat_type.ty, mod_)?;
    dependency.qualifiers = get_qualifiers(&pat_type.attrs, mod_)?;
    dependency.nullable = has_attribute(&pat_type.attrs, "nullable");
    dependency.bind_instance = has_attribute(&pat_type.attrs, "bind_instance");
    if let Some(assisted) = find_attribute(&pat_type.attrs, "assisted") {
        let fields = get_parenthesized_field_values(&assisted.meta)?;
        dependency.assisted = Some(match fields.get("id") {
            Some(FieldValue::StringLiteral(id)) => id.clone(),
            Some(_) => bail!("#[assisted(id: \"...\")] expects a string"),
            None => "".to_owned(),
        });
    }
    dependency.location = location(pat_type.span(), mod_);
    Ok(dependency)
}

pub fn get_dependencies(sig: &syn::Signature, mod_: &Mod) -> Result<Vec<Dependency>> {
    let mut result = Vec::new();
    for input in &sig.inputs {
        if let syn::FnArg::Typed(ref pat_type) = input {
            result.push(get_dependency(pat_type, mod_)?);
        }
    }
    Ok(result)
}

pub fn get_return_type(sig: &syn::Signature, mod_: &Mod) -> Result<Option<TypeData>> {
    match sig.output {
        syn::ReturnType::Default => Ok(None),
        syn::ReturnType::Type(_, ref ty) => Ok(Some(crate::type_data::from_syn_type(ty, mod_)?)),
    }
}

/// Parses a trait method declaration.
pub fn get_method(item: &syn::TraitItemFn, mod_: &Mod) -> Result<Method> {
    let type_params = get_type_params(&item.sig.generics);
    let mut method_mod = mod_.clone();
    method_mod.type_params.extend(type_params.iter().cloned());
    Ok(Method {
        name: item.sig.ident.to_string(),
        receiver: get_receiver(&item.sig),
        parameters: get_dependencies(&item.sig, &method_mod)?,
        return_type: get_return_type(&item.sig, &method_mod)?,
        qualifiers: get_qualifiers(&item.attrs, mod_)?,
        nullable: has_attribute(&item.attrs, "nullable"),
        type_params,
        has_default: item.default.is_some(),
        location: location(item.sig.ident.span(), mod_),
    })
}

pub fn get_trait_methods(item_trait: &syn::ItemTrait, mod_: &Mod) -> Result<Vec<Method>> {
    let mut result = Vec::new();
    for item in &item_trait.items {
        if let syn::TraitItem::Fn(ref item_fn) = item {
            result.push(get_method(item_fn, mod_)?);
        }
    }
    Ok(result)
}

/// Traits listed after `:` in a trait declaration, auto traits excluded.
pub fn get_supertraits(item_trait: &syn::ItemTrait, mod_: &Mod) -> Result<Vec<TypeData>> {
    let mut result = Vec::new();
    for bound in &item_trait.supertraits {
        if let syn::TypeParamBound::Trait(ref trait_) = bound {
            let name = trait_
                .path
                .segments
                .last()
                .map(|s| s.ident.to_string())
                .unwrap_or_default();
            if matches!(name.as_str(), "Send" | "Sync" | "Unpin" | "Sized") {
                continue;
            }
            result.push(crate::type_data::from_path(&trait_.path, mod_)?);
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    #[test]
    fn field_values() {
        let values =
            get_attribute_field_values(quote! {modules: [crate::A, crate::B], key: "x", n: -3})
                .unwrap();
        let mod_ = Mod::crate_root();
        let modules = get_types(values.get("modules"), &mod_).unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[1].readable(), "crate::B");
        assert!(matches!(values.get("key"), Some(FieldValue::StringLiteral(s)) if s == "x"));
        assert!(matches!(values.get("n"), Some(FieldValue::IntLiteral(-3))));
    }

    #[test]
    fn receivers() {
        let item: syn::TraitItemFn = syn::parse_quote! { fn build(self: Box<Self>) -> u32; };
        assert_eq!(get_receiver(&item.sig), Receiver::Boxed);
        let item: syn::TraitItemFn = syn::parse_quote! { fn set(&mut self, x: u32); };
        assert_eq!(get_receiver(&item.sig), Receiver::RefMut);
        let item: syn::TraitItemFn = syn::parse_quote! { fn create() -> u32; };
        assert_eq!(get_receiver(&item.sig), Receiver::None);
    }

    #[test]
    fn assisted_parameter() {
        let item: syn::TraitItemFn =
            syn::parse_quote! { fn create(&self, #[assisted(id: "b")] b: i32, c: crate::C) -> crate::Foo; };
        let method = get_method(&item, &Mod::crate_root()).unwrap();
        assert_eq!(method.parameters[0].assisted, Some("b".to_owned()));
        assert_eq!(method.parameters[1].assisted, None);
        assert_eq!(method.return_type.unwrap().readable(), "crate::Foo");
    }
}
