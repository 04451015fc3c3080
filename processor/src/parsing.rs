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

use lazy_static::lazy_static;
use std::collections::HashSet;
use syn::{Attribute, FnArg, Signature};

lazy_static! {
    /// Attributes only meaningful to the dirk compiler. Enclosing markers strip them so rustc
    /// never has to resolve them, e.g. on function parameters.
    static ref INNER_MARKERS: HashSet<&'static str> = {
        let mut set = HashSet::new();
        for marker in [
            "inject",
            "assisted_inject",
            "assisted",
            "provides",
            "binds",
            "binds_option_of",
            "multibinds",
            "into_vec",
            "elements_into_vec",
            "into_map",
            "scoped",
            "reusable",
            "qualified",
            "nullable",
            "bind_instance",
        ] {
            set.insert(marker);
        }
        set
    };
}

/// Name of a dirk attribute, `#[x]` or `#[dirk::x]`. Empty for anything else.
pub fn get_attribute(attr: &Attribute) -> String {
    let segments = &attr.path().segments;
    match segments.len() {
        1 => segments[0].ident.to_string(),
        2 if segments[0].ident == "dirk" => segments[1].ident.to_string(),
        _ => "".to_owned(),
    }
}

pub fn is_attribute(attr: &Attribute, name: &str) -> bool {
    get_attribute(attr) == name
}

pub fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| is_attribute(attr, name))
}

pub fn is_inner_marker(attr: &Attribute) -> bool {
    INNER_MARKERS.contains(get_attribute(attr).as_str())
}

pub fn strip_markers(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| !is_inner_marker(attr));
}

/// Strips markers from the parameters of `sig`.
pub fn strip_parameter_markers(sig: &mut Signature) {
    for input in sig.inputs.iter_mut() {
        if let FnArg::Typed(ref mut pat_type) = input {
            strip_markers(&mut pat_type.attrs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn attribute_names() {
        let plain: Attribute = parse_quote!(#[inject]);
        let qualified: Attribute = parse_quote!(#[dirk::inject]);
        let foreign: Attribute = parse_quote!(#[serde::inject]);
        assert_eq!(get_attribute(&plain), "inject");
        assert_eq!(get_attribute(&qualified), "inject");
        assert_eq!(get_attribute(&foreign), "");
    }

    #[test]
    fn strips_only_markers() {
        let mut attrs: Vec<Attribute> = vec![
            parse_quote!(#[qualified(crate::Red)]),
            parse_quote!(#[allow(unused)]),
            parse_quote!(#[dirk::nullable]),
        ];
        strip_markers(&mut attrs);
        assert_eq!(attrs.len(), 1);
        assert!(is_attribute(&attrs[0], "allow"));
    }
}
