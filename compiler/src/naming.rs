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

//! Identifier generation for emitted code.

use dirk_common::type_data::TypeData;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

lazy_static! {
    static ref CAMEL_BOUNDARY: Regex = Regex::new(r"([a-z0-9])([A-Z])").unwrap();
    static ref ACRONYM_BOUNDARY: Regex = Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap();
    static ref NON_IDENTIFIER: Regex = Regex::new(r"[^A-Za-z0-9_]+").unwrap();
}

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// `FooBarHTTP` -> `foo_bar_http`.
pub fn snake_case(name: &str) -> String {
    let name = ACRONYM_BOUNDARY.replace_all(name, "${1}_${2}");
    let name = CAMEL_BOUNDARY.replace_all(&name, "${1}_${2}");
    let name = NON_IDENTIFIER.replace_all(&name, "_");
    let mut result = name.trim_matches('_').to_lowercase();
    while result.contains("__") {
        result = result.replace("__", "_");
    }
    if result.is_empty() || result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    if KEYWORDS.contains(&result.as_str()) {
        result.push('_');
    }
    result
}

/// `provide_foo` -> `ProvideFoo`.
pub fn upper_camel_case(name: &str) -> String {
    name.split('_')
        .filter(|s| !s.is_empty())
        .map(|s| {
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Simple name of a type followed by the simple names of its generic arguments.
pub fn type_name(type_data: &TypeData) -> String {
    let mut result = if type_data.path == dirk_common::type_data::UNIT {
        "Unit".to_owned()
    } else {
        upper_camel_case(&NON_IDENTIFIER.replace_all(&type_data.simple_name(), "_"))
    };
    for arg in &type_data.args {
        result.push('_');
        result.push_str(&type_name(arg));
    }
    result
}

/// Field name for the value of `key`, the qualifier included.
pub fn key_field_name(key: &TypeData) -> String {
    let mut name = String::new();
    if let Some(ref qualifier) = key.qualifier {
        name.push_str(&snake_case(&qualifier.simple_name()));
        name.push('_');
    }
    name.push_str(&snake_case(&type_name(key)));
    name
}

/// `crate::foo::bar::Baz` -> `["Bar", "Foo"]`, innermost first.
pub fn path_prefixes(type_data: &TypeData) -> Vec<String> {
    let segments: Vec<&str> = type_data.path.split("::").collect();
    segments
        .iter()
        .rev()
        .skip(1)
        .map(|segment| upper_camel_case(segment))
        .collect()
}

/// Allocates identifiers that are unique within one namespace.
#[derive(Debug, Default, Clone)]
pub struct UniqueNames {
    used: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_owned());
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// `base`, or `base2`, `base3`... when taken.
    pub fn allocate(&mut self, base: &str) -> String {
        if self.used.insert(base.to_owned()) {
            return base.to_owned();
        }
        let mut i = 2;
        loop {
            let candidate = format!("{}{}", base, i);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            i += 1;
        }
    }
}

/// Names types so that types sharing a simple name are told apart by their enclosing modules.
///
/// `candidates` maps each type to its simple name. Colliding entries get path segments prepended
/// one at a time until every name is unique.
pub fn disambiguate(candidates: &BTreeMap<TypeData, String>) -> BTreeMap<TypeData, String> {
    let mut depth: BTreeMap<TypeData, usize> = candidates.keys().map(|t| (t.clone(), 0)).collect();
    loop {
        let names: BTreeMap<TypeData, String> = candidates
            .iter()
            .map(|(t, base)| {
                let prefixes = path_prefixes(t);
                let used = depth[t].min(prefixes.len());
                let mut parts: Vec<String> = prefixes[..used].iter().rev().cloned().collect();
                parts.push(base.clone());
                (t.clone(), parts.join("_"))
            })
            .collect();
        let mut counts: BTreeMap<&String, usize> = BTreeMap::new();
        for name in names.values() {
            *counts.entry(name).or_default() += 1;
        }
        let mut progressed = false;
        for (t, name) in &names {
            if counts[name] > 1 && depth[t] < path_prefixes(t).len() {
                if let Some(d) = depth.get_mut(t) {
                    *d += 1;
                    progressed = true;
                }
            }
        }
        if !progressed {
            let mut unique = UniqueNames::new();
            return names
                .into_iter()
                .map(|(t, name)| {
                    let name = unique.allocate(&name);
                    (t, name)
                })
                .collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_case() {
        assert_eq!(snake_case("FooBar"), "foo_bar");
        assert_eq!(snake_case("HTTPServer"), "http_server");
        assert_eq!(snake_case("Type"), "type_");
        assert_eq!(upper_camel_case("provide_foo"), "ProvideFoo");
    }

    #[test]
    fn names_generic_types() {
        let t = TypeData::from_str("crate::Foo<::std::string::String>").unwrap();
        assert_eq!(type_name(&t), "Foo_String");
        assert_eq!(key_field_name(&t), "foo_string");
    }

    #[test]
    fn disambiguates_by_path() {
        let mut candidates = BTreeMap::new();
        let a = TypeData::from_str("crate::a::Child").unwrap();
        let b = TypeData::from_str("crate::b::Child").unwrap();
        let c = TypeData::from_str("crate::Other").unwrap();
        candidates.insert(a.clone(), "Child".to_owned());
        candidates.insert(b.clone(), "Child".to_owned());
        candidates.insert(c.clone(), "Other".to_owned());
        let names = disambiguate(&candidates);
        assert_eq!(names[&a], "A_Child");
        assert_eq!(names[&b], "B_Child");
        assert_eq!(names[&c], "Other");
    }
}
