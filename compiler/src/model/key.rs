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

use dirk_common::manifest::{Dependency, Location};
use dirk_common::type_data::TypeData;

/// A (type, qualifier) pair. The qualifier lives in [`TypeData::qualifier`].
pub type Key = TypeData;

pub const PROVIDER: &str = "dirk::Provider";
pub const LAZY: &str = "dirk::Lazy";
pub const PRODUCER: &str = "dirk::Producer";
pub const OPTION: &str = "std::option::Option";
pub const VEC: &str = "std::vec::Vec";
pub const HASH_MAP: &str = "std::collections::HashMap";
pub const ARC: &str = "std::sync::Arc";
pub const BOX: &str = "std::boxed::Box";

pub fn key(type_data: &TypeData, qualifier: Option<&TypeData>) -> Key {
    type_data.with_qualifier(qualifier)
}

/// `Vec<T>` aggregate of `element`, carrying the element's qualifier.
pub fn vec_key(element: &Key) -> Key {
    let qualifier = element.qualifier.as_deref().cloned();
    let mut inner = element.without_qualifier();
    inner.identifier_suffix.clear();
    TypeData::global(VEC, vec![inner]).with_qualifier(qualifier.as_ref())
}

/// `HashMap<K, V>` aggregate, carrying the value's qualifier.
pub fn map_key(key_type: &TypeData, value: &Key) -> Key {
    let qualifier = value.qualifier.as_deref().cloned();
    let mut inner = value.without_qualifier();
    inner.identifier_suffix.clear();
    TypeData::global(HASH_MAP, vec![key_type.clone(), inner]).with_qualifier(qualifier.as_ref())
}

/// `Arc<dyn T>`, the handle type of components, component dependencies and assisted factories.
pub fn arc_dyn(trait_: &TypeData) -> TypeData {
    TypeData::global(ARC, vec![trait_.clone().trait_object()])
}

/// `Box<dyn T>`, the handle type of creators.
pub fn box_dyn(trait_: &TypeData) -> TypeData {
    TypeData::global(BOX, vec![trait_.clone().trait_object()])
}

/// `T` of `wrapper<T>`.
pub fn unwrap_single(type_data: &TypeData, wrapper: &str) -> Option<TypeData> {
    if type_data.is_global(wrapper) && type_data.args.len() == 1 {
        Some(type_data.args[0].clone())
    } else {
        None
    }
}

/// The trait `T` of `Arc<dyn T>` (or `Box<dyn T>` when `wrapper` is [`BOX`]).
pub fn dyn_target(type_data: &TypeData, wrapper: &str) -> Option<TypeData> {
    if !type_data.is_global(wrapper) || type_data.args.len() != 1 || !type_data.args[0].trait_object {
        return None;
    }
    let mut target = type_data.args[0].clone();
    target.trait_object = false;
    target.bounds.clear();
    Some(target)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequestKind {
    Instance,
    Provider,
    Lazy,
    ProviderOfLazy,
    Producer,
}

impl RequestKind {
    /// Requests that defer construction and therefore break cycles.
    pub fn is_deferred(&self) -> bool {
        !matches!(self, RequestKind::Instance)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DependencyRequest {
    pub key: Key,
    pub kind: RequestKind,
    pub name: String,
    /// The request is `#[nullable] Option<T>` and accepts an absent value.
    pub nullable: bool,
    /// Type as written, for messages.
    pub requested_type: TypeData,
    pub location: Location,
}

impl DependencyRequest {
    pub fn new(
        type_data: &TypeData,
        qualifier: Option<&TypeData>,
        name: &str,
        nullable: bool,
        location: &Location,
    ) -> Self {
        let (kind, inner) = if let Some(provided) = unwrap_single(type_data, PROVIDER) {
            match unwrap_single(&provided, LAZY) {
                Some(lazy) => (RequestKind::ProviderOfLazy, lazy),
                None => (RequestKind::Provider, provided),
            }
        } else if let Some(lazy) = unwrap_single(type_data, LAZY) {
            (RequestKind::Lazy, lazy)
        } else if let Some(produced) = unwrap_single(type_data, PRODUCER) {
            (RequestKind::Producer, produced)
        } else {
            (RequestKind::Instance, type_data.clone())
        };
        let (inner, nullable) = match (nullable, kind, unwrap_single(&inner, OPTION)) {
            (true, RequestKind::Instance, Some(wrapped)) => (wrapped, true),
            _ => (inner, false),
        };
        DependencyRequest {
            key: key(&inner, qualifier),
            kind,
            name: name.to_owned(),
            nullable,
            requested_type: type_data.with_qualifier(qualifier),
            location: location.clone(),
        }
    }

    pub fn from_dependency(dependency: &Dependency) -> Self {
        DependencyRequest::new(
            &dependency.type_data,
            dependency.qualifiers.first(),
            &dependency.name,
            dependency.nullable,
            &dependency.location,
        )
    }

    /// An instance request for `key`, used for synthetic edges.
    pub fn instance(key: &Key, location: &Location) -> Self {
        DependencyRequest {
            key: key.clone(),
            kind: RequestKind::Instance,
            name: String::new(),
            nullable: false,
            requested_type: key.clone(),
            location: location.clone(),
        }
    }

    pub fn substitute(&self, params: &[String], args: &[TypeData]) -> Self {
        let mut result = self.clone();
        result.key = self.key.substitute(params, args);
        result.requested_type = self.requested_type.substitute(params, args);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(type_: &str) -> DependencyRequest {
        DependencyRequest::new(
            &TypeData::from_str(type_).unwrap(),
            None,
            "x",
            false,
            &Location::default(),
        )
    }

    #[test]
    fn request_kinds() {
        assert_eq!(request("crate::Foo").kind, RequestKind::Instance);
        let provider = request("::dirk::Provider<crate::Foo>");
        assert_eq!(provider.kind, RequestKind::Provider);
        assert_eq!(provider.key.readable(), "crate::Foo");
        assert_eq!(request("::dirk::Lazy<crate::Foo>").kind, RequestKind::Lazy);
        let provider_of_lazy = request("::dirk::Provider<::dirk::Lazy<crate::Foo>>");
        assert_eq!(provider_of_lazy.kind, RequestKind::ProviderOfLazy);
        assert_eq!(provider_of_lazy.key.readable(), "crate::Foo");
        assert_eq!(request("::dirk::Producer<crate::Foo>").kind, RequestKind::Producer);
    }

    #[test]
    fn nullable_request_is_keyed_by_wrapped_type() {
        let option = TypeData::from_str("::std::option::Option<crate::Foo>").unwrap();
        let nullable = DependencyRequest::new(&option, None, "x", true, &Location::default());
        assert!(nullable.nullable);
        assert_eq!(nullable.key.readable(), "crate::Foo");
        let plain = DependencyRequest::new(&option, None, "x", false, &Location::default());
        assert_eq!(plain.key.readable(), "std::option::Option<crate::Foo>");
    }

    #[test]
    fn unwrap_single_takes_the_only_argument() {
        let option = TypeData::from_str("::std::option::Option<crate::Foo>").unwrap();
        assert_eq!(unwrap_single(&option, OPTION).unwrap().readable(), "crate::Foo");
        assert!(unwrap_single(&option, VEC).is_none());
        let map = TypeData::from_str("::std::collections::HashMap<i32, crate::Foo>").unwrap();
        assert!(unwrap_single(&map, HASH_MAP).is_none());
    }

    #[test]
    fn aggregate_keys_keep_qualifier() {
        let red = TypeData::from_str("crate::Red").unwrap();
        let element = key(&TypeData::from_str("crate::Foo").unwrap(), Some(&red));
        assert_eq!(
            vec_key(&element).readable(),
            "#[qualified(crate::Red)] std::vec::Vec<crate::Foo>"
        );
    }
}
