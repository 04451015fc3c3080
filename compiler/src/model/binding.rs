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

use crate::model::key::{self, DependencyRequest, Key};
use dirk_common::manifest::{Dependency, Location, MultibindingMapKey, REUSABLE_SCOPE};
use dirk_common::type_data::TypeData;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    Reusable,
    Named(TypeData),
}

impl Scope {
    pub fn from_type(type_data: &TypeData) -> Scope {
        if type_data.is_global(REUSABLE_SCOPE) {
            Scope::Reusable
        } else {
            Scope::Named(type_data.clone())
        }
    }

    pub fn readable(&self) -> String {
        match self {
            Scope::Reusable => "#[reusable]".to_owned(),
            Scope::Named(scope) => format!("#[scoped({})]", scope.readable()),
        }
    }
}

/// How a binding contributes to its key.
#[derive(Debug, Clone, PartialEq)]
pub enum ContributionType {
    Unique,
    IntoVec,
    ElementsIntoVec,
    IntoMap(MultibindingMapKey),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindingKind {
    /// `#[inject]` constructor of `type_data`.
    Injection {
        type_data: TypeData,
        constructor: String,
    },
    /// `#[provides]` method. `nullable` bindings produce `Option<T>` for key `T`.
    Provision {
        module: TypeData,
        method: String,
        is_static: bool,
        nullable: bool,
    },
    /// `#[binds]` method; the single dependency is the bound implementation.
    Delegate { module: TypeData, method: String },
    /// `#[binds_option_of]`; present when `target` has a binding.
    Optional { target: Key },
    /// Aggregate of `#[into_vec]`/`#[elements_into_vec]` contributions. The flag marks collections.
    MultiboundVec { contributions: Vec<(Key, bool)> },
    MultiboundMap {
        key_type: TypeData,
        contributions: Vec<(MultibindingMapKey, Key)>,
    },
    ComponentInstance { component: TypeData },
    ComponentDependency { dependency: TypeData },
    ComponentDependencyMethod {
        dependency: TypeData,
        method: String,
        nullable: bool,
    },
    BoundInstance { field: String, nullable: bool },
    SubcomponentCreator { subcomponent: TypeData, creator: TypeData },
    AssistedFactory {
        factory: TypeData,
        target: TypeData,
        method: String,
        constructor: String,
        /// Factory method parameters, in declaration order.
        parameters: Vec<Dependency>,
        /// Target constructor parameters, in declaration order.
        constructor_parameters: Vec<Dependency>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub key: Key,
    pub kind: BindingKind,
    pub dependencies: Vec<DependencyRequest>,
    pub scope: Option<Scope>,
    pub contribution: ContributionType,
    /// Declaring module, for module bindings.
    pub module: Option<TypeData>,
    /// Readable declaration, e.g. `#[provides] crate::AppModule::provide_foo() -> crate::Foo`.
    pub declaration: String,
    pub location: Location,
}

impl Binding {
    pub fn new(key: Key, kind: BindingKind, declaration: String, location: &Location) -> Self {
        Binding {
            key,
            kind,
            dependencies: Vec::new(),
            scope: None,
            contribution: ContributionType::Unique,
            module: None,
            declaration,
            location: location.clone(),
        }
    }

    pub fn is_contribution(&self) -> bool {
        self.contribution != ContributionType::Unique
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(
            self.kind,
            BindingKind::MultiboundVec { .. } | BindingKind::MultiboundMap { .. }
        )
    }

    /// Produces `Option<T>` for its key `T`.
    pub fn is_nullable(&self) -> bool {
        matches!(
            self.kind,
            BindingKind::Provision { nullable: true, .. }
                | BindingKind::BoundInstance { nullable: true, .. }
                | BindingKind::ComponentDependencyMethod { nullable: true, .. }
        )
    }

    pub fn requires_module_instance(&self) -> bool {
        matches!(self.kind, BindingKind::Provision { is_static: false, .. })
    }

    pub fn is_named_scoped(&self) -> bool {
        matches!(self.scope, Some(Scope::Named(_)))
    }

    /// Where the binding requests its dependencies, e.g. `crate::Foo::new`.
    pub fn site(&self) -> String {
        match self.kind {
            BindingKind::Injection {
                ref type_data,
                ref constructor,
            } => format!("{}::{}", type_data.readable(), constructor),
            BindingKind::Provision {
                ref module,
                ref method,
                ..
            }
            | BindingKind::Delegate {
                ref module,
                ref method,
            } => format!("{}::{}", module.readable(), method),
            BindingKind::ComponentDependencyMethod {
                ref dependency,
                ref method,
                ..
            } => format!("{}::{}", dependency.readable(), method),
            BindingKind::AssistedFactory {
                ref target,
                ref constructor,
                ..
            } => format!("{}::{}", target.readable(), constructor),
            _ => self.key.readable(),
        }
    }

    /// The site of one of the binding's requests, e.g. `crate::Foo::new(bar)`.
    pub fn request_site(&self, request: &DependencyRequest) -> String {
        if request.name.is_empty() {
            self.site()
        } else {
            format!("{}({})", self.site(), request.name)
        }
    }

    /// Key of the aggregate a contribution belongs to.
    pub fn aggregate_key(&self) -> Option<Key> {
        let mut element = self.key.clone();
        element.identifier_suffix.clear();
        match self.contribution {
            ContributionType::Unique => None,
            ContributionType::IntoVec => Some(key::vec_key(&element)),
            ContributionType::ElementsIntoVec => Some(element),
            ContributionType::IntoMap(ref map_key) => {
                Some(key::map_key(&map_key_type(map_key), &element))
            }
        }
    }
}

/// Rust type of a map key.
pub fn map_key_type(map_key: &MultibindingMapKey) -> TypeData {
    match map_key {
        MultibindingMapKey::String(_) | MultibindingMapKey::None => {
            TypeData::global("std::string::String", Vec::new())
        }
        MultibindingMapKey::I32(_) => TypeData::primitive("i32"),
        MultibindingMapKey::Enum(enum_type, _) => enum_type.clone(),
    }
}

pub fn readable_map_key(map_key: &MultibindingMapKey) -> String {
    match map_key {
        MultibindingMapKey::None => "<none>".to_owned(),
        MultibindingMapKey::String(value) => format!("{:?}", value),
        MultibindingMapKey::I32(value) => value.to_string(),
        MultibindingMapKey::Enum(_, value) => value.readable(),
    }
}

/// `(crate::A, i32)` style parameter list.
pub fn readable_parameters(dependencies: &[Dependency]) -> String {
    dependencies
        .iter()
        .map(|d| d.type_data.readable())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contributions_map_to_aggregates() {
        let mut element = TypeData::from_str("crate::Plugin").unwrap();
        element.identifier_suffix = "crate::M.a".to_owned();
        let mut binding = Binding::new(
            element,
            BindingKind::Provision {
                module: TypeData::from_str("crate::M").unwrap(),
                method: "a".to_owned(),
                is_static: true,
                nullable: false,
            },
            String::new(),
            &Location::default(),
        );
        binding.contribution = ContributionType::IntoVec;
        assert_eq!(
            binding.aggregate_key().unwrap().readable(),
            "std::vec::Vec<crate::Plugin>"
        );
        binding.contribution = ContributionType::IntoMap(MultibindingMapKey::I32(3));
        assert_eq!(
            binding.aggregate_key().unwrap().readable(),
            "std::collections::HashMap<i32, crate::Plugin>"
        );
    }

    #[test]
    fn reusable_scope() {
        let reusable = TypeData::global(REUSABLE_SCOPE, Vec::new());
        assert_eq!(Scope::from_type(&reusable), Scope::Reusable);
        let singleton = TypeData::from_str("crate::Singleton").unwrap();
        assert_eq!(
            Scope::from_type(&singleton).readable(),
            "#[scoped(crate::Singleton)]"
        );
    }
}
