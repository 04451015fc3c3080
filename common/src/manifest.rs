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

//! Declarations collected from the user's source, before any validation.
//!
//! The manifest keeps invalid shapes (two injected constructors, a creator declared on a struct,
//! ...) so the compiler can report them.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::type_data::TypeData;
use anyhow::{Context, Result};

/// Scope recorded for `#[reusable]` bindings.
pub const REUSABLE_SCOPE: &str = "dirk::Reusable";

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct Manifest {
    pub injectables: Vec<Injectable>,
    pub modules: Vec<Module>,
    pub components: Vec<Component>,
    pub creators: Vec<Creator>,
    pub assisted_factories: Vec<AssistedFactory>,
    pub scopes: Vec<TypeData>,
    pub qualifiers: Vec<TypeData>,
    pub traits: Vec<TraitDecl>,
    pub default_constructibles: Vec<TypeData>,
}

impl Manifest {
    pub fn new() -> Manifest {
        Default::default()
    }

    pub fn merge_from(&mut self, other: &Manifest) {
        self.injectables
            .extend_from_slice(other.injectables.as_slice());
        self.modules.extend_from_slice(other.modules.as_slice());
        self.components
            .extend_from_slice(other.components.as_slice());
        self.creators.extend_from_slice(other.creators.as_slice());
        self.assisted_factories
            .extend_from_slice(other.assisted_factories.as_slice());
        self.scopes.extend_from_slice(other.scopes.as_slice());
        self.qualifiers
            .extend_from_slice(other.qualifiers.as_slice());
        self.traits.extend_from_slice(other.traits.as_slice());
        self.default_constructibles
            .extend_from_slice(other.default_constructibles.as_slice());
    }

    pub fn from_json(json: &str) -> Result<Manifest> {
        serde_json::from_str(json).with_context(|| "malformed dirk manifest")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).with_context(|| "unable to serialize dirk manifest")
    }
}

/// Where a declaration was found, for diagnostics.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Clone, Default)]
pub struct Location {
    pub file: String,
    pub line: usize,
}

impl Location {
    pub fn new(file: &str, line: usize) -> Self {
        Location {
            file: file.to_owned(),
            line,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub enum TypeRoot {
    #[default]
    UNSPECIFIED = 0,
    GLOBAL = 1,
    CRATE = 2,
    PRIMITIVE = 3,
    /// A generic type parameter of the enclosing declaration.
    PARAMETER = 4,
}

/// The kind of item an attribute was placed on.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy, Default)]
pub enum ItemKind {
    #[default]
    Struct,
    Enum,
    Trait,
    Other,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy, Default)]
pub enum Visibility {
    #[default]
    Public,
    Restricted,
    Private,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy, Default)]
pub enum Receiver {
    #[default]
    None,
    Ref,
    RefMut,
    Value,
    Boxed,
}

impl Receiver {
    pub fn readable(&self) -> &'static str {
        match self {
            Receiver::None => "",
            Receiver::Ref => "&self",
            Receiver::RefMut => "&mut self",
            Receiver::Value => "self",
            Receiver::Boxed => "self: Box<Self>",
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct Dependency {
    pub name: String,
    pub type_data: TypeData,
    pub qualifiers: Vec<TypeData>,
    /// `Some(identifier)` when the parameter is `#[assisted]`.
    pub assisted: Option<String>,
    pub nullable: bool,
    pub bind_instance: bool,
    pub location: Location,
}

impl Dependency {
    pub fn new() -> Self {
        Default::default()
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct Injectable {
    pub type_data: TypeData,
    pub kind: ItemKind,
    pub type_params: Vec<String>,
    pub constructors: Vec<Constructor>,
    pub scopes: Vec<TypeData>,
    pub qualifiers: Vec<TypeData>,
    pub location: Location,
}

impl Injectable {
    pub fn new() -> Self {
        Default::default()
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct Constructor {
    pub name: String,
    pub visibility: Visibility,
    pub assisted_inject: bool,
    pub fallible: bool,
    pub dependencies: Vec<Dependency>,
    pub location: Location,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct Module {
    pub type_data: TypeData,
    pub kind: ItemKind,
    pub type_params: Vec<String>,
    pub includes: Vec<TypeData>,
    pub subcomponents: Vec<TypeData>,
    pub bindings: Vec<Binding>,
    pub location: Location,
}

impl Module {
    pub fn new() -> Self {
        Default::default()
    }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy, Default)]
pub enum BindingType {
    #[default]
    Provides,
    Binds,
    BindsOptionOf,
    Multibinds,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy, Default)]
pub enum MultibindingType {
    #[default]
    None,
    IntoVec,
    ElementsIntoVec,
    IntoMap,
}

#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Clone, Default)]
pub enum MultibindingMapKey {
    #[default]
    None,
    String(String),
    I32(i32),
    /// Enum type and the variant path.
    Enum(TypeData, TypeData),
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct Binding {
    pub name: String,
    pub binding_type: BindingType,
    pub type_data: TypeData,
    pub dependencies: Vec<Dependency>,
    pub receiver: Receiver,
    pub visibility: Visibility,
    pub scopes: Vec<TypeData>,
    pub qualifiers: Vec<TypeData>,
    pub multibinding_type: MultibindingType,
    /// All map keys found on the method; more than one is an error.
    pub map_keys: Vec<MultibindingMapKey>,
    pub type_params: Vec<String>,
    pub has_body: bool,
    pub nullable: bool,
    pub location: Location,
}

impl Binding {
    pub fn new(binding_type: BindingType) -> Self {
        Binding {
            binding_type,
            ..Default::default()
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy, Default)]
pub enum ComponentType {
    #[default]
    Component,
    Subcomponent,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct Component {
    pub type_data: TypeData,
    pub kind: ItemKind,
    pub component_type: ComponentType,
    pub type_params: Vec<String>,
    pub modules: Vec<TypeData>,
    pub dependencies: Vec<TypeData>,
    pub scopes: Vec<TypeData>,
    pub supertraits: Vec<TypeData>,
    pub methods: Vec<Method>,
    pub location: Location,
}

impl Component {
    pub fn new() -> Self {
        Default::default()
    }
}

/// A trait method: component entry points, creator methods and assisted factory methods.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct Method {
    pub name: String,
    pub receiver: Receiver,
    pub parameters: Vec<Dependency>,
    pub return_type: Option<TypeData>,
    pub qualifiers: Vec<TypeData>,
    pub nullable: bool,
    pub type_params: Vec<String>,
    /// The method has a default body and is not implemented by generated code.
    pub has_default: bool,
    pub location: Location,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy, Default)]
pub enum CreatorKind {
    #[default]
    Builder,
    Factory,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct Creator {
    pub type_data: TypeData,
    pub kind: ItemKind,
    pub creator_kind: CreatorKind,
    /// Whether the marker was the subcomponent flavor.
    pub for_subcomponent: bool,
    pub component: TypeData,
    pub type_params: Vec<String>,
    pub supertraits: Vec<TypeData>,
    pub methods: Vec<Method>,
    pub location: Location,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct AssistedFactory {
    pub type_data: TypeData,
    pub kind: ItemKind,
    pub type_params: Vec<String>,
    pub supertraits: Vec<TypeData>,
    pub methods: Vec<Method>,
    pub location: Location,
}

/// An unannotated trait, kept so supertrait methods of creators and factories can be found.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct TraitDecl {
    pub type_data: TypeData,
    pub supertraits: Vec<TypeData>,
    pub methods: Vec<Method>,
    pub location: Location,
}
