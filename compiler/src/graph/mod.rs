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

//! Graph Builder: the component tree of one root component and the bindings each component owns.

mod builder;

pub use builder::build;
pub(crate) use builder::module_closure;

use crate::model::binding::{Binding, BindingKind, Scope};
use crate::model::key::{DependencyRequest, Key};
use dirk_common::manifest::{Component, Creator, Location, Method};
use dirk_common::type_data::TypeData;
use std::collections::BTreeMap;

/// Index of a component in [`BindingGraph::components`].
pub type ComponentId = usize;

/// Component tree rooted at `components[0]`, with every reachable key resolved.
#[derive(Debug, Clone)]
pub struct BindingGraph {
    pub components: Vec<ComponentNode>,
}

/// A module installed in a component.
#[derive(Debug, Clone)]
pub struct ModuleInstance {
    pub type_data: TypeData,
    /// Field holding the module instance.
    pub field: String,
    pub requires_instance: bool,
    pub default_constructible: bool,
    /// Some owned binding calls into the module instance.
    pub used: bool,
}

/// A value handed to the component by its creator.
#[derive(Debug, Clone)]
pub struct BoundInstance {
    pub key: Key,
    pub field: String,
    /// The creator takes `Option<T>` and the binding may be absent.
    pub nullable: bool,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub enum EntryPointKind {
    /// Returns the value of a request.
    Provision(DependencyRequest),
    /// Returns a new instance of a child component, built from the method parameters.
    ChildFactory { child: ComponentId },
}

/// A method of the component trait that generated code implements.
#[derive(Debug, Clone)]
pub struct EntryPoint {
    pub declaring_trait: TypeData,
    pub method: Method,
    pub kind: EntryPointKind,
}

impl EntryPoint {
    /// `crate::App::foo()`, as listed in diagnostics.
    pub fn readable(&self) -> String {
        format!("{}::{}()", self.declaring_trait.readable(), self.method.name)
    }
}

/// How a child component is constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildSource {
    /// A factory method on the parent, `fn child(&self, ...) -> Arc<dyn Child>`.
    FactoryMethod(Method),
    /// A creator obtained from the parent.
    Creator,
}

/// Every binding found for a key, as seen from the component that owns the resolution.
#[derive(Debug, Clone)]
pub struct ResolvedBindings {
    pub key: Key,
    pub bindings: Vec<Binding>,
    pub owner: ComponentId,
    /// The key is an `#[assisted_inject]` type requested directly.
    pub assisted_injection: bool,
    /// The key belongs to a malformed declaration that was already reported.
    pub erroneous: bool,
}

impl ResolvedBindings {
    pub fn is_missing(&self) -> bool {
        self.bindings.is_empty() && !self.assisted_injection && !self.erroneous
    }

    /// The binding used for code generation.
    pub fn binding(&self) -> Option<&Binding> {
        if self.bindings.len() == 1 {
            self.bindings.first()
        } else {
            None
        }
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.binding().and_then(|b| b.scope.as_ref())
    }
}

#[derive(Debug, Clone)]
pub struct ComponentNode {
    pub id: ComponentId,
    pub parent: Option<ComponentId>,
    pub depth: usize,
    pub decl: Component,
    pub creator: Option<Creator>,
    pub source: Option<ChildSource>,
    pub children: Vec<ComponentId>,
    pub scopes: Vec<Scope>,
    pub modules: Vec<ModuleInstance>,
    pub dependencies: Vec<TypeData>,
    pub bound_instances: Vec<BoundInstance>,
    pub entry_points: Vec<EntryPoint>,
    /// Unique bindings declared in this component, by key.
    pub explicit: BTreeMap<Key, Vec<Binding>>,
    /// Multibinding contributions declared in this component, by aggregate key.
    pub contributions: BTreeMap<Key, Vec<Binding>>,
    /// `#[multibinds]` declarations, by aggregate key.
    pub multibinds: BTreeMap<Key, Vec<Location>>,
    /// Resolutions owned by this component.
    pub owned: BTreeMap<Key, ResolvedBindings>,
    /// Owner of each key requested from this component.
    pub resolved_owner: BTreeMap<Key, ComponentId>,
}

impl ComponentNode {
    pub fn type_data(&self) -> &TypeData {
        &self.decl.type_data
    }

    pub fn readable(&self) -> String {
        self.decl.type_data.readable()
    }

    pub fn location(&self) -> &Location {
        &self.decl.location
    }

    pub fn has_scope(&self, scope: &Scope) -> bool {
        self.scopes.contains(scope)
    }
}

impl BindingGraph {
    pub fn root(&self) -> &ComponentNode {
        &self.components[0]
    }

    pub fn component(&self, id: ComponentId) -> &ComponentNode {
        &self.components[id]
    }

    /// `id` followed by its ancestors.
    pub fn chain(&self, id: ComponentId) -> Vec<ComponentId> {
        let mut result = vec![id];
        let mut current = id;
        while let Some(parent) = self.components[current].parent {
            result.push(parent);
            current = parent;
        }
        result
    }

    /// The resolution a request for `key` from `from` ends up at.
    pub fn resolved(&self, from: ComponentId, key: &Key) -> Option<&ResolvedBindings> {
        let owner = self.components[from].resolved_owner.get(key)?;
        self.components[*owner].owned.get(key)
    }

    /// Components in pre-order.
    pub fn preorder(&self) -> Vec<ComponentId> {
        let mut result = Vec::new();
        let mut stack = vec![0];
        while let Some(id) = stack.pop() {
            result.push(id);
            for child in self.components[id].children.iter().rev() {
                stack.push(*child);
            }
        }
        result
    }

    /// Keys each binding of `resolved` depends on, paired with their resolutions.
    pub fn dependencies<'a>(
        &'a self,
        resolved: &'a ResolvedBindings,
    ) -> Vec<(&'a Binding, &'a DependencyRequest, Option<&'a ResolvedBindings>)> {
        let mut result = Vec::new();
        for binding in &resolved.bindings {
            for request in &binding.dependencies {
                result.push((binding, request, self.resolved(resolved.owner, &request.key)));
            }
        }
        result
    }
}

/// Whether `binding` reads the component's module instance for `module`.
pub fn uses_module_instance(binding: &Binding, module: &TypeData) -> bool {
    match binding.kind {
        BindingKind::Provision {
            module: ref m,
            is_static: false,
            ..
        } => m == module,
        _ => false,
    }
}
