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

//! Decides, before any code is written, which keys need a provider and how every generated item
//! is named.

use crate::graph::{BindingGraph, ComponentId, EntryPointKind};
use crate::model::binding::{Binding, BindingKind};
use crate::model::declarations::Declarations;
use crate::model::key::{DependencyRequest, Key, RequestKind};
use crate::naming::{self, UniqueNames};
use crate::options::CodegenMode;
use dirk_common::manifest::ItemKind;
use dirk_common::type_data::TypeData;
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

/// Switch cases per dispatch bank of a fast-init switching provider.
pub const BANK_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct ModuleField {
    pub type_data: TypeData,
    pub field: String,
    pub default_constructible: bool,
}

/// A builder setter for a module, deprecated when the module instance is never used.
#[derive(Debug, Clone)]
pub struct ModuleSetter {
    pub type_data: TypeData,
    pub name: String,
    pub used: bool,
}

#[derive(Debug, Clone)]
pub struct ComponentPlan {
    pub name: String,
    /// Module instances the component stores.
    pub modules: Vec<ModuleField>,
    pub setters: Vec<ModuleSetter>,
    /// Component dependencies, as `Arc<dyn T>` fields.
    pub dependencies: Vec<(TypeData, String)>,
    /// Keys held in a `Provider` field, in discovery order.
    pub provider_fields: Vec<(Key, String)>,
    /// Fast-init switch case ids, in discovery order.
    pub switch_ids: Vec<(Key, usize)>,
    field_index: BTreeMap<Key, usize>,
    switch_index: BTreeMap<Key, usize>,
    /// Field namespace of the component struct.
    names: UniqueNames,
}

impl ComponentPlan {
    pub fn provider_field(&self, key: &Key) -> Option<&str> {
        self.field_index
            .get(key)
            .map(|i| self.provider_fields[*i].1.as_str())
    }

    pub fn switch_id(&self, key: &Key) -> Option<usize> {
        self.switch_index.get(key).map(|i| self.switch_ids[*i].1)
    }

    pub fn module_field(&self, module: &TypeData) -> Option<&str> {
        self.modules
            .iter()
            .find(|m| &m.type_data == module)
            .map(|m| m.field.as_str())
    }

    pub fn dependency_field(&self, dependency: &TypeData) -> Option<&str> {
        self.dependencies
            .iter()
            .find(|(t, _)| t == dependency)
            .map(|(_, f)| f.as_str())
    }

    pub fn switching_provider_name(&self) -> String {
        format!("{}SwitchingProvider", self.name)
    }

    pub fn creator_name(&self) -> String {
        format!("{}Creator", self.name)
    }

    pub fn builder_name(&self) -> String {
        format!("{}Builder", self.name)
    }
}

/// A generated helper struct that constructs the value of one binding.
#[derive(Debug, Clone)]
pub struct HelperPlan {
    pub name: String,
    /// The component the binding is resolved in.
    pub owner: ComponentId,
    pub key: Key,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Need {
    Instance,
    Provider,
}

impl Need {
    fn of(request: &DependencyRequest) -> Need {
        match request.kind {
            RequestKind::Instance => Need::Instance,
            _ => Need::Provider,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub mode: CodegenMode,
    pub module_name: String,
    pub components: Vec<ComponentPlan>,
    /// `*_Factory` structs of the default mode.
    pub factories: Vec<HelperPlan>,
    /// Implementations of `#[assisted_factory]` traits.
    pub assisted_factories: Vec<HelperPlan>,
    helper_names: UniqueNames,
    helper_index: BTreeMap<String, String>,
}

impl Plan {
    pub fn new(
        graph: &BindingGraph,
        decl: &Declarations,
        mode: CodegenMode,
        root_name: &str,
    ) -> Plan {
        let mut plan = Plan {
            mode,
            module_name: naming::snake_case(root_name),
            components: component_plans(graph, decl, root_name),
            factories: Vec::new(),
            assisted_factories: Vec::new(),
            helper_names: UniqueNames::new(),
            helper_index: BTreeMap::new(),
        };
        for component in &plan.components {
            plan.helper_names.reserve(&component.name);
            plan.helper_names.reserve(&component.switching_provider_name());
            plan.helper_names.reserve(&component.creator_name());
            plan.helper_names.reserve(&component.builder_name());
        }
        plan.discover(graph);
        debug!(
            "planned {}: {} provider field(s), {} switch case(s), {} factory struct(s)",
            root_name,
            plan.components
                .iter()
                .map(|c| c.provider_fields.len())
                .sum::<usize>(),
            plan.components
                .iter()
                .map(|c| c.switch_ids.len())
                .sum::<usize>(),
            plan.factories.len() + plan.assisted_factories.len()
        );
        plan
    }

    pub fn component(&self, id: ComponentId) -> &ComponentPlan {
        &self.components[id]
    }

    /// Name of the helper struct generated for `binding`.
    pub fn helper_name(&self, binding: &Binding) -> Option<&str> {
        self.helper_index
            .get(&helper_identity(binding))
            .map(|s| s.as_str())
    }

    /// Walks every request reachable from the entry points until no key needs more than it was
    /// already given.
    fn discover(&mut self, graph: &BindingGraph) {
        let mut needs: BTreeMap<(ComponentId, Key), Need> = BTreeMap::new();
        let mut queue: VecDeque<(ComponentId, Key, Need)> = VecDeque::new();
        for id in graph.preorder() {
            for entry_point in &graph.component(id).entry_points {
                if let EntryPointKind::Provision(ref request) = entry_point.kind {
                    queue.push_back((id, request.key.clone(), Need::of(request)));
                }
            }
        }
        while let Some((from, key, need)) = queue.pop_front() {
            let Some(resolved) = graph.resolved(from, &key) else {
                continue;
            };
            let Some(binding) = resolved.binding() else {
                continue;
            };
            let owner = resolved.owner;
            let previous = needs.get(&(owner, key.clone())).copied();
            let need = previous.map(|p| p.max(need)).unwrap_or(need);
            if previous == Some(need) {
                continue;
            }
            needs.insert((owner, key.clone()), need);

            let scoped = binding.scope.is_some();
            let held = match self.mode {
                CodegenMode::Default => scoped || need == Need::Provider,
                CodegenMode::FastInit => scoped,
            };
            if held {
                self.add_provider_field(owner, &key);
            }
            if self.mode == CodegenMode::FastInit && (scoped || need == Need::Provider) {
                self.add_switch_id(owner, &key);
            }
            if held
                && self.mode == CodegenMode::Default
                && matches!(
                    binding.kind,
                    BindingKind::Injection { .. } | BindingKind::Provision { .. }
                )
            {
                self.add_helper(owner, binding, HelperKind::Factory);
            }
            let assisted = matches!(binding.kind, BindingKind::AssistedFactory { .. });
            if assisted {
                self.add_helper(owner, binding, HelperKind::AssistedFactory);
            }
            for request in &binding.dependencies {
                let dependency_need = if assisted || (held && self.mode == CodegenMode::Default) {
                    Need::Provider
                } else {
                    Need::of(request)
                };
                queue.push_back((owner, request.key.clone(), dependency_need));
            }
        }
    }

    fn add_provider_field(&mut self, owner: ComponentId, key: &Key) {
        let component = &mut self.components[owner];
        if component.field_index.contains_key(key) {
            return;
        }
        let field = component.names.allocate(&format!("{}_provider", naming::key_field_name(key)));
        component
            .field_index
            .insert(key.clone(), component.provider_fields.len());
        component.provider_fields.push((key.clone(), field));
    }

    fn add_switch_id(&mut self, owner: ComponentId, key: &Key) {
        let component = &mut self.components[owner];
        if component.switch_index.contains_key(key) {
            return;
        }
        let id = component.switch_ids.len();
        component.switch_index.insert(key.clone(), id);
        component.switch_ids.push((key.clone(), id));
    }

    fn add_helper(&mut self, owner: ComponentId, binding: &Binding, kind: HelperKind) {
        let identity = helper_identity(binding);
        if self.helper_index.contains_key(&identity) {
            return;
        }
        let base = match (kind, &binding.kind) {
            (_, BindingKind::Provision { module, method, .. }) => format!(
                "{}_{}Factory",
                naming::type_name(module),
                naming::upper_camel_case(method)
            ),
            (_, BindingKind::AssistedFactory { factory, .. }) => {
                format!("{}_Impl", naming::type_name(factory))
            }
            _ => format!("{}_Factory", naming::type_name(&binding.key)),
        };
        let name = self.helper_names.allocate(&base);
        self.helper_index.insert(identity, name.clone());
        let helper = HelperPlan {
            name,
            owner,
            key: binding.key.clone(),
        };
        match kind {
            HelperKind::Factory => self.factories.push(helper),
            HelperKind::AssistedFactory => self.assisted_factories.push(helper),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum HelperKind {
    Factory,
    AssistedFactory,
}

fn helper_identity(binding: &Binding) -> String {
    format!("{}|{}", binding.key.identifier_string(), binding.declaration)
}

fn component_plans(
    graph: &BindingGraph,
    decl: &Declarations,
    root_name: &str,
) -> Vec<ComponentPlan> {
    let mut candidates = BTreeMap::new();
    for node in graph.components.iter().skip(1) {
        candidates.insert(
            node.type_data().clone(),
            format!("{}Impl", node.type_data().simple_name()),
        );
    }
    let disambiguated = naming::disambiguate(&candidates);
    let mut impl_names = UniqueNames::new();
    impl_names.reserve(root_name);

    let mut result = Vec::new();
    for node in &graph.components {
        let name = if node.parent.is_none() {
            root_name.to_owned()
        } else {
            impl_names.allocate(&disambiguated[node.type_data()])
        };
        let mut names = UniqueNames::new();
        names.reserve("this");
        names.reserve("parent");
        for instance in &node.modules {
            names.reserve(&instance.field);
        }
        for bound in &node.bound_instances {
            names.reserve(&bound.field);
        }
        let dependencies = node
            .dependencies
            .iter()
            .map(|d| (d.clone(), names.allocate(&naming::key_field_name(d))))
            .collect();
        let modules = node
            .modules
            .iter()
            .filter(|m| m.used)
            .map(|m| ModuleField {
                type_data: m.type_data.clone(),
                field: m.field.clone(),
                default_constructible: m.default_constructible,
            })
            .collect();
        let setters = node
            .modules
            .iter()
            .filter(|m| {
                decl.module(&m.type_data)
                    .map(|d| d.kind != ItemKind::Trait)
                    .unwrap_or(false)
            })
            .map(|m| ModuleSetter {
                type_data: m.type_data.clone(),
                name: m.field.clone(),
                used: m.used,
            })
            .collect();
        result.push(ComponentPlan {
            name,
            modules,
            setters,
            dependencies,
            provider_fields: Vec::new(),
            switch_ids: Vec::new(),
            field_index: BTreeMap::new(),
            switch_index: BTreeMap::new(),
            names,
        });
    }
    result
}
