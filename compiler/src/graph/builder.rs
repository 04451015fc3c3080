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

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::graph::{
    BindingGraph, BoundInstance, ChildSource, ComponentId, ComponentNode, EntryPoint,
    EntryPointKind, ModuleInstance, ResolvedBindings,
};
use crate::model::binding::{Binding, BindingKind, ContributionType, Scope};
use crate::model::declarations::{Declarations, ModuleDescriptor};
use crate::model::key::{self, DependencyRequest, Key, ARC, BOX, HASH_MAP};
use crate::naming::{self, UniqueNames};
use dirk_common::manifest::{
    Component, ComponentType, Creator, Dependency, Location, MultibindingMapKey, Receiver,
};
use dirk_common::type_data::TypeData;
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::debug;

/// Builds the component tree of `root` and resolves every key its entry points reach.
///
/// Returns `None` when `root` is not a known component.
pub fn build(
    decl: &Declarations,
    root: &TypeData,
    diagnostics: &mut Diagnostics,
) -> Option<BindingGraph> {
    let component = decl.component(root)?.clone();
    let mut builder = GraphBuilder {
        decl,
        diagnostics,
        components: Vec::new(),
    };
    builder.add_component(&component, None, None);
    for id in 0..builder.components.len() {
        let requests: Vec<Key> = builder.components[id]
            .entry_points
            .iter()
            .filter_map(|e| match e.kind {
                EntryPointKind::Provision(ref request) => Some(request.key.clone()),
                EntryPointKind::ChildFactory { .. } => None,
            })
            .collect();
        for key in requests {
            builder.resolve(id, &key);
        }
    }
    builder.mark_used_modules();
    debug!(
        "built graph of {}: {} component(s), {} resolution(s)",
        root.readable(),
        builder.components.len(),
        builder
            .components
            .iter()
            .map(|c| c.owned.len())
            .sum::<usize>()
    );
    Some(BindingGraph {
        components: builder.components,
    })
}

struct GraphBuilder<'a> {
    decl: &'a Declarations,
    diagnostics: &'a mut Diagnostics,
    components: Vec<ComponentNode>,
}

/// Modules in the include closure of `roots`, each once, in breadth first order.
pub(crate) fn module_closure(decl: &Declarations, roots: &[TypeData]) -> Vec<ModuleDescriptor> {
    let mut result = Vec::new();
    let mut seen = HashSet::new();
    let mut queue: VecDeque<TypeData> = roots.iter().cloned().collect();
    while let Some(module) = queue.pop_front() {
        if !seen.insert(module.clone()) {
            continue;
        }
        let Some(descriptor) = decl.module_descriptor(&module) else {
            continue;
        };
        queue.extend(descriptor.includes.iter().cloned());
        result.push(descriptor);
    }
    result
}

fn register(
    explicit: &mut BTreeMap<Key, Vec<Binding>>,
    contributions: &mut BTreeMap<Key, Vec<Binding>>,
    binding: Binding,
) {
    if let Some(aggregate) = binding.aggregate_key() {
        contributions
            .entry(aggregate)
            .or_default()
            .push(binding.clone());
    }
    explicit.entry(binding.key.clone()).or_default().push(binding);
}

impl<'a> GraphBuilder<'a> {
    fn depth(&self, id: ComponentId) -> usize {
        self.components[id].depth
    }

    fn chain(&self, id: ComponentId) -> Vec<ComponentId> {
        let mut result = vec![id];
        let mut current = id;
        while let Some(parent) = self.components[current].parent {
            result.push(parent);
            current = parent;
        }
        result
    }

    fn is_subcomponent(&self, type_data: &TypeData) -> bool {
        self.decl
            .component(type_data)
            .map(|c| c.component_type == ComponentType::Subcomponent)
            .unwrap_or(false)
    }

    fn add_component(
        &mut self,
        component: &Component,
        parent: Option<ComponentId>,
        source: Option<ChildSource>,
    ) -> ComponentId {
        let id = self.components.len();
        let depth = parent.map(|p| self.depth(p) + 1).unwrap_or(0);
        let creator: Option<Creator> = match source {
            Some(ChildSource::FactoryMethod(_)) => None,
            _ => self
                .decl
                .creators_for(&component.type_data)
                .first()
                .map(|c| (*c).clone()),
        };

        let inherited: HashSet<TypeData> = match parent {
            Some(p) => self
                .chain(p)
                .iter()
                .flat_map(|c| self.components[*c].modules.iter().map(|m| m.type_data.clone()))
                .collect(),
            None => HashSet::new(),
        };
        let descriptors: Vec<ModuleDescriptor> = module_closure(self.decl, &component.modules)
            .into_iter()
            .filter(|d| !inherited.contains(&d.type_data))
            .collect();

        let mut names = UniqueNames::new();
        names.reserve("this");
        names.reserve("parent");
        let mut explicit: BTreeMap<Key, Vec<Binding>> = BTreeMap::new();
        let mut contributions: BTreeMap<Key, Vec<Binding>> = BTreeMap::new();
        let mut multibinds: BTreeMap<Key, Vec<Location>> = BTreeMap::new();
        let mut modules = Vec::new();
        for descriptor in &descriptors {
            modules.push(ModuleInstance {
                type_data: descriptor.type_data.clone(),
                field: names.allocate(&naming::key_field_name(&descriptor.type_data)),
                requires_instance: descriptor.requires_instance,
                default_constructible: self.decl.is_default_constructible(&descriptor.type_data),
                used: false,
            });
            for binding in &descriptor.bindings {
                register(&mut explicit, &mut contributions, binding.clone());
            }
            for (aggregate, location) in &descriptor.multibinds {
                multibinds
                    .entry(aggregate.clone())
                    .or_default()
                    .push(location.clone());
            }
        }

        let dependencies = component.dependencies.clone();
        for dependency in &dependencies {
            for binding in self.decl.dependency_bindings(dependency) {
                register(&mut explicit, &mut contributions, binding);
            }
        }

        let instance_parameters: Vec<(String, Dependency)> = match (&source, &creator) {
            (Some(ChildSource::FactoryMethod(method)), _) => method
                .parameters
                .iter()
                .map(|p| (format!("{}::{}", component.type_data.readable(), method.name), p.clone()))
                .collect(),
            (_, Some(creator)) => self
                .decl
                .abstract_methods(&creator.type_data)
                .into_iter()
                .flat_map(|m| {
                    let site = format!("{}::{}", m.declaring_trait.readable(), m.method.name);
                    m.method
                        .parameters
                        .into_iter()
                        .map(move |p| (site.clone(), p))
                })
                .collect(),
            _ => Vec::new(),
        };
        let mut bound_instances = Vec::new();
        for (site, parameter) in instance_parameters.iter().filter(|(_, p)| p.bind_instance) {
            let request = DependencyRequest::from_dependency(parameter);
            let field = names.allocate(&naming::snake_case(&parameter.name));
            let binding = Binding::new(
                request.key.clone(),
                BindingKind::BoundInstance {
                    field: field.clone(),
                    nullable: request.nullable,
                },
                format!(
                    "#[bind_instance] {}({})",
                    site,
                    parameter.type_data.readable()
                ),
                &parameter.location,
            );
            register(&mut explicit, &mut contributions, binding);
            bound_instances.push(BoundInstance {
                key: request.key,
                field,
                nullable: request.nullable,
                location: parameter.location.clone(),
            });
        }

        let handle = key::arc_dyn(&component.type_data);
        register(
            &mut explicit,
            &mut contributions,
            Binding::new(
                handle.clone(),
                BindingKind::ComponentInstance {
                    component: component.type_data.clone(),
                },
                format!("{} (component instance)", handle.readable()),
                &component.location,
            ),
        );

        self.components.push(ComponentNode {
            id,
            parent,
            depth,
            decl: component.clone(),
            creator,
            source,
            children: Vec::new(),
            scopes: component.scopes.iter().map(Scope::from_type).collect(),
            modules,
            dependencies,
            bound_instances,
            entry_points: Vec::new(),
            explicit,
            contributions,
            multibinds,
            owned: BTreeMap::new(),
            resolved_owner: BTreeMap::new(),
        });

        let mut entry_points = Vec::new();
        for trait_method in self.decl.abstract_methods(&component.type_data) {
            let method = &trait_method.method;
            if !method.type_params.is_empty() || method.receiver != Receiver::Ref {
                continue;
            }
            let Some(ref return_type) = method.return_type else {
                continue;
            };
            if let Some(child_type) =
                key::dyn_target(return_type, ARC).filter(|t| self.is_subcomponent(t))
            {
                let source = ChildSource::FactoryMethod(method.clone());
                if let Some(child) = self.child(id, &child_type, source, &method.location) {
                    entry_points.push(EntryPoint {
                        declaring_trait: trait_method.declaring_trait.clone(),
                        method: method.clone(),
                        kind: EntryPointKind::ChildFactory { child },
                    });
                }
                continue;
            }
            if !method.parameters.is_empty() {
                continue;
            }
            if let Some(creator) = key::dyn_target(return_type, BOX)
                .and_then(|t| self.decl.creator(&t))
                .filter(|c| c.for_subcomponent)
            {
                let subcomponent = creator.component.clone();
                self.child_with_creator(id, &subcomponent, &method.location);
            }
            entry_points.push(EntryPoint {
                declaring_trait: trait_method.declaring_trait.clone(),
                method: method.clone(),
                kind: EntryPointKind::Provision(DependencyRequest::new(
                    return_type,
                    method.qualifiers.first(),
                    &method.name,
                    method.nullable,
                    &method.location,
                )),
            });
        }
        for descriptor in &descriptors {
            for subcomponent in &descriptor.subcomponents {
                self.child_with_creator(id, subcomponent, &descriptor.location);
            }
        }
        self.components[id].entry_points = entry_points;
        id
    }

    /// The child of `parent` for `child_type`, created on first use.
    fn child(
        &mut self,
        parent: ComponentId,
        child_type: &TypeData,
        source: ChildSource,
        location: &Location,
    ) -> Option<ComponentId> {
        if self.decl.is_erroneous(child_type) {
            return None;
        }
        let chain = self.chain(parent);
        if chain
            .iter()
            .any(|c| self.components[*c].type_data() == child_type)
        {
            let mut path: Vec<String> = chain
                .iter()
                .rev()
                .map(|c| format!("    {}", self.components[*c].readable()))
                .collect();
            path.push(format!("    {}", child_type.readable()));
            let parent_node = &self.components[parent];
            self.diagnostics.error(
                DiagnosticKind::ComponentHierarchyCycle,
                location,
                &parent_node.readable(),
                format!(
                    "{} cannot be installed below itself:\n{}",
                    child_type.readable(),
                    path.join("\n")
                ),
            );
            return None;
        }
        if let Some(existing) = self.components[parent]
            .children
            .iter()
            .find(|c| self.components[**c].type_data() == child_type)
        {
            return Some(*existing);
        }
        let component = self.decl.component(child_type)?.clone();
        let child = self.add_component(&component, Some(parent), Some(source));
        self.components[parent].children.push(child);
        Some(child)
    }

    /// Installs `subcomponent` below `parent` and binds its creator in `parent`.
    fn child_with_creator(&mut self, parent: ComponentId, subcomponent: &TypeData, location: &Location) {
        if !self.is_subcomponent(subcomponent) {
            return;
        }
        let Some(creator) = self.decl.creators_for(subcomponent).first().map(|c| (*c).clone()) else {
            return;
        };
        if self
            .child(parent, subcomponent, ChildSource::Creator, location)
            .is_none()
        {
            return;
        }
        let creator_key = key::box_dyn(&creator.type_data);
        let explicit = &mut self.components[parent].explicit;
        if explicit.contains_key(&creator_key) {
            return;
        }
        explicit.insert(
            creator_key.clone(),
            vec![Binding::new(
                creator_key.clone(),
                BindingKind::SubcomponentCreator {
                    subcomponent: subcomponent.clone(),
                    creator: creator.type_data.clone(),
                },
                format!("{} (subcomponent creator)", creator_key.readable()),
                &creator.location,
            )],
        );
    }

    /// Resolves `key` as requested from `from` and returns the owning component.
    fn resolve(&mut self, from: ComponentId, key: &Key) -> ComponentId {
        if let Some(owner) = self.components[from].resolved_owner.get(key) {
            return *owner;
        }
        let chain = self.chain(from);
        let mut explicit: Vec<(ComponentId, Binding)> = Vec::new();
        for c in &chain {
            if let Some(bindings) = self.components[*c].explicit.get(key) {
                explicit.extend(bindings.iter().map(|b| (*c, b.clone())));
            }
        }
        let aggregate_owner = chain.iter().copied().find(|c| {
            self.components[*c].contributions.contains_key(key)
                || self.components[*c].multibinds.contains_key(key)
        });

        if aggregate_owner.is_none()
            && !explicit.is_empty()
            && explicit
                .iter()
                .all(|(_, b)| matches!(b.kind, BindingKind::Optional { .. }))
        {
            let (declaring, binding) = explicit.swap_remove(0);
            return self.resolve_optional(from, key, declaring, binding);
        }
        if !explicit.is_empty() || aggregate_owner.is_some() {
            let owner = explicit
                .first()
                .map(|(c, _)| *c)
                .into_iter()
                .chain(aggregate_owner)
                .max_by_key(|c| self.depth(*c))
                .unwrap_or(from);
            let mut bindings: Vec<Binding> = explicit.into_iter().map(|(_, b)| b).collect();
            if let Some(aggregate_owner) = aggregate_owner {
                bindings.push(self.aggregate_binding(aggregate_owner, key));
            }
            return self.own(from, owner, key, bindings, false, false);
        }

        let implicit = self
            .decl
            .injection_binding(key)
            .or_else(|| self.decl.assisted_factory_binding(key));
        if let Some(binding) = implicit {
            return match binding.scope {
                Some(Scope::Named(_)) => {
                    let scope = binding.scope.clone();
                    let owner = chain
                        .iter()
                        .copied()
                        .find(|c| scope.as_ref().map(|s| self.components[*c].has_scope(s)).unwrap_or(false))
                        .unwrap_or(from);
                    self.own(from, owner, key, vec![binding], false, false)
                }
                _ => self.resolve_floating(from, key, binding),
            };
        }

        let assisted_injection = self.decl.is_assisted_injection(key);
        let erroneous = self.decl.is_erroneous(key);
        self.own(from, from, key, Vec::new(), assisted_injection, erroneous)
    }

    /// Records `bindings` for `key` in `owner` and resolves their dependencies from there.
    fn own(
        &mut self,
        from: ComponentId,
        owner: ComponentId,
        key: &Key,
        bindings: Vec<Binding>,
        assisted_injection: bool,
        erroneous: bool,
    ) -> ComponentId {
        self.components[from]
            .resolved_owner
            .insert(key.clone(), owner);
        if self.components[owner].owned.contains_key(key) {
            return owner;
        }
        self.components[owner]
            .resolved_owner
            .insert(key.clone(), owner);
        let requests: Vec<Key> = bindings
            .iter()
            .flat_map(|b| b.dependencies.iter().map(|d| d.key.clone()))
            .collect();
        self.components[owner].owned.insert(
            key.clone(),
            ResolvedBindings {
                key: key.clone(),
                bindings,
                owner,
                assisted_injection,
                erroneous,
            },
        );
        for request in requests {
            self.resolve(owner, &request);
        }
        owner
    }

    /// Unscoped implicit bindings live in the highest component that sees all their dependencies.
    fn resolve_floating(&mut self, from: ComponentId, key: &Key, binding: Binding) -> ComponentId {
        self.components[from]
            .resolved_owner
            .insert(key.clone(), from);
        let mut owner = 0;
        for request in &binding.dependencies {
            let dependency_owner = self.resolve(from, &request.key);
            if self.depth(dependency_owner) > self.depth(owner) {
                owner = dependency_owner;
            }
        }
        self.components[from].resolved_owner.remove(key);
        if owner != from && self.components[owner].owned.contains_key(key) {
            self.components[from]
                .resolved_owner
                .insert(key.clone(), owner);
            return owner;
        }
        self.own(from, owner, key, vec![binding], false, false)
    }

    /// `Option<T>` is present iff `T` is bound, and lives at least as deep as `T`.
    fn resolve_optional(
        &mut self,
        from: ComponentId,
        key: &Key,
        declaring: ComponentId,
        mut binding: Binding,
    ) -> ComponentId {
        let BindingKind::Optional { ref target } = binding.kind else {
            return self.own(from, declaring, key, vec![binding], false, false);
        };
        let target = target.clone();
        let mut owner = declaring;
        if self.is_bound(from, &target) {
            let target_owner = self.resolve(from, &target);
            if self.depth(target_owner) > self.depth(owner) {
                owner = target_owner;
            }
            binding.dependencies = vec![DependencyRequest::instance(&target, &binding.location)];
        }
        self.own(from, owner, key, vec![binding], false, false)
    }

    fn is_bound(&self, from: ComponentId, key: &Key) -> bool {
        self.chain(from).iter().any(|c| {
            let node = &self.components[*c];
            node.explicit.contains_key(key)
                || node.contributions.contains_key(key)
                || node.multibinds.contains_key(key)
        }) || self.decl.injection_binding(key).is_some()
            || self.decl.assisted_factory_binding(key).is_some()
    }

    /// The multibinding for `key` as seen from `owner`, including inherited contributions.
    fn aggregate_binding(&self, owner: ComponentId, key: &Key) -> Binding {
        let mut chain = self.chain(owner);
        chain.reverse();
        let contributions: Vec<(ComponentId, &Binding)> = chain
            .iter()
            .flat_map(|c| {
                self.components[*c]
                    .contributions
                    .get(key)
                    .into_iter()
                    .flatten()
                    .map(move |b| (*c, b))
            })
            .collect();
        let (kind, dependencies) = if key.is_global(HASH_MAP) && key.args.len() == 2 {
            let mut entries: Vec<(ComponentId, MultibindingMapKey, &Binding)> = Vec::new();
            for (c, binding) in contributions {
                if let ContributionType::IntoMap(ref map_key) = binding.contribution {
                    entries.retain(|(owner, k, _)| *owner == c || k != map_key);
                    entries.push((c, map_key.clone(), binding));
                }
            }
            let dependencies = entries
                .iter()
                .map(|(_, _, b)| DependencyRequest::instance(&b.key, &b.location))
                .collect();
            let kind = BindingKind::MultiboundMap {
                key_type: key.args[0].clone(),
                contributions: entries
                    .into_iter()
                    .map(|(_, k, b)| (k, b.key.clone()))
                    .collect(),
            };
            (kind, dependencies)
        } else {
            let dependencies = contributions
                .iter()
                .map(|(_, b)| DependencyRequest::instance(&b.key, &b.location))
                .collect();
            let kind = BindingKind::MultiboundVec {
                contributions: contributions
                    .iter()
                    .map(|(_, b)| {
                        (
                            b.key.clone(),
                            b.contribution == ContributionType::ElementsIntoVec,
                        )
                    })
                    .collect(),
            };
            (kind, dependencies)
        };
        let mut binding = Binding::new(
            key.clone(),
            kind,
            format!("{} (multibinding)", key.readable()),
            self.components[owner].location(),
        );
        binding.dependencies = dependencies;
        binding
    }

    fn mark_used_modules(&mut self) {
        let mut used: Vec<(ComponentId, TypeData)> = Vec::new();
        for node in &self.components {
            for resolved in node.owned.values() {
                for binding in &resolved.bindings {
                    if !binding.requires_module_instance() {
                        continue;
                    }
                    let Some(ref module) = binding.module else {
                        continue;
                    };
                    if let Some(c) = self.chain(node.id).into_iter().find(|c| {
                        self.components[*c]
                            .modules
                            .iter()
                            .any(|m| &m.type_data == module)
                    }) {
                        used.push((c, module.clone()));
                    }
                }
            }
        }
        for (c, module) in used {
            for instance in &mut self.components[c].modules {
                if instance.type_data == module {
                    instance.used = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirk_common::manifest_parser::parse_source;
    use pretty_assertions::assert_eq;

    fn graph(src: &str) -> (BindingGraph, Diagnostics) {
        let decl = Declarations::new(parse_source("lib.rs", src, false).unwrap());
        let mut diagnostics = Diagnostics::new();
        let graph = build(
            &decl,
            &TypeData::from_str("crate::App").unwrap(),
            &mut diagnostics,
        )
        .unwrap();
        (graph, diagnostics)
    }

    fn key(s: &str) -> Key {
        TypeData::from_str(s).unwrap()
    }

    const HIERARCHY: &str = r#"
        #[scope]
        pub struct Singleton;
        #[scope]
        pub struct ChildScope;

        pub struct Config;
        #[injectable]
        impl Config {
            #[inject]
            pub fn new() -> Self { Config }
        }

        pub struct Session;
        #[injectable]
        #[scoped(crate::Singleton)]
        impl Session {
            #[inject]
            pub fn new(config: crate::Config) -> Self { Session }
        }

        pub struct Request;
        #[injectable]
        impl Request {
            #[inject]
            pub fn new(user: crate::User) -> Self { Request }
        }

        pub struct ChildModule;
        #[module]
        impl ChildModule {
            #[provides]
            pub fn user() -> crate::User { todo!() }
        }

        #[subcomponent(modules: [crate::ChildModule])]
        #[scoped(crate::ChildScope)]
        pub trait Child {
            fn config(&self) -> crate::Config;
            fn session(&self) -> crate::Session;
            fn request(&self) -> crate::Request;
        }

        #[component]
        #[scoped(crate::Singleton)]
        pub trait App {
            fn child(&self) -> std::sync::Arc<dyn crate::Child>;
        }
    "#;

    #[test]
    fn owners_follow_scopes_and_dependencies() {
        let (graph, diagnostics) = graph(HIERARCHY);
        assert_eq!(diagnostics.error_count(), 0);
        assert_eq!(graph.components.len(), 2);
        let child = graph.root().children[0];
        assert_eq!(graph.component(child).readable(), "crate::Child");

        assert_eq!(graph.resolved(child, &key("crate::Config")).unwrap().owner, 0);
        assert_eq!(graph.resolved(child, &key("crate::Session")).unwrap().owner, 0);
        assert_eq!(graph.resolved(child, &key("crate::Request")).unwrap().owner, child);
    }

    #[test]
    fn child_factory_entry_point() {
        let (graph, _) = graph(HIERARCHY);
        let entry_point = &graph.root().entry_points[0];
        assert_eq!(entry_point.readable(), "crate::App::child()");
        assert!(matches!(
            entry_point.kind,
            EntryPointKind::ChildFactory { child: 1 }
        ));
    }

    #[test]
    fn missing_key_is_marked_at_requester() {
        let (graph, _) = graph(
            r#"
            #[component]
            pub trait App {
                fn foo(&self) -> crate::Foo;
            }
            "#,
        );
        let resolved = graph.resolved(0, &key("crate::Foo")).unwrap();
        assert!(resolved.is_missing());
    }

    #[test]
    fn child_map_contribution_overrides_parent() {
        let (graph, _) = graph(
            r#"
            pub struct ParentModule;
            #[module(subcomponents: [crate::Child])]
            impl ParentModule {
                #[provides]
                #[into_map(string_key: "a")]
                pub fn a() -> i32 { 1 }
                #[provides]
                #[into_map(string_key: "b")]
                pub fn b() -> i32 { 2 }
            }
            pub struct ChildModule;
            #[module]
            impl ChildModule {
                #[provides]
                #[into_map(string_key: "a")]
                pub fn a() -> i32 { 3 }
            }
            #[subcomponent(modules: [crate::ChildModule])]
            pub trait Child {
                fn map(&self) -> std::collections::HashMap<String, i32>;
            }
            #[subcomponent_builder(crate::Child)]
            pub trait ChildBuilder {
                fn build(&mut self) -> std::sync::Arc<dyn crate::Child>;
            }
            #[component(modules: [crate::ParentModule])]
            pub trait App {
                fn map(&self) -> std::collections::HashMap<String, i32>;
            }
            "#,
        );
        let map_key = key("::std::collections::HashMap<::std::string::String, i32>");
        let root_map = graph.resolved(0, &map_key).unwrap();
        let BindingKind::MultiboundMap { ref contributions, .. } = root_map.bindings[0].kind else {
            panic!("expected a map binding");
        };
        assert_eq!(contributions.len(), 2);

        let child_map = graph.resolved(1, &map_key).unwrap();
        assert_eq!(child_map.owner, 1);
        let BindingKind::MultiboundMap { ref contributions, .. } = child_map.bindings[0].kind else {
            panic!("expected a map binding");
        };
        let sources: Vec<String> = contributions
            .iter()
            .map(|(_, k)| k.identifier_suffix.clone())
            .collect();
        assert_eq!(sources, vec!["crate::ParentModule.b", "crate::ChildModule.a"]);
        assert!(graph
            .root()
            .explicit
            .contains_key(&key("::std::boxed::Box<dyn crate::ChildBuilder>")));
    }

    #[test]
    fn hierarchy_cycle_is_reported() {
        let (_, diagnostics) = graph(
            r#"
            #[subcomponent]
            pub trait Child {
                fn again(&self) -> std::sync::Arc<dyn crate::Child>;
            }
            #[component]
            pub trait App {
                fn child(&self) -> std::sync::Arc<dyn crate::Child>;
            }
            "#,
        );
        let texts: Vec<String> = diagnostics.iter().map(|d| d.text()).collect();
        assert_eq!(
            texts,
            vec!["[Dirk/ComponentHierarchyCycle] crate::Child cannot be installed below itself:\n    crate::App\n    crate::Child\n    crate::Child"]
        );
    }
}
