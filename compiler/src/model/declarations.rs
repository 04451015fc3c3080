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

//! Indexed view of a [`Manifest`] that turns declarations into [`Binding`]s.

use crate::model::binding::{readable_parameters, Binding, BindingKind, ContributionType, Scope};
use crate::model::key::{self, unwrap_single, DependencyRequest, Key, ARC, HASH_MAP, OPTION, VEC};
use dirk_common::manifest::{
    AssistedFactory, BindingType, Component, Constructor, Creator, Injectable, ItemKind, Location,
    Manifest, Method, Module, MultibindingType, Receiver,
};
use dirk_common::type_data::TypeData;
use std::collections::{HashMap, HashSet};

/// Bindings and metadata of a module, with its generic parameters substituted.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    pub type_data: TypeData,
    pub bindings: Vec<Binding>,
    /// Aggregates declared with `#[multibinds]`.
    pub multibinds: Vec<(Key, Location)>,
    pub includes: Vec<TypeData>,
    pub subcomponents: Vec<TypeData>,
    /// Some binding is called on `&self`.
    pub requires_instance: bool,
    pub location: Location,
}

/// A method reachable from a trait, either declared on it or inherited from a supertrait.
#[derive(Debug, Clone)]
pub struct TraitMethod {
    pub declaring_trait: TypeData,
    pub method: Method,
}

/// Strips args, qualifier and `dyn` so generic instantiations share a declaration.
pub fn index_key(type_data: &TypeData) -> String {
    let mut t = type_data.without_qualifier();
    t.args.clear();
    t.trait_object = false;
    t.bounds.clear();
    t.identifier_suffix.clear();
    t.canonical_string_path()
}

pub struct Declarations {
    manifest: Manifest,
    injectables: HashMap<String, usize>,
    modules: HashMap<String, usize>,
    components: HashMap<String, usize>,
    creators: HashMap<String, usize>,
    assisted_factories: HashMap<String, usize>,
    traits: HashMap<String, usize>,
    default_constructibles: HashSet<String>,
    scopes: HashSet<String>,
    qualifiers: HashSet<String>,
    erroneous: HashSet<String>,
}

impl Declarations {
    pub fn new(manifest: Manifest) -> Self {
        fn index<'a>(types: impl Iterator<Item = &'a TypeData>) -> HashMap<String, usize> {
            let mut result = HashMap::new();
            for (i, t) in types.enumerate() {
                result.entry(index_key(t)).or_insert(i);
            }
            result
        }
        Declarations {
            injectables: index(manifest.injectables.iter().map(|i| &i.type_data)),
            modules: index(manifest.modules.iter().map(|m| &m.type_data)),
            components: index(manifest.components.iter().map(|c| &c.type_data)),
            creators: index(manifest.creators.iter().map(|c| &c.type_data)),
            assisted_factories: index(manifest.assisted_factories.iter().map(|f| &f.type_data)),
            traits: index(manifest.traits.iter().map(|t| &t.type_data)),
            default_constructibles: manifest.default_constructibles.iter().map(index_key).collect(),
            scopes: manifest.scopes.iter().map(index_key).collect(),
            qualifiers: manifest.qualifiers.iter().map(index_key).collect(),
            erroneous: HashSet::new(),
            manifest,
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Marks a declaration as malformed so later stages do not report follow-up errors for it.
    pub fn mark_erroneous(&mut self, type_data: &TypeData) {
        self.erroneous.insert(index_key(type_data));
    }

    /// Whether the declaration behind `key` (or the `dyn` trait of an `Arc<dyn T>` key) is malformed.
    pub fn is_erroneous(&self, key: &Key) -> bool {
        if self.erroneous.contains(&index_key(key)) {
            return true;
        }
        key::dyn_target(key, ARC)
            .or_else(|| key::dyn_target(key, key::BOX))
            .map(|t| self.erroneous.contains(&index_key(&t)))
            .unwrap_or(false)
    }

    pub fn injectable(&self, type_data: &TypeData) -> Option<&Injectable> {
        self.injectables
            .get(&index_key(type_data))
            .map(|i| &self.manifest.injectables[*i])
    }

    pub fn module(&self, type_data: &TypeData) -> Option<&Module> {
        self.modules
            .get(&index_key(type_data))
            .map(|i| &self.manifest.modules[*i])
    }

    pub fn component(&self, type_data: &TypeData) -> Option<&Component> {
        self.components
            .get(&index_key(type_data))
            .map(|i| &self.manifest.components[*i])
    }

    pub fn creator(&self, type_data: &TypeData) -> Option<&Creator> {
        self.creators
            .get(&index_key(type_data))
            .map(|i| &self.manifest.creators[*i])
    }

    pub fn assisted_factory(&self, type_data: &TypeData) -> Option<&AssistedFactory> {
        self.assisted_factories
            .get(&index_key(type_data))
            .map(|i| &self.manifest.assisted_factories[*i])
    }

    /// Creators declared for `component`, in declaration order.
    pub fn creators_for(&self, component: &TypeData) -> Vec<&Creator> {
        let component_key = index_key(component);
        self.manifest
            .creators
            .iter()
            .filter(|c| index_key(&c.component) == component_key)
            .collect()
    }

    pub fn is_default_constructible(&self, type_data: &TypeData) -> bool {
        self.default_constructibles.contains(&index_key(type_data))
    }

    pub fn is_scope(&self, type_data: &TypeData) -> bool {
        type_data.is_global(dirk_common::manifest::REUSABLE_SCOPE)
            || self.scopes.contains(&index_key(type_data))
    }

    pub fn is_qualifier(&self, type_data: &TypeData) -> bool {
        self.qualifiers.contains(&index_key(type_data))
    }

    /// Declared methods and supertraits of a trait known to the manifest.
    fn trait_declaration(&self, type_data: &TypeData) -> Option<(Vec<TypeData>, &[Method])> {
        let key = index_key(type_data);
        if let Some(i) = self.components.get(&key) {
            let c = &self.manifest.components[*i];
            return Some((c.supertraits.clone(), &c.methods));
        }
        if let Some(i) = self.creators.get(&key) {
            let c = &self.manifest.creators[*i];
            return Some((c.supertraits.clone(), &c.methods));
        }
        if let Some(i) = self.assisted_factories.get(&key) {
            let f = &self.manifest.assisted_factories[*i];
            return Some((f.supertraits.clone(), &f.methods));
        }
        if let Some(i) = self.traits.get(&key) {
            let t = &self.manifest.traits[*i];
            return Some((t.supertraits.clone(), &t.methods));
        }
        None
    }

    pub fn trait_location(&self, type_data: &TypeData) -> Option<Location> {
        let key = index_key(type_data);
        if let Some(i) = self.components.get(&key) {
            return Some(self.manifest.components[*i].location.clone());
        }
        if let Some(i) = self.creators.get(&key) {
            return Some(self.manifest.creators[*i].location.clone());
        }
        if let Some(i) = self.assisted_factories.get(&key) {
            return Some(self.manifest.assisted_factories[*i].location.clone());
        }
        self.traits
            .get(&key)
            .map(|i| self.manifest.traits[*i].location.clone())
    }

    /// `type_data` followed by all its supertraits, depth first. Unknown supertraits are skipped.
    pub fn trait_hierarchy(&self, type_data: &TypeData) -> Vec<TypeData> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        self.collect_hierarchy(type_data, &mut visited, &mut result);
        result
    }

    fn collect_hierarchy(
        &self,
        type_data: &TypeData,
        visited: &mut HashSet<String>,
        result: &mut Vec<TypeData>,
    ) {
        if !visited.insert(index_key(type_data)) {
            return;
        }
        let Some((supertraits, _)) = self.trait_declaration(type_data) else {
            return;
        };
        result.push(type_data.clone());
        for supertrait in &supertraits {
            self.collect_hierarchy(supertrait, visited, result);
        }
    }

    /// Supertraits in the hierarchy of `type_data` that have no declaration in the manifest.
    pub fn unknown_supertraits(&self, type_data: &TypeData) -> Vec<TypeData> {
        let mut result = Vec::new();
        for t in self.trait_hierarchy(type_data) {
            if let Some((supertraits, _)) = self.trait_declaration(&t) {
                for supertrait in supertraits {
                    if self.trait_declaration(&supertrait).is_none() && !result.contains(&supertrait) {
                        result.push(supertrait);
                    }
                }
            }
        }
        result
    }

    /// Every method of the trait hierarchy, declared methods first.
    pub fn trait_methods(&self, type_data: &TypeData) -> Vec<TraitMethod> {
        let mut result = Vec::new();
        for t in self.trait_hierarchy(type_data) {
            if let Some((_, methods)) = self.trait_declaration(&t) {
                for method in methods {
                    result.push(TraitMethod {
                        declaring_trait: t.clone(),
                        method: method.clone(),
                    });
                }
            }
        }
        result
    }

    /// Methods the generated code has to implement.
    pub fn abstract_methods(&self, type_data: &TypeData) -> Vec<TraitMethod> {
        self.trait_methods(type_data)
            .into_iter()
            .filter(|m| !m.method.has_default)
            .collect()
    }

    /// The `#[inject]` or `#[assisted_inject]` constructor, if there is exactly one candidate.
    pub fn injected_constructor<'a>(&self, injectable: &'a Injectable) -> Option<&'a Constructor> {
        injectable.constructors.first()
    }

    /// Whether `key` is a type constructed with `#[assisted_inject]`.
    pub fn is_assisted_injection(&self, key: &Key) -> bool {
        if key.qualifier.is_some() || key.trait_object {
            return false;
        }
        self.injectable(key)
            .and_then(|i| self.injected_constructor(i))
            .map(|c| c.assisted_inject)
            .unwrap_or(false)
    }

    /// Implicit binding from an `#[inject]` constructor.
    pub fn injection_binding(&self, key: &Key) -> Option<Binding> {
        if key.qualifier.is_some() || key.trait_object || !key.identifier_suffix.is_empty() {
            return None;
        }
        let injectable = self.injectable(key)?;
        if injectable.kind == ItemKind::Trait || injectable.type_params.len() != key.args.len() {
            return None;
        }
        let constructor = self.injected_constructor(injectable)?;
        if constructor.assisted_inject {
            return None;
        }
        let params = &injectable.type_params;
        let args = &key.args;
        let dependencies: Vec<DependencyRequest> = constructor
            .dependencies
            .iter()
            .map(|d| DependencyRequest::from_dependency(d).substitute(params, args))
            .collect();
        let parameter_types: Vec<_> = constructor
            .dependencies
            .iter()
            .map(|d| {
                let mut d = d.clone();
                d.type_data = d.type_data.substitute(params, args);
                d
            })
            .collect();
        let mut binding = Binding::new(
            key.clone(),
            BindingKind::Injection {
                type_data: key.clone(),
                constructor: constructor.name.clone(),
            },
            format!(
                "#[inject] {}::{}({})",
                key.readable(),
                constructor.name,
                readable_parameters(&parameter_types)
            ),
            &constructor.location,
        );
        binding.dependencies = dependencies;
        binding.scope = injectable.scopes.first().map(Scope::from_type);
        Some(binding)
    }

    /// The single method an assisted factory must implement, when well formed.
    pub fn assisted_factory_method(&self, factory: &TypeData) -> Option<TraitMethod> {
        let methods = self.abstract_methods(factory);
        if methods.len() == 1 {
            methods.into_iter().next()
        } else {
            None
        }
    }

    /// Implicit binding of `Arc<dyn F>` for an `#[assisted_factory]` trait `F`.
    pub fn assisted_factory_binding(&self, key: &Key) -> Option<Binding> {
        if key.qualifier.is_some() {
            return None;
        }
        let factory_type = key::dyn_target(key, ARC)?;
        let factory = self.assisted_factory(&factory_type)?;
        let factory_method = self.assisted_factory_method(&factory.type_data)?;
        let target = factory_method.method.return_type.clone()?;
        let injectable = self.injectable(&target)?;
        if injectable.type_params.len() != target.args.len() {
            return None;
        }
        let constructor = self.injected_constructor(injectable)?;
        if !constructor.assisted_inject {
            return None;
        }
        let params = &injectable.type_params;
        let constructor_parameters: Vec<_> = constructor
            .dependencies
            .iter()
            .map(|d| {
                let mut d = d.clone();
                d.type_data = d.type_data.substitute(params, &target.args);
                d
            })
            .collect();
        let dependencies = constructor_parameters
            .iter()
            .filter(|d| d.assisted.is_none())
            .map(DependencyRequest::from_dependency)
            .collect();
        let mut binding = Binding::new(
            key.clone(),
            BindingKind::AssistedFactory {
                factory: factory.type_data.clone(),
                target: target.clone(),
                method: factory_method.method.name.clone(),
                constructor: constructor.name.clone(),
                parameters: factory_method.method.parameters.clone(),
                constructor_parameters,
            },
            format!(
                "#[assisted_factory] {}::{}({}) -> {}",
                factory_method.declaring_trait.readable(),
                factory_method.method.name,
                readable_parameters(&factory_method.method.parameters),
                target.readable()
            ),
            &factory.location,
        );
        binding.dependencies = dependencies;
        Some(binding)
    }

    /// Bindings of a module instantiated as `type_data`.
    pub fn module_descriptor(&self, type_data: &TypeData) -> Option<ModuleDescriptor> {
        let module = self.module(type_data)?;
        let params = &module.type_params;
        let args = &type_data.args;
        let mut descriptor = ModuleDescriptor {
            type_data: type_data.without_qualifier(),
            bindings: Vec::new(),
            multibinds: Vec::new(),
            includes: module.includes.iter().map(|t| t.substitute(params, args)).collect(),
            subcomponents: module.subcomponents.clone(),
            requires_instance: false,
            location: module.location.clone(),
        };
        for declared in &module.bindings {
            if !declared.type_params.is_empty() {
                continue;
            }
            let return_type = declared.type_data.substitute(params, args);
            let qualifier = declared.qualifiers.first();
            if declared.binding_type == BindingType::Multibinds {
                if return_type.is_global(VEC) || return_type.is_global(HASH_MAP) {
                    descriptor
                        .multibinds
                        .push((key::key(&return_type, qualifier), declared.location.clone()));
                }
                continue;
            }
            if let Some(binding) =
                self.module_binding(&descriptor.type_data, declared, &return_type, params, args)
            {
                if binding.requires_module_instance() {
                    descriptor.requires_instance = true;
                }
                descriptor.bindings.push(binding);
            }
        }
        Some(descriptor)
    }

    fn module_binding(
        &self,
        module_type: &TypeData,
        declared: &dirk_common::manifest::Binding,
        return_type: &TypeData,
        params: &[String],
        args: &[TypeData],
    ) -> Option<Binding> {
        let qualifier = declared.qualifiers.first();
        let produced = if declared.nullable {
            unwrap_single(return_type, OPTION)?
        } else {
            return_type.clone()
        };
        let dependencies: Vec<DependencyRequest> = declared
            .dependencies
            .iter()
            .map(|d| DependencyRequest::from_dependency(d).substitute(params, args))
            .collect();
        let parameter_types: Vec<_> = declared
            .dependencies
            .iter()
            .map(|d| {
                let mut d = d.clone();
                d.type_data = d.type_data.substitute(params, args);
                d
            })
            .collect();
        let (kind, marker) = match declared.binding_type {
            BindingType::Provides => (
                BindingKind::Provision {
                    module: module_type.clone(),
                    method: declared.name.clone(),
                    is_static: declared.receiver == Receiver::None,
                    nullable: declared.nullable,
                },
                "#[provides]",
            ),
            BindingType::Binds => {
                if dependencies.len() != 1 {
                    return None;
                }
                (
                    BindingKind::Delegate {
                        module: module_type.clone(),
                        method: declared.name.clone(),
                    },
                    "#[binds]",
                )
            }
            BindingType::BindsOptionOf => {
                let target = unwrap_single(return_type, OPTION)?;
                (
                    BindingKind::Optional {
                        target: key::key(&target, qualifier),
                    },
                    "#[binds_option_of]",
                )
            }
            BindingType::Multibinds => return None,
        };
        let (contribution, contribution_marker) = match declared.multibinding_type {
            MultibindingType::None => (ContributionType::Unique, ""),
            MultibindingType::IntoVec => (ContributionType::IntoVec, " #[into_vec]"),
            MultibindingType::ElementsIntoVec => {
                unwrap_single(&produced, VEC)?;
                (ContributionType::ElementsIntoVec, " #[elements_into_vec]")
            }
            MultibindingType::IntoMap => {
                if declared.map_keys.len() != 1 {
                    return None;
                }
                (
                    ContributionType::IntoMap(declared.map_keys[0].clone()),
                    " #[into_map]",
                )
            }
        };
        let mut binding_key = key::key(&produced, qualifier);
        if contribution != ContributionType::Unique {
            binding_key.identifier_suffix = format!("{}.{}", module_type.readable(), declared.name);
        }
        let mut binding = Binding::new(
            binding_key,
            kind,
            format!(
                "{}{} {}::{}({}) -> {}",
                marker,
                contribution_marker,
                module_type.readable(),
                declared.name,
                readable_parameters(&parameter_types),
                return_type.readable_without_qualifier()
            ),
            &declared.location,
        );
        if declared.binding_type != BindingType::BindsOptionOf {
            binding.dependencies = dependencies;
        }
        binding.scope = declared.scopes.first().map(Scope::from_type);
        binding.contribution = contribution;
        binding.module = Some(module_type.clone());
        Some(binding)
    }

    /// Bindings contributed by a component dependency: the dependency itself and its provision
    /// methods.
    pub fn dependency_bindings(&self, dependency: &TypeData) -> Vec<Binding> {
        let handle = key::arc_dyn(dependency);
        let location = self.trait_location(dependency).unwrap_or_default();
        let mut result = vec![Binding::new(
            handle.clone(),
            BindingKind::ComponentDependency {
                dependency: dependency.clone(),
            },
            format!("{} (component dependency)", handle.readable()),
            &location,
        )];
        for trait_method in self.abstract_methods(dependency) {
            let method = &trait_method.method;
            if method.receiver != Receiver::Ref
                || !method.parameters.is_empty()
                || !method.type_params.is_empty()
            {
                continue;
            }
            let Some(ref return_type) = method.return_type else {
                continue;
            };
            let produced = if method.nullable {
                match unwrap_single(return_type, OPTION) {
                    Some(inner) => inner,
                    None => continue,
                }
            } else {
                return_type.clone()
            };
            let mut binding = Binding::new(
                key::key(&produced, method.qualifiers.first()),
                BindingKind::ComponentDependencyMethod {
                    dependency: dependency.clone(),
                    method: method.name.clone(),
                    nullable: method.nullable,
                },
                format!(
                    "{}::{}() -> {}",
                    trait_method.declaring_trait.readable(),
                    method.name,
                    return_type.readable()
                ),
                &method.location,
            );
            binding.dependencies = vec![DependencyRequest::instance(&handle, &method.location)];
            result.push(binding);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirk_common::manifest_parser::parse_source;
    use pretty_assertions::assert_eq;

    fn declarations(src: &str) -> Declarations {
        Declarations::new(parse_source("lib.rs", src, false).unwrap())
    }

    #[test]
    fn injection_binding_substitutes_generics() {
        let decl = declarations(
            r#"
            pub struct Foo<T>(T);
            #[injectable]
            impl<T> Foo<T> {
                #[inject]
                pub fn new(t: T, bar: crate::Bar) -> Self { todo!() }
            }
            "#,
        );
        let key = TypeData::from_str("crate::Foo<i32>").unwrap();
        let binding = decl.injection_binding(&key).unwrap();
        assert_eq!(binding.dependencies[0].key.readable(), "i32");
        assert_eq!(binding.dependencies[1].key.readable(), "crate::Bar");
        assert_eq!(binding.declaration, "#[inject] crate::Foo<i32>::new(i32, crate::Bar)");
        assert!(decl
            .injection_binding(&TypeData::from_str("crate::Foo").unwrap())
            .is_none());
    }

    #[test]
    fn module_bindings() {
        let decl = declarations(
            r#"
            pub struct M;
            #[module]
            impl M {
                #[provides]
                #[into_vec]
                pub fn a(&self) -> crate::Plugin { todo!() }
                #[provides]
                #[nullable]
                pub fn maybe() -> Option<crate::Foo> { None }
                #[binds_option_of]
                pub fn optional() -> Option<crate::Bar> {}
                #[multibinds]
                pub fn plugins() -> Vec<crate::Plugin> {}
            }
            "#,
        );
        let descriptor = decl
            .module_descriptor(&TypeData::from_str("crate::M").unwrap())
            .unwrap();
        assert!(descriptor.requires_instance);
        assert_eq!(descriptor.bindings.len(), 3);
        let a = &descriptor.bindings[0];
        assert_eq!(a.contribution, ContributionType::IntoVec);
        assert_eq!(a.key.identifier_suffix, "crate::M.a");
        assert_eq!(
            a.aggregate_key().unwrap().readable(),
            "std::vec::Vec<crate::Plugin>"
        );
        let maybe = &descriptor.bindings[1];
        assert_eq!(maybe.key.readable(), "crate::Foo");
        assert!(maybe.is_nullable());
        let optional = &descriptor.bindings[2];
        assert_eq!(
            optional.kind,
            BindingKind::Optional {
                target: TypeData::from_str("crate::Bar").unwrap()
            }
        );
        assert_eq!(descriptor.multibinds[0].0.readable(), "std::vec::Vec<crate::Plugin>");
    }

    #[test]
    fn trait_methods_walk_supertraits() {
        let decl = declarations(
            r#"
            pub trait Base {
                fn build(&mut self) -> std::sync::Arc<dyn crate::App>;
            }
            #[component_builder(crate::App)]
            pub trait AppBuilder: Base + Send {
                fn name(&mut self, #[bind_instance] name: String);
            }
            "#,
        );
        let builder = TypeData::from_str("crate::AppBuilder").unwrap();
        let methods = decl.abstract_methods(&builder);
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[1].declaring_trait.readable(), "crate::Base");
        assert!(decl.unknown_supertraits(&builder).is_empty());
    }
}
