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

//! Local checks of single declarations. Problems found here never stop graph construction; the
//! offending declarations are marked so they do not cause follow-up errors.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::declarations::{Declarations, TraitMethod};
use crate::model::key::{self, DependencyRequest, RequestKind, ARC, HASH_MAP, OPTION, VEC};
use crate::options::CompilerOptions;
use dirk_common::manifest::{
    AssistedFactory, Binding, BindingType, Component, ComponentType, Creator, CreatorKind,
    Dependency, Injectable, ItemKind, Location, Module, MultibindingType, Receiver, Visibility,
};
use dirk_common::type_data::TypeData;
use std::collections::HashSet;

/// Reports malformed declarations and marks them in `decl`.
pub fn validate(decl: &mut Declarations, options: &CompilerOptions, diagnostics: &mut Diagnostics) {
    let erroneous = {
        let mut validator = ShapeValidator {
            decl,
            options,
            diagnostics,
            erroneous: Vec::new(),
        };
        let manifest = validator.decl.manifest();
        for injectable in &manifest.injectables {
            validator.injectable(injectable);
        }
        for module in &manifest.modules {
            validator.module(module);
        }
        for component in &manifest.components {
            validator.component(component);
        }
        for creator in &manifest.creators {
            validator.creator(creator);
        }
        for factory in &manifest.assisted_factories {
            validator.assisted_factory(factory);
        }
        validator.erroneous
    };
    for type_data in &erroneous {
        decl.mark_erroneous(type_data);
    }
}

struct ShapeValidator<'a> {
    decl: &'a Declarations,
    options: &'a CompilerOptions,
    diagnostics: &'a mut Diagnostics,
    erroneous: Vec<TypeData>,
}

fn assisted_readable(dependency: &Dependency) -> String {
    match dependency.assisted {
        Some(ref id) if !id.is_empty() => {
            format!("#[assisted(id: {:?})] {}", id, dependency.type_data.readable())
        }
        _ => dependency.type_data.readable(),
    }
}

fn creator_marker(creator: &Creator) -> &'static str {
    match (creator.creator_kind, creator.for_subcomponent) {
        (CreatorKind::Builder, false) => "#[component_builder]",
        (CreatorKind::Factory, false) => "#[component_factory]",
        (CreatorKind::Builder, true) => "#[subcomponent_builder]",
        (CreatorKind::Factory, true) => "#[subcomponent_factory]",
    }
}

fn binding_marker(binding: &Binding) -> &'static str {
    match binding.binding_type {
        BindingType::Provides => "#[provides]",
        BindingType::Binds => "#[binds]",
        BindingType::BindsOptionOf => "#[binds_option_of]",
        BindingType::Multibinds => "#[multibinds]",
    }
}

impl<'a> ShapeValidator<'a> {
    fn error(&mut self, location: &Location, element: &TypeData, message: String) {
        self.diagnostics
            .declaration_error(location, &element.readable(), message);
    }

    /// Reports an error and excludes `element` from graph diagnostics.
    fn fatal(&mut self, location: &Location, element: &TypeData, message: String) {
        self.error(location, element, message);
        self.erroneous.push(element.clone());
    }

    fn scopes(&mut self, location: &Location, element: &TypeData, scopes: &[TypeData]) {
        if scopes.len() > 1 {
            let listed: Vec<String> = scopes
                .iter()
                .map(|s| format!("#[scoped({})]", s.readable()))
                .collect();
            self.error(
                location,
                element,
                format!(
                    "A single binding may not declare more than one scope: {}",
                    listed.join(", ")
                ),
            );
        }
        for scope in scopes {
            if !self.decl.is_scope(scope) {
                self.error(
                    location,
                    element,
                    format!("{} is not a #[scope]", scope.readable()),
                );
            }
        }
    }

    fn qualifiers(&mut self, location: &Location, element: &TypeData, site: &str, qualifiers: &[TypeData]) {
        if qualifiers.len() > 1 {
            self.error(
                location,
                element,
                format!(
                    "A single dependency request may not use more than one #[qualified]: {}",
                    site
                ),
            );
        }
        for qualifier in qualifiers {
            if !self.decl.is_qualifier(qualifier) {
                self.error(
                    location,
                    element,
                    format!("{} is not a #[qualifier]", qualifier.readable()),
                );
            }
        }
    }

    /// Checks a request for `type_data` written at `site`.
    fn request(
        &mut self,
        location: &Location,
        element: &TypeData,
        site: &str,
        type_data: &TypeData,
        qualifiers: &[TypeData],
        nullable: bool,
    ) {
        self.qualifiers(location, element, site, qualifiers);
        if nullable && !type_data.is_global(OPTION) {
            self.error(
                location,
                element,
                format!(
                    "#[nullable] requests must have type std::option::Option<T>: {}",
                    site
                ),
            );
        }
        let request = DependencyRequest::new(type_data, qualifiers.first(), "", nullable, location);
        if request.kind == RequestKind::Producer {
            self.error(
                location,
                element,
                format!(
                    "{} may only be injected in production components, which dirk does not support: {}",
                    type_data.readable(),
                    site
                ),
            );
        }
    }

    fn dependencies(&mut self, element: &TypeData, site: &str, dependencies: &[Dependency]) {
        for dependency in dependencies {
            let site = format!("{}({})", site, dependency.name);
            self.request(
                &dependency.location,
                element,
                &site,
                &dependency.type_data,
                &dependency.qualifiers,
                dependency.nullable,
            );
        }
    }

    fn unknown_supertraits(&mut self, location: &Location, element: &TypeData) {
        for supertrait in self.decl.unknown_supertraits(element) {
            self.fatal(
                location,
                element,
                format!(
                    "{} extends {}, which is not a trait declared in this crate",
                    element.readable(),
                    supertrait.readable()
                ),
            );
        }
    }

    fn injectable(&mut self, injectable: &Injectable) {
        let element = &injectable.type_data;
        let location = &injectable.location;
        if injectable.kind == ItemKind::Trait {
            self.fatal(
                location,
                element,
                format!(
                    "#[inject] constructors cannot be declared on traits: {}",
                    element.readable()
                ),
            );
            return;
        }
        match injectable.constructors.len() {
            0 => self.fatal(
                location,
                element,
                format!(
                    "{} has no #[inject] or #[assisted_inject] constructor",
                    element.readable()
                ),
            ),
            1 => {}
            _ => {
                let listed: Vec<String> = injectable
                    .constructors
                    .iter()
                    .map(|c| format!("    {}::{}", element.readable(), c.name))
                    .collect();
                self.fatal(
                    location,
                    element,
                    format!(
                        "Types may only contain one injected constructor:\n{}",
                        listed.join("\n")
                    ),
                );
            }
        }
        self.scopes(location, element, &injectable.scopes);
        if !injectable.qualifiers.is_empty() {
            self.error(
                location,
                element,
                format!(
                    "#[qualified] is not allowed on #[injectable] types: {}",
                    element.readable()
                ),
            );
        }
        for constructor in &injectable.constructors {
            let site = format!("{}::{}", element.readable(), constructor.name);
            if constructor.visibility == Visibility::Private {
                if let Some(severity) = self.options.private_member_validation.severity() {
                    self.diagnostics.report(
                        DiagnosticKind::Declaration,
                        severity,
                        &constructor.location,
                        &element.readable(),
                        format!(
                            "Dirk does not support injection into private constructors: {}",
                            site
                        ),
                    );
                }
            }
            if constructor.fallible {
                self.fatal(
                    &constructor.location,
                    element,
                    format!(
                        "Dirk does not support fallible injected constructors: {} returns std::result::Result",
                        site
                    ),
                );
            }
            if constructor.assisted_inject {
                if !injectable.scopes.is_empty() {
                    self.error(
                        location,
                        element,
                        format!("#[assisted_inject] types cannot be scoped: {}", element.readable()),
                    );
                }
                let mut seen = HashSet::new();
                for dependency in constructor.dependencies.iter().filter(|d| d.assisted.is_some()) {
                    if !seen.insert((dependency.type_data.clone(), dependency.assisted.clone())) {
                        self.fatal(
                            &dependency.location,
                            element,
                            format!(
                                "#[assisted_inject] constructor has duplicate #[assisted] type: {}",
                                assisted_readable(dependency)
                            ),
                        );
                    }
                }
            } else {
                for dependency in constructor.dependencies.iter().filter(|d| d.assisted.is_some()) {
                    self.error(
                        &dependency.location,
                        element,
                        format!(
                            "#[assisted] parameters can only be used within an #[assisted_inject] constructor: {}({})",
                            site, dependency.name
                        ),
                    );
                }
            }
            let requests: Vec<Dependency> = constructor
                .dependencies
                .iter()
                .filter(|d| d.assisted.is_none())
                .cloned()
                .collect();
            self.dependencies(element, &site, &requests);
        }
    }

    fn module(&mut self, module: &Module) {
        let element = &module.type_data;
        let location = &module.location;
        if module.kind == ItemKind::Trait {
            self.fatal(
                location,
                element,
                format!(
                    "#[module] must be placed on an impl block, not a trait: {}",
                    element.readable()
                ),
            );
            return;
        }
        for include in &module.includes {
            if self.decl.module(include).is_none() {
                self.error(
                    location,
                    element,
                    format!(
                        "{} is listed in the includes of {} but is not a #[module]",
                        include.readable(),
                        element.readable()
                    ),
                );
            }
        }
        for subcomponent in &module.subcomponents {
            match self.decl.component(subcomponent) {
                Some(c) if c.component_type == ComponentType::Subcomponent => {
                    if self.decl.creators_for(subcomponent).is_empty() {
                        self.error(
                            location,
                            element,
                            format!(
                                "{} is listed in the subcomponents of {} but has no #[subcomponent_builder] or #[subcomponent_factory]",
                                subcomponent.readable(),
                                element.readable()
                            ),
                        );
                    }
                }
                _ => self.error(
                    location,
                    element,
                    format!(
                        "{} is listed in the subcomponents of {} but is not a #[subcomponent]",
                        subcomponent.readable(),
                        element.readable()
                    ),
                ),
            }
        }
        for binding in &module.bindings {
            self.module_binding(module, binding);
        }
    }

    fn module_binding(&mut self, module: &Module, binding: &Binding) {
        let element = &module.type_data;
        let location = &binding.location;
        let marker = binding_marker(binding);
        let site = format!("{}::{}", element.readable(), binding.name);
        let mut malformed = Vec::new();
        if !binding.type_params.is_empty() {
            malformed.push(format!("{} methods may not have type parameters: {}", marker, site));
        }
        if !matches!(binding.receiver, Receiver::None | Receiver::Ref) {
            malformed.push(format!(
                "#[module] methods may take &self but not {}: {}",
                binding.receiver.readable(),
                site
            ));
        }
        if binding.nullable && binding.multibinding_type != MultibindingType::None {
            malformed.push(format!("#[nullable] cannot be used with multibindings: {}", site));
        }
        let return_type = &binding.type_data;
        match binding.binding_type {
            BindingType::Provides => {
                if return_type.is_unit() {
                    malformed.push(format!("#[provides] methods must return a value: {}", site));
                }
                if binding.nullable && !return_type.is_global(OPTION) {
                    malformed.push(format!(
                        "#[nullable] #[provides] methods must return std::option::Option<T>: {}",
                        site
                    ));
                }
                if binding.visibility == Visibility::Private {
                    if let Some(severity) = self.options.private_member_validation.severity() {
                        self.diagnostics.report(
                            DiagnosticKind::Declaration,
                            severity,
                            location,
                            &element.readable(),
                            format!("Dirk does not support private #[provides] methods: {}", site),
                        );
                    }
                }
            }
            BindingType::Binds => {
                if binding.dependencies.len() != 1 {
                    malformed.push(format!(
                        "#[binds] methods must have exactly one parameter: {}",
                        site
                    ));
                }
                if binding.receiver != Receiver::None {
                    malformed.push(format!("#[binds] methods must not take self: {}", site));
                }
                if binding.has_body {
                    malformed.push(format!("#[binds] methods must not have a body: {}", site));
                }
            }
            BindingType::BindsOptionOf => {
                if !binding.dependencies.is_empty() {
                    malformed.push(format!(
                        "#[binds_option_of] methods must not have parameters: {}",
                        site
                    ));
                }
                if !return_type.is_global(OPTION) || return_type.args.len() != 1 {
                    malformed.push(format!(
                        "#[binds_option_of] methods must return std::option::Option<T>: {}",
                        site
                    ));
                }
                if binding.multibinding_type != MultibindingType::None {
                    malformed.push(format!(
                        "#[binds_option_of] methods cannot contribute to multibindings: {}",
                        site
                    ));
                }
            }
            BindingType::Multibinds => {
                if !binding.dependencies.is_empty() {
                    malformed.push(format!(
                        "#[multibinds] methods must not have parameters: {}",
                        site
                    ));
                }
                if !return_type.is_global(VEC) && !return_type.is_global(HASH_MAP) {
                    malformed.push(format!(
                        "#[multibinds] methods must return std::vec::Vec<T> or std::collections::HashMap<K, V>: {}",
                        site
                    ));
                }
                if binding.multibinding_type != MultibindingType::None {
                    malformed.push(format!(
                        "#[multibinds] methods cannot contribute to multibindings: {}",
                        site
                    ));
                }
                if !binding.scopes.is_empty() {
                    malformed.push(format!("#[multibinds] methods cannot be scoped: {}", site));
                }
            }
        }
        match binding.multibinding_type {
            MultibindingType::ElementsIntoVec if !return_type.is_global(VEC) => {
                malformed.push(format!(
                    "#[elements_into_vec] methods must return std::vec::Vec<T>: {}",
                    site
                ));
            }
            MultibindingType::IntoMap if binding.map_keys.len() != 1 => {
                malformed.push(format!(
                    "#[into_map] methods must have exactly one map key: {}",
                    site
                ));
            }
            _ => {}
        }
        let produced = if binding.nullable && return_type.is_global(OPTION) && !return_type.args.is_empty() {
            return_type.args[0].clone()
        } else {
            return_type.clone()
        };
        for message in malformed {
            self.error(location, element, message);
            self.erroneous.push(produced.clone());
        }
        self.scopes(location, element, &binding.scopes);
        self.qualifiers(location, element, &site, &binding.qualifiers);
        self.dependencies(element, &site, &binding.dependencies);
    }

    fn component(&mut self, component: &Component) {
        let element = &component.type_data;
        let location = &component.location;
        let marker = match component.component_type {
            ComponentType::Component => "#[component]",
            ComponentType::Subcomponent => "#[subcomponent]",
        };
        if component.kind != ItemKind::Trait {
            self.fatal(
                location,
                element,
                format!("{} must be placed on a trait: {}", marker, element.readable()),
            );
            return;
        }
        if !component.type_params.is_empty() {
            self.fatal(
                location,
                element,
                format!("Components may not have type parameters: {}", element.readable()),
            );
        }
        for module in &component.modules {
            if self.decl.module(module).is_none() {
                self.fatal(
                    location,
                    element,
                    format!(
                        "{} is listed as a module of {} but is not a #[module]",
                        module.readable(),
                        element.readable()
                    ),
                );
            }
        }
        for dependency in &component.dependencies {
            if self.decl.trait_location(dependency).is_none() {
                self.fatal(
                    location,
                    element,
                    format!(
                        "{} is listed as a dependency of {} but is not a trait declared in this crate",
                        dependency.readable(),
                        element.readable()
                    ),
                );
            }
        }
        self.unknown_supertraits(location, element);
        for scope in &component.scopes {
            if !self.decl.is_scope(scope) {
                self.error(
                    location,
                    element,
                    format!("{} is not a #[scope]", scope.readable()),
                );
            }
        }
        let creators = self.decl.creators_for(element);
        if creators.len() > 1 {
            let listed: Vec<String> = creators
                .iter()
                .map(|c| format!("    {}", c.type_data.readable()))
                .collect();
            self.fatal(
                location,
                element,
                format!(
                    "{} has more than one creator:\n{}",
                    element.readable(),
                    listed.join("\n")
                ),
            );
        }
        for trait_method in self.decl.abstract_methods(element) {
            let method = &trait_method.method;
            let site = format!("{}::{}()", trait_method.declaring_trait.readable(), method.name);
            let invalid = format!(
                "{}::{} is not a valid provision method or subcomponent factory method. Dirk cannot implement this method",
                trait_method.declaring_trait.readable(),
                method.name
            );
            if !method.type_params.is_empty() {
                self.fatal(
                    &method.location,
                    element,
                    format!("Component methods may not have type parameters: {}", site),
                );
                continue;
            }
            if method.receiver != Receiver::Ref {
                self.fatal(
                    &method.location,
                    element,
                    format!("Component methods must take &self: {}", site),
                );
                continue;
            }
            let Some(ref return_type) = method.return_type else {
                self.fatal(&method.location, element, invalid);
                continue;
            };
            if return_type.is_unit() {
                self.fatal(&method.location, element, invalid);
                continue;
            }
            let child_factory = key::dyn_target(return_type, ARC)
                .and_then(|t| self.decl.component(&t))
                .map(|c| c.component_type == ComponentType::Subcomponent)
                .unwrap_or(false);
            if !method.parameters.is_empty() && !child_factory {
                self.fatal(&method.location, element, invalid);
                continue;
            }
            if !child_factory {
                self.request(
                    &method.location,
                    element,
                    &site,
                    return_type,
                    &method.qualifiers,
                    method.nullable,
                );
            }
        }
    }

    fn creator(&mut self, creator: &Creator) {
        let element = &creator.type_data;
        let location = &creator.location;
        let marker = creator_marker(creator);
        if creator.kind != ItemKind::Trait {
            self.fatal(
                location,
                element,
                format!("{} must be placed on a trait: {}", marker, element.readable()),
            );
            return;
        }
        if !creator.type_params.is_empty() {
            self.fatal(
                location,
                element,
                format!("Creators may not have type parameters: {}", element.readable()),
            );
        }
        let expected_type = if creator.for_subcomponent {
            ComponentType::Subcomponent
        } else {
            ComponentType::Component
        };
        match self.decl.component(&creator.component) {
            Some(c) if c.component_type == expected_type => {}
            _ => {
                let expected = match expected_type {
                    ComponentType::Component => "#[component]",
                    ComponentType::Subcomponent => "#[subcomponent]",
                };
                self.fatal(
                    location,
                    element,
                    format!(
                        "{} target {} is not a {}",
                        marker,
                        creator.component.readable(),
                        expected
                    ),
                );
                self.erroneous.push(creator.component.clone());
                return;
            }
        }
        self.unknown_supertraits(location, element);
        let handle = key::arc_dyn(&creator.component);
        let methods = self.decl.abstract_methods(element);
        for trait_method in &methods {
            let method = &trait_method.method;
            let site = format!("{}::{}", trait_method.declaring_trait.readable(), method.name);
            if !method.type_params.is_empty() {
                self.fatal(
                    &method.location,
                    element,
                    format!("Creator methods may not have type parameters: {}", site),
                );
            }
            for parameter in &method.parameters {
                if parameter.bind_instance {
                    self.request(
                        &parameter.location,
                        element,
                        &format!("{}({})", site, parameter.name),
                        &parameter.type_data,
                        &parameter.qualifiers,
                        parameter.nullable,
                    );
                }
            }
        }
        let returns_component = |m: &&TraitMethod| {
            m.method
                .return_type
                .as_ref()
                .and_then(|t| key::dyn_target(t, ARC))
                .as_ref()
                == Some(&creator.component)
        };
        match creator.creator_kind {
            CreatorKind::Builder => {
                let build_methods: Vec<_> =
                    methods.iter().filter(|m| m.method.parameters.is_empty()).collect();
                match build_methods.len() {
                    0 => self.fatal(
                        location,
                        element,
                        format!(
                            "{} is missing a build method without parameters returning {}",
                            element.readable(),
                            handle.readable()
                        ),
                    ),
                    1 => {
                        let build = build_methods[0];
                        if !returns_component(&build) {
                            self.fatal(
                                &build.method.location,
                                element,
                                format!(
                                    "{}::{} must return {}",
                                    build.declaring_trait.readable(),
                                    build.method.name,
                                    handle.readable()
                                ),
                            );
                        }
                        if !matches!(build.method.receiver, Receiver::RefMut | Receiver::Boxed) {
                            self.fatal(
                                &build.method.location,
                                element,
                                format!(
                                    "Builder methods must take &mut self or self: Box<Self>: {}::{}",
                                    build.declaring_trait.readable(),
                                    build.method.name
                                ),
                            );
                        }
                    }
                    _ => {
                        let listed: Vec<String> = build_methods
                            .iter()
                            .map(|m| format!("    {}::{}", m.declaring_trait.readable(), m.method.name))
                            .collect();
                        self.fatal(
                            location,
                            element,
                            format!(
                                "{} must have exactly one build method without parameters, found:\n{}",
                                element.readable(),
                                listed.join("\n")
                            ),
                        );
                    }
                }
                for setter in methods.iter().filter(|m| !m.method.parameters.is_empty()) {
                    let site = format!("{}::{}", setter.declaring_trait.readable(), setter.method.name);
                    if setter.method.parameters.len() > 1 {
                        self.fatal(
                            &setter.method.location,
                            element,
                            format!("Builder setter methods must take exactly one parameter: {}", site),
                        );
                    }
                    if setter.method.return_type.as_ref().map(|t| !t.is_unit()).unwrap_or(false) {
                        self.fatal(
                            &setter.method.location,
                            element,
                            format!("Builder setter methods must return (): {}", site),
                        );
                    }
                    if setter.method.receiver != Receiver::RefMut {
                        self.fatal(
                            &setter.method.location,
                            element,
                            format!("Builder setter methods must take &mut self: {}", site),
                        );
                    }
                }
            }
            CreatorKind::Factory => match methods.len() {
                0 => self.fatal(
                    location,
                    element,
                    format!(
                        "{} is missing a factory method returning {}",
                        element.readable(),
                        handle.readable()
                    ),
                ),
                1 => {
                    let factory_method = &methods[0];
                    if !returns_component(&factory_method) {
                        self.fatal(
                            &factory_method.method.location,
                            element,
                            format!(
                                "{}::{} must return {}",
                                factory_method.declaring_trait.readable(),
                                factory_method.method.name,
                                handle.readable()
                            ),
                        );
                    }
                    if !matches!(factory_method.method.receiver, Receiver::RefMut | Receiver::Boxed) {
                        self.fatal(
                            &factory_method.method.location,
                            element,
                            format!(
                                "Factory methods must take &mut self or self: Box<Self>: {}::{}",
                                factory_method.declaring_trait.readable(),
                                factory_method.method.name
                            ),
                        );
                    }
                }
                _ => {
                    let listed: Vec<String> = methods
                        .iter()
                        .map(|m| format!("    {}::{}", m.declaring_trait.readable(), m.method.name))
                        .collect();
                    self.fatal(
                        location,
                        element,
                        format!(
                            "{} must have exactly one method, found:\n{}",
                            element.readable(),
                            listed.join("\n")
                        ),
                    );
                }
            },
        }
    }

    fn assisted_factory(&mut self, factory: &AssistedFactory) {
        let element = &factory.type_data;
        let location = &factory.location;
        if factory.kind != ItemKind::Trait {
            self.fatal(
                location,
                element,
                format!(
                    "#[assisted_factory] must be placed on a trait: {}",
                    element.readable()
                ),
            );
            return;
        }
        if !factory.type_params.is_empty() {
            self.fatal(
                location,
                element,
                format!(
                    "#[assisted_factory] types may not have type parameters: {}",
                    element.readable()
                ),
            );
        }
        self.unknown_supertraits(location, element);
        let methods = self.decl.abstract_methods(element);
        if methods.is_empty() {
            self.fatal(
                location,
                element,
                format!(
                    "The #[assisted_factory]-annotated type is missing a method whose return type matches the #[assisted_inject] type: {}",
                    element.readable()
                ),
            );
            return;
        }
        if methods.len() > 1 {
            let listed: Vec<String> = methods
                .iter()
                .map(|m| format!("    {}::{}", m.declaring_trait.readable(), m.method.name))
                .collect();
            self.fatal(
                location,
                element,
                format!(
                    "The #[assisted_factory]-annotated type should contain a single method but found multiple:\n{}",
                    listed.join("\n")
                ),
            );
            return;
        }
        let factory_method = &methods[0];
        let method = &factory_method.method;
        let site = format!("{}::{}", factory_method.declaring_trait.readable(), method.name);
        if !method.type_params.is_empty() {
            self.fatal(
                &method.location,
                element,
                format!(
                    "#[assisted_factory] does not support type parameters in methods: {}",
                    site
                ),
            );
            return;
        }
        if method.receiver != Receiver::Ref {
            self.fatal(
                &method.location,
                element,
                format!("#[assisted_factory] methods must take &self: {}", site),
            );
        }
        let constructor = method
            .return_type
            .as_ref()
            .and_then(|t| self.decl.injectable(t))
            .and_then(|i| self.decl.injected_constructor(i))
            .filter(|c| c.assisted_inject);
        let Some(constructor) = constructor else {
            let return_type = method
                .return_type
                .as_ref()
                .map(|t| t.readable())
                .unwrap_or_else(|| "()".to_owned());
            self.fatal(
                &method.location,
                element,
                format!(
                    "Invalid return type: {}. An #[assisted_factory] method must return a type with an #[assisted_inject] constructor.",
                    return_type
                ),
            );
            return;
        };
        let mut seen = HashSet::new();
        for parameter in &method.parameters {
            let id = parameter.assisted.clone().unwrap_or_default();
            if !seen.insert((parameter.type_data.clone(), id)) {
                self.fatal(
                    &parameter.location,
                    element,
                    format!(
                        "#[assisted_factory] method has duplicate #[assisted] types: {}",
                        assisted_readable(parameter)
                    ),
                );
                return;
            }
        }
        let target = method.return_type.clone().unwrap_or_default();
        let params = self
            .decl
            .injectable(&target)
            .map(|i| i.type_params.clone())
            .unwrap_or_default();
        let expected: Vec<Dependency> = constructor
            .dependencies
            .iter()
            .filter(|d| d.assisted.is_some())
            .map(|d| {
                let mut d = d.clone();
                d.type_data = d.type_data.substitute(&params, &target.args);
                d
            })
            .collect();
        let signature = |parameters: &[Dependency]| {
            let mut sorted: Vec<(String, String)> = parameters
                .iter()
                .map(|p| (p.type_data.identifier_string(), p.assisted.clone().unwrap_or_default()))
                .collect();
            sorted.sort();
            sorted
        };
        if signature(&method.parameters) != signature(&expected) {
            let readable = |parameters: &[Dependency]| {
                parameters
                    .iter()
                    .map(assisted_readable)
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            self.fatal(
                &method.location,
                element,
                format!(
                    "The parameters in the factory method must match the #[assisted] parameters in {}.\n    Actual: {}({})\n    Expected: {}({})",
                    target.readable(),
                    site,
                    readable(&method.parameters),
                    site,
                    readable(&expected)
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirk_common::manifest_parser::parse_source;

    fn messages(src: &str) -> Vec<String> {
        let mut decl = Declarations::new(parse_source("lib.rs", src, false).unwrap());
        let mut diagnostics = Diagnostics::new();
        validate(&mut decl, &CompilerOptions::default(), &mut diagnostics);
        diagnostics.into_sorted().iter().map(|d| d.text()).collect()
    }

    #[test]
    fn multiple_injected_constructors() {
        let messages = messages(
            r#"
            pub struct Foo;
            #[injectable]
            impl Foo {
                #[inject]
                pub fn a() -> Self { Foo }
                #[inject]
                pub fn b() -> Self { Foo }
            }
            "#,
        );
        assert_eq!(
            messages,
            vec!["Types may only contain one injected constructor:\n    crate::Foo::a\n    crate::Foo::b"]
        );
    }

    #[test]
    fn private_and_fallible_constructors() {
        let messages = messages(
            r#"
            pub struct Foo;
            #[injectable]
            impl Foo {
                #[inject]
                fn new() -> Result<Self, String> { Ok(Foo) }
            }
            "#,
        );
        assert!(messages.contains(
            &"Dirk does not support injection into private constructors: crate::Foo::new".to_owned()
        ));
        assert!(messages.iter().any(|m| m.starts_with("Dirk does not support fallible")));
    }

    #[test]
    fn builder_shapes() {
        let messages = messages(
            r#"
            #[component]
            pub trait App {}
            #[component_builder(crate::App)]
            pub trait AppBuilder {
                fn a(&mut self, a: i32, b: i32);
                fn build(&self) -> std::sync::Arc<dyn crate::App>;
            }
            "#,
        );
        assert!(messages.contains(
            &"Builder methods must take &mut self or self: Box<Self>: crate::AppBuilder::build".to_owned()
        ));
        assert!(messages.contains(
            &"Builder setter methods must take exactly one parameter: crate::AppBuilder::a".to_owned()
        ));
    }

    fn component_factory(receiver: &str) -> String {
        format!(
            r#"
            #[component]
            pub trait App {{}}
            #[component_factory(crate::App)]
            pub trait AppFactory {{
                fn create({}, #[bind_instance] name: String) -> std::sync::Arc<dyn crate::App>;
            }}
            "#,
            receiver
        )
    }

    #[test]
    fn factory_method_receivers() {
        assert_eq!(
            messages(&component_factory("&self")),
            vec!["Factory methods must take &mut self or self: Box<Self>: crate::AppFactory::create"]
        );
        assert!(messages(&component_factory("&mut self")).is_empty());
        assert!(messages(&component_factory("self: Box<Self>")).is_empty());
    }

    #[test]
    fn assisted_factory_parameter_mismatch() {
        let messages = messages(
            r#"
            pub struct Foo;
            #[injectable]
            impl Foo {
                #[assisted_inject]
                pub fn new(#[assisted] name: String, #[assisted] count: i32) -> Self { Foo }
            }
            #[assisted_factory]
            pub trait FooFactory {
                fn create(&self, name: String) -> crate::Foo;
            }
            "#,
        );
        assert_eq!(
            messages,
            vec!["The parameters in the factory method must match the #[assisted] parameters in crate::Foo.\n    Actual: crate::FooFactory::create(std::string::String)\n    Expected: crate::FooFactory::create(std::string::String, i32)"]
        );
    }

    #[test]
    fn binds_shape() {
        let messages = messages(
            r#"
            pub struct M;
            #[module]
            impl M {
                #[binds]
                pub fn bind(a: crate::A, b: crate::B) -> crate::C {}
            }
            "#,
        );
        assert_eq!(
            messages,
            vec!["#[binds] methods must have exactly one parameter: crate::M::bind"]
        );
    }
}
