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

//! Creator inputs must match the modules and dependencies a component needs.

use crate::diagnostics::Diagnostics;
use crate::graph::{BindingGraph, ChildSource, ComponentNode};
use crate::model::declarations::Declarations;
use crate::model::key::{self, ARC};
use dirk_common::manifest::{CreatorKind, Dependency, Location};
use dirk_common::type_data::TypeData;
use std::collections::BTreeMap;

/// A module or dependency handed to a component.
struct Input {
    type_data: TypeData,
    site: String,
}

pub(super) fn validate(graph: &BindingGraph, decl: &Declarations, diagnostics: &mut Diagnostics) {
    for id in graph.preorder() {
        let node = graph.component(id);
        if let Some(ChildSource::FactoryMethod(ref method)) = node.source {
            let owner = format!(
                "{}::{}",
                graph
                    .component(node.parent.unwrap_or_default())
                    .readable(),
                method.name
            );
            let inputs = inputs(&owner, &method.parameters);
            check(node, &owner, "parameters", &method.location, inputs, diagnostics);
            continue;
        }
        let Some(ref creator) = node.creator else {
            continue;
        };
        if decl.is_erroneous(&creator.type_data) {
            continue;
        }
        let methods = decl.abstract_methods(&creator.type_data);
        let mut all_inputs = Vec::new();
        let noun = match creator.creator_kind {
            CreatorKind::Builder => {
                for setter in methods.iter().filter(|m| m.method.parameters.len() == 1) {
                    let site = format!(
                        "{}::{}",
                        setter.declaring_trait.readable(),
                        setter.method.name
                    );
                    all_inputs.extend(inputs(&site, &setter.method.parameters));
                }
                "setters"
            }
            CreatorKind::Factory => {
                if let [factory_method] = methods.as_slice() {
                    let site = format!(
                        "{}::{}",
                        factory_method.declaring_trait.readable(),
                        factory_method.method.name
                    );
                    all_inputs.extend(inputs(&site, &factory_method.method.parameters));
                }
                "parameters"
            }
        };
        check(
            node,
            &creator.type_data.readable(),
            noun,
            &creator.location,
            all_inputs,
            diagnostics,
        );
    }
}

fn inputs(site: &str, parameters: &[Dependency]) -> Vec<Input> {
    parameters
        .iter()
        .filter(|p| !p.bind_instance)
        .map(|p| Input {
            type_data: p.type_data.clone(),
            site: format!("{}({})", site, p.type_data.readable()),
        })
        .collect()
}

/// Module or dependency `type_data` stands for, if the component has one.
fn requirement(node: &ComponentNode, type_data: &TypeData) -> Option<TypeData> {
    if node.modules.iter().any(|m| &m.type_data == type_data) {
        return Some(type_data.clone());
    }
    key::dyn_target(type_data, ARC).filter(|t| node.dependencies.contains(t))
}

fn check(
    node: &ComponentNode,
    owner: &str,
    noun: &str,
    location: &Location,
    inputs: Vec<Input>,
    diagnostics: &mut Diagnostics,
) {
    let mut provided: BTreeMap<TypeData, Vec<String>> = BTreeMap::new();
    let mut extra = Vec::new();
    for input in inputs {
        match requirement(node, &input.type_data) {
            Some(requirement) => provided.entry(requirement).or_default().push(input.site),
            None => extra.push(input.site),
        }
    }

    let required = node.dependencies.iter().cloned().chain(
        node.modules
            .iter()
            .filter(|m| m.requires_instance && !m.default_constructible)
            .map(|m| m.type_data.clone()),
    );
    let missing: Vec<String> = required
        .filter(|r| !provided.contains_key(r))
        .map(|r| r.readable())
        .collect();
    if !missing.is_empty() {
        diagnostics.declaration_error(
            location,
            owner,
            format!(
                "{} is missing {} for required modules or dependencies: [{}]",
                owner,
                noun,
                missing.join(", ")
            ),
        );
    }
    if !extra.is_empty() {
        diagnostics.declaration_error(
            location,
            owner,
            format!(
                "{} has {} for modules or dependencies that aren't required: [{}]",
                owner,
                noun,
                extra.join(", ")
            ),
        );
    }
    for (requirement, sites) in provided.iter().filter(|(_, s)| s.len() > 1) {
        diagnostics.declaration_error(
            location,
            owner,
            format!(
                "{} has multiple {} for {}: [{}]",
                owner,
                noun,
                requirement.readable(),
                sites.join(", ")
            ),
        );
    }
}
