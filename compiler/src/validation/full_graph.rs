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

//! Duplicate checks for modules and components on their own, regardless of what is used.

use crate::diagnostics::{DiagnosticKind, Diagnostics, Severity};
use crate::graph::module_closure;
use crate::model::binding::{Binding, BindingKind};
use crate::model::declarations::Declarations;
use crate::model::key::Key;
use crate::options::CompilerOptions;
use crate::validation::duplicates::bound_multiple_times;
use dirk_common::manifest::Location;
use std::collections::BTreeMap;

pub(super) fn validate(decl: &Declarations, options: &CompilerOptions, diagnostics: &mut Diagnostics) {
    let Some(severity) = options.full_binding_graph_validation.severity() else {
        return;
    };
    let manifest = decl.manifest();
    for module in &manifest.modules {
        if !module.type_params.is_empty() || decl.is_erroneous(&module.type_data) {
            continue;
        }
        let bindings = module_closure(decl, &[module.type_data.clone()])
            .into_iter()
            .flat_map(|d| d.bindings);
        report(
            bindings,
            &module.location,
            &module.type_data.readable(),
            severity,
            diagnostics,
        );
    }
    for component in &manifest.components {
        if decl.is_erroneous(&component.type_data) {
            continue;
        }
        let mut bindings: Vec<Binding> = module_closure(decl, &component.modules)
            .into_iter()
            .flat_map(|d| d.bindings)
            .collect();
        for dependency in &component.dependencies {
            bindings.extend(decl.dependency_bindings(dependency));
        }
        report(
            bindings.into_iter(),
            &component.location,
            &component.type_data.readable(),
            severity,
            diagnostics,
        );
    }
}

fn report(
    bindings: impl Iterator<Item = Binding>,
    location: &Location,
    element: &str,
    severity: Severity,
    diagnostics: &mut Diagnostics,
) {
    let mut by_key: BTreeMap<Key, Vec<Binding>> = BTreeMap::new();
    for binding in bindings.filter(|b| !b.is_contribution()) {
        by_key.entry(binding.key.clone()).or_default().push(binding);
    }
    for (key, bindings) in by_key {
        let optional_only = bindings
            .iter()
            .all(|b| matches!(b.kind, BindingKind::Optional { .. }));
        if bindings.len() < 2 || optional_only {
            continue;
        }
        let declarations: Vec<String> = bindings.iter().map(|b| b.declaration.clone()).collect();
        diagnostics.report(
            DiagnosticKind::DuplicateBindings,
            severity,
            location,
            element,
            bound_multiple_times(&key, &declarations),
        );
    }
}
