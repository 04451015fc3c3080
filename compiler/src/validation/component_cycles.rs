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
use crate::model::declarations::Declarations;
use crate::options::{CompilerOptions, FeatureStatus};
use dirk_common::manifest::ComponentType;
use dirk_common::type_data::TypeData;
use std::collections::HashSet;

/// A component may not depend on itself through its `dependencies`.
pub(super) fn validate(decl: &Declarations, options: &CompilerOptions, diagnostics: &mut Diagnostics) {
    if options.validate_transitive_component_dependencies == FeatureStatus::Disabled {
        return;
    }
    for component in &decl.manifest().components {
        if component.component_type != ComponentType::Component
            || decl.is_erroneous(&component.type_data)
        {
            continue;
        }
        let mut path = vec![component.type_data.clone()];
        let mut visited = HashSet::new();
        if find_cycle(decl, &component.type_data, &mut path, &mut visited) {
            let lines: Vec<String> = path.iter().map(|t| format!("    {}", t.readable())).collect();
            diagnostics.error(
                DiagnosticKind::ComponentDependencyCycle,
                &component.location,
                &component.type_data.readable(),
                format!(
                    "{} contains a cycle in its component dependencies:\n{}",
                    component.type_data.readable(),
                    lines.join("\n")
                ),
            );
        }
    }
}

/// Extends `path` until it returns to `path[0]`.
fn find_cycle(
    decl: &Declarations,
    start: &TypeData,
    path: &mut Vec<TypeData>,
    visited: &mut HashSet<TypeData>,
) -> bool {
    let Some(current) = path.last().and_then(|t| decl.component(t)) else {
        return false;
    };
    for dependency in &current.dependencies {
        path.push(dependency.clone());
        if dependency == start {
            return true;
        }
        if visited.insert(dependency.clone()) && find_cycle(decl, start, path, visited) {
            return true;
        }
        path.pop();
    }
    false
}
