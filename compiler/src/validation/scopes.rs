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
use crate::graph::BindingGraph;
use crate::model::binding::Scope;
use crate::validation::listing;

pub(super) fn validate(graph: &BindingGraph, diagnostics: &mut Diagnostics) {
    for id in graph.preorder() {
        let node = graph.component(id);
        let mut incompatible = Vec::new();
        for resolved in node.owned.values() {
            for binding in &resolved.bindings {
                if let Some(scope @ Scope::Named(_)) = binding.scope.as_ref() {
                    if !node.has_scope(scope) {
                        incompatible.push(format!("{} {}", scope.readable(), binding.declaration));
                    }
                }
            }
        }
        if !incompatible.is_empty() {
            let named: Vec<String> = node
                .scopes
                .iter()
                .filter(|s| matches!(s, Scope::Named(_)))
                .map(|s| s.readable())
                .collect();
            let header = if named.is_empty() {
                format!("{} (unscoped) may not reference scoped bindings:", node.readable())
            } else {
                format!(
                    "{} scoped with {} may not reference bindings with different scopes:",
                    node.readable(),
                    named.join(" ")
                )
            };
            diagnostics.error(
                DiagnosticKind::IncompatiblyScopedBindings,
                node.location(),
                &node.readable(),
                format!("{}\n{}", header, listing(&incompatible, "    ")),
            );
        }

        let Some(parent) = node.parent else {
            continue;
        };
        for ancestor in graph.chain(parent) {
            let ancestor = graph.component(ancestor);
            for scope in node.scopes.iter().filter(|s| ancestor.has_scope(s)) {
                diagnostics.declaration_error(
                    node.location(),
                    &node.readable(),
                    format!(
                        "{} has conflicting scopes: {} also has {}",
                        node.readable(),
                        ancestor.readable(),
                        scope.readable()
                    ),
                );
            }
        }
    }
}
