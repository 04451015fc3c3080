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
use crate::graph::{BindingGraph, ComponentNode};
use crate::model::binding::ContributionType;
use crate::model::key::{Key, HASH_MAP};
use crate::validation::listing;
use dirk_common::manifest::MultibindingMapKey;
use std::collections::BTreeMap;

pub(super) fn validate(graph: &BindingGraph, diagnostics: &mut Diagnostics) {
    let root = graph.root();
    for id in graph.preorder() {
        let node = graph.component(id);
        for resolved in node.owned.values() {
            if resolved.bindings.len() < 2 {
                continue;
            }
            let declarations: Vec<String> = resolved
                .bindings
                .iter()
                .map(|b| b.declaration.clone())
                .collect();
            diagnostics.error(
                DiagnosticKind::DuplicateBindings,
                root.location(),
                &root.readable(),
                bound_multiple_times(&resolved.key, &declarations),
            );
        }
        map_keys(node, diagnostics);
    }
}

pub(crate) fn bound_multiple_times(key: &Key, declarations: &[String]) -> String {
    format!(
        "{} is bound multiple times:\n{}",
        key.readable(),
        listing(declarations, "    ")
    )
}

/// Map contributions of one component must use distinct keys.
fn map_keys(node: &ComponentNode, diagnostics: &mut Diagnostics) {
    for (aggregate, contributions) in &node.contributions {
        if !aggregate.is_global(HASH_MAP) {
            continue;
        }
        let mut by_key: BTreeMap<&MultibindingMapKey, Vec<String>> = BTreeMap::new();
        for binding in contributions {
            if let ContributionType::IntoMap(ref map_key) = binding.contribution {
                by_key
                    .entry(map_key)
                    .or_default()
                    .push(binding.declaration.clone());
            }
        }
        for declarations in by_key.values().filter(|d| d.len() > 1) {
            diagnostics.error(
                DiagnosticKind::DuplicateBindings,
                node.location(),
                &node.readable(),
                format!(
                    "The same map key is bound more than once for {}:\n{}",
                    aggregate.readable(),
                    listing(declarations, "    ")
                ),
            );
        }
    }
}
