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
use crate::model::binding::Binding;
use crate::model::key::{DependencyRequest, RequestKind};
use crate::validation::NodeId;
use std::collections::{BTreeMap, BTreeSet};

/// `binding` of `from` requests the instance resolved at `to`.
struct Edge<'a> {
    from: NodeId,
    to: NodeId,
    binding: &'a Binding,
    request: &'a DependencyRequest,
}

/// Reports cycles made of instance requests. Provider and lazy requests break cycles.
pub(super) fn validate(graph: &BindingGraph, diagnostics: &mut Diagnostics) {
    let mut edges: BTreeMap<NodeId, Vec<Edge>> = BTreeMap::new();
    for id in graph.preorder() {
        let node = graph.component(id);
        for resolved in node.owned.values() {
            let Some(binding) = resolved.binding() else {
                continue;
            };
            for request in &binding.dependencies {
                if request.kind != RequestKind::Instance {
                    continue;
                }
                let Some(owner) = node.resolved_owner.get(&request.key) else {
                    continue;
                };
                edges
                    .entry((id, resolved.key.clone()))
                    .or_default()
                    .push(Edge {
                        from: (id, resolved.key.clone()),
                        to: (*owner, request.key.clone()),
                        binding,
                        request,
                    });
            }
        }
    }

    let mut state = BTreeMap::new();
    let mut cycles = Vec::new();
    for start in edges.keys() {
        if !state.contains_key(start) {
            visit(start, &edges, &mut state, &mut Vec::new(), &mut cycles);
        }
    }

    let root = graph.root();
    let mut reported = BTreeSet::new();
    for mut cycle in cycles {
        let first = (0..cycle.len())
            .min_by_key(|i| &cycle[*i].to)
            .unwrap_or(0);
        cycle.rotate_left(first);
        let nodes: Vec<NodeId> = cycle.iter().map(|e| e.to.clone()).collect();
        if !reported.insert(nodes) {
            continue;
        }
        let lines: Vec<String> = cycle
            .iter()
            .map(|edge| {
                format!(
                    "    {} is injected at\n        [{}] {}",
                    edge.to.1.readable(),
                    graph.component(edge.from.0).readable(),
                    edge.binding.request_site(edge.request)
                )
            })
            .collect();
        diagnostics.error(
            DiagnosticKind::DependencyCycle,
            root.location(),
            &root.readable(),
            format!("Found a dependency cycle:\n{}", lines.join("\n")),
        );
    }
}

/// Depth first search; `state` is `true` while a node is on the stack.
fn visit<'e>(
    node: &NodeId,
    edges: &'e BTreeMap<NodeId, Vec<Edge<'e>>>,
    state: &mut BTreeMap<NodeId, bool>,
    stack: &mut Vec<&'e Edge<'e>>,
    cycles: &mut Vec<Vec<&'e Edge<'e>>>,
) {
    state.insert(node.clone(), true);
    for edge in edges.get(node).into_iter().flatten() {
        match state.get(&edge.to) {
            Some(true) => {
                let start = stack
                    .iter()
                    .position(|e| e.from == edge.to)
                    .unwrap_or(stack.len());
                let mut cycle = stack[start..].to_vec();
                cycle.push(edge);
                cycles.push(cycle);
            }
            Some(false) => {}
            None => {
                stack.push(edge);
                visit(&edge.to, edges, state, stack, cycles);
                stack.pop();
            }
        }
    }
    state.insert(node.clone(), false);
}
