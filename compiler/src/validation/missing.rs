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
use crate::validation::{listing, NodeId, RequestIndex, Requester};
use std::collections::{BTreeSet, VecDeque};

pub(super) fn validate(graph: &BindingGraph, index: &RequestIndex, diagnostics: &mut Diagnostics) {
    let root = graph.root();
    for id in graph.preorder() {
        for resolved in graph.component(id).owned.values() {
            if !resolved.is_missing() {
                continue;
            }
            let node: NodeId = (id, resolved.key.clone());
            diagnostics.error(
                DiagnosticKind::MissingBinding,
                root.location(),
                &root.readable(),
                message(graph, index, &node),
            );
        }
    }
}

/// Requests leading from an entry point to `node`, nearest first.
fn shortest_trace<'a>(index: &RequestIndex<'a>, node: &NodeId) -> Vec<Requester<'a>> {
    let mut visited = BTreeSet::new();
    visited.insert(node.clone());
    let mut queue: VecDeque<(NodeId, Vec<Requester<'a>>)> = VecDeque::new();
    queue.push_back((node.clone(), Vec::new()));
    let mut fallback = Vec::new();
    while let Some((current, path)) = queue.pop_front() {
        for requester in index.requesters(&current) {
            let mut next_path = path.clone();
            next_path.push(*requester);
            match requester.node() {
                None => return next_path,
                Some(next) => {
                    if visited.insert(next.clone()) {
                        if fallback.is_empty() {
                            fallback = next_path.clone();
                        }
                        queue.push_back((next, next_path));
                    }
                }
            }
        }
    }
    fallback
}

/// Every entry point that transitively requests `node`.
fn entry_points<'a>(index: &RequestIndex<'a>, node: &NodeId) -> Vec<Requester<'a>> {
    let mut result = Vec::new();
    let mut visited = BTreeSet::new();
    visited.insert(node.clone());
    let mut queue = VecDeque::new();
    queue.push_back(node.clone());
    while let Some(current) = queue.pop_front() {
        for requester in index.requesters(&current) {
            match requester.node() {
                None => result.push(*requester),
                Some(next) => {
                    if visited.insert(next.clone()) {
                        queue.push_back(next);
                    }
                }
            }
        }
    }
    result
}

fn message(graph: &BindingGraph, index: &RequestIndex, node: &NodeId) -> String {
    let key = &node.1;
    let mut lines = vec![format!(
        "{} cannot be provided without an #[inject] constructor or a #[provides]-annotated method.",
        key.readable()
    )];

    let trace = shortest_trace(index, node);
    let mut subject = key.readable();
    let mut steps = Vec::new();
    for requester in &trace {
        match requester {
            Requester::Binding { resolved, .. } => {
                steps.push(format!(
                    "{} is injected at\n        {}",
                    subject,
                    requester.site(graph)
                ));
                subject = resolved.key.readable();
            }
            Requester::EntryPoint { .. } => steps.push(format!(
                "{} is requested at\n        {}",
                subject,
                requester.site(graph)
            )),
        }
    }
    if !steps.is_empty() {
        lines.push(listing(&steps, "    "));
    }

    let mut other_sites: Vec<String> = Vec::new();
    let primary = trace.first().map(|r| r.site(graph));
    for requester in index.requesters(node) {
        let site = requester.site(graph);
        if Some(&site) != primary.as_ref() && !other_sites.contains(&site) {
            other_sites.push(site);
        }
    }
    if !other_sites.is_empty() {
        lines.push("It is also requested at:".to_owned());
        lines.push(listing(&other_sites, "    "));
    }

    let primary_entry_point = trace.last().map(|r| r.site(graph));
    let mut other_entry_points: Vec<String> = Vec::new();
    for requester in entry_points(index, node) {
        let site = requester.site(graph);
        if Some(&site) != primary_entry_point.as_ref() && !other_entry_points.contains(&site) {
            other_entry_points.push(site);
        }
    }
    if !other_entry_points.is_empty() {
        lines.push("The following other entry points also depend on it:".to_owned());
        lines.push(listing(&other_entry_points, "    "));
    }
    lines.join("\n")
}
