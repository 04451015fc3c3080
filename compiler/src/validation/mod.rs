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

//! Validator: graph level checks run after every root component's graph is built.

mod assisted;
mod component_cycles;
mod creators;
mod cycles;
mod duplicates;
mod full_graph;
mod missing;
mod nullable;
mod scopes;

use crate::diagnostics::{truncated_lines, Diagnostics};
use crate::graph::{BindingGraph, ComponentId, EntryPoint, EntryPointKind, ResolvedBindings};
use crate::model::binding::Binding;
use crate::model::declarations::Declarations;
use crate::model::key::{DependencyRequest, Key};
use crate::options::CompilerOptions;
use std::collections::BTreeMap;
use tracing::debug;

/// Checks that only need the declarations.
pub fn validate_declarations(
    decl: &Declarations,
    options: &CompilerOptions,
    diagnostics: &mut Diagnostics,
) {
    component_cycles::validate(decl, options, diagnostics);
    full_graph::validate(decl, options, diagnostics);
}

/// Checks the resolved graph of one root component.
pub fn validate_graph(
    graph: &BindingGraph,
    decl: &Declarations,
    options: &CompilerOptions,
    diagnostics: &mut Diagnostics,
) {
    let before = diagnostics.error_count();
    let index = RequestIndex::new(graph);
    missing::validate(graph, &index, diagnostics);
    duplicates::validate(graph, diagnostics);
    cycles::validate(graph, diagnostics);
    scopes::validate(graph, diagnostics);
    creators::validate(graph, decl, diagnostics);
    assisted::validate(graph, &index, diagnostics);
    nullable::validate(graph, &index, options, diagnostics);
    debug!(
        "validated {}: {} new error(s)",
        graph.root().readable(),
        diagnostics.error_count() - before
    );
}

/// A resolution in the graph: the owning component and the key.
pub(crate) type NodeId = (ComponentId, Key);

/// Something that requests a key.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Requester<'a> {
    Binding {
        component: ComponentId,
        resolved: &'a ResolvedBindings,
        binding: &'a Binding,
        request: &'a DependencyRequest,
    },
    EntryPoint {
        component: ComponentId,
        entry_point: &'a EntryPoint,
        request: &'a DependencyRequest,
    },
}

impl<'a> Requester<'a> {
    pub fn component(&self) -> ComponentId {
        match self {
            Requester::Binding { component, .. } | Requester::EntryPoint { component, .. } => {
                *component
            }
        }
    }

    pub fn request(&self) -> &'a DependencyRequest {
        match self {
            Requester::Binding { request, .. } | Requester::EntryPoint { request, .. } => *request,
        }
    }

    /// `[crate::App] crate::Foo::new(bar)`.
    pub fn site(&self, graph: &BindingGraph) -> String {
        let component = graph.component(self.component()).readable();
        match self {
            Requester::Binding {
                binding, request, ..
            } => format!("[{}] {}", component, binding.request_site(request)),
            Requester::EntryPoint { entry_point, .. } => {
                format!("[{}] {}", component, entry_point.readable())
            }
        }
    }

    /// The resolution that issued the request, for binding requests.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Requester::Binding {
                component,
                resolved,
                ..
            } => Some((*component, resolved.key.clone())),
            Requester::EntryPoint { .. } => None,
        }
    }
}

/// Reverse edges of the graph.
pub(crate) struct RequestIndex<'a> {
    requesters: BTreeMap<NodeId, Vec<Requester<'a>>>,
}

impl<'a> RequestIndex<'a> {
    pub fn new(graph: &'a BindingGraph) -> Self {
        let mut requesters: BTreeMap<NodeId, Vec<Requester<'a>>> = BTreeMap::new();
        for id in graph.preorder() {
            let node = graph.component(id);
            for entry_point in &node.entry_points {
                if let EntryPointKind::Provision(ref request) = entry_point.kind {
                    if let Some(owner) = node.resolved_owner.get(&request.key) {
                        requesters
                            .entry((*owner, request.key.clone()))
                            .or_default()
                            .push(Requester::EntryPoint {
                                component: id,
                                entry_point,
                                request,
                            });
                    }
                }
            }
            for resolved in node.owned.values() {
                for binding in &resolved.bindings {
                    for request in &binding.dependencies {
                        if let Some(owner) = node.resolved_owner.get(&request.key) {
                            requesters
                                .entry((*owner, request.key.clone()))
                                .or_default()
                                .push(Requester::Binding {
                                    component: id,
                                    resolved,
                                    binding,
                                    request,
                                });
                        }
                    }
                }
            }
        }
        RequestIndex { requesters }
    }

    pub fn requesters(&self, node: &NodeId) -> &[Requester<'a>] {
        self.requesters
            .get(node)
            .map(|r| r.as_slice())
            .unwrap_or(&[])
    }
}

/// One line per entry, each prefixed with `indent`, truncated after [`MAX_LISTED`] entries.
///
/// [`MAX_LISTED`]: crate::diagnostics::MAX_LISTED
pub(crate) fn listing(entries: &[String], indent: &str) -> String {
    truncated_lines(entries)
        .iter()
        .map(|entry| format!("{}{}", indent, entry))
        .collect::<Vec<_>>()
        .join("\n")
}
