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
use crate::validation::{NodeId, RequestIndex};

/// `#[assisted_inject]` types are only available through their factories.
pub(super) fn validate(graph: &BindingGraph, index: &RequestIndex, diagnostics: &mut Diagnostics) {
    for id in graph.preorder() {
        let node = graph.component(id);
        for resolved in node.owned.values().filter(|r| r.assisted_injection) {
            let node_id: NodeId = (id, resolved.key.clone());
            for requester in index.requesters(&node_id) {
                diagnostics.error(
                    DiagnosticKind::Declaration,
                    &requester.request().location,
                    &graph.component(requester.component()).readable(),
                    format!(
                        "Dirk does not support injecting #[assisted_inject] type, {}. Did you mean to inject its assisted factory type instead?",
                        resolved.key.readable()
                    ),
                );
            }
        }
    }
}
