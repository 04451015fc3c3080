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
use crate::options::CompilerOptions;
use crate::validation::{NodeId, RequestIndex};

/// Bindings that may produce no value can only satisfy `#[nullable]` requests.
pub(super) fn validate(
    graph: &BindingGraph,
    index: &RequestIndex,
    options: &CompilerOptions,
    diagnostics: &mut Diagnostics,
) {
    let Some(severity) = options.nullable_validation.severity() else {
        return;
    };
    for id in graph.preorder() {
        let node = graph.component(id);
        for resolved in node.owned.values() {
            let Some(binding) = resolved.binding() else {
                continue;
            };
            if !binding.is_nullable() {
                continue;
            }
            let node_id: NodeId = (id, resolved.key.clone());
            for requester in index.requesters(&node_id) {
                let request = requester.request();
                if request.nullable {
                    continue;
                }
                diagnostics.report(
                    DiagnosticKind::Nullable,
                    severity,
                    &request.location,
                    &graph.component(requester.component()).readable(),
                    format!(
                        "{} is not nullable, but is being provided by {}\n    {} is requested at\n        {}",
                        resolved.key.readable(),
                        binding.declaration,
                        resolved.key.readable(),
                        requester.site(graph)
                    ),
                );
            }
        }
    }
}
