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

//! The dirk compiler: builds, validates and generates the component graphs described by a
//! [`Manifest`].
//!
//! [`compile`] runs every stage. Diagnostics about the user's declarations are returned as data;
//! an `Err` means the compiler itself could not finish.

pub mod diagnostics;
pub mod emit;
pub mod graph;
pub mod model;
pub mod naming;
pub mod options;
pub mod validation;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
use crate::emit::SourceUnit;
use crate::model::declarations::Declarations;
use crate::options::CompilerOptions;
use anyhow::Result;
use dirk_common::manifest::{ComponentType, Location, Manifest};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct CompilerOutput {
    /// One unit per root component, in declaration order. Empty when any error was reported.
    pub sources: Vec<SourceUnit>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilerOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// All generated units as one file.
    pub fn combined_source(&self) -> String {
        emit::combine(&self.sources)
    }
}

pub fn compile(manifest: Manifest, options: &CompilerOptions) -> Result<CompilerOutput> {
    let mut diagnostics = Diagnostics::new();
    for key in &options.unrecognized {
        diagnostics.report(
            DiagnosticKind::Declaration,
            Severity::Warning,
            &Location::default(),
            "",
            format!("The following options were not recognized: {}", key),
        );
    }

    let mut decl = Declarations::new(manifest);
    model::shapes::validate(&mut decl, options, &mut diagnostics);
    validation::validate_declarations(&decl, options, &mut diagnostics);

    let roots: Vec<_> = decl
        .manifest()
        .components
        .iter()
        .filter(|c| c.component_type == ComponentType::Component)
        .filter(|c| c.type_params.is_empty() && !decl.is_erroneous(&c.type_data))
        .map(|c| c.type_data.clone())
        .collect();
    debug!("compiling {} root component(s)", roots.len());

    let mut graphs = Vec::new();
    for root in &roots {
        if let Some(graph) = graph::build(&decl, root, &mut diagnostics) {
            validation::validate_graph(&graph, &decl, options, &mut diagnostics);
            graphs.push(graph);
        }
    }

    let mut sources = Vec::new();
    if !diagnostics.has_errors() {
        let names = emit::root_names(&roots);
        let emitter = emit::emitter(options.mode);
        for graph in &graphs {
            let name = &names[graph.root().type_data()];
            sources.push(emitter.emit(graph, &decl, name)?);
        }
    }
    Ok(CompilerOutput {
        sources,
        diagnostics: diagnostics.into_sorted(),
    })
}
