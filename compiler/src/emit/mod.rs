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

//! Code Emitter: turns a validated [`BindingGraph`] into Rust source.
//!
//! Everything generated for a root component `crate::App` lives in a private module `dirk_app`,
//! and the root struct `DirkApp` is re-exported next to it. Both strategies share the component
//! structs, their constructors, entry points and creators; they differ in how providers are made.

mod component;
mod default_mode;
pub mod expressions;
mod factories;
mod fast_init;
pub mod plan;

pub use default_mode::DefaultEmitter;
pub use fast_init::FastInitEmitter;

use crate::graph::{BindingGraph, ComponentId};
use crate::model::declarations::Declarations;
use crate::naming;
use crate::options::CodegenMode;
use anyhow::{Context as _, Result};
use dirk_common::type_data::TypeData;
use expressions::Context;
use plan::Plan;
use proc_macro2::TokenStream;
use std::collections::BTreeMap;
use tracing::debug;

/// Generated source for one root component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Name of the root struct, e.g. `DirkApp`.
    pub name: String,
    pub contents: String,
}

/// A code generation strategy.
pub trait Emitter {
    fn mode(&self) -> CodegenMode;

    /// Statements run inside the constructor of `component` that bind each of its provider fields
    /// to a local of the same name.
    fn field_initializers(&self, context: &Context, component: ComponentId) -> Result<TokenStream>;

    /// Items that support the component structs, emitted once per root.
    fn support_items(&self, context: &Context) -> Result<TokenStream>;

    fn emit(&self, graph: &BindingGraph, decl: &Declarations, root_name: &str) -> Result<SourceUnit> {
        let plan = Plan::new(graph, decl, self.mode(), root_name);
        let context = Context::new(graph, decl, &plan);
        let tokens = component::root_module(self, &context)
            .with_context(|| format!("failed to generate {}", graph.root().readable()))?;
        debug!("generated {}", root_name);
        Ok(SourceUnit {
            name: root_name.to_owned(),
            contents: render(tokens)?,
        })
    }
}

pub fn emitter(mode: CodegenMode) -> Box<dyn Emitter> {
    match mode {
        CodegenMode::Default => Box::new(DefaultEmitter),
        CodegenMode::FastInit => Box::new(FastInitEmitter),
    }
}

/// Names of the generated root structs: `Dirk` followed by the simple name of the component,
/// prefixed with enclosing modules where simple names collide.
pub fn root_names(roots: &[TypeData]) -> BTreeMap<TypeData, String> {
    let candidates = roots
        .iter()
        .map(|r| (r.clone(), r.simple_name()))
        .collect();
    naming::disambiguate(&candidates)
        .into_iter()
        .map(|(t, name)| (t, format!("Dirk{}", naming::upper_camel_case(&name))))
        .collect()
}

pub fn render(tokens: TokenStream) -> Result<String> {
    let file: syn::File = syn::parse2(tokens).with_context(|| "generated code does not parse")?;
    Ok(prettyplease::unparse(&file))
}

/// Concatenates the units into the file included by `dirk::include_components!()`.
pub fn combine(units: &[SourceUnit]) -> String {
    let mut result = String::from("// @generated by dirk. Do not edit.\n\n");
    for unit in units {
        result.push_str(&unit.contents);
        result.push('\n');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn root_names_are_prefixed_and_disambiguated() {
        let a = TypeData::from_str("crate::a::App").unwrap();
        let b = TypeData::from_str("crate::b::App").unwrap();
        let other = TypeData::from_str("crate::Other").unwrap();
        let names = root_names(&[a.clone(), b.clone(), other.clone()]);
        assert_eq!(names[&a], "DirkAApp");
        assert_eq!(names[&b], "DirkBApp");
        assert_eq!(names[&other], "DirkOther");
    }

    #[test]
    fn renders_tokens() {
        let rendered = render(quote::quote! {struct Foo;}).unwrap();
        assert_eq!(rendered, "struct Foo;\n");
    }
}
