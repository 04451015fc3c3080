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

//! Attributes of the dirk dependency injection framework. Use them through the `dirk` crate.
//!
//! The attributes only mark declarations; the dirk build script reads the marked source and
//! generates the components. Markers that rustc cannot resolve on their own, such as
//! `#[qualified]` on a parameter, are stripped by the attribute on the enclosing item.

use proc_macro::TokenStream;

mod components;
mod declarations;
mod error;
mod injectables;
mod modules;
mod parsing;

use error::handle_error;

#[proc_macro_attribute]
pub fn injectable(attr: TokenStream, input: TokenStream) -> TokenStream {
    handle_error(|| injectables::handle_injectable_attribute(attr.into(), input.into()))
}

#[proc_macro_attribute]
pub fn module(attr: TokenStream, input: TokenStream) -> TokenStream {
    handle_error(|| modules::handle_module_attribute(attr.into(), input.into()))
}

#[proc_macro_attribute]
pub fn component(_attr: TokenStream, input: TokenStream) -> TokenStream {
    handle_error(|| components::handle_trait_attribute("component", input.into()))
}

#[proc_macro_attribute]
pub fn subcomponent(_attr: TokenStream, input: TokenStream) -> TokenStream {
    handle_error(|| components::handle_trait_attribute("subcomponent", input.into()))
}

#[proc_macro_attribute]
pub fn component_builder(_attr: TokenStream, input: TokenStream) -> TokenStream {
    handle_error(|| components::handle_trait_attribute("component_builder", input.into()))
}

#[proc_macro_attribute]
pub fn component_factory(_attr: TokenStream, input: TokenStream) -> TokenStream {
    handle_error(|| components::handle_trait_attribute("component_factory", input.into()))
}

#[proc_macro_attribute]
pub fn subcomponent_builder(_attr: TokenStream, input: TokenStream) -> TokenStream {
    handle_error(|| components::handle_trait_attribute("subcomponent_builder", input.into()))
}

#[proc_macro_attribute]
pub fn subcomponent_factory(_attr: TokenStream, input: TokenStream) -> TokenStream {
    handle_error(|| components::handle_trait_attribute("subcomponent_factory", input.into()))
}

#[proc_macro_attribute]
pub fn assisted_factory(_attr: TokenStream, input: TokenStream) -> TokenStream {
    handle_error(|| components::handle_trait_attribute("assisted_factory", input.into()))
}

#[proc_macro_attribute]
pub fn scope(_attr: TokenStream, input: TokenStream) -> TokenStream {
    handle_error(|| declarations::handle_marker_struct_attribute("scope", input.into()))
}

#[proc_macro_attribute]
pub fn qualifier(_attr: TokenStream, input: TokenStream) -> TokenStream {
    handle_error(|| declarations::handle_marker_struct_attribute("qualifier", input.into()))
}

// Markers below are normally stripped by the enclosing attribute. They only expand on their own
// when placed before it, e.g. `#[scoped(..)]` above `#[injectable]`.

#[proc_macro_attribute]
pub fn inject(_attr: TokenStream, input: TokenStream) -> TokenStream {
    input
}

#[proc_macro_attribute]
pub fn assisted_inject(_attr: TokenStream, input: TokenStream) -> TokenStream {
    input
}

#[proc_macro_attribute]
pub fn provides(_attr: TokenStream, input: TokenStream) -> TokenStream {
    input
}

#[proc_macro_attribute]
pub fn binds(_attr: TokenStream, input: TokenStream) -> TokenStream {
    input
}

#[proc_macro_attribute]
pub fn binds_option_of(_attr: TokenStream, input: TokenStream) -> TokenStream {
    input
}

#[proc_macro_attribute]
pub fn multibinds(_attr: TokenStream, input: TokenStream) -> TokenStream {
    input
}

#[proc_macro_attribute]
pub fn into_vec(_attr: TokenStream, input: TokenStream) -> TokenStream {
    input
}

#[proc_macro_attribute]
pub fn elements_into_vec(_attr: TokenStream, input: TokenStream) -> TokenStream {
    input
}

#[proc_macro_attribute]
pub fn into_map(_attr: TokenStream, input: TokenStream) -> TokenStream {
    input
}

#[proc_macro_attribute]
pub fn scoped(_attr: TokenStream, input: TokenStream) -> TokenStream {
    input
}

#[proc_macro_attribute]
pub fn reusable(_attr: TokenStream, input: TokenStream) -> TokenStream {
    input
}

#[proc_macro_attribute]
pub fn qualified(_attr: TokenStream, input: TokenStream) -> TokenStream {
    input
}

#[proc_macro_attribute]
pub fn nullable(_attr: TokenStream, input: TokenStream) -> TokenStream {
    input
}
