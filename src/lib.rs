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

//! Compile time dependency injection, in the style of Dagger.
//!
//! Bindings are declared with the attributes re-exported here. A build script runs the dirk
//! compiler over the crate, which validates the dependency graph of every [`component`] and writes
//! Rust code implementing it. The crate includes that code with [`include_components!()`].
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     dirk::build_script::generate();
//! }
//! ```
//!
//! ```ignore
//! // src/lib.rs
//! use dirk::{component, injectable};
//!
//! pub struct Foo;
//!
//! #[injectable]
//! impl Foo {
//!     #[inject]
//!     pub fn new() -> Self {
//!         Foo
//!     }
//! }
//!
//! #[component]
//! pub trait App {
//!     fn foo(&self) -> crate::Foo;
//! }
//!
//! dirk::include_components!();
//!
//! fn main() {
//!     let app: std::sync::Arc<dyn App> = DirkApp::create();
//!     let foo = app.foo();
//! }
//! ```
//!
//! For a root component `crate::App` the generated struct is `DirkApp`, declared next to the
//! [`include_components!()`] call. It has `builder()` returning a builder with a setter for each
//! installed module and component dependency, and `create()` when nothing needs to be set.
//!
//! Paths in dirk attributes and in the signatures dirk reads should be fully qualified
//! (`crate::Foo`), or imported with `use` in the same file.

mod delegate_factory;
mod double_check;
mod lazy;
mod multibinding;
mod provider;
mod single_check;

pub mod build_script;
#[doc(hidden)]
pub mod internal;

pub use crate::delegate_factory::DelegateFactory;
pub use crate::double_check::DoubleCheck;
pub use crate::lazy::{Lazy, ProviderOfLazy};
pub use crate::multibinding::{MapFactory, MapFactoryBuilder, VecFactory, VecFactoryBuilder};
pub use crate::provider::{Factory, Provider};
pub use crate::single_check::SingleCheck;

use std::marker::PhantomData;

/// Annotates an `impl` block whose `#[inject]` constructor makes the type available to the
/// dependency graph.
///
/// ```ignore
/// pub struct Foo {
///     bar: crate::Bar,
/// }
///
/// #[injectable]
/// #[scoped(crate::Singleton)]
/// impl Foo {
///     #[inject]
///     pub fn new(bar: crate::Bar) -> Self {
///         Foo { bar }
///     }
/// }
/// ```
///
/// Parameters of the constructor are dependencies. A parameter may also ask for a
/// [`Provider<T>`], a [`Lazy<T>`] or a `Provider<Lazy<T>>`.
///
/// # Assisted injection
///
/// An `#[assisted_inject]` constructor mixes caller supplied `#[assisted]` parameters with
/// injected ones. It is created through an [`#[assisted_factory]`](assisted_factory) trait
/// instead of being bound directly.
///
/// ```ignore
/// #[injectable]
/// impl Timer {
///     #[assisted_inject]
///     pub fn new(#[assisted] seconds: i32, clock: crate::Clock) -> Self {
///         Timer { seconds, clock }
///     }
/// }
/// ```
pub use dirk_processor::injectable;

/// Marks the constructor of an [`#[injectable]`](injectable) type.
pub use dirk_processor::inject;

/// Marks an assisted constructor of an [`#[injectable]`](injectable) type.
pub use dirk_processor::assisted_inject;

/// Annotates the `impl` block of a module, a collection of binding methods.
///
/// ```ignore
/// pub struct AppModule;
///
/// #[module(includes: [crate::OtherModule], subcomponents: [crate::Session])]
/// impl AppModule {
///     #[provides]
///     pub fn provide_name() -> String {
///         "dirk".to_owned()
///     }
///
///     #[binds]
///     pub fn bind_greeter(greeter: crate::GreeterImpl) -> std::sync::Arc<dyn crate::Greeter> {}
/// }
/// ```
///
/// Modules whose binding methods take `&self` are instances supplied to the component builder.
/// They are created with `Default` when the type implements it and the builder was not given one.
///
/// # Binding methods
///
/// * `#[provides]`: the method computes the value from its parameters.
/// * `#[binds]`: binds the return type to the single parameter. The body must be empty; it is
///   filled in by the attribute.
/// * `#[binds_option_of]`: binds `Option<T>`, which is `Some` when `T` is bound.
/// * `#[multibinds]`: declares a `Vec<T>` or `HashMap<K, V>` multibinding that may be empty.
///
/// `#[provides]` and `#[binds]` methods can contribute to multibindings with `#[into_vec]`,
/// `#[elements_into_vec]` or `#[into_map(string_key: "a")]` (also `i32_key` and `enum_key`).
pub use dirk_processor::module;

pub use dirk_processor::binds;
pub use dirk_processor::binds_option_of;
pub use dirk_processor::elements_into_vec;
pub use dirk_processor::into_map;
pub use dirk_processor::into_vec;
pub use dirk_processor::multibinds;
pub use dirk_processor::provides;

/// Annotates a trait that composes the dependency graph and exposes parts of it (an "injector").
///
/// ```ignore
/// #[component(modules: [crate::AppModule], dependencies: [crate::Config])]
/// #[scoped(crate::Singleton)]
/// pub trait App {
///     fn foo(&self) -> crate::Foo;
///     fn foo_provider(&self) -> dirk::Provider<crate::Foo>;
///     fn session(&self) -> Box<dyn crate::SessionBuilder>;
/// }
/// ```
///
/// Methods taking only `&self` are entry points. A method returning
/// `std::sync::Arc<dyn Subcomponent>` creates a subcomponent from its arguments, which may be
/// modules of the subcomponent.
///
/// `dependencies` lists traits whose provision methods become bindings. Their instances are
/// supplied to the builder as `std::sync::Arc<dyn Dependency>`.
pub use dirk_processor::component;

/// Annotates a trait of a child component that inherits every binding of its parent.
///
/// Subcomponents are created through a parent's factory method or through a
/// [`#[subcomponent_builder]`](subcomponent_builder) listed in a module's `subcomponents`.
pub use dirk_processor::subcomponent;

/// Declares a builder trait for a root component: setters taking modules, component
/// dependencies or `#[bind_instance]` values, and a method returning the component.
///
/// ```ignore
/// #[component_builder(crate::App)]
/// pub trait AppBuilder {
///     fn name(&mut self, #[bind_instance] name: String);
///     fn build(self: Box<Self>) -> std::sync::Arc<dyn crate::App>;
/// }
/// ```
///
/// The generated struct gets `builder() -> Box<dyn AppBuilder>`.
pub use dirk_processor::component_builder;

/// Declares a factory trait for a root component: a single method taking every input and
/// returning the component. The generated struct gets `factory() -> Box<dyn AppFactory>`.
pub use dirk_processor::component_factory;
pub use dirk_processor::subcomponent_builder;
pub use dirk_processor::subcomponent_factory;

/// Declares the factory of an `#[assisted_inject]` type. The single method takes the assisted
/// parameters and returns the type; request it as `std::sync::Arc<dyn Factory>`.
pub use dirk_processor::assisted_factory;

/// Declares a scope. Components and bindings with the same `#[scoped(..)]` share one instance
/// per component.
///
/// ```ignore
/// #[scope]
/// pub struct Singleton;
/// ```
pub use dirk_processor::scope;
pub use dirk_processor::scoped;

/// Caches a binding in whichever component owns it, without guaranteeing a single instance.
pub use dirk_processor::reusable;

/// Declares a qualifier, used with `#[qualified(..)]` to bind the same type more than once.
///
/// ```ignore
/// #[qualifier]
/// pub struct Red;
///
/// #[module]
/// impl ColorModule {
///     #[provides]
///     #[qualified(crate::Red)]
///     pub fn red() -> String {
///         "red".to_owned()
///     }
/// }
/// ```
pub use dirk_processor::qualifier;
pub use dirk_processor::qualified;

/// Marks a `#[provides]` method returning `Option<T>` as binding a possibly absent `T`.
pub use dirk_processor::nullable;

/// Includes the components generated by [`build_script`]. Must be called once in the crate root,
/// outside any function.
///
/// Test builds include the components found with `cfg(test)` enabled.
#[macro_export]
macro_rules! include_components {
    () => {
        #[cfg(not(test))]
        include!(concat!(env!("OUT_DIR"), "/dirk_components.rs"));
        #[cfg(test)]
        include!(concat!(env!("OUT_DIR"), "/dirk_components_test.rs"));
    };
}

/// Production request marker. dirk has no production components, so requesting a
/// `Producer<T>` is always an error.
pub struct Producer<T> {
    _phantom: PhantomData<T>,
}
