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

use dirk_common::manifest_parser::parse_source;
use dirk_compiler::options::CompilerOptions;
use dirk_compiler::{compile, CompilerOutput};
use pretty_assertions::assert_eq;

const FAST_INIT: &str = "dirk.fastInit=enabled";

fn generate(src: &str, options: &str) -> CompilerOutput {
    let manifest = parse_source("lib.rs", src, false).unwrap();
    let output = compile(manifest, &CompilerOptions::parse(options).unwrap()).unwrap();
    let errors: Vec<String> = output.diagnostics.iter().map(|d| d.to_string()).collect();
    assert!(!output.has_errors(), "unexpected errors:\n{}", errors.join("\n"));
    output
}

/// Drops whitespace and the trailing commas the pretty printer adds to wrapped lists.
fn squash(source: &str) -> String {
    let squashed: String = source.chars().filter(|c| !c.is_whitespace()).collect();
    squashed.replace(",)", ")").replace(",}", "}").replace(",]", "]")
}

fn assert_contains(source: &str, needle: &str) {
    assert!(
        squash(source).contains(&squash(needle)),
        "{:?} not found in:\n{}",
        needle,
        source
    );
}

const CHAIN: &str = r#"
    pub struct A;
    #[injectable]
    impl A {
        #[inject]
        pub fn new(b: crate::B) -> Self { A }
    }

    pub struct B;
    #[injectable]
    impl B {
        #[inject]
        pub fn new() -> Self { B }
    }

    #[component]
    pub trait App {
        fn a(&self) -> crate::A;
    }
"#;

#[test]
fn unscoped_dependencies_are_constructed_inline() {
    let output = generate(CHAIN, "");
    assert_eq!(output.sources.len(), 1);
    assert_eq!(output.sources[0].name, "DirkApp");
    let source = output.combined_source();
    assert_contains(&source, "crate::A::new(crate::B::new())");
    assert_contains(&source, "pub(crate) mod dirk_app");
    assert_contains(&source, "pub(crate) use dirk_app::DirkApp;");
    assert_contains(&source, "pub(crate) fn create()");
    assert!(!source.contains("_Factory"), "{}", source);
}

#[test]
fn generated_items_silence_unused_lints() {
    for options in ["", FAST_INIT] {
        let source = generate(CHAIN, options).combined_source();
        assert_contains(&source, "unused_mut, unused_parens, unused_variables,");
        assert_contains(
            &source,
            "#[allow(unused_imports)] pub(crate) use dirk_app::DirkApp;",
        );
    }
}

#[test]
fn fast_init_constructs_inline_too() {
    let source = generate(CHAIN, FAST_INIT).combined_source();
    assert_contains(&source, "crate::A::new(crate::B::new())");
    assert!(!source.contains("SwitchingProvider"), "{}", source);
}

#[test]
fn generation_is_idempotent() {
    for options in ["", FAST_INIT] {
        let first = generate(SCOPED, options).combined_source();
        let second = generate(SCOPED, options).combined_source();
        assert_eq!(first, second);
    }
}

const SCOPED: &str = r#"
    #[scope]
    pub struct Singleton;

    pub struct Config;
    #[injectable]
    #[scoped(crate::Singleton)]
    impl Config {
        #[inject]
        pub fn new() -> Self { Config }
    }

    pub struct Service;
    #[injectable]
    impl Service {
        #[inject]
        pub fn new(config: crate::Config, lazy: dirk::Lazy<crate::Config>) -> Self { Service }
    }

    #[component]
    #[scoped(crate::Singleton)]
    pub trait App {
        fn service(&self) -> crate::Service;
        fn config_provider(&self) -> dirk::Provider<crate::Config>;
    }
"#;

#[test]
fn default_mode_holds_scoped_bindings_in_factories() {
    let source = generate(SCOPED, "").combined_source();
    assert_contains(&source, "pub(crate) struct Config_Factory");
    assert_contains(&source, "::dirk::DoubleCheck::provider(::dirk::Provider::from_factory(Config_Factory::new()))");
    assert_contains(&source, "::dirk::Lazy::new(self.config_provider.clone())");
    assert_contains(&source, "self.config_provider.get()");
}

#[test]
fn fast_init_dispatches_through_switching_provider() {
    let source = generate(SCOPED, FAST_INIT).combined_source();
    assert!(!source.contains("_Factory"), "{}", source);
    assert_contains(&source, "pub(crate) struct DirkAppSwitchingProvider");
    assert_contains(&source, "::dirk::DoubleCheck::provider(DirkAppSwitchingProvider::provider(this, 0))");
    assert_contains(&source, "0 => ::std::boxed::Box::new(crate::Config::new())");
    assert_contains(&source, "fn get0(");
    assert!(!source.contains("fn get1("), "{}", source);
}

#[test]
fn fast_init_splits_switch_cases_into_banks() {
    let mut src = String::from("#[scope]\npub struct Singleton;\n");
    let mut entry_points = String::new();
    for i in 0..101 {
        src.push_str(&format!(
            "pub struct T{i};\n#[injectable]\n#[scoped(crate::Singleton)]\nimpl T{i} {{\n#[inject]\npub fn new() -> Self {{ T{i} }}\n}}\n"
        ));
        entry_points.push_str(&format!("fn t{i}(&self) -> crate::T{i};\n"));
    }
    src.push_str(&format!(
        "#[component]\n#[scoped(crate::Singleton)]\npub trait App {{\n{}}}\n",
        entry_points
    ));
    let source = generate(&src, FAST_INIT).combined_source();
    assert_contains(&source, "fn get0(");
    assert_contains(&source, "fn get1(");
    assert!(!source.contains("fn get2("), "{}", source);
    assert_contains(&source, "100 => ::std::boxed::Box::new");
}

#[test]
fn unused_module_setter_is_deprecated() {
    let source = generate(
        r#"
        pub struct StaticModule;
        #[module]
        impl StaticModule {
            #[provides]
            pub fn number() -> i32 { 1 }
        }

        #[component(modules: [crate::StaticModule])]
        pub trait App {
            fn number(&self) -> i32;
        }
        "#,
        "",
    )
    .combined_source();
    assert_contains(&source, "#[deprecated(note = \"crate::StaticModule is not used by crate::App and will be ignored\")]");
    assert_contains(&source, "crate::StaticModule::number()");
}

#[test]
fn instance_modules_without_default_are_required() {
    let source = generate(
        r#"
        pub struct ConfigModule {
            value: i32,
        }
        #[module]
        impl ConfigModule {
            #[provides]
            pub fn value(&self) -> i32 { self.value }
        }

        #[component(modules: [crate::ConfigModule])]
        pub trait App {
            fn value(&self) -> i32;
        }
        "#,
        "",
    )
    .combined_source();
    assert_contains(&source, "panic!(\"crate::ConfigModule must be set\")");
    assert!(!source.contains("pub(crate) fn create()"), "{}", source);
    assert_contains(&source, "self.config_module.value()");
}

#[test]
fn children_with_colliding_names_are_disambiguated() {
    let source = generate(
        r#"
        pub mod a {
            #[subcomponent]
            pub trait Child {}
        }
        pub mod b {
            #[subcomponent]
            pub trait Child {}
        }

        #[component]
        pub trait App {
            fn a(&self) -> std::sync::Arc<dyn crate::a::Child>;
            fn b(&self) -> std::sync::Arc<dyn crate::b::Child>;
        }
        "#,
        "",
    )
    .combined_source();
    assert_contains(&source, "pub(crate) struct A_ChildImpl");
    assert_contains(&source, "pub(crate) struct B_ChildImpl");
    assert_contains(&source, "A_ChildImpl::new(::dirk::internal::upgrade(&self.this))");
}

#[test]
fn subcomponent_builder_binds_instances() {
    let source = generate(
        r#"
        pub struct Request;
        #[injectable]
        impl Request {
            #[inject]
            pub fn new(name: String) -> Self { Request }
        }

        #[subcomponent]
        pub trait Session {
            fn request(&self) -> crate::Request;
        }

        #[subcomponent_builder(crate::Session)]
        pub trait SessionBuilder {
            fn name(&mut self, #[bind_instance] name: String);
            fn build(self: Box<Self>) -> std::sync::Arc<dyn crate::Session>;
        }

        pub struct AppModule;
        #[module(subcomponents: [crate::Session])]
        impl AppModule {}

        #[component(modules: [crate::AppModule])]
        pub trait App {
            fn session(&self) -> Box<dyn crate::SessionBuilder>;
        }
        "#,
        "",
    )
    .combined_source();
    assert_contains(&source, "pub(crate) struct SessionImplCreator");
    assert_contains(&source, "impl crate::SessionBuilder for SessionImplCreator");
    assert_contains(&source, "creator.name = ::std::option::Option::Some(name);");
    assert_contains(&source, "crate::Request::new(self.name.clone())");
}

#[test]
fn assisted_factory_passes_arguments_in_order() {
    let source = generate(
        r#"
        pub struct Clock;
        #[injectable]
        impl Clock {
            #[inject]
            pub fn new() -> Self { Clock }
        }

        pub struct Timer;
        #[injectable]
        impl Timer {
            #[assisted_inject]
            pub fn new(#[assisted] name: String, clock: crate::Clock, #[assisted] seconds: i32) -> Self { Timer }
        }

        #[assisted_factory]
        pub trait TimerFactory {
            fn create(&self, seconds: i32, name: String) -> crate::Timer;
        }

        #[component]
        pub trait App {
            fn timers(&self) -> std::sync::Arc<dyn crate::TimerFactory>;
        }
        "#,
        "",
    )
    .combined_source();
    assert_contains(&source, "pub(crate) struct TimerFactory_Impl");
    assert_contains(&source, "crate::Timer::new(name, self.clock.get(), seconds)");
}

fn component_factory(receiver: &str) -> String {
    format!(
        r#"
        #[component]
        pub trait App {{
            fn name(&self) -> String;
        }}

        #[component_factory(crate::App)]
        pub trait AppFactory {{
            fn create({}, #[bind_instance] name: String) -> std::sync::Arc<dyn crate::App>;
        }}
        "#,
        receiver
    )
}

#[test]
fn component_factory_taking_mut_self_stores_into_itself() {
    for options in ["", FAST_INIT] {
        let source = generate(&component_factory("&mut self"), options).combined_source();
        assert_contains(&source, "fn create(&mut self, name: ::std::string::String) -> ::std::sync::Arc<dyn crate::App>");
        assert_contains(&source, "let mut creator = self;");
        assert_contains(&source, "creator.name = ::std::option::Option::Some(name);");
        assert_contains(&source, "DirkApp::new(creator.name.take())");
        assert_contains(&source, "pub(crate) fn factory() -> ::std::boxed::Box<dyn crate::AppFactory>");
    }
}

#[test]
fn component_factory_taking_boxed_self_stores_into_the_box() {
    for options in ["", FAST_INIT] {
        let source = generate(&component_factory("self: Box<Self>"), options).combined_source();
        assert_contains(
            &source,
            "fn create(self: ::std::boxed::Box<Self>, name: ::std::string::String) -> ::std::sync::Arc<dyn crate::App>",
        );
        assert_contains(&source, "DirkApp::new(creator.name.take())");
    }
}

#[test]
fn component_factory_taking_shared_self_is_rejected() {
    let manifest = parse_source("lib.rs", &component_factory("&self"), false).unwrap();
    let output = compile(manifest, &CompilerOptions::default()).unwrap();
    assert!(output.has_errors());
    assert!(output.sources.is_empty());
}
