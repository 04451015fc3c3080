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
use dirk_compiler::diagnostics::{DiagnosticKind, Severity};
use dirk_compiler::options::CompilerOptions;
use dirk_compiler::{compile, CompilerOutput};
use pretty_assertions::assert_eq;

fn compile_source(src: &str, options: &str) -> CompilerOutput {
    let manifest = parse_source("lib.rs", src, false).unwrap();
    compile(manifest, &CompilerOptions::parse(options).unwrap()).unwrap()
}

fn texts(output: &CompilerOutput, kind: DiagnosticKind) -> Vec<String> {
    output
        .diagnostics
        .iter()
        .filter(|d| d.kind == kind)
        .map(|d| d.text())
        .collect()
}

#[test]
fn missing_binding_lists_the_request_trace() {
    let output = compile_source(
        r#"
        pub struct Foo;
        #[injectable]
        impl Foo {
            #[inject]
            pub fn new(bar: crate::Bar) -> Self { Foo }
        }

        #[component]
        pub trait App {
            fn foo(&self) -> crate::Foo;
        }
        "#,
        "",
    );
    assert!(output.has_errors());
    assert!(output.sources.is_empty());
    assert_eq!(
        texts(&output, DiagnosticKind::MissingBinding),
        vec![[
            "[Dirk/MissingBinding] crate::Bar cannot be provided without an #[inject] constructor or a #[provides]-annotated method.",
            "    crate::Bar is injected at",
            "        [crate::App] crate::Foo::new(bar)",
            "    crate::Foo is requested at",
            "        [crate::App] crate::App::foo()",
        ]
        .join("\n")]
    );
}

fn providers_of_i32(count: usize) -> String {
    let mut methods = String::new();
    for i in 0..count {
        methods.push_str(&format!("#[provides]\npub fn n{i}() -> i32 {{ {i} }}\n"));
    }
    format!(
        r#"
        pub struct Numbers;
        #[module]
        impl Numbers {{
            {methods}
        }}

        #[component(modules: [crate::Numbers])]
        pub trait App {{
            fn number(&self) -> i32;
        }}
        "#
    )
}

#[test]
fn duplicate_bindings_are_listed() {
    let output = compile_source(&providers_of_i32(2), "");
    let duplicates = texts(&output, DiagnosticKind::DuplicateBindings);
    assert_eq!(duplicates.len(), 1);
    let lines: Vec<&str> = duplicates[0].lines().collect();
    assert_eq!(lines[0], "[Dirk/DuplicateBindings] i32 is bound multiple times:");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("crate::Numbers::n0"), "{}", lines[1]);
    assert!(lines[2].contains("crate::Numbers::n1"), "{}", lines[2]);
}

#[test]
fn long_listings_are_truncated() {
    let output = compile_source(&providers_of_i32(11), "");
    let duplicates = texts(&output, DiagnosticKind::DuplicateBindings);
    let lines: Vec<&str> = duplicates[0].lines().collect();
    assert_eq!(lines.len(), 12);
    assert_eq!(lines[11], "    and 1 other");

    let output = compile_source(&providers_of_i32(13), "");
    let duplicates = texts(&output, DiagnosticKind::DuplicateBindings);
    assert!(duplicates[0].ends_with("\n    and 3 others"), "{}", duplicates[0]);
}

#[test]
fn dependency_cycles_are_reported() {
    let output = compile_source(
        r#"
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
            pub fn new(a: crate::A) -> Self { B }
        }

        #[component]
        pub trait App {
            fn a(&self) -> crate::A;
        }
        "#,
        "",
    );
    let cycles = texts(&output, DiagnosticKind::DependencyCycle);
    assert_eq!(cycles.len(), 1);
    assert!(
        cycles[0].starts_with("[Dirk/DependencyCycle] Found a dependency cycle:"),
        "{}",
        cycles[0]
    );
    assert!(output.sources.is_empty());
}

#[test]
fn provider_requests_break_cycles() {
    let output = compile_source(
        r#"
        pub struct A;
        #[injectable]
        impl A {
            #[inject]
            pub fn new(b: dirk::Provider<crate::B>) -> Self { A }
        }

        pub struct B;
        #[injectable]
        impl B {
            #[inject]
            pub fn new(a: crate::A) -> Self { B }
        }

        #[component]
        pub trait App {
            fn a(&self) -> crate::A;
        }
        "#,
        "",
    );
    assert!(!output.has_errors(), "{:?}", output.diagnostics);
    assert_eq!(output.sources.len(), 1);
}

#[test]
fn unscoped_component_may_not_reference_scoped_bindings() {
    let output = compile_source(
        r#"
        #[scope]
        pub struct Singleton;

        pub struct Foo;
        #[injectable]
        #[scoped(crate::Singleton)]
        impl Foo {
            #[inject]
            pub fn new() -> Self { Foo }
        }

        #[component]
        pub trait App {
            fn foo(&self) -> crate::Foo;
        }
        "#,
        "",
    );
    let scopes = texts(&output, DiagnosticKind::IncompatiblyScopedBindings);
    assert_eq!(scopes.len(), 1);
    assert!(
        scopes[0].starts_with(
            "[Dirk/IncompatiblyScopedBindings] crate::App (unscoped) may not reference scoped bindings:"
        ),
        "{}",
        scopes[0]
    );
}

#[test]
fn unrecognized_options_warn() {
    let output = compile_source(
        r#"
        #[component]
        pub trait App {}
        "#,
        "dirk.notAnOption=1",
    );
    assert!(!output.has_errors());
    assert_eq!(output.sources.len(), 1);
    let warnings: Vec<_> = output
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("dirk.notAnOption"));
}

const COMPONENT_DEPENDENCY_CYCLE: &str = r#"
    #[component(dependencies: [crate::B])]
    pub trait A {}

    #[component(dependencies: [crate::A])]
    pub trait B {}
    "#;

#[test]
fn component_dependency_cycles_are_reported() {
    let output = compile_source(COMPONENT_DEPENDENCY_CYCLE, "");
    assert!(output.has_errors());
    assert_eq!(
        texts(&output, DiagnosticKind::ComponentDependencyCycle),
        vec![
            [
                "[Dirk/ComponentDependencyCycle] crate::A contains a cycle in its component dependencies:",
                "    crate::A",
                "    crate::B",
                "    crate::A",
            ]
            .join("\n"),
            [
                "[Dirk/ComponentDependencyCycle] crate::B contains a cycle in its component dependencies:",
                "    crate::B",
                "    crate::A",
                "    crate::B",
            ]
            .join("\n"),
        ]
    );
}

#[test]
fn component_dependency_cycles_are_not_checked_when_disabled() {
    let output = compile_source(
        COMPONENT_DEPENDENCY_CYCLE,
        "dirk.validateTransitiveComponentDependencies=DISABLED",
    );
    assert!(texts(&output, DiagnosticKind::ComponentDependencyCycle).is_empty());
}

const UNUSED_DUPLICATES: &str = r#"
    pub struct Numbers;
    #[module]
    impl Numbers {
        #[provides]
        pub fn one() -> i32 { 1 }

        #[provides]
        pub fn two() -> i32 { 2 }
    }

    pub struct Outer;
    #[module(includes: [crate::Numbers])]
    impl Outer {}

    #[component(modules: [crate::Outer])]
    pub trait App {}
    "#;

fn full_graph_duplicates(output: &CompilerOutput) -> Vec<(String, Severity, String)> {
    let mut result: Vec<_> = output
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::DuplicateBindings)
        .map(|d| (d.element.clone(), d.severity, d.text()))
        .collect();
    result.sort();
    result
}

#[test]
fn full_graph_validation_reports_at_every_module_and_component() {
    let message = [
        "[Dirk/DuplicateBindings] i32 is bound multiple times:",
        "    #[provides] crate::Numbers::one() -> i32",
        "    #[provides] crate::Numbers::two() -> i32",
    ]
    .join("\n");
    let output = compile_source(UNUSED_DUPLICATES, "dirk.fullBindingGraphValidation=ERROR");
    assert!(output.has_errors());
    assert_eq!(
        full_graph_duplicates(&output),
        vec![
            ("crate::App".to_owned(), Severity::Error, message.clone()),
            ("crate::Numbers".to_owned(), Severity::Error, message.clone()),
            ("crate::Outer".to_owned(), Severity::Error, message.clone()),
        ]
    );

    let output = compile_source(UNUSED_DUPLICATES, "dirk.fullBindingGraphValidation=WARNING");
    assert!(!output.has_errors(), "{:?}", output.diagnostics);
    assert_eq!(output.sources.len(), 1);
    assert_eq!(
        full_graph_duplicates(&output),
        vec![
            ("crate::App".to_owned(), Severity::Warning, message.clone()),
            ("crate::Numbers".to_owned(), Severity::Warning, message.clone()),
            ("crate::Outer".to_owned(), Severity::Warning, message),
        ]
    );
}

#[test]
fn unused_duplicates_pass_without_full_graph_validation() {
    for options in ["", "dirk.fullBindingGraphValidation=NONE"] {
        let output = compile_source(UNUSED_DUPLICATES, options);
        assert!(full_graph_duplicates(&output).is_empty());
        assert_eq!(output.sources.len(), 1);
    }
}

#[test]
fn assisted_inject_types_cannot_be_injected_directly() {
    let output = compile_source(
        r#"
        pub struct Timer;
        #[injectable]
        impl Timer {
            #[assisted_inject]
            pub fn new(#[assisted] seconds: i32) -> Self { Timer }
        }

        #[component]
        pub trait App {
            fn timer(&self) -> crate::Timer;
        }
        "#,
        "",
    );
    assert!(output.has_errors());
    assert_eq!(
        texts(&output, DiagnosticKind::Declaration),
        vec![
            "Dirk does not support injecting #[assisted_inject] type, crate::Timer. Did you mean to inject its assisted factory type instead?"
        ]
    );
}

const NULLABLE_INTO_NON_NULLABLE: &str = r#"
    pub struct Values;
    #[module]
    impl Values {
        #[provides]
        #[nullable]
        pub fn name() -> Option<String> { None }
    }

    pub struct Greeter;
    #[injectable]
    impl Greeter {
        #[inject]
        pub fn new(name: String) -> Self { Greeter }
    }

    #[component(modules: [crate::Values])]
    pub trait App {
        fn greeter(&self) -> crate::Greeter;
    }
    "#;

fn nullable_message() -> String {
    [
        "[Dirk/Nullable] std::string::String is not nullable, but is being provided by #[provides] crate::Values::name() -> std::option::Option<std::string::String>",
        "    std::string::String is requested at",
        "        [crate::App] crate::Greeter::new(name)",
    ]
    .join("\n")
}

fn nullable_severities(output: &CompilerOutput) -> Vec<Severity> {
    output
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::Nullable)
        .map(|d| d.severity)
        .collect()
}

#[test]
fn nullable_bindings_fail_non_nullable_requests() {
    let output = compile_source(NULLABLE_INTO_NON_NULLABLE, "dirk.nullableValidation=ERROR");
    assert!(output.has_errors());
    assert!(output.sources.is_empty());
    assert_eq!(texts(&output, DiagnosticKind::Nullable), vec![nullable_message()]);
    assert_eq!(nullable_severities(&output), vec![Severity::Error]);
}

#[test]
fn nullable_validation_can_be_a_warning() {
    let output = compile_source(NULLABLE_INTO_NON_NULLABLE, "dirk.nullableValidation=WARNING");
    assert!(!output.has_errors(), "{:?}", output.diagnostics);
    assert_eq!(output.sources.len(), 1);
    assert_eq!(texts(&output, DiagnosticKind::Nullable), vec![nullable_message()]);
    assert_eq!(nullable_severities(&output), vec![Severity::Warning]);
}

fn builder(setters: &str) -> String {
    format!(
        r#"
        pub trait Config {{
            fn port(&self) -> i32;
        }}

        pub trait Other {{}}

        #[component(dependencies: [crate::Config])]
        pub trait App {{
            fn port(&self) -> i32;
        }}

        #[component_builder(crate::App)]
        pub trait AppBuilder {{
            {setters}
            fn build(self: Box<Self>) -> std::sync::Arc<dyn crate::App>;
        }}
        "#
    )
}

#[test]
fn builders_must_set_every_dependency() {
    let output = compile_source(&builder(""), "");
    assert_eq!(
        texts(&output, DiagnosticKind::Declaration),
        vec!["crate::AppBuilder is missing setters for required modules or dependencies: [crate::Config]"]
    );
}

#[test]
fn builders_may_not_set_unrequired_dependencies() {
    let output = compile_source(
        &builder(
            "fn config(&mut self, config: std::sync::Arc<dyn crate::Config>);
             fn other(&mut self, other: std::sync::Arc<dyn crate::Other>);",
        ),
        "",
    );
    assert_eq!(
        texts(&output, DiagnosticKind::Declaration),
        vec!["crate::AppBuilder has setters for modules or dependencies that aren't required: [crate::AppBuilder::other(std::sync::Arc<dyn crate::Other>)]"]
    );
}

#[test]
fn builders_may_not_set_a_dependency_twice() {
    let output = compile_source(
        &builder(
            "fn config(&mut self, config: std::sync::Arc<dyn crate::Config>);
             fn config_again(&mut self, config: std::sync::Arc<dyn crate::Config>);",
        ),
        "",
    );
    assert_eq!(
        texts(&output, DiagnosticKind::Declaration),
        vec!["crate::AppBuilder has multiple setters for crate::Config: [crate::AppBuilder::config(std::sync::Arc<dyn crate::Config>), crate::AppBuilder::config_again(std::sync::Arc<dyn crate::Config>)]"]
    );
}

#[test]
fn builder_setting_each_dependency_once_compiles() {
    let output = compile_source(
        &builder("fn config(&mut self, config: std::sync::Arc<dyn crate::Config>);"),
        "",
    );
    assert!(!output.has_errors(), "{:?}", output.diagnostics);
    assert_eq!(output.sources.len(), 1);
}

#[test]
fn components_may_have_only_one_creator() {
    let output = compile_source(
        r#"
        #[component]
        pub trait App {}

        #[component_builder(crate::App)]
        pub trait AppBuilder {
            fn build(self: Box<Self>) -> std::sync::Arc<dyn crate::App>;
        }

        #[component_factory(crate::App)]
        pub trait AppFactory {
            fn create(&mut self) -> std::sync::Arc<dyn crate::App>;
        }
        "#,
        "",
    );
    assert!(output.has_errors());
    assert!(output.sources.is_empty());
    assert_eq!(
        texts(&output, DiagnosticKind::Declaration),
        vec!["crate::App has more than one creator:\n    crate::AppBuilder\n    crate::AppFactory"]
    );
}

/// `T0` through `T{length - 1}`, each injecting the next, the last injecting the missing `Bar`.
fn injection_chain(length: usize) -> String {
    let mut source = String::new();
    for i in 0..length {
        let dependency = if i + 1 == length {
            "bar: crate::Bar".to_owned()
        } else {
            format!("next: crate::T{}", i + 1)
        };
        source.push_str(&format!(
            r#"
            pub struct T{i};
            #[injectable]
            impl T{i} {{
                #[inject]
                pub fn new({dependency}) -> Self {{ T{i} }}
            }}
            "#
        ));
    }
    source.push_str(
        r#"
        #[component]
        pub trait App {
            fn t0(&self) -> crate::T0;
        }
        "#,
    );
    source
}

#[test]
fn long_request_traces_are_truncated() {
    let output = compile_source(&injection_chain(12), "");
    let missing = texts(&output, DiagnosticKind::MissingBinding);
    assert_eq!(missing.len(), 1);
    let mut expected = vec![
        "[Dirk/MissingBinding] crate::Bar cannot be provided without an #[inject] constructor or a #[provides]-annotated method.".to_owned(),
        "    crate::Bar is injected at".to_owned(),
        "        [crate::App] crate::T11::new(bar)".to_owned(),
    ];
    for i in (3..=11).rev() {
        expected.push(format!("    crate::T{} is injected at", i));
        expected.push(format!("        [crate::App] crate::T{}::new(next)", i - 1));
    }
    expected.push("    and 3 others".to_owned());
    assert_eq!(missing[0], expected.join("\n"));
}

#[test]
fn other_entry_points_are_truncated() {
    let mut entry_points = String::new();
    for i in 0..12 {
        entry_points.push_str(&format!("fn e{i}(&self) -> crate::Foo;\n"));
    }
    let output = compile_source(
        &format!(
            r#"
            pub struct Foo;
            #[injectable]
            impl Foo {{
                #[inject]
                pub fn new(bar: crate::Bar) -> Self {{ Foo }}
            }}

            #[component]
            pub trait App {{
                {entry_points}
            }}
            "#
        ),
        "",
    );
    let missing = texts(&output, DiagnosticKind::MissingBinding);
    assert_eq!(missing.len(), 1);
    let mut expected = vec![
        "[Dirk/MissingBinding] crate::Bar cannot be provided without an #[inject] constructor or a #[provides]-annotated method.".to_owned(),
        "    crate::Bar is injected at".to_owned(),
        "        [crate::App] crate::Foo::new(bar)".to_owned(),
        "    crate::Foo is requested at".to_owned(),
        "        [crate::App] crate::App::e0()".to_owned(),
        "The following other entry points also depend on it:".to_owned(),
    ];
    for i in 1..=10 {
        expected.push(format!("    [crate::App] crate::App::e{}()", i));
    }
    expected.push("    and 1 other".to_owned());
    assert_eq!(missing[0], expected.join("\n"));
}

#[test]
fn missing_binding_lists_other_request_sites() {
    let output = compile_source(
        r#"
        pub struct Foo;
        #[injectable]
        impl Foo {
            #[inject]
            pub fn new(bar: crate::Bar) -> Self { Foo }
        }

        #[component]
        pub trait App {
            fn bar(&self) -> crate::Bar;
            fn foo(&self) -> crate::Foo;
        }
        "#,
        "",
    );
    assert_eq!(
        texts(&output, DiagnosticKind::MissingBinding),
        vec![[
            "[Dirk/MissingBinding] crate::Bar cannot be provided without an #[inject] constructor or a #[provides]-annotated method.",
            "    crate::Bar is requested at",
            "        [crate::App] crate::App::bar()",
            "It is also requested at:",
            "    [crate::App] crate::Foo::new(bar)",
            "The following other entry points also depend on it:",
            "    [crate::App] crate::App::foo()",
        ]
        .join("\n")]
    );
}
