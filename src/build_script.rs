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

//! Drives the dirk compiler from a
//! [cargo build script](https://doc.rust-lang.org/cargo/reference/build-scripts.html).
//!
//! ```no_run
//! // build.rs
//! fn main() {
//!     dirk::build_script::generate();
//! }
//! ```
//!
//! The crate is scanned twice, with and without `cfg(test)`, and
//! [`include_components!()`](crate::include_components) picks the matching output.

use anyhow::{Context, Result};
use dirk_common::manifest_parser::{parse_crate, source_files};
use dirk_common::{build_script_fatal, log, log_error};
use dirk_compiler::diagnostics::Severity;
use dirk_compiler::options::CompilerOptions;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Environment variable holding comma separated `key=value` compiler options.
pub const OPTIONS_ENV: &str = "DIRK_OPTIONS";
pub const GENERATED_FILE: &str = "dirk_components.rs";
pub const GENERATED_TEST_FILE: &str = "dirk_components_test.rs";
/// JSON dump of the declarations found outside `cfg(test)`.
pub const MANIFEST_FILE: &str = "dirk_manifest.json";

/// Generates the components of the crate being built with the default settings. Fails the build
/// when the dependency graph has errors.
pub fn generate() {
    Builder::new().generate()
}

#[derive(Debug, Default)]
pub struct Builder {
    options: Vec<(String, String)>,
    source_root: Option<PathBuf>,
    out_dir: Option<PathBuf>,
}

impl Builder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets a compiler option, e.g. `.option("dirk.fastInit", "enabled")`. Takes precedence over
    /// `DIRK_OPTIONS`.
    pub fn option(mut self, key: &str, value: &str) -> Self {
        self.options.push((key.to_owned(), value.to_owned()));
        self
    }

    /// The crate root file. Defaults to `src/lib.rs`, or `src/main.rs` if there is no `lib.rs`.
    pub fn source_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_root = Some(path.into());
        self
    }

    /// Where generated files are written. Defaults to `OUT_DIR`.
    pub fn out_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(path.into());
        self
    }

    pub fn generate(self) {
        if let Err(e) = self.try_generate() {
            log_error!("{:#}", e);
            std::process::exit(1);
        }
    }

    pub fn try_generate(self) -> Result<()> {
        let options = self.compiler_options()?;
        let source_root = match self.source_root {
            Some(ref path) => path.clone(),
            None => default_source_root()?,
        };
        let out_dir = match self.out_dir {
            Some(ref path) => path.clone(),
            None => PathBuf::from(std::env::var("OUT_DIR").with_context(|| "OUT_DIR is not set")?),
        };
        println!("cargo::rerun-if-env-changed={}", OPTIONS_ENV);

        let mut watched = HashSet::new();
        let mut reported = HashSet::new();
        let mut failed = false;
        for (cfg_test, file_name) in [(false, GENERATED_FILE), (true, GENERATED_TEST_FILE)] {
            for file in source_files(&source_root, cfg_test)? {
                if watched.insert(file.clone()) {
                    println!("cargo::rerun-if-changed={}", file.display());
                }
            }
            let manifest = parse_crate(&source_root, cfg_test)?;
            if !cfg_test {
                write(&out_dir.join(MANIFEST_FILE), &manifest.to_json()?)?;
            }

            let output = dirk_compiler::compile(manifest, &options)?;
            for diagnostic in &output.diagnostics {
                if !reported.insert(diagnostic.to_string()) {
                    continue;
                }
                match diagnostic.severity {
                    Severity::Error => log_error!("{}", diagnostic),
                    Severity::Warning => log!("{}", diagnostic),
                }
            }
            if output.has_errors() {
                failed = true;
                continue;
            }
            write(&out_dir.join(file_name), &output.combined_source())?;
        }
        if failed {
            build_script_fatal!("dirk found errors in the dependency graph");
        }
        Ok(())
    }

    fn compiler_options(&self) -> Result<CompilerOptions> {
        let mut options = match std::env::var(OPTIONS_ENV) {
            Ok(value) => CompilerOptions::parse(&value)
                .with_context(|| format!("invalid {}", OPTIONS_ENV))?,
            Err(_) => CompilerOptions::default(),
        };
        for (key, value) in &self.options {
            options.set(key, value)?;
        }
        Ok(options)
    }
}

fn default_source_root() -> Result<PathBuf> {
    let manifest_dir = PathBuf::from(
        std::env::var("CARGO_MANIFEST_DIR").with_context(|| "CARGO_MANIFEST_DIR is not set")?,
    );
    let lib = manifest_dir.join("src").join("lib.rs");
    if lib.exists() {
        return Ok(lib);
    }
    Ok(manifest_dir.join("src").join("main.rs"))
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("cannot write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dirk_build_script_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(dir.join("src")).unwrap();
        dir
    }

    #[test]
    fn writes_components_and_manifest() {
        let dir = temp_dir("writes");
        std::fs::write(
            dir.join("src/lib.rs"),
            r#"
            pub struct Foo;
            #[dirk::injectable]
            impl Foo {
                #[inject]
                pub fn new() -> Self { Foo }
            }

            #[dirk::component]
            pub trait App {
                fn foo(&self) -> crate::Foo;
            }

            #[cfg(test)]
            mod tests {
                #[dirk::component]
                pub trait TestApp {
                    fn foo(&self) -> crate::Foo;
                }
            }
            "#,
        )
        .unwrap();
        Builder::new()
            .source_root(dir.join("src/lib.rs"))
            .out_dir(&dir)
            .try_generate()
            .unwrap();

        let generated = std::fs::read_to_string(dir.join(GENERATED_FILE)).unwrap();
        assert!(generated.contains("DirkApp"), "{}", generated);
        assert!(!generated.contains("DirkTestApp"), "{}", generated);
        let generated_test = std::fs::read_to_string(dir.join(GENERATED_TEST_FILE)).unwrap();
        assert!(generated_test.contains("DirkTestApp"), "{}", generated_test);

        let manifest = dirk_common::manifest::Manifest::from_json(
            &std::fs::read_to_string(dir.join(MANIFEST_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest.components.len(), 1);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn graph_errors_fail() {
        let dir = temp_dir("fails");
        std::fs::write(
            dir.join("src/lib.rs"),
            r#"
            #[dirk::component]
            pub trait App {
                fn foo(&self) -> crate::Foo;
            }
            "#,
        )
        .unwrap();
        let result = Builder::new()
            .source_root(dir.join("src/lib.rs"))
            .out_dir(&dir)
            .try_generate();
        assert!(result.is_err());
        assert!(!dir.join(GENERATED_FILE).exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn warnings_do_not_fail() {
        let dir = temp_dir("warns");
        std::fs::write(
            dir.join("src/lib.rs"),
            r#"
            #[dirk::component]
            pub trait App {}
            "#,
        )
        .unwrap();
        Builder::new()
            .option("dirk.notAnOption", "1")
            .source_root(dir.join("src/lib.rs"))
            .out_dir(&dir)
            .try_generate()
            .unwrap();
        assert!(dir.join(GENERATED_FILE).exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn builder_options_override_defaults() {
        let options = Builder::new()
            .option("dirk.fastInit", "enabled")
            .compiler_options()
            .unwrap();
        assert!(options.fast_init());
    }
}
