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

use crate::diagnostics::Severity;
use anyhow::{bail, Context, Result};

pub const FAST_INIT: &str = "dirk.fastInit";
pub const NULLABLE_VALIDATION: &str = "dirk.nullableValidation";
pub const PRIVATE_MEMBER_VALIDATION: &str = "dirk.privateMemberValidation";
pub const FULL_BINDING_GRAPH_VALIDATION: &str = "dirk.fullBindingGraphValidation";
pub const VALIDATE_TRANSITIVE_COMPONENT_DEPENDENCIES: &str =
    "dirk.validateTransitiveComponentDependencies";

/// Shape of the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodegenMode {
    /// One `*_Factory` per binding that needs a provider.
    #[default]
    Default,
    /// One switching provider per component.
    FastInit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationType {
    None,
    Error,
    Warning,
}

impl ValidationType {
    pub fn severity(&self) -> Option<Severity> {
        match self {
            ValidationType::None => None,
            ValidationType::Error => Some(Severity::Error),
            ValidationType::Warning => Some(Severity::Warning),
        }
    }

    fn parse(key: &str, value: &str, allow_none: bool) -> Result<Self> {
        match value.to_ascii_uppercase().as_str() {
            "ERROR" => Ok(ValidationType::Error),
            "WARNING" => Ok(ValidationType::Warning),
            "NONE" if allow_none => Ok(ValidationType::None),
            _ => bail!("invalid value {:?} for {}", value, key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureStatus {
    Enabled,
    Disabled,
}

impl FeatureStatus {
    fn parse(key: &str, value: &str) -> Result<Self> {
        match value.to_ascii_uppercase().as_str() {
            "ENABLED" => Ok(FeatureStatus::Enabled),
            "DISABLED" => Ok(FeatureStatus::Disabled),
            _ => bail!("invalid value {:?} for {}", value, key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    pub mode: CodegenMode,
    pub nullable_validation: ValidationType,
    pub private_member_validation: ValidationType,
    /// Validates every module and component on its own, even when nothing uses it.
    pub full_binding_graph_validation: ValidationType,
    pub validate_transitive_component_dependencies: FeatureStatus,
    /// Keys that were passed but not recognized.
    pub unrecognized: Vec<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            mode: CodegenMode::Default,
            nullable_validation: ValidationType::Error,
            private_member_validation: ValidationType::Error,
            full_binding_graph_validation: ValidationType::None,
            validate_transitive_component_dependencies: FeatureStatus::Enabled,
            unrecognized: Vec::new(),
        }
    }
}

impl CompilerOptions {
    /// Parses `key=value` pairs separated by commas or whitespace.
    pub fn parse(options: &str) -> Result<Self> {
        let mut result = CompilerOptions::default();
        for pair in options
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|pair| !pair.is_empty())
        {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("option {:?} should be key=value", pair))?;
            result.set(key.trim(), value.trim())?;
        }
        Ok(result)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            FAST_INIT => {
                self.mode = match FeatureStatus::parse(key, value)? {
                    FeatureStatus::Enabled => CodegenMode::FastInit,
                    FeatureStatus::Disabled => CodegenMode::Default,
                }
            }
            NULLABLE_VALIDATION => self.nullable_validation = ValidationType::parse(key, value, false)?,
            PRIVATE_MEMBER_VALIDATION => {
                self.private_member_validation = ValidationType::parse(key, value, false)?
            }
            FULL_BINDING_GRAPH_VALIDATION => {
                self.full_binding_graph_validation = ValidationType::parse(key, value, true)?
            }
            VALIDATE_TRANSITIVE_COMPONENT_DEPENDENCIES => {
                self.validate_transitive_component_dependencies = FeatureStatus::parse(key, value)?
            }
            _ => self.unrecognized.push(key.to_owned()),
        }
        Ok(())
    }

    pub fn fast_init(&self) -> bool {
        self.mode == CodegenMode::FastInit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = CompilerOptions::default();
        assert_eq!(options.mode, CodegenMode::Default);
        assert_eq!(options.nullable_validation, ValidationType::Error);
        assert_eq!(options.full_binding_graph_validation, ValidationType::None);
        assert_eq!(
            options.validate_transitive_component_dependencies,
            FeatureStatus::Enabled
        );
    }

    #[test]
    fn parses_pairs() {
        let options = CompilerOptions::parse(
            "dirk.fastInit=enabled, dirk.nullableValidation=WARNING,dirk.unknown=1",
        )
        .unwrap();
        assert!(options.fast_init());
        assert_eq!(options.nullable_validation, ValidationType::Warning);
        assert_eq!(options.unrecognized, vec!["dirk.unknown"]);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(CompilerOptions::parse("dirk.nullableValidation=NONE").is_err());
        assert!(CompilerOptions::parse("dirk.fastInit").is_err());
        assert!(CompilerOptions::parse("dirk.fullBindingGraphValidation=none").is_ok());
    }
}
