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

use dirk_common::manifest::Location;
use std::fmt::{Display, Formatter};

/// Entries listed in grouped diagnostics before "and N others".
pub const MAX_LISTED: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    /// Malformed declarations, reported without a tag.
    Declaration,
    MissingBinding,
    DuplicateBindings,
    DependencyCycle,
    ComponentDependencyCycle,
    ComponentHierarchyCycle,
    IncompatiblyScopedBindings,
    Nullable,
}

impl DiagnosticKind {
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            DiagnosticKind::Declaration => None,
            DiagnosticKind::MissingBinding => Some("Dirk/MissingBinding"),
            DiagnosticKind::DuplicateBindings => Some("Dirk/DuplicateBindings"),
            DiagnosticKind::DependencyCycle => Some("Dirk/DependencyCycle"),
            DiagnosticKind::ComponentDependencyCycle => Some("Dirk/ComponentDependencyCycle"),
            DiagnosticKind::ComponentHierarchyCycle => Some("Dirk/ComponentHierarchyCycle"),
            DiagnosticKind::IncompatiblyScopedBindings => Some("Dirk/IncompatiblyScopedBindings"),
            DiagnosticKind::Nullable => Some("Dirk/Nullable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// The element the diagnostic is attached to, e.g. `crate::App`.
    pub element: String,
    pub message: String,
    pub location: Location,
}

impl Diagnostic {
    /// The message with its bracketed tag.
    pub fn text(&self) -> String {
        match self.kind.tag() {
            Some(tag) => format!("[{}] {}", tag, self.message),
            None => self.message.clone(),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.location.file.is_empty() {
            write!(f, "{}: ", self.location)?;
        }
        write!(f, "{}: {}", self.severity, self.text())
    }
}

#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        severity: Severity,
        location: &Location,
        element: &str,
        message: String,
    ) {
        self.items.push(Diagnostic {
            kind,
            severity,
            element: element.to_owned(),
            message,
            location: location.clone(),
        });
    }

    pub fn error(&mut self, kind: DiagnosticKind, location: &Location, element: &str, message: String) {
        self.report(kind, Severity::Error, location, element, message)
    }

    pub fn declaration_error(&mut self, location: &Location, element: &str, message: String) {
        self.error(DiagnosticKind::Declaration, location, element, message)
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Sorted by location and text, with exact duplicates removed.
    pub fn into_sorted(self) -> Vec<Diagnostic> {
        let mut items = self.items;
        items.sort_by(|a, b| {
            (&a.location, a.severity, a.text()).cmp(&(&b.location, b.severity, b.text()))
        });
        items.dedup();
        items
    }
}

/// Lines for a truncated listing: the first [`MAX_LISTED`] entries and an "and N other(s)" line.
pub fn truncated_lines(entries: &[String]) -> Vec<String> {
    let mut result: Vec<String> = entries.iter().take(MAX_LISTED).cloned().collect();
    if entries.len() > MAX_LISTED {
        result.push(and_others(entries.len() - MAX_LISTED));
    }
    result
}

pub fn and_others(count: usize) -> String {
    if count == 1 {
        "and 1 other".to_owned()
    } else {
        format!("and {} others", count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_after_ten() {
        let entries: Vec<String> = (0..12).map(|i| i.to_string()).collect();
        let lines = truncated_lines(&entries);
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[10], "and 2 others");
        let entries: Vec<String> = (0..11).map(|i| i.to_string()).collect();
        assert_eq!(truncated_lines(&entries)[10], "and 1 other");
        assert_eq!(truncated_lines(&entries[..10]).len(), 10);
    }

    #[test]
    fn sorts_and_deduplicates() {
        let mut diagnostics = Diagnostics::new();
        let b = Location::new("lib.rs", 20);
        let a = Location::new("lib.rs", 3);
        diagnostics.error(DiagnosticKind::MissingBinding, &b, "crate::App", "x".to_owned());
        diagnostics.error(DiagnosticKind::Declaration, &a, "crate::Foo", "y".to_owned());
        diagnostics.error(DiagnosticKind::MissingBinding, &b, "crate::App", "x".to_owned());
        let sorted = diagnostics.into_sorted();
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].text(), "y");
        assert_eq!(sorted[1].to_string(), "lib.rs:20: error: [Dirk/MissingBinding] x");
    }
}
