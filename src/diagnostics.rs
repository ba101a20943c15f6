/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Diagnostics accumulated across the pipeline. Every stage returns its own
//! list; errors suppress output emission at the end but never stop a stage
//! from finishing, so one run reports everything it can find.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Note => "NOTE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub line: Option<usize>,
    pub col: Option<usize>,
    pub hint: Option<String>,
    pub file: Option<String>,
}

pub fn error(message: impl Into<String>) -> Diagnostic {
    Diagnostic::new(Severity::Error, message)
}

pub fn warning(message: impl Into<String>) -> Diagnostic {
    Diagnostic::new(Severity::Warning, message)
}

pub fn note(message: impl Into<String>) -> Diagnostic {
    Diagnostic::new(Severity::Note, message)
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            line: None,
            col: None,
            hint: None,
            file: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn at(mut self, line: usize, col: usize) -> Self {
        self.line = Some(line);
        self.col = Some(col);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    /// `file:line[:col]: SEV: message[  (hint: H)]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut loc = String::new();
        if let Some(file) = &self.file {
            loc.push_str(file);
            loc.push(':');
        }
        if let Some(line) = self.line {
            loc.push_str(&line.to_string());
            if let Some(col) = self.col {
                loc.push(':');
                loc.push_str(&col.to_string());
            }
        }
        if !loc.is_empty() {
            loc.push_str(": ");
        }
        write!(f, "{loc}{}: {}", self.severity.label(), self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "  (hint: {hint})")?;
        }
        Ok(())
    }
}

/// True if any diagnostic in the list is error severity.
pub fn has_errors(diags: &[Diagnostic]) -> bool {
    diags.iter().any(Diagnostic::is_error)
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_location() {
        let d = error("bad operand").at(3, 7).in_file("prog.s");
        assert_eq!(d.to_string(), "prog.s:3:7: ERROR: bad operand");
    }

    #[test]
    fn test_line_only() {
        let d = warning("suspicious label").at_line(12);
        assert_eq!(d.to_string(), "12: WARNING: suspicious label");
    }

    #[test]
    fn test_bare_note_with_hint() {
        let d = note("unused symbol").with_hint("remove it");
        assert_eq!(d.to_string(), "NOTE: unused symbol  (hint: remove it)");
    }

    #[test]
    fn test_has_errors() {
        assert!(!has_errors(&[warning("w"), note("n")]));
        assert!(has_errors(&[warning("w"), error("e")]));
        assert!(!has_errors(&[]));
    }
}
