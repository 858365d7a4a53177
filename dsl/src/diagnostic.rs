//! Provides the definition for diagnostics, which are errors associated
//! with analyzing a program.
//!
//! There exist crates that make this easy, but the output contract here is
//! fixed: one line per error, prefixed by `<filename>:<line>: ` when a
//! position is known, because downstream tooling parses that prefix.

use core::fmt;

use coolc_problems::Problem;

use crate::core::FileId;

/// The position a diagnostic refers to.
///
/// The serialized tree only carries line numbers, so there is no column or
/// byte-offset information to preserve.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub file: FileId,
    pub line: u32,
}

/// A diagnostic: a stable problem code, a formatted one-line message, and
/// possibly a location.
///
/// Structural diagnostics that refer to the whole program (for example a
/// missing `Main` class) have no location.
#[derive(Debug)]
pub struct Diagnostic {
    /// A normally unique value describing the type of diagnostic.
    pub code: &'static str,

    /// The rendered message for this particular instance.
    pub message: String,

    /// Where the diagnostic points, when a position is known.
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Creates a diagnostic from the problem code with the given message.
    pub fn problem(problem: Problem, message: impl Into<String>) -> Self {
        Self {
            code: problem.code(),
            message: message.into(),
            location: None,
        }
    }

    /// Associates the diagnostic with a file and line.
    pub fn with_location(mut self, file: FileId, line: u32) -> Self {
        self.location = Some(Location { file, line });
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}:{}: {}", location.file, location.line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_when_located_then_prefixes_file_and_line() {
        let diagnostic = Diagnostic::problem(Problem::UnboundIdentifier, "Identifier not defined")
            .with_location(FileId::from_string("hello.cl"), 12);
        assert_eq!(format!("{diagnostic}"), "hello.cl:12: Identifier not defined");
    }

    #[test]
    fn display_when_no_location_then_message_only() {
        let diagnostic = Diagnostic::problem(Problem::MainNotDefined, "Class Main is not defined.");
        assert_eq!(format!("{diagnostic}"), "Class Main is not defined.");
        assert_eq!(diagnostic.code, "S007");
    }
}
