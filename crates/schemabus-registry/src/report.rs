use std::fmt;

use serde::{Deserialize, Serialize};

/// One constraint a document failed to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub message: String,
}

/// Everything an engine found wrong with a document.
///
/// An empty report means the document conforms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConformanceReport {
    violations: Vec<Violation>,
    omitted: usize,
}

impl ConformanceReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            violations: messages
                .into_iter()
                .map(|message| Violation {
                    message: message.into(),
                })
                .collect(),
            omitted: 0,
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.violations.push(Violation {
            message: message.into(),
        });
    }

    pub fn is_conforming(&self) -> bool {
        self.violations.is_empty() && self.omitted == 0
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violations dropped by [`ConformanceReport::truncate`].
    pub fn omitted(&self) -> usize {
        self.omitted
    }

    /// Total violations found, including omitted ones.
    pub fn total(&self) -> usize {
        self.violations.len() + self.omitted
    }

    /// Keep at most `limit` violations, counting the rest as omitted.
    pub fn truncate(&mut self, limit: usize) {
        if self.violations.len() > limit {
            self.omitted += self.violations.len() - limit;
            self.violations.truncate(limit);
        }
    }
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_conforming() {
            return write!(f, "document conforms to schema");
        }

        write!(
            f,
            "document does not conform to schema ({} violation{})",
            self.total(),
            if self.total() == 1 { "" } else { "s" }
        )?;
        for (index, violation) in self.violations.iter().enumerate() {
            write!(f, "\n  {}: {}", index + 1, violation.message)?;
        }
        if self.omitted > 0 {
            write!(f, "\n  ... {} more omitted", self.omitted)?;
        }
        Ok(())
    }
}
