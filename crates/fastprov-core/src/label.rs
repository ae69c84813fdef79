//! Capability labels.
//!
//! A label is a conjunction of whitespace-separated atoms: `"linux docker"`
//! is only served by a pool that offers both `linux` and `docker`. The
//! absence of a label (`Option<&Label>::None`) means unlabeled work that
//! any pool willing to take unlabeled work may serve.

use std::collections::BTreeSet;
use std::fmt;

/// A normalized set of capability atoms.
///
/// Atom order in the source expression does not matter, so
/// `"docker linux"` and `"linux docker"` are the same label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
    atoms: BTreeSet<String>,
}

impl Label {
    /// Parse a label expression. Returns `None` for a blank expression.
    pub fn parse(expr: &str) -> Option<Self> {
        let atoms: BTreeSet<String> = expr.split_whitespace().map(str::to_string).collect();
        if atoms.is_empty() {
            None
        } else {
            Some(Self { atoms })
        }
    }

    /// Whether every atom of this label is offered by `tags`.
    pub fn matches(&self, tags: &BTreeSet<String>) -> bool {
        self.atoms.is_subset(tags)
    }

    /// Human-readable form of an optional label, for logs.
    pub fn describe(label: Option<&Label>) -> String {
        match label {
            Some(l) => l.to_string(),
            None => "<unlabeled>".to_string(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for atom in &self.atoms {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(atom)?;
            first = false;
        }
        Ok(())
    }
}
