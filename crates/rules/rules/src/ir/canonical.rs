//! Canonical text and structural hashes of condition subtrees.
//!
//! Two condition definitions are structurally equal when their canonical
//! texts are equal. The canonical text is the element printed as markup,
//! then stripped of layout:
//!
//! - newline, tab and carriage return are always removed;
//! - a space is removed unless the next character is an ASCII digit.
//!
//! The second rule keeps digit separators inside numeric bounds
//! (`"1 5"` stays distinct from `"15"`) while dropping attribute and
//! indentation spaces.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use rete_core::Element;

use crate::error::NetworkError;

/// Strip layout whitespace from printed markup.
pub fn canonicalize(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut chars = markup.chars().peekable();
    while let Some(c) = chars.next() {
        let redundant = match c {
            '\n' | '\t' | '\r' => true,
            ' ' => !chars.peek().is_some_and(char::is_ascii_digit),
            _ => false,
        };
        if !redundant {
            out.push(c);
        }
    }
    out
}

/// Hash canonical text with the standard library's general-purpose hasher.
pub fn hash_text(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Structural identity of a condition subtree: canonical text plus its hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructuralKey {
    hash: u64,
    canonical: String,
}

impl StructuralKey {
    /// Compute the key of an element subtree.
    pub fn of(element: &Element) -> Result<Self, NetworkError> {
        let markup = element.to_markup()?;
        Ok(Self::from_canonical(canonicalize(&markup)))
    }

    /// Build a key from text that is already canonical.
    pub fn from_canonical(canonical: impl Into<String>) -> Self {
        let canonical = canonical.into();
        Self {
            hash: hash_text(&canonical),
            canonical,
        }
    }

    /// A key with an arbitrary hash, for exercising collisions.
    #[cfg(test)]
    pub(crate) fn with_hash(hash: u64, canonical: impl Into<String>) -> Self {
        Self {
            hash,
            canonical: canonical.into(),
        }
    }

    /// The 64-bit structural hash.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// The canonical text.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for StructuralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.hash)
    }
}
