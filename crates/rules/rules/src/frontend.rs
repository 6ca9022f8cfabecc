//! Rule document readers.
//!
//! The network is built from [`RuleDefinition`]s, each holding a name, the
//! markup of its `if` clause and an optional action element. A frontend
//! turns one document format into that list. It does not look inside the
//! conditions; a malformed `and` or an unknown `type` is reported by the
//! builder against the rule that carries it.

use std::path::Path;

use crate::error::NetworkError;
use crate::ir::definition::RuleDefinition;

/// Reads rule definitions out of a document.
pub trait RuleFrontend: Send + Sync {
    /// File extensions this frontend reads, without the dot.
    fn extensions(&self) -> &[&str];

    /// Extract the rules of `content` in document order.
    fn parse(&self, content: &str) -> Result<Vec<RuleDefinition>, NetworkError>;

    /// Read `path` and parse its content. An unreadable file is a
    /// [`NetworkError::Parse`] naming the path.
    fn parse_file(&self, path: &Path) -> Result<Vec<RuleDefinition>, NetworkError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NetworkError::Parse(format!("cannot read {}: {e}", path.display())))?;
        self.parse(&content)
    }
}
