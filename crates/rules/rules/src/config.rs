use std::path::Path;

use serde::Deserialize;

use crate::error::NetworkError;

/// What the builder does when a rule definition is malformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRulePolicy {
    /// Stop at the first invalid rule and return its error.
    #[default]
    FailFast,
    /// Log the invalid rule, record it in the build report and continue.
    Skip,
}

/// Network construction and matching options.
///
/// # Example
///
/// ```toml
/// invalid_rules = "skip"
/// confirm_canonical_text = true
/// wildcard_tokens = ["_", "any"]
/// max_activations_per_node = 10000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Policy for malformed rule definitions.
    pub invalid_rules: InvalidRulePolicy,
    /// Compare canonical text on every hash hit before sharing a node.
    ///
    /// With this disabled, two different subtrees whose hashes collide end
    /// up sharing one node.
    pub confirm_canonical_text: bool,
    /// Leaf names that match any fact name.
    pub wildcard_tokens: Vec<String>,
    /// Upper bound on the activations one node keeps per run.
    ///
    /// AND joins pair every left activation with every right one, so
    /// nested conjunctions grow multiplicatively with the working memory.
    /// Activations past the bound are dropped. Unbounded when absent.
    pub max_activations_per_node: Option<usize>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            invalid_rules: InvalidRulePolicy::FailFast,
            confirm_canonical_text: true,
            wildcard_tokens: vec!["_".to_owned()],
            max_activations_per_node: None,
        }
    }
}

impl NetworkConfig {
    /// Parse a configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, NetworkError> {
        toml::from_str(content).map_err(|e| NetworkError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, NetworkError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NetworkError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// The activation bound, `usize::MAX` when unbounded.
    pub fn activation_limit(&self) -> usize {
        self.max_activations_per_node.unwrap_or(usize::MAX)
    }

    /// `true` when `name` is one of the configured wildcard tokens.
    pub fn is_wildcard(&self, name: &str) -> bool {
        self.wildcard_tokens.iter().any(|t| t == name)
    }
}
