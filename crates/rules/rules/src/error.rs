use rete_core::CoreError;
use thiserror::Error;

/// Errors that can occur while loading rule definitions or building the
/// discrimination network.
///
/// Matching never fails: a fact that satisfies no condition simply does not
/// match.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The rule has no `if` clause.
    #[error("rule '{rule}' has no if clause")]
    MissingIfClause {
        /// Name of the offending rule.
        rule: String,
    },

    /// The `if` clause contains no condition element.
    #[error("rule '{rule}' has an empty if clause")]
    EmptyCondition {
        /// Name of the offending rule.
        rule: String,
    },

    /// A boolean operator has the wrong number of operands.
    #[error("operator '{operator}' expects {expected} operand(s), found {found}")]
    OperatorArity {
        /// The operator tag (`and`, `or`, `not`).
        operator: String,
        /// Required operand count.
        expected: usize,
        /// Operand count present in the definition.
        found: usize,
    },

    /// A leaf declares a `type` the network does not know how to match.
    #[error("unsupported condition type '{type_name}' on <{element}>")]
    UnsupportedConditionType {
        /// Tag of the leaf element.
        element: String,
        /// The declared type.
        type_name: String,
    },

    /// A numeric bound could not be parsed.
    #[error("invalid numeric bound '{text}' on <{element}>")]
    InvalidNumber {
        /// Tag of the leaf element.
        element: String,
        /// The offending text content.
        text: String,
    },

    /// The lower bound of a numeric range exceeds the upper bound.
    #[error("invalid range [{min}, {max}] on <{element}>")]
    InvalidRange {
        /// Tag of the leaf element.
        element: String,
        /// Lower bound as written.
        min: String,
        /// Upper bound as written.
        max: String,
    },

    /// Any construction error, tagged with the rule that caused it.
    #[error("rule '{rule}': {source}")]
    InRule {
        /// Name of the offending rule.
        rule: String,
        /// The underlying error.
        #[source]
        source: Box<NetworkError>,
    },

    /// A rule document could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid network configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl NetworkError {
    /// Attach the rule name to an error, unless it already names a rule.
    pub(crate) fn in_rule(self, rule: &str) -> Self {
        match self {
            Self::MissingIfClause { .. } | Self::EmptyCondition { .. } | Self::InRule { .. } => {
                self
            }
            other => Self::InRule {
                rule: rule.to_owned(),
                source: Box::new(other),
            },
        }
    }

    /// The name of the rule this error refers to, if known.
    pub fn rule(&self) -> Option<&str> {
        match self {
            Self::MissingIfClause { rule }
            | Self::EmptyCondition { rule }
            | Self::InRule { rule, .. } => Some(rule),
            _ => None,
        }
    }
}

impl From<CoreError> for NetworkError {
    fn from(err: CoreError) -> Self {
        Self::Parse(err.to_string())
    }
}
