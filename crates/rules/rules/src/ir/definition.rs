use rete_core::Element;

use crate::error::NetworkError;

/// A rule as handed over by a frontend: a name, the `if` clause and the
/// opaque action.
///
/// Nothing is validated at this stage; the builder reports missing or
/// malformed pieces when it compiles the rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDefinition {
    /// A human-readable name for the rule.
    pub name: String,
    /// The `if` element. Its first child is the condition expression.
    pub if_clause: Option<Element>,
    /// The `action` element, passed through untouched.
    pub action: Option<Element>,
}

impl RuleDefinition {
    /// Create a rule whose `if` clause wraps the given condition expression.
    pub fn new(name: impl Into<String>, condition: Element) -> Self {
        Self {
            name: name.into(),
            if_clause: Some(Element::new("if").with_child(condition)),
            action: None,
        }
    }

    /// Set the action element.
    #[must_use]
    pub fn with_action(mut self, action: Element) -> Self {
        self.action = Some(action);
        self
    }

    /// Return the condition expression: the first element inside `if`.
    pub fn condition(&self) -> Result<&Element, NetworkError> {
        let if_clause = self
            .if_clause
            .as_ref()
            .ok_or_else(|| NetworkError::MissingIfClause {
                rule: self.name.clone(),
            })?;
        if_clause
            .first_child()
            .ok_or_else(|| NetworkError::EmptyCondition {
                rule: self.name.clone(),
            })
    }
}
