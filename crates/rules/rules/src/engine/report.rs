use crate::network::{BuiltRule, NodeId, ReteNetwork};

use super::token::Token;

/// A rule whose terminal node produced at least one activation.
#[derive(Debug)]
pub struct RuleMatch<'r, 'a, F> {
    /// The matched rule, including its action.
    pub rule: &'r BuiltRule,
    /// The rule's terminal node.
    pub terminal: NodeId,
    /// Activations of the terminal node.
    pub tokens: &'r [Token<'a, F>],
}

/// Outcome of running a working memory through the network.
///
/// Holds the activations of every node, indexed by node id. With
/// `max_activations_per_node` set, no node holds more than that many.
#[derive(Debug)]
pub struct MatchReport<'n, 'a, F> {
    pub(crate) network: &'n ReteNetwork,
    pub(crate) activations: Vec<Vec<Token<'a, F>>>,
}

impl<'a, F> MatchReport<'_, 'a, F> {
    /// Activations produced by `node`; empty for the root or an unknown id.
    pub fn activations(&self, node: NodeId) -> &[Token<'a, F>] {
        self.activations
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// `true` when `node` produced at least one activation.
    pub fn is_active(&self, node: NodeId) -> bool {
        !self.activations(node).is_empty()
    }

    /// Matched rules in build order.
    pub fn rule_matches(&self) -> Vec<RuleMatch<'_, 'a, F>> {
        self.network
            .rules()
            .iter()
            .filter(|rule| self.is_active(rule.terminal))
            .map(|rule| RuleMatch {
                rule,
                terminal: rule.terminal,
                tokens: self.activations(rule.terminal),
            })
            .collect()
    }

    /// Names of the matched rules in build order.
    pub fn matched_rule_names(&self) -> Vec<&str> {
        self.network
            .rules()
            .iter()
            .filter(|rule| self.is_active(rule.terminal))
            .map(|rule| rule.name.as_str())
            .collect()
    }

    /// Number of nodes that produced at least one activation.
    pub fn active_node_count(&self) -> usize {
        self.activations.iter().filter(|a| !a.is_empty()).count()
    }
}
