//! The matching engine.
//!
//! A run tests every pattern node against the working memory, then
//! threads the resulting activations through the join nodes. Nodes are
//! evaluated in ascending id order, which is a topological order of the
//! graph, and each node broadcasts its activations to the input slots of
//! its successors. Matching only reads the network, so one network can
//! serve any number of runs.

mod join;
mod pattern;
pub mod report;
pub mod token;

use rete_core::FactNode;
use tracing::{Level, debug, enabled, instrument, warn};

use crate::network::{NodeKind, ReteNetwork};

pub use report::{MatchReport, RuleMatch};
pub use token::Token;

/// Runs working memories through a built network.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'n> {
    network: &'n ReteNetwork,
}

impl<'n> Matcher<'n> {
    pub fn new(network: &'n ReteNetwork) -> Self {
        Self { network }
    }

    /// Match `facts` against every node of the network.
    #[instrument(skip_all, fields(facts_count = facts.len(), nodes_count = self.network.node_count()))]
    pub fn run<'a, F: FactNode>(&self, facts: &'a [F]) -> MatchReport<'n, 'a, F> {
        let nodes = self.network.nodes();
        let config = self.network.config();
        let limit = config.activation_limit();

        // One input list per predecessor slot.
        let mut inbox: Vec<Vec<Vec<Token<'a, F>>>> = nodes
            .iter()
            .map(|n| n.predecessors().iter().map(|_| Vec::new()).collect())
            .collect();
        let mut activations: Vec<Vec<Token<'a, F>>> = Vec::with_capacity(nodes.len());

        for node in nodes {
            let produced = match node.kind() {
                NodeKind::Root => Vec::new(),
                NodeKind::Pattern(pattern) => pattern.activate(facts, config),
                NodeKind::Join(join) => {
                    let inputs = std::mem::take(&mut inbox[node.id().index()]);
                    join.combine(&inputs, limit)
                }
            };
            if limit != usize::MAX && produced.len() == limit {
                warn!(node = %node.id(), limit, "activation limit reached");
            }

            if !produced.is_empty() {
                for &successor in node.successors() {
                    let slots = nodes[successor.index()].predecessors();
                    for (slot, &pred) in slots.iter().enumerate() {
                        if pred == node.id() {
                            inbox[successor.index()][slot].clone_from(&produced);
                        }
                    }
                }
            }
            activations.push(produced);
        }

        let report = MatchReport {
            network: self.network,
            activations,
        };
        if enabled!(Level::DEBUG) {
            for matched in report.rule_matches() {
                debug!(
                    rule = %matched.rule.name,
                    terminal = %matched.terminal,
                    tokens = matched.tokens.len(),
                    "rule activated"
                );
            }
        }
        report
    }
}
