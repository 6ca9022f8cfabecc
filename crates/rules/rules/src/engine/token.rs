use rete_core::{FactId, FactNode};

use crate::ir::condition::BindingList;

/// One activation flowing through the network: the top-level facts that
/// produced it and the leaf bindings collected on the way.
#[derive(Debug)]
pub struct Token<'a, F> {
    /// Matched top-level facts, left operand first.
    pub facts: Vec<&'a F>,
    /// Leaf fact identifiers in match order.
    pub bindings: BindingList,
}

impl<F> Clone for Token<'_, F> {
    fn clone(&self) -> Self {
        Self {
            facts: self.facts.clone(),
            bindings: self.bindings.clone(),
        }
    }
}

impl<'a, F> Token<'a, F> {
    /// The activation a negation emits: no facts, no bindings.
    pub fn empty() -> Self {
        Self {
            facts: Vec::new(),
            bindings: BindingList::new(),
        }
    }

    /// A single-fact activation.
    pub fn single(fact: &'a F, bindings: BindingList) -> Self {
        Self {
            facts: vec![fact],
            bindings,
        }
    }

    /// Concatenate two activations, `self` first.
    pub fn merge(&self, other: &Self) -> Self {
        let mut facts = Vec::with_capacity(self.facts.len() + other.facts.len());
        facts.extend_from_slice(&self.facts);
        facts.extend_from_slice(&other.facts);
        let mut bindings = Vec::with_capacity(self.bindings.len() + other.bindings.len());
        bindings.extend_from_slice(&self.bindings);
        bindings.extend_from_slice(&other.bindings);
        Self { facts, bindings }
    }

    /// `true` for the activation emitted by a negation.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty() && self.bindings.is_empty()
    }
}

impl<F: FactNode> Token<'_, F> {
    /// Identifiers of the matched top-level facts that carry one.
    pub fn fact_ids(&self) -> Vec<FactId> {
        self.facts.iter().filter_map(|f| f.unique_id()).collect()
    }
}
