use std::collections::HashMap;

use crate::ir::canonical::StructuralKey;

use super::node::NodeId;

/// Structural hash to node handles.
///
/// Several nodes can share a hash only when canonical-text confirmation is
/// enabled and two different subtrees collide; candidates are kept in
/// creation order so the first structural match wins.
#[derive(Debug, Default)]
pub struct DedupIndex {
    by_hash: HashMap<u64, Vec<NodeId>>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node under its key.
    pub fn insert(&mut self, key: &StructuralKey, id: NodeId) {
        self.by_hash.entry(key.hash()).or_default().push(id);
    }

    /// Nodes registered under `hash`, oldest first.
    pub fn candidates(&self, hash: u64) -> &[NodeId] {
        self.by_hash.get(&hash).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of distinct hashes.
    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }
}
