//! The discrimination network graph.
//!
//! All nodes live in one arena owned by [`ReteNetwork`] and refer to each
//! other through [`NodeId`] handles. Nodes are only ever added; the graph is
//! built once and then read by the matcher.

pub mod dedup;
pub mod node;

use rete_core::Element;

use crate::config::NetworkConfig;
use crate::ir::canonical::StructuralKey;
use crate::ir::condition::Condition;

pub use dedup::DedupIndex;
pub use node::{JoinNode, JoinOp, Node, NodeId, NodeKind, PatternNode};

/// A rule attached to the network: its name, the node that decides whether
/// it applies, and its uninterpreted action.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRule {
    /// The rule name.
    pub name: String,
    /// The node produced for the rule's top-level condition.
    pub terminal: NodeId,
    /// The `action` element, if the rule had one.
    pub action: Option<Element>,
}

/// The shared pattern/join graph rooted at a single entry node.
#[derive(Debug)]
pub struct ReteNetwork {
    config: NetworkConfig,
    nodes: Vec<Node>,
    index: DedupIndex,
    rules: Vec<BuiltRule>,
}

impl Default for ReteNetwork {
    fn default() -> Self {
        Self::with_config(NetworkConfig::default())
    }
}

impl ReteNetwork {
    /// Create a network holding only the root, with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a network holding only the root.
    pub fn with_config(config: NetworkConfig) -> Self {
        let root = Node {
            id: NodeId::ROOT,
            kind: NodeKind::Root,
            successors: Vec::new(),
            predecessors: Vec::new(),
        };
        Self {
            config,
            nodes: vec![root],
            index: DedupIndex::new(),
            rules: Vec::new(),
        }
    }

    /// The options the network was built with.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// The entry node.
    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.0]
    }

    /// Look up a node by handle.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Successors of `id`; empty for an unknown handle.
    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::successors).unwrap_or_default()
    }

    /// Predecessors of `id`; empty for the root or an unknown handle.
    pub fn predecessors(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::predecessors).unwrap_or_default()
    }

    /// All nodes in creation order, root first.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_pattern()).count()
    }

    pub fn join_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_join()).count()
    }

    /// Find an existing node structurally equal to `key`.
    ///
    /// With `confirm_canonical_text` enabled a hash hit only counts when
    /// the canonical texts agree too; otherwise the first node with the
    /// same hash is returned.
    pub fn find_by_key(&self, key: &StructuralKey) -> Option<NodeId> {
        self.index
            .candidates(key.hash())
            .iter()
            .copied()
            .find(|&id| {
                !self.config.confirm_canonical_text
                    || self.nodes[id.0]
                        .key()
                        .is_some_and(|k| k.canonical() == key.canonical())
            })
    }

    /// Add a pattern node as a successor of the root.
    pub(crate) fn add_pattern(&mut self, key: StructuralKey, condition: Condition) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.index.insert(&key, id);
        self.nodes.push(Node {
            id,
            kind: NodeKind::Pattern(PatternNode { condition, key }),
            successors: Vec::new(),
            predecessors: vec![NodeId::ROOT],
        });
        self.nodes[NodeId::ROOT.0].successors.push(id);
        id
    }

    /// Add a join node reading from `operands` and link it as their
    /// successor. Operands must already exist.
    pub(crate) fn add_join(
        &mut self,
        key: StructuralKey,
        op: JoinOp,
        operands: Vec<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.index.insert(&key, id);
        for &operand in &operands {
            let successors = &mut self.nodes[operand.0].successors;
            if !successors.contains(&id) {
                successors.push(id);
            }
        }
        self.nodes.push(Node {
            id,
            kind: NodeKind::Join(JoinNode {
                op,
                operands: operands.clone(),
                key,
            }),
            successors: Vec::new(),
            predecessors: operands,
        });
        id
    }

    pub(crate) fn attach_rule(&mut self, rule: BuiltRule) {
        self.rules.push(rule);
    }

    /// Rules attached to the network, in build order.
    pub fn rules(&self) -> &[BuiltRule] {
        &self.rules
    }

    /// Rules whose terminal node is `terminal`.
    pub fn rules_at(&self, terminal: NodeId) -> impl Iterator<Item = &BuiltRule> {
        self.rules.iter().filter(move |r| r.terminal == terminal)
    }

    /// Every node reachable from the root through successor edges, in
    /// depth-first pre-order, each listed once.
    pub fn reachable(&self) -> Vec<NodeId> {
        let mut seen = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut seen[id.0], true) {
                continue;
            }
            order.push(id);
            stack.extend(self.nodes[id.0].successors.iter().rev());
        }
        order
    }
}
