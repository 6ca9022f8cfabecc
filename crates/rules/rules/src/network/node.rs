use std::fmt;

use crate::ir::canonical::StructuralKey;
use crate::ir::condition::Condition;

/// Handle of a node inside a [`ReteNetwork`](super::ReteNetwork).
///
/// Handles are allocated in creation order and never reused. A node is
/// always created after the nodes it reads from, so ascending handle order
/// is a topological order of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The unique entry node.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the network's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Boolean operator of a join node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinOp {
    /// Both operands matched.
    And,
    /// At least one operand matched.
    Or,
    /// The single operand did not match.
    Not,
}

impl JoinOp {
    /// Map a condition tag (`and`, `or`, `not`) to its operator.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "not" => Some(Self::Not),
            _ => None,
        }
    }

    /// Number of operands the operator takes.
    pub fn arity(self) -> usize {
        match self {
            Self::And | Self::Or => 2,
            Self::Not => 1,
        }
    }

    /// The condition tag for this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        }
    }
}

impl fmt::Display for JoinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alpha node: tests raw facts against one condition tree.
#[derive(Debug)]
pub struct PatternNode {
    pub(crate) condition: Condition,
    pub(crate) key: StructuralKey,
}

impl PatternNode {
    /// The condition tree owned by this node.
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// The structural key of the defining subtree.
    pub fn key(&self) -> &StructuralKey {
        &self.key
    }
}

/// A beta node: combines the activations of its operands.
#[derive(Debug)]
pub struct JoinNode {
    pub(crate) op: JoinOp,
    pub(crate) operands: Vec<NodeId>,
    pub(crate) key: StructuralKey,
}

impl JoinNode {
    /// The boolean operator.
    pub fn op(&self) -> JoinOp {
        self.op
    }

    /// Operand nodes in document order (left, then right).
    pub fn operands(&self) -> &[NodeId] {
        &self.operands
    }

    /// The structural key of the defining subtree.
    pub fn key(&self) -> &StructuralKey {
        &self.key
    }
}

/// The variant-specific part of a network node.
#[derive(Debug)]
pub enum NodeKind {
    /// The entry point; every pattern node hangs off it.
    Root,
    /// An alpha node.
    Pattern(PatternNode),
    /// A beta node.
    Join(JoinNode),
}

/// A node of the discrimination network with its edges.
#[derive(Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) successors: Vec<NodeId>,
    pub(crate) predecessors: Vec<NodeId>,
}

impl Node {
    /// This node's handle.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The variant-specific data.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Nodes that receive this node's activations, in link order.
    pub fn successors(&self) -> &[NodeId] {
        &self.successors
    }

    /// Nodes this node reads from. For joins this is one entry per operand
    /// slot, so a node used as both operands appears twice.
    pub fn predecessors(&self) -> &[NodeId] {
        &self.predecessors
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root)
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self.kind, NodeKind::Pattern(_))
    }

    pub fn is_join(&self) -> bool {
        matches!(self.kind, NodeKind::Join(_))
    }

    /// The structural key, `None` for the root.
    pub fn key(&self) -> Option<&StructuralKey> {
        match &self.kind {
            NodeKind::Root => None,
            NodeKind::Pattern(p) => Some(&p.key),
            NodeKind::Join(j) => Some(&j.key),
        }
    }
}
