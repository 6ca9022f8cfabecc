//! Working-memory facts.
//!
//! The matching engine only needs a handful of capabilities from a fact:
//! whether it is a group or a leaf, its name, its typed value, its unique
//! identifier and its ordered children. Those are captured by the
//! [`FactNode`] trait; [`Fact`] is the in-crate implementation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

static NEXT_FACT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a leaf fact.
///
/// Identifiers read from serialized facts are reserved, so [`FactId::next`]
/// never hands them out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FactId(u64);

impl FactId {
    /// Allocate a fresh identifier.
    pub fn next() -> Self {
        Self(NEXT_FACT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Adopt an externally chosen identifier and move the allocator past it.
    pub fn reserve(raw: u64) -> Self {
        NEXT_FACT_ID.fetch_max(raw.saturating_add(1), Ordering::Relaxed);
        Self(raw)
    }

    /// The raw numeric identifier.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for FactId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::reserve)
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The typed value carried by a leaf fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
    /// A string.
    String(String),
}

impl FactValue {
    /// Return the type name used in rule definitions (`int`, `float`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FactValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for FactValue {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<i64> for FactValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for FactValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for FactValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for FactValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Capabilities the matching engine requires from a working-memory fact.
pub trait FactNode: Sized {
    /// `true` for facts that own child facts.
    fn is_group(&self) -> bool;

    /// `true` for facts that carry a value.
    fn is_leaf(&self) -> bool {
        !self.is_group()
    }

    /// The fact name.
    fn name(&self) -> &str;

    /// The typed value of a leaf, `None` for groups.
    fn value(&self) -> Option<&FactValue>;

    /// The unique identifier of a leaf, `None` for groups.
    fn unique_id(&self) -> Option<FactId>;

    /// Ordered children of a group; empty for leaves.
    fn children(&self) -> &[Self];
}

/// A group fact: a name and ordered child facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactGroup {
    pub name: String,
    #[serde(default)]
    pub children: Vec<Fact>,
}

/// A leaf fact: a name, a typed value and a unique identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactLeaf {
    #[serde(default = "FactId::next")]
    pub id: FactId,
    pub name: String,
    pub value: FactValue,
}

/// A working-memory fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fact {
    /// A leaf carrying a value.
    Leaf(FactLeaf),
    /// A group of child facts.
    Group(FactGroup),
}

impl Fact {
    /// Create an empty group fact.
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group(FactGroup {
            name: name.into(),
            children: Vec::new(),
        })
    }

    /// Create a leaf fact with a freshly allocated identifier.
    pub fn leaf(name: impl Into<String>, value: impl Into<FactValue>) -> Self {
        Self::Leaf(FactLeaf {
            id: FactId::next(),
            name: name.into(),
            value: value.into(),
        })
    }

    /// Append a child. Has no effect on leaves.
    #[must_use]
    pub fn with_child(mut self, child: Fact) -> Self {
        if let Self::Group(ref mut group) = self {
            group.children.push(child);
        }
        self
    }

    /// Find the first leaf with the given name anywhere below this fact.
    pub fn find_leaf(&self, name: &str) -> Option<&FactLeaf> {
        match self {
            Self::Leaf(leaf) if leaf.name == name => Some(leaf),
            Self::Leaf(_) => None,
            Self::Group(group) => group.children.iter().find_map(|c| c.find_leaf(name)),
        }
    }
}

impl FactNode for Fact {
    fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    fn name(&self) -> &str {
        match self {
            Self::Group(group) => &group.name,
            Self::Leaf(leaf) => &leaf.name,
        }
    }

    fn value(&self) -> Option<&FactValue> {
        match self {
            Self::Leaf(leaf) => Some(&leaf.value),
            Self::Group(_) => None,
        }
    }

    fn unique_id(&self) -> Option<FactId> {
        match self {
            Self::Leaf(leaf) => Some(leaf.id),
            Self::Group(_) => None,
        }
    }

    fn children(&self) -> &[Self] {
        match self {
            Self::Group(group) => &group.children,
            Self::Leaf(_) => &[],
        }
    }
}

/// The root fact collection evaluated against the network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkingMemory {
    facts: Vec<Fact>,
}

impl WorkingMemory {
    /// Create an empty working memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level fact.
    pub fn insert(&mut self, fact: Fact) {
        self.facts.push(fact);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_fact(mut self, fact: Fact) -> Self {
        self.insert(fact);
        self
    }

    /// Top-level facts in insertion order.
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Number of top-level facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// `true` when there are no top-level facts.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Load a working memory from its JSON form.
    ///
    /// Leaves without an explicit `id` get a freshly allocated one.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|e| CoreError::Serialization(e.to_string()))
    }
}
