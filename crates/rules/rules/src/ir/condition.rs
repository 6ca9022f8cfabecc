//! Condition trees: the data-matching side of a pattern.
//!
//! A condition tree mirrors the shape of the facts it matches. Groups carry
//! a name and ordered child conditions; leaves carry a name and either an
//! inclusive numeric range or an exact string. Boolean operators never
//! appear here, they live in join nodes above the patterns.
//!
//! # Numeric bounds
//!
//! The text of an `int` or `float` leaf holds one or two whitespace
//! separated numbers:
//!
//! - `5` matches exactly 5, i.e. the range `[5, 5]`;
//! - `1 5` matches the inclusive range `[1, 5]`.
//!
//! Only the space character separates bounds. Surrounding layout is
//! ignored; a tab or line break between the bounds is an invalid number.

use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

use rete_core::{Element, FactId, FactNode, FactValue};
use tracing::debug;

use crate::error::NetworkError;

/// Identifiers of the leaf facts that satisfied a condition, in match order.
pub type BindingList = Vec<FactId>;

/// Attribute that marks an element as a leaf and declares its value type.
pub const TYPE_ATTRIBUTE: &str = "type";

/// A node of a condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A named group whose children must all match.
    Group(GroupCondition),
    /// An integer leaf with inclusive bounds.
    IntRange(RangeCondition<i64>),
    /// A float leaf with inclusive bounds.
    FloatRange(RangeCondition<f64>),
    /// A string leaf matched by exact equality.
    String(StringCondition),
}

/// A group condition: name plus ordered child conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupCondition {
    pub name: String,
    pub children: Vec<Condition>,
}

/// A numeric leaf condition with inclusive bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeCondition<T> {
    pub name: String,
    pub min: T,
    pub max: T,
}

/// A string leaf condition.
#[derive(Debug, Clone, PartialEq)]
pub struct StringCondition {
    pub name: String,
    pub literal: String,
}

/// Scalar types usable as numeric range bounds.
pub trait RangeScalar: Copy + PartialOrd + FromStr + Display {
    /// Extract a value of this type from a fact value, if the types agree.
    fn extract(value: &FactValue) -> Option<Self>;
}

impl RangeScalar for i64 {
    fn extract(value: &FactValue) -> Option<Self> {
        match value {
            FactValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl RangeScalar for f64 {
    fn extract(value: &FactValue) -> Option<Self> {
        match value {
            FactValue::Float(x) => Some(*x),
            _ => None,
        }
    }
}

impl Condition {
    /// Build a condition tree from a pattern element.
    ///
    /// Elements with a `type` attribute become leaves, all others become
    /// groups over their child elements.
    pub fn from_element(element: &Element) -> Result<Self, NetworkError> {
        let Some(type_name) = element.attribute(TYPE_ATTRIBUTE) else {
            return GroupCondition::from_element(element).map(Self::Group);
        };

        match type_name {
            "int" => RangeCondition::parse(element).map(Self::IntRange),
            "float" => RangeCondition::parse(element).map(Self::FloatRange),
            "string" => {
                let literal = element.text().unwrap_or_default().to_owned();
                debug!(element = element.name(), %literal, "creating string leaf condition");
                Ok(Self::String(StringCondition {
                    name: element.name().to_owned(),
                    literal,
                }))
            }
            other => Err(NetworkError::UnsupportedConditionType {
                element: element.name().to_owned(),
                type_name: other.to_owned(),
            }),
        }
    }

    /// The name this condition tests against.
    pub fn name(&self) -> &str {
        match self {
            Self::Group(g) => &g.name,
            Self::IntRange(r) => &r.name,
            Self::FloatRange(r) => &r.name,
            Self::String(s) => &s.name,
        }
    }

    /// `true` for group conditions.
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// Test a single fact.
    ///
    /// Leaf matches append the leaf's identifier to `bindings`. When the
    /// fact does not match, `bindings` is left as it was.
    pub fn matches<F, W>(&self, fact: &F, is_wildcard: &W, bindings: &mut BindingList) -> bool
    where
        F: FactNode,
        W: Fn(&str) -> bool,
    {
        match self {
            Self::Group(g) => g.matches(fact, is_wildcard, bindings),
            Self::IntRange(r) => r.matches(fact, is_wildcard, bindings),
            Self::FloatRange(r) => r.matches(fact, is_wildcard, bindings),
            Self::String(s) => s.matches(fact, is_wildcard, bindings),
        }
    }

    /// `true` if at least one of `facts` matches. The first match wins and
    /// contributes its bindings.
    fn matches_any<F, W>(&self, facts: &[F], is_wildcard: &W, bindings: &mut BindingList) -> bool
    where
        F: FactNode,
        W: Fn(&str) -> bool,
    {
        facts.iter().any(|fact| {
            let mut attempt = BindingList::new();
            let matched = self.matches(fact, is_wildcard, &mut attempt);
            if matched {
                bindings.extend(attempt);
            }
            matched
        })
    }
}

impl GroupCondition {
    fn from_element(element: &Element) -> Result<Self, NetworkError> {
        debug!(element = element.name(), "creating group condition");
        let children = element
            .children()
            .iter()
            .map(Condition::from_element)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: element.name().to_owned(),
            children,
        })
    }

    // TODO: wildcard group names; only leaves honor wildcard tokens today.
    fn matches<F, W>(&self, fact: &F, is_wildcard: &W, bindings: &mut BindingList) -> bool
    where
        F: FactNode,
        W: Fn(&str) -> bool,
    {
        if !fact.is_group() || fact.name() != self.name {
            return false;
        }

        let mut collected = BindingList::new();
        for child in &self.children {
            if !child.matches_any(fact.children(), is_wildcard, &mut collected) {
                return false;
            }
        }
        bindings.extend(collected);
        true
    }
}

impl<T: RangeScalar> RangeCondition<T> {
    fn parse(element: &Element) -> Result<Self, NetworkError> {
        let text = element.text().unwrap_or_default();
        // Bounds are separated by spaces only. Tabs and line breaks vanish
        // from the structural key, so inside the bounds they are rejected.
        let tokens: Vec<&str> = text.trim().split(' ').filter(|t| !t.is_empty()).collect();
        let (lo, hi) = match tokens.as_slice() {
            [value] => (*value, *value),
            [lo, hi] => (*lo, *hi),
            _ => {
                return Err(NetworkError::InvalidNumber {
                    element: element.name().to_owned(),
                    text: text.to_owned(),
                });
            }
        };

        let min = parse_bound::<T>(element, lo)?;
        let max = parse_bound::<T>(element, hi)?;
        match min.partial_cmp(&max) {
            Some(Ordering::Less | Ordering::Equal) => {}
            Some(Ordering::Greater) | None => {
                return Err(NetworkError::InvalidRange {
                    element: element.name().to_owned(),
                    min: lo.to_owned(),
                    max: hi.to_owned(),
                });
            }
        }

        debug!(element = element.name(), %min, %max, "creating numeric leaf condition");
        Ok(Self {
            name: element.name().to_owned(),
            min,
            max,
        })
    }

    /// `true` when `value` lies in `[min, max]`.
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    fn matches<F, W>(&self, fact: &F, is_wildcard: &W, bindings: &mut BindingList) -> bool
    where
        F: FactNode,
        W: Fn(&str) -> bool,
    {
        if !leaf_name_matches(&self.name, fact, is_wildcard) {
            return false;
        }
        match fact.value().and_then(T::extract) {
            Some(value) if self.contains(value) => {
                bindings.extend(fact.unique_id());
                true
            }
            _ => false,
        }
    }
}

impl StringCondition {
    fn matches<F, W>(&self, fact: &F, is_wildcard: &W, bindings: &mut BindingList) -> bool
    where
        F: FactNode,
        W: Fn(&str) -> bool,
    {
        if !leaf_name_matches(&self.name, fact, is_wildcard) {
            return false;
        }
        match fact.value() {
            Some(FactValue::String(s)) if *s == self.literal => {
                bindings.extend(fact.unique_id());
                true
            }
            _ => false,
        }
    }
}

fn leaf_name_matches<F, W>(name: &str, fact: &F, is_wildcard: &W) -> bool
where
    F: FactNode,
    W: Fn(&str) -> bool,
{
    fact.is_leaf() && (is_wildcard(name) || name == fact.name())
}

fn parse_bound<T: RangeScalar>(element: &Element, token: &str) -> Result<T, NetworkError> {
    token.parse().map_err(|_| NetworkError::InvalidNumber {
        element: element.name().to_owned(),
        text: token.to_owned(),
    })
}
