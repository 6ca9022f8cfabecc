//! A discrimination network for rule conditions.
//!
//! Rule conditions are compiled by the [`NetworkBuilder`] into a shared
//! graph of pattern nodes (tests on single facts) and join nodes (boolean
//! combinations). Structurally identical subtrees share one node. The
//! [`Matcher`] then runs working memories through the graph and reports
//! which rules currently apply.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod frontend;
pub mod ir;
pub mod network;

pub use builder::{BuildReport, NetworkBuilder, SkippedRule};
pub use config::{InvalidRulePolicy, NetworkConfig};
pub use engine::{MatchReport, Matcher, RuleMatch, Token};
pub use error::NetworkError;
pub use frontend::RuleFrontend;
pub use ir::condition::{BindingList, Condition};
pub use ir::definition::RuleDefinition;
pub use network::{BuiltRule, JoinOp, NodeId, ReteNetwork};
