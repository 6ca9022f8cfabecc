//! Compiles rule definitions into the discrimination network.
//!
//! Each rule is compiled in two steps. Planning walks the condition
//! expression, computes every structural key and builds every condition
//! tree; all construction errors surface here. Instantiation then walks
//! the plan and creates the nodes that do not exist yet. A rule that fails
//! to plan therefore leaves the network untouched.

use rete_core::Element;
use tracing::{debug, instrument, trace, warn};

use crate::config::{InvalidRulePolicy, NetworkConfig};
use crate::error::NetworkError;
use crate::ir::canonical::StructuralKey;
use crate::ir::condition::Condition;
use crate::ir::definition::RuleDefinition;
use crate::network::{BuiltRule, JoinOp, NodeId, ReteNetwork};

/// A rule left out of the network under [`InvalidRulePolicy::Skip`].
#[derive(Debug)]
pub struct SkippedRule {
    pub name: String,
    pub error: NetworkError,
}

/// Result of compiling a batch of rules.
#[derive(Debug)]
pub struct BuildReport {
    /// The finished network.
    pub network: ReteNetwork,
    /// Rules that failed to compile and were skipped.
    pub skipped: Vec<SkippedRule>,
}

impl BuildReport {
    /// Rules that made it into the network, in build order.
    pub fn built(&self) -> &[BuiltRule] {
        self.network.rules()
    }
}

/// A condition expression, validated but not yet in the network.
#[derive(Debug)]
enum Plan {
    Pattern {
        key: StructuralKey,
        condition: Condition,
    },
    Join {
        key: StructuralKey,
        op: JoinOp,
        operands: Vec<Plan>,
    },
}

impl Plan {
    fn from_element(element: &Element) -> Result<Self, NetworkError> {
        let key = StructuralKey::of(element)?;
        trace!(key = %key, canonical = key.canonical(), "hashed condition subtree");

        let Some(op) = JoinOp::from_tag(element.name()) else {
            // Everything below a non-operator tag is data schema.
            let condition = Condition::from_element(element)?;
            return Ok(Self::Pattern { key, condition });
        };

        let found = element.children().len();
        if found != op.arity() {
            return Err(NetworkError::OperatorArity {
                operator: op.to_string(),
                expected: op.arity(),
                found,
            });
        }
        let operands = element
            .children()
            .iter()
            .map(Self::from_element)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::Join { key, op, operands })
    }
}

/// Incrementally compiles rules into a [`ReteNetwork`].
#[derive(Debug)]
pub struct NetworkBuilder {
    network: ReteNetwork,
    skipped: Vec<SkippedRule>,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new(NetworkConfig::default())
    }
}

impl NetworkBuilder {
    /// Start from an empty network.
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            network: ReteNetwork::with_config(config),
            skipped: Vec::new(),
        }
    }

    /// Compile a whole rule set in one go.
    #[instrument(skip_all, fields(rules_count = definitions.len()))]
    pub fn build(
        config: NetworkConfig,
        definitions: &[RuleDefinition],
    ) -> Result<BuildReport, NetworkError> {
        let mut builder = Self::new(config);
        builder.add_rules(definitions)?;
        let report = builder.finish();
        debug!(
            nodes = report.network.node_count(),
            patterns = report.network.pattern_count(),
            joins = report.network.join_count(),
            skipped = report.skipped.len(),
            "network built"
        );
        Ok(report)
    }

    /// Compile one rule and attach it to its terminal node.
    ///
    /// Errors name the offending rule. On error nothing is added to the
    /// network, whatever the configured policy.
    #[instrument(skip_all, fields(rule = %definition.name))]
    pub fn add_rule(&mut self, definition: &RuleDefinition) -> Result<BuiltRule, NetworkError> {
        let plan = definition
            .condition()
            .and_then(Plan::from_element)
            .map_err(|e| e.in_rule(&definition.name))?;

        let terminal = self.instantiate(plan);
        let rule = BuiltRule {
            name: definition.name.clone(),
            terminal,
            action: definition.action.clone(),
        };
        debug!(terminal = %terminal, "rule compiled");
        self.network.attach_rule(rule.clone());
        Ok(rule)
    }

    /// Compile several rules, applying the configured
    /// [`InvalidRulePolicy`] to the ones that fail.
    pub fn add_rules<'a, I>(&mut self, definitions: I) -> Result<(), NetworkError>
    where
        I: IntoIterator<Item = &'a RuleDefinition>,
    {
        for definition in definitions {
            if let Err(error) = self.add_rule(definition) {
                match self.network.config().invalid_rules {
                    InvalidRulePolicy::FailFast => return Err(error),
                    InvalidRulePolicy::Skip => {
                        warn!(rule = %definition.name, %error, "skipping invalid rule");
                        self.skipped.push(SkippedRule {
                            name: definition.name.clone(),
                            error,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// The network built so far.
    pub fn network(&self) -> &ReteNetwork {
        &self.network
    }

    /// Rules skipped so far.
    pub fn skipped(&self) -> &[SkippedRule] {
        &self.skipped
    }

    pub fn finish(self) -> BuildReport {
        BuildReport {
            network: self.network,
            skipped: self.skipped,
        }
    }

    fn instantiate(&mut self, plan: Plan) -> NodeId {
        match plan {
            Plan::Pattern { key, condition } => {
                if let Some(id) = self.network.find_by_key(&key) {
                    debug!(node = %id, key = %key, "pattern already exists");
                    return id;
                }
                let id = self.network.add_pattern(key, condition);
                debug!(node = %id, "creating pattern node");
                id
            }
            Plan::Join { key, op, operands } => {
                // An existing join already has its operands wired.
                if let Some(id) = self.network.find_by_key(&key) {
                    debug!(node = %id, key = %key, "join already exists");
                    return id;
                }
                let operands: Vec<NodeId> =
                    operands.into_iter().map(|p| self.instantiate(p)).collect();
                let id = self.network.add_join(key, op, operands.clone());
                debug!(node = %id, %op, ?operands, "creating join node");
                id
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NodeKind;

    fn leaf(name: &str, ty: &str, text: &str) -> Element {
        Element::new(name).with_attribute("type", ty).with_text(text)
    }

    fn knife() -> Element {
        Element::new("character").with_child(leaf("weapon", "string", "Knife"))
    }

    fn low_hp() -> Element {
        Element::new("character").with_child(leaf("hp", "int", "1 5"))
    }

    fn op(tag: &str, operands: impl IntoIterator<Item = Element>) -> Element {
        operands
            .into_iter()
            .fold(Element::new(tag), Element::with_child)
    }

    fn rule(name: &str, condition: Element) -> RuleDefinition {
        RuleDefinition::new(name, condition)
    }

    fn skip_config() -> NetworkConfig {
        NetworkConfig {
            invalid_rules: InvalidRulePolicy::Skip,
            ..NetworkConfig::default()
        }
    }

    #[test]
    fn single_pattern_rule() {
        let mut builder = NetworkBuilder::default();
        let built = builder.add_rule(&rule("knife", knife())).unwrap();

        let network = builder.network();
        assert_eq!(network.node_count(), 2);
        assert_eq!(network.root().successors(), &[built.terminal]);
        assert!(network.node(built.terminal).unwrap().is_pattern());
        assert_eq!(built.name, "knife");
    }

    #[test]
    fn identical_rules_share_every_node() {
        let condition = op("and", [knife(), low_hp()]);
        let mut builder = NetworkBuilder::default();
        let first = builder.add_rule(&rule("a", condition.clone())).unwrap();
        let count = builder.network().node_count();
        let second = builder.add_rule(&rule("b", condition)).unwrap();

        assert_eq!(first.terminal, second.terminal);
        assert_eq!(builder.network().node_count(), count);
        assert_eq!(builder.network().rules_at(first.terminal).count(), 2);
    }

    #[test]
    fn layout_differences_share_nodes() {
        let indented = Element::parse(
            "<character>\n  <weapon type=\"string\">Knife</weapon>\n</character>",
        )
        .unwrap();
        let mut builder = NetworkBuilder::default();
        let a = builder.add_rule(&rule("a", knife())).unwrap();
        let b = builder.add_rule(&rule("b", indented)).unwrap();
        assert_eq!(a.terminal, b.terminal);
    }

    #[test]
    fn digit_separated_bounds_stay_distinct() {
        let mut builder = NetworkBuilder::default();
        let a = builder
            .add_rule(&rule("a", Element::new("c").with_child(leaf("hp", "int", "1 5"))))
            .unwrap();
        let b = builder
            .add_rule(&rule("b", Element::new("c").with_child(leaf("hp", "int", "15"))))
            .unwrap();
        assert_ne!(a.terminal, b.terminal);
        assert_eq!(builder.network().pattern_count(), 2);
    }

    #[test]
    fn tab_separated_bounds_never_alias_a_joined_literal() {
        let mut builder = NetworkBuilder::default();
        let err = builder
            .add_rule(&rule("range", Element::new("c").with_child(leaf("hp", "int", "1\t5"))))
            .unwrap_err();
        let NetworkError::InRule { source, .. } = err else {
            panic!("expected rule-tagged error");
        };
        assert!(matches!(*source, NetworkError::InvalidNumber { .. }));
        assert_eq!(builder.network().node_count(), 1);

        let exact = builder
            .add_rule(&rule("exact", Element::new("c").with_child(leaf("hp", "int", "15"))))
            .unwrap();
        let Some(NodeKind::Pattern(p)) = builder.network().node(exact.terminal).map(|n| n.kind())
        else {
            panic!("expected pattern");
        };
        let Condition::Group(group) = p.condition() else {
            panic!("expected group");
        };
        assert!(matches!(
            group.children[0],
            Condition::IntRange(ref r) if r.min == 15 && r.max == 15
        ));
    }

    #[test]
    fn join_wires_operands_in_order() {
        let mut builder = NetworkBuilder::default();
        let built = builder
            .add_rule(&rule("r", op("or", [knife(), low_hp()])))
            .unwrap();

        let network = builder.network();
        let join = network.node(built.terminal).unwrap();
        let NodeKind::Join(j) = join.kind() else {
            panic!("expected join");
        };
        assert_eq!(j.op(), JoinOp::Or);
        let [left, right] = j.operands() else {
            panic!("expected two operands");
        };
        assert_eq!(join.predecessors(), &[*left, *right]);
        assert_eq!(network.successors(*left), &[built.terminal]);
        assert_eq!(network.successors(*right), &[built.terminal]);
        assert!(left < right && right < &built.terminal);
    }

    #[test]
    fn shared_operand_gains_a_successor_per_join() {
        let mut builder = NetworkBuilder::default();
        let and = builder
            .add_rule(&rule("and", op("and", [knife(), low_hp()])))
            .unwrap();
        let or = builder
            .add_rule(&rule("or", op("or", [knife(), low_hp()])))
            .unwrap();

        let network = builder.network();
        assert_eq!(network.pattern_count(), 2);
        assert_eq!(network.join_count(), 2);
        let knife_id = network.predecessors(and.terminal)[0];
        assert_eq!(network.successors(knife_id), &[and.terminal, or.terminal]);
    }

    #[test]
    fn existing_join_is_not_relinked() {
        let condition = op("and", [knife(), low_hp()]);
        let mut builder = NetworkBuilder::default();
        let first = builder.add_rule(&rule("a", condition.clone())).unwrap();
        builder.add_rule(&rule("b", condition)).unwrap();

        let network = builder.network();
        for &operand in network.predecessors(first.terminal) {
            assert_eq!(network.successors(operand), &[first.terminal]);
        }
    }

    #[test]
    fn nested_joins_reuse_inner_join() {
        let inner = op("and", [knife(), low_hp()]);
        let mut builder = NetworkBuilder::default();
        let a = builder.add_rule(&rule("a", inner.clone())).unwrap();
        let b = builder
            .add_rule(&rule("b", op("not", [inner])))
            .unwrap();

        let network = builder.network();
        assert_eq!(network.predecessors(b.terminal), &[a.terminal]);
        assert_eq!(network.successors(a.terminal), &[b.terminal]);
        assert_eq!(network.join_count(), 2);
    }

    #[test]
    fn not_has_a_single_predecessor() {
        let mut builder = NetworkBuilder::default();
        let built = builder.add_rule(&rule("r", op("not", [knife()]))).unwrap();

        let network = builder.network();
        let node = network.node(built.terminal).unwrap();
        assert_eq!(node.predecessors().len(), 1);
        assert!(matches!(node.kind(), NodeKind::Join(j) if j.op() == JoinOp::Not));
    }

    #[test]
    fn operator_arity_is_checked() {
        for (tag, count) in [("and", 1), ("and", 3), ("or", 1), ("not", 0), ("not", 2)] {
            let condition = op(tag, std::iter::repeat_n(knife(), count));
            let err = NetworkBuilder::default()
                .add_rule(&rule("bad", condition))
                .unwrap_err();
            assert_eq!(err.rule(), Some("bad"));
            let NetworkError::InRule { source, .. } = err else {
                panic!("expected rule-tagged error");
            };
            assert!(
                matches!(*source, NetworkError::OperatorArity { found, .. } if found == count),
                "{tag} with {count}"
            );
        }
    }

    #[test]
    fn operators_below_a_pattern_are_data() {
        let condition = Element::new("character").with_child(op("and", [leaf("x", "int", "1")]));
        let mut builder = NetworkBuilder::default();
        builder.add_rule(&rule("r", condition)).unwrap();
        assert_eq!(builder.network().join_count(), 0);
        assert_eq!(builder.network().pattern_count(), 1);
    }

    #[test]
    fn failed_rule_leaves_network_untouched() {
        let mut builder = NetworkBuilder::default();
        let bad = op("and", [knife(), leaf("hp", "int", "9 1")]);
        assert!(builder.add_rule(&rule("bad", bad)).is_err());
        assert_eq!(builder.network().node_count(), 1);
        assert!(builder.network().rules().is_empty());
    }

    #[test]
    fn fail_fast_stops_at_first_invalid_rule() {
        let defs = [
            rule("ok", knife()),
            RuleDefinition {
                name: "no-if".into(),
                if_clause: None,
                action: None,
            },
            rule("later", low_hp()),
        ];
        let err = NetworkBuilder::build(NetworkConfig::default(), &defs).unwrap_err();
        assert!(matches!(err, NetworkError::MissingIfClause { ref rule } if rule == "no-if"));
    }

    #[test]
    fn skip_policy_records_and_continues() {
        let defs = [
            rule("ok", knife()),
            rule("bad-type", leaf("when", "date", "now")),
            rule("later", low_hp()),
        ];
        let report = NetworkBuilder::build(skip_config(), &defs).unwrap();

        let names: Vec<_> = report.built().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ok", "later"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "bad-type");
        assert_eq!(report.skipped[0].error.rule(), Some("bad-type"));
    }

    #[test]
    fn every_node_is_reachable_and_has_a_predecessor() {
        let defs = [
            rule("a", op("and", [knife(), low_hp()])),
            rule("b", op("or", [low_hp(), op("not", [knife()])])),
            rule("c", knife()),
        ];
        let report = NetworkBuilder::build(NetworkConfig::default(), &defs).unwrap();
        let network = &report.network;

        assert_eq!(network.reachable().len(), network.node_count());
        for node in network.nodes().iter().filter(|n| !n.is_root()) {
            assert!(!node.predecessors().is_empty(), "{} has no predecessor", node.id());
            for &pred in node.predecessors() {
                assert!(pred < node.id());
                assert!(network.successors(pred).contains(&node.id()));
            }
        }
    }

    #[test]
    fn action_is_carried_through() {
        let def = rule("r", knife()).with_action(Element::new("action").with_text("Hit"));
        let built = NetworkBuilder::default().add_rule(&def).unwrap();
        assert_eq!(built.action.as_ref().and_then(Element::text), Some("Hit"));
    }
}
