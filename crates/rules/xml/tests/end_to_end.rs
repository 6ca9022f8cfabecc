//! End-to-end tests: rule document to network to match report.

use rete_core::{Element, Fact, FactNode, WorkingMemory};
use rete_rules::{
    InvalidRulePolicy, Matcher, NetworkBuilder, NetworkConfig, NetworkError, RuleFrontend,
};
use rete_rules_xml::XmlFrontend;

// -- Rule Fixtures --

const KNIFE_RULE: &str = r#"
<rules>
  <rule name="hit">
    <if>
      <character>
        <weapon type="string">Knife</weapon>
      </character>
    </if>
    <action>Hit</action>
  </rule>
</rules>
"#;

const COMBAT_RULES: &str = r#"
<rules>
  <rule name="stab">
    <if>
      <and>
        <character><weapon type="string">Knife</weapon></character>
        <monster><hp type="int">1 20</hp></monster>
      </and>
    </if>
    <action>Stab</action>
  </rule>
  <rule name="flee">
    <if>
      <or>
        <character><hp type="int">0 5</hp></character>
        <monster><speed type="float">2.5 10.0</speed></monster>
      </or>
    </if>
    <action>Flee</action>
  </rule>
  <rule name="rest">
    <if>
      <not>
        <monster><hp type="int">1 20</hp></monster>
      </not>
    </if>
    <action>Rest</action>
  </rule>
  <rule name="hit">
    <if>
      <character>
          <weapon type="string">Knife</weapon>
      </character>
    </if>
    <action>Hit</action>
  </rule>
</rules>
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("rete_rules=debug"))
        .with_test_writer()
        .try_init();
}

fn memory(value: &serde_json::Value) -> WorkingMemory {
    WorkingMemory::from_json(&value.to_string()).unwrap()
}

#[test]
fn knife_rule_binds_the_weapon_leaf() {
    init_tracing();
    let rules = XmlFrontend.parse(KNIFE_RULE).unwrap();
    let report = NetworkBuilder::build(NetworkConfig::default(), &rules).unwrap();
    let network = &report.network;
    assert_eq!(network.pattern_count(), 1);
    assert_eq!(network.join_count(), 0);

    let weapon = Fact::leaf("weapon", "Knife");
    let weapon_id = weapon.unique_id().unwrap();
    let wm = WorkingMemory::new().with_fact(Fact::group("character").with_child(weapon));

    let matches = Matcher::new(network).run(wm.facts());
    let rule_matches = matches.rule_matches();
    assert_eq!(rule_matches.len(), 1);

    let hit = &rule_matches[0];
    assert_eq!(hit.rule.name, "hit");
    assert_eq!(hit.rule.action.as_ref().and_then(Element::text), Some("Hit"));
    assert_eq!(hit.tokens.len(), 1);
    assert_eq!(hit.tokens[0].bindings, vec![weapon_id]);
}

#[test]
fn removing_the_weapon_flips_the_match() {
    let rules = XmlFrontend.parse(KNIFE_RULE).unwrap();
    let report = NetworkBuilder::build(NetworkConfig::default(), &rules).unwrap();
    let matcher = Matcher::new(&report.network);

    let armed = memory(&serde_json::json!({
        "facts": [{"name": "character", "children": [{"name": "weapon", "value": "Knife"}]}]
    }));
    let unarmed = memory(&serde_json::json!({
        "facts": [{"name": "character", "children": [{"name": "hp", "value": 10}]}]
    }));

    assert_eq!(matcher.run(armed.facts()).matched_rule_names(), vec!["hit"]);
    assert!(matcher.run(unarmed.facts()).matched_rule_names().is_empty());
}

#[test]
fn rules_share_identical_patterns() {
    init_tracing();
    let rules = XmlFrontend.parse(COMBAT_RULES).unwrap();
    let report = NetworkBuilder::build(NetworkConfig::default(), &rules).unwrap();
    let network = &report.network;

    // knife, monster hp, character hp, monster speed
    assert_eq!(network.pattern_count(), 4);
    assert_eq!(network.join_count(), 3);
    assert_eq!(network.reachable().len(), network.node_count());

    let stab = &report.built()[0];
    let hit = &report.built()[3];
    let knife = network.predecessors(stab.terminal)[0];
    assert_eq!(hit.terminal, knife);
    assert_eq!(network.rules_at(knife).count(), 1);
}

#[test]
fn combat_scenarios() {
    let rules = XmlFrontend.parse(COMBAT_RULES).unwrap();
    let report = NetworkBuilder::build(NetworkConfig::default(), &rules).unwrap();
    let matcher = Matcher::new(&report.network);

    let scenarios = [
        (
            serde_json::json!({"facts": [
                {"name": "character", "children": [
                    {"name": "weapon", "value": "Knife"},
                    {"name": "hp", "value": 30}
                ]},
                {"name": "monster", "children": [
                    {"name": "hp", "value": 12},
                    {"name": "speed", "value": 1.0}
                ]}
            ]}),
            vec!["stab", "hit"],
        ),
        (
            serde_json::json!({"facts": [
                {"name": "character", "children": [{"name": "hp", "value": 3}]},
                {"name": "monster", "children": [{"name": "speed", "value": 4.0}]}
            ]}),
            vec!["flee", "rest"],
        ),
        (
            serde_json::json!({"facts": [
                {"name": "character", "children": [
                    {"name": "weapon", "value": "Knife"},
                    {"name": "hp", "value": 2}
                ]}
            ]}),
            vec!["flee", "rest", "hit"],
        ),
        (serde_json::json!({"facts": []}), vec!["rest"]),
    ];

    for (facts, expected) in scenarios {
        let wm = memory(&facts);
        assert_eq!(matcher.run(wm.facts()).matched_rule_names(), expected, "{facts}");
    }
}

#[test]
fn int_range_does_not_match_float_fact() {
    let rules = XmlFrontend.parse(COMBAT_RULES).unwrap();
    let report = NetworkBuilder::build(NetworkConfig::default(), &rules).unwrap();
    let wm = memory(&serde_json::json!({"facts": [
        {"name": "character", "children": [{"name": "hp", "value": 3.0}]}
    ]}));

    let outcome = Matcher::new(&report.network).run(wm.facts());
    let names = outcome.matched_rule_names();
    assert_eq!(names, vec!["rest"]);
}

#[test]
fn invalid_rule_fails_the_build_by_default() {
    let doc = r#"
        <rules>
          <rule name="ok"><if><character/></if></rule>
          <rule name="broken"><if><and><character/></and></if></rule>
        </rules>
    "#;
    let rules = XmlFrontend.parse(doc).unwrap();
    let err = NetworkBuilder::build(NetworkConfig::default(), &rules).unwrap_err();
    assert_eq!(err.rule(), Some("broken"));
    assert!(err.to_string().contains("expects 2 operand(s), found 1"));
}

#[test]
fn configured_skip_policy_builds_the_rest() {
    let config = NetworkConfig::from_toml_str(
        r#"
        invalid_rules = "skip"
        wildcard_tokens = ["_", "any"]
        "#,
    )
    .unwrap();
    assert_eq!(config.invalid_rules, InvalidRulePolicy::Skip);

    let doc = r#"
        <rules>
          <rule name="bad-type"><if><hp type="date">today</hp></if></rule>
          <rule name="no-if"><action>Nothing</action></rule>
          <rule name="any-three"><if><any type="int">3</any></if></rule>
        </rules>
    "#;
    let rules = XmlFrontend.parse(doc).unwrap();
    let report = NetworkBuilder::build(config, &rules).unwrap();

    let skipped: Vec<_> = report.skipped.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(skipped, vec!["bad-type", "no-if"]);
    assert!(matches!(
        report.skipped[1].error,
        NetworkError::MissingIfClause { .. }
    ));

    let wm = WorkingMemory::new()
        .with_fact(Fact::leaf("gold", 3))
        .with_fact(Fact::leaf("turn", 4));
    let matches = Matcher::new(&report.network).run(wm.facts());
    assert_eq!(matches.matched_rule_names(), vec!["any-three"]);
}
