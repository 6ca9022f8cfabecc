use rete_core::Element;
use rete_rules::{NetworkError, RuleDefinition, RuleFrontend};
use tracing::debug;

/// Tag of the document root.
pub const RULES_ELEMENT: &str = "rules";
/// Tag of a single rule below the root.
pub const RULE_ELEMENT: &str = "rule";

/// A [`RuleFrontend`] implementation that reads rule documents of the form
///
/// ```xml
/// <rules>
///   <rule name="knife">
///     <if>
///       <character>
///         <weapon type="string">Knife</weapon>
///       </character>
///     </if>
///     <action>Hit</action>
///   </rule>
/// </rules>
/// ```
///
/// Rules without a `name` attribute are called `rule-<n>`, `n` being the
/// 1-based position of the rule in the document. Other elements below the
/// root are ignored.
pub struct XmlFrontend;

impl RuleFrontend for XmlFrontend {
    fn extensions(&self) -> &[&str] {
        &["xml"]
    }

    fn parse(&self, content: &str) -> Result<Vec<RuleDefinition>, NetworkError> {
        let root = Element::parse(content)?;
        if root.name() != RULES_ELEMENT {
            return Err(NetworkError::Parse(format!(
                "expected <{RULES_ELEMENT}> root element, found <{}>",
                root.name()
            )));
        }

        let rules: Vec<RuleDefinition> = root
            .children_named(RULE_ELEMENT)
            .enumerate()
            .map(|(i, rule)| compile_rule(rule, i + 1))
            .collect();
        debug!(rules_count = rules.len(), "parsed rule document");
        Ok(rules)
    }
}

/// Extract the name, `if` clause and action of a `rule` element.
fn compile_rule(rule: &Element, position: usize) -> RuleDefinition {
    let name = rule
        .attribute("name")
        .map_or_else(|| format!("rule-{position}"), str::to_owned);
    RuleDefinition {
        name,
        if_clause: rule.child("if").cloned(),
        action: rule.child("action").cloned(),
    }
}
