use rete_core::FactNode;
use tracing::trace;

use crate::config::NetworkConfig;
use crate::ir::condition::BindingList;
use crate::network::PatternNode;

use super::token::Token;

impl PatternNode {
    /// Test every top-level fact against this node's condition.
    ///
    /// Candidates are the facts whose name equals the condition name. A
    /// leaf condition named by a wildcard token takes every top-level fact
    /// and lets the leaf test reject the groups.
    pub fn activate<'a, F: FactNode>(
        &self,
        facts: &'a [F],
        config: &NetworkConfig,
    ) -> Vec<Token<'a, F>> {
        let condition = self.condition();
        let is_wildcard = |name: &str| config.is_wildcard(name);
        let any_name = !condition.is_group() && is_wildcard(condition.name());

        facts
            .iter()
            .filter(|fact| any_name || fact.name() == condition.name())
            .filter_map(|fact| {
                let mut bindings = BindingList::new();
                let matched = condition.matches(fact, &is_wildcard, &mut bindings);
                trace!(fact = fact.name(), matched, "tested candidate fact");
                matched.then(|| Token::single(fact, bindings))
            })
            .take(config.activation_limit())
            .collect()
    }
}
