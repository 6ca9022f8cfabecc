mod frontend;

pub use frontend::{RULES_ELEMENT, RULE_ELEMENT, XmlFrontend};
