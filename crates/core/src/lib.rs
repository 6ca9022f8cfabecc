pub mod element;
pub mod error;
pub mod fact;

pub use element::Element;
pub use error::CoreError;
pub use fact::{Fact, FactGroup, FactId, FactLeaf, FactNode, FactValue, WorkingMemory};
