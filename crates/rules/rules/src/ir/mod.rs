pub mod canonical;
pub mod condition;
pub mod definition;
