pub mod classifier;
pub mod fragments;
pub mod generator;
pub mod oracle;
pub mod path_builder;
pub mod selector_model;
pub mod special_case;
pub mod strategies;

pub use generator::{SelectorGenerator, generate_selector};
pub use oracle::UniquenessOracle;
pub use selector_model::{GeneratedSelector, GeneratorConfig, StrategyAttempt, StrategyKind};
