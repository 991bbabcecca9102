pub mod classifier;
pub mod definition;
pub mod engine;
pub mod expression;
pub mod pipeline;
pub mod scorer;
pub mod splitter;

pub use crate::domain::model::{
    CompletenessScore, Expression, IdentifierSet, ModuleDefinition, Step, StepClass, StepKind,
};
pub use crate::domain::ports::{ConfigProvider, ModuleCatalog, Pipeline, Storage};
pub use crate::utils::error::Result;
