//! Application layer: cost evaluation, input loading and the search service
//!
//! This layer orchestrates domain logic; it performs no I/O of its own.

pub mod error;
pub mod evaluator;
pub mod input;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use evaluator::{
    CollisionPolicy, CostEvaluator, Disqualification, Evaluation, EvaluationError,
};
pub use input::{parse_items, ItemFile, ItemSpec};
