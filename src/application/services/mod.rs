//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.

mod search;

pub use search::{SearchOutcome, SearchService, SearchStats, StopReason, TiePolicy, Winner};
