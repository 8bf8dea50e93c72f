//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid input or structure.
/// They are fatal for the request that produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid item count {count}: expected 1..={max}")]
    InvalidInputCount { count: usize, max: usize },

    #[error("invalid enchantment identifier {0}: expected -1..=37")]
    InvalidEnchantmentIdentifier(i32),

    #[error("unknown enchantment: {0}")]
    UnknownEnchantment(String),

    #[error("invalid level {level} for {enchantment}: expected 1..=255")]
    InvalidLevel { enchantment: String, level: u32 },

    #[error("enchantment listed twice on one item: {0}")]
    DuplicateEnchantment(String),

    #[error("invalid prior work level {0}: expected 0..=6")]
    InvalidPriorWork(u8),

    #[error("assignment does not match the shape: {slots} leaf slots, {assigned} items assigned")]
    AssignmentMismatch { slots: usize, assigned: usize },

    #[error("malformed merge tree: {0}")]
    MalformedTree(String),

    #[error("candidate count for {0} items does not fit in 128 bits")]
    CountOverflow(usize),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
