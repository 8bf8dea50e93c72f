//! anvilcalc: cheapest merge order for combining enchanted items on an anvil
//!
//! Every merge tree for `n` starting items is enumerated lazily, assembled,
//! and priced with the anvil cost rules; the cheapest candidate wins.
//!
//! Layers:
//! - [`domain`]: enchantments, items, tree shapes and their enumeration
//! - [`application`]: cost evaluation, item file parsing, search service
//! - [`cli`]: argument parsing and command dispatch
//! - [`config`]: layered settings

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;

pub use application::services::{SearchOutcome, SearchService, TiePolicy};
pub use application::{ApplicationError, CollisionPolicy, CostEvaluator};
pub use config::Settings;
pub use domain::{CandidateEnumerator, EnchantmentTable, Item, ItemType, ShapeBuilder};
