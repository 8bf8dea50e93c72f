//! Domain layer: enchantments, items, tree shapes and their enumeration
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod enchantment;
pub mod enumerator;
pub mod error;
pub mod item;
pub mod shape;

pub use arena::{TreeArena, TreeNode};
pub use builder::{assemble, ShapeBuilder};
pub use enchantment::{
    Enchantment, EnchantmentId, EnchantmentInfo, EnchantmentSet, EnchantmentTable, PriorWork,
    MAX_LEVEL, PRIOR_WORK_PENALTY,
};
pub use enumerator::{Candidate, CandidateEnumerator};
pub use error::{DomainError, DomainResult};
pub use item::{Item, ItemKind, ItemType};
pub use shape::{MergeNode, MergeTree, Role, ShapeLayout, TreeShape};
