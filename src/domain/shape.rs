//! Merge-tree shapes and the counting rules behind them.
//!
//! A shape for `n` items is a perfect binary tree of depth `f = floor(log2 n)`
//! with `n - 2^f` of its `2^f` leaves expanded into one more target/sacrifice
//! pair. Leaf depths therefore never differ by more than one.

use std::fmt;

use crate::domain::arena::TreeArena;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::item::Item;

/// Position of a node relative to its parent's merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The final item
    Root,
    /// Left input: keeps its identity and enchantments
    Target,
    /// Right input: consumed by the merge
    Sacrifice,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Root => write!(f, "Final item"),
            Role::Target => write!(f, "Target"),
            Role::Sacrifice => write!(f, "Sacrifice"),
        }
    }
}

/// Topology without items.
pub type TreeShape = TreeArena<Role>;

/// Node of an assembled tree: a slot role and the item in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeNode {
    pub role: Role,
    pub item: Item,
}

/// Shape with every leaf slot filled by a concrete item.
pub type MergeTree = TreeArena<MergeNode>;

/// Counting figures for `n` leaf items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeLayout {
    /// Number of leaf items
    pub items: usize,
    /// Depth of the perfect base tree, `floor(log2 n)`
    pub full_rows: u32,
    /// Leaves of the base tree, `2^full_rows`
    pub base_positions: usize,
    /// Base leaves that get an extra target/sacrifice pair
    pub extra_pairs: usize,
}

impl ShapeLayout {
    pub fn new(items: usize) -> DomainResult<Self> {
        if items == 0 {
            return Err(DomainError::InvalidInputCount {
                count: items,
                max: usize::MAX,
            });
        }
        let full_rows = items.ilog2();
        let base_positions = 1usize << full_rows;
        Ok(Self {
            items,
            full_rows,
            base_positions,
            extra_pairs: items - base_positions,
        })
    }

    /// `C(2^f, n - 2^f)`
    pub fn shape_count(&self) -> DomainResult<u128> {
        binomial(self.base_positions as u128, self.extra_pairs as u128)
            .ok_or(DomainError::CountOverflow(self.items))
    }

    /// `n!`
    pub fn permutations_per_shape(&self) -> DomainResult<u128> {
        (1..=self.items as u128)
            .try_fold(1u128, |acc, k| acc.checked_mul(k))
            .ok_or(DomainError::CountOverflow(self.items))
    }

    /// `C(2^f, n - 2^f) * n!`
    pub fn total_candidates(&self) -> DomainResult<u128> {
        self.shape_count()?
            .checked_mul(self.permutations_per_shape()?)
            .ok_or(DomainError::CountOverflow(self.items))
    }
}

fn binomial(n: u128, k: u128) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // exact at every step: result holds C(n, i)
        result = result.checked_mul(n - i)? / (i + 1);
    }
    Some(result)
}
