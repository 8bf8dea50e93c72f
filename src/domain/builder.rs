//! Builders for tree shapes and for trees with items assigned to their leaves.

use generational_arena::Index;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::item::Item;
use crate::domain::shape::{MergeNode, MergeTree, Role, ShapeLayout, TreeShape};

/// Constructs the shapes for one [`ShapeLayout`].
#[derive(Debug, Clone)]
pub struct ShapeBuilder {
    layout: ShapeLayout,
    base: TreeShape,
    base_leaves: Vec<Index>,
}

impl ShapeBuilder {
    #[instrument(level = "debug")]
    pub fn new(layout: ShapeLayout) -> Self {
        let base = build_base(layout.full_rows);
        let base_leaves = base.leaf_nodes();
        debug_assert_eq!(base_leaves.len(), layout.base_positions);
        Self {
            layout,
            base,
            base_leaves,
        }
    }

    pub fn layout(&self) -> ShapeLayout {
        self.layout
    }

    /// The perfect tree of depth `f`, before any expansion.
    pub fn base(&self) -> &TreeShape {
        &self.base
    }

    /// Fresh shape with the given base-leaf positions expanded.
    pub fn expand(&self, positions: &[usize]) -> TreeShape {
        let mut shape = self.base.clone();
        for &position in positions {
            let leaf = self.base_leaves[position];
            shape.insert_node(Role::Target, Some(leaf));
            shape.insert_node(Role::Sacrifice, Some(leaf));
        }
        shape
    }

    /// Every expansion choice, in lexicographic order of positions.
    pub fn position_sets(&self) -> itertools::Combinations<std::ops::Range<usize>> {
        (0..self.layout.base_positions).combinations(self.layout.extra_pairs)
    }

    /// All shapes, materialized. Only sensible for small layouts.
    pub fn shapes(&self) -> Vec<TreeShape> {
        self.position_sets()
            .map(|positions| self.expand(&positions))
            .collect()
    }
}

/// Grow a single root for exactly `full_rows` rounds, splitting every leaf.
fn build_base(full_rows: u32) -> TreeShape {
    let mut shape = TreeShape::new();
    shape.insert_node(Role::Root, None);
    for round in 0..full_rows {
        for leaf in shape.leaf_nodes() {
            shape.insert_node(Role::Target, Some(leaf));
            shape.insert_node(Role::Sacrifice, Some(leaf));
        }
        debug!(round, leaves = shape.leaf_nodes().len(), "base shape grown");
    }
    shape
}

/// Fill the leaf slots of `shape` with `items[assignment[slot]]`.
///
/// Slots are numbered left to right, depth first. Every leaf gets its own
/// clone of the item; internal nodes start out pending evaluation.
pub fn assemble(shape: &TreeShape, assignment: &[usize], items: &[Item]) -> DomainResult<MergeTree> {
    let slots = shape.leaf_nodes().len();
    if slots != assignment.len() || assignment.iter().any(|&i| i >= items.len()) {
        return Err(DomainError::AssignmentMismatch {
            slots,
            assigned: assignment.len(),
        });
    }

    let mut slot = 0;
    Ok(shape.map(|node| {
        let item = if node.is_leaf() {
            let item = items[assignment[slot]].clone();
            slot += 1;
            item
        } else {
            Item::pending()
        };
        MergeNode {
            role: node.data,
            item,
        }
    }))
}
