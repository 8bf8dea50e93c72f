//! Lazy enumeration of every (shape, assignment) candidate.

use std::ops::Range;
use std::sync::Arc;

use itertools::{Combinations, Itertools, Permutations};
use tracing::debug;

use crate::domain::builder::ShapeBuilder;
use crate::domain::error::DomainResult;
use crate::domain::shape::{ShapeLayout, TreeShape};

/// One shape with one assignment of item indices to its leaf slots.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Zero-based position in the enumeration; the tie-break key
    pub ordinal: u64,
    pub shape_index: usize,
    pub shape: Arc<TreeShape>,
    /// `assignment[slot]` is the index of the item placed in that leaf slot
    pub assignment: Vec<usize>,
}

struct CurrentShape {
    index: usize,
    shape: Arc<TreeShape>,
    permutations: Permutations<Range<usize>>,
}

/// Yields `C(2^f, n - 2^f) * n!` candidates, shape by shape.
///
/// Finite and single-pass: each candidate is produced once and owned by the
/// consumer.
pub struct CandidateEnumerator {
    builder: ShapeBuilder,
    position_sets: Combinations<Range<usize>>,
    current: Option<CurrentShape>,
    next_shape_index: usize,
    next_ordinal: u64,
    exhausted: bool,
}

impl CandidateEnumerator {
    pub fn new(items: usize) -> DomainResult<Self> {
        let layout = ShapeLayout::new(items)?;
        let builder = ShapeBuilder::new(layout);
        let position_sets = builder.position_sets();
        Ok(Self {
            builder,
            position_sets,
            current: None,
            next_shape_index: 0,
            next_ordinal: 0,
            exhausted: false,
        })
    }

    pub fn layout(&self) -> ShapeLayout {
        self.builder.layout()
    }

    fn advance_shape(&mut self) -> bool {
        let Some(positions) = self.position_sets.next() else {
            return false;
        };
        let items = self.builder.layout().items;
        let index = self.next_shape_index;
        self.next_shape_index += 1;
        debug!(shape = index, ?positions, "next shape");
        self.current = Some(CurrentShape {
            index,
            shape: Arc::new(self.builder.expand(&positions)),
            permutations: (0..items).permutations(items),
        });
        true
    }
}

impl Iterator for CandidateEnumerator {
    type Item = Candidate;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.exhausted {
            if let Some(current) = self.current.as_mut() {
                if let Some(assignment) = current.permutations.next() {
                    let candidate = Candidate {
                        ordinal: self.next_ordinal,
                        shape_index: current.index,
                        shape: Arc::clone(&current.shape),
                        assignment,
                    };
                    self.next_ordinal += 1;
                    return Some(candidate);
                }
            }
            if !self.advance_shape() {
                self.current = None;
                self.exhausted = true;
            }
        }
        None
    }
}
