//! Anvil cost evaluation of one fully assigned merge tree.
//!
//! Nodes are evaluated post-order. For an internal node with target `t` and
//! sacrifice `s`:
//!
//! ```text
//! cost       = penalty[t.prior_work] + penalty[s.prior_work] + Σ e.level × multiplier(e)
//! prior_work = min(max(t.prior_work, s.prior_work), 5) + 1
//! ```
//!
//! where the sum runs over the sacrifice's enchantments and the multiplier
//! column is picked by the sacrifice's item type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::domain::{
    DomainError, DomainResult, Enchantment, EnchantmentSet, EnchantmentTable, Item, MergeTree,
    PriorWork,
};

/// What happens when target and sacrifice carry the same enchantment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Equal levels step up by one (up to the maximum), otherwise the higher level wins
    #[default]
    Combine,
    /// The target's enchantment stays, the sacrifice's copy is dropped
    TargetWins,
    /// Any shared enchantment disqualifies the candidate
    Reject,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionPolicy::Combine => write!(f, "combine"),
            CollisionPolicy::TargetWins => write!(f, "target-wins"),
            CollisionPolicy::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "combine" => Ok(CollisionPolicy::Combine),
            "target-wins" => Ok(CollisionPolicy::TargetWins),
            "reject" => Ok(CollisionPolicy::Reject),
            other => Err(format!(
                "unknown collision policy '{other}': expected combine, target-wins or reject"
            )),
        }
    }
}

/// Why a candidate was excluded from the minimum search.
///
/// Expected and frequent; never fatal for the search as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Disqualification {
    #[error("too expensive: merge costs {cost}, ceiling is {ceiling}")]
    TooExpensive { cost: u32, ceiling: u32 },

    #[error("kept enchantment lost: {0}")]
    KeptEnchantmentLost(String),

    #[error("enchantment on both sides of a merge: {0}")]
    EnchantmentCollision(String),
}

/// Why a tree produced no evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// Expected outcome: the candidate is skipped
    #[error(transparent)]
    Disqualified(#[from] Disqualification),

    /// The tree itself is broken; fatal for the search
    #[error(transparent)]
    Malformed(#[from] DomainError),
}

/// Result of evaluating one candidate tree.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Sum of all merge costs
    pub total_cost: u32,
    pub merges: usize,
    pub prior_work: PriorWork,
    pub enchantments: EnchantmentSet,
    /// The tree with every internal node filled in
    pub tree: MergeTree,
}

/// Computes merge costs against a borrowed table.
#[derive(Debug, Clone, Copy)]
pub struct CostEvaluator<'t> {
    table: &'t EnchantmentTable,
    ceiling: u32,
    collision: CollisionPolicy,
}

impl<'t> CostEvaluator<'t> {
    pub fn new(table: &'t EnchantmentTable, ceiling: u32, collision: CollisionPolicy) -> Self {
        Self {
            table,
            ceiling,
            collision,
        }
    }

    /// Evaluate every internal node bottom-up and return the root's totals.
    ///
    /// A disqualified merge ends the evaluation; a node without exactly two
    /// children, or a tree without a root, is a structural error.
    pub fn evaluate(&self, mut tree: MergeTree) -> Result<Evaluation, EvaluationError> {
        let order = tree
            .iter_postorder()
            .filter(|(_, node)| !node.is_leaf())
            .map(|(idx, node)| match node.children.as_slice() {
                [target, sacrifice] => Ok((idx, *target, *sacrifice)),
                other => Err(DomainError::MalformedTree(format!(
                    "internal node with {} children",
                    other.len()
                ))),
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let mut total_cost = 0u32;
        for &(idx, target_idx, sacrifice_idx) in &order {
            let (Some(target), Some(sacrifice)) =
                (tree.get_node(target_idx), tree.get_node(sacrifice_idx))
            else {
                return Err(DomainError::MalformedTree("dangling child index".to_string()).into());
            };
            let merged = self.merge(&target.data.item, &sacrifice.data.item)?;
            total_cost = total_cost
                .checked_add(merged.cost)
                .ok_or_else(|| self.overflow())?;
            let node = tree
                .get_node_mut(idx)
                .ok_or_else(|| DomainError::MalformedTree("dangling node index".to_string()))?;
            node.data.item = merged;
        }

        let root = tree
            .root()
            .and_then(|idx| tree.get_node(idx))
            .map(|node| node.data.item.clone())
            .ok_or_else(|| DomainError::MalformedTree("tree has no root".to_string()))?;
        check_kept(&tree, &root)?;

        trace!(total_cost, merges = order.len(), "tree evaluated");
        Ok(Evaluation {
            total_cost,
            merges: order.len(),
            prior_work: root.prior_work,
            enchantments: root.enchantments,
            tree,
        })
    }

    /// One anvil operation: `target` absorbs `sacrifice`.
    pub fn merge(&self, target: &Item, sacrifice: &Item) -> Result<Item, Disqualification> {
        let (enchantments, combination_cost) = self.combine(target, sacrifice)?;
        let cost = self
            .table
            .prior_work_penalty(target.prior_work)
            .checked_add(self.table.prior_work_penalty(sacrifice.prior_work))
            .and_then(|c| c.checked_add(combination_cost))
            .ok_or_else(|| self.overflow())?;
        if cost >= self.ceiling {
            return Err(Disqualification::TooExpensive {
                cost,
                ceiling: self.ceiling,
            });
        }
        Ok(Item::merged(
            target.name.clone(),
            target.item_type,
            enchantments,
            PriorWork::after_merge(target.prior_work, sacrifice.prior_work),
            cost,
        ))
    }

    fn combine(
        &self,
        target: &Item,
        sacrifice: &Item,
    ) -> Result<(EnchantmentSet, u32), Disqualification> {
        let mut combined = target.enchantments.clone();
        let mut cost = 0;

        for incoming in sacrifice.enchantments.iter() {
            cost = incoming
                .level
                .checked_mul(self.table.multiplier(incoming.id, sacrifice.item_type))
                .and_then(|c| c.checked_add(cost))
                .ok_or_else(|| self.overflow())?;

            let Some(existing) = combined.get(incoming.id) else {
                combined.insert(incoming.clone());
                continue;
            };
            let resolved = match self.collision {
                CollisionPolicy::Combine => combine_levels(existing, incoming),
                CollisionPolicy::TargetWins => {
                    if incoming.keep && incoming.level > existing.level {
                        return Err(Disqualification::KeptEnchantmentLost(incoming.to_string()));
                    }
                    Enchantment {
                        keep: existing.keep || incoming.keep,
                        ..existing.clone()
                    }
                }
                CollisionPolicy::Reject => {
                    return Err(Disqualification::EnchantmentCollision(
                        incoming.name.to_string(),
                    ));
                }
            };
            combined.insert(resolved);
        }

        Ok((combined, cost))
    }
}

/// Every `keep` enchantment of a leaf must reach the root at the same level or higher.
fn check_kept(tree: &MergeTree, root: &Item) -> Result<(), Disqualification> {
    let lost = tree
        .iter()
        .filter(|(_, node)| node.is_leaf())
        .flat_map(|(_, node)| node.data.item.enchantments.iter())
        .filter(|e| e.keep)
        .find(|e| !root.enchantments.covers(e));
    match lost {
        Some(e) => Err(Disqualification::KeptEnchantmentLost(e.to_string())),
        None => Ok(()),
    }
}

impl CostEvaluator<'_> {
    /// A cost that does not fit in `u32` is beyond any ceiling.
    fn overflow(&self) -> Disqualification {
        Disqualification::TooExpensive {
            cost: u32::MAX,
            ceiling: self.ceiling,
        }
    }
}

fn combine_levels(existing: &Enchantment, incoming: &Enchantment) -> Enchantment {
    let level = if existing.level == incoming.level {
        if existing.level < existing.max_level {
            existing.level + 1
        } else {
            existing.level
        }
    } else {
        existing.level.max(incoming.level)
    };
    Enchantment {
        keep: existing.keep || incoming.keep,
        ..existing.with_level(level)
    }
}
