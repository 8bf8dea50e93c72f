//! Minimum-cost search over every merge-tree candidate
//!
//! Candidates come from the lazy [`CandidateEnumerator`] and are evaluated on a
//! rayon pool. Workers own the trees they build; the only shared state is the
//! stop flag and the disqualification counters. The best result is reduced
//! with fold/reduce, ordering by `(cost, ordinal)` so the winner does not
//! depend on scheduling.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::application::evaluator::{
    CostEvaluator, Disqualification, Evaluation, EvaluationError,
};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::{SearchSettings, Settings};
use crate::domain::{assemble, Candidate, CandidateEnumerator, DomainError, EnchantmentTable, Item};

/// Which of several equally cheap candidates are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TiePolicy {
    /// The candidate that comes first in enumeration order
    #[default]
    First,
    /// Every candidate at the minimum, in enumeration order, up to `max_winners`
    All,
}

impl fmt::Display for TiePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiePolicy::First => write!(f, "first"),
            TiePolicy::All => write!(f, "all"),
        }
    }
}

impl FromStr for TiePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(TiePolicy::First),
            "all" => Ok(TiePolicy::All),
            other => Err(format!("unknown tie policy '{other}': expected first or all")),
        }
    }
}

/// Why a search ended before exhausting the candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    CandidateLimit,
    TimeLimit,
    TargetReached,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::CandidateLimit => write!(f, "candidate limit reached"),
            StopReason::TimeLimit => write!(f, "time limit reached"),
            StopReason::TargetReached => write!(f, "target cost reached"),
        }
    }
}

/// One minimum-cost candidate.
#[derive(Debug, Clone)]
pub struct Winner {
    pub ordinal: u64,
    pub shape_index: usize,
    pub assignment: Vec<usize>,
    pub evaluation: Evaluation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Size of the full candidate space
    pub total_candidates: u128,
    pub evaluated: u64,
    pub too_expensive: u64,
    pub kept_lost: u64,
    pub collisions: u64,
    pub stopped: Option<StopReason>,
    pub elapsed: Duration,
}

impl SearchStats {
    pub fn disqualified(&self) -> u64 {
        self.too_expensive + self.kept_lost + self.collisions
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best_cost: u32,
    /// Ordered by ordinal; exactly one under [`TiePolicy::First`]
    pub winners: Vec<Winner>,
    pub stats: SearchStats,
}

#[derive(Default)]
struct Counters {
    evaluated: AtomicU64,
    too_expensive: AtomicU64,
    kept_lost: AtomicU64,
    collisions: AtomicU64,
}

impl Counters {
    fn record(&self, disqualification: &Disqualification) {
        let counter = match disqualification {
            Disqualification::TooExpensive { .. } => &self.too_expensive,
            Disqualification::KeptEnchantmentLost(_) => &self.kept_lost,
            Disqualification::EnchantmentCollision(_) => &self.collisions,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Partial minimum held by one rayon fold.
#[derive(Debug, Default)]
struct Best {
    cost: Option<u32>,
    winners: Vec<Winner>,
}

impl Best {
    fn offer(self, winner: Winner, policy: TiePolicy, cap: usize) -> Self {
        let cost = winner.evaluation.total_cost;
        self.merge(
            Best {
                cost: Some(cost),
                winners: vec![winner],
            },
            policy,
            cap,
        )
    }

    fn merge(self, other: Best, policy: TiePolicy, cap: usize) -> Self {
        let (mut best, other) = match (self.cost, other.cost) {
            (None, _) => return other,
            (_, None) => return self,
            (Some(a), Some(b)) if a < b => return self,
            (Some(a), Some(b)) if b < a => return other,
            _ => (self, other),
        };
        best.winners.extend(other.winners);
        best.winners.sort_by_key(|w| w.ordinal);
        let keep = match policy {
            TiePolicy::First => 1,
            TiePolicy::All => cap.max(1),
        };
        best.winners.truncate(keep);
        best
    }
}

/// Drives enumeration and evaluation, keeping the cheapest candidates.
pub struct SearchService {
    settings: SearchSettings,
    max_items: usize,
    table: &'static EnchantmentTable,
}

impl SearchService {
    pub fn new(settings: &Settings, table: &'static EnchantmentTable) -> Self {
        Self {
            settings: settings.search.clone(),
            max_items: settings.max_items,
            table,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Find the cheapest merge order for `items`.
    ///
    /// Disqualified candidates are counted and skipped. If nothing survives,
    /// [`ApplicationError::NoFeasibleTree`] is returned.
    #[instrument(level = "debug", skip_all, fields(items = items.len()))]
    pub fn search(&self, items: &[Item]) -> ApplicationResult<SearchOutcome> {
        if items.is_empty() || items.len() > self.max_items {
            return Err(DomainError::InvalidInputCount {
                count: items.len(),
                max: self.max_items,
            }
            .into());
        }

        let enumerator = CandidateEnumerator::new(items.len())?;
        let total_candidates = enumerator.layout().total_candidates()?;
        info!(
            items = items.len(),
            total_candidates = %total_candidates,
            "starting merge order search"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.threads)
            .build()
            .map_err(|e| ApplicationError::OperationFailed {
                context: "build search thread pool".to_string(),
                source: Box::new(e),
            })?;

        let evaluator = CostEvaluator::new(
            self.table,
            self.settings.cost_ceiling,
            self.settings.collision_policy,
        );
        let counters = Counters::default();
        let stop = AtomicBool::new(false);
        let stop_reason: OnceLock<StopReason> = OnceLock::new();
        let started = Instant::now();
        let deadline = self
            .settings
            .time_limit_ms
            .map(|ms| started + Duration::from_millis(ms));
        let limit = self
            .settings
            .max_candidates
            .and_then(|m| usize::try_from(m).ok())
            .unwrap_or(usize::MAX);
        let policy = self.settings.tie_policy;
        let cap = self.settings.max_winners;

        let best = pool.install(|| {
            enumerator
                .take(limit)
                .take_while(|_| {
                    if stop.load(Ordering::Relaxed) {
                        return false;
                    }
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        let _ = stop_reason.set(StopReason::TimeLimit);
                        stop.store(true, Ordering::Relaxed);
                        return false;
                    }
                    true
                })
                .par_bridge()
                .filter_map(|candidate| {
                    if stop.load(Ordering::Relaxed) {
                        return None;
                    }
                    match self.evaluate_candidate(candidate, items, &evaluator, &counters) {
                        Ok(Some(winner)) => {
                            if self
                                .settings
                                .target_cost
                                .is_some_and(|target| winner.evaluation.total_cost <= target)
                            {
                                let _ = stop_reason.set(StopReason::TargetReached);
                                stop.store(true, Ordering::Relaxed);
                            }
                            Some(Ok(winner))
                        }
                        Ok(None) => None,
                        Err(e) => {
                            stop.store(true, Ordering::Relaxed);
                            Some(Err(e))
                        }
                    }
                })
                .try_fold(Best::default, |best, winner| {
                    winner.map(|w| best.offer(w, policy, cap))
                })
                .try_reduce(Best::default, |a, b| Ok(a.merge(b, policy, cap)))
        })?;

        let mut stopped = stop_reason.get().copied();
        if stopped.is_none() && (limit as u128) < total_candidates {
            stopped = Some(StopReason::CandidateLimit);
        }
        let stats = SearchStats {
            total_candidates,
            evaluated: counters.evaluated.load(Ordering::Relaxed),
            too_expensive: counters.too_expensive.load(Ordering::Relaxed),
            kept_lost: counters.kept_lost.load(Ordering::Relaxed),
            collisions: counters.collisions.load(Ordering::Relaxed),
            stopped,
            elapsed: started.elapsed(),
        };
        debug!(?stats, "search finished");

        match best.cost {
            Some(best_cost) => {
                info!(best_cost, winners = best.winners.len(), "cheapest order found");
                Ok(SearchOutcome {
                    best_cost,
                    winners: best.winners,
                    stats,
                })
            }
            None => match stats.stopped {
                Some(reason) => Err(ApplicationError::SearchStopped {
                    reason,
                    evaluated: stats.evaluated,
                }),
                None => Err(ApplicationError::NoFeasibleTree {
                    evaluated: stats.evaluated,
                }),
            },
        }
    }

    /// `Ok(None)` for a disqualified candidate; errors only for broken trees.
    fn evaluate_candidate(
        &self,
        candidate: Candidate,
        items: &[Item],
        evaluator: &CostEvaluator<'_>,
        counters: &Counters,
    ) -> ApplicationResult<Option<Winner>> {
        counters.evaluated.fetch_add(1, Ordering::Relaxed);
        let tree = assemble(&candidate.shape, &candidate.assignment, items)?;
        match evaluator.evaluate(tree) {
            Ok(evaluation) => Ok(Some(Winner {
                ordinal: candidate.ordinal,
                shape_index: candidate.shape_index,
                assignment: candidate.assignment,
                evaluation,
            })),
            Err(EvaluationError::Disqualified(disqualification)) => {
                trace!(ordinal = candidate.ordinal, %disqualification, "candidate disqualified");
                counters.record(&disqualification);
                Ok(None)
            }
            Err(EvaluationError::Malformed(e)) => Err(e.into()),
        }
    }
}
