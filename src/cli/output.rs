//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::application::services::{SearchOutcome, SearchStats, Winner};
use crate::application::Evaluation;
use crate::domain::Item;
use crate::tree_traits::render_tree;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Starting items, numbered in input order.
pub fn items(items: &[Item]) {
    header("Items");
    for (i, item) in items.iter().enumerate() {
        detail(&format!("{}. {} (prior work {})", i + 1, item, item.prior_work));
    }
}

/// Winners with their trees, then the search statistics.
pub fn outcome(outcome: &SearchOutcome) {
    for (i, winner) in outcome.winners.iter().enumerate() {
        if outcome.winners.len() > 1 {
            header(&format!("Option {}", i + 1));
        }
        self::winner(winner);
    }
    stats(&outcome.stats);
    success(&format!("cheapest total: {} levels", outcome.best_cost));
}

fn winner(winner: &Winner) {
    let order: Vec<String> = winner.assignment.iter().map(|i| (i + 1).to_string()).collect();
    action(
        "Candidate",
        &format!(
            "#{} (shape {}, items {})",
            winner.ordinal,
            winner.shape_index + 1,
            order.join(" ")
        ),
    );
    evaluation(&winner.evaluation);
}

fn evaluation(evaluation: &Evaluation) {
    info(&render_tree(&evaluation.tree).trim_end());
    detail(&format!("total cost: {}", evaluation.total_cost));
    detail(&format!("merges: {}", evaluation.merges));
    detail(&format!("final prior work: {}", evaluation.prior_work));
    detail(&format!("enchantments: {}", evaluation.enchantments));
}

fn stats(stats: &SearchStats) {
    header("Search");
    detail(&format!(
        "evaluated {} of {} candidates in {:.2?}",
        stats.evaluated, stats.total_candidates, stats.elapsed
    ));
    if stats.disqualified() > 0 {
        detail(&format!(
            "disqualified: {} too expensive, {} lost kept enchantments, {} collisions",
            stats.too_expensive, stats.kept_lost, stats.collisions
        ));
    }
    if let Some(reason) = stats.stopped {
        warning(&format!("search stopped early: {reason}"));
    }
}
