use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{Enchantment, EnchantmentSet, EnchantmentTable, Item, ItemType, PriorWork};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // rayon is chatty at trace level
    let noisy_modules = ["rayon"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Fresh book carrying one enchantment, looked up by name.
///
/// Panics on unknown names; meant for tests only.
pub fn book(name: &str, enchantment: &str, level: u32) -> Item {
    leaf(name, ItemType::Book, &[(enchantment, level, false)], 0)
}

/// Leaf item with `(enchantment, level, keep)` entries.
///
/// Panics on invalid input; meant for tests only.
pub fn leaf(
    name: &str,
    item_type: ItemType,
    enchantments: &[(&str, u32, bool)],
    prior_work: u8,
) -> Item {
    let table = EnchantmentTable::standard();
    let set = EnchantmentSet::from_unique(enchantments.iter().map(|&(ench, level, keep)| {
        let id = table.id_by_name(ench).expect("known enchantment");
        Enchantment::new(table, id, level, keep).expect("valid level")
    }))
    .expect("unique enchantments");
    Item::leaf(
        name,
        item_type,
        set,
        PriorWork::new(prior_work).expect("valid prior work"),
    )
}
