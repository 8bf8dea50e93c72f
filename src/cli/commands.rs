//! Command dispatch

use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::SearchService;
use crate::application::{parse_items, ApplicationError};
use crate::cli::args::{Cli, Commands, ConfigCommands, SearchOverrides};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{DomainError, EnchantmentTable, ShapeBuilder, ShapeLayout};
use crate::tree_traits::render_shape;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Plan { items, overrides }) => {
            let settings = load_settings(cli)?;
            cmd_plan(&settings, items, overrides)
        }
        Some(Commands::Count { n }) => cmd_count(*n),
        Some(Commands::Shapes { n }) => {
            let settings = load_settings(cli)?;
            cmd_shapes(&settings, *n)
        }
        Some(Commands::Enchantments) => cmd_enchantments(),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cmd_config_show(&load_settings(cli)?),
            ConfigCommands::Init { path } => cmd_config_init(path.as_deref()),
            ConfigCommands::Path => cmd_config_path(cli.config.as_deref()),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `anvilcalc --help`".to_string(),
        )),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    Ok(Settings::load(cli.config.as_deref())?)
}

/// Command-line values win over every config layer.
fn apply_overrides(settings: &mut Settings, overrides: &SearchOverrides) -> CliResult<()> {
    let search = &mut settings.search;
    if let Some(ceiling) = overrides.ceiling {
        search.cost_ceiling = ceiling;
    }
    if let Some(ties) = overrides.ties {
        search.tie_policy = ties;
    }
    if let Some(collision) = overrides.collision {
        search.collision_policy = collision;
    }
    if let Some(threads) = overrides.threads {
        search.threads = threads;
    }
    search.max_candidates = overrides.max_candidates.or(search.max_candidates);
    search.time_limit_ms = overrides.time_limit_ms.or(search.time_limit_ms);
    search.target_cost = overrides.target_cost.or(search.target_cost);
    settings.validate()?;
    Ok(())
}

#[instrument(skip(settings, overrides))]
fn cmd_plan(settings: &Settings, path: &Path, overrides: &SearchOverrides) -> CliResult<()> {
    let mut settings = settings.clone();
    apply_overrides(&mut settings, overrides)?;
    debug!(?settings, "effective settings");

    let content = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    let table = EnchantmentTable::standard();
    let items = parse_items(
        &content,
        table,
        settings.strict_identifiers,
        settings.default_prior_work,
    )?;
    output::items(&items);

    let service = SearchService::new(&settings, table);
    match service.search(&items) {
        Ok(outcome) => {
            output::outcome(&outcome);
            Ok(())
        }
        Err(e @ ApplicationError::NoFeasibleTree { .. }) => {
            output::warning(&format!(
                "every order has a merge costing {} levels or more",
                settings.search.cost_ceiling
            ));
            Err(e.into())
        }
        Err(e @ ApplicationError::SearchStopped { .. }) => {
            output::warning(&"raise max_candidates or time_limit_ms to search further");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_count(n: usize) -> CliResult<()> {
    let layout = ShapeLayout::new(n)?;
    output::action("Items", &layout.items);
    output::detail(&format!(
        "base tree: {} full rows, {} leaf positions",
        layout.full_rows, layout.base_positions
    ));
    output::detail(&format!("extra pairs: {}", layout.extra_pairs));
    output::detail(&format!("shapes: {}", layout.shape_count()?));
    output::detail(&format!(
        "assignments per shape: {}",
        layout.permutations_per_shape()?
    ));
    output::success(&format!("candidates: {}", layout.total_candidates()?));
    Ok(())
}

fn cmd_shapes(settings: &Settings, n: usize) -> CliResult<()> {
    if n > settings.max_items {
        return Err(DomainError::InvalidInputCount {
            count: n,
            max: settings.max_items,
        }
        .into());
    }
    let builder = ShapeBuilder::new(ShapeLayout::new(n)?);
    for (i, shape) in builder.shapes().iter().enumerate() {
        output::header(&format!("Shape {}", i + 1));
        output::info(&render_shape(shape).trim_end());
    }
    Ok(())
}

fn cmd_enchantments() -> CliResult<()> {
    output::header(&format!(
        "{:>3}  {:<24} {:>4} {:>4} {:>5}",
        "id", "name", "item", "book", "max"
    ));
    for (id, info) in EnchantmentTable::standard().iter() {
        output::info(&format!(
            "{:>3}  {:<24} {:>4} {:>4} {:>5}",
            id, info.name, info.item_multiplier, info.book_multiplier, info.max_level
        ));
    }
    Ok(())
}

fn cmd_config_show(settings: &Settings) -> CliResult<()> {
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_init(path: Option<&Path>) -> CliResult<()> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => global_config_path().ok_or_else(|| {
            CliError::Usage("cannot determine config directory".to_string())
        })?,
    };
    if target.exists() {
        return Err(CliError::Usage(format!(
            "config already exists: {}",
            target.display()
        )));
    }
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| CliError::io(parent, e))?;
        }
    }
    std::fs::write(&target, Settings::template()).map_err(|e| CliError::io(&target, e))?;
    output::action("Created", &target.display());
    Ok(())
}

fn cmd_config_path(local: Option<&Path>) -> CliResult<()> {
    match global_config_path() {
        Some(path) => {
            let state = if path.exists() { "" } else { " (not found)" };
            output::action("Global", &format!("{}{}", path.display(), state));
        }
        None => output::action("Global", &"unavailable"),
    }
    match local {
        Some(path) => output::action("Local", &path.display()),
        None => output::action("Local", &"none (pass --config)"),
    }
    Ok(())
}
