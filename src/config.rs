//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/anvilcalc/anvilcalc.toml`
//! 3. Local config: the file given with `--config`
//! 4. Environment variables: `ANVILCALC_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::TiePolicy;
use crate::application::{ApplicationError, CollisionPolicy};
use crate::domain::PriorWork;

/// Search tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchSettings {
    /// A single merge costing this much or more is "too expensive"
    pub cost_ceiling: u32,
    pub tie_policy: TiePolicy,
    /// Upper bound on reported winners under the `all` tie policy
    pub max_winners: usize,
    pub collision_policy: CollisionPolicy,
    /// Worker threads, 0 lets rayon decide
    pub threads: usize,
    /// Evaluate only this many candidates, in enumeration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_candidates: Option<u64>,
    /// Stop pulling new candidates after this many milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_ms: Option<u64>,
    /// Stop as soon as a candidate at or below this cost is found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_cost: Option<u32>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            cost_ceiling: 40,
            tie_policy: TiePolicy::First,
            max_winners: 16,
            collision_policy: CollisionPolicy::Combine,
            threads: 0,
            max_candidates: None,
            time_limit_ms: None,
            target_cost: None,
        }
    }
}

/// Raw search settings for intermediate parsing (every field optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSearchSettings {
    pub cost_ceiling: Option<u32>,
    pub tie_policy: Option<TiePolicy>,
    pub max_winners: Option<usize>,
    pub collision_policy: Option<CollisionPolicy>,
    pub threads: Option<usize>,
    pub max_candidates: Option<u64>,
    pub time_limit_ms: Option<u64>,
    pub target_cost: Option<u32>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub max_items: Option<usize>,
    pub strict_identifiers: Option<bool>,
    pub default_prior_work: Option<u8>,
    pub search: RawSearchSettings,
}

impl SearchSettings {
    /// Overlay wins where it specifies a value.
    pub fn merge(&self, overlay: &RawSearchSettings) -> Self {
        Self {
            cost_ceiling: overlay.cost_ceiling.unwrap_or(self.cost_ceiling),
            tie_policy: overlay.tie_policy.unwrap_or(self.tie_policy),
            max_winners: overlay.max_winners.unwrap_or(self.max_winners),
            collision_policy: overlay.collision_policy.unwrap_or(self.collision_policy),
            threads: overlay.threads.unwrap_or(self.threads),
            max_candidates: overlay.max_candidates.or(self.max_candidates),
            time_limit_ms: overlay.time_limit_ms.or(self.time_limit_ms),
            target_cost: overlay.target_cost.or(self.target_cost),
        }
    }
}

/// Unified configuration for anvilcalc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Largest item count accepted for a search
    pub max_items: usize,
    /// Reject enchantment identifiers outside -1..=37 instead of dropping them
    pub strict_identifiers: bool,
    /// Prior work for items that do not state one
    pub default_prior_work: u8,
    pub search: SearchSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_items: 9,
            strict_identifiers: true,
            default_prior_work: 0,
            search: SearchSettings::default(),
        }
    }
}

/// Get the XDG config directory for anvilcalc.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "anvilcalc").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("anvilcalc.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            max_items: overlay.max_items.unwrap_or(self.max_items),
            strict_identifiers: overlay
                .strict_identifiers
                .unwrap_or(self.strict_identifiers),
            default_prior_work: overlay
                .default_prior_work
                .unwrap_or(self.default_prior_work),
            search: self.search.merge(&overlay.search),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file; it must exist when given
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/anvilcalc/anvilcalc.toml`
    /// 3. Local config file
    /// 4. Environment variables: `ANVILCALC_*` prefix
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config, if present
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Explicit local config
        if let Some(path) = local {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.validate()?;
        Ok(current)
    }

    /// Apply ANVILCALC_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("ANVILCALC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<usize>("max_items") {
            settings.max_items = val;
        }
        if let Ok(val) = config.get::<bool>("strict_identifiers") {
            settings.strict_identifiers = val;
        }
        if let Ok(val) = config.get::<u8>("default_prior_work") {
            settings.default_prior_work = val;
        }
        if let Ok(val) = config.get::<u32>("search.cost_ceiling") {
            settings.search.cost_ceiling = val;
        }
        if let Ok(val) = config.get_string("search.tie_policy") {
            settings.search.tie_policy = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get::<usize>("search.max_winners") {
            settings.search.max_winners = val;
        }
        if let Ok(val) = config.get_string("search.collision_policy") {
            settings.search.collision_policy = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get::<usize>("search.threads") {
            settings.search.threads = val;
        }
        if let Ok(val) = config.get::<u64>("search.max_candidates") {
            settings.search.max_candidates = Some(val);
        }
        if let Ok(val) = config.get::<u64>("search.time_limit_ms") {
            settings.search.time_limit_ms = Some(val);
        }
        if let Ok(val) = config.get::<u32>("search.target_cost") {
            settings.search.target_cost = Some(val);
        }

        Ok(settings)
    }

    /// Reject values the search cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.max_items == 0 {
            return Err(ApplicationError::Config {
                message: "max_items must be at least 1".to_string(),
            });
        }
        if self.search.cost_ceiling == 0 {
            return Err(ApplicationError::Config {
                message: "search.cost_ceiling must be at least 1".to_string(),
            });
        }
        PriorWork::new(self.default_prior_work).map_err(|e| ApplicationError::Config {
            message: format!("default_prior_work: {e}"),
        })?;
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# anvilcalc configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/anvilcalc/anvilcalc.toml
#   Local:  file passed with --config
#   Env:    ANVILCALC_* environment variables, e.g. ANVILCALC_SEARCH__COST_CEILING=39

# Largest number of items accepted for a search (n! grows fast)
# max_items = 9

# Reject enchantment ids outside -1..=37 (false: drop them with a warning)
# strict_identifiers = true

# Prior work level for items that do not state one (0..=6)
# default_prior_work = 0

[search]
# A single merge costing this much or more is "too expensive"
# cost_ceiling = 40

# "first" reports one winner, "all" every candidate at the minimum
# tie_policy = "first"
# max_winners = 16

# Shared enchantments: "combine", "target-wins" or "reject"
# collision_policy = "combine"

# Worker threads (0 = one per core)
# threads = 0

# Early termination
# max_candidates = 100000
# time_limit_ms = 5000
# target_cost = 10
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
