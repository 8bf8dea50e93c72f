//! Integration tests for Settings loading with layered precedence.
//!
//! Note: these tests assume no global config file exists, so the explicit
//! config file is layered directly over the compiled defaults.

use std::fs;

use tempfile::TempDir;

use anvilcalc::application::services::TiePolicy;
use anvilcalc::application::{ApplicationError, CollisionPolicy};
use anvilcalc::config::Settings;

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("anvilcalc.toml");
    fs::write(
        &path,
        r#"
max_items = 7
strict_identifiers = false

[search]
cost_ceiling = 35
tie_policy = "all"
collision_policy = "reject"
time_limit_ms = 1500
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.max_items, 7);
    assert!(!settings.strict_identifiers);
    assert_eq!(settings.search.cost_ceiling, 35);
    assert_eq!(settings.search.tie_policy, TiePolicy::All);
    assert_eq!(settings.search.collision_policy, CollisionPolicy::Reject);
    assert_eq!(settings.search.time_limit_ms, Some(1500));
    // untouched keys keep their defaults
    assert_eq!(settings.default_prior_work, 0);
    assert_eq!(settings.search.threads, 0);
}

#[test]
fn given_missing_local_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let result = Settings::load(Some(&path));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_unknown_key_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("anvilcalc.toml");
    fs::write(&path, "[search]\nceiling = 30\n").unwrap();

    let result = Settings::load(Some(&path));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_invalid_value_when_load_then_validation_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("anvilcalc.toml");
    fs::write(&path, "default_prior_work = 9\n").unwrap();

    let result = Settings::load(Some(&path));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_env_var_when_load_then_env_wins_over_file() {
    // max_winners is not asserted anywhere else in this binary
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("anvilcalc.toml");
    fs::write(&path, "[search]\nmax_winners = 3\n").unwrap();
    std::env::set_var("ANVILCALC_SEARCH__MAX_WINNERS", "5");

    let settings = Settings::load(Some(&path)).expect("load settings");
    std::env::remove_var("ANVILCALC_SEARCH__MAX_WINNERS");

    assert_eq!(settings.search.max_winners, 5);
}

#[test]
fn given_written_template_when_load_then_defaults_result() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("anvilcalc.toml");
    fs::write(&path, Settings::template()).unwrap();

    let settings = Settings::load(Some(&path)).expect("load settings");

    assert_eq!(settings.search.cost_ceiling, Settings::default().search.cost_ceiling);
    assert_eq!(settings.max_items, Settings::default().max_items);
}
