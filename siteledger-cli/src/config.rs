use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use siteledger_finance::aging::DEFAULT_DUE_SOON_DAYS;
use siteledger_finance::{EstimatorConfig, KeywordTable, ReconcilePolicy};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_siteledger_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reconcile: ReconcilePolicy,
    #[serde(default)]
    pub aging: AgingSection,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub classifier: KeywordTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgingSection {
    /// IANA zone used to decide what "today" is
    pub timezone: String,
    /// Inclusive look-ahead for the due-soon bucket
    pub due_soon_days: i64,
}

impl Default for AgingSection {
    fn default() -> Self {
        Self {
            timezone: "America/Chicago".to_string(),
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }
}

pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => Ok(ensure_siteledger_home()?.join("config.toml")),
    }
}

/// Load config, falling back to defaults when the file does not exist.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = config_path(explicit)?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config, explicit: Option<&Path>) -> Result<PathBuf> {
    let p = config_path(explicit)?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let p = config_path(explicit)?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let written = save_config(&Config::default(), explicit)?;
    println!("Wrote {}", written.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteledger_core::ProjectType;

    #[test]
    fn test_default_config_roundtrips_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let s = r#"
[reconcile]
preserve_manual = true

[estimator]
location_bonus = 0.75
"#;
        let cfg: Config = toml::from_str(s).unwrap();
        assert!(cfg.reconcile.preserve_manual);
        assert_eq!(cfg.estimator.location_bonus, 0.75);
        assert_eq!(cfg.estimator.high_confidence_min_comparables, 5);
        assert_eq!(cfg.aging.due_soon_days, 7);
        assert_eq!(cfg.classifier.default_type, ProjectType::InteriorDemolition);
    }

    #[test]
    fn test_custom_fallback_rates() {
        let s = r#"
[[estimator.fallback_rates]]
project_type = "abatement"
per_square_foot = 14.0
minimum_total = 9000.0
"#;
        let cfg: Config = toml::from_str(s).unwrap();
        assert_eq!(cfg.estimator.fallback_rate(ProjectType::Abatement).per_square_foot, 14.0);
        // types not listed keep the built-in rate
        assert_eq!(cfg.estimator.fallback_rate(ProjectType::Restoration).per_square_foot, 22.0);
    }
}
