use anyhow::{bail, Context, Result};
use cryptomix_core::{Bias, Experiment, Variant};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_cryptomix_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub experiments: Vec<Experiment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// EnvFilter directive used when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingSection::default(),
            experiments: vec![
                Experiment::new("allocation-modifier", 1.0)
                    .with_variant(Variant::control("control"), 2)
                    .with_variant(Variant::with_bias("more-conservative", Bias::MoreConservative), 1)
                    .with_variant(Variant::with_bias("more-diversified", Bias::MoreDiversified), 1),
            ],
        }
    }
}

impl Config {
    pub fn experiment(&self, id: &str) -> Option<&Experiment> {
        self.experiments.iter().find(|e| e.id == id)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_cryptomix_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s).context("parse config.toml")?;
    for exp in &cfg.experiments {
        if !(0.0..=1.0).contains(&exp.traffic) {
            bail!("experiment {}: traffic must be within 0.0..=1.0, got {}", exp.id, exp.traffic);
        }
    }
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        let back = parse_config(&s).unwrap();
        assert_eq!(back.experiments, cfg.experiments);
        assert_eq!(back.logging.level, "warn");
    }

    #[test]
    fn test_parse_hand_written_config() {
        let cfg = parse_config(
            r#"
[logging]
level = "debug"

[[experiments]]
id = "bias-test"
traffic = 0.5
weights = [1, 1]

[[experiments.variants]]
name = "control"

[[experiments.variants]]
name = "aggressive"
modifier = "more-aggressive"
"#,
        )
        .unwrap();
        let exp = cfg.experiment("bias-test").unwrap();
        assert_eq!(exp.variants.len(), 2);
        assert_eq!(exp.variants[1].modifier, Some(Bias::MoreAggressive));
        assert_eq!(exp.variants[0].modifier, None);
    }

    #[test]
    fn test_out_of_range_traffic_is_rejected() {
        let experiment = |traffic: &str| {
            format!(
                "[[experiments]]\nid = \"x\"\ntraffic = {traffic}\nweights = [1]\n\n[[experiments.variants]]\nname = \"control\"\n"
            )
        };
        assert!(parse_config(&experiment("1.5")).is_err());
        assert!(parse_config(&experiment("-0.1")).is_err());
        assert!(parse_config(&experiment("nan")).is_err());
        assert_eq!(parse_config(&experiment("1.0")).unwrap().experiments[0].traffic, 1.0);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert!(cfg.experiments.is_empty());
        assert_eq!(cfg.logging.level, "warn");
    }
}
