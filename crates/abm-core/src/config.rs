//! Configuration System
//!
//! Run, grid and model parameters, loadable from TOML. Every section has
//! defaults, so a file only needs the values it changes.
//!
//! ```toml
//! [simulation]
//! seed = 7
//! ticks = 200
//!
//! [grid]
//! width = 20
//! height = 20
//!
//! [model]
//! kind = "epidemic"
//! infection_rate = 0.3
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub simulation: RunConfig,
    pub grid: GridConfig,
    pub model: ModelConfig,
}

/// Run control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub seed: u64,
    pub ticks: u64,
    /// Capture a grid frame after every tick
    pub record_frames: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: 100,
            record_frames: false,
        }
    }
}

/// Grid dimensions and topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
    pub torus: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            torus: true,
        }
    }
}

/// Which model populates the grid, with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelConfig {
    Epidemic(EpidemicConfig),
    Wealth(WealthConfig),
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig::Epidemic(EpidemicConfig::default())
    }
}

impl ModelConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ModelConfig::Epidemic(_) => "epidemic",
            ModelConfig::Wealth(_) => "wealth",
        }
    }
}

/// SIR epidemic parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpidemicConfig {
    /// Agents per cell, used when `population` is not given
    pub density: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<usize>,
    pub initial_infected: usize,
    pub infection_rate: f64,
    pub recovery_time: u32,
}

impl Default for EpidemicConfig {
    fn default() -> Self {
        Self {
            density: 0.8,
            population: None,
            initial_infected: 5,
            infection_rate: 0.25,
            recovery_time: 10,
        }
    }
}

impl EpidemicConfig {
    /// Agent count for a grid of the given size: `population` if set,
    /// otherwise `floor(width * height * density)`.
    pub fn population_for(&self, width: u32, height: u32) -> usize {
        self.population
            .unwrap_or_else(|| (width as f64 * height as f64 * self.density).floor() as usize)
    }
}

/// Wealth exchange parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WealthConfig {
    pub agents: usize,
    pub initial_wealth: u64,
}

impl Default for WealthConfig {
    fn default() -> Self {
        Self {
            agents: 100,
            initial_wealth: 10,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::epidemic()
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(
            field,
            format!("must be a finite value in [0, 1], got {value}"),
        ));
    }
    Ok(())
}

impl SimConfig {
    /// 50x50 torus, density 0.8, 5 initially infected
    pub fn epidemic() -> Self {
        Self {
            simulation: RunConfig::default(),
            grid: GridConfig::default(),
            model: ModelConfig::Epidemic(EpidemicConfig::default()),
        }
    }

    /// 10x10 torus, 100 agents holding 10 each
    pub fn wealth() -> Self {
        Self {
            simulation: RunConfig::default(),
            grid: GridConfig {
                width: 10,
                height: 10,
                torus: true,
            },
            model: ModelConfig::Wealth(WealthConfig::default()),
        }
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parse and validate TOML text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects values no run can start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 {
            return Err(ConfigError::invalid("grid.width", "must be positive"));
        }
        if self.grid.height == 0 {
            return Err(ConfigError::invalid("grid.height", "must be positive"));
        }
        if self.grid.width > i32::MAX as u32 || self.grid.height > i32::MAX as u32 {
            return Err(ConfigError::invalid("grid", "dimensions exceed i32::MAX"));
        }
        match &self.model {
            ModelConfig::Epidemic(epidemic) => {
                check_probability("model.density", epidemic.density)?;
                check_probability("model.infection_rate", epidemic.infection_rate)?;
                if epidemic.recovery_time == 0 {
                    return Err(ConfigError::invalid("model.recovery_time", "must be positive"));
                }
            }
            ModelConfig::Wealth(wealth) => {
                // every later sum of agent wealth must fit in u64
                if (wealth.agents as u64)
                    .checked_mul(wealth.initial_wealth)
                    .is_none()
                {
                    return Err(ConfigError::invalid(
                        "model.initial_wealth",
                        format!(
                            "{} agents holding {} each exceed u64::MAX in total",
                            wealth.agents, wealth.initial_wealth
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_presets_are_valid() {
        SimConfig::epidemic().validate().unwrap();
        SimConfig::wealth().validate().unwrap();
        assert_eq!(SimConfig::default(), SimConfig::epidemic());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = SimConfig::from_str(
            r#"
            [grid]
            width = 10
            height = 10

            [model]
            kind = "wealth"
            agents = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation, RunConfig::default());
        assert!(config.grid.torus);
        assert_eq!(
            config.model,
            ModelConfig::Wealth(WealthConfig {
                agents: 30,
                initial_wealth: 10,
            })
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = SimConfig::epidemic();
        config.simulation.seed = 99;
        if let ModelConfig::Epidemic(ref mut e) = config.model {
            e.population = Some(12);
        }
        let text = config.to_toml().unwrap();
        assert!(text.contains("kind = \"epidemic\""));
        assert_eq!(SimConfig::from_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            ("[grid]\nwidth = 0", "grid.width"),
            ("[grid]\nheight = 0", "grid.height"),
            ("[model]\nkind = \"epidemic\"\ndensity = 1.5", "model.density"),
            ("[model]\nkind = \"epidemic\"\ninfection_rate = -0.1", "model.infection_rate"),
            ("[model]\nkind = \"epidemic\"\ninfection_rate = nan", "model.infection_rate"),
            ("[model]\nkind = \"epidemic\"\nrecovery_time = 0", "model.recovery_time"),
        ];
        for (text, expected) in cases {
            match SimConfig::from_str(text) {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected, "{text}"),
                other => panic!("expected invalid {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_total_wealth_must_fit() {
        let mut config = SimConfig::wealth();
        config.grid.width = 1;
        config.grid.height = 1;
        config.model = ModelConfig::Wealth(WealthConfig {
            agents: 2,
            initial_wealth: u64::MAX,
        });
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "model.initial_wealth"),
            other => panic!("expected invalid initial_wealth, got {other:?}"),
        }

        // a single holder of everything is still fine
        config.model = ModelConfig::Wealth(WealthConfig {
            agents: 1,
            initial_wealth: u64::MAX,
        });
        config.validate().unwrap();
    }

    #[test]
    fn test_negative_counts_fail_to_parse() {
        let err = SimConfig::from_str("[model]\nkind = \"wealth\"\ninitial_wealth = -3").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_population_from_density() {
        let epidemic = EpidemicConfig::default();
        assert_eq!(epidemic.population_for(50, 50), 2000);
        assert_eq!(epidemic.population_for(3, 3), 7);
        let fixed = EpidemicConfig {
            population: Some(9),
            ..EpidemicConfig::default()
        };
        assert_eq!(fixed.population_for(50, 50), 9);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[simulation]\nseed = 5\nticks = 3").unwrap();
        let config = SimConfig::load(file.path()).unwrap();
        assert_eq!(config.simulation.seed, 5);
        assert_eq!(config.simulation.ticks, 3);

        assert!(matches!(
            SimConfig::load("/definitely/not/here.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
