use anyhow::{Context, Result, ensure};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default grid dimension (the grid is always square)
pub const DEFAULT_GRID_SIZE: usize = 20;
/// Length of a freshly spawned snake
pub const DEFAULT_INITIAL_LENGTH: usize = 3;
/// Shortest snake a run may start with
pub const MIN_INITIAL_LENGTH: usize = 3;
/// How often the hazard scheduler fires, in milliseconds
pub const DEFAULT_HAZARD_PERIOD_MS: u64 = 8000;
/// How long a spawned hazard stays on the board, in milliseconds
pub const DEFAULT_HAZARD_LIFETIME_MS: u64 = 5000;

/// Difficulty tier, mapped to a movement tick period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Impossible,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Impossible,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Impossible => "Impossible",
        }
    }
}

/// Movement tick period for every difficulty tier, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickPeriods {
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
    pub impossible: u64,
}

impl Default for TickPeriods {
    fn default() -> Self {
        Self {
            easy: 150,
            medium: 100,
            hard: 60,
            impossible: 30,
        }
    }
}

impl TickPeriods {
    /// Same period for every tier; handy for slow deterministic tests
    pub fn uniform(ms: u64) -> Self {
        Self {
            easy: ms,
            medium: ms,
            hard: ms,
            impossible: ms,
        }
    }

    pub fn for_difficulty(&self, difficulty: Difficulty) -> Duration {
        let ms = match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
            Difficulty::Impossible => self.impossible,
        };
        Duration::from_millis(ms)
    }
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width and height of the square game grid
    pub grid_size: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Difficulty used for the next run
    pub difficulty: Difficulty,
    /// Movement period per difficulty tier
    pub tick_periods: TickPeriods,
    /// Whether transient hazards appear at all
    pub hazards_enabled: bool,
    /// Hazard scheduler period in milliseconds
    pub hazard_period_ms: u64,
    /// Hazard lifetime in milliseconds
    pub hazard_lifetime_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            initial_snake_length: DEFAULT_INITIAL_LENGTH,
            difficulty: Difficulty::default(),
            tick_periods: TickPeriods::default(),
            hazards_enabled: true,
            hazard_period_ms: DEFAULT_HAZARD_PERIOD_MS,
            hazard_lifetime_ms: DEFAULT_HAZARD_LIFETIME_MS,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom grid size
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10)
    }

    /// Read a JSON configuration file; missing fields fall back to defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig =
            serde_json::from_str(&json).context("Failed to deserialize config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.grid_size >= 2, "grid_size must be at least 2");
        ensure!(
            self.initial_snake_length >= MIN_INITIAL_LENGTH,
            "initial_snake_length must be at least {MIN_INITIAL_LENGTH}"
        );
        // The spawn is centred with the body trailing left, and food needs a free cell
        ensure!(
            self.grid_size / 2 + 1 >= self.initial_snake_length,
            "grid_size {} is too small for a snake of length {}",
            self.grid_size,
            self.initial_snake_length
        );
        for difficulty in Difficulty::ALL {
            ensure!(
                !self.tick_periods.for_difficulty(difficulty).is_zero(),
                "tick period for {} must be non-zero",
                difficulty.as_str()
            );
        }
        ensure!(self.hazard_period_ms > 0, "hazard_period_ms must be non-zero");
        ensure!(
            self.hazard_lifetime_ms > 0,
            "hazard_lifetime_ms must be non-zero"
        );
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_periods.for_difficulty(self.difficulty)
    }

    pub fn hazard_period(&self) -> Duration {
        Duration::from_millis(self.hazard_period_ms)
    }

    pub fn hazard_lifetime(&self) -> Duration {
        Duration::from_millis(self.hazard_lifetime_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_size, 20);
        assert_eq!(config.initial_snake_length, 3);
        assert_eq!(config.difficulty, Difficulty::Medium);
        assert_eq!(config.hazard_period(), Duration::from_millis(8000));
        assert_eq!(config.hazard_lifetime(), Duration::from_millis(5000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tick_period_per_difficulty() {
        let periods = TickPeriods::default();
        assert_eq!(periods.for_difficulty(Difficulty::Easy).as_millis(), 150);
        assert_eq!(periods.for_difficulty(Difficulty::Medium).as_millis(), 100);
        assert_eq!(periods.for_difficulty(Difficulty::Hard).as_millis(), 60);
        assert_eq!(periods.for_difficulty(Difficulty::Impossible).as_millis(), 30);
    }

    #[test]
    fn test_validation_rejects_tiny_grid() {
        let config = GameConfig::new(3);
        assert!(config.validate().is_err());

        let config = GameConfig {
            tick_periods: TickPeriods::uniform(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        for initial_snake_length in [0, 1, 2] {
            let config = GameConfig {
                initial_snake_length,
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_load_partial_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{ "grid_size": 15, "difficulty": "hard" }"#).unwrap();

        let config = GameConfig::load(&path).unwrap();
        assert_eq!(config.grid_size, 15);
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.hazard_period_ms, DEFAULT_HAZARD_PERIOD_MS);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(GameConfig::load(&temp_dir.path().join("nope.json")).is_err());
    }
}
