//! Service configuration.
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! stock establishment: Bob preparing, Alice and Charlie waiting tables.
//! Durations are stored as milliseconds and exposed as [`Duration`]s.
//!
//! A config file is TOML and only needs the fields it overrides:
//!
//! ```toml
//! seed = 7
//! closing_countdown_secs = 2
//!
//! [preparer]
//! productivity = 5.0
//!
//! [[waiters]]
//! name = "Dana"
//! productivity = 1.2
//! ```

use crate::error::ServiceError;
use crate::model::WalkRange;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Environment variable naming a config file when `--config` is not given.
pub const CONFIG_PATH_ENV: &str = "CAFE_CONFIG_PATH";

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    File(PathBuf),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Journal file, truncated at the start of every run.
    pub log_path: PathBuf,
    /// Console announcements and the spinner. Off for tests and pipes.
    pub interactive: bool,
    /// Seed for every productivity walk. `None` draws from entropy.
    pub seed: Option<u64>,
    /// Time the staff take to get ready before the doors open.
    pub setup_delay_ms: u64,
    pub closing_countdown_secs: u32,
    pub countdown_tick_ms: u64,
    /// Pause between the closing announcement and the first countdown line.
    pub closing_notice_ms: u64,
    pub flush_interval_ms: u64,
    /// Longest the order source sleeps between clock checks.
    pub feed_poll_ms: u64,
    pub spinner_tick_ms: u64,
    /// Lower bound for every productivity walk. Must be positive.
    pub productivity_floor: f64,
    /// When off, the preparer never serves orders directly.
    pub track_busy_waiters: bool,
    /// Log add/remove events on both queues.
    pub queues_verbose: bool,
    pub preparer: PreparerConfig,
    pub waiters: Vec<WaiterConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("cafe.log"),
            interactive: true,
            seed: None,
            setup_delay_ms: 1_500,
            closing_countdown_secs: 4,
            countdown_tick_ms: 1_000,
            closing_notice_ms: 300,
            flush_interval_ms: 200,
            feed_poll_ms: 200,
            spinner_tick_ms: 50,
            productivity_floor: 0.1,
            track_busy_waiters: true,
            queues_verbose: true,
            preparer: PreparerConfig::default(),
            waiters: vec![
                WaiterConfig::named("Alice", 1.9),
                WaiterConfig::named("Charlie", 0.6),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreparerConfig {
    pub name: String,
    pub productivity: f64,
    pub verbose: bool,
    /// Nominal time to prepare one item at productivity 1.
    pub item_delay_ms: u64,
    /// Nominal time to serve one item when bypassing the delivery queue.
    pub direct_item_delay_ms: u64,
    /// Sleep when the intake queue is empty.
    pub idle_poll_ms: u64,
    pub pop_timeout_ms: u64,
    pub yield_ms: u64,
    pub prepare_walk: WalkRange,
    pub direct_walk: WalkRange,
}

impl Default for PreparerConfig {
    fn default() -> Self {
        Self {
            name: "Bob".to_string(),
            productivity: 3.5,
            verbose: true,
            item_delay_ms: 200,
            direct_item_delay_ms: 800,
            idle_poll_ms: 200,
            pop_timeout_ms: 100,
            yield_ms: 50,
            prepare_walk: WalkRange::new(0.95, 1.05),
            direct_walk: WalkRange::new(0.95, 1.5),
        }
    }
}

impl PreparerConfig {
    pub fn item_delay(&self) -> Duration {
        millis(self.item_delay_ms)
    }

    pub fn direct_item_delay(&self) -> Duration {
        millis(self.direct_item_delay_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        millis(self.idle_poll_ms)
    }

    pub fn pop_timeout(&self) -> Duration {
        millis(self.pop_timeout_ms)
    }

    pub fn yield_for(&self) -> Duration {
        millis(self.yield_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaiterConfig {
    pub name: String,
    pub productivity: f64,
    pub verbose: bool,
    /// Nominal time to write up one order at productivity 1.
    pub intake_delay_ms: u64,
    /// Nominal time to serve one item at productivity 1.
    pub item_delay_ms: u64,
    pub pop_timeout_ms: u64,
    pub yield_ms: u64,
    pub intake_walk: WalkRange,
    pub deliver_walk: WalkRange,
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self::named("Waiter", 1.0)
    }
}

impl WaiterConfig {
    pub fn named(name: &str, productivity: f64) -> Self {
        Self {
            name: name.to_string(),
            productivity,
            verbose: true,
            intake_delay_ms: 300,
            item_delay_ms: 400,
            pop_timeout_ms: 200,
            yield_ms: 100,
            intake_walk: WalkRange::new(0.95, 1.5),
            deliver_walk: WalkRange::new(0.95, 1.2),
        }
    }

    pub fn intake_delay(&self) -> Duration {
        millis(self.intake_delay_ms)
    }

    pub fn item_delay(&self) -> Duration {
        millis(self.item_delay_ms)
    }

    pub fn pop_timeout(&self) -> Duration {
        millis(self.pop_timeout_ms)
    }

    pub fn yield_for(&self) -> Duration {
        millis(self.yield_ms)
    }
}

impl ServiceConfig {
    /// Reads a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ServiceError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ServiceError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ServiceError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Picks the configuration for a run.
    /// Evaluation order:
    /// 1) `cli_path` (the `--config` flag),
    /// 2) `$CAFE_CONFIG_PATH`,
    /// 3) defaults.
    ///
    /// The result is validated before it is returned.
    pub fn resolve(cli_path: Option<&Path>) -> Result<(Self, ConfigSource), ServiceError> {
        Self::resolve_with(cli_path, env::var(CONFIG_PATH_ENV).ok())
    }

    fn resolve_with(
        cli_path: Option<&Path>,
        env_path: Option<String>,
    ) -> Result<(Self, ConfigSource), ServiceError> {
        let (config, source) = match (cli_path, env_path) {
            (Some(path), _) => (Self::load(path)?, ConfigSource::File(path.to_path_buf())),
            (None, Some(raw)) if !raw.trim().is_empty() => {
                let path = PathBuf::from(raw.trim());
                (Self::load(&path)?, ConfigSource::EnvPath(path))
            }
            _ => (Self::default(), ConfigSource::Default),
        };
        config.validate()?;
        info!(?source, waiters = config.waiters.len(), "Configuration resolved");
        Ok((config, source))
    }

    /// Rejects settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ServiceError> {
        let invalid = |msg: String| Err(ServiceError::Validation(msg));

        if self.waiters.is_empty() {
            return invalid("at least one waiter is required".to_string());
        }
        if !(self.productivity_floor > 0.0) {
            return invalid(format!(
                "productivity_floor must be positive, got {}",
                self.productivity_floor
            ));
        }
        if self.countdown_tick_ms == 0
            || self.spinner_tick_ms == 0
            || self.flush_interval_ms == 0
            || self.feed_poll_ms == 0
        {
            return invalid("tick, flush and poll intervals must be non-zero".to_string());
        }

        let p = &self.preparer;
        if !(p.productivity > 0.0) {
            return invalid(format!("{}: productivity must be positive", p.name));
        }
        for (label, walk) in [("prepare_walk", p.prepare_walk), ("direct_walk", p.direct_walk)] {
            if !walk.is_valid() {
                return invalid(format!("{}: invalid {label} {walk:?}", p.name));
            }
        }

        for w in &self.waiters {
            if !(w.productivity > 0.0) {
                return invalid(format!("{}: productivity must be positive", w.name));
            }
            for (label, walk) in [("intake_walk", w.intake_walk), ("deliver_walk", w.deliver_walk)] {
                if !walk.is_valid() {
                    return invalid(format!("{}: invalid {label} {walk:?}", w.name));
                }
            }
        }
        Ok(())
    }

    pub fn setup_delay(&self) -> Duration {
        millis(self.setup_delay_ms)
    }

    pub fn countdown_tick(&self) -> Duration {
        millis(self.countdown_tick_ms)
    }

    pub fn closing_notice(&self) -> Duration {
        millis(self.closing_notice_ms)
    }

    pub fn flush_interval(&self) -> Duration {
        millis(self.flush_interval_ms)
    }

    pub fn feed_poll(&self) -> Duration {
        millis(self.feed_poll_ms)
    }

    pub fn spinner_tick(&self) -> Duration {
        millis(self.spinner_tick_ms)
    }

    /// Seed for the `index`-th worker's walk (preparer is 0, waiters follow).
    pub fn worker_seed(&self, index: u64) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(index))
    }
}
