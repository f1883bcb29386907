#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Planet Protector engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values. Systems sample
//! immutable readings such as [`TickInput`] and respond exclusively with new
//! command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Vertical coordinate assigned to every freshly spawned hazard.
///
/// Negative values sit above the visible playfield so hazards drift in from
/// off-screen.
pub const SPAWN_HEIGHT: f64 = -10.0;

/// Horizontal spawn band expressed as a multiple of the playfield width.
pub const SPAWN_BAND_WIDTH_FACTOR: f64 = 2.0;

/// Milliseconds contained in one second of simulated time.
pub const MILLIS_PER_SECOND: f64 = 1_000.0;

/// Largest number of hazards a single wave may plan.
///
/// Also the upper bound for [`SpawnerConfig::initial_max_hazards`]. The
/// ceiling keeps growing after every wave, so wave sizes are clamped to this
/// value as well.
pub const MAX_HAZARDS_PER_WAVE: usize = 10_000;

/// Logical timers maintained by the session clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerId {
    /// Total elapsed play time. Never reset by the spawner.
    Game,
    /// Time elapsed since the last wave finished emitting hazards.
    Wave,
    /// Time elapsed since the last individual hazard spawn.
    Spawn,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances every running timer and ages live hazards.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Rewinds a single logical timer back to zero.
    ResetTimer {
        /// Timer that should restart its measurement.
        timer: TimerId,
    },
    /// Requests that the hazard population admit a new hazard.
    SpawnHazard {
        /// Position the hazard should enter the playfield at.
        request: HazardSpawnRequest,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a logical timer was rewound.
    TimerReset {
        /// Timer that restarted.
        timer: TimerId,
    },
    /// Confirms that a hazard entered the playfield.
    HazardSpawned {
        /// Identifier assigned to the new hazard.
        hazard: HazardId,
        /// Position the hazard spawned at.
        request: HazardSpawnRequest,
    },
    /// Reports that a hazard left the population after its lifetime elapsed.
    HazardExpired {
        /// Identifier of the hazard that was removed.
        hazard: HazardId,
    },
}

/// Unique identifier assigned to a hazard by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HazardId(u32);

impl HazardId {
    /// Creates a new hazard identifier wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying identifier value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Spawn coordinates for a single hazard produced by the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HazardSpawnRequest {
    x: f64,
    y: f64,
}

impl HazardSpawnRequest {
    /// Creates a spawn request at the provided coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Horizontal spawn coordinate in playfield units.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Vertical spawn coordinate in playfield units.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }
}

/// Readings sampled by the caller once per tick and handed to the spawner.
///
/// All elapsed values are milliseconds. `wave_elapsed_ms` and
/// `spawn_elapsed_ms` restart from zero whenever the caller honours a
/// [`Command::ResetTimer`] for the matching [`TimerId`].
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct TickInput {
    /// Number of hazards currently alive in the playfield.
    pub live_hazards: usize,
    /// Width of the visible playfield in playfield units.
    pub playfield_width: f64,
    /// Reading of the [`TimerId::Game`] timer.
    pub total_elapsed_ms: f64,
    /// Reading of the [`TimerId::Wave`] timer.
    pub wave_elapsed_ms: f64,
    /// Reading of the [`TimerId::Spawn`] timer.
    pub spawn_elapsed_ms: f64,
}

/// Tuning knobs controlling wave pacing and the difficulty ramp.
///
/// Supplied once at session start. Call [`SpawnerConfig::validate`] before
/// handing the configuration to a spawner; invalid values would otherwise
/// freeze or explode the difficulty curve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnerConfig {
    /// Spawn rate at zero elapsed seconds; the base of the exponential ramp.
    pub initial_spawn_rate: f64,
    /// Ceiling on simultaneously-live hazards before any wave completes.
    pub initial_max_hazards: f64,
    /// Growth base raised to the elapsed seconds when deriving a wave's spawn rate.
    pub spawn_rate_multiplier: f64,
    /// Factor applied to the hazard ceiling every time a wave completes.
    pub max_hazards_growth_rate: f64,
    /// Nominal gap between two spawns within the first wave.
    pub base_spawn_interval_ms: f64,
    /// Factor applied to the base spawn interval every time a wave completes.
    pub spawn_interval_decrease_factor: f64,
    /// Full width of the symmetric jitter applied to each spawn gap.
    pub spawn_interval_variance_ms: f64,
    /// Nominal rest between the end of one wave and the start of the next.
    pub wave_interval_ms: f64,
    /// Full width of the symmetric jitter applied to the rest period.
    pub wave_interval_variance_ms: f64,
    /// Lower bound for generated spawn gaps and the shrinking base interval.
    pub min_spawn_interval_ms: f64,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            initial_spawn_rate: 1.0,
            initial_max_hazards: 50.0,
            spawn_rate_multiplier: 1.1,
            max_hazards_growth_rate: 1.2,
            base_spawn_interval_ms: 500.0,
            spawn_interval_decrease_factor: 0.9,
            spawn_interval_variance_ms: 1_000.0,
            wave_interval_ms: 5_000.0,
            wave_interval_variance_ms: 1_000.0,
            min_spawn_interval_ms: 50.0,
        }
    }
}

impl SpawnerConfig {
    /// Checks every field against the ranges that keep the ramp well-behaved.
    ///
    /// Fields are checked in declaration order and the first violation is
    /// reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("initial_spawn_rate", self.initial_spawn_rate)?;
        require_at_least("initial_max_hazards", self.initial_max_hazards, 1.0)?;
        require_at_most(
            "initial_max_hazards",
            self.initial_max_hazards,
            MAX_HAZARDS_PER_WAVE as f64,
        )?;
        require_growth("spawn_rate_multiplier", self.spawn_rate_multiplier)?;
        require_growth("max_hazards_growth_rate", self.max_hazards_growth_rate)?;
        require_positive("base_spawn_interval_ms", self.base_spawn_interval_ms)?;
        require_finite(
            "spawn_interval_decrease_factor",
            self.spawn_interval_decrease_factor,
        )?;
        let decay = self.spawn_interval_decrease_factor;
        if decay <= 0.0 || decay >= 1.0 {
            return Err(ConfigError::DecayOutOfRange {
                field: "spawn_interval_decrease_factor",
                value: self.spawn_interval_decrease_factor,
            });
        }
        require_non_negative("spawn_interval_variance_ms", self.spawn_interval_variance_ms)?;
        require_positive("wave_interval_ms", self.wave_interval_ms)?;
        require_non_negative("wave_interval_variance_ms", self.wave_interval_variance_ms)?;
        require_positive("min_spawn_interval_ms", self.min_spawn_interval_ms)?;
        if self.min_spawn_interval_ms > self.base_spawn_interval_ms {
            return Err(ConfigError::FloorAboveBase {
                floor: self.min_spawn_interval_ms,
                base: self.base_spawn_interval_ms,
            });
        }
        Ok(())
    }
}

/// Reasons a [`SpawnerConfig`] may be rejected at startup.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The field held NaN or an infinity.
    #[error("{field} must be finite (received {value})")]
    NotFinite {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f64,
    },
    /// The field fell below its permitted minimum.
    #[error("{field} must be at least {minimum} (received {value})")]
    BelowMinimum {
        /// Name of the offending field.
        field: &'static str,
        /// Smallest accepted value.
        minimum: f64,
        /// Value that failed validation.
        value: f64,
    },
    /// The field exceeded its permitted maximum.
    #[error("{field} must be at most {maximum} (received {value})")]
    AboveMaximum {
        /// Name of the offending field.
        field: &'static str,
        /// Largest accepted value.
        maximum: f64,
        /// Value that failed validation.
        value: f64,
    },
    /// The field must be strictly positive.
    #[error("{field} must be positive (received {value})")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f64,
    },
    /// The field may be zero but never negative.
    #[error("{field} must not be negative (received {value})")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f64,
    },
    /// A growth factor at or below one would freeze or reverse the ramp.
    #[error("{field} must be greater than 1 (received {value})")]
    GrowthTooSmall {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f64,
    },
    /// A decay factor must shrink the interval without collapsing it.
    #[error("{field} must lie strictly between 0 and 1 (received {value})")]
    DecayOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f64,
    },
    /// The interval floor exceeds the starting interval.
    #[error("min_spawn_interval_ms ({floor}) must not exceed base_spawn_interval_ms ({base})")]
    FloorAboveBase {
        /// Configured floor.
        floor: f64,
        /// Configured starting interval.
        base: f64,
    },
}

fn require_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn require_at_least(field: &'static str, value: f64, minimum: f64) -> Result<(), ConfigError> {
    require_finite(field, value)?;
    if value < minimum {
        return Err(ConfigError::BelowMinimum {
            field,
            minimum,
            value,
        });
    }
    Ok(())
}

fn require_at_most(field: &'static str, value: f64, maximum: f64) -> Result<(), ConfigError> {
    if value > maximum {
        return Err(ConfigError::AboveMaximum {
            field,
            maximum,
            value,
        });
    }
    Ok(())
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

fn require_growth(field: &'static str, value: f64) -> Result<(), ConfigError> {
    require_finite(field, value)?;
    if value <= 1.0 {
        return Err(ConfigError::GrowthTooSmall { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SpawnerConfig, MAX_HAZARDS_PER_WAVE};

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SpawnerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn growth_factor_of_one_is_rejected() {
        let config = SpawnerConfig {
            max_hazards_growth_rate: 1.0,
            ..SpawnerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::GrowthTooSmall {
                field: "max_hazards_growth_rate",
                value: 1.0,
            })
        );
    }

    #[test]
    fn decrease_factor_must_shrink_interval() {
        for factor in [0.0, 1.0, 1.5, -0.2] {
            let config = SpawnerConfig {
                spawn_interval_decrease_factor: factor,
                ..SpawnerConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::DecayOutOfRange { .. })),
                "factor {factor} should be rejected"
            );
        }
    }

    #[test]
    fn non_positive_intervals_are_rejected() {
        let config = SpawnerConfig {
            base_spawn_interval_ms: 0.0,
            ..SpawnerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "base_spawn_interval_ms",
                value: 0.0,
            })
        );

        let config = SpawnerConfig {
            wave_interval_ms: -5.0,
            ..SpawnerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "wave_interval_ms",
                ..
            })
        ));
    }

    #[test]
    fn nan_is_reported_as_not_finite() {
        let config = SpawnerConfig {
            spawn_interval_variance_ms: f64::NAN,
            ..SpawnerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite {
                field: "spawn_interval_variance_ms",
                ..
            })
        ));
    }

    #[test]
    fn floor_above_base_is_rejected() {
        let config = SpawnerConfig {
            min_spawn_interval_ms: 600.0,
            ..SpawnerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::FloorAboveBase {
                floor: 600.0,
                base: 500.0,
            })
        );
    }

    #[test]
    fn oversized_hazard_ceiling_is_rejected() {
        let config = SpawnerConfig {
            initial_max_hazards: 1e15,
            ..SpawnerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::AboveMaximum {
                field: "initial_max_hazards",
                maximum: MAX_HAZARDS_PER_WAVE as f64,
                value: 1e15,
            })
        );

        let at_limit = SpawnerConfig {
            initial_max_hazards: MAX_HAZARDS_PER_WAVE as f64,
            ..SpawnerConfig::default()
        };
        assert_eq!(at_limit.validate(), Ok(()));
    }

    #[test]
    fn error_messages_name_the_field() {
        let error = ConfigError::Negative {
            field: "wave_interval_variance_ms",
            value: -1.0,
        };
        assert_eq!(
            error.to_string(),
            "wave_interval_variance_ms must not be negative (received -1)"
        );
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: SpawnerConfig = toml::from_str(
            r#"
            initial_max_hazards = 20.0
            wave_interval_ms = 3000.0
            "#,
        )
        .expect("partial config parses");

        assert_eq!(config.initial_max_hazards, 20.0);
        assert_eq!(config.wave_interval_ms, 3_000.0);
        assert_eq!(
            config.base_spawn_interval_ms,
            SpawnerConfig::default().base_spawn_interval_ms
        );
    }

    #[test]
    fn unknown_toml_keys_are_rejected() {
        let parsed: Result<SpawnerConfig, _> = toml::from_str("max_asteroids = 10.0");
        assert!(parsed.is_err());
    }
}
