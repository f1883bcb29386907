#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave-based hazard spawning system.
//!
//! The system is a two-state machine. While resting it waits for the wave
//! timer to pass a jittered start time. Once a wave starts it pre-generates
//! one spawn gap per hazard and emits at most one hazard per tick whenever the
//! spawn timer exceeds the next gap and the live population is below the
//! ceiling. Completing a wave raises the ceiling and tightens the gaps.
//!
//! Time is never owned here. Callers supply timer readings through
//! [`TickInput`] and honour the [`Command::ResetTimer`] values pushed into the
//! output buffer before sampling the next tick.

mod intervals;
mod planner;

use log::{debug, trace};
use planet_protector_core::{
    Command, ConfigError, HazardSpawnRequest, SpawnerConfig, TickInput, TimerId, MILLIS_PER_SECOND,
    SPAWN_BAND_WIDTH_FACTOR, SPAWN_HEIGHT,
};
use rand::Rng;

pub use intervals::generate as generate_intervals;
pub use planner::{WavePhase, WavePlanner, WaveState};

use intervals::sample_uniform;

/// Pure system that decides when and where hazards enter the playfield.
#[derive(Debug)]
pub struct Spawning {
    planner: WavePlanner,
    hazards_spawned: u64,
}

impl Spawning {
    /// Validates the configuration and creates a resting spawner.
    pub fn new<R>(config: &SpawnerConfig, rng: &mut R) -> Result<Self, ConfigError>
    where
        R: Rng + ?Sized,
    {
        Ok(Self {
            planner: WavePlanner::new(config, rng)?,
            hazards_spawned: 0,
        })
    }

    /// Read-only access to the wave planner and its statistics.
    #[must_use]
    pub fn planner(&self) -> &WavePlanner {
        &self.planner
    }

    /// Read-only view of the wave state.
    #[must_use]
    pub fn state(&self) -> &WaveState {
        self.planner.state()
    }

    /// Total number of spawn requests emitted this session.
    #[must_use]
    pub fn hazards_spawned(&self) -> u64 {
        self.hazards_spawned
    }

    /// Advances the scheduler by one game tick.
    ///
    /// Returns the hazard to spawn this tick, if any. Timer resets the caller
    /// must apply are appended to `out`.
    pub fn tick<R>(
        &mut self,
        input: TickInput,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> Option<HazardSpawnRequest>
    where
        R: Rng + ?Sized,
    {
        let mut spawn_elapsed_ms = input.spawn_elapsed_ms;
        if self.planner.should_start_wave(input.wave_elapsed_ms) {
            self.planner
                .start_wave(input.total_elapsed_ms / MILLIS_PER_SECOND, rng, out);
            // The spawn timer reset requested above has not been applied yet.
            spawn_elapsed_ms = 0.0;
        }

        if !self.planner.state().wave_happening() {
            return None;
        }

        let spawned = self.try_spawn(&input, spawn_elapsed_ms, rng, out);

        if self.planner.state().intervals_exhausted() {
            self.planner.end_wave(rng, out);
        }

        spawned
    }

    fn try_spawn<R>(
        &mut self,
        input: &TickInput,
        spawn_elapsed_ms: f64,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> Option<HazardSpawnRequest>
    where
        R: Rng + ?Sized,
    {
        let state = self.planner.state();
        if input.live_hazards as f64 >= state.max_concurrent_hazards() {
            trace!(
                "spawn held back: {} live hazards at ceiling {:.1}",
                input.live_hazards,
                state.max_concurrent_hazards()
            );
            return None;
        }

        let interval = state.current_interval()?;
        if spawn_elapsed_ms <= interval {
            return None;
        }

        self.planner.consume_interval();
        out.push(Command::ResetTimer {
            timer: TimerId::Spawn,
        });

        let x = sample_uniform(rng, 0.0, SPAWN_BAND_WIDTH_FACTOR * input.playfield_width);
        let request = HazardSpawnRequest::new(x, SPAWN_HEIGHT);
        self.hazards_spawned = self.hazards_spawned.saturating_add(1);

        debug!(
            "hazard {} of wave {} spawned at x={:.1} after {:.0}ms",
            self.planner.state().current_interval_index(),
            self.planner.waves_started(),
            x,
            spawn_elapsed_ms
        );

        Some(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn active_spawner(config: &SpawnerConfig) -> (Spawning, StepRng) {
        let mut rng = StepRng::new(0, 0);
        let mut spawning = Spawning::new(config, &mut rng).expect("valid config");
        let mut out = Vec::new();
        let started = spawning.tick(
            TickInput {
                wave_elapsed_ms: spawning.state().next_wave_time_ms() + 1.0,
                playfield_width: 800.0,
                ..TickInput::default()
            },
            &mut rng,
            &mut out,
        );
        assert!(started.is_none(), "no spawn on the tick a wave opens");
        assert!(spawning.state().wave_happening());
        (spawning, rng)
    }

    #[test]
    fn resting_tick_emits_nothing() {
        let mut rng = StepRng::new(0, 0);
        let mut spawning = Spawning::new(&SpawnerConfig::default(), &mut rng).expect("config");
        let mut out = Vec::new();

        let spawned = spawning.tick(
            TickInput {
                spawn_elapsed_ms: 1e9,
                playfield_width: 800.0,
                ..TickInput::default()
            },
            &mut rng,
            &mut out,
        );

        assert!(spawned.is_none());
        assert!(out.is_empty());
        assert_eq!(spawning.state().phase(), WavePhase::Resting);
    }

    #[test]
    fn wave_start_ignores_stale_spawn_reading() {
        let mut rng = StepRng::new(0, 0);
        let mut spawning = Spawning::new(&SpawnerConfig::default(), &mut rng).expect("config");
        let mut out = Vec::new();

        let spawned = spawning.tick(
            TickInput {
                wave_elapsed_ms: 10_000.0,
                spawn_elapsed_ms: 10_000.0,
                playfield_width: 800.0,
                ..TickInput::default()
            },
            &mut rng,
            &mut out,
        );

        assert!(spawned.is_none());
        assert_eq!(
            out,
            vec![Command::ResetTimer {
                timer: TimerId::Spawn
            }]
        );
    }

    #[test]
    fn single_hazard_wave_spawns_then_rests() {
        let (mut spawning, mut rng) = active_spawner(&SpawnerConfig::default());
        let interval = spawning.state().current_interval().expect("interval");
        let mut out = Vec::new();

        let spawned = spawning.tick(
            TickInput {
                spawn_elapsed_ms: interval + 1.0,
                playfield_width: 800.0,
                ..TickInput::default()
            },
            &mut rng,
            &mut out,
        );

        assert_eq!(spawned, Some(HazardSpawnRequest::new(0.0, SPAWN_HEIGHT)));
        assert_eq!(
            out,
            vec![
                Command::ResetTimer {
                    timer: TimerId::Spawn
                },
                Command::ResetTimer {
                    timer: TimerId::Wave
                },
            ]
        );
        assert_eq!(spawning.state().phase(), WavePhase::Resting);
        assert_eq!(spawning.hazards_spawned(), 1);
        assert_eq!(spawning.planner().waves_completed(), 1);
    }

    #[test]
    fn reading_equal_to_interval_does_not_spawn() {
        let (mut spawning, mut rng) = active_spawner(&SpawnerConfig::default());
        let interval = spawning.state().current_interval().expect("interval");
        let mut out = Vec::new();

        let spawned = spawning.tick(
            TickInput {
                spawn_elapsed_ms: interval,
                playfield_width: 800.0,
                ..TickInput::default()
            },
            &mut rng,
            &mut out,
        );

        assert!(spawned.is_none());
        assert!(out.is_empty());
        assert!(spawning.state().wave_happening());
    }

    #[test]
    fn ceiling_blocks_spawn_and_keeps_wave_open() {
        let (mut spawning, mut rng) = active_spawner(&SpawnerConfig::default());
        let mut out = Vec::new();

        let spawned = spawning.tick(
            TickInput {
                live_hazards: 50,
                spawn_elapsed_ms: 1e9,
                playfield_width: 800.0,
                ..TickInput::default()
            },
            &mut rng,
            &mut out,
        );

        assert!(spawned.is_none());
        assert!(out.is_empty());
        assert_eq!(spawning.state().current_interval_index(), 0);
        assert!(spawning.state().wave_happening());
    }
}
