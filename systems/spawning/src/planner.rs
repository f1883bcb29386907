//! Wave lifecycle and difficulty ramp.

use log::info;
use planet_protector_core::{Command, ConfigError, SpawnerConfig, TimerId, MAX_HAZARDS_PER_WAVE};
use rand::Rng;

use crate::intervals::{self, sample_jitter, sample_uniform};

/// Phases of the wave state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// Between waves; waiting for the wave timer to pass the scheduled start.
    Resting,
    /// Hazards of the current wave are still being emitted.
    Active,
}

/// Difficulty and wave-progress state owned by a single session.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveState {
    max_concurrent_hazards: f64,
    spawn_rate_multiplier: f64,
    base_spawn_interval_ms: f64,
    interval_variance_ms: f64,
    wave_interval_ms: f64,
    wave_interval_variance_ms: f64,
    next_wave_time_ms: f64,
    phase: WavePhase,
    current_wave_intervals: Vec<f64>,
    current_interval_index: usize,
}

impl WaveState {
    /// Current ceiling on simultaneously-live hazards.
    #[must_use]
    pub fn max_concurrent_hazards(&self) -> f64 {
        self.max_concurrent_hazards
    }

    /// Growth base applied exponentially to elapsed seconds.
    #[must_use]
    pub fn spawn_rate_multiplier(&self) -> f64 {
        self.spawn_rate_multiplier
    }

    /// Nominal gap between two spawns of the next wave.
    #[must_use]
    pub fn base_spawn_interval_ms(&self) -> f64 {
        self.base_spawn_interval_ms
    }

    /// Full width of the jitter applied to each spawn gap.
    #[must_use]
    pub fn interval_variance_ms(&self) -> f64 {
        self.interval_variance_ms
    }

    /// Nominal rest period between waves.
    #[must_use]
    pub fn wave_interval_ms(&self) -> f64 {
        self.wave_interval_ms
    }

    /// Full width of the jitter applied to the rest period.
    #[must_use]
    pub fn wave_interval_variance_ms(&self) -> f64 {
        self.wave_interval_variance_ms
    }

    /// Wave timer reading that must be exceeded before the next wave starts.
    #[must_use]
    pub fn next_wave_time_ms(&self) -> f64 {
        self.next_wave_time_ms
    }

    /// Current phase of the wave state machine.
    #[must_use]
    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Reports whether a wave is emitting hazards.
    #[must_use]
    pub fn wave_happening(&self) -> bool {
        self.phase == WavePhase::Active
    }

    /// Spawn gaps generated for the active (or most recent) wave.
    #[must_use]
    pub fn current_wave_intervals(&self) -> &[f64] {
        &self.current_wave_intervals
    }

    /// Index of the next unconsumed gap.
    #[must_use]
    pub fn current_interval_index(&self) -> usize {
        self.current_interval_index
    }

    /// Gap that must elapse before the next spawn of the active wave.
    #[must_use]
    pub fn current_interval(&self) -> Option<f64> {
        self.current_wave_intervals
            .get(self.current_interval_index)
            .copied()
    }

    /// Reports whether every gap of the current sequence has been consumed.
    #[must_use]
    pub fn intervals_exhausted(&self) -> bool {
        self.current_interval_index >= self.current_wave_intervals.len()
    }
}

/// Decides when waves start and stop and grows the difficulty between them.
#[derive(Debug)]
pub struct WavePlanner {
    state: WaveState,
    initial_spawn_rate: f64,
    max_hazards_growth_rate: f64,
    spawn_interval_decrease_factor: f64,
    min_spawn_interval_ms: f64,
    last_spawn_rate: f64,
    waves_started: u64,
    waves_completed: u64,
}

impl WavePlanner {
    /// Creates a resting planner and schedules the first wave.
    pub fn new<R>(config: &SpawnerConfig, rng: &mut R) -> Result<Self, ConfigError>
    where
        R: Rng + ?Sized,
    {
        config.validate()?;

        let next_wave_time_ms = draw_next_wave_time(
            config.wave_interval_ms,
            config.wave_interval_variance_ms,
            rng,
        );

        Ok(Self {
            state: WaveState {
                max_concurrent_hazards: config.initial_max_hazards,
                spawn_rate_multiplier: config.spawn_rate_multiplier,
                base_spawn_interval_ms: config.base_spawn_interval_ms,
                interval_variance_ms: config.spawn_interval_variance_ms,
                wave_interval_ms: config.wave_interval_ms,
                wave_interval_variance_ms: config.wave_interval_variance_ms,
                next_wave_time_ms,
                phase: WavePhase::Resting,
                current_wave_intervals: Vec::new(),
                current_interval_index: 0,
            },
            initial_spawn_rate: config.initial_spawn_rate,
            max_hazards_growth_rate: config.max_hazards_growth_rate,
            spawn_interval_decrease_factor: config.spawn_interval_decrease_factor,
            min_spawn_interval_ms: config.min_spawn_interval_ms,
            last_spawn_rate: config.initial_spawn_rate,
            waves_started: 0,
            waves_completed: 0,
        })
    }

    /// Read-only view of the wave state.
    #[must_use]
    pub fn state(&self) -> &WaveState {
        &self.state
    }

    /// Spawn rate computed for the most recently started wave.
    #[must_use]
    pub fn last_spawn_rate(&self) -> f64 {
        self.last_spawn_rate
    }

    /// Number of waves started this session.
    #[must_use]
    pub fn waves_started(&self) -> u64 {
        self.waves_started
    }

    /// Number of waves that emitted every hazard this session.
    #[must_use]
    pub fn waves_completed(&self) -> u64 {
        self.waves_completed
    }

    /// Reports whether a new wave may begin at the given wave timer reading.
    #[must_use]
    pub fn should_start_wave(&self, wave_elapsed_ms: f64) -> bool {
        !self.state.wave_happening() && wave_elapsed_ms > self.state.next_wave_time_ms
    }

    /// Exponential spawn rate at the given session time, capped by the hazard ceiling.
    #[must_use]
    pub fn spawn_rate_at(&self, total_elapsed_seconds: f64) -> f64 {
        let ramp =
            self.initial_spawn_rate * self.state.spawn_rate_multiplier.powf(total_elapsed_seconds);
        ramp.min(self.state.max_concurrent_hazards)
    }

    /// Begins a wave sized from the session time and pre-generates its gaps.
    ///
    /// Requests a reset of the spawn timer so the first gap is measured from
    /// the wave start.
    pub fn start_wave<R>(&mut self, total_elapsed_seconds: f64, rng: &mut R, out: &mut Vec<Command>)
    where
        R: Rng + ?Sized,
    {
        let spawn_rate = self.spawn_rate_at(total_elapsed_seconds);
        let hazard_count = draw_hazard_count(spawn_rate, rng);

        self.state.current_wave_intervals = intervals::generate(
            hazard_count,
            self.state.base_spawn_interval_ms,
            self.state.interval_variance_ms,
            self.min_spawn_interval_ms,
            rng,
        );
        self.state.current_interval_index = 0;
        self.state.phase = WavePhase::Active;
        self.last_spawn_rate = spawn_rate;
        self.waves_started = self.waves_started.saturating_add(1);
        out.push(Command::ResetTimer {
            timer: TimerId::Spawn,
        });

        info!(
            "wave {} started at {:.1}s: {} hazards (spawn rate {:.2}, ceiling {:.1})",
            self.waves_started,
            total_elapsed_seconds,
            hazard_count,
            spawn_rate,
            self.state.max_concurrent_hazards
        );
    }

    /// Closes the active wave, ramps the difficulty, and schedules the next wave.
    pub fn end_wave<R>(&mut self, rng: &mut R, out: &mut Vec<Command>)
    where
        R: Rng + ?Sized,
    {
        self.state.phase = WavePhase::Resting;
        self.state.max_concurrent_hazards *= self.max_hazards_growth_rate;
        self.state.base_spawn_interval_ms = (self.state.base_spawn_interval_ms
            * self.spawn_interval_decrease_factor)
            .max(self.min_spawn_interval_ms);
        self.state.next_wave_time_ms = draw_next_wave_time(
            self.state.wave_interval_ms,
            self.state.wave_interval_variance_ms,
            rng,
        );
        self.waves_completed = self.waves_completed.saturating_add(1);
        out.push(Command::ResetTimer {
            timer: TimerId::Wave,
        });

        info!(
            "wave {} complete: ceiling now {:.1}, base interval {:.1}ms, next wave in {:.0}ms",
            self.waves_completed,
            self.state.max_concurrent_hazards,
            self.state.base_spawn_interval_ms,
            self.state.next_wave_time_ms
        );
    }

    pub(crate) fn consume_interval(&mut self) {
        if !self.state.intervals_exhausted() {
            self.state.current_interval_index += 1;
        }
    }
}

fn draw_hazard_count<R>(spawn_rate: f64, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    let upper = spawn_rate.max(1.0).min(MAX_HAZARDS_PER_WAVE as f64);
    let drawn = sample_uniform(rng, 1.0, upper).round();
    if drawn >= 1.0 {
        (drawn as usize).min(MAX_HAZARDS_PER_WAVE)
    } else {
        1
    }
}

fn draw_next_wave_time<R>(wave_interval_ms: f64, variance_ms: f64, rng: &mut R) -> f64
where
    R: Rng + ?Sized,
{
    (wave_interval_ms + sample_jitter(rng, variance_ms)).max(0.0)
}
