//! Headless tick loop that wires the spawner to the reference world.

use std::fmt;
use std::time::Duration;

use log::info;
use planet_protector_core::{Command, Event, TimerId};
use planet_protector_system_spawning::Spawning;
use planet_protector_world::{self as world, query, World};
use rand::Rng;

/// Parameters that bound a single simulated session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SimulationOptions {
    /// Number of ticks to simulate.
    pub(crate) ticks: u64,
    /// Simulated time that passes between two ticks.
    pub(crate) tick: Duration,
}

/// Aggregate outcome of a simulated session.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Summary {
    pub(crate) ticks: u64,
    pub(crate) simulated: Duration,
    pub(crate) hazards_spawned: u64,
    pub(crate) hazards_expired: u64,
    pub(crate) peak_live_hazards: usize,
    pub(crate) final_live_hazards: usize,
    pub(crate) waves_started: u64,
    pub(crate) waves_completed: u64,
    pub(crate) last_spawn_rate: f64,
    pub(crate) max_concurrent_hazards: f64,
    pub(crate) base_spawn_interval_ms: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "simulated {} ticks ({:.1}s)",
            self.ticks,
            self.simulated.as_secs_f64()
        )?;
        writeln!(
            f,
            "waves: {} started, {} completed",
            self.waves_started, self.waves_completed
        )?;
        writeln!(
            f,
            "hazards: {} spawned, {} expired, {} live (peak {})",
            self.hazards_spawned,
            self.hazards_expired,
            self.final_live_hazards,
            self.peak_live_hazards
        )?;
        writeln!(f, "last spawn rate: {:.2}", self.last_spawn_rate)?;
        writeln!(f, "hazard ceiling: {:.1}", self.max_concurrent_hazards)?;
        write!(f, "base spawn interval: {:.1}ms", self.base_spawn_interval_ms)
    }
}

/// Drives `spawning` against `world` for the requested number of ticks.
///
/// Each tick samples the world, lets the spawner respond, applies the
/// resulting commands and finally advances time.
pub(crate) fn run<R>(
    world: &mut World,
    spawning: &mut Spawning,
    options: SimulationOptions,
    rng: &mut R,
) -> Summary
where
    R: Rng + ?Sized,
{
    let mut commands = Vec::new();
    let mut events = Vec::new();
    let mut peak_live_hazards = query::live_hazard_count(world);
    let mut hazards_expired = 0_u64;
    let mut waves_seen = spawning.planner().waves_started();

    for _ in 0..options.ticks {
        commands.clear();
        events.clear();

        let input = query::tick_input(world);
        if let Some(request) = spawning.tick(input, rng, &mut commands) {
            commands.push(Command::SpawnHazard { request });
        }
        commands.push(Command::Tick { dt: options.tick });

        for command in commands.drain(..) {
            world::apply(world, command, &mut events);
        }

        hazards_expired += events
            .iter()
            .filter(|event| matches!(event, Event::HazardExpired { .. }))
            .count() as u64;
        peak_live_hazards = peak_live_hazards.max(query::live_hazard_count(world));

        let waves_started = spawning.planner().waves_started();
        if waves_started != waves_seen {
            waves_seen = waves_started;
            info!(
                "tick {}: wave {} planned {} hazards with {} live",
                query::tick_index(world),
                waves_started,
                spawning.state().current_wave_intervals().len(),
                query::live_hazard_count(world)
            );
        }
    }

    let planner = spawning.planner();
    let state = spawning.state();
    Summary {
        ticks: options.ticks,
        simulated: query::clock(world).timer(TimerId::Game).elapsed(),
        hazards_spawned: spawning.hazards_spawned(),
        hazards_expired,
        peak_live_hazards,
        final_live_hazards: query::live_hazard_count(world),
        waves_started: planner.waves_started(),
        waves_completed: planner.waves_completed(),
        last_spawn_rate: planner.last_spawn_rate(),
        max_concurrent_hazards: state.max_concurrent_hazards(),
        base_spawn_interval_ms: state.base_spawn_interval_ms(),
    }
}
