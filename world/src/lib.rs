#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for Planet Protector.
//!
//! The world owns the session clock and the live hazard population. Both are
//! collaborators of the spawning system: the spawner samples their readings
//! through [`query`] and answers with commands that [`apply`] executes.

use std::time::Duration;

use planet_protector_core::{Command, Event, HazardId, HazardSpawnRequest, TimerId};

const DEFAULT_PLAYFIELD_WIDTH: f64 = 800.0;
const DEFAULT_PLAYFIELD_HEIGHT: f64 = 600.0;
const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Monotonic stopwatch measuring simulated time since its last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    elapsed: Duration,
}

impl Timer {
    /// Simulated time accumulated since the timer last restarted.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time expressed in fractional milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_nanos() as f64 / NANOS_PER_MILLI
    }

    fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

/// Three independent timers advanced in lockstep by the simulation tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionClock {
    game: Timer,
    wave: Timer,
    spawn: Timer,
}

impl SessionClock {
    /// Returns the timer tracked under the provided identifier.
    #[must_use]
    pub const fn timer(&self, id: TimerId) -> &Timer {
        match id {
            TimerId::Game => &self.game,
            TimerId::Wave => &self.wave,
            TimerId::Spawn => &self.spawn,
        }
    }

    fn timer_mut(&mut self, id: TimerId) -> &mut Timer {
        match id {
            TimerId::Game => &mut self.game,
            TimerId::Wave => &mut self.wave,
            TimerId::Spawn => &mut self.spawn,
        }
    }

    fn advance(&mut self, dt: Duration) {
        self.game.advance(dt);
        self.wave.advance(dt);
        self.spawn.advance(dt);
    }
}

/// Visible bounds of the play area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playfield {
    width: f64,
    height: f64,
}

impl Playfield {
    /// Creates a playfield description with the provided dimensions.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Visible width in playfield units.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Visible height in playfield units.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYFIELD_WIDTH, DEFAULT_PLAYFIELD_HEIGHT)
    }
}

/// Live hazard tracked by the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hazard {
    id: HazardId,
    origin: HazardSpawnRequest,
    age: Duration,
}

impl Hazard {
    /// Identifier assigned when the hazard spawned.
    #[must_use]
    pub const fn id(&self) -> HazardId {
        self.id
    }

    /// Position the hazard entered the playfield at.
    #[must_use]
    pub const fn origin(&self) -> HazardSpawnRequest {
        self.origin
    }

    /// Simulated time the hazard has been alive.
    #[must_use]
    pub const fn age(&self) -> Duration {
        self.age
    }
}

/// Represents the authoritative Planet Protector session state.
#[derive(Debug)]
pub struct World {
    clock: SessionClock,
    playfield: Playfield,
    hazards: Vec<Hazard>,
    hazard_lifetime: Option<Duration>,
    next_hazard_id: u32,
    tick_index: u64,
}

impl World {
    /// Creates a world with the provided bounds.
    ///
    /// Hazards leave the population once they have been alive for
    /// `hazard_lifetime`; `None` keeps them forever.
    #[must_use]
    pub fn new(playfield: Playfield, hazard_lifetime: Option<Duration>) -> Self {
        Self {
            clock: SessionClock::default(),
            playfield,
            hazards: Vec::new(),
            hazard_lifetime,
            next_hazard_id: 0,
            tick_index: 0,
        }
    }

    fn allocate_hazard_id(&mut self) -> HazardId {
        let id = HazardId::new(self.next_hazard_id);
        self.next_hazard_id = self.next_hazard_id.wrapping_add(1);
        id
    }

    fn age_hazards(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for hazard in &mut self.hazards {
            hazard.age = hazard.age.saturating_add(dt);
        }

        let Some(lifetime) = self.hazard_lifetime else {
            return;
        };

        self.hazards.retain(|hazard| {
            if hazard.age >= lifetime {
                out_events.push(Event::HazardExpired { hazard: hazard.id });
                false
            } else {
                true
            }
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Playfield::default(), None)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.clock.advance(dt);
            out_events.push(Event::TimeAdvanced { dt });
            world.age_hazards(dt, out_events);
        }
        Command::ResetTimer { timer } => {
            world.clock.timer_mut(timer).reset();
            out_events.push(Event::TimerReset { timer });
        }
        Command::SpawnHazard { request } => {
            let id = world.allocate_hazard_id();
            world.hazards.push(Hazard {
                id,
                origin: request,
                age: Duration::ZERO,
            });
            out_events.push(Event::HazardSpawned {
                hazard: id,
                request,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use planet_protector_core::{TickInput, TimerId};

    use super::{Hazard, Playfield, SessionClock, World};

    /// Provides read-only access to the session clock.
    #[must_use]
    pub fn clock(world: &World) -> &SessionClock {
        &world.clock
    }

    /// Reads a single timer in fractional milliseconds.
    #[must_use]
    pub fn elapsed_ms(world: &World, timer: TimerId) -> f64 {
        world.clock.timer(timer).elapsed_ms()
    }

    /// Provides read-only access to the playfield bounds.
    #[must_use]
    pub fn playfield(world: &World) -> Playfield {
        world.playfield
    }

    /// Live hazards in spawn order.
    #[must_use]
    pub fn hazards(world: &World) -> &[Hazard] {
        &world.hazards
    }

    /// Number of hazards currently alive.
    #[must_use]
    pub fn live_hazard_count(world: &World) -> usize {
        world.hazards.len()
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Samples every reading the spawning system needs for one tick.
    #[must_use]
    pub fn tick_input(world: &World) -> TickInput {
        TickInput {
            live_hazards: live_hazard_count(world),
            playfield_width: world.playfield.width(),
            total_elapsed_ms: elapsed_ms(world, TimerId::Game),
            wave_elapsed_ms: elapsed_ms(world, TimerId::Wave),
            spawn_elapsed_ms: elapsed_ms(world, TimerId::Spawn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(world: &mut World, millis: u64) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::Tick {
                dt: Duration::from_millis(millis),
            },
            &mut events,
        );
        events
    }

    #[test]
    fn tick_advances_every_timer() {
        let mut world = World::default();
        let events = tick(&mut world, 16);

        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(16)
            }]
        );
        for timer in [TimerId::Game, TimerId::Wave, TimerId::Spawn] {
            assert_eq!(query::elapsed_ms(&world, timer), 16.0);
        }
        assert_eq!(query::tick_index(&world), 1);
    }

    #[test]
    fn reset_only_touches_requested_timer() {
        let mut world = World::default();
        let _ = tick(&mut world, 250);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ResetTimer {
                timer: TimerId::Spawn,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::TimerReset {
                timer: TimerId::Spawn
            }]
        );
        assert_eq!(query::elapsed_ms(&world, TimerId::Spawn), 0.0);
        assert_eq!(query::elapsed_ms(&world, TimerId::Wave), 250.0);
        assert_eq!(query::elapsed_ms(&world, TimerId::Game), 250.0);
    }

    #[test]
    fn spawned_hazards_receive_sequential_ids() {
        let mut world = World::default();
        let mut events = Vec::new();
        for x in [10.0, 20.0] {
            apply(
                &mut world,
                Command::SpawnHazard {
                    request: HazardSpawnRequest::new(x, -10.0),
                },
                &mut events,
            );
        }

        let ids: Vec<u32> = query::hazards(&world)
            .iter()
            .map(|hazard| hazard.id().get())
            .collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(
            query::hazards(&world)[1].origin(),
            HazardSpawnRequest::new(20.0, -10.0)
        );
        assert_eq!(query::live_hazard_count(&world), 2);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn hazards_expire_after_lifetime() {
        let mut world = World::new(Playfield::default(), Some(Duration::from_millis(100)));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnHazard {
                request: HazardSpawnRequest::new(5.0, -10.0),
            },
            &mut events,
        );

        let events = tick(&mut world, 60);
        assert_eq!(events.len(), 1, "hazard still alive after 60ms");
        assert_eq!(query::live_hazard_count(&world), 1);

        let events = tick(&mut world, 40);
        assert!(events.contains(&Event::HazardExpired {
            hazard: HazardId::new(0)
        }));
        assert_eq!(query::live_hazard_count(&world), 0);
    }

    #[test]
    fn hazards_without_lifetime_persist() {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnHazard {
                request: HazardSpawnRequest::new(0.0, -10.0),
            },
            &mut events,
        );
        let _ = tick(&mut world, 60_000);
        assert_eq!(query::live_hazard_count(&world), 1);
        assert_eq!(query::hazards(&world)[0].age(), Duration::from_secs(60));
    }

    #[test]
    fn tick_input_reflects_world_state() {
        let mut world = World::new(Playfield::new(640.0, 480.0), None);
        let _ = tick(&mut world, 1_500);
        let input = query::tick_input(&world);

        assert_eq!(query::playfield(&world).height(), 480.0);
        assert_eq!(input.live_hazards, 0);
        assert_eq!(input.playfield_width, 640.0);
        assert_eq!(input.total_elapsed_ms, 1_500.0);
        assert_eq!(input.wave_elapsed_ms, 1_500.0);
        assert_eq!(input.spawn_elapsed_ms, 1_500.0);
    }
}
