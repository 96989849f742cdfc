use bevy_ecs::{
    bundle::Bundle,
    component::Component,
    query::{With, Without},
    system::{Query, Res, ResMut},
};
use glam::IVec2;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use strum_macros::{AsRefStr, Display, EnumIter};
use tracing::{debug, trace, warn};

use crate::{
    constants::{ai, timing},
    map::{direction::Direction, maze::Maze},
    systems::{
        boss::Boss,
        components::{DeltaTime, EntityType, GameRng, PlayerControlled, SpawnPoint},
        movement::{Heading, MoveClock, TilePosition},
        render::Visual,
    },
};

/// The four built-in ghost personalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Archetype {
    Red,
    Pink,
    Blue,
    Yellow,
}

impl Archetype {
    /// Spawn order used when populating a level; cycled when more ghosts are requested.
    pub const ORDER: [Archetype; 4] = [Archetype::Red, Archetype::Pink, Archetype::Blue, Archetype::Yellow];

    pub fn profile(self) -> ArchetypeProfile {
        match self {
            Archetype::Red => ArchetypeProfile {
                chase: ChaseStrategy::Direct,
                scatter: ScatterStrategy::RandomCorner,
                color: 0xFF0000,
            },
            Archetype::Pink => ArchetypeProfile {
                chase: ChaseStrategy::Offset(IVec2::new(2, -2)),
                scatter: ScatterStrategy::RandomCorner,
                color: 0xFFB8FF,
            },
            Archetype::Blue => ArchetypeProfile {
                chase: ChaseStrategy::Offset(IVec2::new(-3, 3)),
                scatter: ScatterStrategy::RandomCorner,
                color: 0x00FFFF,
            },
            Archetype::Yellow => ArchetypeProfile {
                chase: ChaseStrategy::Jitter(ai::JITTER_RADIUS),
                scatter: ScatterStrategy::RandomCorner,
                color: 0xFFB852,
            },
        }
    }
}

/// Where a chasing ghost aims, relative to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaseStrategy {
    /// The player's own tile.
    Direct,
    /// A fixed tile offset from the player.
    Offset(IVec2),
    /// A random tile within the given radius of the player, redrawn every decision.
    Jitter(i32),
}

impl ChaseStrategy {
    pub fn target<R: Rng + ?Sized>(self, player: IVec2, rng: &mut R) -> IVec2 {
        match self {
            ChaseStrategy::Direct => player,
            ChaseStrategy::Offset(offset) => player + offset,
            ChaseStrategy::Jitter(radius) => {
                player + IVec2::new(rng.random_range(-radius..=radius), rng.random_range(-radius..=radius))
            }
        }
    }
}

/// Where a scattering ghost retreats to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScatterStrategy {
    /// Any of the four interior corners, drawn at every decision.
    RandomCorner,
    /// A fixed corner, indexed clockwise from the top-left.
    Corner(usize),
}

impl ScatterStrategy {
    pub fn target<R: Rng + ?Sized>(self, maze: &Maze, rng: &mut R) -> IVec2 {
        let corners = maze.corners();
        match self {
            ScatterStrategy::RandomCorner => corners.choose(rng).copied().unwrap_or(corners[0]),
            ScatterStrategy::Corner(index) => corners[index % corners.len()],
        }
    }
}

/// The data record behind an archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchetypeProfile {
    pub chase: ChaseStrategy,
    pub scatter: ScatterStrategy,
    /// Body color, as 0xRRGGBB.
    pub color: u32,
}

/// A chasing enemy.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ghost {
    pub archetype: Archetype,
    pub profile: ArchetypeProfile,
}

impl Ghost {
    pub fn new(archetype: Archetype) -> Self {
        Self {
            archetype,
            profile: archetype.profile(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum AiMode {
    Chase,
    #[default]
    Scatter,
}

/// The current decision of an AI-driven actor.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AiState {
    pub mode: AiMode,
    pub target: IVec2,
}

/// Re-targeting cadence, separate from the movement clock.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct AiClock {
    pub timer: f32,
    pub delay: f32,
}

impl AiClock {
    pub fn new(delay: f32) -> Self {
        Self { timer: 0.0, delay }
    }

    /// Advances the clock, returning true when a decision is due.
    pub fn tick(&mut self, delta: f32) -> bool {
        self.timer += delta;
        if self.timer >= self.delay {
            self.timer -= self.delay;
            true
        } else {
            false
        }
    }
}

impl Default for AiClock {
    fn default() -> Self {
        Self::new(timing::ENEMY_AI_DELAY)
    }
}

#[derive(Bundle)]
pub struct GhostBundle {
    pub ghost: Ghost,
    pub entity_type: EntityType,
    pub position: TilePosition,
    pub spawn: SpawnPoint,
    pub heading: Heading,
    pub clock: MoveClock,
    pub ai: AiState,
    pub ai_clock: AiClock,
    pub visual: Visual,
}

/// Picks a mode and target tile for a ghost at `tile`.
///
/// Ghosts chase while the player is closer than [`ai::CHASE_DISTANCE`] tiles
/// and scatter otherwise.
pub fn decide<R: Rng + ?Sized>(profile: &ArchetypeProfile, tile: IVec2, player: IVec2, maze: &Maze, rng: &mut R) -> AiState {
    if tile.as_vec2().distance(player.as_vec2()) < ai::CHASE_DISTANCE {
        AiState {
            mode: AiMode::Chase,
            target: profile.chase.target(player, rng),
        }
    } else {
        AiState {
            mode: AiMode::Scatter,
            target: profile.scatter.target(maze, rng),
        }
    }
}

/// The axis-aligned direction that closes the larger gap towards `target`.
///
/// Ties go to the vertical axis. `None` once the target is reached.
pub fn preferred_direction(from: IVec2, target: IVec2) -> Option<Direction> {
    let delta = target - from;
    if delta.x.abs() > delta.y.abs() {
        Some(if delta.x > 0 { Direction::Right } else { Direction::Left })
    } else if delta.y != 0 {
        Some(if delta.y > 0 { Direction::Down } else { Direction::Up })
    } else {
        None
    }
}

/// Moves an AI-driven actor one tile towards its target.
///
/// If the preferred tile is a wall, a random walkable neighbour is taken
/// instead and the target is pushed a few tiles further that way, so the
/// actor commits to the detour. With no walkable neighbour the actor stays.
/// Returns whether the actor moved.
pub fn pursue_step<R: Rng + ?Sized>(
    maze: &Maze,
    position: &mut TilePosition,
    heading: &mut Heading,
    state: &mut AiState,
    rng: &mut R,
) -> bool {
    let Some(preferred) = preferred_direction(position.0, state.target) else {
        return false;
    };

    if maze.can_step(position.0, preferred) {
        position.0 += preferred.as_ivec2();
        heading.current = Some(preferred);
        return true;
    }

    let mut options = Direction::DIRECTIONS;
    options.shuffle(rng);
    match options.into_iter().find(|direction| maze.can_step(position.0, *direction)) {
        Some(detour) => {
            position.0 += detour.as_ivec2();
            heading.current = Some(detour);
            state.target = position.0 + detour.as_ivec2() * ai::DETOUR_LENGTH;
            trace!(tile = ?position.0, direction = detour.as_ref(), "Detouring around wall");
            true
        }
        None => {
            debug!(tile = ?position.0, "Actor boxed in, staying put");
            false
        }
    }
}

/// Re-targets every ghost whose AI clock elapsed this tick.
pub fn ghost_ai_system(
    maze: Res<Maze>,
    delta_time: Res<DeltaTime>,
    mut rng: ResMut<GameRng>,
    players: Query<&TilePosition, With<PlayerControlled>>,
    mut ghosts: Query<(&Ghost, &TilePosition, &mut AiState, &mut AiClock), Without<PlayerControlled>>,
) {
    let Ok(player) = players.single() else {
        warn!("No single player found for ghost AI");
        return;
    };

    for (ghost, position, mut state, mut clock) in ghosts.iter_mut() {
        if !clock.tick(delta_time.millis) {
            continue;
        }

        let decision = decide(&ghost.profile, position.0, player.0, &maze, &mut rng.0);
        if decision.mode != state.mode {
            trace!(ghost = %ghost.archetype, mode = %decision.mode, "Ghost mode changed");
        }
        *state = decision;
    }
}

/// Steps every ghost whose move clock elapsed this tick.
pub fn ghost_movement_system(
    maze: Res<Maze>,
    delta_time: Res<DeltaTime>,
    mut rng: ResMut<GameRng>,
    mut ghosts: Query<
        (&mut TilePosition, &mut Heading, &mut MoveClock, &mut AiState),
        (With<Ghost>, Without<PlayerControlled>, Without<Boss>),
    >,
) {
    for (mut position, mut heading, mut clock, mut state) in ghosts.iter_mut() {
        if clock.tick(delta_time.millis) {
            pursue_step(&maze, &mut position, &mut heading, &mut state, &mut rng.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_preferred_direction_ties_go_vertical() {
        assert_eq!(preferred_direction(IVec2::ZERO, IVec2::new(3, 3)), Some(Direction::Down));
        assert_eq!(preferred_direction(IVec2::ZERO, IVec2::new(-4, 3)), Some(Direction::Left));
        assert_eq!(preferred_direction(IVec2::ZERO, IVec2::new(0, -1)), Some(Direction::Up));
        assert_eq!(preferred_direction(IVec2::ONE, IVec2::ONE), None);
    }

    #[test]
    fn test_jitter_stays_within_radius() {
        let mut rng = SmallRng::seed_from_u64(3);
        let player = IVec2::new(10, 10);
        for _ in 0..100 {
            let target = ChaseStrategy::Jitter(3).target(player, &mut rng);
            let offset = (target - player).abs();
            assert!(offset.x <= 3 && offset.y <= 3);
        }
    }

    #[test]
    fn test_far_ghost_scatters_to_a_corner() {
        let maze = Maze::new(800, 600, 32);
        let mut rng = SmallRng::seed_from_u64(1);
        let state = decide(
            &Archetype::Red.profile(),
            IVec2::new(1, 1),
            IVec2::new(20, 15),
            &maze,
            &mut rng,
        );
        assert_eq!(state.mode, AiMode::Scatter);
        assert!(maze.corners().contains(&state.target));
    }
}
