//! Session-level state: the stage machine, deferred actions and level (re)construction.

use bevy_ecs::{
    entity::Entity,
    query::{With, Without},
    resource::Resource,
    system::{Commands, NonSendMut, Query, Res, ResMut},
    world::World,
};
use glam::{IVec2, Vec2};
use tracing::{debug, info, trace, warn};

use crate::{
    constants::{color, size, spawn, timing, CANVAS_SIZE},
    map::maze::Maze,
    systems::{
        boss::Boss,
        components::{DeltaTime, EntityType, GameRng, PlayerControlled, Settings, SpawnPoint},
        ghost::{AiClock, AiState, Archetype, Ghost, GhostBundle},
        hud::HudResource,
        item::PelletManager,
        movement::{Heading, MoveClock, TilePosition},
        player::{Player, PlayerBundle},
        render::{MazeVisuals, RendererResource, Shape, Visual, VisualHandle},
    },
};

/// High-level stage of the running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStage {
    /// Gameplay systems are running.
    #[default]
    Playing,
    /// All pellets are gone; the next level is being prepared.
    LevelComplete { next_level: u32 },
    /// The player ran out of lives; the session restarts shortly.
    GameOver { final_score: u32 },
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SessionState {
    pub level: u32,
    pub stage: GameStage,
    /// Whether a boss entity currently exists.
    pub boss_active: bool,
    /// Bumped on every session restart; deferred actions from an older generation are dropped.
    pub generation: u64,
    /// Bumped on every power-up and level start; only the newest speed restore applies.
    pub power_epoch: u64,
    /// Move-delay modifier applied to ghosts and the boss right now.
    pub enemy_speed_modifier: f32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            level: 1,
            stage: GameStage::Playing,
            boss_active: false,
            generation: 0,
            power_epoch: 0,
            enemy_speed_modifier: 1.0,
        }
    }
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        self.stage == GameStage::Playing
    }
}

/// Run condition gating every gameplay system.
pub fn session_active(session: Res<SessionState>) -> bool {
    session.is_active()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Puts ghost and boss speed back to normal, unless a newer power-up started since.
    RestoreEnemySpeed { epoch: u64 },
    AdvanceLevel,
    RestartSession,
}

/// An action waiting for its delay to run out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledAction {
    pub remaining: f32,
    pub generation: u64,
    pub action: DeferredAction,
}

/// Actions scheduled to run after a delay, counted in simulated time.
#[derive(Resource, Debug, Default)]
pub struct DeferredActions {
    pending: Vec<ScheduledAction>,
}

impl DeferredActions {
    pub fn schedule(&mut self, delay: f32, generation: u64, action: DeferredAction) {
        trace!(?action, delay, generation, "Action scheduled");
        self.pending.push(ScheduledAction {
            remaining: delay,
            generation,
            action,
        });
    }

    /// Counts every action down by `delta` and returns the ones now due, in scheduling order.
    pub fn advance(&mut self, delta: f32) -> Vec<ScheduledAction> {
        for scheduled in self.pending.iter_mut() {
            scheduled.remaining -= delta;
        }
        let (due, pending) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|scheduled| scheduled.remaining <= 0.0);
        self.pending = pending;
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> &[ScheduledAction] {
        &self.pending
    }
}

/// Runs every deferred action whose delay elapsed this tick.
///
/// Actions from an earlier session generation are dropped. Level and session
/// transitions only run from the stage that scheduled them.
pub fn deferred_action_system(world: &mut World) {
    let delta = world.resource::<DeltaTime>().millis;
    let due = world.resource_mut::<DeferredActions>().advance(delta);

    for scheduled in due {
        let (generation, stage) = {
            let session = world.resource::<SessionState>();
            (session.generation, session.stage)
        };
        if scheduled.generation != generation {
            debug!(action = ?scheduled.action, stale = scheduled.generation, generation, "Dropping stale action");
            continue;
        }

        match scheduled.action {
            DeferredAction::RestoreEnemySpeed { epoch } => restore_enemy_speed(world, epoch),
            DeferredAction::AdvanceLevel => match stage {
                GameStage::LevelComplete { .. } => next_level(world),
                _ => warn!(?stage, "Ignoring level advance outside of level complete"),
            },
            DeferredAction::RestartSession => match stage {
                GameStage::GameOver { .. } => restart_session(world),
                _ => warn!(?stage, "Ignoring restart outside of game over"),
            },
        }
    }
}

/// Ends the level once every pellet is eaten.
///
/// A player who lost the last life on the same tick is left to the loss check.
pub fn win_check_system(
    pellets: Res<PelletManager>,
    mut session: ResMut<SessionState>,
    mut deferred: ResMut<DeferredActions>,
    mut hud: NonSendMut<HudResource>,
    players: Query<&Player, With<PlayerControlled>>,
) {
    if pellets.remaining() > 0 {
        return;
    }
    if players.single().is_ok_and(|player| player.lives == 0) {
        return;
    }

    let next_level = session.level + 1;
    session.stage = GameStage::LevelComplete { next_level };
    hud.0.show_level_complete(next_level);
    deferred.schedule(timing::LEVEL_TRANSITION_DELAY, session.generation, DeferredAction::AdvanceLevel);

    info!(level = session.level, next_level, "Level complete");
}

/// Ends the session once the player has no lives left.
#[allow(clippy::too_many_arguments)]
pub fn loss_check_system(
    mut commands: Commands,
    mut session: ResMut<SessionState>,
    mut deferred: ResMut<DeferredActions>,
    mut hud: NonSendMut<HudResource>,
    mut renderer: NonSendMut<RendererResource>,
    players: Query<&Player, With<PlayerControlled>>,
    bosses: Query<(Entity, &Visual), With<Boss>>,
) {
    let Ok(player) = players.single() else {
        warn!("No single player found for loss check");
        return;
    };
    if player.lives > 0 {
        return;
    }

    let final_score = player.score;
    session.stage = GameStage::GameOver { final_score };
    hud.0.show_game_over(final_score);
    deferred.schedule(timing::GAME_OVER_RESTART_DELAY, session.generation, DeferredAction::RestartSession);

    for (entity, visual) in bosses.iter() {
        renderer.0.destroy_visual(visual.0);
        commands.entity(entity).despawn();
    }
    session.boss_active = false;

    info!(final_score, level = session.level, pellets = player.pellets_eaten, "Game over");
}

/// The player's start tile: the walkable tile nearest the bottom-center anchor, scaled to the field.
pub fn player_start_tile(maze: &Maze, settings: &Settings) -> IVec2 {
    let field = Vec2::new(settings.0.width as f32, settings.0.height as f32);
    let anchor = spawn::PLAYER / CANVAS_SIZE.as_vec2() * field;
    maze.pixel_to_tile(maze.find_nearest_walkable(anchor.x, anchor.y))
}

/// Spawn tile of the `index`-th ghost, inside the center room.
pub fn ghost_spawn_tile(maze: &Maze, index: usize) -> IVec2 {
    let (min, max) = maze.spawn_zone();
    let offset = spawn::GHOST_OFFSETS[index % spawn::GHOST_OFFSETS.len()];
    maze.nearest_walkable_tile((maze.center() + offset).clamp(min, max))
}

/// Builds a fresh session at level 1: maze, pellets, player and ghosts.
pub fn start_session(world: &mut World) {
    let settings = world.resource::<Settings>().clone();
    let profile = settings.0.difficulty;

    {
        let mut session = world.resource_mut::<SessionState>();
        session.level = 1;
        session.stage = GameStage::Playing;
        session.boss_active = false;
        session.power_epoch += 1;
        session.enemy_speed_modifier = 1.0;
    }

    build_level(world);
    let maze = world.resource::<Maze>().clone();

    let start = player_start_tile(&maze, &settings);
    let handle = world.non_send_resource_mut::<RendererResource>().0.create_visual(
        Shape::Circle,
        maze.tile_center(start),
        Vec2::splat(size::PLAYER),
        color::PLAYER,
    );
    world.spawn(PlayerBundle {
        player: Player::new(profile.lives),
        controlled: PlayerControlled,
        entity_type: EntityType::Player,
        position: TilePosition(start),
        spawn: SpawnPoint(start),
        heading: Heading::default(),
        clock: MoveClock::new(settings.player_move_delay()),
        visual: Visual(handle),
    });

    spawn_ghosts(world, &maze, profile.enemy_count, settings.enemy_move_delay(1));

    {
        let mut hud = world.non_send_resource_mut::<HudResource>();
        hud.0.update_level(1);
        hud.0.update_lives(profile.lives);
        hud.0.update_score(0);
    }

    let generation = world.resource::<SessionState>().generation;
    info!(
        generation,
        lives = profile.lives,
        enemies = profile.enemy_count,
        boss = profile.boss_enabled,
        "Session started"
    );
}

/// Tears every actor down and starts over at level 1.
pub fn restart_session(world: &mut World) {
    let mut actors = world.query_filtered::<(Entity, Option<&Visual>), With<EntityType>>();
    let doomed: Vec<(Entity, Option<VisualHandle>)> = actors
        .iter(world)
        .map(|(entity, visual)| (entity, visual.map(|v| v.0)))
        .collect();

    for (entity, visual) in doomed {
        if let Some(handle) = visual {
            world.non_send_resource_mut::<RendererResource>().0.destroy_visual(handle);
        }
        world.despawn(entity);
    }

    world.resource_mut::<SessionState>().generation += 1;
    start_session(world);
}

/// Moves on to the next level, keeping score and lives and rebuilding the ghost roster.
pub fn next_level(world: &mut World) {
    let settings = world.resource::<Settings>().clone();
    let level = {
        let mut session = world.resource_mut::<SessionState>();
        session.level += 1;
        session.stage = GameStage::Playing;
        session.power_epoch += 1;
        session.enemy_speed_modifier = 1.0;
        session.level
    };

    despawn_boss(world);
    build_level(world);

    let player_delay = settings.player_move_delay();
    let mut players = world.query_filtered::<(
        &SpawnPoint,
        &mut TilePosition,
        &mut Heading,
        &mut MoveClock,
        &mut Player,
    ), With<PlayerControlled>>();
    let mut lives = 0;
    for (spawn, mut position, mut heading, mut clock, mut player) in players.iter_mut(world) {
        position.0 = spawn.0;
        *heading = Heading::default();
        *clock = MoveClock::new(player_delay);
        player.reset_for_level();
        if player.grant_life(settings.0.difficulty.lives) {
            debug!(lives = player.lives, "Life refunded");
        }
        lives = player.lives;
    }

    // Ghosts eaten on the previous level come back with the full roster
    let enemy_delay = settings.enemy_move_delay(level);
    despawn_ghosts(world);
    let maze = world.resource::<Maze>().clone();
    spawn_ghosts(world, &maze, settings.0.difficulty.enemy_count, enemy_delay);

    {
        let mut hud = world.non_send_resource_mut::<HudResource>();
        hud.0.update_level(level);
        hud.0.update_lives(lives);
    }

    info!(level, lives, enemy_delay, "Level started");
}

/// Puts ghost and boss speed back to normal if `epoch` is the latest power-up.
fn restore_enemy_speed(world: &mut World, epoch: u64) {
    {
        let mut session = world.resource_mut::<SessionState>();
        if session.power_epoch != epoch {
            trace!(epoch, current = session.power_epoch, "Superseded speed restore");
            return;
        }
        session.enemy_speed_modifier = 1.0;
    }

    let mut clocks = world.query_filtered::<&mut MoveClock, Without<PlayerControlled>>();
    for mut clock in clocks.iter_mut(world) {
        clock.modifier = 1.0;
    }
    debug!(epoch, "Enemy speed restored");
}

/// Spawns `count` ghosts, cycling through the archetypes, each on its own spawn tile.
fn spawn_ghosts(world: &mut World, maze: &Maze, count: usize, move_delay: f32) {
    for (index, archetype) in Archetype::ORDER.iter().cycle().take(count).enumerate() {
        let tile = ghost_spawn_tile(maze, index);
        let ghost = Ghost::new(*archetype);
        let handle = world.non_send_resource_mut::<RendererResource>().0.create_visual(
            Shape::Rect,
            maze.tile_center(tile),
            Vec2::splat(size::GHOST),
            ghost.profile.color,
        );
        world.spawn(GhostBundle {
            ghost,
            entity_type: EntityType::Ghost,
            position: TilePosition(tile),
            spawn: SpawnPoint(tile),
            heading: Heading::default(),
            clock: MoveClock::new(move_delay),
            ai: AiState {
                target: tile,
                ..AiState::default()
            },
            ai_clock: AiClock::default(),
            visual: Visual(handle),
        });
    }
}

fn despawn_ghosts(world: &mut World) {
    let mut ghosts = world.query_filtered::<(Entity, &Visual), With<Ghost>>();
    let doomed: Vec<(Entity, VisualHandle)> = ghosts.iter(world).map(|(entity, visual)| (entity, visual.0)).collect();

    for (entity, handle) in doomed {
        world.non_send_resource_mut::<RendererResource>().0.destroy_visual(handle);
        world.despawn(entity);
    }
}

fn despawn_boss(world: &mut World) {
    let mut bosses = world.query_filtered::<(Entity, &Visual), With<Boss>>();
    let doomed: Vec<(Entity, VisualHandle)> = bosses.iter(world).map(|(entity, visual)| (entity, visual.0)).collect();

    for (entity, handle) in doomed {
        world.non_send_resource_mut::<RendererResource>().0.destroy_visual(handle);
        world.despawn(entity);
        debug!("Boss despawned");
    }
    world.resource_mut::<SessionState>().boss_active = false;
}

/// Regenerates the maze and its pellets, replacing the previous level's visuals.
fn build_level(world: &mut World) {
    let settings = world.resource::<Settings>().clone();
    let maze = Maze::new(settings.0.width, settings.0.height, settings.0.tile_size);
    let mut pellets = {
        let mut rng = world.resource_mut::<GameRng>();
        PelletManager::generate(&maze, settings.0.difficulty.special_pellet_rate, &mut rng.0)
    };

    let old_walls = world.remove_resource::<MazeVisuals>().unwrap_or_default();
    let old_pellets = world.remove_resource::<PelletManager>();

    let walls = {
        let mut renderer = world.non_send_resource_mut::<RendererResource>();
        let renderer = renderer.0.as_mut();

        for handle in old_walls.0 {
            renderer.destroy_visual(handle);
        }
        if let Some(mut old) = old_pellets {
            old.detach_visuals(renderer);
        }

        let tile_extent = Vec2::splat(maze.tile_size() as f32);
        let walls: Vec<VisualHandle> = maze
            .positions()
            .filter(|tile| !maze.is_walkable_at(*tile))
            .map(|tile| renderer.create_visual(Shape::Rect, maze.tile_center(tile), tile_extent, color::WALL))
            .collect();
        pellets.attach_visuals(renderer);
        walls
    };

    debug!(walls = walls.len(), pellets = pellets.total(), "Level built");
    world.insert_resource(MazeVisuals(walls));
    world.insert_resource(pellets);
    world.insert_resource(maze);
}
