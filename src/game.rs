//! This module contains the main game logic and state.

use bevy_ecs::query::With;
use bevy_ecs::schedule::{IntoScheduleConfigs, Schedule, SystemSet};
use bevy_ecs::world::World;
use glam::IVec2;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::error::GameResult;
use crate::map::maze::Maze;
use crate::systems::{
    boss_ai_system, boss_movement_system, boss_spawn_system, collision_system, deferred_action_system, ghost_ai_system,
    ghost_movement_system, hud_system, input_system, loss_check_system, pellet_system, player_movement_system,
    player_timer_system, render_sync_system, session_active, start_session, win_check_system, Boss, DeferredActions,
    DeltaTime, GameRng, Ghost, Hud, HudResource, InputSnapshot, MazeVisuals, NullRenderer, PelletManager, Player,
    PlayerControlled, Renderer, RendererResource, SessionState, Settings, TilePosition, TracingHud,
};

/// Phases of a tick, run in declaration order.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum GameplaySet {
    /// Deferred level and session transitions
    Transitions,
    /// Latching the held direction
    Input,
    /// Actor movement, pellets and contacts
    Update,
    /// HUD, win and loss checks
    Respond,
    /// Pushing actor positions to the renderer
    Render,
}

/// The simulation: an ECS world holding the session, plus the schedule that advances it.
///
/// Collaborators (HUD, renderer) live in the world as non-send resources, so
/// they may hold non-thread-safe handles.
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
}

impl Game {
    /// Validates `config` and builds a session at level 1.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Config` when the configuration is unusable.
    pub fn new(config: GameConfig, hud: Box<dyn Hud>, renderer: Box<dyn Renderer>) -> GameResult<Game> {
        info!("Starting game initialization");
        config.validate()?;

        let mut world = World::default();
        let mut schedule = Schedule::default();

        debug!(seed = ?config.seed, "Inserting resources");
        Self::insert_resources(&mut world, config, hud, renderer);

        debug!("Configuring schedule");
        Self::configure_schedule(&mut schedule);

        debug!("Spawning session");
        start_session(&mut world);

        info!("Game initialization completed");
        Ok(Game { world, schedule })
    }

    /// A game reporting through the log and drawing nothing.
    pub fn headless(config: GameConfig) -> GameResult<Game> {
        Self::new(config, Box::new(TracingHud::default()), Box::new(NullRenderer::default()))
    }

    fn insert_resources(world: &mut World, config: GameConfig, hud: Box<dyn Hud>, renderer: Box<dyn Renderer>) {
        world.insert_non_send_resource(HudResource(hud));
        world.insert_non_send_resource(RendererResource(renderer));

        world.insert_resource(GameRng::new(config.seed));
        world.insert_resource(Settings(config));
        world.insert_resource(SessionState::default());
        world.insert_resource(DeferredActions::default());
        world.insert_resource(MazeVisuals::default());
        world.insert_resource(PelletManager::default());
        world.insert_resource(InputSnapshot::empty());
        world.insert_resource(DeltaTime::from_millis(0.0));
    }

    fn configure_schedule(schedule: &mut Schedule) {
        schedule
            .add_systems((
                deferred_action_system.in_set(GameplaySet::Transitions),
                input_system.in_set(GameplaySet::Input),
                (
                    player_movement_system,
                    player_timer_system,
                    boss_spawn_system,
                    ghost_ai_system,
                    ghost_movement_system,
                    boss_ai_system,
                    boss_movement_system,
                    pellet_system,
                    collision_system,
                )
                    .chain()
                    .in_set(GameplaySet::Update),
                // Each check re-reads the stage, so a tick that completes the level never also ends the game
                (
                    hud_system.run_if(session_active),
                    win_check_system.run_if(session_active),
                    loss_check_system.run_if(session_active),
                )
                    .chain()
                    .in_set(GameplaySet::Respond),
                render_sync_system.in_set(GameplaySet::Render),
            ))
            .configure_sets(
                (
                    GameplaySet::Transitions,
                    GameplaySet::Input.run_if(session_active),
                    GameplaySet::Update.run_if(session_active),
                    GameplaySet::Respond,
                    GameplaySet::Render,
                )
                    .chain(),
            );
    }

    /// Replaces the directional keys held from the next tick on.
    pub fn set_input(&mut self, input: InputSnapshot) {
        self.world.insert_resource(input);
    }

    /// Advances the simulation by `delta_ms` milliseconds.
    pub fn tick(&mut self, delta_ms: f32) {
        self.world.insert_resource(DeltaTime::from_millis(delta_ms));
        self.schedule.run(&mut self.world);
    }

    pub fn session(&self) -> &SessionState {
        self.world.resource::<SessionState>()
    }

    pub fn level(&self) -> u32 {
        self.session().level
    }

    pub fn is_active(&self) -> bool {
        self.session().is_active()
    }

    pub fn maze(&self) -> &Maze {
        self.world.resource::<Maze>()
    }

    pub fn pellets(&self) -> &PelletManager {
        self.world.resource::<PelletManager>()
    }

    pub fn deferred(&self) -> &DeferredActions {
        self.world.resource::<DeferredActions>()
    }

    pub fn settings(&self) -> &GameConfig {
        &self.world.resource::<Settings>().0
    }

    /// A snapshot of the player's score, lives and effects.
    pub fn player(&mut self) -> Option<Player> {
        let mut players = self.world.query_filtered::<&Player, With<PlayerControlled>>();
        players.single(&self.world).ok().cloned()
    }

    pub fn player_tile(&mut self) -> Option<IVec2> {
        let mut players = self.world.query_filtered::<&TilePosition, With<PlayerControlled>>();
        players.single(&self.world).ok().map(|position| position.0)
    }

    pub fn ghost_tiles(&mut self) -> Vec<IVec2> {
        let mut ghosts = self.world.query_filtered::<&TilePosition, With<Ghost>>();
        ghosts.iter(&self.world).map(|position| position.0).collect()
    }

    pub fn boss_tiles(&mut self) -> Vec<IVec2> {
        let mut bosses = self.world.query_filtered::<&TilePosition, With<Boss>>();
        bosses.iter(&self.world).map(|position| position.0).collect()
    }
}
