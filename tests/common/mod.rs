#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use bevy_ecs::{
    entity::Entity,
    query::{With, Without},
    world::World,
};
use glam::{IVec2, Vec2};
use pachorman::{
    config::{Difficulty, GameConfig},
    game::Game,
    map::Maze,
    systems::{
        AiClock, AiState, Archetype, Boss, BossBundle, DeferredActions, DeltaTime, EntityType, GameRng, Ghost, GhostBundle,
        Heading, Hud, HudResource, InputSnapshot, MoveClock, NullRenderer, PelletManager, Player, PlayerBundle,
        PlayerControlled, Renderer, RendererResource, SessionState, Settings, Shape, SpawnPoint, TilePosition, TracingHud,
        Visual, VisualHandle,
    },
};

/// A frame of a 60 Hz loop, in milliseconds.
pub const FRAME: f32 = 1000.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudEvent {
    Score(u32),
    Level(u32),
    Lives(u32),
    LevelComplete(u32),
    GameOver(u32),
}

/// A HUD that records every notification it receives.
#[derive(Clone, Default)]
pub struct RecordingHud(pub Rc<RefCell<Vec<HudEvent>>>);

impl RecordingHud {
    pub fn events(&self) -> Vec<HudEvent> {
        self.0.borrow().clone()
    }

    pub fn count(&self, predicate: impl Fn(&HudEvent) -> bool) -> usize {
        self.0.borrow().iter().filter(|event| predicate(event)).count()
    }
}

impl Hud for RecordingHud {
    fn update_score(&mut self, score: u32) {
        self.0.borrow_mut().push(HudEvent::Score(score));
    }

    fn update_level(&mut self, level: u32) {
        self.0.borrow_mut().push(HudEvent::Level(level));
    }

    fn update_lives(&mut self, lives: u32) {
        self.0.borrow_mut().push(HudEvent::Lives(lives));
    }

    fn show_level_complete(&mut self, next_level: u32) {
        self.0.borrow_mut().push(HudEvent::LevelComplete(next_level));
    }

    fn show_game_over(&mut self, final_score: u32) {
        self.0.borrow_mut().push(HudEvent::GameOver(final_score));
    }
}

#[derive(Debug, Default)]
pub struct RenderLog {
    next_handle: u64,
    pub live: HashSet<VisualHandle>,
    pub created: usize,
    pub destroyed: usize,
    /// Calls that referenced a handle that was never created or already destroyed.
    pub invalid_calls: usize,
    pub moves: usize,
}

/// A renderer that tracks which visuals are alive.
#[derive(Clone, Default)]
pub struct RecordingRenderer(pub Rc<RefCell<RenderLog>>);

impl RecordingRenderer {
    pub fn live(&self) -> usize {
        self.0.borrow().live.len()
    }

    pub fn invalid_calls(&self) -> usize {
        self.0.borrow().invalid_calls
    }
}

impl Renderer for RecordingRenderer {
    fn create_visual(&mut self, _shape: Shape, _position: Vec2, _size: Vec2, _color: u32) -> VisualHandle {
        let mut log = self.0.borrow_mut();
        log.next_handle += 1;
        let handle = VisualHandle(log.next_handle);
        log.live.insert(handle);
        log.created += 1;
        handle
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        let mut log = self.0.borrow_mut();
        if log.live.remove(&handle) {
            log.destroyed += 1;
        } else {
            log.invalid_calls += 1;
        }
    }

    fn move_visual(&mut self, handle: VisualHandle, _position: Vec2) {
        let mut log = self.0.borrow_mut();
        if log.live.contains(&handle) {
            log.moves += 1;
        } else {
            log.invalid_calls += 1;
        }
    }
}

/// A seeded config with no ghosts, no boss and no special pellets, so nothing interferes with the player.
pub fn quiet_config(seed: u64) -> GameConfig {
    let mut config = GameConfig::with_difficulty(Difficulty::Normal).seeded(seed);
    config.difficulty.enemy_count = 0;
    config.difficulty.boss_enabled = false;
    config.difficulty.special_pellet_rate = 0.0;
    config
}

pub fn create_game(config: GameConfig) -> (Game, RecordingHud, RecordingRenderer) {
    let hud = RecordingHud::default();
    let renderer = RecordingRenderer::default();
    let game = Game::new(config, Box::new(hud.clone()), Box::new(renderer.clone())).expect("Config should be valid");
    (game, hud, renderer)
}

/// Ticks in 60 Hz frames until at least `millis` of simulated time passed.
pub fn tick_for(game: &mut Game, millis: f32) {
    let mut elapsed = 0.0;
    while elapsed < millis {
        game.tick(FRAME);
        elapsed += FRAME;
    }
}

/// Removes the pellet on `tile` the way the player would, without scoring it.
pub fn eat_pellet_at(game: &mut Game, tile: IVec2) {
    let eaten = game.world.resource_mut::<PelletManager>().eat(tile);
    if let Some(handle) = eaten.and_then(|pellet| pellet.visual) {
        game.world.non_send_resource_mut::<RendererResource>().0.destroy_visual(handle);
    }
}

/// Eats every remaining pellet without moving the player.
pub fn clear_pellets(game: &mut Game) {
    let tiles: Vec<IVec2> = game.pellets().pellets().iter().filter(|p| p.active).map(|p| p.tile).collect();
    for tile in tiles {
        eat_pellet_at(game, tile);
    }
}

/// Runs `f` against the player component.
pub fn with_player<T>(game: &mut Game, f: impl FnOnce(&mut Player) -> T) -> T {
    let mut players = game.world.query_filtered::<&mut Player, With<PlayerControlled>>();
    let mut player = players.single_mut(&mut game.world).expect("Exactly one player");
    f(&mut player)
}

pub fn set_player_tile(game: &mut Game, tile: IVec2) {
    let mut players = game.world.query_filtered::<&mut TilePosition, With<PlayerControlled>>();
    let mut position = players.single_mut(&mut game.world).expect("Exactly one player");
    position.0 = tile;
}

/// Every actor's tile, keyed by entity.
pub fn actor_tiles(game: &mut Game) -> Vec<(Entity, EntityType, IVec2)> {
    let mut actors = game.world.query::<(Entity, &EntityType, &TilePosition)>();
    actors
        .iter(&game.world)
        .map(|(entity, entity_type, position)| (entity, *entity_type, position.0))
        .collect()
}

pub fn enemy_modifiers(game: &mut Game) -> Vec<f32> {
    let mut clocks = game.world.query_filtered::<&MoveClock, Without<PlayerControlled>>();
    clocks.iter(&game.world).map(|clock| clock.modifier).collect()
}

/// A bare world with the resources the gameplay systems read, for running single systems.
pub fn create_test_world() -> World {
    let mut world = World::default();
    world.insert_resource(Maze::new(800, 600, 32));
    world.insert_resource(DeltaTime::from_millis(0.0));
    world.insert_resource(GameRng::new(Some(42)));
    world.insert_resource(Settings(GameConfig::default()));
    world.insert_resource(SessionState::default());
    world.insert_resource(DeferredActions::default());
    world.insert_resource(InputSnapshot::empty());
    world.insert_resource(PelletManager::default());
    world.insert_non_send_resource(RendererResource(Box::new(NullRenderer::default())));
    world.insert_non_send_resource(HudResource(Box::new(TracingHud::default())));
    world
}

pub fn spawn_test_player(world: &mut World, tile: IVec2) -> Entity {
    world
        .spawn(PlayerBundle {
            player: Player::new(3),
            controlled: PlayerControlled,
            entity_type: EntityType::Player,
            position: TilePosition(tile),
            spawn: SpawnPoint(tile),
            heading: Heading::default(),
            clock: MoveClock::new(150.0),
            visual: Visual(VisualHandle(0)),
        })
        .id()
}

pub fn spawn_test_ghost(world: &mut World, archetype: Archetype, tile: IVec2) -> Entity {
    world
        .spawn(GhostBundle {
            ghost: Ghost::new(archetype),
            entity_type: EntityType::Ghost,
            position: TilePosition(tile),
            spawn: SpawnPoint(tile),
            heading: Heading::default(),
            clock: MoveClock::new(180.0),
            ai: AiState {
                target: tile,
                ..AiState::default()
            },
            ai_clock: AiClock::default(),
            visual: Visual(VisualHandle(0)),
        })
        .id()
}

pub fn spawn_test_boss(world: &mut World, tile: IVec2) -> Entity {
    world
        .spawn(BossBundle {
            boss: Boss::default(),
            entity_type: EntityType::Boss,
            position: TilePosition(tile),
            spawn: SpawnPoint(tile),
            heading: Heading::default(),
            clock: MoveClock::new(150.0),
            ai: AiState::default(),
            ai_clock: AiClock::new(300.0),
            visual: Visual(VisualHandle(0)),
        })
        .id()
}
