//! The render collaborator and the bookkeeping of the visuals handed to it.

use bevy_ecs::component::Component;
use bevy_ecs::query::Changed;
use bevy_ecs::resource::Resource;
use bevy_ecs::system::{NonSendMut, Query, Res};
use glam::Vec2;
use tracing::trace;

use crate::map::maze::Maze;
use crate::systems::movement::TilePosition;

/// Opaque identifier of a visual owned by a [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Rect,
    Circle,
}

/// Whatever draws the simulation.
///
/// Positions are pixel centers. Sizes are full extents (the diameter for circles).
pub trait Renderer {
    fn create_visual(&mut self, shape: Shape, position: Vec2, size: Vec2, color: u32) -> VisualHandle;
    fn destroy_visual(&mut self, handle: VisualHandle);
    fn move_visual(&mut self, handle: VisualHandle, position: Vec2);
}

/// A renderer that draws nothing, for headless runs.
#[derive(Debug, Default)]
pub struct NullRenderer {
    next_handle: u64,
    live: usize,
}

impl NullRenderer {
    /// Number of visuals created and not yet destroyed.
    pub fn live(&self) -> usize {
        self.live
    }
}

impl Renderer for NullRenderer {
    fn create_visual(&mut self, _shape: Shape, _position: Vec2, _size: Vec2, _color: u32) -> VisualHandle {
        self.next_handle += 1;
        self.live += 1;
        VisualHandle(self.next_handle)
    }

    fn destroy_visual(&mut self, _handle: VisualHandle) {
        self.live = self.live.saturating_sub(1);
    }

    fn move_visual(&mut self, _handle: VisualHandle, _position: Vec2) {}
}

/// A non-send resource wrapping the active renderer.
pub struct RendererResource(pub Box<dyn Renderer>);

/// The visual tracking an actor.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visual(pub VisualHandle);

/// Visuals of the wall tiles of the current maze.
#[derive(Resource, Debug, Default)]
pub struct MazeVisuals(pub Vec<VisualHandle>);

/// Moves the visual of every actor whose tile changed since the last sync.
pub fn render_sync_system(
    maze: Res<Maze>,
    mut renderer: NonSendMut<RendererResource>,
    actors: Query<(&TilePosition, &Visual), Changed<TilePosition>>,
) {
    for (position, visual) in actors.iter() {
        trace!(handle = visual.0 .0, tile = ?position.0, "Syncing visual");
        renderer.0.move_visual(visual.0, position.pixel(&maze));
    }
}
