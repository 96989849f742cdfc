use bevy_ecs::{
    query::{With, Without},
    resource::Resource,
    system::{NonSendMut, Query, ResMut},
};
use glam::{IVec2, Vec2};
use rand::Rng;
use strum_macros::Display;
use tracing::{debug, info, warn};

use crate::{
    constants::{color, pellet, score, timing},
    map::maze::Maze,
    systems::{
        components::PlayerControlled,
        movement::{MoveClock, TilePosition},
        player::Player,
        render::{Renderer, RendererResource, Shape, VisualHandle},
        state::{DeferredAction, DeferredActions, SessionState},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum PelletKind {
    Normal,
    Power,
    Invincibility,
}

impl PelletKind {
    /// Classifies a pellet from a uniform draw `roll` in `[0, 1)`.
    ///
    /// `special_rate` scales the odds of both special kinds; at 0 every pellet is normal.
    pub fn classify(roll: f32, special_rate: f32) -> PelletKind {
        if roll < pellet::INVINCIBILITY_THRESHOLD * special_rate {
            PelletKind::Invincibility
        } else if roll < pellet::POWER_THRESHOLD * special_rate {
            PelletKind::Power
        } else {
            PelletKind::Normal
        }
    }

    pub fn value(self) -> u32 {
        match self {
            PelletKind::Normal => score::PELLET,
            PelletKind::Power => score::POWER_PELLET,
            PelletKind::Invincibility => score::INVINCIBILITY_PELLET,
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            PelletKind::Normal => pellet::NORMAL_RADIUS,
            PelletKind::Power => pellet::POWER_RADIUS,
            PelletKind::Invincibility => pellet::INVINCIBILITY_RADIUS,
        }
    }

    pub fn color(self) -> u32 {
        match self {
            PelletKind::Normal => color::PELLET,
            PelletKind::Power => color::POWER_PELLET,
            PelletKind::Invincibility => color::INVINCIBILITY_PELLET,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pellet {
    /// Pixel center of the pellet's tile.
    pub position: Vec2,
    pub tile: IVec2,
    pub value: u32,
    pub radius: f32,
    pub active: bool,
    pub kind: PelletKind,
    pub visual: Option<VisualHandle>,
}

/// What the player picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EatenPellet {
    pub value: u32,
    pub kind: PelletKind,
    pub visual: Option<VisualHandle>,
}

/// Every pellet of the current level.
///
/// Pellets are only ever deactivated; a level's pellets come back only when a
/// new manager is generated.
#[derive(Resource, Debug, Default)]
pub struct PelletManager {
    pellets: Vec<Pellet>,
    remaining: usize,
}

impl PelletManager {
    /// Places one pellet on every walkable interior tile, row by row.
    pub fn generate<R: Rng + ?Sized>(maze: &Maze, special_rate: f32, rng: &mut R) -> PelletManager {
        let pellets: Vec<Pellet> = maze
            .positions()
            .filter(|tile| tile.x >= 1 && tile.y >= 1 && tile.x < maze.cols() - 1 && tile.y < maze.rows() - 1)
            .filter(|tile| maze.is_walkable_at(*tile))
            .map(|tile| {
                let kind = PelletKind::classify(rng.random::<f32>(), special_rate);
                Pellet {
                    position: maze.tile_center(tile),
                    tile,
                    value: kind.value(),
                    radius: kind.radius(),
                    active: true,
                    kind,
                    visual: None,
                }
            })
            .collect();

        let remaining = pellets.len();
        debug!(
            total = remaining,
            power = pellets.iter().filter(|p| p.kind == PelletKind::Power).count(),
            invincibility = pellets.iter().filter(|p| p.kind == PelletKind::Invincibility).count(),
            "Pellets generated"
        );
        PelletManager { pellets, remaining }
    }

    /// Creates a visual for every active pellet that has none yet.
    pub fn attach_visuals(&mut self, renderer: &mut dyn Renderer) {
        for pellet in self.pellets.iter_mut().filter(|p| p.active && p.visual.is_none()) {
            let size = Vec2::splat(pellet.radius * 2.0);
            pellet.visual = Some(renderer.create_visual(Shape::Circle, pellet.position, size, pellet.kind.color()));
        }
    }

    /// Destroys the visuals of every pellet still on the board.
    pub fn detach_visuals(&mut self, renderer: &mut dyn Renderer) {
        for pellet in self.pellets.iter_mut() {
            if let Some(handle) = pellet.visual.take() {
                renderer.destroy_visual(handle);
            }
        }
    }

    /// Consumes the first active pellet on `tile`, if any.
    pub fn eat(&mut self, tile: IVec2) -> Option<EatenPellet> {
        let pellet = self.pellets.iter_mut().find(|p| p.active && p.tile == tile)?;
        pellet.active = false;
        self.remaining -= 1;
        Some(EatenPellet {
            value: pellet.value,
            kind: pellet.kind,
            visual: pellet.visual.take(),
        })
    }

    /// Number of pellets not eaten yet.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Number of pellets placed this level.
    pub fn total(&self) -> usize {
        self.pellets.len()
    }

    pub fn pellets(&self) -> &[Pellet] {
        &self.pellets
    }
}

/// Eats the pellet under the player and applies its effect.
///
/// Power and invincibility pellets slow every ghost and the boss for the
/// effect's duration; the restore is queued as a deferred action tagged with
/// the current power epoch, so picking up another pellet extends the slowdown
/// instead of being cut short by the older restore.
pub fn pellet_system(
    mut pellets: ResMut<PelletManager>,
    mut session: ResMut<SessionState>,
    mut deferred: ResMut<DeferredActions>,
    mut renderer: NonSendMut<RendererResource>,
    mut players: Query<(&TilePosition, &mut Player), With<PlayerControlled>>,
    mut enemies: Query<&mut MoveClock, Without<PlayerControlled>>,
) {
    let Ok((position, mut player)) = players.single_mut() else {
        warn!("No single player found for pellet check");
        return;
    };

    let Some(eaten) = pellets.eat(position.0) else {
        return;
    };

    player.eat_pellet(eaten.value);
    if let Some(handle) = eaten.visual {
        renderer.0.destroy_visual(handle);
    }

    let duration = match eaten.kind {
        PelletKind::Normal => return,
        PelletKind::Power => {
            player.activate_power(timing::POWER_DURATION);
            timing::POWER_DURATION
        }
        PelletKind::Invincibility => {
            player.activate_invincibility(timing::INVINCIBILITY_DURATION);
            timing::INVINCIBILITY_DURATION
        }
    };

    session.power_epoch += 1;
    session.enemy_speed_modifier = timing::POWER_SLOWDOWN;
    for mut clock in enemies.iter_mut() {
        clock.modifier = timing::POWER_SLOWDOWN;
    }
    deferred.schedule(
        duration,
        session.generation,
        DeferredAction::RestoreEnemySpeed {
            epoch: session.power_epoch,
        },
    );

    info!(kind = %eaten.kind, duration, score = player.score, "Power-up collected");
}
