use bevy_ecs::entity::Entity;
use bevy_ecs::query::{With, Without};
use bevy_ecs::system::{Commands, NonSendMut, Query};
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::constants::score;
use crate::systems::boss::Boss;
use crate::systems::components::PlayerControlled;
use crate::systems::ghost::{Archetype, Ghost};
use crate::systems::movement::TilePosition;
use crate::systems::player::Player;
use crate::systems::render::{RendererResource, Visual, VisualHandle};

/// Resolves contacts between the player and every ghost, then the boss.
///
/// Contact means sharing a tile. An invincible player destroys the ghosts it
/// touches and scores off the boss once per contact; otherwise every contact
/// is a hit, which invulnerability may absorb.
#[allow(clippy::type_complexity)]
pub fn collision_system(
    mut commands: Commands,
    mut renderer: NonSendMut<RendererResource>,
    mut players: Query<(&TilePosition, &mut Player), With<PlayerControlled>>,
    ghosts: Query<(Entity, &Ghost, &TilePosition, &Visual), (Without<PlayerControlled>, Without<Boss>)>,
    mut bosses: Query<(&TilePosition, &mut Boss), (Without<PlayerControlled>, Without<Ghost>)>,
) {
    let Ok((player_position, mut player)) = players.single_mut() else {
        warn!("No single player found for collision check");
        return;
    };
    let tile = player_position.0;

    let contacts: SmallVec<[(Entity, Archetype, VisualHandle); 4]> = ghosts
        .iter()
        .filter(|(_, _, position, _)| position.0 == tile)
        .map(|(entity, ghost, _, visual)| (entity, ghost.archetype, visual.0))
        .collect();

    for (entity, archetype, handle) in contacts {
        if player.is_invincible() {
            player.add_bonus(score::GHOST_BONUS);
            renderer.0.destroy_visual(handle);
            commands.entity(entity).despawn();
            info!(ghost = %archetype, score = player.score, "Ghost eaten");
        } else {
            let alive = player.hit_by_enemy();
            debug!(ghost = %archetype, alive, lives = player.lives, "Ghost contact");
        }
    }

    for (position, mut boss) in bosses.iter_mut() {
        let touching = position.0 == tile;
        if touching {
            if player.is_invincible() {
                if !boss.in_contact {
                    player.add_bonus(score::BOSS_BONUS);
                    info!(score = player.score, "Boss struck");
                }
            } else {
                let alive = player.hit_by_enemy();
                debug!(alive, lives = player.lives, "Boss contact");
            }
        }
        if boss.in_contact != touching {
            boss.in_contact = touching;
        }
    }
}
