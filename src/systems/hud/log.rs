use thousands::Separable;
use tracing::{debug, info};

use super::Hud;

/// A HUD that reports through the log, for headless runs.
#[derive(Debug, Default)]
pub struct TracingHud {
    best_score: u32,
}

impl TracingHud {
    pub fn best_score(&self) -> u32 {
        self.best_score
    }
}

impl Hud for TracingHud {
    fn update_score(&mut self, score: u32) {
        debug!(score = %score.separate_with_commas(), "Score");
    }

    fn update_level(&mut self, level: u32) {
        info!(level, "Level");
    }

    fn update_lives(&mut self, lives: u32) {
        debug!(lives, "Lives");
    }

    fn show_level_complete(&mut self, next_level: u32) {
        info!(next_level, "Level complete!");
    }

    fn show_game_over(&mut self, final_score: u32) {
        self.best_score = self.best_score.max(final_score);
        info!(
            score = %final_score.separate_with_commas(),
            best = %self.best_score.separate_with_commas(),
            "Game over"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_score_survives_sessions() {
        let mut hud = TracingHud::default();
        hud.show_game_over(1_200);
        hud.show_game_over(300);
        assert_eq!(hud.best_score(), 1_200);
    }
}
