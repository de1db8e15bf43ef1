//! Procedural obstacle and pickup placement

use rand::Rng;

use crate::config::GameConfig;

use super::entities::ExpBean;
use super::physics::Obstacle;

/// Obstacles keep this distance from the map edge
const OBSTACLE_MARGIN: f32 = 50.0;
const OBSTACLE_MIN_SIZE: f32 = 50.0;
const OBSTACLE_SIZE_SPREAD: f32 = 100.0;
const BEAN_MIN_VALUE: f32 = 10.0;
const BEAN_VALUE_SPREAD: f32 = 20.0;

/// Generates a room's static layout. Placement does not avoid overlap.
pub struct WorldGenerator;

impl WorldGenerator {
    pub fn generate_obstacles<R: Rng + ?Sized>(
        rng: &mut R,
        config: &GameConfig,
        count: usize,
    ) -> Vec<Obstacle> {
        let span_x = (config.map_width - 2.0 * OBSTACLE_MARGIN).max(0.0);
        let span_y = (config.map_height - 2.0 * OBSTACLE_MARGIN).max(0.0);

        (0..count)
            .map(|_| {
                Obstacle::new(
                    OBSTACLE_MARGIN + rng.gen::<f32>() * span_x,
                    OBSTACLE_MARGIN + rng.gen::<f32>() * span_y,
                    OBSTACLE_MIN_SIZE + rng.gen::<f32>() * OBSTACLE_SIZE_SPREAD,
                    OBSTACLE_MIN_SIZE + rng.gen::<f32>() * OBSTACLE_SIZE_SPREAD,
                )
            })
            .collect()
    }

    pub fn generate_exp_beans<R: Rng + ?Sized>(
        rng: &mut R,
        config: &GameConfig,
        count: usize,
    ) -> Vec<ExpBean> {
        (0..count)
            .map(|_| {
                ExpBean::new(
                    rng.gen::<f32>() * config.map_width,
                    rng.gen::<f32>() * config.map_height,
                    BEAN_MIN_VALUE + rng.gen::<f32>() * BEAN_VALUE_SPREAD,
                )
            })
            .collect()
    }
}
