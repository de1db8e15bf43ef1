//! Geometry and collision tests

use serde::Serialize;

/// Static axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Strict interior test; points on the edge are outside
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x > self.x && x < self.x + self.width && y > self.y && y < self.y + self.height
    }
}

/// Collision helpers for players, arrows and pickups
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Rectangular proximity test: |dx| < half_x and |dy| < half_y
    pub fn within_box(x1: f32, y1: f32, x2: f32, y2: f32, half_x: f32, half_y: f32) -> bool {
        (x1 - x2).abs() < half_x && (y1 - y2).abs() < half_y
    }

    /// Check whether a point lies inside any obstacle
    pub fn hits_obstacle(x: f32, y: f32, obstacles: &[Obstacle]) -> bool {
        obstacles.iter().any(|o| o.contains(x, y))
    }

    /// Euclidean distance between two points
    pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
        let dx = x2 - x1;
        let dy = y2 - y1;
        (dx * dx + dy * dy).sqrt()
    }

    /// Clamp a position into the map, keeping `margin` from every edge
    pub fn clamp_to_map(x: f32, y: f32, width: f32, height: f32, margin: f32) -> (f32, f32) {
        (
            x.clamp(margin, (width - margin).max(margin)),
            y.clamp(margin, (height - margin).max(margin)),
        )
    }

    pub fn out_of_bounds_x(x: f32, width: f32) -> bool {
        x < 0.0 || x > width
    }

    pub fn out_of_bounds_y(y: f32, height: f32) -> bool {
        y < 0.0 || y > height
    }
}
