//! Global configuration constants and world settings for the Arcade Physics engine.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};

/// Default edge length of one spatial-grid cell, in world units.
pub const DEFAULT_CELL_SIZE: f32 = 32.0;

/// Default number of lock shards the spatial grid splits its cells across.
pub const DEFAULT_GRID_SHARDS: usize = 16;

/// Items spanning more cells than this are kept in the grid's oversized list.
pub const DEFAULT_MAX_CELLS_PER_ITEM: usize = 4096;

/// Default gravity; arcade worlds are usually top-down.
pub const DEFAULT_GRAVITY: [f32; 2] = [0.0, 0.0];

pub const DEFAULT_RESTITUTION: f32 = 0.0;
pub const DEFAULT_FRICTION: f32 = 0.0;
pub const DEFAULT_LINEAR_DAMPING: f32 = 0.0;
pub const DEFAULT_MASS: f32 = 1.0;

/// Default frame budget used for the slow-step warning, in milliseconds.
pub const DEFAULT_FRAME_BUDGET_MS: f32 = 0.0;

/// Tunables applied once when a world is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub cell_size: f32,
    pub grid_shards: usize,
    pub max_cells_per_item: usize,
    pub gravity: Vec2,
    /// Zero disables the slow-step warning.
    pub frame_budget_ms: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            grid_shards: DEFAULT_GRID_SHARDS,
            max_cells_per_item: DEFAULT_MAX_CELLS_PER_ITEM,
            gravity: Vec2::from_array(DEFAULT_GRAVITY),
            frame_budget_ms: DEFAULT_FRAME_BUDGET_MS,
        }
    }
}

impl WorldSettings {
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(PhysicsError::InvalidSettings(format!(
                "cell size must be positive and finite, got {}",
                self.cell_size
            )));
        }
        if self.grid_shards == 0 {
            return Err(PhysicsError::InvalidSettings(
                "grid shard count must be at least 1".into(),
            ));
        }
        if self.max_cells_per_item == 0 {
            return Err(PhysicsError::InvalidSettings(
                "max cells per item must be at least 1".into(),
            ));
        }
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidSettings(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }
        Ok(())
    }
}
