//! Spawner: uniform random shape at the spawn anchor.

use crate::SpawnColumn;
use crate::grid::Grid;
use crate::piece::{Piece, Pos};
use crate::shape::ShapeKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Spawn row as a fraction of the grid height (numerator, denominator).
const SPAWN_ROW_RATIO: (usize, usize) = (11, 12);

/// Columns kept clear on each side by random spawns; covers the widest state-0 offsets.
const SPAWN_MARGIN: usize = 2;

#[derive(Debug, Clone)]
pub struct Spawner {
    rng: StdRng,
    column: SpawnColumn,
}

impl Spawner {
    pub fn new(column: SpawnColumn) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            column,
        }
    }

    /// Deterministic sequence of shapes and columns for a given seed.
    pub fn with_seed(column: SpawnColumn, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            column,
        }
    }

    /// Anchor row near the top; leaves room for the +1 row offsets of state 0.
    pub fn spawn_row(height: usize) -> i32 {
        let (num, den) = SPAWN_ROW_RATIO;
        (height * num / den).min(height.saturating_sub(2)) as i32
    }

    pub fn spawn_anchor(&mut self, grid: &Grid) -> Pos {
        let width = grid.width();
        let x = match self.column {
            SpawnColumn::Random if width > 2 * SPAWN_MARGIN => {
                self.rng.random_range(SPAWN_MARGIN..width - SPAWN_MARGIN)
            }
            SpawnColumn::Random | SpawnColumn::Center => width / 2,
        };
        (x as i32, Self::spawn_row(grid.height()))
    }

    /// Next piece at the spawn anchor. No collision check; the session decides on loss.
    pub fn next(&mut self, grid: &Grid) -> Piece {
        let kind = ShapeKind::ALL[self.rng.random_range(0..ShapeKind::ALL.len())];
        let anchor = self.spawn_anchor(grid);
        Piece::spawn(kind, anchor)
    }
}
