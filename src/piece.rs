//! Live piece: anchor, rotation, movement, hard drop, ghost projection.

use crate::grid::Grid;
use crate::shape::{CELLS_PER_PIECE, ShapeKind};

/// Grid position (x, y); y=0 is the floor.
pub type Pos = (i32, i32);

/// Current piece with position and rotation index into its shape's states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: ShapeKind,
    rotation: usize,
    anchor: Pos,
    cells: [Pos; CELLS_PER_PIECE],
    /// False once a downward step has been refused; the piece is waiting to be locked.
    movable: bool,
    /// Set by the first hard drop; further hard drops are ignored.
    dropped: bool,
    /// Vertical trail below each cell down to the first obstruction.
    ghost: Vec<Pos>,
}

impl Piece {
    /// New piece in rotation state 0 at `anchor`. Not validated against any grid.
    pub fn spawn(kind: ShapeKind, anchor: Pos) -> Self {
        Self {
            kind,
            rotation: 0,
            anchor,
            cells: cells_at(kind, 0, anchor),
            movable: true,
            dropped: false,
            ghost: Vec::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[inline]
    pub fn rotation(&self) -> usize {
        self.rotation
    }

    #[inline]
    pub fn anchor(&self) -> Pos {
        self.anchor
    }

    #[inline]
    pub fn cells(&self) -> &[Pos; CELLS_PER_PIECE] {
        &self.cells
    }

    #[inline]
    pub fn ghost(&self) -> &[Pos] {
        &self.ghost
    }

    #[inline]
    pub fn is_movable(&self) -> bool {
        self.movable
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.cells.contains(&(x, y))
    }

    /// Out of bounds, or occupied by a grid cell that is not one of this piece's cells.
    fn is_blocked(&self, grid: &Grid, x: i32, y: i32) -> bool {
        !grid.in_bounds(x, y) || (grid.is_occupied(x, y) && !self.contains(x, y))
    }

    /// True if any current cell sits on an occupied grid cell (spawn-time loss check).
    pub fn overlaps(&self, grid: &Grid) -> bool {
        self.cells.iter().any(|&(x, y)| grid.is_occupied(x, y))
    }

    /// Translate by (dx, dy) if every target cell is free; all-or-nothing.
    ///
    /// A refused downward step means the piece has landed: `movable` drops to false and every
    /// later command becomes a no-op until the piece is locked.
    pub fn try_move(&mut self, grid: &Grid, dx: i32, dy: i32) -> bool {
        if !self.movable {
            return false;
        }
        let blocked = self
            .cells
            .iter()
            .any(|&(x, y)| self.is_blocked(grid, x + dx, y + dy));
        if blocked {
            if dy < 0 {
                self.movable = false;
            }
            return false;
        }
        self.anchor = (self.anchor.0 + dx, self.anchor.1 + dy);
        self.cells = cells_at(self.kind, self.rotation, self.anchor);
        self.update_ghost(grid);
        true
    }

    /// Advance to the next rotation state in place; rolled back entirely if it would collide.
    pub fn rotate(&mut self, grid: &Grid) -> bool {
        if !self.movable {
            return false;
        }
        let next = (self.rotation + 1) % self.kind.states().len();
        let candidate = cells_at(self.kind, next, self.anchor);
        if candidate.iter().any(|&(x, y)| self.is_blocked(grid, x, y)) {
            return false;
        }
        self.rotation = next;
        self.cells = candidate;
        self.update_ghost(grid);
        true
    }

    /// Free fall available below this piece: minimum over cells of the free run straight down.
    fn drop_distance(&self, grid: &Grid) -> i32 {
        let mut distance = grid.height() as i32;
        for &(x, y) in &self.cells {
            let mut free = 0;
            while !self.is_blocked(grid, x, y - free - 1) {
                free += 1;
            }
            distance = distance.min(free);
        }
        distance
    }

    /// Move straight down as far as possible in one step. Only the first call has any effect.
    /// Does not lock; the next downward step finds the piece resting and clears `movable`.
    ///
    /// Returns the distance fallen, or None when ignored.
    pub fn hard_drop(&mut self, grid: &Grid) -> Option<i32> {
        if self.dropped {
            return None;
        }
        let distance = self.drop_distance(grid);
        if distance >= grid.height() as i32 {
            return None;
        }
        self.dropped = true;
        self.anchor.1 -= distance;
        self.cells = cells_at(self.kind, self.rotation, self.anchor);
        self.update_ghost(grid);
        Some(distance)
    }

    /// Recompute the ghost: for each cell walk down from the cell below it, collecting empty
    /// cells until an occupied cell, the floor, or another cell of this piece.
    pub fn update_ghost(&mut self, grid: &Grid) {
        self.ghost.clear();
        for &(x, y) in &self.cells {
            let mut k = y - 1;
            while k >= 0 && !grid.is_occupied(x, k) && !self.contains(x, k) {
                self.ghost.push((x, k));
                k -= 1;
            }
        }
    }
}

fn cells_at(kind: ShapeKind, rotation: usize, (ax, ay): Pos) -> [Pos; CELLS_PER_PIECE] {
    kind.state(rotation).map(|(dx, dy)| (ax + dx, ay + dy))
}
