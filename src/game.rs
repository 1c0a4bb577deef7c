//! Game session: gravity tick, lock, line clear, scoring, spawn and loss.

use crate::grid::Grid;
use crate::piece::Piece;
use crate::shape::ShapeKind;
use crate::spawner::Spawner;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    GameOver,
}

/// Notifications for the front end; drained with [`GameSession::take_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Locked { kind: ShapeKind },
    LinesCleared(u32),
    GameOver { score: u32 },
}

/// Game state: grid, current piece, spawner, score and statistics.
#[derive(Debug)]
pub struct GameSession {
    grid: Grid,
    piece: Piece,
    spawner: Spawner,
    status: Status,
    score: u32,
    lines_cleared: u32,
    pieces_locked: u32,
    events: Vec<GameEvent>,
}

impl GameSession {
    pub fn new(width: u16, height: u16, mut spawner: Spawner) -> Self {
        let grid = Grid::new(width, height);
        let mut piece = spawner.next(&grid);
        piece.update_ghost(&grid);
        debug!(width, height, kind = piece.kind().name(), "session started");
        Self {
            grid,
            piece,
            spawner,
            status: Status::Running,
            score: 0,
            lines_cleared: 0,
            pieces_locked: 0,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    #[inline]
    pub fn pieces_locked(&self) -> u32 {
        self.pieces_locked
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Gravity tick: one step down; locks the piece once it can no longer descend.
    pub fn tick(&mut self) {
        self.step_down();
    }

    pub fn move_left(&mut self) -> bool {
        self.is_running() && self.piece.try_move(&self.grid, -1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.is_running() && self.piece.try_move(&self.grid, 1, 0)
    }

    /// Same as a gravity tick, triggered by the player.
    pub fn soft_drop(&mut self) {
        self.step_down();
    }

    pub fn rotate(&mut self) -> bool {
        self.is_running() && self.piece.rotate(&self.grid)
    }

    /// Hard drop; the lock itself happens on the next gravity tick or soft drop.
    pub fn hard_drop(&mut self) -> Option<i32> {
        if !self.is_running() {
            return None;
        }
        self.piece.hard_drop(&self.grid)
    }

    /// Fresh grid of the given size, score back to zero, new piece, Running.
    pub fn restart(&mut self, width: u16, height: u16) {
        if (self.grid.width(), self.grid.height()) == (width as usize, height as usize) {
            self.grid.reset();
        } else {
            self.grid = Grid::new(width, height);
        }
        self.piece = self.spawner.next(&self.grid);
        self.piece.update_ghost(&self.grid);
        self.status = Status::Running;
        self.score = 0;
        self.lines_cleared = 0;
        self.pieces_locked = 0;
        self.events.clear();
        info!(width, height, "session restarted");
    }

    #[inline]
    fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    fn step_down(&mut self) {
        if !self.is_running() {
            return;
        }
        self.piece.try_move(&self.grid, 0, -1);
        if !self.piece.is_movable() {
            self.lock_piece();
        }
    }

    /// Commit the piece, clear rows, score, then spawn; the new piece overlapping the stack ends
    /// the game.
    fn lock_piece(&mut self) {
        let kind = self.piece.kind();
        self.grid.commit(self.piece.cells(), kind.color_tag());
        self.pieces_locked += 1;
        self.events.push(GameEvent::Locked { kind });
        debug!(
            kind = kind.name(),
            anchor = ?self.piece.anchor(),
            rotation = self.piece.rotation(),
            filled = self.grid.filled_count(),
            "piece locked"
        );

        let cleared = self.grid.clear_full_rows();
        if cleared > 0 {
            self.score += cleared;
            self.lines_cleared += cleared;
            self.events.push(GameEvent::LinesCleared(cleared));
            info!(cleared, score = self.score, "lines cleared");
        }

        self.piece = self.spawner.next(&self.grid);
        self.piece.update_ghost(&self.grid);
        if self.piece.overlaps(&self.grid) {
            self.status = Status::GameOver;
            self.events.push(GameEvent::GameOver { score: self.score });
            info!(score = self.score, pieces = self.pieces_locked, "game over");
        } else {
            debug!(kind = self.piece.kind().name(), anchor = ?self.piece.anchor(), "piece spawned");
        }
    }
}
