//! Playfield grid: occupancy + colour tag per cell, row-clear cascade.

use std::collections::VecDeque;

/// Single cell: either empty or filled with the colour tag of the piece that settled there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Filled(u8),
}

impl Cell {
    #[inline]
    pub fn is_filled(self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

/// Playfield: W x H cells. y=0 is the floor; rows are stored bottom-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    /// rows[y][x] = cell. rows[0] is the floor row.
    rows: VecDeque<Vec<Cell>>,
}

impl Grid {
    pub fn new(width: u16, height: u16) -> Self {
        let (w, h) = (width as usize, height as usize);
        let rows = (0..h).map(|_| vec![Cell::Empty; w]).collect();
        Self {
            width: w,
            height: h,
            rows,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Cell at (x, y); None outside the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    /// Out-of-bounds positions count as occupied.
    #[inline]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_none_or(Cell::is_filled)
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if !self.in_bounds(x, y) {
            return;
        }
        if let Some(row) = self.rows.get_mut(y as usize) {
            row[x as usize] = cell;
        }
    }

    /// Mark every listed cell as filled with `color`. No validation; out-of-bounds cells are dropped.
    pub fn commit(&mut self, cells: &[(i32, i32)], color: u8) {
        for &(x, y) in cells {
            self.set(x, y, Cell::Filled(color));
        }
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(|c| c.is_filled()))
    }

    /// Remove every full row, collapsing the rows above it. Returns the number of rows removed.
    ///
    /// The scan restarts from the floor after each removal, so rows that only become full
    /// after a shift are still caught. Every removal pushes an empty row on top, which bounds
    /// the loop by the grid height.
    pub fn clear_full_rows(&mut self) -> u32 {
        let mut cleared = 0u32;
        while let Some(y) = (0..self.height).find(|&y| self.is_row_full(y)) {
            self.collapse_row(y);
            cleared += 1;
        }
        debug_assert!(cleared as usize <= self.height);
        cleared
    }

    fn collapse_row(&mut self, y: usize) {
        self.rows.remove(y);
        self.rows.push_back(vec![Cell::Empty; self.width]);
    }

    pub fn reset(&mut self) {
        for row in &mut self.rows {
            row.fill(Cell::Empty);
        }
    }

    /// Number of filled cells; used by the HUD and tests.
    pub fn filled_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|c| c.is_filled()).count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row_except(grid: &mut Grid, y: i32, gaps: &[i32], color: u8) {
        for x in 0..grid.width() as i32 {
            if !gaps.contains(&x) {
                grid.set(x, y, Cell::Filled(color));
            }
        }
    }

    fn row(grid: &Grid, y: i32) -> Vec<Cell> {
        (0..grid.width() as i32)
            .map(|x| grid.get(x, y).unwrap())
            .collect()
    }

    #[test]
    fn test_out_of_bounds_is_occupied() {
        let grid = Grid::new(4, 8);
        assert!(grid.is_occupied(-1, 0));
        assert!(grid.is_occupied(4, 0));
        assert!(grid.is_occupied(0, -1));
        assert!(grid.is_occupied(0, 8));
        assert!(!grid.is_occupied(0, 0));
        assert!(!grid.is_occupied(3, 7));
    }

    #[test]
    fn test_commit_marks_cells() {
        let mut grid = Grid::new(4, 8);
        grid.commit(&[(0, 0), (1, 0), (1, 1)], 3);
        assert_eq!(grid.get(0, 0), Some(Cell::Filled(3)));
        assert_eq!(grid.get(1, 1), Some(Cell::Filled(3)));
        assert_eq!(grid.get(2, 0), Some(Cell::Empty));
        assert_eq!(grid.filled_count(), 3);
    }

    #[test]
    fn test_clear_single_row_shifts_stack_down() {
        let mut grid = Grid::new(4, 8);
        fill_row_except(&mut grid, 0, &[3], 1);
        fill_row_except(&mut grid, 1, &[], 2);
        fill_row_except(&mut grid, 2, &[0], 3);
        fill_row_except(&mut grid, 3, &[1, 2], 4);
        let above: Vec<_> = (2..8).map(|y| row(&grid, y)).collect();

        assert_eq!(grid.clear_full_rows(), 1);

        assert_eq!(row(&grid, 0), vec![
            Cell::Filled(1),
            Cell::Filled(1),
            Cell::Filled(1),
            Cell::Empty
        ]);
        for (i, expected) in above.iter().enumerate() {
            assert_eq!(&row(&grid, 1 + i as i32), expected);
        }
        assert!(row(&grid, 7).iter().all(|c| *c == Cell::Empty));
    }

    #[test]
    fn test_clear_two_separate_rows() {
        let mut grid = Grid::new(4, 8);
        fill_row_except(&mut grid, 1, &[], 1);
        fill_row_except(&mut grid, 2, &[2], 2);
        fill_row_except(&mut grid, 3, &[], 3);
        fill_row_except(&mut grid, 4, &[0], 4);
        fill_row_except(&mut grid, 5, &[1], 5);
        let row2 = row(&grid, 2);
        let row4 = row(&grid, 4);
        let row5 = row(&grid, 5);

        assert_eq!(grid.clear_full_rows(), 2);

        assert!(row(&grid, 0).iter().all(|c| *c == Cell::Empty));
        assert_eq!(row(&grid, 1), row2);
        assert_eq!(row(&grid, 2), row4);
        assert_eq!(row(&grid, 3), row5);
        assert_eq!(grid.filled_count(), 9);
    }

    #[test]
    fn test_clear_adjacent_full_rows_cascade() {
        let mut grid = Grid::new(4, 8);
        for y in 0..3 {
            fill_row_except(&mut grid, y, &[], 1);
        }
        fill_row_except(&mut grid, 3, &[3], 2);
        assert_eq!(grid.clear_full_rows(), 3);
        assert_eq!(grid.get(0, 0), Some(Cell::Filled(2)));
        assert_eq!(grid.get(3, 0), Some(Cell::Empty));
        assert_eq!(grid.filled_count(), 3);
    }

    #[test]
    fn test_clear_whole_board() {
        let mut grid = Grid::new(4, 8);
        for y in 0..8 {
            fill_row_except(&mut grid, y, &[], 6);
        }
        assert_eq!(grid.clear_full_rows(), 8);
        assert_eq!(grid.filled_count(), 0);
    }

    #[test]
    fn test_no_full_rows_is_noop() {
        let mut grid = Grid::new(4, 8);
        fill_row_except(&mut grid, 0, &[1], 1);
        let before = grid.clone();
        assert_eq!(grid.clear_full_rows(), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_reset_empties_grid() {
        let mut grid = Grid::new(4, 8);
        fill_row_except(&mut grid, 0, &[], 1);
        grid.reset();
        assert_eq!(grid.filled_count(), 0);
        assert_eq!((grid.width(), grid.height()), (4, 8));
    }
}
