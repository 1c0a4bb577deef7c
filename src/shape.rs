//! Shape catalog: each shape is a fixed table of rotation states.

/// Cells per piece; constant across every rotation state of every shape.
pub const CELLS_PER_PIECE: usize = 4;

/// Relative (dx, dy) of one cell from the piece anchor. y grows upward.
pub type Offset = (i32, i32);

/// One orientation of a shape.
pub type RotationState = [Offset; CELLS_PER_PIECE];

const I_STATES: &[RotationState] = &[
    [(-2, 0), (-1, 0), (0, 0), (1, 0)],
    [(0, 1), (0, 0), (0, -1), (0, -2)],
    [(-2, -1), (-1, -1), (0, -1), (1, -1)],
    [(-1, 1), (-1, 0), (-1, -1), (-1, -2)],
];

const O_STATES: &[RotationState] = &[[(0, 0), (0, 1), (1, 0), (1, 1)]];

const T_STATES: &[RotationState] = &[
    [(0, 0), (-1, 0), (1, 0), (0, 1)],
    [(0, 0), (0, 1), (0, -1), (1, 0)],
    [(0, 0), (1, 0), (-1, 0), (0, -1)],
    [(0, 0), (0, -1), (0, 1), (-1, 0)],
];

const S_STATES: &[RotationState] = &[
    [(0, 0), (-1, 1), (0, 1), (1, 0)],
    [(0, 0), (0, -1), (1, 0), (1, 1)],
    [(0, 0), (-1, 0), (0, -1), (1, -1)],
    [(0, 0), (-1, -1), (-1, 0), (0, 1)],
];

const Z_STATES: &[RotationState] = &[
    [(0, 0), (-1, 0), (0, 1), (1, 1)],
    [(0, 0), (0, 1), (1, 0), (1, -1)],
    [(0, 0), (-1, -1), (0, -1), (1, 0)],
    [(0, 0), (-1, 1), (-1, 0), (0, -1)],
];

const J_STATES: &[RotationState] = &[
    [(0, 0), (-1, 0), (-1, 1), (1, 0)],
    [(0, 0), (0, 1), (1, 1), (0, -1)],
    [(0, 0), (1, 0), (1, -1), (-1, 0)],
    [(0, 0), (0, -1), (-1, -1), (0, 1)],
];

const L_STATES: &[RotationState] = &[
    [(0, 0), (-1, 0), (-1, -1), (1, 0)],
    [(0, 0), (0, 1), (-1, 1), (0, -1)],
    [(0, 0), (1, 0), (1, 1), (-1, 0)],
    [(0, 0), (0, -1), (1, -1), (0, 1)],
];

/// Shape kinds (I, O, T, S, Z, J, L).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl ShapeKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::S, Self::Z, Self::J, Self::L];

    /// Rotation states in cycling order; state 0 is the spawn orientation.
    ///
    /// The I states rotate about a half-cell centre; they are stored shifted by half a cell so
    /// that anchors stay integral.
    pub fn states(self) -> &'static [RotationState] {
        match self {
            Self::I => I_STATES,
            Self::O => O_STATES,
            Self::T => T_STATES,
            Self::S => S_STATES,
            Self::Z => Z_STATES,
            Self::J => J_STATES,
            Self::L => L_STATES,
        }
    }

    #[inline]
    pub fn state(self, rotation: usize) -> &'static RotationState {
        let states = self.states();
        &states[rotation % states.len()]
    }

    /// Colour tag written into the grid when a piece of this shape locks.
    pub fn color_tag(self) -> u8 {
        match self {
            Self::I => 0,
            Self::O => 1,
            Self::T => 2,
            Self::S => 3,
            Self::Z => 4,
            Self::J => 5,
            Self::L => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::I => "I",
            Self::O => "O",
            Self::T => "T",
            Self::S => "S",
            Self::Z => "Z",
            Self::J => "J",
            Self::L => "L",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_shape_has_states() {
        for kind in ShapeKind::ALL {
            assert!(!kind.states().is_empty(), "{} has no states", kind.name());
        }
        assert_eq!(ShapeKind::O.states().len(), 1);
        for kind in ShapeKind::ALL.into_iter().filter(|k| *k != ShapeKind::O) {
            assert_eq!(kind.states().len(), 4, "{}", kind.name());
        }
    }

    #[test]
    fn test_states_have_distinct_cells() {
        for kind in ShapeKind::ALL {
            for state in kind.states() {
                let unique: HashSet<_> = state.iter().collect();
                assert_eq!(unique.len(), CELLS_PER_PIECE, "{} {:?}", kind.name(), state);
            }
        }
    }

    #[test]
    fn test_states_are_connected() {
        for kind in ShapeKind::ALL {
            for state in kind.states() {
                for &(x, y) in state {
                    let touching = state
                        .iter()
                        .filter(|&&(ox, oy)| (ox - x).abs() + (oy - y).abs() == 1)
                        .count();
                    assert!(touching >= 1, "{} {:?}", kind.name(), state);
                }
            }
        }
    }

    #[test]
    fn test_color_tags_are_unique() {
        let tags: HashSet<_> = ShapeKind::ALL.iter().map(|k| k.color_tag()).collect();
        assert_eq!(tags.len(), ShapeKind::ALL.len());
    }

    #[test]
    fn test_state_wraps_rotation_index() {
        assert_eq!(ShapeKind::T.state(4), ShapeKind::T.state(0));
        assert_eq!(ShapeKind::O.state(3), ShapeKind::O.state(0));
    }

    /// Rotates one offset a quarter turn clockwise about the shape's centre. `half` is 1 when
    /// the centre sits on a cell corner (I), 0 when it sits on the anchor cell.
    fn rotate_cw((x, y): Offset, half: i32) -> Offset {
        let (a, b) = (2 * x + half, 2 * y + half);
        ((b - half) / 2, (-a - half) / 2)
    }

    #[test]
    fn test_each_state_is_a_quarter_turn_of_the_previous() {
        for kind in ShapeKind::ALL.into_iter().filter(|k| *k != ShapeKind::O) {
            let half = i32::from(kind == ShapeKind::I);
            let states = kind.states();
            for (i, state) in states.iter().enumerate() {
                let next = &states[(i + 1) % states.len()];
                let rotated: HashSet<Offset> = state.iter().map(|&o| rotate_cw(o, half)).collect();
                let expected: HashSet<Offset> = next.iter().copied().collect();
                assert_eq!(rotated, expected, "{} state {}", kind.name(), i);
            }
        }
    }
}
