//! Cumulative orientation of a symbol: one of the eight symmetries of the
//! square, stored as a quarter-turn count and a mirror flag.

/// Orientation reached by a sequence of rotate/mirror operations.
///
/// `R*` variants are pure rotations, `M*` variants are rotations combined
/// with the X mirror. The discriminant packs the quarter-turn count in the
/// low two bits and the mirror flag in bit 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    R0 = 0,
    R90 = 1,
    R180 = 2,
    R270 = 3,
    M0 = 4,
    M90 = 5,
    M180 = 6,
    M270 = 7,
}

use Orientation::*;

const ALL: [Orientation; 8] = [R0, R90, R180, R270, M0, M90, M180, M270];

// rotation := rotation + 1
const ROTATE: [Orientation; 8] = [R90, R180, R270, R0, M90, M180, M270, M0];
// rotation := 3 * rotation, mirror toggled
const MIRROR_X: [Orientation; 8] = [M0, M270, M180, M90, R0, R270, R180, R90];
// rotation := 3 * rotation + 2, mirror toggled
const MIRROR_Y: [Orientation; 8] = [M180, M90, M0, M270, R180, R90, R0, R270];

impl Orientation {
    pub fn from_parts(rotation: u8, mirrored_x: bool) -> Self {
        ALL[usize::from(rotation & 3) | (usize::from(mirrored_x) << 2)]
    }

    /// Quarter turns applied, `0..=3`.
    pub fn rotation(self) -> u8 {
        self as u8 & 3
    }

    pub fn is_mirrored_x(self) -> bool {
        self as u8 & 4 != 0
    }

    pub fn rotated(self) -> Self {
        ROTATE[self as usize]
    }

    pub fn mirrored_x(self) -> Self {
        MIRROR_X[self as usize]
    }

    pub fn mirrored_y(self) -> Self {
        MIRROR_Y[self as usize]
    }
}
