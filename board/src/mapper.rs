//! Conversion between pixel positions on a drawn board and `Square`s.
//!
//! The board is drawn as 8x8 tiles of `tile_size` pixels with the origin at the top-left corner.
//! Which square lands in which tile depends only on the `Orientation`, never on whose turn it is:
//!
//! - `ViewFromWhite`: column = file, row = 7 - rank (a8 top-left, h1 bottom-right).
//! - `ViewFromBlack`: column = 7 - file, row = rank (h1 top-left, a8 bottom-right).

use crate::position::{Side, SideError, Square};

use std::str::FromStr;
use thiserror::Error;

/// The side of the board the viewer sits at.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum Orientation {
    #[default]
    ViewFromWhite,
    ViewFromBlack,
}

impl Orientation {
    /// The orientation that puts `side`'s pieces at the bottom.
    pub fn for_side(side: Side) -> Self {
        match side {
            Side::White => Orientation::ViewFromWhite,
            Side::Black => Orientation::ViewFromBlack,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Orientation::ViewFromWhite => Orientation::ViewFromBlack,
            Orientation::ViewFromBlack => Orientation::ViewFromWhite,
        }
    }

    /// Maps a square to its (column, row) tile, both in `0..8`.
    pub fn tile_of(self, sq: Square) -> (u8, u8) {
        match self {
            Orientation::ViewFromWhite => (sq.file(), 7 - sq.rank()),
            Orientation::ViewFromBlack => (7 - sq.file(), sq.rank()),
        }
    }

    /// Maps a (column, row) tile back to its square. Both must be in `0..8`.
    pub fn square_of_tile(self, col: u8, row: u8) -> Square {
        debug_assert!(col <= 7 && row <= 7);
        match self {
            Orientation::ViewFromWhite => Square::from_rank_file_unchecked(7 - row, col),
            Orientation::ViewFromBlack => Square::from_rank_file_unchecked(row, 7 - col),
        }
    }
}

/// Parses the side the viewer sits at: `white` or `black`.
impl FromStr for Orientation {
    type Err = SideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Side>().map(Orientation::for_side)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("pixel ({x}, {y}) is outside the board")]
    OutOfBounds { x: i32, y: i32 },
    #[error("tile size {0} cannot be used to draw a board")]
    InvalidTileSize(u32),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CoordinateMapper {
    tile_size: u32,
}

impl CoordinateMapper {
    /// The tile size must be non-zero, and the whole board must fit in `i32` pixel coordinates.
    pub fn new(tile_size: u32) -> Result<Self, MapError> {
        if tile_size == 0 || tile_size as u64 * 8 > i32::MAX as u64 {
            return Err(MapError::InvalidTileSize(tile_size));
        }

        Ok(Self { tile_size })
    }

    /// Width (and height) of the whole board in pixels.
    pub fn board_size(&self) -> i32 {
        (self.tile_size * 8) as i32
    }

    pub fn square_at(&self, x: i32, y: i32, orientation: Orientation) -> Result<Square, MapError> {
        let size = self.board_size();
        if x < 0 || y < 0 || x >= size || y >= size {
            return Err(MapError::OutOfBounds { x, y });
        }

        let tile = self.tile_size as i32;
        Ok(orientation.square_of_tile((x / tile) as u8, (y / tile) as u8))
    }

    /// The top-left pixel of the tile showing `sq`.
    pub fn origin_of(&self, sq: Square, orientation: Orientation) -> (i32, i32) {
        let (col, row) = orientation.tile_of(sq);
        let tile = self.tile_size as i32;
        (col as i32 * tile, row as i32 * tile)
    }
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self { tile_size: 80 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIENTATIONS: [Orientation; 2] = [Orientation::ViewFromWhite, Orientation::ViewFromBlack];

    #[test]
    fn origin_round_trips_for_every_square() {
        for tile in [1, 7, 80] {
            let mapper = CoordinateMapper::new(tile).unwrap();
            for o in ORIENTATIONS {
                for sq in Square::all() {
                    let (x, y) = mapper.origin_of(sq, o);
                    assert_eq!(mapper.square_at(x, y, o), Ok(sq));
                    // The far corner of the tile maps to the same square.
                    let last = tile as i32 - 1;
                    assert_eq!(mapper.square_at(x + last, y + last, o), Ok(sq));
                }
            }
        }
    }

    #[test]
    fn corners_from_white() {
        let mapper = CoordinateMapper::new(80).unwrap();
        let o = Orientation::ViewFromWhite;
        assert_eq!(mapper.square_at(0, 0, o), Ok(Square::A8));
        assert_eq!(mapper.square_at(639, 639, o), Ok(Square::H1));
        assert_eq!(mapper.square_at(4 * 80 + 5, 6 * 80 + 5, o), Ok(Square::E2));
    }

    #[test]
    fn corners_from_black() {
        let mapper = CoordinateMapper::new(80).unwrap();
        let o = Orientation::ViewFromBlack;
        assert_eq!(mapper.square_at(0, 0, o), Ok(Square::H1));
        assert_eq!(mapper.square_at(639, 639, o), Ok(Square::A8));
        assert_eq!(mapper.origin_of(Square::E2, o), (3 * 80, 80));
    }

    #[test]
    fn outside_the_board_is_an_error() {
        let mapper = CoordinateMapper::new(80).unwrap();
        for (x, y) in [(-1, 0), (0, -1), (640, 0), (0, 640), (i32::MAX, i32::MIN)] {
            for o in ORIENTATIONS {
                assert_eq!(
                    mapper.square_at(x, y, o),
                    Err(MapError::OutOfBounds { x, y })
                );
            }
        }
    }

    #[test]
    fn rejects_unusable_tile_sizes() {
        assert_eq!(
            CoordinateMapper::new(0),
            Err(MapError::InvalidTileSize(0))
        );
        assert!(CoordinateMapper::new(u32::MAX).is_err());
    }

    #[test]
    fn orientation_helpers() {
        assert_eq!(Orientation::for_side(Side::Black), Orientation::ViewFromBlack);
        assert_eq!(Orientation::ViewFromBlack.flipped(), Orientation::ViewFromWhite);
        assert_eq!("b".parse(), Ok(Orientation::ViewFromBlack));
        assert!("sideways".parse::<Orientation>().is_err());
    }
}
