mod board;
mod piece;
mod square;

pub use board::Board;
pub use piece::{Piece, PieceType, EMPTY_GLYPH, PIECE_TYPES};
pub use square::{Square, SquareError};

use std::fmt;
use std::ops::Not;
use std::str::FromStr;

use thiserror::Error;

/// One of the two players. Exactly one side is to move at any time.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    White,
    Black,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0:?} is not a side; expected white or black")]
pub struct SideError(pub String);

impl Side {
    /// Returns the other side.
    #[inline(always)]
    pub fn other(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    #[inline(always)]
    pub fn is_white(self) -> bool {
        self == Side::White
    }

    /// The lower case name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }

    /// Returns the rank offset of a single pawn push.
    #[inline(always)]
    pub fn pawn_push(self) -> i8 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }
}

impl Not for Side {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self::Output {
        self.other()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

impl FromStr for Side {
    type Err = SideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Side::White),
            "black" | "b" => Ok(Side::Black),
            _ => Err(SideError(s.to_string())),
        }
    }
}
