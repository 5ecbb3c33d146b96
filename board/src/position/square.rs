use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Represents a single square of a chess board.
///
/// The index is `rank * 8 + file`, with rank 0 being the first rank (White's back rank) and file 0
/// being the a-file, so `a1` is 0 and `h8` is 63. The inner value is private: every constructor
/// checks the range, so a `Square` is always on the board.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Square(u8);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SquareError {
    #[error("square index {0} is outside 0..=63")]
    OutOfRange(i64),
    #[error("rank {rank} / file {file} is not on the board")]
    OffBoard { rank: usize, file: usize },
    #[error("{0:?} is neither a square index nor an algebraic square")]
    Unrecognized(String),
}

impl Square {
    /// Creates a square from a raw index.
    pub fn new(idx: u8) -> Result<Self, SquareError> {
        if idx < 64 {
            Ok(Square(idx))
        } else {
            Err(SquareError::OutOfRange(idx as i64))
        }
    }

    /// Creates a square from a rank and a file, both in `0..8`.
    pub fn from_rank_file(rank: usize, file: usize) -> Result<Self, SquareError> {
        if rank <= 7 && file <= 7 {
            Ok(Square((rank * 8 + file) as u8))
        } else {
            Err(SquareError::OffBoard { rank, file })
        }
    }

    /// Only for callers which have already bounded `rank` and `file` to `0..8`.
    #[inline]
    pub(crate) const fn from_rank_file_unchecked(rank: u8, file: u8) -> Self {
        debug_assert!(rank <= 7 && file <= 7);
        Square(rank * 8 + file)
    }

    /// The raw index, `0..=63`.
    #[inline(always)]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Returns the rank index (0 for the first rank) of the square.
    #[inline(always)]
    pub const fn rank(self) -> u8 {
        self.0 >> 3
    }

    /// Returns the file index (0 for the a-file) of the square.
    #[inline(always)]
    pub const fn file(self) -> u8 {
        self.0 & 0b0000_0111
    }

    /// Returns the square `delta_rank` ranks away on the same file, if it is on the board.
    pub fn shift_rank(self, delta_rank: i8) -> Option<Self> {
        let rank = self.rank() as i8 + delta_rank;
        if (0..8).contains(&rank) {
            Some(Self::from_rank_file_unchecked(rank as u8, self.file()))
        } else {
            None
        }
    }

    /// Iterates over all 64 squares, from a1 to h8.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    fn parse_algebraic(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file = chars.next()?.to_ascii_lowercase();
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }

        Some(Self::from_rank_file_unchecked(
            rank as u8 - b'1',
            file as u8 - b'a',
        ))
    }
}

impl TryFrom<i64> for Square {
    type Error = SquareError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (0..64).contains(&value) {
            Ok(Square(value as u8))
        } else {
            Err(SquareError::OutOfRange(value))
        }
    }
}

impl From<Square> for u8 {
    fn from(sq: Square) -> u8 {
        sq.0
    }
}

/// Accepts either a plain index (`"12"`) or algebraic notation (`"e2"`).
impl FromStr for Square {
    type Err = SquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<i64>() {
            return Square::try_from(n);
        }

        Self::parse_algebraic(s).ok_or_else(|| SquareError::Unrecognized(s.to_string()))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.file()) as char;
        write!(f, "{}{}", file, self.rank() + 1)
    }
}

macro_rules! square_consts {
    ($($name:ident = $idx:expr),* $(,)?) => {
        impl Square {
            $(
                #[doc(hidden)]
                pub const $name: Square = Square($idx);
            )*
        }
    };
}

square_consts!(
    A1 = 0, B1 = 1, C1 = 2, D1 = 3, E1 = 4, F1 = 5, G1 = 6, H1 = 7,
    A2 = 8, B2 = 9, C2 = 10, D2 = 11, E2 = 12, F2 = 13, G2 = 14, H2 = 15,
    A3 = 16, B3 = 17, C3 = 18, D3 = 19, E3 = 20, F3 = 21, G3 = 22, H3 = 23,
    A4 = 24, B4 = 25, C4 = 26, D4 = 27, E4 = 28, F4 = 29, G4 = 30, H4 = 31,
    A5 = 32, B5 = 33, C5 = 34, D5 = 35, E5 = 36, F5 = 37, G5 = 38, H5 = 39,
    A6 = 40, B6 = 41, C6 = 42, D6 = 43, E6 = 44, F6 = 45, G6 = 46, H6 = 47,
    A7 = 48, B7 = 49, C7 = 50, D7 = 51, E7 = 52, F7 = 53, G7 = 54, H7 = 55,
    A8 = 56, B8 = 57, C8 = 58, D8 = 59, E8 = 60, F8 = 61, G8 = 62, H8 = 63,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_and_file() {
        assert_eq!(Square::E2.rank(), 1);
        assert_eq!(Square::E2.file(), 4);
        assert_eq!(Square::H8.index(), 63);
        assert_eq!(Square::from_rank_file(3, 4), Ok(Square::E4));
        assert!(Square::from_rank_file(8, 0).is_err());
    }

    #[test]
    fn parses_numbers_and_algebraic() {
        assert_eq!("12".parse::<Square>(), Ok(Square::E2));
        assert_eq!("e4".parse::<Square>(), Ok(Square::E4));
        assert_eq!(" H8 ".parse::<Square>(), Ok(Square::H8));
        assert_eq!("64".parse::<Square>(), Err(SquareError::OutOfRange(64)));
        assert_eq!("-1".parse::<Square>(), Err(SquareError::OutOfRange(-1)));
        assert!(matches!(
            "i9".parse::<Square>(),
            Err(SquareError::Unrecognized(_))
        ));
        assert!("e".parse::<Square>().is_err());
        assert!("e22".parse::<Square>().is_err());
    }

    #[test]
    fn display_is_algebraic() {
        assert_eq!(Square::A1.to_string(), "a1");
        assert_eq!(Square::E4.to_string(), "e4");
        for sq in Square::all() {
            assert_eq!(sq.to_string().parse::<Square>(), Ok(sq));
        }
    }

    #[test]
    fn shift_stays_on_board() {
        assert_eq!(Square::E2.shift_rank(2), Some(Square::E4));
        assert_eq!(Square::E7.shift_rank(-1), Some(Square::E6));
        assert_eq!(Square::A8.shift_rank(1), None);
        assert_eq!(Square::A1.shift_rank(-1), None);
    }
}
