use super::Side;
use std::fmt;

/// The contents of a single cell: a coloured piece, or `Piece::None` for an empty square.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Piece {
    None = 0,
    WhitePawn = 1,
    WhiteKnight = 2,
    WhiteBishop = 3,
    WhiteRook = 4,
    WhiteQueen = 5,
    WhiteKing = 6,
    BlackPawn = 7,
    BlackKnight = 8,
    BlackBishop = 9,
    BlackRook = 10,
    BlackQueen = 11,
    BlackKing = 12,
}

/// Glyph used for an empty cell in board snapshots.
pub const EMPTY_GLYPH: char = '.';

/// Unicode variation selector some terminals and engines append to chess symbols.
const VARIATION_SELECTOR: char = '\u{FE0F}';

impl Piece {
    #[inline(always)]
    pub fn is_none(&self) -> bool {
        *self == Piece::None
    }

    /// Returns the type of the piece, or `None` for an empty cell.
    pub fn type_of(&self) -> Option<PieceType> {
        match *self {
            Piece::None => None,
            Piece::WhitePawn | Piece::BlackPawn => Some(PieceType::Pawn),
            Piece::WhiteKnight | Piece::BlackKnight => Some(PieceType::Knight),
            Piece::WhiteBishop | Piece::BlackBishop => Some(PieceType::Bishop),
            Piece::WhiteRook | Piece::BlackRook => Some(PieceType::Rook),
            Piece::WhiteQueen | Piece::BlackQueen => Some(PieceType::Queen),
            Piece::WhiteKing | Piece::BlackKing => Some(PieceType::King),
        }
    }

    /// Returns the side owning the piece, or `None` for an empty cell.
    pub fn side(&self) -> Option<Side> {
        match *self as u8 {
            0 => None,
            1..=6 => Some(Side::White),
            _ => Some(Side::Black),
        }
    }

    /// Return a `Piece` from a `Side` and a `PieceType`.
    pub fn make(side: Side, piece_type: PieceType) -> Self {
        match side {
            Side::White => match piece_type {
                PieceType::Pawn => Piece::WhitePawn,
                PieceType::Knight => Piece::WhiteKnight,
                PieceType::Bishop => Piece::WhiteBishop,
                PieceType::Rook => Piece::WhiteRook,
                PieceType::Queen => Piece::WhiteQueen,
                PieceType::King => Piece::WhiteKing,
            },
            Side::Black => match piece_type {
                PieceType::Pawn => Piece::BlackPawn,
                PieceType::Knight => Piece::BlackKnight,
                PieceType::Bishop => Piece::BlackBishop,
                PieceType::Rook => Piece::BlackRook,
                PieceType::Queen => Piece::BlackQueen,
                PieceType::King => Piece::BlackKing,
            },
        }
    }

    /// The ASCII glyph: upper case for White, lower case for Black, `.` for empty.
    pub fn glyph(&self) -> char {
        match self.type_of() {
            None => EMPTY_GLYPH,
            Some(ty) => match self.side() {
                Some(Side::White) => ty.letter().to_ascii_uppercase(),
                _ => ty.letter(),
            },
        }
    }

    /// The Unicode chess symbol, `.` for empty.
    pub fn unicode_glyph(&self) -> char {
        match *self {
            Piece::None => EMPTY_GLYPH,
            Piece::WhitePawn => '♙',
            Piece::WhiteKnight => '♘',
            Piece::WhiteBishop => '♗',
            Piece::WhiteRook => '♖',
            Piece::WhiteQueen => '♕',
            Piece::WhiteKing => '♔',
            Piece::BlackPawn => '♟',
            Piece::BlackKnight => '♞',
            Piece::BlackBishop => '♝',
            Piece::BlackRook => '♜',
            Piece::BlackQueen => '♛',
            Piece::BlackKing => '♚',
        }
    }

    /// Reads a single cell token in either glyph set. Returns `None` if the token is not a
    /// recognised glyph; the empty marker decodes to `Some(Piece::None)`.
    pub fn from_glyph(token: &str) -> Option<Self> {
        let token = token.trim_end_matches(VARIATION_SELECTOR);
        let mut chars = token.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }

        let piece = match c {
            EMPTY_GLYPH => Piece::None,
            'P' | '♙' => Piece::WhitePawn,
            'N' | '♘' => Piece::WhiteKnight,
            'B' | '♗' => Piece::WhiteBishop,
            'R' | '♖' => Piece::WhiteRook,
            'Q' | '♕' => Piece::WhiteQueen,
            'K' | '♔' => Piece::WhiteKing,
            'p' | '♟' => Piece::BlackPawn,
            'n' | '♞' => Piece::BlackKnight,
            'b' | '♝' => Piece::BlackBishop,
            'r' | '♜' => Piece::BlackRook,
            'q' | '♛' => Piece::BlackQueen,
            'k' | '♚' => Piece::BlackKing,
            _ => return None,
        };
        Some(piece)
    }
}

impl Default for Piece {
    fn default() -> Self {
        Piece::None
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PieceType {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
}

pub const PIECE_TYPES: [PieceType; 6] = [
    PieceType::Pawn,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Rook,
    PieceType::Queen,
    PieceType::King,
];

impl PieceType {
    fn long_name(&self) -> &str {
        match self {
            PieceType::Pawn => "pawn",
            PieceType::Knight => "knight",
            PieceType::Bishop => "bishop",
            PieceType::Rook => "rook",
            PieceType::Queen => "queen",
            PieceType::King => "king",
        }
    }

    fn letter(&self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.width() == Some(1) {
            write!(f, "{}", self.letter())
        } else {
            write!(f, "{}", self.long_name())
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}
