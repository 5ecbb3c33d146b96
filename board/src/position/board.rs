use super::{Piece, PieceType, Side, Square};
use std::fmt;

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// An 8x8 grid of cells, indexed by `Square`. The fixed-size array keeps the board at exactly
/// 64 cells.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Board {
    arr: [Piece; 64],
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self {
            arr: [Piece::None; 64],
        }
    }

    /// The standard starting position.
    pub fn start_pos() -> Self {
        let mut board = Self::new();
        for (file, ty) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            board.place(Square::from_rank_file_unchecked(0, file), Piece::make(Side::White, *ty));
            board.place(Square::from_rank_file_unchecked(1, file), Piece::WhitePawn);
            board.place(Square::from_rank_file_unchecked(6, file), Piece::BlackPawn);
            board.place(Square::from_rank_file_unchecked(7, file), Piece::make(Side::Black, *ty));
        }
        board
    }

    /// Returns the `Piece` at a `Square`, `Piece::None` if the square is empty.
    #[inline]
    pub fn piece_at_sq(&self, sq: Square) -> Piece {
        self.arr[sq.idx()]
    }

    /// Returns the cell at (rank, file), or `None` if either is outside `0..8`.
    pub fn get(&self, rank: usize, file: usize) -> Option<Piece> {
        Square::from_rank_file(rank, file)
            .ok()
            .map(|sq| self.piece_at_sq(sq))
    }

    /// Place a piece at the passed `Square`, replacing whatever was there.
    pub fn place(&mut self, sq: Square, piece: Piece) {
        self.arr[sq.idx()] = piece;
    }

    /// Remove the piece at the passed `Square`, returning it.
    pub fn remove(&mut self, sq: Square) -> Piece {
        std::mem::replace(&mut self.arr[sq.idx()], Piece::None)
    }

    /// Moves whatever is on `from` to `to`, returning the captured piece (or `Piece::None`).
    /// No chess rules are applied.
    pub fn move_piece(&mut self, from: Square, to: Square) -> Piece {
        let moving = self.remove(from);
        let captured = self.remove(to);
        self.place(to, moving);
        captured
    }

    /// Iterates over `(Square, Piece)` pairs from a1 to h8.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().map(move |sq| (sq, self.piece_at_sq(sq)))
    }

    /// Squares holding a piece of the given side, from a1 to h8.
    pub fn squares_of(&self, side: Side) -> impl Iterator<Item = Square> + '_ {
        self.iter()
            .filter(move |(_, piece)| piece.side() == Some(side))
            .map(|(sq, _)| sq)
    }

    pub fn count(&self, side: Side) -> usize {
        self.squares_of(side).count()
    }

    pub fn pretty_string(&self) -> String {
        let mut s = String::new();

        s.push_str("   ┌────────────────────────┐\n");
        for rank in (0..8u8).rev() {
            s.push_str(&format!(" {} │", rank + 1));
            for file in 0..8u8 {
                let piece = self.piece_at_sq(Square::from_rank_file_unchecked(rank, file));
                s.push_str(&format!(" {} ", piece));
            }
            s.push_str("│\n");
        }
        s.push_str("   └────────────────────────┘\n");
        s.push_str("     a  b  c  d  e  f  g  h \n");

        s
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_layout() {
        let board = Board::start_pos();
        assert_eq!(board.piece_at_sq(Square::E1), Piece::WhiteKing);
        assert_eq!(board.piece_at_sq(Square::D8), Piece::BlackQueen);
        assert_eq!(board.piece_at_sq(Square::E2), Piece::WhitePawn);
        assert_eq!(board.piece_at_sq(Square::E4), Piece::None);
        assert_eq!(board.count(Side::White), 16);
        assert_eq!(board.count(Side::Black), 16);
        assert!(board.squares_of(Side::White).all(|sq| sq.rank() <= 1));
        assert!(board.squares_of(Side::Black).all(|sq| sq.rank() >= 6));
    }

    #[test]
    fn get_checks_bounds() {
        let board = Board::start_pos();
        assert_eq!(board.get(0, 0), Some(Piece::WhiteRook));
        assert_eq!(board.get(8, 0), None);
        assert_eq!(board.get(0, 8), None);
    }

    #[test]
    fn move_piece_reports_capture() {
        let mut board = Board::start_pos();
        assert_eq!(board.move_piece(Square::E2, Square::E4), Piece::None);
        assert_eq!(board.piece_at_sq(Square::E2), Piece::None);
        assert_eq!(board.piece_at_sq(Square::E4), Piece::WhitePawn);
        assert_eq!(board.move_piece(Square::E4, Square::E7), Piece::BlackPawn);
    }

    #[test]
    fn pretty_string_has_rank_eight_on_top() {
        let s = Board::start_pos().pretty_string();
        let lines: Vec<&str> = s.lines().collect();
        assert!(lines[1].starts_with(" 8 │ r "));
        assert!(lines[8].starts_with(" 1 │ R "));
    }
}
