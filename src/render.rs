//! Text rendering of the board for the console.

use board::{Board, Glyphs, Orientation, Piece, Square};

/// Draws `board` as seen from `orientation`. The selected square is bracketed, engine-reported
/// destinations are marked with `*` when empty and parenthesized when occupied.
pub fn render(
    board: &Board,
    orientation: Orientation,
    selected: Option<Square>,
    highlights: &[Square],
    glyphs: Glyphs,
) -> String {
    let mut s = String::new();

    s.push_str("   ┌────────────────────────┐\n");
    for row in 0..8u8 {
        let rank = orientation.square_of_tile(0, row).rank();
        s.push_str(&format!(" {} │", rank + 1));
        for col in 0..8u8 {
            let sq = orientation.square_of_tile(col, row);
            s.push_str(&cell(board.piece_at_sq(sq), sq, selected, highlights, glyphs));
        }
        s.push_str("│\n");
    }
    s.push_str("   └────────────────────────┘\n");

    s.push_str("    ");
    for col in 0..8u8 {
        let file = orientation.square_of_tile(col, 7).file();
        s.push_str(&format!(" {} ", (b'a' + file) as char));
    }
    s.push('\n');

    s
}

fn cell(
    piece: Piece,
    sq: Square,
    selected: Option<Square>,
    highlights: &[Square],
    glyphs: Glyphs,
) -> String {
    let glyph = match glyphs {
        Glyphs::Ascii => piece.glyph(),
        Glyphs::Unicode => piece.unicode_glyph(),
    };

    if selected == Some(sq) {
        format!("[{}]", glyph)
    } else if highlights.contains(&sq) {
        if piece.is_none() {
            " * ".to_string()
        } else {
            format!("({})", glyph)
        }
    } else {
        format!(" {} ", glyph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(s: &str) -> Vec<&str> {
        s.lines().collect()
    }

    #[test]
    fn white_view_has_rank_eight_on_top() {
        let out = render(
            &Board::start_pos(),
            Orientation::ViewFromWhite,
            None,
            &[],
            Glyphs::Ascii,
        );
        let rows = rows(&out);
        assert_eq!(rows[1], " 8 │ r  n  b  q  k  b  n  r │");
        assert_eq!(rows[8], " 1 │ R  N  B  Q  K  B  N  R │");
        assert_eq!(rows[10], "     a  b  c  d  e  f  g  h ");
    }

    #[test]
    fn black_view_is_rotated() {
        let out = render(
            &Board::start_pos(),
            Orientation::ViewFromBlack,
            None,
            &[],
            Glyphs::Ascii,
        );
        let rows = rows(&out);
        assert_eq!(rows[1], " 1 │ R  N  B  K  Q  B  N  R │");
        assert_eq!(rows[8], " 8 │ r  n  b  k  q  b  n  r │");
        assert_eq!(rows[10], "     h  g  f  e  d  c  b  a ");
    }

    #[test]
    fn marks_selection_and_targets() {
        let mut board = Board::start_pos();
        board.move_piece(Square::D7, Square::D3);
        let out = render(
            &board,
            Orientation::ViewFromWhite,
            Some(Square::E2),
            &[Square::D3, Square::E3, Square::E4],
            Glyphs::Ascii,
        );
        let rows = rows(&out);
        assert_eq!(rows[5], " 4 │ .  .  .  .  *  .  .  . │");
        assert_eq!(rows[6], " 3 │ .  .  . (p) *  .  .  . │");
        assert_eq!(rows[7], " 2 │ P  P  P  P [P] P  P  P │");
    }

    #[test]
    fn unicode_glyphs() {
        let out = render(
            &Board::start_pos(),
            Orientation::ViewFromWhite,
            None,
            &[],
            Glyphs::Unicode,
        );
        assert!(out.contains("♔"));
        assert!(out.contains("♟"));
    }
}
