//! Board snapshot text, as returned by the engine's `fetchState`.
//!
//! A snapshot is 8 rank groups separated by `/`, ordered top to bottom: the first group is the
//! eighth rank, the last group is the first rank. Each group holds 8 cell tokens, a to h,
//! separated by a space. A token is a single piece glyph, or `.` for an empty cell:
//!
//! ```text
//! r n b q k b n r/p p p p p p p p/. . . . . . . ./. . . . . . . ./. . . . . . . ./. . . . . . . ./P P P P P P P P/R N B Q K B N R
//! ```
//!
//! Decoding also accepts what engines tend to emit around that: surrounding whitespace, one
//! trailing `/`, runs of spaces, Unicode chess glyphs, and groups written without any cell
//! delimiter (`rnbqkbnr`). Encoding always produces the canonical form above, so
//! `decode(&encode(&b)) == Ok(b)`.
//!
//! The codec is purely syntactic: a board with three kings decodes without complaint.

use crate::position::{Board, Piece, Square};

use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

pub const RANK_DELIMITER: char = '/';
pub const CELL_DELIMITER: char = ' ';

/// The snapshot of the standard starting position.
pub const START_SNAPSHOT: &str = "r n b q k b n r/p p p p p p p p/. . . . . . . ./. . . . . . . ./. . . . . . . ./. . . . . . . ./P P P P P P P P/R N B Q K B N R";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("snapshot has {found} rank groups; expected 8")]
    RankCount { found: usize },
    #[error("rank {rank} has {found} cells; expected 8")]
    CellCount { rank: u8, found: usize },
    #[error("unrecognized cell token {token:?} on rank {rank}")]
    BadToken { rank: u8, token: String },
}

/// Which glyph set `encode_with` writes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum Glyphs {
    #[default]
    Ascii,
    Unicode,
}

pub fn decode(text: &str) -> Result<Board, FormatError> {
    let body = text.trim();
    let body = body.strip_suffix(RANK_DELIMITER).unwrap_or(body);
    if body.is_empty() {
        return Err(FormatError::RankCount { found: 0 });
    }

    let groups: Vec<&str> = body.split(RANK_DELIMITER).collect();
    if groups.len() != 8 {
        return Err(FormatError::RankCount {
            found: groups.len(),
        });
    }

    let mut board = Board::new();
    for (i, group) in groups.iter().enumerate() {
        let rank = 7 - i as u8;
        let tokens = tokenize(group);
        if tokens.len() != 8 {
            return Err(FormatError::CellCount {
                rank: rank + 1,
                found: tokens.len(),
            });
        }

        for (file, token) in tokens.iter().enumerate() {
            let piece = Piece::from_glyph(token).ok_or_else(|| FormatError::BadToken {
                rank: rank + 1,
                token: token.to_string(),
            })?;
            board.place(Square::from_rank_file_unchecked(rank, file as u8), piece);
        }
    }

    Ok(board)
}

/// Splits one rank group into cell tokens.
fn tokenize(group: &str) -> Vec<&str> {
    let group = group.trim();
    if group.contains(char::is_whitespace) {
        group.split_whitespace().collect()
    } else {
        // Compact form; graphemes keep multi-byte glyphs (and any trailing variation selector)
        // together.
        group.graphemes(true).collect()
    }
}

pub fn encode(board: &Board) -> String {
    encode_with(board, Glyphs::Ascii)
}

pub fn encode_with(board: &Board, glyphs: Glyphs) -> String {
    let mut out = String::with_capacity(128);
    for rank in (0..8u8).rev() {
        for file in 0..8u8 {
            let piece = board.piece_at_sq(Square::from_rank_file_unchecked(rank, file));
            out.push(match glyphs {
                Glyphs::Ascii => piece.glyph(),
                Glyphs::Unicode => piece.unicode_glyph(),
            });
            if file < 7 {
                out.push(CELL_DELIMITER);
            }
        }
        if rank > 0 {
            out.push(RANK_DELIMITER);
        }
    }
    out
}
