use board::{Glyphs, Orientation, Side};

/// Whether the engine answers the human's moves by itself.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum ReplyMode {
    /// Every successful move is followed by an engine reply for the other side.
    #[default]
    Automatic,
    /// The engine only moves when asked to.
    Manual,
}

/// Session configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// The side the human plays.
    pub player: Side,
    /// Which way up the board is drawn.
    pub orientation: Orientation,
    /// Edge length of one board tile, in pixels.
    pub tile_size: u32,
    pub reply_mode: ReplyMode,
    /// Ask the engine for the destinations of a selected piece.
    pub highlights: bool,
    /// Let the engine play both sides.
    pub self_play: bool,
    /// Self-play stops after this many half-moves.
    pub max_plies: usize,
    /// Piece symbols used when drawing the board.
    pub glyphs: Glyphs,
}

impl Config {
    /// The default configuration for a human playing `player`, with the board drawn from their
    /// side.
    pub fn for_player(player: Side) -> Self {
        Self {
            player,
            orientation: Orientation::for_side(player),
            ..Default::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player: Side::White,
            orientation: Orientation::ViewFromWhite,
            tile_size: 80,
            reply_mode: ReplyMode::Automatic,
            highlights: true,
            self_play: false,
            max_plies: 200,
            glyphs: Glyphs::Ascii,
        }
    }
}
