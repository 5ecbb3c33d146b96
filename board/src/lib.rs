//! The board model shared by the session controller and the engine clients: squares, pieces,
//! sides, the 8x8 board, the snapshot text codec and the pixel/square mapping.

pub mod codec;
pub mod mapper;
pub mod position;

pub use codec::{decode, encode, encode_with, FormatError, Glyphs, START_SNAPSHOT};
pub use mapper::{CoordinateMapper, MapError, Orientation};
pub use position::{Board, Piece, PieceType, Side, SideError, Square, SquareError};
