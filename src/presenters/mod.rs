pub mod tile_board;

pub use tile_board::TileBoard;
