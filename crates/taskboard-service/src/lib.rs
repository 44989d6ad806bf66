pub mod channels;
pub mod reorder;
pub mod service;

pub use channels::StateChannels;
pub use service::{BoardsService, DEFAULT_BOARD_NAME, DEFAULT_COLUMN_NAMES};
