use crate::{HandSide, Tile};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("tile {tile:?} at ({x}, {y}) cannot be hit")]
    InvalidTileState { x: i32, y: i32, tile: Option<Tile> },
    #[error("unsupported effect: {0}")]
    UnsupportedEffect(String),
    #[error("cannot sample {requested} items from {available}")]
    SamplingUnderflow { requested: usize, available: usize },
    #[error("invalid target ({x}, {y})")]
    InvalidTarget { x: i32, y: i32 },
    #[error("{0:?} hand slot is empty")]
    EmptyHandSlot(HandSide),
    #[error("no changes left")]
    NoChangesLeft,
    #[error("board is already cleared")]
    GameFinished,
    #[error("invalid weights: {0}")]
    InvalidWeights(String),
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}
