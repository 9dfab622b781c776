//! Tile-clearing puzzle engine: a board of typed tiles, a library of card
//! effects and the move resolution that keeps the two-card hand valid.
//! Keep this crate free of IO and platform concerns.

pub mod board;
pub mod cards;
pub mod config;
pub mod effects;
pub mod error;
pub mod events;
pub mod generators;
pub mod hand;
pub mod moves;
pub mod rng;
pub mod state;

pub use board::*;
pub use cards::*;
pub use config::*;
pub use effects::*;
pub use error::*;
pub use events::*;
pub use generators::*;
pub use hand::*;
pub use moves::*;
pub use rng::*;
pub use state::*;
