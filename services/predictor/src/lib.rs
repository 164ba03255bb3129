//! Card-suit prediction relay
//!
//! Watches a card-game results feed, opens a prediction for the next
//! round when a game number ends in a trigger digit, and settles it when
//! the game three rounds later is revealed.

pub mod config;
pub mod engine;
pub mod parser;
pub mod relay;
pub mod storage;
pub mod transport;
