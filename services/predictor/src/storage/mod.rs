//! Engine state persistence

pub mod error;
pub mod state_store;

pub use error::StoreError;
pub use state_store::{JsonStateStore, MemoryStateStore, StateStore};
