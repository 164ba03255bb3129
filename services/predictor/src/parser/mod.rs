//! Announcement parsing
//!
//! Turns free-form result lines into a game number plus the raw
//! parenthesized hand groups, and canonicalizes suit glyphs so hands
//! can be compared as sets. Every function here is total: malformed
//! input yields `None` or an empty collection.

pub mod announcement;
pub mod extract;
pub mod suits;

pub use announcement::*;
pub use extract::*;
pub use suits::*;
