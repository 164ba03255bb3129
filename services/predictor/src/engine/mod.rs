//! Prediction engine
//!
//! Announcement → trigger check → pending prediction → verification →
//! outcome log → periodic digest. The engine is synchronous and owns its
//! state outright; callers that receive announcements concurrently must
//! serialize access (see `relay::PredictionService`).

pub mod actions;
pub mod machine;
pub mod record;
pub mod render;
pub mod report;
pub mod state;

pub use actions::EngineAction;
pub use machine::{judge_reveal, next_round_game, Engine, TriggerOutcome};
pub use record::*;
pub use report::{Digest, EngineStats};
pub use state::{EngineSettings, EngineState};
