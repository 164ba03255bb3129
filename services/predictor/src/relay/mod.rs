pub mod metrics;
pub mod relay;
pub mod service;

pub use metrics::{RelayMetrics, RelayMetricsSnapshot};
pub use relay::Relay;
pub use service::PredictionService;
