pub mod mock;
pub mod replay;
pub mod traits;

pub use mock::MockTransport;
pub use replay::ReplayTransport;
pub use traits::{OutgoingMessage, Transport};
