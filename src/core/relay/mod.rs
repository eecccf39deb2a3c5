//! Session orchestration: one upstream socket per downstream socket, two
//! pumps between them, and the liveness state they share.

mod liveness;
mod pump;
mod session;

pub use liveness::LivenessState;
pub use pump::{PumpExit, Side, pump_downstream_to_upstream, pump_upstream_to_downstream};
pub use session::{RelaySession, SessionEnd, SessionState};
