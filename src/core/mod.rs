pub mod relay;
pub mod transform;
pub mod upstream;

pub use relay::{RelaySession, SessionEnd, SessionState};
pub use transform::{downstream_to_upstream, observe_ping, upstream_to_downstream};
pub use upstream::{CONVAI_SUBPROTOCOL, UpstreamConnector};
