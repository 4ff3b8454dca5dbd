//! Ports layer (hexagonal architecture): inbound (driving) and outbound
//! (driven) interfaces of the poset engine.

mod inbound;
mod outbound;

pub use inbound::PosetApi;
pub use outbound::{CommitteeKeyProvider, NullEventSink, PosetEventSink};
