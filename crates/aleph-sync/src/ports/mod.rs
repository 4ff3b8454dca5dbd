//! Ports layer (hexagonal architecture): inbound (driving) and outbound
//! (driven) interfaces of the sync engine.

mod inbound;
mod outbound;

pub use inbound::{DuplexStream, SyncApi, SyncOutcome};
pub use outbound::{PosetSnapshot, UnitSink, UnitSource};
