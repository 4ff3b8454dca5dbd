//! Ports layer (hexagonal architecture): inbound (driving) and outbound
//! (driven) interfaces of the consensus engine.

mod inbound;
mod outbound;

pub use inbound::ConsensusApi;
pub use outbound::CoinProvider;
