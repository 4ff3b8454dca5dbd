//! Driven port: what the consensus service needs from its collaborators.

use aleph_crypto::ThresholdCoin;

/// Supplies this process's share of the committee's common coin. A
/// narrow trait so the consensus crate does not dictate how the coin's
/// keypair is loaded or rotated.
pub trait CoinProvider: Send + Sync {
    fn coin(&self) -> &ThresholdCoin;
}
