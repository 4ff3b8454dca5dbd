//! Error taxonomy for the poset engine (component design §4.3, error
//! handling design §7). `Malformed` and `NonCompliant` are both terminal
//! for the offending unit; `Orphan` is transient and resolved by the
//! pending-parent buffer in the service layer.

use aleph_types::{Hash, ProcessId};
use thiserror::Error;

/// Reasons a candidate unit is rejected before or during poset insertion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PosetError {
    /// Decode, hash mismatch, or signature failure. Transport corruption is
    /// as likely a cause as malice, so this does not mark a forker.
    #[error("unit {0:?} is malformed: hash or signature does not verify")]
    Malformed(Hash),

    /// Structurally valid but violates one of the §4.3 compliance rules.
    #[error("unit {unit:?} is non-compliant: {reason}")]
    NonCompliant { unit: Hash, reason: ComplianceViolation },

    /// References a parent hash not yet present in the poset. Caller
    /// should buffer with a TTL rather than treat this as rejection.
    #[error("unit {0:?} references an unresolved parent {1:?}")]
    Orphan(Hash, Hash),

    /// The unit's own claimed height does not match the poset's record of
    /// its creator's chain.
    #[error("unit {hash:?} by {creator} has height {got} but chain is at {expected}")]
    HeightMismatch {
        hash: Hash,
        creator: ProcessId,
        got: u64,
        expected: u64,
    },

    /// The unit is already present (dedup by hash); not an error condition
    /// for the caller beyond "nothing to do".
    #[error("unit {0:?} is already known")]
    AlreadyKnown(Hash),
}

/// Which §4.3 compliance rule a unit violated, carried for diagnostics and
/// tests. Rule numbers follow the component design section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceViolation {
    /// Rule 2: a parent hash does not resolve, or height is not
    /// predecessor.height + 1.
    BadHeight,
    /// Rule 3: first parent's creator is not this unit's creator.
    SelfPredecessorMismatch,
    /// Rule 4: two parents share a creator.
    DuplicateParentCreator,
    /// Rule 5: the unit's combined floor proves its own creator a forker.
    SelfForkerProof,
    /// Rule 6: some parent proves another parent's creator a forker.
    ForkerEndorsement,
    /// Rule 7: expand-primes rule violated across the parent list.
    ExpandPrimesViolation,
}

impl std::fmt::Display for ComplianceViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ComplianceViolation::BadHeight => "bad height or unresolved parent",
            ComplianceViolation::SelfPredecessorMismatch => "first parent is not own predecessor",
            ComplianceViolation::DuplicateParentCreator => "parents share a creator",
            ComplianceViolation::SelfForkerProof => "unit proves its own creator a forker",
            ComplianceViolation::ForkerEndorsement => "a parent endorses another parent's fork",
            ComplianceViolation::ExpandPrimesViolation => "expand-primes rule violated",
        };
        f.write_str(s)
    }
}

pub type PosetResult<T> = Result<T, PosetError>;
