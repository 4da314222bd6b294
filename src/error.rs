//! Error types for the voting core.
//!
//! Per the spec's error-handling design, only *setup* errors and the
//! tally-recovery's "no match found" case are represented as `Result`s here.
//! Low-level arithmetic misuse (point-not-on-curve, non-invertible scalar)
//! is a hard `panic!`/`assert!` in [`crate::field`]/[`crate::curve`], and
//! per-ballot verification failures are swallowed by [`crate::protocol`]'s
//! `cast_vote` (logged, not propagated), matching the reference's silent
//! rejection.

use thiserror::Error;

/// Errors raised by fallible, non-arithmetic operations in this crate.
#[derive(Debug, Error)]
pub enum VotingError {
    /// `4a³ + 27b² ≡ 0 (mod p)`: the curve equation has a repeated root and
    /// does not define a group.
    #[error("curve parameters are singular: 4a^3 + 27b^2 = 0 (mod p)")]
    SingularCurve,

    /// A voter chose a candidate index outside `[0, number_of_candidates)`.
    #[error("invalid candidate index {index} (must be < {num_candidates})")]
    InvalidCandidate { index: usize, num_candidates: usize },

    /// The meet-in-the-middle recovery found no composition of
    /// `number_of_voters` summing to the decrypted aggregate; this means the
    /// aggregate doesn't encode a valid tally (server or voter misbehavior,
    /// or a `number_of_voters` mismatch with the accepted-ballot count).
    #[error("tally recovery found no matching composition for {number_of_voters} voters")]
    TallyNotRecoverable { number_of_voters: u64 },

    /// `cast_vote` or `open_vote` called outside the state that permits it.
    #[error("server is in state {current:?}, which does not permit this operation")]
    InvalidServerState { current: crate::protocol::ServerState },
}
