//! End-to-end verifiable e-voting primitives: elliptic-curve ElGamal over a
//! hand-rolled prime-field curve, additively homomorphic tallying via
//! meet-in-the-middle discrete-log recovery, a one-of-many zero-knowledge
//! proof that a ballot encrypts a valid candidate, and textbook RSA voter
//! signatures.
//!
//! See [`protocol`] for the `Voter`/`VotingServer` orchestration that ties
//! the lower layers together.

pub mod constants;
pub mod curve;
pub mod elgamal;
pub mod error;
pub mod field;
pub mod proof;
pub mod protocol;
pub mod rsa;
pub mod tally;

pub use curve::{EllipticCurve, Point};
pub use elgamal::Ciphertext;
pub use error::VotingError;
pub use proof::Proof;
pub use protocol::{Ballot, ElectionRecord, PublicParameters, ServerState, Voter, VotingServer};
pub use rsa::{RsaKeyPair, RsaPublicKey};
