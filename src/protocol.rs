//! The voter/server protocol shell: orchestrates per-ballot signing,
//! verification, casting, and opening on top of [`crate::curve`],
//! [`crate::elgamal`], [`crate::proof`], and [`crate::tally`].

use num_bigint::BigUint;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::{DEFAULT_CURVE_A, DEFAULT_CURVE_B, DEFAULT_CURVE_ORDER, DEFAULT_CURVE_P, TEST_RSA_PRIME_BITS};
use crate::curve::{random_nonzero_below, EllipticCurve, Point};
use crate::elgamal::{self, Ciphertext};
use crate::error::VotingError;
use crate::proof::{self, Proof};
use crate::rsa::{RsaKeyPair, RsaPublicKey};
use crate::tally;

/// The server's public parameters, handed to every voter. Field names
/// follow the spec's required dictionary exactly: `p`, `q`, `order`,
/// `elliptic_curve`, `m`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicParameters {
    pub elliptic_curve: EllipticCurve,
    pub p: Point,
    pub q: Point,
    pub order: BigUint,
    pub m: Vec<Point>,
}

impl PublicParameters {
    pub fn num_candidates(&self) -> usize {
        self.m.len()
    }
}

// `EllipticCurve` doesn't derive (De)serialize itself (its fields are
// reconstructed from the curve equation, not round-tripped independently),
// so give it a minimal canonical encoding as `(a, b, p)`.
impl Serialize for EllipticCurve {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeTuple;
        let mut tup = serializer.serialize_tuple(3)?;
        tup.serialize_element(self.a())?;
        tup.serialize_element(self.b())?;
        tup.serialize_element(self.p())?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for EllipticCurve {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (a, b, p): (BigUint, BigUint, BigUint) = Deserialize::deserialize(deserializer)?;
        EllipticCurve::new(a, b, p).map_err(serde::de::Error::custom)
    }
}

/// A ballot as submitted by a voter: the ciphertext, the RSA signature over
/// each of its coordinates, the signer's public key, and the one-of-many
/// proof.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ballot {
    pub ciphertext: Ciphertext,
    /// `(S_A, S_B)`: each a [`Point`]-shaped container whose `(x, y)` are
    /// the RSA signatures of the corresponding ciphertext coordinate — not
    /// a curve point, just reusing the pair shape (matching the reference).
    pub signature: (Point, Point),
    pub rsa_public_key: RsaPublicKey,
    pub proof: Proof,
}

/// The server's full audit trail, mirroring the reference's `election_data`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElectionRecord {
    pub voter_public_keys: Vec<RsaPublicKey>,
    pub votes: Vec<Ciphertext>,
    pub signatures: Vec<(Point, Point)>,
    pub proofs: Vec<Proof>,
    pub aggregate: Option<Ciphertext>,
    pub decrypted: Option<Point>,
    pub result: Option<Vec<u64>>,
}

/// `VotingServer`'s lifecycle: `cast_vote` is only valid in `Accepting`;
/// `open_vote` transitions `Accepting -> Opened` and is idempotent there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerState {
    Setup,
    Accepting,
    Opened,
}

/// A ballot-casting voter holding an RSA key pair.
pub struct Voter {
    keypair: RsaKeyPair,
}

impl Voter {
    /// Generates a voter with a fresh RSA key pair at the crate's
    /// test/demo prime size; see [`Self::with_rsa_bits`] for production
    /// sizing.
    pub fn new<R: RngCore>(rng: &mut R) -> Self {
        Self::with_rsa_bits(TEST_RSA_PRIME_BITS, rng)
    }

    pub fn with_rsa_bits<R: RngCore>(bits: usize, rng: &mut R) -> Self {
        Voter {
            keypair: RsaKeyPair::generate(bits, rng),
        }
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.keypair.public_key()
    }

    fn sign(&self, m: &BigUint) -> BigUint {
        self.keypair.sign(m)
    }

    /// Casts a vote for `candidate`: encrypts it under the server's public
    /// key, signs the ciphertext coordinates, and attaches a one-of-many
    /// proof that the ciphertext encrypts some candidate's message.
    pub fn vote<R: RngCore>(
        &self,
        candidate: usize,
        server_public_key: &PublicParameters,
        rng: &mut R,
    ) -> Result<Ballot, VotingError> {
        if candidate >= server_public_key.num_candidates() {
            return Err(VotingError::InvalidCandidate {
                index: candidate,
                num_candidates: server_public_key.num_candidates(),
            });
        }

        let r = random_nonzero_below(rng, &server_public_key.order);
        let ciphertext = elgamal::encrypt_with_randomness(
            &server_public_key.elliptic_curve,
            &server_public_key.p,
            &server_public_key.q,
            &server_public_key.m[candidate],
            &r,
        );

        let (ax, ay) = ciphertext.a.xy();
        let (bx, by) = ciphertext.b.xy();
        let signature = (
            Point::affine(self.sign(ax), self.sign(ay)),
            Point::affine(self.sign(bx), self.sign(by)),
        );

        let proof = proof::prove(
            &server_public_key.elliptic_curve,
            &server_public_key.p,
            &server_public_key.q,
            &server_public_key.m,
            &server_public_key.order,
            &ciphertext,
            candidate,
            &r,
            rng,
        );

        Ok(Ballot {
            ciphertext,
            signature,
            rsa_public_key: self.public_key(),
            proof,
        })
    }
}

/// The tallying authority: accepts ballots, then opens the election.
pub struct VotingServer {
    curve: EllipticCurve,
    p: Point,
    q: Point,
    order: BigUint,
    m: Vec<Point>,
    d: BigUint,
    max_voters: u64,
    state: ServerState,
    accepted: Vec<Ciphertext>,
    record: ElectionRecord,
}

impl VotingServer {
    /// Sets up a server for `number_of_candidates` candidates and at most
    /// `maximum_number_of_voters` ballots, using the default curve
    /// parameters (§6) and a system RNG.
    pub fn new(number_of_candidates: usize, maximum_number_of_voters: u64) -> Self {
        Self::new_with_rng(number_of_candidates, maximum_number_of_voters, &mut OsRng)
    }

    /// As [`Self::new`], but with an explicit RNG (useful for deterministic
    /// tests).
    pub fn new_with_rng<R: RngCore>(
        number_of_candidates: usize,
        maximum_number_of_voters: u64,
        rng: &mut R,
    ) -> Self {
        let _setup = ServerState::Setup;

        let curve = EllipticCurve::new(
            DEFAULT_CURVE_A.clone(),
            DEFAULT_CURVE_B.clone(),
            DEFAULT_CURVE_P.clone(),
        )
        .expect("default curve parameters are valid");
        let order = DEFAULT_CURVE_ORDER.clone();

        let p = curve.random_point(rng);
        let d = random_nonzero_below(rng, &order);
        let q = curve.scalar_mul(&d, &p);
        let m = tally::candidate_points(&curve, &p, &order, number_of_candidates, maximum_number_of_voters);

        info!(
            number_of_candidates,
            maximum_number_of_voters, "voting server set up"
        );

        VotingServer {
            curve,
            p,
            q,
            order,
            m,
            d,
            max_voters: maximum_number_of_voters,
            state: ServerState::Accepting,
            accepted: Vec::new(),
            record: ElectionRecord::default(),
        }
    }

    pub fn public_key(&self) -> PublicParameters {
        PublicParameters {
            elliptic_curve: self.curve.clone(),
            p: self.p.clone(),
            q: self.q.clone(),
            order: self.order.clone(),
            m: self.m.clone(),
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn number_of_voters(&self) -> u64 {
        self.accepted.len() as u64
    }

    /// The capacity this server was configured with (`B - 1` in the
    /// candidate encoding); `open_vote` is only guaranteed to recover a
    /// correct tally when the number of accepted ballots stays within it.
    pub fn maximum_voters(&self) -> u64 {
        self.max_voters
    }

    /// Verifies `ballot`'s RSA signatures and one-of-many proof; on success,
    /// appends its ciphertext and records the audit entry. A verification
    /// failure is rejected *silently* (the reference's behavior) but logged
    /// at `debug` for operability. Calling this outside `Accepting` is a
    /// protocol misuse and returns an error.
    pub fn cast_vote(&mut self, ballot: Ballot) -> Result<(), VotingError> {
        if self.state != ServerState::Accepting {
            return Err(VotingError::InvalidServerState { current: self.state });
        }

        let sig_ok = self.verify_signature(&ballot);
        let proof_ok = proof::verify(
            &self.curve,
            &self.p,
            &self.q,
            &self.m,
            &ballot.ciphertext,
            &ballot.proof,
        );

        if sig_ok && proof_ok {
            self.accepted.push(ballot.ciphertext.clone());
            self.record.voter_public_keys.push(ballot.rsa_public_key.clone());
            self.record.votes.push(ballot.ciphertext.clone());
            self.record.signatures.push(ballot.signature.clone());
            self.record.proofs.push(ballot.proof.clone());
            info!(accepted = self.accepted.len(), "ballot accepted");
        } else {
            debug!(sig_ok, proof_ok, "ballot rejected");
        }

        Ok(())
    }

    fn verify_signature(&self, ballot: &Ballot) -> bool {
        let (ax, ay) = ballot.ciphertext.a.xy();
        let (bx, by) = ballot.ciphertext.b.xy();
        let (sax, say) = ballot.signature.0.xy();
        let (sbx, sby) = ballot.signature.1.xy();
        ballot.rsa_public_key.verify(ax, sax)
            && ballot.rsa_public_key.verify(ay, say)
            && ballot.rsa_public_key.verify(bx, sbx)
            && ballot.rsa_public_key.verify(by, sby)
    }

    /// Aggregates all accepted ciphertexts, decrypts the sum, and recovers
    /// the per-candidate tally. Idempotent: calling this again after the
    /// server has moved to `Opened` just returns the cached result.
    pub fn open_vote(&mut self) -> Result<Vec<u64>, VotingError> {
        if let (ServerState::Opened, Some(result)) = (self.state, &self.record.result) {
            return Ok(result.clone());
        }

        let aggregate = elgamal::sum_ciphertexts(&self.curve, self.accepted.iter());
        let decrypted = elgamal::decrypt(&self.curve, &self.d, &aggregate);
        let n = self.number_of_voters();

        let result = tally::recover_tally(&self.curve, &self.m, &decrypted, n)?;

        self.record.aggregate = Some(aggregate);
        self.record.decrypted = Some(decrypted);
        self.record.result = Some(result.clone());
        self.state = ServerState::Opened;

        info!(number_of_voters = n, ?result, "vote opened");
        Ok(result)
    }

    pub fn public_result(&self) -> &ElectionRecord {
        &self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn s2_encrypt_decrypt_round_trips_through_vote() {
        let mut rng = thread_rng();
        let server = VotingServer::new_with_rng(4, 50, &mut rng);
        let pubkey = server.public_key();
        let voter = Voter::new(&mut rng);
        let ballot = voter.vote(2, &pubkey, &mut rng).unwrap();
        assert!(proof::verify(
            &pubkey.elliptic_curve,
            &pubkey.p,
            &pubkey.q,
            &pubkey.m,
            &ballot.ciphertext,
            &ballot.proof
        ));
    }

    #[test]
    fn s3_tiny_election_recovers_exact_tally() {
        let mut rng = thread_rng();
        let mut server = VotingServer::new_with_rng(4, 5, &mut rng);
        let pubkey = server.public_key();
        let voter = Voter::new(&mut rng);
        for candidate in [0usize, 0, 1, 3, 3] {
            let ballot = voter.vote(candidate, &pubkey, &mut rng).unwrap();
            server.cast_vote(ballot).unwrap();
        }
        let result = server.open_vote().unwrap();
        assert_eq!(result, vec![2, 1, 0, 2]);
    }

    #[test]
    fn s4_tampered_proof_is_rejected_and_not_counted() {
        let mut rng = thread_rng();
        let mut server = VotingServer::new_with_rng(3, 10, &mut rng);
        let pubkey = server.public_key();
        let voter = Voter::new(&mut rng);
        let mut ballot = voter.vote(1, &pubkey, &mut rng).unwrap();
        ballot.proof.u[0] += num_bigint::BigInt::from(1);

        server.cast_vote(ballot).unwrap();
        assert_eq!(server.number_of_voters(), 0);
    }

    #[test]
    fn invalid_candidate_index_is_rejected_before_encryption() {
        let mut rng = thread_rng();
        let server = VotingServer::new_with_rng(3, 10, &mut rng);
        let pubkey = server.public_key();
        let voter = Voter::new(&mut rng);
        assert!(voter.vote(3, &pubkey, &mut rng).is_err());
    }

    #[test]
    fn cast_vote_after_opening_is_rejected() {
        let mut rng = thread_rng();
        let mut server = VotingServer::new_with_rng(2, 5, &mut rng);
        let pubkey = server.public_key();
        server.open_vote().unwrap();

        let voter = Voter::new(&mut rng);
        let ballot = voter.vote(0, &pubkey, &mut rng).unwrap();
        assert!(server.cast_vote(ballot).is_err());
    }

    #[test]
    fn open_vote_is_idempotent() {
        let mut rng = thread_rng();
        let mut server = VotingServer::new_with_rng(2, 5, &mut rng);
        let pubkey = server.public_key();
        let voter = Voter::new(&mut rng);
        for _ in 0..3 {
            let ballot = voter.vote(1, &pubkey, &mut rng).unwrap();
            server.cast_vote(ballot).unwrap();
        }
        let first = server.open_vote().unwrap();
        let second = server.open_vote().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn s5_end_to_end_random_election_matches_ground_truth() {
        let mut rng = thread_rng();
        let num_candidates = 4;
        let num_voters = 30u64;
        let mut server = VotingServer::new_with_rng(num_candidates, num_voters, &mut rng);
        let pubkey = server.public_key();
        let voter = Voter::new(&mut rng);

        let mut ground_truth = vec![0u64; num_candidates];
        for _ in 0..num_voters {
            let candidate = (rng.next_u32() as usize) % num_candidates;
            ground_truth[candidate] += 1;
            let ballot = voter.vote(candidate, &pubkey, &mut rng).unwrap();
            server.cast_vote(ballot).unwrap();
        }

        let result = server.open_vote().unwrap();
        assert_eq!(result, ground_truth);
    }

    #[test]
    fn s6_boundary_all_votes_for_one_candidate() {
        let mut rng = thread_rng();
        let mut server = VotingServer::new_with_rng(2, 3, &mut rng);
        let pubkey = server.public_key();
        let voter = Voter::new(&mut rng);
        for _ in 0..3 {
            let ballot = voter.vote(1, &pubkey, &mut rng).unwrap();
            server.cast_vote(ballot).unwrap();
        }
        assert_eq!(server.open_vote().unwrap(), vec![0, 3]);
    }
}
