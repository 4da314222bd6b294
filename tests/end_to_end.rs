//! Integration tests exercising the full voter-to-server flow through the
//! public API only (no access to module internals).

use evote_core::{ServerState, Voter, VotingServer};
use rand::{thread_rng, Rng};

#[test]
fn full_election_with_mixed_honest_and_malformed_ballots() {
    let mut rng = thread_rng();
    let mut server = VotingServer::new_with_rng(4, 20, &mut rng);
    let public_key = server.public_key();

    let honest_voter = Voter::new(&mut rng);
    let mut ground_truth = vec![0u64; 4];
    for candidate in [0usize, 1, 1, 2, 3, 3, 3] {
        ground_truth[candidate] += 1;
        let ballot = honest_voter.vote(candidate, &public_key, &mut rng).unwrap();
        server.cast_vote(ballot).unwrap();
    }

    // A ballot with a tampered proof must be rejected without affecting the tally.
    let mut forged = honest_voter.vote(0, &public_key, &mut rng).unwrap();
    forged.proof.w[0] += num_bigint::BigInt::from(1);
    server.cast_vote(forged).unwrap();

    assert_eq!(server.number_of_voters(), 7);
    assert_eq!(server.state(), ServerState::Accepting);

    let result = server.open_vote().unwrap();
    assert_eq!(result, ground_truth);
    assert_eq!(server.state(), ServerState::Opened);

    let record = server.public_result();
    assert_eq!(record.votes.len(), 7);
    assert_eq!(record.result.as_deref(), Some(ground_truth.as_slice()));
}

#[test]
fn forged_rsa_signature_is_rejected_silently() {
    let mut rng = thread_rng();
    let mut server = VotingServer::new_with_rng(3, 10, &mut rng);
    let public_key = server.public_key();

    let voter = Voter::new(&mut rng);
    let mut ballot = voter.vote(1, &public_key, &mut rng).unwrap();
    let (sig_x, sig_y) = ballot.signature.0.xy();
    ballot.signature.0 = evote_core::Point::affine(sig_x.clone() + 1u32, sig_y.clone());

    server.cast_vote(ballot).unwrap();
    assert_eq!(server.number_of_voters(), 0);
}

#[test]
fn wrong_candidate_index_never_reaches_the_server() {
    let mut rng = thread_rng();
    let server = VotingServer::new_with_rng(2, 5, &mut rng);
    let public_key = server.public_key();
    let voter = Voter::new(&mut rng);

    assert!(voter.vote(5, &public_key, &mut rng).is_err());
}

#[test]
fn public_parameters_round_trip_through_json() {
    let mut rng = thread_rng();
    let server = VotingServer::new_with_rng(3, 8, &mut rng);
    let public_key = server.public_key();

    let json = serde_json::to_string(&public_key).unwrap();
    let decoded: evote_core::protocol::PublicParameters = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded.m.len(), public_key.m.len());
    assert_eq!(decoded.order, public_key.order);
}

#[test]
fn s5_larger_random_election_matches_ground_truth() {
    let mut rng = thread_rng();
    let num_candidates = 4;
    let num_voters = 20u64;
    let mut server = VotingServer::new_with_rng(num_candidates, num_voters, &mut rng);
    let public_key = server.public_key();
    let voter = Voter::new(&mut rng);

    let mut ground_truth = vec![0u64; num_candidates];
    for _ in 0..num_voters {
        let candidate = rng.gen_range(0..num_candidates);
        ground_truth[candidate] += 1;
        let ballot = voter.vote(candidate, &public_key, &mut rng).unwrap();
        server.cast_vote(ballot).unwrap();
    }

    assert_eq!(server.open_vote().unwrap(), ground_truth);
}
