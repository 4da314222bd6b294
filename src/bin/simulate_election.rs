//! Simulates an election end to end: sets up a server, casts `voters`
//! ballots for uniformly random candidates, opens the vote, and prints the
//! recovered tally alongside the timing of each phase. Mirrors the
//! reference implementation's own demo driver.

use std::time::Instant;

use clap::Parser;
use evote_core::{ServerState, Voter, VotingServer};
use rand::Rng;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Simulate an end-to-end verifiable election")]
struct Args {
    /// Number of candidates on the ballot.
    #[arg(short, long, default_value_t = 4)]
    candidates: usize,

    /// Number of voters to simulate.
    #[arg(short, long, default_value_t = 200)]
    voters: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut rng = rand::thread_rng();

    let setup_start = Instant::now();
    let mut server = VotingServer::new_with_rng(args.candidates, args.voters, &mut rng);
    let public_key = server.public_key();
    println!("setup: {:?} ({} candidates, up to {} voters)", setup_start.elapsed(), args.candidates, args.voters);

    let mut ground_truth = vec![0u64; args.candidates];
    let voting_start = Instant::now();
    for _ in 0..args.voters {
        let candidate = rng.gen_range(0..args.candidates);
        ground_truth[candidate] += 1;

        let voter = Voter::new(&mut rng);
        let ballot = voter
            .vote(candidate, &public_key, &mut rng)
            .expect("candidate index is always in range here");
        server.cast_vote(ballot).expect("server accepts votes while in Accepting state");
    }
    println!("voting: {:?} ({} ballots cast)", voting_start.elapsed(), server.number_of_voters());
    assert_eq!(server.state(), ServerState::Accepting);

    let opening_start = Instant::now();
    let result = server.open_vote().expect("honest ballots always recover the true tally");
    println!("opening: {:?}", opening_start.elapsed());

    println!("result:       {result:?}");
    println!("ground truth: {ground_truth:?}");
    assert_eq!(result, ground_truth, "recovered tally must match what was actually cast");
}
