//! Candidate encoding and meet-in-the-middle tally recovery.
//!
//! The encoding packs all `k` candidate counts into a single curve point by
//! choosing `M_i = B^i * P` with `B = maxVoters + 1`, so that the decrypted
//! aggregate is `(Σ t_i B^i) * P` — the base-`B` digits of that exponent are
//! exactly the per-candidate tally. Reading the digits back out without the
//! discrete log is the job of [`recover_tally`].

use std::collections::HashMap;

use num_bigint::BigUint;
use num_traits::Zero;

use crate::curve::{EllipticCurve, Point};
use crate::error::VotingError;

/// Computes `M = [M_0, ..., M_{k-1}]` with `M_i = (B^i mod order) * P` and
/// `B = max_voters + 1`.
pub fn candidate_points(
    curve: &EllipticCurve,
    p: &Point,
    order: &BigUint,
    num_candidates: usize,
    max_voters: u64,
) -> Vec<Point> {
    let base = BigUint::from(max_voters + 1);
    (0..num_candidates)
        .map(|i| {
            let exponent = base.modpow(&BigUint::from(i as u64), order);
            curve.scalar_mul(&exponent, p)
        })
        .collect()
}

/// Enumerates every length-`len` tuple of nonnegative integers whose sum is
/// at most `budget`, in the same "which index eats how much of the budget"
/// order as the reference's `generate_tuple`.
fn compositions_at_most(budget: u64, len: usize) -> Vec<Vec<u64>> {
    if len == 0 {
        return vec![vec![]];
    }
    let mut out = Vec::new();
    for first in 0..=budget {
        for mut rest in compositions_at_most(budget - first, len - 1) {
            let mut tuple = Vec::with_capacity(len);
            tuple.push(first);
            tuple.append(&mut rest);
            out.push(tuple);
        }
    }
    out
}

/// Precomputes `{0*M_i, 1*M_i, ..., n*M_i}` for every column, so that
/// building a candidate partial sum is a table lookup plus `O(k)` additions
/// rather than `O(k)` scalar multiplications.
fn multiples_table(curve: &EllipticCurve, m: &[Point], n: u64) -> Vec<Vec<Point>> {
    m.iter()
        .map(|m_i| {
            let mut column = Vec::with_capacity(n as usize + 1);
            column.push(Point::infinity());
            for t in 1..=n {
                let prev = column[t as usize - 1].clone();
                column.push(curve.add(&prev, m_i));
            }
            column
        })
        .collect()
}

/// Recovers `(t_0, ..., t_{k-1})` with `Σ t_i = number_of_voters` from the
/// decrypted aggregate `S = Σ t_i * M_i`, via meet-in-the-middle.
///
/// Returns [`VotingError::TallyNotRecoverable`] if no composition of
/// `number_of_voters` into `len(m)` parts sums (under the encoding) to
/// `aggregate` — this indicates the aggregate doesn't encode a valid tally.
pub fn recover_tally(
    curve: &EllipticCurve,
    m: &[Point],
    aggregate: &Point,
    number_of_voters: u64,
) -> Result<Vec<u64>, VotingError> {
    let mid = m.len() / 2;
    let left_cols = multiples_table(curve, &m[..mid], number_of_voters);
    let right_cols = multiples_table(curve, &m[mid..], number_of_voters);

    let mut table: Vec<HashMap<Point, Vec<u64>>> =
        (0..=number_of_voters).map(|_| HashMap::new()).collect();

    for tuple in compositions_at_most(number_of_voters, mid) {
        let sum: u64 = tuple.iter().sum();
        let point = tuple
            .iter()
            .enumerate()
            .fold(Point::infinity(), |acc, (i, &t)| {
                curve.add(&acc, &left_cols[i][t as usize])
            });
        table[sum as usize].entry(point).or_insert(tuple);
    }

    for tuple in compositions_at_most(number_of_voters, m.len() - mid) {
        let sum: u64 = tuple.iter().sum();
        let point = tuple
            .iter()
            .enumerate()
            .fold(Point::infinity(), |acc, (i, &t)| {
                curve.add(&acc, &right_cols[i][t as usize])
            });
        let target = curve.sub(aggregate, &point);
        if let Some(left) = table[(number_of_voters - sum) as usize].get(&target) {
            let mut result = left.clone();
            result.extend(tuple);
            return Ok(result);
        }
    }

    Err(VotingError::TallyNotRecoverable { number_of_voters })
}

/// Computes `Σ t_i * M_i` directly; used by tests to construct a known-good
/// aggregate point for a chosen tally without going through encryption.
pub fn encode_tally(curve: &EllipticCurve, m: &[Point], tally: &[u64]) -> Point {
    assert_eq!(tally.len(), m.len());
    tally
        .iter()
        .zip(m.iter())
        .fold(Point::infinity(), |acc, (&t, m_i)| {
            if t.is_zero() {
                acc
            } else {
                curve.add(&acc, &curve.scalar_mul(&BigUint::from(t), m_i))
            }
        })
}
