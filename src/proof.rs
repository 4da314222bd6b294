//! One-of-many zero-knowledge proof: "this ciphertext encrypts one of the
//! `k` public candidate messages", proved without revealing which one.
//!
//! This is a disjunctive Σ-protocol (the true branch answered honestly, the
//! rest simulated) made non-interactive via Fiat–Shamir. The Fiat–Shamir
//! "hash" and the non-reduction of the Schnorr responses below are
//! deliberately unusual — see the spec's §9 open questions — but are
//! reproduced bit-for-bit since interoperability depends on it.

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::curve::{random_nonzero_below, EllipticCurve, Point};
use crate::elgamal::Ciphertext;

/// A one-of-many proof: parallel vectors of length `k`, one slot per
/// candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proof {
    pub a: Vec<Point>,
    pub b: Vec<Point>,
    pub u: Vec<BigInt>,
    pub w: Vec<BigInt>,
}

/// The reference's Fiat–Shamir challenge: `Σ_j pts[j].x ^ pts[j].y (mod p)`.
///
/// Each term is reduced mod `p` (since it's computed with `modpow`), but the
/// *sum* is not reduced again — it is a plain, unbounded sum of `k`
/// already-reduced terms, matching the reference's `sum(pow(x, y, p) ...)`,
/// which never re-reduces the total. This is why [`Proof::u`]/[`Proof::w`]
/// and the challenge itself need arbitrary-precision (not field) integers.
pub fn challenge(curve: &EllipticCurve, points: &[Point]) -> BigUint {
    let p = curve.p();
    points
        .iter()
        .map(|pt| {
            let (x, y) = canonical_xy(pt);
            x.modpow(&y, p)
        })
        .fold(BigUint::zero(), |acc, term| acc + term)
}

/// `(x, y)` for a point, using `(0, 0)` for the point at infinity (matching
/// the reference's in-memory representation of the origin).
fn canonical_xy(pt: &Point) -> (BigUint, BigUint) {
    if pt.is_infinity() {
        (BigUint::zero(), BigUint::zero())
    } else {
        let (x, y) = pt.xy();
        (x.clone(), y.clone())
    }
}

/// Proves that `ciphertext` encrypts `m[candidate]`, given the randomness
/// `r` used to produce it.
#[allow(clippy::too_many_arguments)]
pub fn prove<R: RngCore>(
    curve: &EllipticCurve,
    p: &Point,
    q: &Point,
    m: &[Point],
    order: &BigUint,
    ciphertext: &Ciphertext,
    candidate: usize,
    r: &BigUint,
    rng: &mut R,
) -> Proof {
    let k = m.len();
    let s = random_nonzero_below(rng, order);
    let mut w: Vec<BigInt> = (0..k)
        .map(|_| BigInt::from(random_nonzero_below(rng, order)))
        .collect();
    let mut u: Vec<BigInt> = (0..k)
        .map(|_| BigInt::from(random_nonzero_below(rng, order)))
        .collect();

    let mut a = Vec::with_capacity(k);
    let mut b = Vec::with_capacity(k);
    for i in 0..k {
        if i == candidate {
            a.push(curve.scalar_mul(&s, p));
            b.push(curve.scalar_mul(&s, q));
        } else {
            a.push(curve.add(
                &curve.multiply(&w[i], p),
                &curve.multiply(&u[i], &ciphertext.a),
            ));
            b.push(curve.add(
                &curve.multiply(&w[i], q),
                &curve.multiply(&u[i], &curve.sub(&ciphertext.b, &m[i])),
            ));
        }
    }

    let chall = BigInt::from(challenge(curve, &a.iter().chain(b.iter()).cloned().collect::<Vec<_>>()));
    let sum_u_others: BigInt = u
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != candidate)
        .map(|(_, ui)| ui.clone())
        .sum();
    u[candidate] = &chall - &sum_u_others;
    w[candidate] = BigInt::from(s) - &u[candidate] * BigInt::from(r.clone());

    Proof { a, b, u, w }
}

/// Verifies a one-of-many proof against public parameters and a ciphertext.
pub fn verify(
    curve: &EllipticCurve,
    p: &Point,
    q: &Point,
    m: &[Point],
    ciphertext: &Ciphertext,
    proof: &Proof,
) -> bool {
    let k = m.len();
    if proof.a.len() != k || proof.b.len() != k || proof.u.len() != k || proof.w.len() != k {
        return false;
    }

    for (i, m_i) in m.iter().enumerate() {
        let expected_a = curve.add(
            &curve.multiply(&proof.w[i], p),
            &curve.multiply(&proof.u[i], &ciphertext.a),
        );
        if expected_a != proof.a[i] {
            return false;
        }
        let expected_b = curve.add(
            &curve.multiply(&proof.w[i], q),
            &curve.multiply(&proof.u[i], &curve.sub(&ciphertext.b, m_i)),
        );
        if expected_b != proof.b[i] {
            return false;
        }
    }

    let points: Vec<Point> = proof.a.iter().chain(proof.b.iter()).cloned().collect();
    let chall = BigInt::from(challenge(curve, &points));
    let sum_u: BigInt = proof.u.iter().cloned().sum();
    chall == sum_u
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elgamal::encrypt_with_randomness;
    use rand::thread_rng;

    struct Setup {
        ec: EllipticCurve,
        p: Point,
        q: Point,
        m: Vec<Point>,
        order: BigUint,
        d: BigUint,
    }

    fn setup(num_candidates: usize) -> Setup {
        let ec = EllipticCurve::new(497u32.into(), 1768u32.into(), 9739u32.into()).unwrap();
        let mut rng = thread_rng();
        let order = BigUint::from(9739u32);
        let p = ec.random_point(&mut rng);
        let d = random_nonzero_below(&mut rng, &order);
        let q = ec.scalar_mul(&d, &p);
        let m: Vec<Point> = (0..num_candidates).map(|_| ec.random_point(&mut rng)).collect();
        Setup { ec, p, q, m, order, d }
    }

    #[test]
    fn honest_proof_verifies() {
        let s = setup(4);
        let mut rng = thread_rng();
        let r = random_nonzero_below(&mut rng, &s.order);
        let ct = encrypt_with_randomness(&s.ec, &s.p, &s.q, &s.m[2], &r);
        let proof = prove(&s.ec, &s.p, &s.q, &s.m, &s.order, &ct, 2, &r, &mut rng);
        assert!(verify(&s.ec, &s.p, &s.q, &s.m, &ct, &proof));
        let _ = s.d;
    }

    #[test]
    fn s4_corrupting_u0_breaks_verification() {
        let s = setup(4);
        let mut rng = thread_rng();
        let r = random_nonzero_below(&mut rng, &s.order);
        let ct = encrypt_with_randomness(&s.ec, &s.p, &s.q, &s.m[1], &r);
        let mut proof = prove(&s.ec, &s.p, &s.q, &s.m, &s.order, &ct, 1, &r, &mut rng);
        proof.u[0] += BigInt::from(1);
        assert!(!verify(&s.ec, &s.p, &s.q, &s.m, &ct, &proof));
    }

    #[test]
    fn corrupting_any_single_field_breaks_verification() {
        let s = setup(3);
        let mut rng = thread_rng();
        let r = random_nonzero_below(&mut rng, &s.order);
        let ct = encrypt_with_randomness(&s.ec, &s.p, &s.q, &s.m[0], &r);

        let base = prove(&s.ec, &s.p, &s.q, &s.m, &s.order, &ct, 0, &r, &mut rng);
        assert!(verify(&s.ec, &s.p, &s.q, &s.m, &ct, &base));

        let mut corrupt_w = base.clone();
        corrupt_w.w[1] += BigInt::from(1);
        assert!(!verify(&s.ec, &s.p, &s.q, &s.m, &ct, &corrupt_w));

        let mut corrupt_ct = ct.clone();
        corrupt_ct.a = s.ec.add(&corrupt_ct.a, &s.p);
        assert!(!verify(&s.ec, &s.p, &s.q, &s.m, &corrupt_ct, &base));
    }
}
