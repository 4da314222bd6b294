//! Additively homomorphic ElGamal encryption over [`EllipticCurve`].
//!
//! The plaintext space is restricted to the candidate-encoding points chosen
//! in [`crate::tally`]; nothing here depends on that choice directly, this
//! module only needs "some curve point" as its message.

use num_bigint::BigUint;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::curve::{random_nonzero_below, EllipticCurve, Point};

/// An ElGamal ciphertext `(A', B') = (rP, M + rQ)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ciphertext {
    pub a: Point,
    pub b: Point,
}

/// Encrypts `message` under public key `q = d*p` with freshly sampled
/// randomness `r` in `[1, order - 1]`.
pub fn encrypt<R: RngCore>(
    curve: &EllipticCurve,
    p: &Point,
    q: &Point,
    order: &BigUint,
    message: &Point,
    rng: &mut R,
) -> Ciphertext {
    let r = random_nonzero_below(rng, order);
    encrypt_with_randomness(curve, p, q, message, &r)
}

/// Encrypts with caller-supplied randomness; exposed separately so the
/// one-of-many proof (which must reuse the same `r`) doesn't need to sample
/// twice.
pub fn encrypt_with_randomness(
    curve: &EllipticCurve,
    p: &Point,
    q: &Point,
    message: &Point,
    r: &BigUint,
) -> Ciphertext {
    let a = curve.scalar_mul(r, p);
    let b = curve.add(message, &curve.scalar_mul(r, q));
    Ciphertext { a, b }
}

/// Componentwise sum of a batch of ciphertexts, exploiting the homomorphism
/// `Σ(A_j, B_j) = (ΣA_j, ΣB_j)`.
pub fn sum_ciphertexts<'a>(
    curve: &EllipticCurve,
    ciphertexts: impl IntoIterator<Item = &'a Ciphertext>,
) -> Ciphertext {
    let mut sum_a = Point::infinity();
    let mut sum_b = Point::infinity();
    for c in ciphertexts {
        sum_a = curve.add(&sum_a, &c.a);
        sum_b = curve.add(&sum_b, &c.b);
    }
    Ciphertext { a: sum_a, b: sum_b }
}

/// Decrypts `(A, B)` under secret key `d`, returning `B - d*A`.
pub fn decrypt(curve: &EllipticCurve, d: &BigUint, ciphertext: &Ciphertext) -> Point {
    curve.sub(&ciphertext.b, &curve.scalar_mul(d, &ciphertext.a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    fn small_curve() -> EllipticCurve {
        EllipticCurve::new(497u32.into(), 1768u32.into(), 9739u32.into()).unwrap()
    }

    #[test]
    fn encrypt_decrypt_round_trips() {
        let ec = small_curve();
        let mut rng = thread_rng();
        let order = BigUint::from(9739u32); // not the true order, but fine for a smoke test
        let p = ec.random_point(&mut rng);
        let d = random_nonzero_below(&mut rng, &order);
        let q = ec.scalar_mul(&d, &p);

        for _ in 0..10 {
            let message = ec.random_point(&mut rng);
            let ct = encrypt(&ec, &p, &q, &order, &message, &mut rng);
            assert_eq!(decrypt(&ec, &d, &ct), message);
        }
    }

    #[test]
    fn homomorphism_holds_over_a_batch() {
        let ec = small_curve();
        let mut rng = thread_rng();
        let order = BigUint::from(9739u32);
        let p = ec.random_point(&mut rng);
        let d = random_nonzero_below(&mut rng, &order);
        let q = ec.scalar_mul(&d, &p);

        let messages: Vec<Point> = (0..5).map(|_| ec.random_point(&mut rng)).collect();
        let ciphertexts: Vec<Ciphertext> = messages
            .iter()
            .map(|m| encrypt(&ec, &p, &q, &order, m, &mut rng))
            .collect();

        let aggregate = sum_ciphertexts(&ec, &ciphertexts);
        let decrypted = decrypt(&ec, &d, &aggregate);

        let expected = messages
            .iter()
            .fold(Point::infinity(), |acc, m| ec.add(&acc, m));
        assert_eq!(decrypted, expected);
    }
}
