//! Minimal RSA key generation and textbook (unpadded) sign/verify.
//!
//! RSA key generation is explicitly out of scope of the protocol spec — it
//! treats it as an oracle returning `(n, e, d)` — but the oracle needs a
//! runnable backing implementation for this crate to be end-to-end testable.
//! This is deliberately not a hardened RSA implementation: no padding, and a
//! fixed, small Miller–Rabin iteration count. See the spec's §4.6/§9 notes.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::constants::RSA_PUBLIC_EXPONENT;
use crate::field::mod_inverse;

/// An RSA key pair; `d` is kept private by the owner, `(n, e)` is public.
#[derive(Debug, Clone)]
pub struct RsaKeyPair {
    pub n: BigUint,
    pub e: BigUint,
    d: BigUint,
}

/// The public half of an [`RsaKeyPair`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaPublicKey {
    pub n: BigUint,
    pub e: BigUint,
}

impl RsaKeyPair {
    /// Generates a fresh key pair with two `bits`-bit primes, retrying the
    /// prime pair whenever `gcd(e, phi) != 1`, matching the reference.
    pub fn generate<R: RngCore>(bits: usize, rng: &mut R) -> Self {
        let e = BigUint::from(RSA_PUBLIC_EXPONENT);
        loop {
            let p = random_prime(bits, rng);
            let q = random_prime(bits, rng);
            let n = &p * &q;
            let phi = (&p - BigUint::one()) * (&q - BigUint::one());
            if (&phi % &e).is_zero() {
                continue;
            }
            let d = mod_inverse(&e, &phi);
            return RsaKeyPair { n, e, d };
        }
    }

    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey {
            n: self.n.clone(),
            e: self.e.clone(),
        }
    }

    /// Textbook RSA signing: `m^d mod n`. `m` must be `< n`.
    pub fn sign(&self, m: &BigUint) -> BigUint {
        assert!(m < &self.n, "message must be reduced mod n before signing");
        m.modpow(&self.d, &self.n)
    }
}

impl RsaPublicKey {
    /// Textbook RSA verification: checks `signature^e mod n == message`.
    pub fn verify(&self, message: &BigUint, signature: &BigUint) -> bool {
        signature.modpow(&self.e, &self.n) == *message
    }
}

/// Generates a random probable prime of exactly `bits` bits (top and bottom
/// bit set, so the product of two such primes has the expected bit length
/// and is always odd).
fn random_prime<R: RngCore>(bits: usize, rng: &mut R) -> BigUint {
    loop {
        let mut candidate = rng.gen_biguint(bits as u64);
        candidate.set_bit(0, true);
        candidate.set_bit(bits as u64 - 1, true);
        if is_probably_prime(&candidate, rng) {
            return candidate;
        }
    }
}

/// Miller–Rabin primality test, 40 rounds (overkill for a toy oracle, cheap
/// enough not to matter).
fn is_probably_prime<R: RngCore>(n: &BigUint, rng: &mut R) -> bool {
    const ROUNDS: u32 = 40;

    if *n < BigUint::from(4u8) {
        return *n == BigUint::from(2u8) || *n == BigUint::from(3u8);
    }
    if n.is_even() {
        return false;
    }

    let one = BigUint::one();
    let n_minus_one = n - &one;
    let mut d = n_minus_one.clone();
    let mut r = 0u32;
    while d.is_even() {
        d /= 2u8;
        r += 1;
    }

    'witness: for _ in 0..ROUNDS {
        let a = rng.gen_biguint_range(&BigUint::from(2u8), &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 0..r - 1 {
            x = x.modpow(&BigUint::from(2u8), n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn s10_sign_verify_round_trips_for_small_messages() {
        let mut rng = thread_rng();
        let key = RsaKeyPair::generate(64, &mut rng);
        let public = key.public_key();

        for m in [0u32, 1, 42, 12345] {
            let m = BigUint::from(m);
            if m >= key.n {
                continue;
            }
            let sig = key.sign(&m);
            assert!(public.verify(&m, &sig));
        }
    }

    #[test]
    fn tampered_signature_fails_verification() {
        let mut rng = thread_rng();
        let key = RsaKeyPair::generate(64, &mut rng);
        let public = key.public_key();
        let m = BigUint::from(777u32);
        let mut sig = key.sign(&m);
        sig += BigUint::one();
        assert!(!public.verify(&m, &sig));
    }

    #[test]
    fn small_known_primes_pass_and_composites_fail() {
        let mut rng = thread_rng();
        for p in [2u32, 3, 5, 7, 11, 101, 7919] {
            assert!(is_probably_prime(&BigUint::from(p), &mut rng));
        }
        for c in [4u32, 6, 9, 100, 7921] {
            assert!(!is_probably_prime(&BigUint::from(c), &mut rng));
        }
    }
}
