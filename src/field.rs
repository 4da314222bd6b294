//! Modular arithmetic over a prime field: inversion, the Legendre symbol, and
//! Tonelli–Shanks square roots.
//!
//! Every function here assumes `p` is an odd prime; none of them check that,
//! since the curve constructor is the single place that needs to validate it.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

/// Returns `x⁻¹ mod m` via the extended Euclidean algorithm.
///
/// # Panics
///
/// Panics if `x` has no inverse modulo `m` (i.e. `gcd(x, m) != 1`). Per the
/// failure semantics of this crate's arithmetic layer, a non-invertible
/// scalar reaching this function is a programmer bug or malicious input, not
/// a recoverable condition.
pub fn mod_inverse(x: &BigUint, m: &BigUint) -> BigUint {
    let (g, x_inv, _) = extended_gcd(&x.to_owned().into(), &m.to_owned().into());
    assert!(g.is_one(), "mod_inverse: {x} has no inverse mod {m}");

    let m_i = BigInt::from(m.clone());
    let x_inv = ((x_inv % &m_i) + &m_i) % &m_i;
    x_inv.to_biguint().expect("reduced value is non-negative")
}

/// Extended Euclidean algorithm: returns `(g, s, t)` such that `g = gcd(a, b) = s*a + t*b`.
fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let quotient = &old_r / &r;
        let new_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, new_r);
        let new_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, new_s);
        let new_t = &old_t - &quotient * &t;
        old_t = std::mem::replace(&mut t, new_t);
    }

    (old_r, old_s, old_t)
}

/// The Legendre symbol `(a/p)`: `1` if `a` is a nonzero quadratic residue mod
/// `p`, `-1` if it is a non-residue, `0` if `a ≡ 0 (mod p)`.
///
/// Returned as an `i8` rather than a reduced field element since `-1` is not
/// itself meant to be interpreted mod `p`.
pub fn legendre(a: &BigUint, p: &BigUint) -> i8 {
    if a.is_zero() {
        return 0;
    }
    let exp = (p - BigUint::one()) / BigUint::from(2u8);
    let ls = a.modpow(&exp, p);
    if ls == p - BigUint::one() {
        -1
    } else {
        1
    }
}

/// Tonelli–Shanks modular square root: returns some `r` with `r² ≡ a (mod p)`,
/// or `0` if `a` is zero or a non-residue (there is no square root to find
/// other than the degenerate zero case; callers distinguish by separately
/// checking `legendre`).
pub fn sqrt_mod(a: &BigUint, p: &BigUint) -> BigUint {
    if legendre(a, p) != 1 {
        return BigUint::zero();
    }
    if a.is_zero() {
        return BigUint::zero();
    }
    let two = BigUint::from(2u8);
    if p == &two {
        return BigUint::zero();
    }
    if p.mod_floor(&BigUint::from(4u8)) == BigUint::from(3u8) {
        let exp = (p + BigUint::one()) / BigUint::from(4u8);
        return a.modpow(&exp, p);
    }

    // Factor p - 1 = s * 2^e with s odd.
    let mut s = p - BigUint::one();
    let mut e = 0u32;
    while s.is_even() {
        s /= &two;
        e += 1;
    }

    // Find a quadratic non-residue n.
    let mut n = BigUint::from(2u8);
    while legendre(&n, p) != -1 {
        n += BigUint::one();
    }

    let mut x = a.modpow(&((&s + BigUint::one()) / &two), p);
    let mut b = a.modpow(&s, p);
    let mut g = n.modpow(&s, p);
    let mut r = e;

    loop {
        let mut t = b.clone();
        let mut m = 0u32;
        while m < r {
            if t.is_one() {
                break;
            }
            t = t.modpow(&two, p);
            m += 1;
        }

        if m == 0 {
            return x;
        }

        let gs = g.modpow(&BigUint::from(2u32).pow(r - m - 1), p);
        g = (&gs * &gs).mod_floor(p);
        x = (&x * &gs).mod_floor(p);
        b = (&b * &g).mod_floor(p);
        r = m;
    }
}
