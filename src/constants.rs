//! Curve and RSA size constants.
//!
//! Mirrors the teacher crate's tiered batch-size constants: `DEFAULT_CURVE_*`
//! are the production parameters required for interoperability with the
//! reference test vectors, while `TEST_RSA_PRIME_BITS` trades RSA keygen
//! speed for test-suite latency (curve operations are cheap regardless of
//! size; RSA-1024 keygen is not).

use num_bigint::BigUint;
use once_cell::sync::Lazy;

/// `a` coefficient of the default curve.
pub static DEFAULT_CURVE_A: Lazy<BigUint> = Lazy::new(|| {
    "1268133167195989090596625406312984755854486256116"
        .parse()
        .unwrap()
});

/// `b` coefficient of the default curve.
pub static DEFAULT_CURVE_B: Lazy<BigUint> = Lazy::new(|| {
    "386736940269827655214118852806596527602892573734"
        .parse()
        .unwrap()
});

/// Field prime `p` of the default curve (a 163-bit prime).
pub static DEFAULT_CURVE_P: Lazy<BigUint> = Lazy::new(|| {
    "1461501637330902918203684832716283019655932542983"
        .parse()
        .unwrap()
});

/// Group order `n` of the default curve.
pub static DEFAULT_CURVE_ORDER: Lazy<BigUint> = Lazy::new(|| {
    "1461501637330902918203684149283858612734394057783"
        .parse()
        .unwrap()
});

/// Public RSA exponent, fixed per the spec.
pub const RSA_PUBLIC_EXPONENT: u32 = 65537;

/// Production RSA prime size in bits, per §6.
pub const PRODUCTION_RSA_PRIME_BITS: usize = 1024;

/// RSA prime size used by this crate's own tests/demo, so a full run stays
/// fast; production callers should use [`PRODUCTION_RSA_PRIME_BITS`]. Must
/// stay large enough that the modulus exceeds [`DEFAULT_CURVE_P`] (163
/// bits), since ciphertext coordinates are the messages being signed.
pub const TEST_RSA_PRIME_BITS: usize = 96;
