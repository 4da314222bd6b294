//! Short Weierstrass curve `y² = x³ + ax + b (mod p)` and its group law.
//!
//! This is a from-scratch affine-coordinate implementation over an
//! arbitrary-precision prime field; it does not delegate to a curve crate,
//! since the whole point of this layer is to expose `mod_inverse`,
//! `legendre`, and Tonelli–Shanks as first-class, independently testable
//! operations (see [`crate::field`]).

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::VotingError;
use crate::field::{legendre, mod_inverse, sqrt_mod};

/// A point on an [`EllipticCurve`]: either an affine `(x, y)` pair or the
/// distinguished point at infinity.
///
/// Equality and hashing treat every infinity instance as equal regardless of
/// whatever happens to be stored in `x`/`y` for it; by convention we store
/// `(0, 0)` there so the canonical encoding is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    x: BigUint,
    y: BigUint,
    is_infinity: bool,
}

impl Point {
    /// Creates an affine point. Does not check curve membership; use
    /// [`EllipticCurve::on_curve`] for that.
    pub fn affine(x: BigUint, y: BigUint) -> Self {
        Point {
            x,
            y,
            is_infinity: false,
        }
    }

    /// The point at infinity, the group identity.
    pub fn infinity() -> Self {
        Point {
            x: BigUint::zero(),
            y: BigUint::zero(),
            is_infinity: true,
        }
    }

    pub fn is_infinity(&self) -> bool {
        self.is_infinity
    }

    /// Returns `(x, y)` for an affine point.
    ///
    /// # Panics
    ///
    /// Panics if called on the point at infinity, which has no coordinates.
    pub fn xy(&self) -> (&BigUint, &BigUint) {
        assert!(!self.is_infinity, "point at infinity has no coordinates");
        (&self.x, &self.y)
    }

    /// Canonical `(x, y, is_infinity)` encoding used for equality, hashing,
    /// and as the table key in the meet-in-the-middle search.
    fn canonical(&self) -> (BigUint, BigUint, bool) {
        if self.is_infinity {
            (BigUint::zero(), BigUint::zero(), true)
        } else {
            (self.x.clone(), self.y.clone(), false)
        }
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        if self.is_infinity || other.is_infinity {
            return self.is_infinity == other.is_infinity;
        }
        self.x == other.x && self.y == other.y
    }
}

impl Eq for Point {}

impl std::hash::Hash for Point {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.canonical().cmp(&other.canonical())
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinity {
            write!(f, "O")
        } else {
            write!(f, "({}, {})", self.x, self.y)
        }
    }
}

/// A short Weierstrass curve `y² = x³ + ax + b (mod p)`.
#[derive(Debug, Clone)]
pub struct EllipticCurve {
    a: BigUint,
    b: BigUint,
    p: BigUint,
}

impl EllipticCurve {
    /// Builds a curve, rejecting a singular one (`4a³ + 27b² ≡ 0 (mod p)`).
    pub fn new(a: BigUint, b: BigUint, p: BigUint) -> Result<Self, VotingError> {
        let four_a3 = BigUint::from(4u8) * a.modpow(&BigUint::from(3u8), &p);
        let twenty_seven_b2 = BigUint::from(27u8) * (&b * &b);
        if ((&four_a3 + &twenty_seven_b2).mod_floor(&p)).is_zero() {
            return Err(VotingError::SingularCurve);
        }
        Ok(EllipticCurve {
            a: a.mod_floor(&p),
            b: b.mod_floor(&p),
            p,
        })
    }

    pub fn a(&self) -> &BigUint {
        &self.a
    }

    pub fn b(&self) -> &BigUint {
        &self.b
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Checks membership in the curve's point set (the point at infinity is
    /// always on-curve by convention).
    pub fn on_curve(&self, point: &Point) -> bool {
        if point.is_infinity() {
            return true;
        }
        let (x, y) = point.xy();
        let lhs = (y * y).mod_floor(&self.p);
        let rhs = (x.modpow(&BigUint::from(3u8), &self.p) + &self.a * x + &self.b).mod_floor(&self.p);
        lhs == rhs
    }

    /// The additive inverse: `(x, -y mod p)`, or `O` for `O`.
    pub fn negate(&self, point: &Point) -> Point {
        if point.is_infinity() {
            return Point::infinity();
        }
        let (x, y) = point.xy();
        Point::affine(x.clone(), (&self.p - y).mod_floor(&self.p))
    }

    /// Point addition, folding in doubling when the two operands coincide.
    ///
    /// # Panics
    ///
    /// Panics if either operand is not on the curve, or if doubling a point
    /// whose `y` coordinate is `0` (the tangent there is vertical and the
    /// slope is undefined) — both are hard errors per this layer's failure
    /// semantics.
    pub fn add(&self, p1: &Point, p2: &Point) -> Point {
        assert!(self.on_curve(p1), "add: point {p1} is not on the curve");
        assert!(self.on_curve(p2), "add: point {p2} is not on the curve");

        if p1.is_infinity() {
            return p2.clone();
        }
        if p2.is_infinity() {
            return p1.clone();
        }
        if *p1 == self.negate(p2) {
            return Point::infinity();
        }

        let (x1, y1) = p1.xy();
        let (x2, y2) = p2.xy();

        let lambda = if p1 != p2 {
            let dx = ((x2 + &self.p) - x1).mod_floor(&self.p);
            let dy = ((y2 + &self.p) - y1).mod_floor(&self.p);
            (dy * mod_inverse(&dx, &self.p)).mod_floor(&self.p)
        } else {
            assert!(!y1.is_zero(), "add: cannot double a point with y = 0");
            let num = (BigUint::from(3u8) * x1 * x1 + &self.a).mod_floor(&self.p);
            let den = mod_inverse(&(BigUint::from(2u8) * y1).mod_floor(&self.p), &self.p);
            (num * den).mod_floor(&self.p)
        };

        let x3 = ((&lambda * &lambda + &self.p + &self.p) - x1 - x2).mod_floor(&self.p);
        let y3 = (&lambda * &((x1 + &self.p - &x3).mod_floor(&self.p)) + &self.p - y1).mod_floor(&self.p);
        Point::affine(x3, y3)
    }

    /// `p1 - p2`, i.e. `add(p1, negate(p2))`.
    pub fn sub(&self, p1: &Point, p2: &Point) -> Point {
        self.add(p1, &self.negate(p2))
    }

    /// Double-and-add scalar multiplication. Accepts a signed exponent: a
    /// negative `value` negates `point` and multiplies by `|value|`.
    ///
    /// Not constant-time (see the spec's side-channel design note); this is
    /// a reference implementation, not a hardened one.
    pub fn multiply(&self, value: &num_bigint::BigInt, point: &Point) -> Point {
        assert!(self.on_curve(point), "multiply: point {point} is not on the curve");

        use num_bigint::Sign;
        let (sign, mut magnitude) = value.clone().into_parts();

        let base = if sign == Sign::Minus {
            self.negate(point)
        } else {
            point.clone()
        };

        let mut result = Point::infinity();
        let mut level = base;
        while !magnitude.is_zero() {
            if magnitude.is_odd() {
                result = self.add(&result, &level);
            }
            level = self.add(&level, &level);
            magnitude >>= 1;
        }
        result
    }

    /// Convenience wrapper over [`Self::multiply`] for unsigned scalars.
    pub fn scalar_mul(&self, value: &BigUint, point: &Point) -> Point {
        self.multiply(&num_bigint::BigInt::from(value.clone()), point)
    }

    /// Samples a uniformly random non-infinity point on the curve, by
    /// rejection sampling on `x` until `x³ + ax + b` is a quadratic residue.
    ///
    /// Returns one of the two possible `y` roots; which one is returned is
    /// implementation-defined (the spec explicitly leaves this unspecified).
    pub fn random_point<R: RngCore>(&self, rng: &mut R) -> Point {
        loop {
            let x = random_below(rng, &self.p);
            if x.is_zero() {
                continue;
            }
            let rhs = (x.modpow(&BigUint::from(3u8), &self.p) + &self.a * &x + &self.b).mod_floor(&self.p);
            if legendre(&rhs, &self.p) == 1 {
                let y = sqrt_mod(&rhs, &self.p);
                return Point::affine(x, y);
            }
        }
    }
}

impl fmt::Display for EllipticCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "elliptic curve in field {}, equation: y^2 = x^3 + {}x + {}",
            self.p, self.a, self.b
        )
    }
}

/// Samples a uniform value in `[0, bound)` via rejection sampling on the
/// byte width of `bound`.
pub(crate) fn random_below<R: RngCore>(rng: &mut R, bound: &BigUint) -> BigUint {
    let byte_len = bound.to_bytes_be().len();
    loop {
        let mut bytes = vec![0u8; byte_len];
        rng.fill_bytes(&mut bytes);
        let candidate = BigUint::from_bytes_be(&bytes);
        if candidate < *bound {
            return candidate;
        }
    }
}

/// Samples a uniform value in `[1, bound - 1]`, i.e. a nonzero residue
/// suitable for use as a scalar/randomness.
pub fn random_nonzero_below<R: RngCore>(rng: &mut R, bound: &BigUint) -> BigUint {
    loop {
        let candidate = random_below(rng, bound);
        if !candidate.is_zero() {
            return candidate;
        }
    }
}
