//! Field and curve primitives for the Umbra ledger core.
//!
//! Everything above this crate computes over the Pallas curve: base field
//! elements (`Fp`) are what commitments, nullifiers, and Merkle nodes are
//! made of; scalars (`Fq`) are secret keys and blinding factors; points
//! carry the Pedersen structure. This crate is the only one below the
//! proof layer that names the concrete curve; a second backend would be
//! a sibling module behind the same encode/decode surface.
//!
//! All arithmetic is constant time with respect to secret operands: the
//! `ff`/`group` operations never branch on limb values, and decode paths
//! use `CtOption`/`Choice` so invalid-encoding detection does not leak
//! which bytes were wrong.

pub mod encoding;

pub use pasta_curves::pallas;

use ff::Field;
use group::Group;
use subtle::ConstantTimeEq;
use umbra_common::{CoreError, CoreResult};

/// Base field element: commitments, nullifiers, Merkle nodes.
pub type Base = pallas::Base;
/// Scalar field element: secret keys, blinding randomness.
pub type Scalar = pallas::Scalar;
/// Curve point in projective form.
pub type Point = pallas::Point;
/// Curve point in affine form.
pub type Affine = pallas::Affine;

/// Scalar-field addition.
pub fn scalar_add(a: &Scalar, b: &Scalar) -> Scalar {
    a + b
}

/// Scalar-field multiplication.
pub fn scalar_mul(a: &Scalar, b: &Scalar) -> Scalar {
    a * b
}

/// Scalar-field inversion.
///
/// Zero has no inverse; the failure is reported, not panicked, and the
/// check itself is a constant-time flag inspection.
pub fn scalar_invert(a: &Scalar) -> CoreResult<Scalar> {
    Option::<Scalar>::from(a.invert())
        .ok_or_else(|| CoreError::CryptoFailure("inversion of the zero scalar".into()))
}

/// Curve point addition.
pub fn point_add(a: &Point, b: &Point) -> Point {
    a + b
}

/// Scalar multiplication of a curve point.
pub fn point_mul(p: &Point, k: &Scalar) -> Point {
    p * k
}

/// The prime-order group generator.
pub fn generator() -> Point {
    Point::generator()
}

/// Constant-time equality of two 32-byte encodings.
pub fn ct_eq_bytes(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.ct_eq(b).into()
}

/// Sample a uniformly random nonzero scalar.
pub fn random_scalar(rng: &mut (impl rand_core::RngCore + rand_core::CryptoRng)) -> Scalar {
    loop {
        let s = Scalar::random(&mut *rng);
        // Zero is a degenerate key/blinder; resampling leaks nothing
        // because the loop condition depends only on the rejected value.
        if !bool::from(s.is_zero()) {
            return s;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff::Field;
    use rand::rngs::OsRng;

    #[test]
    fn scalar_invert_round_trips() {
        let s = random_scalar(&mut OsRng);
        let inv = scalar_invert(&s).unwrap();
        assert_eq!(scalar_mul(&s, &inv), Scalar::ONE);
    }

    #[test]
    fn zero_scalar_has_no_inverse() {
        assert!(matches!(
            scalar_invert(&Scalar::ZERO),
            Err(CoreError::CryptoFailure(_))
        ));
    }

    #[test]
    fn group_law_sanity() {
        let g = generator();
        let two = Scalar::from(2u64);
        assert_eq!(point_add(&g, &g), point_mul(&g, &two));
    }

    #[test]
    fn ct_eq_matches_plain_eq() {
        let a = [7u8; 32];
        let mut b = a;
        assert!(ct_eq_bytes(&a, &b));
        b[31] ^= 1;
        assert!(!ct_eq_bytes(&a, &b));
    }
}
