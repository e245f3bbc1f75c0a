//! Canonical 32-byte encodings for field elements and curve points.
//!
//! Field elements use the little-endian `PrimeField` representation;
//! points use the 32-byte compressed `GroupEncoding` form. Decoding is
//! strict: a value at or above the modulus, or an x-coordinate not on the
//! curve, is `InvalidEncoding`; the engine never silently reduces.

use ff::PrimeField;
use group::{Curve, GroupEncoding};
use umbra_common::{CoreError, CoreResult};

use crate::{Affine, Base, Point, Scalar};

/// Decode a canonical base field element.
pub fn base_from_bytes(bytes: &[u8; 32]) -> CoreResult<Base> {
    Option::<Base>::from(Base::from_repr(*bytes))
        .ok_or_else(|| CoreError::InvalidEncoding("base field element not canonical".into()))
}

/// Encode a base field element.
pub fn base_to_bytes(value: &Base) -> [u8; 32] {
    value.to_repr()
}

/// Decode a canonical scalar.
pub fn scalar_from_bytes(bytes: &[u8; 32]) -> CoreResult<Scalar> {
    Option::<Scalar>::from(Scalar::from_repr(*bytes))
        .ok_or_else(|| CoreError::InvalidEncoding("scalar not canonical".into()))
}

/// Encode a scalar.
pub fn scalar_to_bytes(value: &Scalar) -> [u8; 32] {
    value.to_repr()
}

/// Decode a compressed curve point.
pub fn point_from_bytes(bytes: &[u8; 32]) -> CoreResult<Point> {
    Option::<Point>::from(Point::from_bytes(bytes))
        .ok_or_else(|| CoreError::InvalidEncoding("point not on curve".into()))
}

/// Encode a curve point in compressed form.
pub fn point_to_bytes(point: &Point) -> [u8; 32] {
    point.to_bytes()
}

/// Extract the x-coordinate of a point as a base field element.
///
/// The identity extracts to zero, matching the Merkle/commitment
/// extraction convention of the Pallas-based shielded protocols.
pub fn extract_x(point: &Point) -> Base {
    let affine: Affine = point.to_affine();
    extract_x_affine(&affine)
}

fn extract_x_affine(affine: &Affine) -> Base {
    use group::prime::PrimeCurveAffine;
    use pasta_curves::arithmetic::CurveAffine;
    if bool::from(affine.is_identity()) {
        Base::zero()
    } else {
        *affine.coordinates().unwrap().x()
    }
}
