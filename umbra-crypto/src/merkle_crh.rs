//! Sinsemilla Merkle collision-resistant hash.
//!
//! One tree level hashes `level || left || right` to a curve point and
//! extracts x: the 10-bit level index prefixes the two 255-bit child
//! encodings, so a node can never be confused with a node at another
//! depth. The construction (and its cross-platform determinism) comes
//! from the Sinsemilla primitive; only the personalization is ours.

use ff::PrimeField;
use group::Curve;
use halo2_gadgets::sinsemilla::primitives::{HashDomain, K};
use umbra_primitives::{Base, Affine};

/// Hash-domain personalization for the accumulator CRH.
pub const MERKLE_CRH_PERSONALIZATION: &str = "umbra:MerkleCRH";

fn merkle_domain() -> HashDomain {
    HashDomain::new(MERKLE_CRH_PERSONALIZATION)
}

/// Hash one tree level: parent = CRH(level, left, right).
///
/// Returns `None` in the negligible-probability case that the Sinsemilla
/// point accumulation hits the identity; callers treat that as a failed
/// hash, never as a silently wrong value.
pub fn merkle_hash_level(level: u8, left: Base, right: Base) -> Option<Base> {
    let domain = merkle_domain();

    let mut message = Vec::with_capacity(2 * 255 + K);

    // 10-bit level prefix, little-endian bit order.
    let level = level as u16;
    for i in 0..K {
        message.push((level >> i) & 1 == 1);
    }

    push_base_bits(&mut message, &left);
    push_base_bits(&mut message, &right);

    let point = domain.hash_to_point(message.into_iter());
    if bool::from(point.is_some()) {
        Some(extract_p(&point.unwrap().to_affine()))
    } else {
        None
    }
}

/// Append the low 255 bits of a base field element, LSB first.
fn push_base_bits(message: &mut Vec<bool>, value: &Base) {
    let repr = value.to_repr();
    for byte in repr.iter().take(31) {
        for i in 0..8 {
            message.push((byte >> i) & 1 == 1);
        }
    }
    for i in 0..7 {
        message.push((repr[31] >> i) & 1 == 1);
    }
}

fn extract_p(point: &Affine) -> Base {
    use group::prime::PrimeCurveAffine;
    use pasta_curves::arithmetic::CurveAffine;
    if bool::from(point.is_identity()) {
        Base::zero()
    } else {
        *point.coordinates().unwrap().x()
    }
}
