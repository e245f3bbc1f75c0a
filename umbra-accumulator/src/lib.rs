//! Append-only Merkle accumulator for coin commitments.
//!
//! Fixed height 32 (up to 2^32 leaves). Leaves are ordered strictly by
//! append order; a leaf's index is its append sequence number and is
//! never reused. The root is a pure function of the leaf sequence, and
//! every interior node above the populated prefix is an empty-subtree
//! hash from a precomputed table.

use once_cell::sync::Lazy;
use tracing::debug;
use umbra_common::codec::{Reader, Writer};
use umbra_common::{CoreError, CoreResult};
use umbra_crypto::merkle_hash_level;
use umbra_primitives::encoding::{base_from_bytes, base_to_bytes};
use umbra_primitives::Base;

/// Height of the accumulator tree.
pub const ACCUMULATOR_HEIGHT: u8 = 32;

/// Maximum number of leaves.
pub const MAX_LEAVES: u64 = 1 << ACCUMULATOR_HEIGHT;

/// Empty-subtree hash per level: `EMPTY_ROOTS[h]` is the root of an empty
/// subtree of height `h`, with the empty leaf defined as zero.
static EMPTY_ROOTS: Lazy<[Base; ACCUMULATOR_HEIGHT as usize + 1]> = Lazy::new(|| {
    let mut roots = [Base::zero(); ACCUMULATOR_HEIGHT as usize + 1];
    for level in 0..ACCUMULATOR_HEIGHT {
        let child = roots[level as usize];
        roots[level as usize + 1] = merkle_hash_level(level, child, child)
            .expect("empty subtree hash is a fixed constant");
    }
    roots
});

/// Authentication path for one leaf: the sibling hash at every level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MembershipProof {
    position: u64,
    siblings: Vec<Base>,
}

impl MembershipProof {
    /// Index of the proven leaf in append order.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Sibling hashes from leaf level to just below the root.
    pub fn siblings(&self) -> &[Base] {
        &self.siblings
    }

    /// Canonical encoding: position (u64 BE) then exactly 32 siblings.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(8 + 32 * ACCUMULATOR_HEIGHT as usize);
        w.write_u64_be(self.position);
        for sibling in &self.siblings {
            w.write_array32(&base_to_bytes(sibling));
        }
        w.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let mut r = Reader::new(bytes);
        let position = r.read_u64_be()?;
        let mut siblings = Vec::with_capacity(ACCUMULATOR_HEIGHT as usize);
        for _ in 0..ACCUMULATOR_HEIGHT {
            siblings.push(base_from_bytes(&r.read_array32()?)?);
        }
        r.finish()?;
        Ok(MembershipProof { position, siblings })
    }
}

/// The append-only commitment accumulator.
///
/// Interior nodes of the populated prefix are cached per level, so an
/// append touches one node per level and a membership proof is a table
/// lookup per level.
pub struct MerkleAccumulator {
    /// `levels[0]` holds the leaves, `levels[h]` the nodes at height `h`.
    levels: Vec<Vec<Base>>,
    /// Number of appended leaves.
    size: u64,
}

impl Default for MerkleAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl MerkleAccumulator {
    pub fn new() -> Self {
        MerkleAccumulator {
            levels: vec![Vec::new(); ACCUMULATOR_HEIGHT as usize + 1],
            size: 0,
        }
    }

    /// Number of appended leaves.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Append a commitment leaf; returns the new root.
    ///
    /// The index of the appended leaf is `size()` before the call.
    pub fn append(&mut self, leaf: Base) -> CoreResult<Base> {
        if self.size >= MAX_LEAVES {
            return Err(CoreError::AccumulatorFull {
                height: ACCUMULATOR_HEIGHT,
            });
        }

        let index = self.size as usize;
        self.levels[0].push(leaf);
        self.size += 1;

        // Recompute the single path from the new leaf to the root.
        let mut node_index = index;
        for level in 0..ACCUMULATOR_HEIGHT {
            let parent_index = node_index >> 1;
            let left_index = parent_index << 1;
            let left = self.node_at(level, left_index);
            let right = self.node_at(level, left_index + 1);
            let parent = merkle_hash_level(level, left, right)
                .ok_or_else(|| CoreError::CryptoFailure("merkle level hash failed".into()))?;

            let parents = &mut self.levels[level as usize + 1];
            if parent_index == parents.len() {
                parents.push(parent);
            } else {
                parents[parent_index] = parent;
            }
            node_index = parent_index;
        }

        debug!(index, size = self.size, "appended accumulator leaf");
        Ok(self.root())
    }

    /// Current root; the empty accumulator has the empty-tree root.
    pub fn root(&self) -> Base {
        self.levels[ACCUMULATOR_HEIGHT as usize]
            .first()
            .copied()
            .unwrap_or(EMPTY_ROOTS[ACCUMULATOR_HEIGHT as usize])
    }

    /// Append a batch of leaves; returns the index of the first.
    ///
    /// Equivalent to appending one by one. The whole batch is
    /// capacity-checked up front so a partial batch is never committed.
    pub fn append_batch<I>(&mut self, leaves: I) -> CoreResult<u64>
    where
        I: IntoIterator<Item = Base>,
        I::IntoIter: ExactSizeIterator,
    {
        let leaves = leaves.into_iter();
        if self.size + leaves.len() as u64 > MAX_LEAVES {
            return Err(CoreError::AccumulatorFull {
                height: ACCUMULATOR_HEIGHT,
            });
        }
        let start = self.size;
        for leaf in leaves {
            self.append(leaf)?;
        }
        Ok(start)
    }

    /// Authentication path for the leaf appended at `index`.
    pub fn prove_membership(&self, index: u64) -> CoreResult<MembershipProof> {
        if index >= self.size {
            return Err(CoreError::InvalidInput(format!(
                "leaf index {} out of range, accumulator holds {} leaves",
                index, self.size
            )));
        }

        let mut siblings = Vec::with_capacity(ACCUMULATOR_HEIGHT as usize);
        let mut node_index = index as usize;
        for level in 0..ACCUMULATOR_HEIGHT {
            siblings.push(self.node_at(level, node_index ^ 1));
            node_index >>= 1;
        }

        Ok(MembershipProof {
            position: index,
            siblings,
        })
    }

    fn node_at(&self, level: u8, index: usize) -> Base {
        self.levels[level as usize]
            .get(index)
            .copied()
            .unwrap_or(EMPTY_ROOTS[level as usize])
    }

    /// Canonical state encoding: leaf count then every leaf in append
    /// order. Interior nodes are derived, so they are not serialized.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(8 + 32 * self.levels[0].len());
        w.write_u64_be(self.size);
        for leaf in &self.levels[0] {
            w.write_array32(&base_to_bytes(leaf));
        }
        w.into_bytes()
    }

    /// Rebuild an accumulator from its canonical state encoding.
    ///
    /// The root is recomputed from the leaves, so a corrupted snapshot
    /// cannot smuggle in a root that its own leaf set does not produce.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let mut r = Reader::new(bytes);
        let size = r.read_u64_be()?;
        if size
            .checked_mul(32)
            .map_or(true, |need| need > r.remaining() as u64)
        {
            return Err(CoreError::InvalidInput(format!(
                "leaf count {} exceeds remaining buffer",
                size
            )));
        }

        let mut acc = MerkleAccumulator::new();
        for _ in 0..size {
            let leaf = base_from_bytes(&r.read_array32()?)?;
            acc.append(leaf)?;
        }
        r.finish()?;
        Ok(acc)
    }
}

/// Verify a membership proof against a root.
///
/// Rejects proofs whose path length is not exactly the tree height before
/// touching any hash.
pub fn verify_membership(root: Base, leaf: Base, proof: &MembershipProof) -> bool {
    if proof.siblings.len() != ACCUMULATOR_HEIGHT as usize {
        return false;
    }

    let mut current = leaf;
    for (level, sibling) in proof.siblings.iter().enumerate() {
        let bit = (proof.position >> level) & 1;
        let (left, right) = if bit == 0 {
            (current, *sibling)
        } else {
            (*sibling, current)
        };
        current = match merkle_hash_level(level as u8, left, right) {
            Some(parent) => parent,
            None => return false,
        };
    }
    current == root
}
