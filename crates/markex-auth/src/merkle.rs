//! Merkle commitments for bulk-signed orders.
//!
//! A trader can sign one root covering many orders. Leaves are the order
//! hashes themselves; each internal node is
//! `SHA-256("markex:node:v1:" || min(a, b) || max(a, b))`. Sorting the
//! children means a proof is just the list of siblings, with no position
//! bits. An unpaired node at the end of a level is promoted unchanged.

use markex_types::{OrderHash, constants};
use sha2::{Digest, Sha256};

/// Hash two sibling nodes into their parent.
#[must_use]
pub fn hash_pair(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update(constants::MERKLE_NODE_DOMAIN);
    hasher.update(lo);
    hasher.update(hi);
    hasher.finalize().into()
}

/// A fully built tree over a list of order hashes.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// `levels[0]` are the leaves, the last level holds only the root.
    levels: Vec<Vec<[u8; 32]>>,
}

impl MerkleTree {
    /// Build a tree. Returns `None` for an empty leaf set.
    #[must_use]
    pub fn build(leaves: &[OrderHash]) -> Option<Self> {
        if leaves.is_empty() {
            return None;
        }
        let mut levels = vec![leaves.iter().map(|h| h.0).collect::<Vec<_>>()];
        while levels.last().is_some_and(|level| level.len() > 1) {
            let current = levels.last()?;
            let next = current
                .chunks(2)
                .map(|pair| match pair {
                    [a, b] => hash_pair(a, b),
                    [single] => *single,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            levels.push(next);
        }
        Some(Self { levels })
    }

    #[must_use]
    pub fn root(&self) -> [u8; 32] {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Sibling path from leaf `index` up to the root.
    #[must_use]
    pub fn proof(&self, mut index: usize) -> Option<Vec<[u8; 32]>> {
        if index >= self.leaf_count() {
            return None;
        }
        let mut proof = Vec::new();
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = index ^ 1;
            if let Some(node) = level.get(sibling) {
                proof.push(*node);
            }
            index /= 2;
        }
        Some(proof)
    }
}

/// Recompute the root a proof commits `leaf` to.
#[must_use]
pub fn compute_root(leaf: &OrderHash, proof: &[[u8; 32]]) -> [u8; 32] {
    proof
        .iter()
        .fold(leaf.0, |node, sibling| hash_pair(&node, sibling))
}

/// Does `proof` show `leaf` is committed under `root`?
#[must_use]
pub fn verify_proof(leaf: &OrderHash, proof: &[[u8; 32]], root: &[u8; 32]) -> bool {
    compute_root(leaf, proof) == *root
}
