//! Merkle inclusion proofs for L2 state roots.
//!
//! Two tree layouts are supported. Both promote the last node of an odd-sized
//! level unchanged to the next level, so no padding leaves are ever hashed.
//!
//! - **Sorted pair**: leaves are used as-is and every inner node is
//!   `keccak256(min(a, b) || max(a, b))`. The leaf position is not needed to
//!   verify a proof.
//! - **Indexed**: leaves are domain-separated as `keccak256(0x00 || leaf)` and
//!   inner nodes as `keccak256(0x01 || left || right)`. The verifier walks the
//!   tree from `leaf_index`, so a proof binds the leaf to one position.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Binary;

use crate::hash::{keccak256_concat, Bytes32};

const LEAF_PREFIX: [u8; 1] = [0x00];
const NODE_PREFIX: [u8; 1] = [0x01];

/// Inclusion proof for one leaf of a tree with `leaf_count` leaves.
#[cw_serde]
pub struct MerkleProof {
    /// Position of the leaf (ignored by the sorted-pair layout)
    pub leaf_index: u64,
    /// Number of leaves in the tree (ignored by the sorted-pair layout)
    pub leaf_count: u64,
    /// Sibling hashes from the leaf level up, 32 bytes each
    pub siblings: Vec<Binary>,
}

impl MerkleProof {
    fn sibling_hashes(&self) -> Option<Vec<Bytes32>> {
        self.siblings
            .iter()
            .map(|s| s.as_slice().try_into().ok())
            .collect()
    }
}

fn hash_sorted_pair(a: &Bytes32, b: &Bytes32) -> Bytes32 {
    if a <= b {
        keccak256_concat(&[a.as_slice(), b.as_slice()])
    } else {
        keccak256_concat(&[b.as_slice(), a.as_slice()])
    }
}

fn hash_leaf(leaf: &Bytes32) -> Bytes32 {
    keccak256_concat(&[&LEAF_PREFIX[..], leaf.as_slice()])
}

fn hash_node(left: &Bytes32, right: &Bytes32) -> Bytes32 {
    keccak256_concat(&[&NODE_PREFIX[..], left.as_slice(), right.as_slice()])
}

/// Build every level of a tree from its bottom level. `levels[0]` is the
/// bottom, the last level holds only the root.
fn build_levels(
    bottom: Vec<Bytes32>,
    combine: fn(&Bytes32, &Bytes32) -> Bytes32,
) -> Vec<Vec<Bytes32>> {
    let mut levels = vec![bottom];
    while levels[levels.len() - 1].len() > 1 {
        let next = levels[levels.len() - 1]
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => combine(left, right),
                [single] => *single,
                _ => unreachable!("chunks(2) yields one or two nodes"),
            })
            .collect();
        levels.push(next);
    }
    levels
}

fn extract_proof(levels: &[Vec<Bytes32>], index: usize) -> MerkleProof {
    let mut siblings = Vec::new();
    let mut idx = index;
    for level in &levels[..levels.len() - 1] {
        let sibling = if idx % 2 == 0 { idx + 1 } else { idx - 1 };
        if let Some(node) = level.get(sibling) {
            siblings.push(Binary::from(node.to_vec()));
        }
        idx /= 2;
    }
    MerkleProof {
        leaf_index: index as u64,
        leaf_count: levels[0].len() as u64,
        siblings,
    }
}

// ============================================================================
// Sorted-pair layout
// ============================================================================

/// Root of a sorted-pair tree. `None` for an empty leaf set.
pub fn sorted_pair_root(leaves: &[Bytes32]) -> Option<Bytes32> {
    if leaves.is_empty() {
        return None;
    }
    let levels = build_levels(leaves.to_vec(), hash_sorted_pair);
    levels.last().map(|root| root[0])
}

/// Proof for `leaves[index]` in a sorted-pair tree.
pub fn sorted_pair_proof(leaves: &[Bytes32], index: usize) -> Option<MerkleProof> {
    if index >= leaves.len() {
        return None;
    }
    let levels = build_levels(leaves.to_vec(), hash_sorted_pair);
    Some(extract_proof(&levels, index))
}

/// Verify a sorted-pair proof. Position fields of the proof are ignored.
pub fn verify_sorted_pair(root: &Bytes32, leaf: &Bytes32, proof: &MerkleProof) -> bool {
    let Some(siblings) = proof.sibling_hashes() else {
        return false;
    };
    let computed = siblings
        .iter()
        .fold(*leaf, |node, sibling| hash_sorted_pair(&node, sibling));
    &computed == root
}

// ============================================================================
// Indexed layout
// ============================================================================

/// Root of an indexed tree. `None` for an empty leaf set.
pub fn indexed_root(leaves: &[Bytes32]) -> Option<Bytes32> {
    if leaves.is_empty() {
        return None;
    }
    let levels = build_levels(leaves.iter().map(hash_leaf).collect(), hash_node);
    levels.last().map(|root| root[0])
}

/// Proof for `leaves[index]` in an indexed tree.
pub fn indexed_proof(leaves: &[Bytes32], index: usize) -> Option<MerkleProof> {
    if index >= leaves.len() {
        return None;
    }
    let levels = build_levels(leaves.iter().map(hash_leaf).collect(), hash_node);
    Some(extract_proof(&levels, index))
}

/// Verify an indexed proof: the leaf must sit at `leaf_index` of a tree with
/// `leaf_count` leaves and every sibling must be consumed.
pub fn verify_indexed(root: &Bytes32, leaf: &Bytes32, proof: &MerkleProof) -> bool {
    if proof.leaf_count == 0 || proof.leaf_index >= proof.leaf_count {
        return false;
    }
    let Some(siblings) = proof.sibling_hashes() else {
        return false;
    };

    let mut node = hash_leaf(leaf);
    let mut idx = proof.leaf_index;
    let mut width = proof.leaf_count;
    let mut remaining = siblings.iter();

    while width > 1 {
        let promoted = idx == width - 1 && width % 2 == 1;
        if !promoted {
            let Some(sibling) = remaining.next() else {
                return false;
            };
            node = if idx % 2 == 0 {
                hash_node(&node, sibling)
            } else {
                hash_node(sibling, &node)
            };
        }
        idx /= 2;
        width = width.div_ceil(2);
    }

    remaining.next().is_none() && &node == root
}
