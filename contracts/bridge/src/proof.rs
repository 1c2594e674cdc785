//! Versioned inclusion proof verification.
//!
//! The registry never verifies proofs directly: it asks the active
//! [`ProofScheme`] for its [`ProofVerifier`]. Governance can swap the scheme
//! in one transaction without touching stored commitments.

use common::merkle::{verify_indexed, verify_sorted_pair};
use common::{Bytes32, MerkleProof};
use cosmwasm_schema::cw_serde;

/// Verifies that `leaf` is included under `root`.
pub trait ProofVerifier {
    fn verify(&self, root: &Bytes32, leaf: &Bytes32, proof: &MerkleProof) -> bool;
}

/// Proof schemes the gateway understands, tagged by version.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum ProofScheme {
    /// Unprefixed keccak tree with sorted sibling pairs
    SortedPairKeccakV1,
    /// Domain-separated keccak tree walked by leaf position
    IndexedKeccakV2,
}

impl ProofScheme {
    pub fn version(&self) -> u8 {
        match self {
            ProofScheme::SortedPairKeccakV1 => 1,
            ProofScheme::IndexedKeccakV2 => 2,
        }
    }

    pub fn verifier(&self) -> &'static dyn ProofVerifier {
        match self {
            ProofScheme::SortedPairKeccakV1 => &SortedPairKeccak,
            ProofScheme::IndexedKeccakV2 => &IndexedKeccak,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProofScheme::SortedPairKeccakV1 => "sorted_pair_keccak_v1",
            ProofScheme::IndexedKeccakV2 => "indexed_keccak_v2",
        }
    }
}

struct SortedPairKeccak;

impl ProofVerifier for SortedPairKeccak {
    fn verify(&self, root: &Bytes32, leaf: &Bytes32, proof: &MerkleProof) -> bool {
        verify_sorted_pair(root, leaf, proof)
    }
}

struct IndexedKeccak;

impl ProofVerifier for IndexedKeccak {
    fn verify(&self, root: &Bytes32, leaf: &Bytes32, proof: &MerkleProof) -> bool {
        verify_indexed(root, leaf, proof)
    }
}
