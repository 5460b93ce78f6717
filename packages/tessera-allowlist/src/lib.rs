//! Merkle allowlist membership proofs.
//!
//! An allowlist snapshot is a sequence of `(address, allowance)` entries. The
//! entry's position in the snapshot is its index, and its leaf hash is
//! `sha256(index as u64 BE || address UTF-8 bytes || allowance as u32 BE)`.
//! Interior nodes hash the sorted pair, smaller side first, so proofs carry no
//! left/right flags; an unpaired node at the end of a layer is promoted as is.
//!
//! Verification is pure and total: any mismatch in proof shape or content
//! yields `false`, never an error.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// A sha256 digest, the node type of the tree.
pub type Hash = [u8; 32];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AllowlistError {
    #[error("allowlist must contain at least one entry")]
    Empty,

    #[error("entry index {index} out of bounds for {len} entries")]
    IndexOutOfBounds { index: u64, len: u64 },
}

/// One published allowlist slot. Its index is its position in the snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllowlistEntry {
    pub address: String,
    pub allowance: u32,
}

impl AllowlistEntry {
    pub fn new(address: impl Into<String>, allowance: u32) -> Self {
        Self {
            address: address.into(),
            allowance,
        }
    }
}

pub fn leaf_hash(index: u64, address: &str, allowance: u32) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(index.to_be_bytes());
    hasher.update(address.as_bytes());
    hasher.update(allowance.to_be_bytes());
    hasher.finalize().into()
}

fn combine(a: &Hash, b: &Hash) -> Hash {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update(lo);
    hasher.update(hi);
    hasher.finalize().into()
}

/// Recomputes the leaf for `(index, address, allowance)`, folds `proof` over
/// it and compares the result against `root`.
pub fn verify(root: &Hash, index: u64, address: &str, allowance: u32, proof: &[Hash]) -> bool {
    let mut node = leaf_hash(index, address, allowance);
    for sibling in proof {
        node = combine(&node, sibling);
    }
    node == *root
}

/// Full tree built off-chain from an allowlist snapshot. Operators publish
/// `root()` on-chain and distribute `proof(index)` to each wallet.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    /// Layers bottom-up; the last layer is the single-element root layer.
    layers: Vec<Vec<Hash>>,
}

impl MerkleTree {
    pub fn from_entries(entries: &[AllowlistEntry]) -> Result<Self, AllowlistError> {
        if entries.is_empty() {
            return Err(AllowlistError::Empty);
        }

        let leaves: Vec<Hash> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| leaf_hash(i as u64, &e.address, e.allowance))
            .collect();

        let mut layers = vec![leaves];
        while layers[layers.len() - 1].len() > 1 {
            let next: Vec<Hash> = layers[layers.len() - 1]
                .chunks(2)
                .map(|pair| match pair {
                    [a, b] => combine(a, b),
                    [a] => *a,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            layers.push(next);
        }

        Ok(Self { layers })
    }

    pub fn leaf_count(&self) -> u64 {
        self.layers[0].len() as u64
    }

    pub fn root(&self) -> Hash {
        self.layers[self.layers.len() - 1][0]
    }

    /// Root rendered as lowercase hex, the form published to operators.
    pub fn root_hex(&self) -> String {
        hex::encode(self.root())
    }

    /// Sibling path for the entry at `index`, bottom-up.
    pub fn proof(&self, index: u64) -> Result<Vec<Hash>, AllowlistError> {
        let len = self.leaf_count();
        if index >= len {
            return Err(AllowlistError::IndexOutOfBounds { index, len });
        }

        let mut proof = Vec::with_capacity(self.layers.len() - 1);
        let mut idx = index as usize;
        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling = if idx % 2 == 0 { idx + 1 } else { idx - 1 };
            if sibling < layer.len() {
                proof.push(layer[sibling]);
            }
            idx /= 2;
        }
        Ok(proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Vec<AllowlistEntry> {
        vec![
            AllowlistEntry::new("wallet1", 5),
            AllowlistEntry::new("wallet2", 2),
            AllowlistEntry::new("wallet3", 10),
            AllowlistEntry::new("wallet4", 1),
            AllowlistEntry::new("wallet5", 7),
        ]
    }

    #[test]
    fn every_entry_verifies() {
        let entries = snapshot();
        let tree = MerkleTree::from_entries(&entries).unwrap();
        for (i, entry) in entries.iter().enumerate() {
            let proof = tree.proof(i as u64).unwrap();
            assert!(verify(
                &tree.root(),
                i as u64,
                &entry.address,
                entry.allowance,
                &proof
            ));
        }
    }

    #[test]
    fn mutated_claims_fail() {
        let entries = snapshot();
        let tree = MerkleTree::from_entries(&entries).unwrap();
        let root = tree.root();
        let proof = tree.proof(0).unwrap();

        // wrong index
        assert!(!verify(&root, 1, "wallet1", 5, &proof));
        // wrong address
        assert!(!verify(&root, 0, "wallet9", 5, &proof));
        // inflated allowance
        assert!(!verify(&root, 0, "wallet1", 6, &proof));
    }

    #[test]
    fn mutated_proof_fails() {
        let entries = snapshot();
        let tree = MerkleTree::from_entries(&entries).unwrap();
        let root = tree.root();

        let mut proof = tree.proof(2).unwrap();
        proof[0][0] ^= 0x01;
        assert!(!verify(&root, 2, "wallet3", 10, &proof));

        // truncated proof
        let mut short = tree.proof(2).unwrap();
        short.pop();
        assert!(!verify(&root, 2, "wallet3", 10, &short));

        // padded proof
        let mut long = tree.proof(2).unwrap();
        long.push([0u8; 32]);
        assert!(!verify(&root, 2, "wallet3", 10, &long));

        // empty proof against a multi-leaf root
        assert!(!verify(&root, 2, "wallet3", 10, &[]));
    }

    #[test]
    fn single_entry_tree_has_empty_proof() {
        let entries = vec![AllowlistEntry::new("solo", 3)];
        let tree = MerkleTree::from_entries(&entries).unwrap();
        let proof = tree.proof(0).unwrap();
        assert!(proof.is_empty());
        assert!(verify(&tree.root(), 0, "solo", 3, &proof));
        assert!(!verify(&tree.root(), 0, "solo", 4, &proof));
    }

    #[test]
    fn odd_leaf_counts_build_and_verify() {
        for n in 1..=9u32 {
            let entries: Vec<AllowlistEntry> = (0..n)
                .map(|i| AllowlistEntry::new(format!("wallet{i}"), i + 1))
                .collect();
            let tree = MerkleTree::from_entries(&entries).unwrap();
            for (i, entry) in entries.iter().enumerate() {
                let proof = tree.proof(i as u64).unwrap();
                assert!(
                    verify(&tree.root(), i as u64, &entry.address, entry.allowance, &proof),
                    "entry {i} of {n} failed"
                );
            }
        }
    }

    #[test]
    fn builder_rejects_bad_input() {
        assert_eq!(
            MerkleTree::from_entries(&[]).unwrap_err(),
            AllowlistError::Empty
        );
        let tree = MerkleTree::from_entries(&snapshot()).unwrap();
        assert_eq!(
            tree.proof(5).unwrap_err(),
            AllowlistError::IndexOutOfBounds { index: 5, len: 5 }
        );
    }

    #[test]
    fn root_hex_round_trips() {
        let tree = MerkleTree::from_entries(&snapshot()).unwrap();
        let rendered = tree.root_hex();
        assert_eq!(rendered.len(), 64);
        assert_eq!(hex::decode(&rendered).unwrap(), tree.root().to_vec());
    }
}
