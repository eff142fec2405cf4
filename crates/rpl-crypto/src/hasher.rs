use rpl_types::Hash256;
use sha2::{Digest, Sha512};

use crate::prefix::HashPrefix;

/// The ledger hash function: the first 256 bits of SHA-512.
pub fn sha512_half(data: &[u8]) -> Hash256 {
    let digest = Sha512::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    Hash256::from_array(out)
}

/// Hash `prefix ++ payload`.
pub fn compute_hash(prefix: HashPrefix, payload: &[u8]) -> Hash256 {
    ContentHasher::new(prefix).hash(payload)
}

/// Prefix-bound SHA-512-half hasher.
///
/// Every hash is computed over the prefix bytes followed by the payload,
/// so identical payloads hashed in different contexts never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    prefix: HashPrefix,
}

impl ContentHasher {
    /// Transaction ids.
    pub const TRANSACTION_ID: Self = Self::new(HashPrefix::TransactionId);
    /// Transaction tree leaves.
    pub const TRANSACTION_NODE: Self = Self::new(HashPrefix::TransactionNode);
    /// State tree leaves.
    pub const LEAF_NODE: Self = Self::new(HashPrefix::LeafNode);
    /// Inner tree nodes.
    pub const INNER_NODE: Self = Self::new(HashPrefix::InnerNode);
    /// Ledger headers.
    pub const LEDGER_MASTER: Self = Self::new(HashPrefix::LedgerMaster);
    /// Signing preimages.
    pub const TRANSACTION_SIGN: Self = Self::new(HashPrefix::TransactionSign);
    pub const VALIDATION: Self = Self::new(HashPrefix::Validation);
    pub const PROPOSAL: Self = Self::new(HashPrefix::Proposal);

    /// Hasher bound to `prefix`.
    pub const fn new(prefix: HashPrefix) -> Self {
        Self { prefix }
    }

    /// Hash `prefix ++ payload`.
    pub fn hash(&self, payload: &[u8]) -> Hash256 {
        self.hash_parts(&[payload])
    }

    /// Hash several payload slices as if concatenated.
    pub fn hash_parts(&self, parts: &[&[u8]]) -> Hash256 {
        let mut hasher = Sha512::new();
        hasher.update(self.prefix.to_be_bytes());
        for part in parts {
            hasher.update(part);
        }
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest[..32]);
        Hash256::from_array(out)
    }

    /// Whether `payload` hashes to `expected`.
    pub fn verify(&self, payload: &[u8], expected: &Hash256) -> bool {
        self.hash(payload) == *expected
    }

    pub fn prefix(&self) -> HashPrefix {
        self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sha512_half_of_empty_input() {
        assert_eq!(
            sha512_half(b"").to_hex(),
            "CF83E1357EEFB8BDF1542850D66D8007D620E4050B5715DC83F4A921D36CE9CE"
        );
    }

    #[test]
    fn compute_hash_prepends_prefix() {
        let payload = b"payload";
        let mut joined = HashPrefix::TransactionId.to_be_bytes().to_vec();
        joined.extend_from_slice(payload);
        assert_eq!(compute_hash(HashPrefix::TransactionId, payload), sha512_half(&joined));
    }

    #[test]
    fn hash_parts_matches_concatenation() {
        let h = ContentHasher::LEAF_NODE;
        assert_eq!(h.hash_parts(&[b"ab", b"", b"cd"]), h.hash(b"abcd"));
    }

    #[test]
    fn verify_detects_tampering() {
        let id = ContentHasher::TRANSACTION_ID.hash(b"original");
        assert!(ContentHasher::TRANSACTION_ID.verify(b"original", &id));
        assert!(!ContentHasher::TRANSACTION_ID.verify(b"tampered", &id));
        assert!(!ContentHasher::TRANSACTION_SIGN.verify(b"original", &id));
    }

    proptest! {
        #[test]
        fn prop_domain_separation(payload in proptest::collection::vec(any::<u8>(), 1..64)) {
            let hashes: Vec<Hash256> = HashPrefix::ALL
                .iter()
                .map(|p| compute_hash(*p, &payload))
                .collect();
            for (i, a) in hashes.iter().enumerate() {
                for b in &hashes[i + 1..] {
                    prop_assert_ne!(a, b);
                }
            }
        }
    }
}
