use rpl_types::Hash256;

use crate::hasher::ContentHasher;

/// Inner node of the 16-way state or transaction tree.
///
/// Only the node hash lives here; walking and diffing trees is left to
/// whoever holds the nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InnerNode {
    children: [Hash256; 16],
}

impl InnerNode {
    pub const BRANCHES: usize = 16;

    /// Node with every branch empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Node with the given branch hashes.
    pub fn from_children(children: [Hash256; 16]) -> Self {
        Self { children }
    }

    /// Branch hash at `branch` (0..16); zero when empty.
    pub fn child(&self, branch: usize) -> Option<&Hash256> {
        self.children.get(branch)
    }

    /// Returns `false` when `branch` is out of range.
    pub fn set_child(&mut self, branch: usize, hash: Hash256) -> bool {
        match self.children.get_mut(branch) {
            Some(slot) => {
                *slot = hash;
                true
            }
            None => false,
        }
    }

    pub fn children(&self) -> &[Hash256; 16] {
        &self.children
    }

    /// Occupied branches with their hashes, in branch order.
    pub fn non_empty_children(&self) -> Vec<(u8, Hash256)> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_zero())
            .map(|(i, h)| (i as u8, *h))
            .collect()
    }

    /// True when every branch is zero.
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(Hash256::is_zero)
    }

    /// Inner-node prefix over the 16 child hashes. A node with no children
    /// hashes to zero.
    pub fn hash(&self) -> Hash256 {
        if self.is_empty() {
            return Hash256::ZERO;
        }
        let parts: Vec<&[u8]> = self.children.iter().map(|h| h.as_ref()).collect();
        ContentHasher::INNER_NODE.hash_parts(&parts)
    }
}

/// Leaf hash of a state entry: leaf prefix over `data ++ index`.
pub fn state_leaf_hash(data: &[u8], index: &Hash256) -> Hash256 {
    ContentHasher::LEAF_NODE.hash_parts(&[data, index.as_ref()])
}

/// Leaf hash of a transaction with metadata.
///
/// `leaf` is the length-prefixed transaction followed by the
/// length-prefixed metadata; `id` is the transaction id.
pub fn transaction_leaf_hash(leaf: &[u8], id: &Hash256) -> Hash256 {
    ContentHasher::TRANSACTION_NODE.hash_parts(&[leaf, id.as_ref()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::compute_hash;
    use crate::prefix::HashPrefix;

    #[test]
    fn empty_node_hashes_to_zero() {
        assert_eq!(InnerNode::new().hash(), Hash256::ZERO);
        assert!(InnerNode::new().non_empty_children().is_empty());
    }

    #[test]
    fn inner_hash_covers_all_sixteen_slots() {
        let mut node = InnerNode::new();
        let child = Hash256::from_array([3; 32]);
        assert!(node.set_child(4, child));
        assert!(!node.set_child(16, child));

        let mut payload = Vec::new();
        for i in 0..16 {
            let h = if i == 4 { child } else { Hash256::ZERO };
            payload.extend_from_slice(h.as_bytes());
        }
        assert_eq!(payload.len(), 512);
        assert_eq!(node.hash(), compute_hash(HashPrefix::InnerNode, &payload));
        assert_eq!(node.non_empty_children(), vec![(4, child)]);
    }

    #[test]
    fn moving_a_child_changes_the_hash() {
        let child = Hash256::from_array([9; 32]);
        let mut a = InnerNode::new();
        a.set_child(0, child);
        let mut b = InnerNode::new();
        b.set_child(1, child);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn leaf_hashes_append_the_key() {
        let index = Hash256::from_array([1; 32]);
        let mut payload = b"entry".to_vec();
        payload.extend_from_slice(index.as_bytes());
        assert_eq!(
            state_leaf_hash(b"entry", &index),
            compute_hash(HashPrefix::LeafNode, &payload)
        );
        assert_ne!(state_leaf_hash(b"entry", &index), transaction_leaf_hash(b"entry", &index));
    }
}
