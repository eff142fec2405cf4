/// Four-byte domain tags prepended to every hashed payload.
///
/// The first three bytes spell a mnemonic and the last is zero. No two
/// hashing contexts share a prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashPrefix {
    /// Transaction id over the full canonical transaction.
    TransactionId,
    /// Transaction-with-metadata tree leaf.
    TransactionNode,
    /// State tree leaf.
    LeafNode,
    /// Inner tree node over its 16 child hashes.
    InnerNode,
    /// Ledger header.
    LedgerMaster,
    /// Signing preimage of a transaction.
    TransactionSign,
    Validation,
    Proposal,
}

impl HashPrefix {
    /// Every prefix, in declaration order.
    pub const ALL: [HashPrefix; 8] = [
        Self::TransactionId,
        Self::TransactionNode,
        Self::LeafNode,
        Self::InnerNode,
        Self::LedgerMaster,
        Self::TransactionSign,
        Self::Validation,
        Self::Proposal,
    ];

    /// The prefix as a big-endian integer.
    pub const fn value(&self) -> u32 {
        match self {
            Self::TransactionId => 0x5458_4E00,
            Self::TransactionNode => 0x534E_4400,
            Self::LeafNode => 0x4D4C_4E00,
            Self::InnerNode => 0x4D49_4E00,
            Self::LedgerMaster => 0x4C57_5200,
            Self::TransactionSign => 0x5354_5800,
            Self::Validation => 0x5641_4C00,
            Self::Proposal => 0x5052_5000,
        }
    }

    pub const fn to_be_bytes(&self) -> [u8; 4] {
        self.value().to_be_bytes()
    }

    /// Three-letter mnemonic, e.g. `TXN`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::TransactionId => "TXN",
            Self::TransactionNode => "SND",
            Self::LeafNode => "MLN",
            Self::InnerNode => "MIN",
            Self::LedgerMaster => "LWR",
            Self::TransactionSign => "STX",
            Self::Validation => "VAL",
            Self::Proposal => "PRP",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_spell_the_tag() {
        for prefix in HashPrefix::ALL {
            let bytes = prefix.to_be_bytes();
            assert_eq!(&bytes[..3], prefix.tag().as_bytes());
            assert_eq!(bytes[3], 0);
        }
    }

    #[test]
    fn prefixes_are_distinct() {
        for (i, a) in HashPrefix::ALL.iter().enumerate() {
            for b in &HashPrefix::ALL[i + 1..] {
                assert_ne!(a.value(), b.value());
            }
        }
    }
}
