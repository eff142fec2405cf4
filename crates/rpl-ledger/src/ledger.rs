use std::sync::OnceLock;

use rpl_binary::{BinaryConfig, BinaryError, BoundedReader};
use rpl_crypto::ContentHasher;
use rpl_types::{Hash256, RippleTime};
use serde::{Deserialize, Serialize};

use crate::entry::LedgerEntry;
use crate::error::{LedgerError, LedgerResult};
use crate::txm::TransactionWithMetaData;

/// The fixed-layout part of a ledger that its hash is taken over.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerHeader {
    pub ledger_sequence: u32,
    /// Total XRP in existence, in drops.
    pub total_drops: u64,
    pub parent_hash: Hash256,
    /// Root of the transaction tree.
    pub transaction_hash: Hash256,
    /// Root of the account state tree.
    pub account_hash: Hash256,
    pub parent_close_time: RippleTime,
    pub close_time: RippleTime,
    /// Close time rounding, in seconds.
    pub close_resolution: u8,
    /// Bit 0 set when validators disagreed on the close time.
    pub close_flags: u8,
}

impl LedgerHeader {
    /// Serialized length in bytes.
    pub const LEN: usize = 118;

    /// The 118 byte big-endian layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LEN);
        out.extend_from_slice(&self.ledger_sequence.to_be_bytes());
        out.extend_from_slice(&self.total_drops.to_be_bytes());
        out.extend_from_slice(self.parent_hash.as_bytes());
        out.extend_from_slice(self.transaction_hash.as_bytes());
        out.extend_from_slice(self.account_hash.as_bytes());
        out.extend_from_slice(&self.parent_close_time.seconds().to_be_bytes());
        out.extend_from_slice(&self.close_time.seconds().to_be_bytes());
        out.push(self.close_resolution);
        out.push(self.close_flags);
        out
    }

    /// Fails on short input and on trailing bytes.
    pub fn from_bytes(bytes: &[u8], config: &BinaryConfig) -> LedgerResult<Self> {
        if bytes.len() > config.max_message_size {
            return Err(BinaryError::MessageTooLarge {
                size: bytes.len(),
                max: config.max_message_size,
            }
            .into());
        }
        let mut r = BoundedReader::from_slice(bytes);
        let header = Self {
            ledger_sequence: u32::from_be_bytes(r.read_array()?),
            total_drops: u64::from_be_bytes(r.read_array()?),
            parent_hash: Hash256::from_array(r.read_array()?),
            transaction_hash: Hash256::from_array(r.read_array()?),
            account_hash: Hash256::from_array(r.read_array()?),
            parent_close_time: RippleTime::new(u32::from_be_bytes(r.read_array()?)),
            close_time: RippleTime::new(u32::from_be_bytes(r.read_array()?)),
            close_resolution: r.read_byte()?,
            close_flags: r.read_byte()?,
        };
        r.finish("ledger header")?;
        Ok(header)
    }

    /// Ledger-master hash over the header bytes.
    pub fn hash(&self) -> Hash256 {
        ContentHasher::LEDGER_MASTER.hash(&self.to_bytes())
    }
}

/// A closed ledger: header, transactions and state entries.
///
/// The ledger hash depends only on the header. It is cached on first use;
/// replacing or editing the header drops the cache.
#[derive(Clone, Debug)]
pub struct Ledger {
    header: LedgerHeader,
    /// Set once the ledger has closed.
    pub closed: bool,
    /// Set once the closed ledger is accepted.
    pub accepted: bool,
    transactions: Vec<TransactionWithMetaData>,
    account_state: Vec<LedgerEntry>,
    hash: OnceLock<Hash256>,
}

impl PartialEq for Ledger {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header
            && self.closed == other.closed
            && self.accepted == other.accepted
            && self.transactions == other.transactions
            && self.account_state == other.account_state
    }
}

impl Eq for Ledger {}

impl Ledger {
    /// An open ledger with no transactions or state.
    pub fn new(header: LedgerHeader) -> Self {
        Self {
            header,
            closed: false,
            accepted: false,
            transactions: Vec::new(),
            account_state: Vec::new(),
            hash: OnceLock::new(),
        }
    }

    pub fn header(&self) -> &LedgerHeader {
        &self.header
    }

    /// Mutable access to the header. Drops the cached hash.
    pub fn header_mut(&mut self) -> &mut LedgerHeader {
        self.hash.take();
        &mut self.header
    }

    /// Replace the header. Drops the cached hash.
    pub fn set_header(&mut self, header: LedgerHeader) {
        self.hash.take();
        self.header = header;
    }

    pub fn sequence(&self) -> u32 {
        self.header.ledger_sequence
    }

    pub fn transactions(&self) -> &[TransactionWithMetaData] {
        &self.transactions
    }

    pub fn account_state(&self) -> &[LedgerEntry] {
        &self.account_state
    }

    /// Append a transaction. The ledger hash does not depend on it.
    pub fn push_transaction(&mut self, txm: TransactionWithMetaData) {
        self.transactions.push(txm);
    }

    /// Append a state entry. The ledger hash does not depend on it.
    pub fn push_entry(&mut self, entry: LedgerEntry) {
        self.account_state.push(entry);
    }

    /// Seed the hash cache with a value declared by the source document.
    pub fn set_hash(&mut self, hash: Hash256) {
        self.hash = OnceLock::from(hash);
    }

    /// The declared hash if one was set, otherwise the header hash.
    pub fn hash(&self) -> Hash256 {
        *self.hash.get_or_init(|| self.header.hash())
    }

    /// Check the cached hash against the header.
    pub fn verify_hash(&self) -> LedgerResult<()> {
        let computed = self.header.hash();
        match self.hash.get() {
            Some(declared) if *declared != computed => Err(LedgerError::HashMismatch {
                declared: *declared,
                computed,
            }),
            _ => Ok(()),
        }
    }
}
