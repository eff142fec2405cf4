use rpl_types::{Account, Currency, Hash256};

use crate::hasher::sha512_half;

/// Two-byte space tags keeping ledger indexes of different entry kinds apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LedgerNamespace {
    Account,
    DirectoryNode,
    RippleState,
    Offer,
    OwnerDirectory,
    BookDirectory,
    SkipList,
    Amendments,
    FeeSettings,
}

impl LedgerNamespace {
    /// The tag as written ahead of the key material.
    pub const fn code(&self) -> u16 {
        let c = match self {
            Self::Account => b'a',
            Self::DirectoryNode => b'd',
            Self::RippleState => b'r',
            Self::Offer => b'o',
            Self::OwnerDirectory => b'O',
            Self::BookDirectory => b'B',
            Self::SkipList => b's',
            Self::Amendments => b'f',
            Self::FeeSettings => b'e',
        };
        c as u16
    }

    fn index(&self, parts: &[&[u8]]) -> Hash256 {
        let mut buf = self.code().to_be_bytes().to_vec();
        for part in parts {
            buf.extend_from_slice(part);
        }
        sha512_half(&buf)
    }
}

/// Index of an account's root entry.
pub fn account_root_index(account: &Account) -> Hash256 {
    LedgerNamespace::Account.index(&[account.as_bytes()])
}

/// Index of the first page of an account's owner directory.
pub fn owner_directory_index(account: &Account) -> Hash256 {
    LedgerNamespace::OwnerDirectory.index(&[account.as_bytes()])
}

/// Trust line between two accounts; argument order does not matter.
pub fn ripple_state_index(a: &Account, b: &Account, currency: &Currency) -> Hash256 {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    LedgerNamespace::RippleState.index(&[low.as_bytes(), high.as_bytes(), currency.as_bytes()])
}

/// Index of the offer created by `account` at `sequence`.
pub fn offer_index(account: &Account, sequence: u32) -> Hash256 {
    LedgerNamespace::Offer.index(&[account.as_bytes(), &sequence.to_be_bytes()])
}

/// The singleton amendments entry.
pub fn amendments_index() -> Hash256 {
    LedgerNamespace::Amendments.index(&[])
}

/// The singleton fee settings entry.
pub fn fee_settings_index() -> Hash256 {
    LedgerNamespace::FeeSettings.index(&[])
}

/// The singleton skip list holding the most recent 256 ledger hashes.
pub fn skip_list_index() -> Hash256 {
    LedgerNamespace::SkipList.index(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_indexes() {
        assert_eq!(
            fee_settings_index().to_hex(),
            "4BC50C9B0D8515D3EAAE1E74B29A95804346C491EE1A95BF25E4AAB854A6A651"
        );
        assert_eq!(
            amendments_index().to_hex(),
            "7DB0788C020F02780A673DC74757F23823FA3014C1866E72CC4CD8B226CD6EF4"
        );
        assert_eq!(
            skip_list_index().to_hex(),
            "B4979A36CDC7F3D3D5C31A4EAE2AC7D7209DDA877588B9AFC66799692AB0D66B"
        );
    }

    #[test]
    fn account_root_hashes_namespace_and_id() {
        let account = Account::from_array([5; 20]);
        let mut preimage = vec![0x00, b'a'];
        preimage.extend_from_slice(&[5; 20]);
        assert_eq!(account_root_index(&account), sha512_half(&preimage));
        assert_ne!(account_root_index(&account), owner_directory_index(&account));
    }

    #[test]
    fn ripple_state_is_symmetric() {
        let a = Account::from_array([1; 20]);
        let b = Account::from_array([2; 20]);
        let usd = Currency::from_code("USD").unwrap();
        assert_eq!(ripple_state_index(&a, &b, &usd), ripple_state_index(&b, &a, &usd));
        let eur = Currency::from_code("EUR").unwrap();
        assert_ne!(ripple_state_index(&a, &b, &usd), ripple_state_index(&a, &b, &eur));
    }

    #[test]
    fn offer_index_depends_on_sequence() {
        let a = Account::from_array([7; 20]);
        assert_ne!(offer_index(&a, 1), offer_index(&a, 2));
        let mut preimage = vec![0x00, b'o'];
        preimage.extend_from_slice(&[7; 20]);
        preimage.extend_from_slice(&hex::decode("00000001").unwrap());
        assert_eq!(offer_index(&a, 1), sha512_half(&preimage));
    }
}
