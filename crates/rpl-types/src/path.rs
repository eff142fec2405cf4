use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::amount::Currency;

/// One hop of a payment path. At least one part should be present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathStep {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Account>,
}

impl PathStep {
    /// Flag bit: an account follows.
    pub const ACCOUNT_BIT: u8 = 0x01;
    /// Flag bit: a currency follows.
    pub const CURRENCY_BIT: u8 = 0x10;
    /// Flag bit: an issuer follows.
    pub const ISSUER_BIT: u8 = 0x20;

    /// Wire flag byte naming which parts follow.
    pub fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.account.is_some() {
            flags |= Self::ACCOUNT_BIT;
        }
        if self.currency.is_some() {
            flags |= Self::CURRENCY_BIT;
        }
        if self.issuer.is_some() {
            flags |= Self::ISSUER_BIT;
        }
        flags
    }
}

/// One path: the hops in order.
pub type Path = Vec<PathStep>;

/// Alternative paths a cross-currency payment may take.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathSet(pub Vec<Path>);

impl PathSet {
    /// Separates two paths on the wire.
    pub const PATH_BOUNDARY: u8 = 0xFF;
    /// Terminates the set on the wire.
    pub const END: u8 = 0x00;

    pub fn new(paths: Vec<Path>) -> Self {
        Self(paths)
    }

    /// True when there are no paths.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paths(&self) -> &[Path] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_follow_present_parts() {
        let step = PathStep {
            account: Some(Account::from_array([1; 20])),
            currency: None,
            issuer: Some(Account::from_array([2; 20])),
        };
        assert_eq!(step.flags(), 0x21);
        assert_eq!(PathStep::default().flags(), 0);
    }

    #[test]
    fn json_omits_absent_parts() {
        let step = PathStep {
            currency: Some(Currency::from_code("USD").unwrap()),
            ..Default::default()
        };
        let set = PathSet::new(vec![vec![step]]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"[[{"currency":"USD"}]]"#);
    }

    #[test]
    fn json_ignores_server_annotations() {
        let set: PathSet =
            serde_json::from_str(r#"[[{"currency":"USD","type":16,"type_hex":"0000000000000010"}]]"#)
                .unwrap();
        assert_eq!(set.paths()[0][0].flags(), PathStep::CURRENCY_BIT);
    }
}
