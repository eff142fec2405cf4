use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{TypeError, TypeResult};

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident: $repr:ty, $kind:literal {
            $($variant:ident = $code:literal => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every variant in code order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Wire code.
            pub fn code(&self) -> $repr {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            /// JSON name.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            /// Fails with `UnknownCode` for unregistered codes.
            pub fn from_code(code: $repr) -> TypeResult<Self> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    other => Err(TypeError::UnknownCode {
                        kind: $kind,
                        code: u16::from(other),
                    }),
                }
            }

            /// Fails with `UnknownName` for unregistered names.
            pub fn from_name(name: &str) -> TypeResult<Self> {
                match name {
                    $($text => Ok(Self::$variant),)+
                    other => Err(TypeError::UnknownName {
                        kind: $kind,
                        name: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> TypeResult<Self> {
                Self::from_name(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.name())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_name(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

code_enum! {
    /// Transaction kinds known to this codec, keyed by the 16-bit wire code.
    TransactionType: u16, "transaction type" {
        Payment = 0 => "Payment",
        AccountSet = 3 => "AccountSet",
        SetRegularKey = 5 => "SetRegularKey",
        OfferCreate = 7 => "OfferCreate",
        OfferCancel = 8 => "OfferCancel",
        TrustSet = 20 => "TrustSet",
        EnableAmendment = 100 => "EnableAmendment",
        SetFee = 101 => "SetFee",
    }
}

impl TransactionType {
    /// Pseudo-transactions are injected by validators and carry no signature.
    pub fn is_pseudo(&self) -> bool {
        matches!(self, Self::EnableAmendment | Self::SetFee)
    }
}

code_enum! {
    /// State entry kinds, keyed by the 16-bit wire code.
    ///
    /// `GeneratorMap`, `Nickname` and `Contract` appear in old ledgers but
    /// have no field-set layout.
    LedgerEntryType: u16, "ledger entry type" {
        AccountRoot = 0x61 => "AccountRoot",
        DirectoryNode = 0x64 => "DirectoryNode",
        RippleState = 0x72 => "RippleState",
        Offer = 0x6F => "Offer",
        LedgerHashes = 0x68 => "LedgerHashes",
        Amendments = 0x66 => "Amendments",
        FeeSettings = 0x73 => "FeeSettings",
        GeneratorMap = 0x67 => "GeneratorMap",
        Nickname = 0x6E => "Nickname",
        Contract = 0x63 => "Contract",
    }
}

impl LedgerEntryType {
    /// Types retired before the current entry set; decodable but never built.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::GeneratorMap | Self::Nickname | Self::Contract)
    }
}

code_enum! {
    /// Outcome recorded in transaction metadata. Only success and the
    /// fee-claiming `tec` codes ever reach a closed ledger.
    TransactionResult: u8, "transaction result" {
        Success = 0 => "tesSUCCESS",
        Claim = 100 => "tecCLAIM",
        PathPartial = 101 => "tecPATH_PARTIAL",
        UnfundedAdd = 102 => "tecUNFUNDED_ADD",
        UnfundedOffer = 103 => "tecUNFUNDED_OFFER",
        UnfundedPayment = 104 => "tecUNFUNDED_PAYMENT",
        FailedProcessing = 105 => "tecFAILED_PROCESSING",
        DirFull = 121 => "tecDIR_FULL",
        InsufReserveLine = 122 => "tecINSUF_RESERVE_LINE",
        InsufReserveOffer = 123 => "tecINSUF_RESERVE_OFFER",
        NoDst = 124 => "tecNO_DST",
        NoDstInsufXrp = 125 => "tecNO_DST_INSUF_XRP",
        NoLineInsufReserve = 126 => "tecNO_LINE_INSUF_RESERVE",
        NoLineRedundant = 127 => "tecNO_LINE_REDUNDANT",
        PathDry = 128 => "tecPATH_DRY",
        Unfunded = 129 => "tecUNFUNDED",
        MasterDisabled = 130 => "tecMASTER_DISABLED",
        NoRegularKey = 131 => "tecNO_REGULAR_KEY",
        Owners = 132 => "tecOWNERS",
        NoIssuer = 133 => "tecNO_ISSUER",
        NoAuth = 134 => "tecNO_AUTH",
        NoLine = 135 => "tecNO_LINE",
        InsuffFee = 136 => "tecINSUFF_FEE",
        Frozen = 137 => "tecFROZEN",
        NoTarget = 138 => "tecNO_TARGET",
        NoPermission = 139 => "tecNO_PERMISSION",
        NoEntry = 140 => "tecNO_ENTRY",
        InsufficientReserve = 141 => "tecINSUFFICIENT_RESERVE",
    }
}

impl TransactionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_names_are_bijective() {
        for t in TransactionType::ALL {
            assert_eq!(TransactionType::from_code(t.code()).unwrap(), *t);
            assert_eq!(TransactionType::from_name(t.name()).unwrap(), *t);
        }
        for t in LedgerEntryType::ALL {
            assert_eq!(LedgerEntryType::from_code(t.code()).unwrap(), *t);
            assert_eq!(LedgerEntryType::from_name(t.name()).unwrap(), *t);
        }
        for r in TransactionResult::ALL {
            assert_eq!(TransactionResult::from_code(r.code()).unwrap(), *r);
            assert_eq!(TransactionResult::from_name(r.name()).unwrap(), *r);
        }
    }

    #[test]
    fn unknown_codes_are_reported() {
        assert_eq!(
            TransactionType::from_code(1),
            Err(TypeError::UnknownCode {
                kind: "transaction type",
                code: 1
            })
        );
        let err = LedgerEntryType::from_name("Escrow").unwrap_err();
        assert!(err.to_string().contains("Escrow"));
        assert!(TransactionResult::from_code(99).is_err());
    }

    #[test]
    fn serde_uses_names() {
        let json = serde_json::to_string(&TransactionType::OfferCreate).unwrap();
        assert_eq!(json, "\"OfferCreate\"");
        let parsed: TransactionResult = serde_json::from_str("\"tecPATH_DRY\"").unwrap();
        assert_eq!(parsed.code(), 128);
    }

    #[test]
    fn legacy_and_pseudo_markers() {
        assert!(LedgerEntryType::Contract.is_legacy());
        assert!(!LedgerEntryType::Offer.is_legacy());
        assert!(TransactionType::SetFee.is_pseudo());
        assert!(!TransactionType::Payment.is_pseudo());
    }
}
