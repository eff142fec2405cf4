use serde::{Deserialize, Serialize};

/// What JSON decoding does with a transaction or ledger-entry type name it
/// does not know.
///
/// Binary decoding never consults this: an unknown code there is always an
/// error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownTypePolicy {
    /// Fail with an unknown-type error.
    #[default]
    Reject,
    /// Keep the object as an opaque field map and log a warning.
    Preserve,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rejects() {
        assert_eq!(UnknownTypePolicy::default(), UnknownTypePolicy::Reject);
        let p: UnknownTypePolicy = serde_json::from_str("\"preserve\"").unwrap();
        assert_eq!(p, UnknownTypePolicy::Preserve);
    }
}
