use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};

/// Seconds between the UNIX epoch and 2000-01-01T00:00:00Z.
pub const RIPPLE_EPOCH_OFFSET: i64 = 946_684_800;

const HUMAN_FORMAT: &str = "%Y-%b-%d %H:%M:%S";

/// Ledger close time: seconds since 2000-01-01T00:00:00Z.
///
/// Serializes as the raw integer; [`RippleTime::human`] gives the
/// `2013-Jan-01 03:21:10` form the server adds next to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RippleTime(pub u32);

impl RippleTime {
    pub fn new(seconds: u32) -> Self {
        Self(seconds)
    }

    /// Seconds since 2000-01-01T00:00:00Z.
    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// As a UTC instant.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(i64::from(self.0) + RIPPLE_EPOCH_OFFSET, 0)
    }

    /// Fails for instants before the epoch or past the 32-bit range.
    pub fn from_datetime(dt: DateTime<Utc>) -> TypeResult<Self> {
        let seconds = dt.timestamp() - RIPPLE_EPOCH_OFFSET;
        u32::try_from(seconds).map(Self).map_err(|_| TypeError::InvalidTime {
            input: dt.to_rfc3339(),
            reason: "outside the 32-bit ledger clock".into(),
        })
    }

    /// `2013-Jan-01 03:21:10`, as the server writes next to close times.
    pub fn human(&self) -> String {
        self.to_string()
    }

    /// Parse the `YYYY-Mon-DD HH:MM:SS` UTC form.
    pub fn parse_human(s: &str) -> TypeResult<Self> {
        let naive = NaiveDateTime::parse_from_str(s, HUMAN_FORMAT).map_err(|e| TypeError::InvalidTime {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_datetime(naive.and_utc())
    }
}

impl fmt::Display for RippleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format(HUMAN_FORMAT)),
            None => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_year_2000() {
        assert_eq!(RippleTime(0).human(), "2000-Jan-01 00:00:00");
    }

    #[test]
    fn known_close_time() {
        let t = RippleTime(410_325_670);
        assert_eq!(t.human(), "2013-Jan-01 03:21:10");
        assert_eq!(RippleTime::parse_human("2013-Jan-01 03:21:10").unwrap(), t);
    }

    #[test]
    fn bad_human_text_fails() {
        assert!(matches!(
            RippleTime::parse_human("yesterday"),
            Err(TypeError::InvalidTime { .. })
        ));
        assert!(RippleTime::parse_human("1999-Dec-31 23:59:59").is_err());
    }

    #[test]
    fn serializes_as_integer() {
        assert_eq!(serde_json::to_string(&RippleTime(5)).unwrap(), "5");
    }
}
