use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one logical record (trigger record or time slice) in a file.
///
/// Ordering is by record number first, then sequence number, so a
/// `BTreeSet<RecordId>` iterates records in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId {
    /// Trigger or time-slice number
    pub record_number: u64,
    /// Sequence number within a split record (0 when the record is not split)
    pub sequence_number: u32,
}

impl RecordId {
    /// Create a record identifier
    pub const fn new(record_number: u64, sequence_number: u32) -> Self {
        Self {
            record_number,
            sequence_number,
        }
    }

    /// Parse the part of a record group name that follows the record prefix.
    ///
    /// Accepts `<record_number>` or `<record_number>.<sequence_number>`; the
    /// sequence number defaults to 0 when absent.
    pub fn parse_suffix(suffix: &str) -> Option<Self> {
        let (rec, seq) = match suffix.split_once('.') {
            Some((rec, seq)) => (rec, Some(seq)),
            None => (suffix, None),
        };

        if !is_decimal(rec) {
            return None;
        }
        let record_number = rec.parse().ok()?;

        let sequence_number = match seq {
            Some(seq) if is_decimal(seq) => seq.parse().ok()?,
            Some(_) => return None,
            None => 0,
        };

        Some(Self::new(record_number, sequence_number))
    }
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl From<(u64, u32)> for RecordId {
    fn from((record_number, sequence_number): (u64, u32)) -> Self {
        Self::new(record_number, sequence_number)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.record_number, self.sequence_number)
    }
}
