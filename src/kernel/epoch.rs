use serde::{Serialize, Deserialize};

/// Issue-order sequence number of a job-list fetch.
/// Snapshots are ordered by when their fetch was *issued*, never by arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FetchSeq(pub u64);

impl FetchSeq {
    pub fn first() -> Self {
        FetchSeq(1)
    }

    pub fn next(&self) -> Self {
        FetchSeq(self.0 + 1)
    }
}
