use serde::{Deserialize, Serialize};

/// Stable identifier of a ranked point of interest, owned by the application state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub u64);

impl CandidateId {
    pub fn new(n: u64) -> Self {
        CandidateId(n)
    }
}

impl std::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "candidate#{}", self.0)
    }
}
