use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot id handed out by the node for `evm_snapshot`
///
/// The value is opaque; it is only ever sent back in `evm_revert`. A snapshot
/// is single-use, so restoring takes the checkpoint by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checkpoint(String);

impl Checkpoint {
    pub fn from_id(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
