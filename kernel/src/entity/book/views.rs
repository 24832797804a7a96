use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Accumulated read-path views. Never decreases; the only sanctioned mutation
/// is a single step through [`ViewCount::increment`] or the storage-level
/// atomic increment the repository exposes.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct ViewCount(i64);

impl ViewCount {
    pub fn new(views: impl Into<i64>) -> Self {
        Self(views.into())
    }

    pub fn increment(&self) -> Self {
        Self(self.0 + 1)
    }
}
