use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Exact-match, case-sensitive title. Uniqueness among non-deleted books is
/// enforced opportunistically by the service layer, not by storage.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookTitle(String);

impl BookTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }
}
