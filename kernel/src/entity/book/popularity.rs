use serde::Serialize;
use vodca::{AsRefln, Fromln};

/// Derived ranking value. Computed on demand from view count and publication
/// age, attached to responses, never written back to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Fromln, AsRefln)]
pub struct PopularityScore(f64);

impl PopularityScore {
    pub fn new(score: impl Into<f64>) -> Self {
        Self(score.into())
    }
}
