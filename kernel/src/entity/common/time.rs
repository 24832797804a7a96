use std::marker::PhantomData;

use time::OffsetDateTime;
use vodca::{AsRefln, Fromln};

/// Moment a record was soft-deleted. Present exactly while the deletion flag
/// is raised and cleared again on revival.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct DeletedAt<T>(OffsetDateTime, PhantomData<T>);

impl<T> DeletedAt<T> {
    pub fn new(time: impl Into<OffsetDateTime>) -> Self {
        Self(time.into(), PhantomData)
    }
}
