use std::marker::PhantomData;
use vodca::{AsRefln, Fromln};

/// Soft-deletion flag. Raised records stay in storage, drop out of listings
/// and id lookups, and leave their title free for revival.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct IsDeleted<T>(bool, PhantomData<T>);

impl<T> IsDeleted<T> {
    pub fn new(value: impl Into<bool>) -> Self {
        IsDeleted(value.into(), PhantomData)
    }
}
