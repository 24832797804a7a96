use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

// I want to use primitive type(i32) in these fields, but default attribute not
// supported for literals(https://github.com/serde-rs/serde/issues/368)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct PageNumber(i32);

impl PageNumber {
    pub fn new(value: impl Into<i32>) -> Self {
        PageNumber(value.into())
    }

    /// Clamps non-positive page numbers back to the first page.
    pub fn normalized(self) -> Self {
        if self.0 < 1 {
            Self::default()
        } else {
            self
        }
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::new(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct PageSize(i32);

impl PageSize {
    pub fn new(value: impl Into<i32>) -> Self {
        PageSize(value.into())
    }

    /// Clamps non-positive sizes back to the default of 10 items.
    pub fn normalized(self) -> Self {
        if self.0 < 1 {
            Self::default()
        } else {
            self
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::new(10)
    }
}
