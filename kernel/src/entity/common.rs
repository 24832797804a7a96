mod flag;
mod page;
mod time;

pub use self::{flag::*, page::*, time::*};
