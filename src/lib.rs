pub mod cs;
pub mod error;

pub use cs::hashing;
pub use cs::hashing::{KeyCursor, OpenAddressingBuilder, OpenAddressingTable, ProbingStrategy};
pub use error::{Error, Result};
