pub mod open_addressing;
pub mod probing;

pub use open_addressing::{
    IntoIter, Iter, KeyCursor, Keys, OpenAddressingBuilder, OpenAddressingTable, Values,
    DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR,
};
pub use probing::{ProbeSequence, ProbingStrategy, DEFAULT_LINEAR_CONSTANT};
