//! Parsing, reduction and insertion search for S/K/I combinator terms.

pub mod evaluator;
pub mod parser;
pub mod prelude;
pub mod printer;
pub mod search;
pub mod term;

pub use evaluator::{equivalent, simplify, DivergenceError, Limits};
pub use parser::{parse, MalformedInputError};
pub use printer::stringify;
pub use search::{find_transform, Search, SearchConfig, SearchReport};
pub use term::{Atom, Term};
