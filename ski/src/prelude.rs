pub type Span = std::ops::Range<usize>;

pub use chumsky::error::Error as _;
pub type Error<I = char> = chumsky::error::Simple<I, Span>;
