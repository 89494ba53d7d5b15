use chumsky::prelude::*;
use thiserror::Error;

use crate::{
    prelude::*,
    term::{Atom, Term},
};

pub trait SimpleParser<I: Clone + std::hash::Hash, O>:
    Parser<I, O, Error = Error<I>> + Clone
{
}
impl<I: Clone + std::hash::Hash, O, T> SimpleParser<I, O> for T where
    T: Parser<I, O, Error = Error<I>> + Clone
{
}

#[derive(Debug, Error)]
#[error("malformed input: {}", display_errors(.errors))]
pub struct MalformedInputError {
    pub errors: Vec<Error>,
}

fn display_errors(errors: &[Error]) -> String {
    errors
        .iter()
        .map(|e| format!("{e} at {}..{}", e.span().start, e.span().end))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Deepest group nesting accepted; terms are walked recursively downstream.
pub const MAX_GROUP_NESTING: usize = 4096;

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
enum Token {
    LParen,
    RParen,
    Atom(Atom),
}

fn is_atom(c: &char) -> bool {
    !c.is_whitespace() && *c != '(' && *c != ')'
}

fn lexer() -> impl SimpleParser<char, Vec<(Token, Span)>> {
    let token = choice((
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        filter(is_atom).map(|c| Token::Atom(Atom::from(c))),
    ));
    text::whitespace()
        .ignore_then(token.map_with_span(|t, span| (t, span)).padded().repeated())
        .then_ignore(end())
}

// Groups are matched with an explicit stack so nesting depth never
// translates into native recursion.
fn build(tokens: Vec<(Token, Span)>, eoi: Span) -> Result<Vec<Term>, Vec<Error>> {
    let mut open: Vec<(Span, Vec<Term>)> = vec![];
    let mut current = vec![];
    for (token, span) in tokens {
        match token {
            Token::Atom(atom) => current.push(Term::Atom(atom)),
            Token::LParen => {
                if open.len() >= MAX_GROUP_NESTING {
                    return Err(vec![Error::custom(
                        span,
                        format!("groups nested deeper than {MAX_GROUP_NESTING} levels"),
                    )]);
                }
                open.push((span, std::mem::take(&mut current)));
            }
            Token::RParen => match open.pop() {
                Some((_, parent)) => {
                    let group = std::mem::replace(&mut current, parent);
                    current.push(Term::sequence(group));
                }
                None => return Err(vec![Error::expected_input_found(span, [None], Some(')'))]),
            },
        }
    }
    match open.pop() {
        Some((span, _)) => Err(vec![Error::unclosed_delimiter(span, '(', eoi, ')', None)]),
        None => Ok(current),
    }
}

/// Parses a whole input into a sequence; `parse("x")` is `[x]`, not `x`.
pub fn parse(s: &str) -> Result<Term, MalformedInputError> {
    let len = s.chars().count();
    let eoi = Span {
        start: len,
        end: len + 1,
    };
    lexer()
        .parse(s)
        .and_then(|tokens| build(tokens, eoi))
        .map(Term::sequence)
        .map_err(|errors| MalformedInputError { errors })
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;
    use crate::{evaluator::simplify, printer::stringify, term::strategy::arb_term};

    fn seq(elements: impl IntoIterator<Item = Term>) -> Term {
        Term::sequence(elements)
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            parse("S(K(SI))K").unwrap(),
            seq([
                Atom::S.into(),
                seq([Atom::K.into(), seq([Atom::S.into(), Atom::I.into()])]),
                Atom::K.into(),
            ])
        );
        assert_eq!(parse("x").unwrap(), seq([Term::var('x')]));
        assert_eq!(parse("(K)").unwrap(), seq([seq([Atom::K.into()])]));
        assert_eq!(parse("").unwrap(), seq([]));
        assert_eq!(parse("()").unwrap(), seq([seq([])]));
    }

    #[test]
    fn test_whitespace_is_insignificant() {
        assert_eq!(parse(" S ( K x ) y ").unwrap(), parse("S(Kx)y").unwrap());
        assert_eq!(parse("( )").unwrap(), parse("()").unwrap());
        assert_eq!(parse("   ").unwrap(), parse("").unwrap());
    }

    #[test]
    fn test_unbalanced() {
        assert!(parse("a)").is_err());
        assert!(parse("(a").is_err());
        assert!(parse("((a)").is_err());
        assert!(parse(")(").is_err());
        let err = parse("ab)c").unwrap_err();
        assert_eq!(err.errors[0].span(), 2..3);
        assert!(err.to_string().starts_with("malformed input"));
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 2000;
        let input = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        let term = parse(&input).unwrap();
        assert_eq!(term.size(), 1);
        assert_eq!(stringify(&term, false).len(), input.len() + 2);
        assert_eq!(simplify(&term).unwrap(), Term::var('x'));

        let too_deep = "(".repeat(MAX_GROUP_NESTING + 1);
        let err = parse(&too_deep).unwrap_err();
        assert_eq!(err.errors[0].span(), MAX_GROUP_NESTING..MAX_GROUP_NESTING + 1);
        assert!(parse(&"(".repeat(depth)).is_err());
    }

    proptest! {
        #[test]
        fn test_round_trip(elements in prop::collection::vec(arb_term(), 0..6)) {
            let term = Term::sequence(elements);
            let printed = stringify(&term, true);
            let reparsed = parse(&printed).unwrap();
            prop_assert_eq!(&reparsed, &term);
            prop_assert_eq!(parse(&stringify(&reparsed, true)).unwrap(), reparsed);
        }
    }
}
