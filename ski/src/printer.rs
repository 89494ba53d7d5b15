use std::fmt::Write;

use crate::term::Term;

/// Renders `term` in the bracketed input syntax.
///
/// Nested sequences are always parenthesized. The outermost sequence is
/// left bare when `at_top_level` is set, so the output parses back into the
/// same tree.
pub fn stringify(term: &Term, at_top_level: bool) -> String {
    Printed { term, at_top_level }.to_string()
}

struct Printed<'a> {
    term: &'a Term,
    at_top_level: bool,
}

impl std::fmt::Display for Printed<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_term(f, self.term, self.at_top_level)
    }
}

fn write_term(out: &mut impl Write, term: &Term, at_top_level: bool) -> std::fmt::Result {
    match term {
        Term::Atom(atom) => write!(out, "{atom}"),
        Term::Sequence(elements) => {
            if !at_top_level {
                out.write_char('(')?;
            }
            for element in elements.iter() {
                write_term(out, element, false)?;
            }
            if !at_top_level {
                out.write_char(')')?;
            }
            Ok(())
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_term(f, self, true)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::Atom;

    #[test]
    fn test_stringify() {
        let term = Term::sequence([
            Atom::S.into(),
            Term::sequence([Atom::K.into(), Term::sequence([Atom::S.into(), Atom::I.into()])]),
            Atom::K.into(),
        ]);
        assert_eq!(stringify(&term, true), "S(K(SI))K");
        assert_eq!(stringify(&term, false), "(S(K(SI))K)");
        assert_eq!(format!("{term}"), "S(K(SI))K");
    }

    #[test]
    fn test_single_element_groups_keep_parentheses() {
        let term = Term::sequence([Term::var('a'), Term::sequence([Term::var('b')])]);
        assert_eq!(stringify(&term, true), "a(b)");
        assert_eq!(stringify(&Term::sequence([]), false), "()");
        assert_eq!(stringify(&Term::var('x'), false), "x");
    }
}
