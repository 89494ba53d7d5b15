use std::rc::Rc;

#[derive(PartialEq, Eq, Hash, Clone, Copy, derive_more::Display, Debug)]
pub enum Atom {
    #[display(fmt = "S")]
    S,
    #[display(fmt = "K")]
    K,
    #[display(fmt = "I")]
    I,
    #[display(fmt = "{_0}")]
    Var(char),
}

impl From<char> for Atom {
    fn from(c: char) -> Self {
        match c {
            'S' => Atom::S,
            'K' => Atom::K,
            'I' => Atom::I,
            c => Atom::Var(c),
        }
    }
}

impl Atom {
    pub fn is_combinator(self) -> bool {
        !matches!(self, Atom::Var(_))
    }
}

/// A combinator expression.
///
/// `Sequence([a, b, c])` is the left-nested application `((a b) c)`.
/// Children are shared, so cloning a term never copies the tree.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum Term {
    Atom(Atom),
    Sequence(Rc<[Term]>),
}

impl From<Atom> for Term {
    fn from(atom: Atom) -> Self {
        Term::Atom(atom)
    }
}

impl Term {
    pub fn var(c: char) -> Self {
        Term::Atom(Atom::Var(c))
    }

    pub fn sequence(elements: impl IntoIterator<Item = Term>) -> Self {
        Term::Sequence(elements.into_iter().collect())
    }

    /// The children of a sequence, or the atom itself as a one-element slice.
    pub fn elements(&self) -> &[Term] {
        match self {
            Term::Atom(_) => std::slice::from_ref(self),
            Term::Sequence(elements) => elements,
        }
    }

    /// `self` applied to `args`, as one flat sequence.
    pub fn apply(&self, args: &[Term]) -> Term {
        Term::sequence(self.elements().iter().chain(args).cloned())
    }

    /// Number of atoms in the tree.
    pub fn size(&self) -> usize {
        match self {
            Term::Atom(_) => 1,
            Term::Sequence(elements) => elements.iter().map(Term::size).sum(),
        }
    }

    pub fn substitute(&self, lookup: &impl Fn(char) -> Option<Term>) -> Term {
        match self {
            Term::Atom(Atom::Var(c)) => lookup(*c).unwrap_or_else(|| self.clone()),
            Term::Atom(_) => self.clone(),
            Term::Sequence(elements) => {
                Term::sequence(elements.iter().map(|e| e.substitute(lookup)))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod strategy {
    use proptest::prelude::*;

    use super::*;

    /// Small random terms over a few combinators and variables.
    pub fn arb_term() -> impl Strategy<Value = Term> {
        let leaf = prop::sample::select(vec!['S', 'K', 'I', 'a', 'b', 'x'])
            .prop_map(|c| Term::Atom(Atom::from(c)));
        leaf.prop_recursive(4, 32, 5, |inner| {
            prop::collection::vec(inner, 0..5).prop_map(Term::sequence)
        })
    }
}
