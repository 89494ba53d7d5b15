use thiserror::Error;

use crate::term::{Atom, Term};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DivergenceError {
    #[error("reduction did not reach a normal form within {0} steps")]
    StepLimit(usize),
    #[error("reduction nested deeper than {0} levels")]
    NestingLimit(usize),
}
pub type Result<T> = std::result::Result<T, DivergenceError>;

/// Ceilings that turn a runaway reduction into a [`DivergenceError`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Limits {
    /// Rewrites allowed across one whole `simplify` call tree.
    pub max_steps: usize,
    /// Nested `simplify` calls allowed (argument normalization, `S`'s `y z`).
    pub max_nesting: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            max_nesting: 512,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Reduction {
    pub steps: usize,
}

struct Budget<'a> {
    limits: &'a Limits,
    steps: usize,
}

impl Budget<'_> {
    fn step(&mut self) -> Result<()> {
        self.steps += 1;
        if self.steps > self.limits.max_steps {
            return Err(DivergenceError::StepLimit(self.limits.max_steps));
        }
        Ok(())
    }

    fn enter(&self, nesting: usize) -> Result<usize> {
        if nesting >= self.limits.max_nesting {
            return Err(DivergenceError::NestingLimit(self.limits.max_nesting));
        }
        Ok(nesting + 1)
    }
}

// The spine is kept reversed: the head is the last element, its arguments
// follow below it in application order.
fn normalize(term: &Term, budget: &mut Budget, nesting: usize) -> Result<Term> {
    let mut spine: Vec<Term> = match term {
        Term::Atom(_) => return Ok(term.clone()),
        Term::Sequence(elements) => elements.iter().rev().cloned().collect(),
    };
    loop {
        let args = spine.len().saturating_sub(1);
        match spine.last() {
            None => return Ok(Term::sequence([])),
            Some(Term::Sequence(_)) => {
                budget.step()?;
                if let Some(Term::Sequence(contents)) = spine.pop() {
                    spine.extend(contents.iter().rev().cloned());
                }
            }
            Some(Term::Atom(Atom::I)) if args >= 1 => {
                budget.step()?;
                spine.pop();
            }
            Some(Term::Atom(Atom::K)) if args >= 2 => {
                budget.step()?;
                spine.pop();
                let x = spine.pop();
                spine.pop();
                spine.extend(x);
            }
            Some(Term::Atom(Atom::S)) if args >= 3 => {
                budget.step()?;
                let len = spine.len();
                let (x, y, z) = (
                    spine[len - 2].clone(),
                    spine[len - 3].clone(),
                    spine[len - 4].clone(),
                );
                spine.truncate(len - 4);
                let inner = budget.enter(nesting)?;
                let yz = normalize(&Term::sequence([y, z.clone()]), budget, inner)?;
                spine.extend([yz, z, x]);
            }
            Some(Term::Atom(_)) => break,
        }
        tracing::trace!(steps = budget.steps, "{}", spine_to_term(&spine));
    }

    // The head is stuck; only the arguments can still contain redexes.
    let head = spine.pop();
    let mut elements = Vec::with_capacity(spine.len() + 1);
    elements.extend(head);
    if !spine.is_empty() {
        let inner = budget.enter(nesting)?;
        while let Some(arg) = spine.pop() {
            elements.push(normalize(&arg, budget, inner)?);
        }
    }
    Ok(match <[Term; 1]>::try_from(elements) {
        Ok([single]) => single,
        Err(elements) => Term::sequence(elements),
    })
}

fn spine_to_term(spine: &[Term]) -> Term {
    Term::sequence(spine.iter().rev().cloned())
}

/// Reduces `term` to normal form, also reporting how many rewrites it took.
pub fn simplify_counted(term: &Term, limits: &Limits) -> Result<(Term, Reduction)> {
    let mut budget = Budget { limits, steps: 0 };
    let normal = normalize(term, &mut budget, 0)?;
    Ok((
        normal,
        Reduction {
            steps: budget.steps,
        },
    ))
}

pub fn simplify_with(term: &Term, limits: &Limits) -> Result<Term> {
    simplify_counted(term, limits).map(|(term, _)| term)
}

pub fn simplify(term: &Term) -> Result<Term> {
    simplify_with(term, &Limits::default())
}

/// Whether both terms have structurally identical normal forms.
pub fn equivalent_with(lhs: &Term, rhs: &Term, limits: &Limits) -> Result<bool> {
    Ok(simplify_with(lhs, limits)? == simplify_with(rhs, limits)?)
}

pub fn equivalent(lhs: &Term, rhs: &Term) -> Result<bool> {
    equivalent_with(lhs, rhs, &Limits::default())
}
