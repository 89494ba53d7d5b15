use std::{collections::HashSet, iter::once};

use crate::{
    evaluator::{self, simplify_with, Limits},
    term::{Atom, Term},
};

/// Combinators the search is allowed to insert.
pub const INSERTABLE: [Atom; 2] = [Atom::S, Atom::K];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SearchConfig {
    /// Maximum number of insertions applied to the start term.
    pub max_depth: usize,
    pub limits: Limits,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            limits: Limits::default(),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct SearchReport {
    pub found: Option<Term>,
    /// Depth of `found`, or the last depth explored when nothing matched.
    pub depth: usize,
    /// Distinct candidates that were checked.
    pub generated: usize,
    /// Candidates skipped because an identical term was already checked.
    pub duplicates: usize,
    /// Candidates whose check ran into a reduction ceiling.
    pub diverged: usize,
}

fn inserted(elements: &[Term], position: usize, atom: Atom) -> Term {
    Term::sequence(
        elements[..position]
            .iter()
            .cloned()
            .chain(once(atom.into()))
            .chain(elements[position..].iter().cloned()),
    )
}

fn replaced(elements: &[Term], index: usize, child: Term) -> Term {
    Term::sequence(
        elements
            .iter()
            .enumerate()
            .map(|(i, e)| if i == index { child.clone() } else { e.clone() }),
    )
}

/// Every term reachable from `term` by inserting one combinator from
/// [`INSERTABLE`], either into the top-level sequence or into any nested one.
///
/// Inserting an atom right before an identical atom gives the same term as
/// inserting it right after, so that position is skipped.
pub fn variants(term: &Term) -> Vec<Term> {
    let elements = term.elements();
    let mut out = vec![];
    for atom in INSERTABLE {
        for position in 0..=elements.len() {
            if elements.get(position) == Some(&Term::Atom(atom)) {
                continue;
            }
            out.push(inserted(elements, position, atom));
        }
    }
    for (index, child) in elements.iter().enumerate() {
        if let Term::Sequence(_) = child {
            for variant in variants(child) {
                out.push(replaced(elements, index, variant));
            }
        }
    }
    out
}

pub struct Search<'a> {
    config: SearchConfig,
    args: &'a [Term],
    target: Term,
    seen: HashSet<Term>,
    report: SearchReport,
}

impl<'a> Search<'a> {
    /// Prepares a search for a term `C` with `C args` equivalent to `target`.
    ///
    /// Fails only if `target` itself has no normal form within the limits.
    pub fn new(config: SearchConfig, args: &'a [Term], target: &Term) -> evaluator::Result<Self> {
        Ok(Self {
            config,
            args,
            target: simplify_with(target, &config.limits)?,
            seen: HashSet::new(),
            report: SearchReport::default(),
        })
    }

    fn matches(&mut self, candidate: &Term) -> Option<bool> {
        match simplify_with(&candidate.apply(self.args), &self.config.limits) {
            Ok(normal) => Some(normal == self.target),
            Err(e) => {
                tracing::trace!("{candidate}: {e}");
                self.report.diverged += 1;
                None
            }
        }
    }

    /// Breadth-first over the number of insertions, so the first match found
    /// uses as few insertions as possible.
    pub fn run(mut self, start: &Term) -> SearchReport {
        self.seen.insert(start.clone());
        if self.matches(start) == Some(true) {
            self.report.found = Some(start.clone());
            return self.report;
        }
        let mut frontier = vec![start.clone()];
        for depth in 1..=self.config.max_depth {
            self.report.depth = depth;
            let mut next = vec![];
            for candidate in &frontier {
                for variant in variants(candidate) {
                    if !self.seen.insert(variant.clone()) {
                        self.report.duplicates += 1;
                        continue;
                    }
                    self.report.generated += 1;
                    match self.matches(&variant) {
                        Some(true) => {
                            tracing::info!(depth, "found {variant}");
                            self.report.found = Some(variant);
                            return self.report;
                        }
                        Some(false) => next.push(variant),
                        None => {}
                    }
                }
            }
            tracing::debug!(
                depth,
                candidates = next.len(),
                generated = self.report.generated,
                duplicates = self.report.duplicates,
                diverged = self.report.diverged,
                "no match at this depth"
            );
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        self.report
    }
}

/// Searches for a term `C`, built from `start` by at most `max_depth`
/// insertions of `S` or `K`, such that `C` applied to `args` is equivalent to
/// `target`. `Ok(None)` means nothing was found within the bound.
pub fn find_transform(
    start: &Term,
    args: &[Term],
    target: &Term,
    max_depth: usize,
) -> evaluator::Result<Option<Term>> {
    let config = SearchConfig {
        max_depth,
        ..SearchConfig::default()
    };
    Ok(Search::new(config, args, target)?.run(start).found)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{evaluator::equivalent, parser::parse};

    fn term(s: &str) -> Term {
        parse(s).unwrap()
    }

    fn ab() -> Vec<Term> {
        vec![Term::var('a'), Term::var('b')]
    }

    fn printed(terms: Vec<Term>) -> Vec<String> {
        terms.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_variants() {
        assert_eq!(printed(variants(&term("SK"))), ["SSK", "SKS", "KSK", "SKK"]);
        assert_eq!(
            printed(variants(&term("a(b)"))),
            [
                "Sa(b)", "aS(b)", "a(b)S", "Ka(b)", "aK(b)", "a(b)K", "a(Sb)", "a(bS)", "a(Kb)",
                "a(bK)",
            ]
        );
        assert_eq!(printed(variants(&Term::var('x'))), ["Sx", "xS", "Kx", "xK"]);
    }

    #[test]
    fn test_find_swap() {
        let args = ab();
        let target = term("ba");
        let found = find_transform(&term("S(K(S(K)))K"), &args, &target, 2)
            .unwrap()
            .expect("swap is two insertions away");
        assert!(equivalent(&found.apply(&args), &target).unwrap());
        assert_eq!(found.size(), 7);
    }

    #[test]
    fn test_shallowest_depth_wins() {
        let args = ab();
        let report = Search::new(SearchConfig::default(), &args, &term("a"))
            .unwrap()
            .run(&term("SK"));
        assert_eq!(report.depth, 2);
        let found = report.found.unwrap();
        assert_eq!(found.size(), 4);
        assert!(equivalent(&found.apply(&args), &term("a")).unwrap());
    }

    #[test]
    fn test_start_already_matches() {
        let args = ab();
        let report = Search::new(SearchConfig::default(), &args, &term("a"))
            .unwrap()
            .run(&term("K"));
        assert_eq!(report.found, Some(term("K")));
        assert_eq!(report.depth, 0);
        assert_eq!(report.generated, 0);
    }

    #[test]
    fn test_not_found_within_bound() {
        let args = ab();
        let target = term("ba");
        assert_eq!(
            find_transform(&term("S(K(S(K)))K"), &args, &target, 1).unwrap(),
            None
        );
        // Insertion never creates groups, so a flat seed cannot build a swap.
        let report = Search::new(
            SearchConfig {
                max_depth: 3,
                ..SearchConfig::default()
            },
            &args,
            &target,
        )
        .unwrap()
        .run(&term("SK"));
        assert_eq!(report.found, None);
        assert_eq!(report.depth, 3);
        assert!(report.generated < 100);
        assert!(report.duplicates > 0);
    }

    #[test]
    fn test_divergent_candidates_are_skipped() {
        let args = vec![term("SII")];
        let report = Search::new(
            SearchConfig {
                max_depth: 1,
                limits: Limits {
                    max_steps: 200,
                    max_nesting: 64,
                },
            },
            &args,
            &term("x"),
        )
        .unwrap()
        .run(&term("SII"));
        assert_eq!(report.found, None);
        assert!(report.diverged >= 1);
        assert!(report.generated > 0);
    }

    #[test]
    fn test_divergent_target() {
        assert!(find_transform(&term("SK"), &ab(), &term("(SII)(SII)"), 2).is_err());
    }
}
