use crate::{definition::Definition, event::Event, Occurs, Timestamp, Window};

/// A test over the stored fields of a definition (`start`, `end` and whether
/// it repeats), without expanding its rule.
///
/// A store can translate this into a range query. It never rejects a
/// definition that occurs in the window it was built for, but it may accept
/// repeating definitions that don't.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Every part holds. Empty is always true.
    All(Vec<Predicate>),
    /// Some part holds. Empty is always false.
    Any(Vec<Predicate>),
    StartsBefore(Timestamp),
    StartsAtOrAfter(Timestamp),
    EndsAfter(Timestamp),
    Repeats,
}

impl Predicate {
    pub fn for_window(window: &Window) -> Self {
        let mut parts = Vec::new();

        // occurrences never precede the start, so this one is exact
        if let Some(to) = window.to_date() {
            parts.push(Predicate::StartsBefore(to));
        }

        if let Some(from) = window.from_date() {
            parts.push(Predicate::Any(vec![
                Predicate::Repeats,
                Predicate::EndsAfter(from),
                Predicate::StartsAtOrAfter(from),
            ]));
        }

        Predicate::All(parts)
    }

    pub fn evaluate<P>(&self, definition: &Definition<P>) -> bool {
        match self {
            Predicate::All(parts) => parts.iter().all(|part| part.evaluate(definition)),
            Predicate::Any(parts) => parts.iter().any(|part| part.evaluate(definition)),
            Predicate::StartsBefore(to) => definition.start() < *to,
            Predicate::StartsAtOrAfter(from) => definition.start() >= *from,
            Predicate::EndsAfter(from) => definition.end() > *from,
            Predicate::Repeats => definition.is_repeating(),
        }
    }
}

/// Something a store could keep or drop with a [`Predicate`].
pub trait Approximate {
    fn may_occur(&self, predicate: &Predicate) -> bool;
}

impl<P> Approximate for Definition<P> {
    fn may_occur(&self, predicate: &Predicate) -> bool {
        predicate.evaluate(self)
    }
}

/// A parent is kept when any of its definitions is.
impl<P> Approximate for Event<P> {
    fn may_occur(&self, predicate: &Predicate) -> bool {
        self.definitions()
            .iter()
            .any(|definition| definition.may_occur(predicate))
    }
}

/// Keeps the candidates that really have an occurrence in `window`.
///
/// Every candidate's rule is expanded up to its first occurrence in the
/// window, so this costs as much as the rules are expensive. An unbounded
/// window keeps everything.
pub fn exact<'a, T>(candidates: Vec<&'a T>, window: Window) -> Vec<&'a T>
where
    T: Occurs,
    T::Data: 'a,
{
    if window.is_unbounded() {
        return candidates;
    }

    let total = candidates.len();
    tracing::debug!(candidates = total, ?window, "checking candidates exactly");

    let kept: Vec<_> = candidates
        .into_iter()
        .filter(|candidate| candidate.occurrences(window).next().is_some())
        .collect();

    tracing::debug!(candidates = total, kept = kept.len(), "exact check done");
    kept
}
