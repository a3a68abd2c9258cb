use crate::{Occurrence, Occurs, Timestamp, Window};
use std::{cmp::Reverse, collections::BinaryHeap};

/// The time-ordered union of several sources' occurrences.
///
/// Occurrences starting at the same time come out in the order their
/// sources were added.
pub struct Set<'a, S> {
    sources: Vec<&'a S>,
}

impl<S> Default for Set<'_, S> {
    fn default() -> Self {
        Set {
            sources: Vec::new(),
        }
    }
}

impl<'a, S> FromIterator<&'a S> for Set<'a, S> {
    fn from_iter<I: IntoIterator<Item = &'a S>>(sources: I) -> Self {
        Set {
            sources: sources.into_iter().collect(),
        }
    }
}

impl<'a, S> Set<'a, S>
where
    S: Occurs,
    S::Data: 'a,
{
    pub fn new() -> Self {
        Set::default()
    }

    pub fn source(mut self, source: &'a S) -> Self {
        self.sources.push(source);
        self
    }

    /// Merges each source's occurrences in `window`, pulling from a source
    /// only when its current candidate has been yielded.
    pub fn occurrences(
        &self,
        window: Window,
    ) -> impl Iterator<Item = Occurrence<'a, S::Data>> + 'a {
        let mut min_heap: BinaryHeap<_> = self
            .sources
            .iter()
            .copied()
            .enumerate()
            .filter_map(|(index, source)| {
                let mut iter = source.occurrences(window);
                iter.next()
                    .map(|cursor| Reverse(IterHolder { cursor, index, iter }))
            })
            .collect();

        std::iter::from_fn(move || {
            let Reverse(IterHolder {
                cursor,
                index,
                mut iter,
            }) = min_heap.pop()?;

            if let Some(next) = iter.next() {
                min_heap.push(Reverse(IterHolder {
                    cursor: next,
                    index,
                    iter,
                }));
            }

            Some(cursor)
        })
    }

    pub fn first(&self) -> Option<Occurrence<'a, S::Data>> {
        self.occurrences(Window::unbounded()).next()
    }

    pub fn next_after(&self, from: Timestamp) -> Option<Occurrence<'a, S::Data>> {
        self.occurrences(Window::starting(from)).next()
    }
}

/// Holds an iterator and the latest occurrence that came out of it
struct IterHolder<'a, P, I> {
    cursor: Occurrence<'a, P>,
    index: usize,
    iter: I,
}

impl<P, I> IterHolder<'_, P, I> {
    fn key(&self) -> (Timestamp, usize) {
        (self.cursor.start, self.index)
    }
}

impl<P, I> Eq for IterHolder<'_, P, I> {}

impl<P, I> PartialEq for IterHolder<'_, P, I> {
    fn eq(&self, other: &Self) -> bool {
        self.key().eq(&other.key())
    }
}

impl<P, I> PartialOrd for IterHolder<'_, P, I> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<P, I> Ord for IterHolder<'_, P, I> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}
