use crate::{
    filter::{self, Approximate, Predicate},
    ordering,
    set::Set,
    Occurrence, Occurs, Timestamp, Window,
};
use chrono::Utc;

/// Many items that are filtered and sorted by when they happen.
///
/// Only [`Collection::items`] is required. A collection kept in a store
/// overrides [`Collection::candidates`] to run the [`Predicate`] as a query
/// instead of testing every item in memory.
pub trait Collection {
    type Item: Occurs + Approximate;

    fn items(&self) -> Vec<&Self::Item>;

    /// Items that pass `predicate`. Over-including is fine, missing an item
    /// that passes is not.
    fn candidates(&self, predicate: &Predicate) -> Vec<&Self::Item> {
        self.items()
            .into_iter()
            .filter(|item| item.may_occur(predicate))
            .collect()
    }

    /// The merged occurrences of every item in `window`. Items that start
    /// together come out in collection order.
    fn all_occurrences<'a>(
        &'a self,
        window: Window,
    ) -> impl Iterator<Item = Occurrence<'a, <Self::Item as Occurs>::Data>> + 'a
    where
        <Self::Item as Occurs>::Data: 'a,
    {
        self.candidates(&Predicate::for_window(&window))
            .into_iter()
            .collect::<Set<'a, Self::Item>>()
            .occurrences(window)
    }

    /// Items that may occur in `window`. With `exact` the rules of every
    /// candidate are expanded to drop those that don't.
    fn filter_by_period<'a>(&'a self, window: Window, exact: bool) -> Vec<&'a Self::Item>
    where
        <Self::Item as Occurs>::Data: 'a,
    {
        let candidates = self.candidates(&Predicate::for_window(&window));

        if exact {
            filter::exact(candidates, window)
        } else {
            candidates
        }
    }

    /// Items ordered by their next occurrence at or after `from`, which
    /// defaults to now. Items that never occur again come last.
    fn sort_by_next<'a>(&'a self, from: Option<Timestamp>) -> Vec<&'a Self::Item>
    where
        <Self::Item as Occurs>::Data: 'a,
    {
        let from = from.unwrap_or_else(|| Utc::now().with_timezone(&chrono_tz::UTC));
        ordering::sort_by_next(self.items(), Some(from))
    }
}

impl<T> Collection for [T]
where
    T: Occurs + Approximate,
{
    type Item = T;

    fn items(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<T> Collection for Vec<T>
where
    T: Occurs + Approximate,
{
    type Item = T;

    fn items(&self) -> Vec<&T> {
        self.iter().collect()
    }
}
