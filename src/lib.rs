//! Occurrences of one-off and repeating events.
//!
//! A [`Definition`] is a `(start, end)` pair with an optional repeat rule.
//! Expanding it inside a [`Window`] yields [`Occurrence`]s lazily, in start
//! order; an [`Event`] merges the occurrences of all its definitions, and a
//! [`Collection`] filters and sorts many events by when they happen.

mod anchor_iterator;
pub mod collection;
pub mod definition;
mod error;
pub mod event;
pub mod filter;
pub mod ordering;
pub mod rule;
pub mod set;
pub mod settings;
pub mod window;

#[cfg(test)]
mod test_helpers;

pub use collection::Collection;
pub use definition::Definition;
pub use error::{Error, Result};
pub use event::Event;
pub use filter::{Approximate, Predicate};
pub use ordering::SortKey;
pub use rule::Rule;
pub use set::Set;
pub use settings::Settings;
pub use window::{Bound, Window};

use chrono::Utc;

/// Every computed time is zone-aware.
pub type Timestamp = chrono::DateTime<chrono_tz::Tz>;

/// One happening of a definition, with the data attached to it.
#[derive(Debug, PartialEq, Eq)]
pub struct Occurrence<'a, P> {
    pub start: Timestamp,
    pub end: Timestamp,
    pub data: &'a P,
}

impl<P> Clone for Occurrence<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Occurrence<'_, P> {}

impl<P> Occurrence<'_, P> {
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

/// Anything with a start-ordered stream of occurrences.
pub trait Occurs {
    type Data;

    /// Occurrences overlapping `window`, ascending by start. Every call
    /// starts a fresh sequence.
    fn occurrences<'a>(
        &'a self,
        window: Window,
    ) -> impl Iterator<Item = Occurrence<'a, Self::Data>> + 'a
    where
        Self::Data: 'a;

    fn first_occurrence<'a>(&'a self) -> Option<Occurrence<'a, Self::Data>>
    where
        Self::Data: 'a,
    {
        self.occurrences(Window::unbounded()).next()
    }

    /// The first occurrence in `window`. An open lower bound means now.
    fn next_occurrence<'a>(&'a self, window: Window) -> Option<Occurrence<'a, Self::Data>>
    where
        Self::Data: 'a,
    {
        let now = Utc::now().with_timezone(&chrono_tz::UTC);
        self.occurrences(window.or_starting(now)).next()
    }
}
