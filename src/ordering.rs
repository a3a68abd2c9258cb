use crate::{Occurs, Timestamp, Window};

/// When something next happens. Things that never happen again sort after
/// everything that does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    At(Timestamp),
    Never,
}

/// The start of the first occurrence at or after `from`, or of the very first
/// occurrence when there is no `from`.
pub fn sort_key<'a, T>(item: &'a T, from: Option<Timestamp>) -> SortKey
where
    T: Occurs,
    T::Data: 'a,
{
    let window = from.map_or_else(Window::unbounded, Window::starting);

    item.occurrences(window)
        .next()
        .map_or(SortKey::Never, |occ| SortKey::At(occ.start))
}

/// Orders `items` by [`sort_key`]. Equal keys keep their input order.
pub fn sort_by_next<'a, T>(
    items: impl IntoIterator<Item = &'a T>,
    from: Option<Timestamp>,
) -> Vec<&'a T>
where
    T: Occurs + 'a,
    T::Data: 'a,
{
    let mut keyed: Vec<_> = items
        .into_iter()
        .map(|item| (sort_key(item, from), item))
        .collect();
    keyed.sort_by_key(|(key, _)| *key);

    keyed.into_iter().map(|(_, item)| item).collect()
}
