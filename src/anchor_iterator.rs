use crate::Timestamp;
use std::iter::Peekable;

/// Where an anchor sequence stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum End {
    /// Stop at the first anchor at or after this instant.
    Until(Timestamp),
    /// Stop after this many anchors.
    Count(usize),
    Never,
}

impl End {
    /// The earlier of two exclusive limits. When both are open the sequence
    /// is cut after `cap` anchors instead, if there is a cap.
    pub(crate) fn earliest(a: Option<Timestamp>, b: Option<Timestamp>, cap: Option<usize>) -> End {
        match (a, b) {
            (Some(a), Some(b)) => End::Until(a.min(b)),
            (Some(until), None) | (None, Some(until)) => End::Until(until),
            (None, None) => cap.map_or(End::Never, End::Count),
        }
    }
}

/// Ascending anchors from `from` on, with repeats dropped, cut off at `end`.
///
/// `Until` is checked before anchors below `from` are skipped, so a lower
/// bound past the end of a finite rule doesn't pull forever. A `Count` only
/// counts anchors at or after `from`.
pub(crate) struct AnchorIterator<I> {
    dates: I,
    from: Option<Timestamp>,
    end: End,
    last: Option<Timestamp>,
}

impl<I> AnchorIterator<I> {
    pub(crate) fn new(dates: I, from: Option<Timestamp>, end: End) -> Self {
        AnchorIterator {
            dates,
            from,
            end,
            last: None,
        }
    }
}

impl<I: Iterator<Item = Timestamp>> Iterator for AnchorIterator<I> {
    type Item = Timestamp;

    fn next(&mut self) -> Option<Timestamp> {
        loop {
            if let End::Count(0) = self.end {
                return None;
            }

            let date = self.dates.next()?;
            if self.last == Some(date) {
                continue;
            }

            if let End::Until(until) = self.end {
                if date >= until {
                    self.end = End::Count(0);
                    return None;
                }
            }

            if self.from.map_or(false, |from| date < from) {
                continue;
            }

            match self.end {
                End::Count(ref mut count) => {
                    *count -= 1;
                    if *count == 0 {
                        tracing::debug!(last = %date, "anchor cap reached, expansion stops here");
                    }
                }
                _ => {}
            }

            self.last = Some(date);
            return Some(date);
        }
    }
}

/// Interleaves two ascending sequences into one ascending sequence.
pub(crate) struct MergeAscending<A: Iterator, B: Iterator> {
    left: Peekable<A>,
    right: Peekable<B>,
}

impl<A, B> MergeAscending<A, B>
where
    A: Iterator<Item = Timestamp>,
    B: Iterator<Item = Timestamp>,
{
    pub(crate) fn new(left: A, right: B) -> Self {
        MergeAscending {
            left: left.peekable(),
            right: right.peekable(),
        }
    }
}

impl<A, B> Iterator for MergeAscending<A, B>
where
    A: Iterator<Item = Timestamp>,
    B: Iterator<Item = Timestamp>,
{
    type Item = Timestamp;

    fn next(&mut self) -> Option<Timestamp> {
        match (self.left.peek().copied(), self.right.peek().copied()) {
            (Some(left), Some(right)) if right < left => self.right.next(),
            (Some(_), _) => self.left.next(),
            (None, _) => self.right.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn count_limit() {
        let dates = (1..=10).map(|day| at(2016, 1, day, 7, 0));
        let count = AnchorIterator::new(dates, None, End::Count(3)).count();

        assert_eq!(3, count);
    }

    #[test]
    fn until_is_exclusive() {
        let dates = (1..=10).map(|day| at(2016, 1, day, 7, 0));
        let anchors: Vec<_> =
            AnchorIterator::new(dates, None, End::Until(at(2016, 1, 3, 7, 0))).collect();

        assert_eq!(anchors, vec![at(2016, 1, 1, 7, 0), at(2016, 1, 2, 7, 0)]);
    }

    #[test]
    fn stops_pulling_after_until() {
        let mut pulled = 0;
        let dates = (1..=10).map(|day| {
            pulled += 1;
            at(2016, 1, day, 7, 0)
        });
        let mut anchors = AnchorIterator::new(dates, None, End::Until(at(2016, 1, 2, 0, 0)));

        assert!(anchors.next().is_some());
        assert!(anchors.next().is_none());
        assert!(anchors.next().is_none());
        drop(anchors);
        assert_eq!(pulled, 2);
    }

    #[test]
    fn skips_below_from() {
        let dates = (1..=10).map(|day| at(2016, 1, day, 7, 0));
        let anchors: Vec<_> =
            AnchorIterator::new(dates, Some(at(2016, 1, 8, 0, 0)), End::Count(2)).collect();

        assert_eq!(anchors, vec![at(2016, 1, 8, 7, 0), at(2016, 1, 9, 7, 0)]);
    }

    #[test]
    fn until_before_from_ends_without_skipping() {
        let mut pulled = 0;
        let dates = (1..).map(|day| {
            pulled += 1;
            at(2016, 1, 1, 7, 0) + chrono::Duration::days(day)
        });
        let anchors = AnchorIterator::new(
            dates,
            Some(at(2017, 1, 1, 0, 0)),
            End::Until(at(2016, 1, 5, 0, 0)),
        );

        assert_eq!(anchors.count(), 0);
        assert_eq!(pulled, 4);
    }

    #[test]
    fn skips_repeated() {
        let dates = vec![at(2016, 1, 1, 7, 0), at(2016, 1, 1, 7, 0), at(2016, 1, 2, 7, 0)];
        let anchors: Vec<_> = AnchorIterator::new(dates.into_iter(), None, End::Count(2)).collect();

        assert_eq!(anchors, vec![at(2016, 1, 1, 7, 0), at(2016, 1, 2, 7, 0)]);
    }

    #[test]
    fn earliest_prefers_tighter_limit() {
        let a = at(2016, 1, 3, 0, 0);
        let b = at(2016, 1, 5, 0, 0);

        assert_eq!(End::earliest(Some(b), Some(a), Some(5)), End::Until(a));
        assert_eq!(End::earliest(None, Some(b), Some(5)), End::Until(b));
        assert_eq!(End::earliest(None, None, Some(5)), End::Count(5));
        assert_eq!(End::earliest(None, None, None), End::Never);
    }

    #[test]
    fn merges_in_order() {
        let left = vec![at(2016, 1, 1, 7, 0), at(2016, 1, 3, 7, 0)];
        let right = vec![at(2016, 1, 2, 7, 0), at(2016, 1, 3, 7, 0), at(2016, 1, 4, 7, 0)];

        let merged: Vec<_> = MergeAscending::new(left.into_iter(), right.into_iter()).collect();

        assert_eq!(
            merged,
            vec![
                at(2016, 1, 1, 7, 0),
                at(2016, 1, 2, 7, 0),
                at(2016, 1, 3, 7, 0),
                at(2016, 1, 3, 7, 0),
                at(2016, 1, 4, 7, 0),
            ]
        );
    }
}
