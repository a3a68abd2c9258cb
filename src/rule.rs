use crate::{
    anchor_iterator::{AnchorIterator, End, MergeAscending},
    error::{Error, Result},
    window::Window,
    Timestamp,
};
use chrono::{Duration, Timelike as _};
use chrono_tz::Tz;
use rrule::RRuleSet;
use std::collections::BTreeSet;

/// A repeat rule anchored at the start of its definition.
///
/// The text uses RFC 5545 content lines (`RRULE`, `EXRULE`, `RDATE`,
/// `EXDATE`, one per line). A bare `FREQ=...` line is read as an `RRULE`.
/// Exceptions and additions given through [`Rule::except`] and [`Rule::add`]
/// must match generated anchors exactly to have any effect.
#[derive(Debug, Clone)]
pub struct Rule {
    text: String,
    dtstart: Timestamp,
    set: RRuleSet,
    exceptions: BTreeSet<Timestamp>,
    additions: BTreeSet<Timestamp>,
}

impl Rule {
    pub fn parse(text: &str, dtstart: Timestamp) -> Result<Self> {
        let mut lines = Vec::new();
        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let upper = line.to_ascii_uppercase();
            if upper.starts_with("DTSTART") {
                return Err(Error::invalid_rule(
                    text,
                    "the rule is anchored at the definition start and may not set DTSTART",
                ));
            }

            if upper.starts_with("FREQ=") {
                lines.push(format!("RRULE:{line}"));
            } else {
                lines.push(line.to_owned());
            }
        }

        let generates = lines.iter().any(|line| {
            let upper = line.to_ascii_uppercase();
            upper.starts_with("RRULE") || upper.starts_with("RDATE")
        });
        if !generates {
            return Err(Error::invalid_rule(text, "no RRULE or RDATE line"));
        }

        let set = format!("{}\n{}", dtstart_line(dtstart), lines.join("\n"))
            .parse::<RRuleSet>()
            .map_err(|err| Error::invalid_rule(text, err))?;

        tracing::trace!(rule = %text, dtstart = %dtstart, "compiled repeat rule");

        Ok(Rule {
            text: text.to_owned(),
            dtstart,
            set,
            exceptions: BTreeSet::new(),
            additions: BTreeSet::new(),
        })
    }

    /// Suppresses the anchor at exactly `at`.
    pub fn except(mut self, at: Timestamp) -> Self {
        self.exceptions.insert(at);
        self
    }

    /// Adds a one-off anchor. Anchors never precede the rule's start.
    pub fn add(mut self, at: Timestamp) -> Result<Self> {
        if at < self.dtstart {
            return Err(Error::invalid_rule(
                &self.text,
                format!("added date {at} is before the first occurrence {}", self.dtstart),
            ));
        }

        self.additions.insert(at.with_timezone(&self.timezone()));
        Ok(self)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn dtstart(&self) -> Timestamp {
        self.dtstart
    }

    /// The zone the rule repeats in; wall-clock times are kept across DST.
    pub fn timezone(&self) -> Tz {
        self.dtstart.timezone()
    }

    pub fn exceptions(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.exceptions.iter().copied()
    }

    pub fn additions(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.additions.iter().copied()
    }

    /// Anchors inside `window`, ascending and without repeats.
    ///
    /// With no upper bound the sequence only ends when the rule does.
    pub fn expand(&self, window: Window) -> impl Iterator<Item = Timestamp> + '_ {
        self.expand_from(window.from_date(), End::earliest(window.to_date(), None, None))
    }

    pub(crate) fn expand_from(
        &self,
        lower: Option<Timestamp>,
        end: End,
    ) -> impl Iterator<Item = Timestamp> + '_ {
        tracing::trace!(rule = %self.text, ?lower, ?end, "expanding repeat rule");

        let timezone = self.timezone();
        // the rule engine works in whole seconds
        let fraction = Duration::nanoseconds(i64::from(self.dtstart.nanosecond()));
        let generated = IntoIterator::into_iter(&self.set)
            .map(move |date| date.with_timezone(&timezone) + fraction);
        let exceptions = &self.exceptions;

        let anchors = MergeAscending::new(generated, self.additions.iter().copied())
            .filter(move |date| !exceptions.contains(date));

        AnchorIterator::new(anchors, lower, end)
    }
}

fn dtstart_line(dtstart: Timestamp) -> String {
    let dtstart = dtstart.with_nanosecond(0).unwrap_or(dtstart);
    let timezone = dtstart.timezone();

    if timezone == chrono_tz::UTC {
        format!("DTSTART:{}", dtstart.format("%Y%m%dT%H%M%SZ"))
    } else {
        format!(
            "DTSTART;TZID={}:{}",
            timezone.name(),
            dtstart.format("%Y%m%dT%H%M%S")
        )
    }
}
