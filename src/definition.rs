use crate::{
    anchor_iterator::End,
    error::{Error, Result},
    rule::Rule,
    settings::Settings,
    window::{self, Window},
    Occurrence, Occurs, Timestamp,
};
use chrono::{Duration, NaiveDate};

/// The optional repeat fields of a [`Definition`].
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Rule text. Empty or `None` means the definition happens once.
    pub repeat: Option<String>,
    /// Last day, inclusive, a repetition may start on.
    pub repeat_until: Option<NaiveDate>,
    /// Anchors to suppress. Only exact matches are removed.
    pub exceptions: Vec<Timestamp>,
    /// One-off anchors on top of the rule.
    pub additions: Vec<Timestamp>,
}

/// A `(start, end)` pair that happens once or repeats, carrying `data` into
/// each of its occurrences.
///
/// Every repetition keeps the length of the first one.
#[derive(Debug, Clone)]
pub struct Definition<P = ()> {
    start: Timestamp,
    end: Timestamp,
    rule: Option<Rule>,
    repeat_until: Option<NaiveDate>,
    unbounded_cap: Option<usize>,
    data: P,
}

impl<P> Definition<P> {
    pub fn new(start: Timestamp, end: Timestamp, data: P) -> Result<Self> {
        Definition::with_settings(start, end, Options::default(), data, &Settings::default())
    }

    /// A definition without length.
    pub fn instant(at: Timestamp, data: P) -> Self {
        Definition {
            start: at,
            end: at,
            rule: None,
            repeat_until: None,
            unbounded_cap: None,
            data,
        }
    }

    /// Validates against the default [`Settings`], which only allow the
    /// daily, weekly, monthly and yearly rules.
    pub fn repeating(start: Timestamp, end: Timestamp, options: Options, data: P) -> Result<Self> {
        Definition::with_settings(start, end, options, data, &Settings::default())
    }

    pub fn with_settings(
        start: Timestamp,
        end: Timestamp,
        options: Options,
        data: P,
        settings: &Settings,
    ) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidDefinition("end must not be before start"));
        }

        let repeat = options.repeat.filter(|text| !text.trim().is_empty());
        let rule = match repeat {
            Some(text) => {
                settings.check_repeat(&text)?;

                if let Some(until) = options.repeat_until {
                    if until < start.date_naive() {
                        return Err(Error::invalid_rule(
                            &text,
                            format!("repeat until {until} is before the first occurrence"),
                        ));
                    }
                }

                let mut rule = Rule::parse(&text, start)?;
                for at in options.exceptions {
                    rule = rule.except(at);
                }
                for at in options.additions {
                    rule = rule.add(at)?;
                }
                Some(rule)
            }
            None => {
                if options.repeat_until.is_some() {
                    return Err(Error::InvalidDefinition(
                        "repeat until needs a repeat rule",
                    ));
                }
                if !options.exceptions.is_empty() || !options.additions.is_empty() {
                    return Err(Error::InvalidDefinition(
                        "exceptions and additions need a repeat rule",
                    ));
                }
                None
            }
        };

        Ok(Definition {
            start,
            end,
            rule,
            repeat_until: options.repeat_until,
            unbounded_cap: settings.unbounded_cap,
            data,
        })
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn rule(&self) -> Option<&Rule> {
        self.rule.as_ref()
    }

    pub fn is_repeating(&self) -> bool {
        self.rule.is_some()
    }

    pub fn repeat_until(&self) -> Option<NaiveDate> {
        self.repeat_until
    }

    pub fn data(&self) -> &P {
        &self.data
    }

    /// Occurrences overlapping `window`, ascending by start.
    ///
    /// Anchors are looked up from `from - duration` so an occurrence already
    /// in progress at the start of the window is found. When neither the
    /// window nor `repeat_until` bounds a repeating definition, the sequence
    /// stops after the configured cap of anchors, if any.
    pub fn windowed_intervals(
        &self,
        window: Window,
    ) -> impl Iterator<Item = Occurrence<'_, P>> + '_ {
        let single = self.rule.is_none().then(|| self.occurrence_at(self.start));

        let repeated = self.rule.iter().flat_map(move |rule| {
            let lower = window.from_date().map(|from| from - self.duration());
            let end = End::earliest(window.to_date(), self.until_exclusive(), self.unbounded_cap);

            rule.expand_from(lower, end)
                .map(move |anchor| self.occurrence_at(anchor))
        });

        single
            .into_iter()
            .chain(repeated)
            .filter(move |occ| window.overlaps(occ.start, occ.end))
    }

    pub fn first_interval(&self) -> Option<Occurrence<'_, P>> {
        self.windowed_intervals(Window::unbounded()).next()
    }

    pub fn next_interval_after(&self, from: Timestamp) -> Option<Occurrence<'_, P>> {
        self.windowed_intervals(Window::starting(from)).next()
    }

    fn until_exclusive(&self) -> Option<Timestamp> {
        self.repeat_until.map(|until| {
            window::start_of_day(self.start.timezone(), until.succ_opt().unwrap_or(until))
        })
    }

    fn occurrence_at(&self, start: Timestamp) -> Occurrence<'_, P> {
        Occurrence {
            start,
            end: start + self.duration(),
            data: &self.data,
        }
    }
}

impl<P> Occurs for Definition<P> {
    type Data = P;

    fn occurrences<'a>(&'a self, window: Window) -> impl Iterator<Item = Occurrence<'a, P>> + 'a
    where
        P: 'a,
    {
        self.windowed_intervals(window)
    }
}
