use crate::{
    error::{Error, Result},
    window::{self, Bound, Window},
    Timestamp,
};
use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

/// Anchors produced by an expansion that has neither a repeat-until date
/// nor a window end.
pub const UNBOUNDED_CAP: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepeatChoice {
    pub rule: String,
    pub label: String,
}

impl RepeatChoice {
    fn new(rule: &str, label: &str) -> Self {
        RepeatChoice {
            rule: rule.to_owned(),
            label: label.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Zone naive dates and times are read in.
    pub timezone: Tz,
    /// `None` lets unbounded expansions run for as long as they are pulled.
    pub unbounded_cap: Option<usize>,
    /// `None` accepts any rule text the rule parser accepts.
    pub repeat_choices: Option<Vec<RepeatChoice>>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            timezone: chrono_tz::UTC,
            unbounded_cap: Some(UNBOUNDED_CAP),
            repeat_choices: Some(default_repeat_choices()),
        }
    }
}

impl Settings {
    pub fn localize(&self, naive: NaiveDateTime) -> Timestamp {
        window::localize(self.timezone, naive)
    }

    pub fn now(&self) -> Timestamp {
        Utc::now().with_timezone(&self.timezone)
    }

    pub fn window(
        &self,
        from: Option<impl Into<Bound>>,
        to: Option<impl Into<Bound>>,
    ) -> Result<Window> {
        Window::new(from.map(Into::into), to.map(Into::into), self.timezone)
    }

    pub(crate) fn check_repeat(&self, rule: &str) -> Result<()> {
        match &self.repeat_choices {
            Some(choices) if !choices.iter().any(|choice| choice.rule == rule) => {
                Err(Error::RepeatNotAllowed(rule.to_owned()))
            }
            _ => Ok(()),
        }
    }
}

pub fn default_repeat_choices() -> Vec<RepeatChoice> {
    vec![
        RepeatChoice::new("RRULE:FREQ=DAILY", "Daily"),
        RepeatChoice::new("RRULE:FREQ=WEEKLY", "Weekly"),
        RepeatChoice::new("RRULE:FREQ=MONTHLY", "Monthly"),
        RepeatChoice::new("RRULE:FREQ=YEARLY", "Yearly"),
    ]
}

/// Rule text for a frequency stored as an integer code
/// (0 yearly, 1 monthly, 2 weekly, 3 daily).
pub fn legacy_repeat(code: i64) -> Option<&'static str> {
    match code {
        0 => Some("RRULE:FREQ=YEARLY"),
        1 => Some("RRULE:FREQ=MONTHLY"),
        2 => Some("RRULE:FREQ=WEEKLY"),
        3 => Some("RRULE:FREQ=DAILY"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn defaults() {
        let settings = Settings::default();

        assert_eq!(settings.timezone, chrono_tz::UTC);
        assert_eq!(settings.unbounded_cap, Some(200));
        assert_eq!(settings.repeat_choices.map(|choices| choices.len()), Some(4));
    }

    #[test]
    fn deserializes_partial() {
        let settings: Settings = serde_json::from_str(
            r#"{ "timezone": "Europe/London", "unbounded_cap": null }"#,
        )
        .unwrap();

        assert_eq!(settings.timezone, chrono_tz::Europe::London);
        assert_eq!(settings.unbounded_cap, None);
        assert_eq!(settings.repeat_choices, Some(default_repeat_choices()));
    }

    #[test]
    fn free_text_choices() {
        let settings: Settings = serde_json::from_str(r#"{ "repeat_choices": null }"#).unwrap();
        assert!(settings.check_repeat("RRULE:FREQ=HOURLY;INTERVAL=6").is_ok());
    }

    #[test]
    fn restricted_choices() {
        let settings = Settings::default();

        assert!(settings.check_repeat("RRULE:FREQ=WEEKLY").is_ok());
        assert_eq!(
            settings.check_repeat("RRULE:FREQ=HOURLY"),
            Err(Error::RepeatNotAllowed("RRULE:FREQ=HOURLY".to_owned()))
        );
    }

    #[test]
    fn now_is_in_zone() {
        let settings = Settings {
            timezone: chrono_tz::Asia::Tokyo,
            ..Settings::default()
        };
        let now = settings.now();

        assert_eq!(now.timezone(), chrono_tz::Asia::Tokyo);
        assert_abs_diff_eq!(now.timestamp(), Utc::now().timestamp(), epsilon = 2);
    }

    #[test]
    fn window_in_zone() {
        let settings = Settings {
            timezone: chrono_tz::Asia::Tokyo,
            ..Settings::default()
        };
        let window = settings.window(Some(date(2016, 1, 1)), None::<Bound>).unwrap();

        assert_eq!(
            window.from_date(),
            Some(at_in(chrono_tz::Asia::Tokyo, 2016, 1, 1, 0, 0))
        );
        assert_eq!(window.to_date(), None);
    }

    #[test]
    fn legacy_codes() {
        assert_eq!(legacy_repeat(0), Some("RRULE:FREQ=YEARLY"));
        assert_eq!(legacy_repeat(3), Some("RRULE:FREQ=DAILY"));
        assert_eq!(legacy_repeat(7), None);
    }
}
