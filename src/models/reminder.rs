use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Canonical reminder date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Canonical reminder time format, minute granularity.
pub const TIME_FORMAT: &str = "%H:%M";

/// A one-shot (date, time) pair. Both parts are always populated and in
/// canonical format; a partial reminder cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    date: String,
    time: String,
}

/// Raw reminder fields as typed into an edit form. Empty strings mean unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderInput {
    pub date: String,
    pub time: String,
}

impl ReminderInput {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }

    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn normalize(&self) -> Result<Option<Reminder>, TaskError> {
        Reminder::normalize(&self.date, &self.time)
    }
}

impl From<&Reminder> for ReminderInput {
    fn from(reminder: &Reminder) -> Self {
        Self::new(reminder.date(), reminder.time())
    }
}

impl Reminder {
    /// Applies the normalization rule: if either part is empty the result is
    /// "no reminder", otherwise both parts are reformatted canonically.
    pub fn normalize(date: &str, time: &str) -> Result<Option<Self>, TaskError> {
        let (date, time) = (date.trim(), time.trim());
        if date.is_empty() || time.is_empty() {
            return Ok(None);
        }

        let invalid = || TaskError::InvalidReminder {
            date: date.to_string(),
            time: time.to_string(),
        };
        let parsed_date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| invalid())?;
        let parsed_time = NaiveTime::parse_from_str(time, TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
            .map_err(|_| invalid())?;

        Ok(Some(Self::at(parsed_date.and_time(parsed_time))))
    }

    /// Reminder for the minute containing `moment`.
    pub fn at(moment: NaiveDateTime) -> Self {
        Self {
            date: moment.format(DATE_FORMAT).to_string(),
            time: moment.format(TIME_FORMAT).to_string(),
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    /// Exact-minute match against `now`. A reminder whose minute has passed
    /// is never due again.
    pub fn is_due_at(&self, now: NaiveDateTime) -> bool {
        self.date == now.format(DATE_FORMAT).to_string()
            && self.time == now.format(TIME_FORMAT).to_string()
    }

    /// Ordering key. Canonical formats make lexical order chronological.
    pub fn sort_key(&self) -> (&str, &str) {
        (&self.date, &self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moment(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").expect("valid moment")
    }

    #[test]
    fn test_partial_input_clears_reminder() {
        assert_eq!(Reminder::normalize("", "14:00"), Ok(None));
        assert_eq!(Reminder::normalize("2024-01-01", ""), Ok(None));
        assert_eq!(Reminder::normalize("  ", "  "), Ok(None));
    }

    #[test]
    fn test_full_input_is_canonicalized() {
        let reminder = Reminder::normalize("2024-01-01", "9:05:30")
            .expect("valid")
            .expect("populated");
        assert_eq!(reminder.date(), "2024-01-01");
        assert_eq!(reminder.time(), "09:05");
    }

    #[test]
    fn test_unparseable_input_is_rejected() {
        let err = Reminder::normalize("tomorrow", "14:00").unwrap_err();
        assert!(matches!(err, TaskError::InvalidReminder { .. }));
    }

    #[test]
    fn test_due_only_on_exact_minute() {
        let reminder = Reminder::normalize("2024-06-01", "09:00")
            .expect("valid")
            .expect("populated");
        assert!(reminder.is_due_at(moment("2024-06-01T09:00:00")));
        assert!(reminder.is_due_at(moment("2024-06-01T09:00:59")));
        assert!(!reminder.is_due_at(moment("2024-06-01T09:01:00")));
        assert!(!reminder.is_due_at(moment("2024-06-02T09:00:00")));
    }
}
