use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Calendar dates treated as special events, with a display name for each.
///
/// Stored on disk as a plain JSON object of ISO dates:
/// ```json
/// {
///   "2019-11-28": "Thanksgiving",
///   "2019-12-25": "Christmas"
/// }
/// ```
///
/// The same calendar flags individual rows and classifies daily totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCalendar {
    events: BTreeMap<NaiveDate, String>,
}

impl EventCalendar {
    pub fn new(events: BTreeMap<NaiveDate, String>) -> Self {
        Self { events }
    }

    /// The US holidays covered by the 2019 sales data.
    pub fn us_holidays_2019() -> Self {
        let events = [
            ((2019, 1, 1), "New Year's Day"),
            ((2019, 7, 4), "Independence Day"),
            ((2019, 11, 28), "Thanksgiving"),
            ((2019, 12, 25), "Christmas"),
        ]
        .into_iter()
        .filter_map(|((y, m, d), name)| {
            NaiveDate::from_ymd_opt(y, m, d).map(|date| (date, name.to_string()))
        })
        .collect();

        Self { events }
    }

    /// Loads the calendar from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading event calendar {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("parsing event calendar {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let entries: HashMap<String, String> = serde_json::from_str(content)?;

        let events = entries
            .into_iter()
            .map(|(date, name)| {
                let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .with_context(|| format!("invalid event date '{}'", date))?;
                Ok((date, name))
            })
            .collect::<Result<_>>()?;

        Ok(Self { events })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.events.contains_key(&date)
    }

    /// Name of the event on `date`, if any.
    pub fn name(&self, date: NaiveDate) -> Option<&str> {
        self.events.get(&date).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventCalendar {
    fn default() -> Self {
        Self::us_holidays_2019()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_calendar() {
        let calendar = EventCalendar::default();
        assert_eq!(calendar.len(), 4);
        assert!(calendar.contains(date(2019, 12, 25)));
        assert!(calendar.contains(date(2019, 11, 28)));
        assert!(!calendar.contains(date(2019, 12, 24)));
        assert!(!calendar.contains(date(2020, 12, 25)));
        assert_eq!(calendar.name(date(2019, 7, 4)), Some("Independence Day"));
    }

    #[test]
    fn test_from_json() {
        let calendar =
            EventCalendar::from_json(r#"{"2020-02-14": "Valentine's Day", "2020-01-01": "New Year"}"#)
                .unwrap();
        assert_eq!(calendar.len(), 2);
        assert_eq!(calendar.name(date(2020, 2, 14)), Some("Valentine's Day"));
        assert_eq!(calendar.name(date(2020, 1, 1)), Some("New Year"));
        assert!(!calendar.is_empty());
    }

    #[test]
    fn test_from_json_rejects_bad_dates() {
        assert!(EventCalendar::from_json(r#"{"12/25/2019": "Christmas"}"#).is_err());
        assert!(EventCalendar::from_json("[]").is_err());
    }

    #[test]
    fn test_empty_calendar() {
        let calendar = EventCalendar::from_json("{}").unwrap();
        assert!(calendar.is_empty());
        assert_eq!(calendar.name(date(2019, 12, 25)), None);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("sales_report_test_events.json");
        std::fs::write(&path, r#"{"2019-12-31": "New Year's Eve"}"#).unwrap();

        let calendar = EventCalendar::load(&path).unwrap();
        assert!(calendar.contains(date(2019, 12, 31)));

        std::fs::remove_file(&path).unwrap();
    }
}
