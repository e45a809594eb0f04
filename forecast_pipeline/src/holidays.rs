//! Holiday calendars
//!
//! A [`HolidayCalendar`] maps dates to holiday labels. Callers build their own
//! calendars; [`country_holidays`] produces the fixed regional set an engine
//! registers when asked for a country's holidays.

use crate::data::DataLoader;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

/// Regions [`country_holidays`] knows about
pub const SUPPORTED_REGIONS: &[&str] = &["US"];

/// One labelled date and the days around it that share its effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEntry {
    pub label: String,
    pub days_before: u32,
    pub days_after: u32,
}

impl HolidayEntry {
    fn covers(&self, holiday: NaiveDate, date: NaiveDate) -> bool {
        let offset = (date - holiday).num_days();
        -(self.days_before as i64) <= offset && offset <= self.days_after as i64
    }
}

/// Dates labelled as holidays, each with its own window of affected days
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayCalendar {
    entries: BTreeMap<NaiveDate, Vec<HolidayEntry>>,
    /// Window given to entries inserted from now on
    days_before: u32,
    days_after: u32,
}

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a holiday; repeating a label on the same date replaces that entry
    pub fn with_holiday(mut self, date: NaiveDate, label: &str) -> Self {
        self.insert(date, label);
        self
    }

    pub fn insert(&mut self, date: NaiveDate, label: &str) {
        let entry = HolidayEntry {
            label: label.to_string(),
            days_before: self.days_before,
            days_after: self.days_after,
        };
        Self::push_entry(&mut self.entries, date, entry);
    }

    fn push_entry(
        entries: &mut BTreeMap<NaiveDate, Vec<HolidayEntry>>,
        date: NaiveDate,
        entry: HolidayEntry,
    ) {
        let on_date = entries.entry(date).or_default();
        match on_date.iter_mut().find(|e| e.label == entry.label) {
            Some(existing) => *existing = entry,
            None => on_date.push(entry),
        }
    }

    /// Extend every holiday of this calendar, and later insertions, to neighbouring days
    pub fn with_window(mut self, days_before: u32, days_after: u32) -> Self {
        self.days_before = days_before;
        self.days_after = days_after;
        for entry in self.entries.values_mut().flatten() {
            entry.days_before = days_before;
            entry.days_after = days_after;
        }
        self
    }

    /// Build a calendar from a DataFrame with `ds` (date) and `holiday` (label) columns
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let dates = DataLoader::timestamp_column(df, "ds")?;
        let labels = df.column("holiday").map_err(|e| {
            ForecastError::DataError(format!("Column 'holiday' not found: {}", e))
        })?;
        let labels = labels.cast(&DataType::Utf8)?;

        let mut calendar = Self::new();
        for (date, label) in dates.into_iter().zip(labels.utf8()?.into_iter()) {
            match (date, label) {
                (Some(date), Some(label)) => calendar.insert(date.date(), label),
                _ => {
                    return Err(ForecastError::DataError(
                        "Holiday table contains missing dates or labels".to_string(),
                    ))
                }
            }
        }

        Ok(calendar)
    }

    /// Number of (date, label) entries
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn window(&self) -> (u32, u32) {
        (self.days_before, self.days_after)
    }

    /// First label registered on `date`
    pub fn label(&self, date: NaiveDate) -> Option<&str> {
        self.entries
            .get(&date)
            .and_then(|entries| entries.first())
            .map(|e| e.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &HolidayEntry)> {
        self.entries
            .iter()
            .flat_map(|(d, entries)| entries.iter().map(move |e| (*d, e)))
    }

    /// Distinct labels in sorted order
    pub fn labels(&self) -> Vec<String> {
        self.iter()
            .map(|(_, e)| e.label.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Labels whose own window covers `date`
    pub fn labels_covering(&self, date: NaiveDate) -> Vec<&str> {
        let (widest_before, widest_after) = self
            .iter()
            .fold((0, 0), |(b, a), (_, e)| (b.max(e.days_before), a.max(e.days_after)));
        let start = date - Duration::days(widest_after as i64);
        let end = date + Duration::days(widest_before as i64);

        self.entries
            .range(start..=end)
            .flat_map(|(holiday, entries)| {
                entries
                    .iter()
                    .filter(move |e| e.covers(*holiday, date))
                    .map(|e| e.label.as_str())
            })
            .collect()
    }

    /// Union of two calendars; every entry keeps its own window.
    ///
    /// Different labels on a shared date are both kept. The same label on
    /// the same date takes `other`'s window.
    pub fn merged(&self, other: &HolidayCalendar) -> Self {
        let mut entries = self.entries.clone();
        for (date, entry) in other.iter() {
            Self::push_entry(&mut entries, date, entry.clone());
        }
        Self {
            entries,
            days_before: self.days_before,
            days_after: self.days_after,
        }
    }
}

/// Whether [`country_holidays`] can build a calendar for `region`
pub fn is_supported_region(region: &str) -> bool {
    SUPPORTED_REGIONS
        .iter()
        .any(|r| r.eq_ignore_ascii_case(region))
}

/// The fixed holiday set of `region` for every year in `years`
pub fn country_holidays(region: &str, years: RangeInclusive<i32>) -> Result<HolidayCalendar> {
    if !is_supported_region(region) {
        return Err(ForecastError::UnknownRegion(region.to_string()));
    }

    let mut calendar = HolidayCalendar::new();
    for year in years {
        us_holidays(&mut calendar, year)?;
    }
    Ok(calendar)
}

fn us_holidays(calendar: &mut HolidayCalendar, year: i32) -> Result<()> {
    let fixed = |month: u32, day: u32| {
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            ForecastError::DataError(format!("Invalid date {}-{}-{}", year, month, day))
        })
    };
    let nth = |month: u32, weekday: Weekday, n: u8| {
        NaiveDate::from_weekday_of_month_opt(year, month, weekday, n).ok_or_else(|| {
            ForecastError::DataError(format!(
                "No {:?} number {} in {}-{}",
                weekday, n, year, month
            ))
        })
    };

    add_observed(calendar, fixed(1, 1)?, "New Year's Day");
    if year >= 1986 {
        calendar.insert(nth(1, Weekday::Mon, 3)?, "Martin Luther King Jr. Day");
    }
    calendar.insert(nth(2, Weekday::Mon, 3)?, "Washington's Birthday");
    calendar.insert(last_weekday_of_month(year, 5, Weekday::Mon)?, "Memorial Day");
    if year >= 2021 {
        add_observed(calendar, fixed(6, 19)?, "Juneteenth National Independence Day");
    }
    add_observed(calendar, fixed(7, 4)?, "Independence Day");
    calendar.insert(nth(9, Weekday::Mon, 1)?, "Labor Day");
    calendar.insert(nth(10, Weekday::Mon, 2)?, "Columbus Day");
    add_observed(calendar, fixed(11, 11)?, "Veterans Day");
    calendar.insert(nth(11, Weekday::Thu, 4)?, "Thanksgiving");
    add_observed(calendar, fixed(12, 25)?, "Christmas Day");

    Ok(())
}

// Saturday holidays are observed the Friday before, Sunday holidays the Monday after.
fn add_observed(calendar: &mut HolidayCalendar, date: NaiveDate, label: &str) {
    calendar.insert(date, label);
    let observed = match date.weekday() {
        Weekday::Sat => Some(date - Duration::days(1)),
        Weekday::Sun => Some(date + Duration::days(1)),
        _ => None,
    };
    if let Some(observed) = observed {
        calendar.insert(observed, &format!("{} (observed)", label));
    }
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Result<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let mut day = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|first| first - Duration::days(1))
        .ok_or_else(|| ForecastError::DataError(format!("Invalid month {}-{}", year, month)))?;
    while day.weekday() != weekday {
        day -= Duration::days(1);
    }
    Ok(day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ObservationSeries;
    use crate::utils::parse_timestamp;

    fn date(s: &str) -> NaiveDate {
        parse_timestamp(s).unwrap().date()
    }

    #[test]
    fn test_us_2023() {
        let calendar = country_holidays("US", 2023..=2023).unwrap();

        assert_eq!(calendar.label(date("2023-11-23")), Some("Thanksgiving"));
        assert_eq!(calendar.label(date("2023-05-29")), Some("Memorial Day"));
        assert_eq!(
            calendar.label(date("2023-01-16")),
            Some("Martin Luther King Jr. Day")
        );
        assert_eq!(calendar.label(date("2023-09-04")), Some("Labor Day"));
        // New Year's Day 2023 fell on a Sunday
        assert_eq!(
            calendar.label(date("2023-01-02")),
            Some("New Year's Day (observed)")
        );
        // 2023-07-04 is a Tuesday
        assert_eq!(calendar.label(date("2023-07-03")), None);
    }

    #[test]
    fn test_saturday_observed_on_friday() {
        let calendar = country_holidays("us", 2020..=2020).unwrap();
        assert_eq!(
            calendar.label(date("2020-07-03")),
            Some("Independence Day (observed)")
        );
        // no Juneteenth before 2021
        assert_eq!(calendar.label(date("2020-06-19")), None);
    }

    #[test]
    fn test_unknown_region() {
        let result = country_holidays("Atlantis", 2020..=2021);
        assert!(matches!(result, Err(ForecastError::UnknownRegion(_))));
    }

    #[test]
    fn test_window_coverage() {
        let calendar = HolidayCalendar::new()
            .with_holiday(date("2023-12-25"), "christmas")
            .with_window(1, 2);

        assert_eq!(calendar.labels_covering(date("2023-12-24")), vec!["christmas"]);
        assert_eq!(calendar.labels_covering(date("2023-12-27")), vec!["christmas"]);
        assert!(calendar.labels_covering(date("2023-12-23")).is_empty());
        assert!(calendar.labels_covering(date("2023-12-28")).is_empty());
    }

    #[test]
    fn test_labels_are_distinct() {
        let calendar = HolidayCalendar::new()
            .with_holiday(date("2022-02-13"), "superbowl")
            .with_holiday(date("2023-02-12"), "superbowl")
            .with_holiday(date("2023-03-17"), "st_patricks");

        assert_eq!(calendar.labels(), vec!["st_patricks", "superbowl"]);
        assert_eq!(calendar.len(), 3);
    }

    #[test]
    fn test_from_dataframe() {
        let df = DataFrame::new(vec![
            Series::new("ds", &["2023-02-12", "2024-02-11"]),
            Series::new("holiday", &["superbowl", "superbowl"]),
        ])
        .unwrap();

        let calendar = HolidayCalendar::from_dataframe(&df).unwrap();
        assert_eq!(calendar.len(), 2);
        assert_eq!(calendar.label(date("2024-02-11")), Some("superbowl"));
    }

    #[test]
    fn test_from_dataframe_with_datetime_column() {
        let series = ObservationSeries::from_strings(&["2023-02-12", "2024-02-11"], vec![0.0, 0.0])
            .unwrap();
        let ds = series.to_dataframe().unwrap().column("ds").unwrap().clone();
        assert!(matches!(ds.dtype(), DataType::Datetime(_, _)));

        let df = DataFrame::new(vec![ds, Series::new("holiday", &["superbowl", "superbowl"])])
            .unwrap();
        let calendar = HolidayCalendar::from_dataframe(&df).unwrap();
        assert_eq!(calendar.len(), 2);
        assert_eq!(calendar.label(date("2023-02-12")), Some("superbowl"));

        let dates = DataFrame::new(vec![
            // 2023-02-12 as days since the epoch
            Series::new("ds", &[19400i32]).cast(&DataType::Date).unwrap(),
            Series::new("holiday", &["superbowl"]),
        ])
        .unwrap();
        assert_eq!(HolidayCalendar::from_dataframe(&dates).unwrap().len(), 1);
    }

    #[test]
    fn test_merge_keeps_each_window() {
        let regional = country_holidays("US", 2022..=2022).unwrap();
        let promo = HolidayCalendar::new()
            .with_holiday(date("2022-03-01"), "promo")
            .with_window(0, 3);
        let merged = regional.merged(&promo);

        assert_eq!(merged.labels_covering(date("2022-11-24")), vec!["Thanksgiving"]);
        assert!(merged.labels_covering(date("2022-11-26")).is_empty());
        assert_eq!(merged.labels_covering(date("2022-03-04")), vec!["promo"]);
        assert!(merged.labels_covering(date("2022-03-05")).is_empty());
    }

    #[test]
    fn test_merge_keeps_both_labels_on_shared_date() {
        let regional = country_holidays("US", 2022..=2022).unwrap();
        let own = HolidayCalendar::new().with_holiday(date("2022-11-25"), "black_friday");
        let shared = HolidayCalendar::new().with_holiday(date("2022-11-24"), "turkey_sale");
        let merged = regional.merged(&own).merged(&shared);

        assert_eq!(
            merged.labels_covering(date("2022-11-24")),
            vec!["Thanksgiving", "turkey_sale"]
        );
        assert_eq!(merged.len(), regional.len() + 2);
    }

    #[test]
    fn test_window_applies_to_later_inserts() {
        let mut calendar = HolidayCalendar::new().with_window(1, 0);
        calendar.insert(date("2023-07-04"), "fireworks");
        assert_eq!(calendar.labels_covering(date("2023-07-03")), vec!["fireworks"]);
        assert!(calendar.labels_covering(date("2023-07-05")).is_empty());
    }
}
