//! Weekly schedule of a habit: seven independent day-flags, one per weekday.
//!
//! The add-habit form submits a set of [`DayCode`]s; [`DayFlags::from_codes`]
//! turns that set into the flags stored on the habit row, and
//! [`DayFlags::is_scheduled`] answers whether a habit is due on a given day.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::habit::Habit;

/// Weekday codes as submitted by the day checkboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayCode {
    Sun,
    Mon,
    Tues,
    Wed,
    Thurs,
    Fri,
    Sat,
}

impl DayCode {
    /// Form order, Sunday first.
    pub const ALL: [DayCode; 7] = [
        DayCode::Sun,
        DayCode::Mon,
        DayCode::Tues,
        DayCode::Wed,
        DayCode::Thurs,
        DayCode::Fri,
        DayCode::Sat,
    ];

    pub fn weekday(self) -> Weekday {
        match self {
            DayCode::Sun => Weekday::Sun,
            DayCode::Mon => Weekday::Mon,
            DayCode::Tues => Weekday::Tue,
            DayCode::Wed => Weekday::Wed,
            DayCode::Thurs => Weekday::Thu,
            DayCode::Fri => Weekday::Fri,
            DayCode::Sat => Weekday::Sat,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayCode::Sun => "sun",
            DayCode::Mon => "mon",
            DayCode::Tues => "tues",
            DayCode::Wed => "wed",
            DayCode::Thurs => "thurs",
            DayCode::Fri => "fri",
            DayCode::Sat => "sat",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayCode::Sun => "Sunday",
            DayCode::Mon => "Monday",
            DayCode::Tues => "Tuesday",
            DayCode::Wed => "Wednesday",
            DayCode::Thurs => "Thursday",
            DayCode::Fri => "Friday",
            DayCode::Sat => "Saturday",
        }
    }
}

impl std::str::FromStr for DayCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or(())
    }
}

impl From<Weekday> for DayCode {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Sun => DayCode::Sun,
            Weekday::Mon => DayCode::Mon,
            Weekday::Tue => DayCode::Tues,
            Weekday::Wed => DayCode::Wed,
            Weekday::Thu => DayCode::Thurs,
            Weekday::Fri => DayCode::Fri,
            Weekday::Sat => DayCode::Sat,
        }
    }
}

/// The seven day columns of a habit row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DayFlags {
    pub sunday: bool,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
}

impl DayFlags {
    /// Flags are true exactly for the submitted days; repeats are harmless.
    pub fn from_codes<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = DayCode>,
    {
        let mut flags = DayFlags::default();
        for code in codes {
            flags.set(code.weekday(), true);
        }
        flags
    }

    pub fn is_scheduled(&self, day: Weekday) -> bool {
        match day {
            Weekday::Sun => self.sunday,
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
        }
    }

    pub fn set(&mut self, day: Weekday, value: bool) {
        let slot = match day {
            Weekday::Sun => &mut self.sunday,
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
        };
        *slot = value;
    }

    /// Scheduled days as form codes, Sunday first.
    pub fn codes(&self) -> Vec<DayCode> {
        DayCode::ALL
            .into_iter()
            .filter(|code| self.is_scheduled(code.weekday()))
            .collect()
    }
}

/// Column holding the flag for `day`. Only ever yields one of seven fixed names,
/// so it is safe to splice into SQL.
pub fn day_column(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "sunday",
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
    }
}

/// Habits whose flag for `day` is set, in their original order.
pub fn due_on<'a, I>(habits: I, day: Weekday) -> Vec<Habit>
where
    I: IntoIterator<Item = &'a Habit>,
{
    habits
        .into_iter()
        .filter(|h| h.days.is_scheduled(day))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, Utc};
    use uuid::Uuid;

    fn habit(description: &str, days: &[DayCode]) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            description: description.into(),
            importance: 0,
            days: DayFlags::from_codes(days.iter().copied()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_from_codes_sets_exactly_the_selected_days() {
        let flags = DayFlags::from_codes([DayCode::Mon, DayCode::Wed, DayCode::Fri]);
        assert_eq!(
            flags,
            DayFlags {
                monday: true,
                wednesday: true,
                friday: true,
                ..DayFlags::default()
            }
        );
    }

    #[test]
    fn test_from_codes_empty_and_full() {
        assert_eq!(DayFlags::from_codes(Vec::<DayCode>::new()), DayFlags::default());

        let all = DayFlags::from_codes(DayCode::ALL);
        for code in DayCode::ALL {
            assert!(all.is_scheduled(code.weekday()), "{:?} should be set", code);
        }
    }

    #[test]
    fn test_from_codes_ignores_repeats() {
        let flags = DayFlags::from_codes([DayCode::Sat, DayCode::Sat]);
        assert_eq!(flags.codes(), vec![DayCode::Sat]);
    }

    #[test]
    fn test_every_subset_round_trips_through_codes() {
        for mask in 0u8..128 {
            let subset: Vec<DayCode> = DayCode::ALL
                .into_iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, c)| c)
                .collect();
            let flags = DayFlags::from_codes(subset.iter().copied());
            assert_eq!(flags.codes(), subset, "mask {:07b}", mask);
        }
    }

    #[test]
    fn test_day_codes_parse_from_form_strings() {
        let codes: Vec<DayCode> =
            serde_json::from_str(r#"["sun","mon","tues","wed","thurs","fri","sat"]"#).unwrap();
        assert_eq!(codes, DayCode::ALL.to_vec());
        assert!(serde_json::from_str::<DayCode>(r#""tue""#).is_err());
        assert_eq!("thurs".parse::<DayCode>(), Ok(DayCode::Thurs));
        assert!("Thursday".parse::<DayCode>().is_err());
    }

    #[test]
    fn test_due_on_matches_weekday_of_date() {
        let habits = vec![
            habit("run", &[DayCode::Mon, DayCode::Thurs]),
            habit("read", &DayCode::ALL),
            habit("never", &[]),
            habit("weekend", &[DayCode::Sat, DayCode::Sun]),
        ];

        // 2024-01-01 was a Monday; walk one full week.
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for offset in 0..7 {
            let date = monday + chrono::Duration::days(offset);
            let due: Vec<String> = due_on(&habits, date.weekday())
                .into_iter()
                .map(|h| h.description)
                .collect();
            let expected: Vec<String> = habits
                .iter()
                .filter(|h| h.days.is_scheduled(date.weekday()))
                .map(|h| h.description.clone())
                .collect();
            assert_eq!(due, expected);
            assert!(due.contains(&"read".to_string()));
            assert!(!due.contains(&"never".to_string()));
        }

        let thursday = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        let due: Vec<String> = due_on(&habits, thursday.weekday())
            .into_iter()
            .map(|h| h.description)
            .collect();
        assert_eq!(due, vec!["run".to_string(), "read".to_string()]);
    }

    #[test]
    fn test_day_column_matches_weekday() {
        for code in DayCode::ALL {
            assert_eq!(day_column(code.weekday()), code.label().to_lowercase());
        }
        assert_eq!(DayCode::from(Weekday::Thu), DayCode::Thurs);
    }
}
