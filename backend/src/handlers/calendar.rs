use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Query, State},
    response::Response,
    Extension,
};
use chrono::{Datelike, Months, NaiveDate};
use tower_sessions::Session;

use crate::auth::middleware::CurrentUser;
use crate::dto::{CalendarData, CalendarDay, CalendarQuery};
use crate::error::{AppError, AppResult};
use crate::views::render;
use crate::AppState;

/// Month grid of moods and journal entries.
pub async fn calendar(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    session: Session,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Response> {
    let first = match query.month.as_deref() {
        Some(raw) => parse_month(raw)
            .ok_or_else(|| AppError::Validation(format!("Invalid month '{}', expected YYYY-MM", raw)))?,
        None => first_of_month(state.clock.today()),
    };
    let (Some(previous), Some(next)) = (
        first.checked_sub_months(Months::new(1)),
        first.checked_add_months(Months::new(1)),
    ) else {
        return Err(AppError::Validation(format!(
            "Month {} is out of range",
            format_month(first)
        )));
    };
    let days = month_days(first);
    let last = *days.last().unwrap_or(&first);

    let moods: HashMap<NaiveDate, _> = state
        .store
        .moods_between(user.id, first, last)
        .await?
        .into_iter()
        .map(|m| (m.mood_date, m.mood))
        .collect();
    let journal_days: HashSet<NaiveDate> = state
        .store
        .journals_between(user.id, first, last)
        .await?
        .into_iter()
        .map(|j| j.entry_date)
        .collect();

    let data = CalendarData {
        month: format_month(first),
        previous_month: format_month(previous),
        next_month: format_month(next),
        days: days
            .into_iter()
            .map(|date| CalendarDay {
                date,
                weekday: date.weekday().into(),
                mood: moods.get(&date).copied(),
                has_journal: journal_days.contains(&date),
            })
            .collect(),
    };
    render(&session, "calendar", Some(&user), data).await
}

/// `YYYY-MM` → first day of that month.
fn parse_month(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d").ok()
}

fn format_month(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Every date of the month starting at `first`.
fn month_days(first: NaiveDate) -> Vec<NaiveDate> {
    first
        .iter_days()
        .take_while(|d| d.month() == first.month())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-02"), Some(ymd(2024, 2, 1)));
        assert_eq!(parse_month("2024-13"), None);
        assert_eq!(parse_month("February"), None);
    }

    #[test]
    fn test_month_days_handles_leap_years() {
        assert_eq!(month_days(ymd(2024, 2, 1)).len(), 29);
        assert_eq!(month_days(ymd(2023, 2, 1)).len(), 28);
        let december = month_days(ymd(2023, 12, 1));
        assert_eq!(december.len(), 31);
        assert_eq!(*december.last().unwrap(), ymd(2023, 12, 31));
    }

    #[test]
    fn test_month_navigation_crosses_years() {
        let first = ymd(2024, 1, 1);
        assert_eq!(format_month(first - Months::new(1)), "2023-12");
        assert_eq!(format_month(first + Months::new(1)), "2024-02");
        assert_eq!(first_of_month(ymd(2024, 1, 17)), first);
    }
}
