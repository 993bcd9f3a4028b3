//! Calendar layout for the appointments page
//!
//! Month, week and day views over already-normalized appointments. Weeks
//! start on Sunday. The navigation cursor is the only state and arrives
//! with each request.

use chrono::{Datelike, Duration, Months, NaiveDate, Timelike};

use crate::defaults::{DAY_VIEW_FIRST_HOUR, DAY_VIEW_LAST_HOUR};
use crate::error::{ApiError, ApiResult};
use crate::types::{Appointment, CalendarResponse, CalendarView, DayCell, HourRow, MonthGrid};

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        // December of the last representable year
        (Some(_), None) if month == 12 => 31,
        _ => 0,
    }
}

pub fn month_grid(year: i32, month: u32) -> MonthGrid {
    let leading_blanks = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0);
    MonthGrid {
        leading_blanks,
        days_in_month: days_in_month(year, month),
    }
}

/// Appointments whose display-time start falls on `date`
pub fn appointments_on(appointments: &[Appointment], date: NaiveDate) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|a| a.starts_at.is_some_and(|s| s.date_naive() == date))
        .cloned()
        .collect()
}

/// The Sunday on or before `cursor` and the six days after it; `None` when
/// that week runs past either end of the representable date range.
pub fn week_days(cursor: NaiveDate) -> Option<Vec<NaiveDate>> {
    let sunday =
        cursor.checked_sub_signed(Duration::days(cursor.weekday().num_days_from_sunday() as i64))?;
    (0..7)
        .map(|i| sunday.checked_add_signed(Duration::days(i)))
        .collect()
}

fn hour_label(hour: u32) -> String {
    match hour {
        0 => "12 AM".to_string(),
        1..=11 => format!("{} AM", hour),
        12 => "12 PM".to_string(),
        _ => format!("{} PM", hour - 12),
    }
}

/// Hour rows for the day view; each appointment sits in its start hour.
pub fn day_hours(appointments: &[Appointment], date: NaiveDate) -> Vec<HourRow> {
    let on_day = appointments_on(appointments, date);
    (DAY_VIEW_FIRST_HOUR..=DAY_VIEW_LAST_HOUR)
        .map(|hour| HourRow {
            hour,
            label: hour_label(hour),
            appointments: on_day
                .iter()
                .filter(|a| a.starts_at.is_some_and(|s| s.hour() == hour))
                .cloned()
                .collect(),
        })
        .collect()
}

/// Move the cursor `steps` view-sized units. Month steps clamp the day to
/// the target month's length (Jan 31 + 1 month = Feb 28).
pub fn navigate(cursor: NaiveDate, view: CalendarView, steps: i32) -> NaiveDate {
    let moved = match view {
        CalendarView::Month => {
            let months = Months::new(steps.unsigned_abs());
            if steps >= 0 {
                cursor.checked_add_months(months)
            } else {
                cursor.checked_sub_months(months)
            }
        }
        CalendarView::Week => cursor.checked_add_signed(Duration::days(7 * steps as i64)),
        CalendarView::Day => cursor.checked_add_signed(Duration::days(steps as i64)),
    };
    moved.unwrap_or(cursor)
}

fn week_title(week: &[NaiveDate]) -> String {
    match (week.first(), week.last()) {
        (Some(first), Some(last)) => format!("{} - {}", first.format("%b %-d"), last.format("%b %-d, %Y")),
        _ => String::new(),
    }
}

fn cell(appointments: &[Appointment], date: NaiveDate, today: NaiveDate) -> DayCell {
    DayCell {
        date,
        day: date.day(),
        is_today: date == today,
        appointments: appointments_on(appointments, date),
    }
}

/// Lay out `appointments` for `view` around `cursor` moved by `shift` steps.
/// Fails with `BadRequest` when the view would leave the representable
/// date range.
pub fn build_calendar(
    appointments: &[Appointment],
    view: CalendarView,
    cursor: NaiveDate,
    shift: i32,
    today: NaiveDate,
) -> ApiResult<CalendarResponse> {
    let cursor = navigate(cursor, view, shift);
    let out_of_range = || ApiError::BadRequest(format!("Date {} is outside the supported calendar range", cursor));

    let (title, grid, days, hours) = match view {
        CalendarView::Month => {
            let grid = month_grid(cursor.year(), cursor.month());
            if grid.days_in_month == 0 {
                return Err(out_of_range());
            }
            let days = (1..=grid.days_in_month)
                .filter_map(|d| NaiveDate::from_ymd_opt(cursor.year(), cursor.month(), d))
                .map(|date| cell(appointments, date, today))
                .collect();
            (cursor.format("%B %Y").to_string(), Some(grid), days, Vec::new())
        }
        CalendarView::Week => {
            let week = week_days(cursor).ok_or_else(out_of_range)?;
            let days = week.iter().map(|date| cell(appointments, *date, today)).collect();
            (week_title(&week), None, days, Vec::new())
        }
        CalendarView::Day => (
            cursor.format("%A, %B %-d, %Y").to_string(),
            None,
            vec![cell(appointments, cursor, today)],
            day_hours(appointments, cursor),
        ),
    };

    Ok(CalendarResponse {
        view,
        cursor,
        title,
        grid,
        days,
        hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn apt(id: &str, start: &str) -> Appointment {
        Appointment {
            id: id.to_string(),
            customer: "Jo".into(),
            service: "Cleaning".into(),
            date: String::new(),
            time: String::new(),
            duration: "30 min".into(),
            status: "confirmed".into(),
            notes: String::new(),
            link: String::new(),
            starts_at: DateTime::parse_from_rfc3339(start).ok(),
        }
    }

    #[test]
    fn test_month_starting_wednesday_has_three_blanks() {
        // 1 October 2025 is a Wednesday
        let grid = month_grid(2025, 10);
        assert_eq!(grid.leading_blanks, 3);
        assert_eq!(grid.days_in_month, 31);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2026, 12), 31);
        assert_eq!(days_in_month(2026, 4), 30);
    }

    #[test]
    fn test_week_starts_on_sunday() {
        // 17 October 2026 is a Saturday
        let days = week_days(date(2026, 10, 17)).unwrap();
        assert_eq!(days.first(), Some(&date(2026, 10, 11)));
        assert_eq!(days.last(), Some(&date(2026, 10, 17)));

        let days = week_days(date(2026, 10, 11)).unwrap();
        assert_eq!(days[0], date(2026, 10, 11));
    }

    #[test]
    fn test_navigate_month_clamps_day() {
        assert_eq!(navigate(date(2026, 1, 31), CalendarView::Month, 1), date(2026, 2, 28));
        assert_eq!(navigate(date(2026, 3, 31), CalendarView::Month, -1), date(2026, 2, 28));
        assert_eq!(navigate(date(2026, 12, 15), CalendarView::Month, 1), date(2027, 1, 15));
    }

    #[test]
    fn test_navigate_week_and_day() {
        assert_eq!(navigate(date(2026, 10, 17), CalendarView::Week, -1), date(2026, 10, 10));
        assert_eq!(navigate(date(2026, 10, 31), CalendarView::Day, 1), date(2026, 11, 1));
        assert_eq!(navigate(date(2026, 10, 17), CalendarView::Day, 0), date(2026, 10, 17));
    }

    #[test]
    fn test_bucket_by_local_date() {
        let list = vec![
            apt("a", "2026-10-17T09:00:00+02:00"),
            apt("b", "2026-10-18T00:30:00+02:00"),
        ];
        let on_17 = appointments_on(&list, date(2026, 10, 17));
        assert_eq!(on_17.len(), 1);
        assert_eq!(on_17[0].id, "a");
    }

    #[test]
    fn test_day_view_hour_rows() {
        let list = vec![
            apt("early", "2026-10-17T07:00:00Z"),
            apt("nine", "2026-10-17T09:45:00Z"),
            apt("eight_pm", "2026-10-17T20:15:00Z"),
        ];
        let rows = day_hours(&list, date(2026, 10, 17));

        assert_eq!(rows.len(), 13);
        assert_eq!(rows[0].label, "8 AM");
        assert_eq!(rows[4].label, "12 PM");
        assert_eq!(rows[12].label, "8 PM");
        assert_eq!(rows[1].appointments[0].id, "nine");
        assert_eq!(rows[12].appointments[0].id, "eight_pm");
        let placed: usize = rows.iter().map(|r| r.appointments.len()).sum();
        assert_eq!(placed, 2);
    }

    #[test]
    fn test_build_month_view() {
        let list = vec![apt("a", "2026-11-03T10:00:00Z")];
        let cal = build_calendar(&list, CalendarView::Month, date(2026, 10, 17), 1, date(2026, 10, 17)).unwrap();

        assert_eq!(cal.cursor, date(2026, 11, 17));
        assert_eq!(cal.title, "November 2026");
        assert_eq!(cal.days.len(), 30);
        assert_eq!(cal.grid.unwrap().leading_blanks, 0);
        assert_eq!(cal.days[2].appointments.len(), 1);
        assert!(cal.days.iter().all(|d| !d.is_today));
    }

    #[test]
    fn test_build_week_view_title() {
        let cal = build_calendar(&[], CalendarView::Week, date(2026, 10, 17), 0, date(2026, 10, 17)).unwrap();
        assert_eq!(cal.title, "Oct 11 - Oct 17, 2026");
        assert_eq!(cal.days.len(), 7);
        assert!(cal.days[6].is_today);
        assert!(cal.hours.is_empty());
    }

    #[test]
    fn test_week_at_date_range_ends_is_rejected() {
        let today = date(2026, 10, 17);
        for cursor in [NaiveDate::MAX, NaiveDate::MIN] {
            assert!(week_days(cursor).is_none());
            let err = build_calendar(&[], CalendarView::Week, cursor, 0, today).unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)));
        }
    }

    #[test]
    fn test_month_and_day_at_date_range_ends_do_not_panic() {
        let today = date(2026, 10, 17);
        for cursor in [NaiveDate::MAX, NaiveDate::MIN] {
            let month = build_calendar(&[], CalendarView::Month, cursor, 0, today).unwrap();
            assert_eq!(month.days.len(), 31);
            let day = build_calendar(&[], CalendarView::Day, cursor, 1, today).unwrap();
            assert_eq!(day.days.len(), 1);
        }
    }
}
