use crate::ledger::{IntakeLedger, date_key};
use chrono::{Datelike, Months, NaiveDate};
use rand::Rng;
use serde::Serialize;

pub const FAKE_DAY_MIN: u64 = 30;
pub const FAKE_DAY_MAX: u64 = 100;

/// A calendar month, navigable one step at a time in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
    first: NaiveDate,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// `None` only at the edge of the representable date range.
    pub fn previous(&self) -> Option<Self> {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
    }

    pub fn next(&self) -> Option<Self> {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
    }

    pub fn days_in_month(&self) -> u32 {
        match self.next() {
            Some(next) => (next.first - self.first).num_days() as u32,
            // December of the last representable year.
            None => 31,
        }
    }

    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        self.first.with_day(day)
    }

    /// Empty cells before day 1 in a Sunday-first week grid.
    pub fn leading_blanks(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub day: u32,
    pub date: String,
    pub intake: u64,
    pub goal_met: bool,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthView {
    pub month: Month,
    pub days: Vec<CalendarDay>,
}

pub fn month_view(
    month: Month,
    ledger: &IntakeLedger,
    daily_goal: u64,
    today: NaiveDate,
) -> MonthView {
    let days = (1..=month.days_in_month())
        .filter_map(|day| month.day(day))
        .map(|date| {
            let intake = ledger.get_intake(date);
            CalendarDay {
                day: date.day(),
                date: date_key(date),
                intake,
                goal_met: intake >= daily_goal,
                is_today: date == today,
            }
        })
        .collect();

    MonthView { month, days }
}

/// Picks a random day in `month` and a random amount in
/// `FAKE_DAY_MIN..=FAKE_DAY_MAX` for seeding history by hand.
pub fn random_fake_day<R: Rng>(month: Month, rng: &mut R) -> (NaiveDate, u64) {
    let day = rng.random_range(1..=month.days_in_month());
    let amount = rng.random_range(FAKE_DAY_MIN..=FAKE_DAY_MAX);
    let date = month.day(day).unwrap_or(month.first);
    (date, amount)
}
