use crate::errors::InputError;
use crate::ledger::{IntakeLedger, date_key};
use crate::models::{AppData, DEFAULT_DAILY_GOAL, DEFAULT_INCREMENT};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    SameDay,
    NewDay,
}

/// Every intake change is written through to the ledger entry for
/// `last_saved_date`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracker {
    daily_goal: u64,
    current_intake: u64,
    increment_amount: u64,
    last_saved_date: Option<NaiveDate>,
    ledger: IntakeLedger,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::from_data(AppData::default())
    }
}

impl Tracker {
    pub fn from_data(data: AppData) -> Self {
        let daily_goal = if data.daily_goal == 0 {
            warn!("stored daily goal is zero, using default");
            DEFAULT_DAILY_GOAL
        } else {
            data.daily_goal
        };
        let increment_amount = if data.increment_amount == 0 {
            warn!("stored increment is zero, using default");
            DEFAULT_INCREMENT
        } else {
            data.increment_amount
        };

        Self {
            daily_goal,
            current_intake: data.current_intake,
            increment_amount,
            last_saved_date: data.last_saved_date,
            ledger: IntakeLedger::from_entries(data.water_history),
        }
    }

    pub fn to_data(&self) -> AppData {
        AppData {
            daily_goal: self.daily_goal,
            current_intake: self.current_intake,
            increment_amount: self.increment_amount,
            last_saved_date: self.last_saved_date,
            water_history: self.ledger.to_entries(),
        }
    }

    pub fn daily_goal(&self) -> u64 {
        self.daily_goal
    }

    pub fn current_intake(&self) -> u64 {
        self.current_intake
    }

    pub fn increment_amount(&self) -> u64 {
        self.increment_amount
    }

    pub fn last_saved_date(&self) -> Option<NaiveDate> {
        self.last_saved_date
    }

    pub fn ledger(&self) -> &IntakeLedger {
        &self.ledger
    }

    pub fn goal_met(&self) -> bool {
        self.current_intake >= self.daily_goal
    }

    pub fn fill_fraction(&self) -> f64 {
        (self.current_intake as f64 / self.daily_goal as f64).min(1.0)
    }

    /// A tracker that has never been activated adopts `today` without
    /// touching its intake.
    pub fn check_for_new_day(&mut self, today: NaiveDate) -> DayStatus {
        match self.last_saved_date {
            Some(last) if last == today => DayStatus::SameDay,
            None => {
                debug!("no saved date, adopting {today}");
                self.last_saved_date = Some(today);
                self.write_through();
                DayStatus::SameDay
            }
            Some(last) => {
                self.ledger.record_intake(last, self.current_intake);
                info!(
                    "rolling over from {last} ({} oz) to {today}",
                    self.current_intake
                );
                self.current_intake = 0;
                self.last_saved_date = Some(today);
                self.write_through();
                DayStatus::NewDay
            }
        }
    }

    pub fn add_water(&mut self, today: NaiveDate) -> u64 {
        self.check_for_new_day(today);
        self.current_intake = self.current_intake.saturating_add(self.increment_amount);
        self.write_through();
        self.current_intake
    }

    pub fn clear_intake(&mut self, today: NaiveDate) {
        self.check_for_new_day(today);
        self.current_intake = 0;
        self.write_through();
    }

    pub fn set_goal(&mut self, input: &str) -> Result<u64, InputError> {
        let goal = parse_positive(input)?;
        self.daily_goal = goal;
        Ok(goal)
    }

    pub fn set_increment(&mut self, input: &str) -> Result<u64, InputError> {
        let amount = parse_positive(input)?;
        self.increment_amount = amount;
        Ok(amount)
    }

    /// Overwrites the ledger entry for `date`. When that date is the current
    /// day the running counter follows.
    pub fn record_intake(&mut self, today: NaiveDate, date: NaiveDate, amount: u64) {
        self.check_for_new_day(today);
        self.ledger.record_intake(date, amount);
        if self.last_saved_date == Some(date) {
            self.current_intake = amount;
        }
    }

    pub fn get_intake(&self, date: NaiveDate) -> u64 {
        self.ledger.get_intake(date)
    }

    /// Drops every history entry except the running total for the current
    /// day, and returns how many entries there were.
    pub fn clear_all_history(&mut self) -> usize {
        let removed = self.ledger.len();
        self.ledger.clear_all();
        self.write_through();
        info!("cleared {removed} history entries");
        removed
    }

    fn write_through(&mut self) {
        if let Some(date) = self.last_saved_date {
            self.ledger.record_intake(date, self.current_intake);
            debug!("{} = {} oz", date_key(date), self.current_intake);
        }
    }
}

/// Accepts a strictly positive whole number, ignoring surrounding whitespace.
pub fn parse_positive(input: &str) -> Result<u64, InputError> {
    let trimmed = input.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| InputError::NotANumber(trimmed.to_string()))?;
    if value <= 0 {
        return Err(InputError::NotPositive(value));
    }
    Ok(value as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, FixedClock};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn activated(today: NaiveDate) -> Tracker {
        let mut tracker = Tracker::default();
        tracker.check_for_new_day(today);
        tracker
    }

    #[test]
    fn defaults_match_fresh_install() {
        let tracker = Tracker::default();
        assert_eq!(tracker.daily_goal(), 128);
        assert_eq!(tracker.current_intake(), 0);
        assert_eq!(tracker.increment_amount(), 8);
        assert_eq!(tracker.last_saved_date(), None);
    }

    #[test]
    fn add_water_increases_by_increment_and_writes_through() {
        let today = day(2026, 4, 2);
        for amount in [1u64, 7, 8, 250] {
            let mut tracker = activated(today);
            tracker.set_increment(&amount.to_string()).unwrap();
            let before = tracker.current_intake();

            tracker.add_water(today);

            assert_eq!(tracker.current_intake(), before + amount);
            assert_eq!(tracker.get_intake(today), tracker.current_intake());
        }
    }

    #[test]
    fn intake_may_exceed_goal() {
        let today = day(2026, 4, 2);
        let mut tracker = activated(today);
        tracker.set_goal("10").unwrap();
        tracker.add_water(today);
        tracker.add_water(today);
        assert_eq!(tracker.current_intake(), 16);
        assert!(tracker.goal_met());
        assert_eq!(tracker.fill_fraction(), 1.0);
    }

    #[test]
    fn clear_intake_zeroes_counter_and_today_entry() {
        let today = day(2026, 4, 2);
        let mut tracker = activated(today);
        tracker.add_water(today);
        tracker.add_water(today);

        tracker.clear_intake(today);

        assert_eq!(tracker.current_intake(), 0);
        assert_eq!(tracker.get_intake(today), 0);
    }

    #[test]
    fn rollover_check_is_idempotent() {
        let clock = FixedClock::new(day(2026, 4, 2));
        let mut tracker = activated(clock.today());
        tracker.add_water(clock.today());
        clock.advance_days(1);

        assert_eq!(tracker.check_for_new_day(clock.today()), DayStatus::NewDay);
        let after_first = tracker.clone();
        assert_eq!(tracker.check_for_new_day(clock.today()), DayStatus::SameDay);
        assert_eq!(tracker, after_first);
    }

    #[test]
    fn rollover_resets_counter_and_keeps_previous_day() {
        let clock = FixedClock::new(day(2026, 4, 2));
        let d1 = clock.today();
        let mut tracker = activated(d1);
        tracker.set_increment("12").unwrap();
        tracker.add_water(d1);
        tracker.add_water(d1);
        assert_eq!(tracker.current_intake(), 24);

        clock.advance_days(1);
        let d2 = clock.today();
        assert_eq!(tracker.check_for_new_day(d2), DayStatus::NewDay);

        assert_eq!(tracker.current_intake(), 0);
        assert_eq!(tracker.last_saved_date(), Some(d2));
        assert_eq!(tracker.get_intake(d1), 24);
        assert_eq!(tracker.get_intake(d2), 0);
    }

    #[test]
    fn mutation_after_midnight_rolls_over_first() {
        let d1 = day(2026, 4, 2);
        let d2 = day(2026, 4, 3);
        let mut tracker = activated(d1);
        tracker.add_water(d1);

        tracker.add_water(d2);

        assert_eq!(tracker.get_intake(d1), 8);
        assert_eq!(tracker.get_intake(d2), 8);
        assert_eq!(tracker.current_intake(), 8);
    }

    #[test]
    fn first_activation_keeps_loaded_intake() {
        let today = day(2026, 4, 2);
        let mut tracker = Tracker::from_data(AppData {
            current_intake: 40,
            ..AppData::default()
        });

        assert_eq!(tracker.check_for_new_day(today), DayStatus::SameDay);
        assert_eq!(tracker.current_intake(), 40);
        assert_eq!(tracker.get_intake(today), 40);
    }

    #[test]
    fn invalid_goal_input_leaves_goal_unchanged() {
        let mut tracker = Tracker::default();
        tracker.set_goal("64").unwrap();

        assert_eq!(tracker.set_goal("0"), Err(InputError::NotPositive(0)));
        assert_eq!(tracker.set_goal("-5"), Err(InputError::NotPositive(-5)));
        assert_eq!(
            tracker.set_goal("abc"),
            Err(InputError::NotANumber("abc".to_string()))
        );
        assert!(tracker.set_goal("").is_err());
        assert!(tracker.set_goal("12.5").is_err());
        assert_eq!(tracker.daily_goal(), 64);
    }

    #[test]
    fn invalid_increment_input_leaves_increment_unchanged() {
        let mut tracker = Tracker::default();
        assert!(tracker.set_increment("0").is_err());
        assert!(tracker.set_increment("-8").is_err());
        assert!(tracker.set_increment("lots").is_err());
        assert_eq!(tracker.increment_amount(), 8);

        assert_eq!(tracker.set_increment(" 16 "), Ok(16));
        assert_eq!(tracker.increment_amount(), 16);
    }

    #[test]
    fn three_adds_then_clear() {
        let today = day(2026, 10, 19);
        let mut tracker = activated(today);
        tracker.set_goal("128").unwrap();
        tracker.set_increment("8").unwrap();

        tracker.add_water(today);
        tracker.add_water(today);
        tracker.add_water(today);
        assert_eq!(tracker.current_intake(), 24);

        tracker.clear_intake(today);
        assert_eq!(tracker.current_intake(), 0);
        assert_eq!(tracker.get_intake(today), 0);
    }

    #[test]
    fn recording_today_moves_running_counter() {
        let today = day(2026, 10, 19);
        let mut tracker = activated(today);
        tracker.record_intake(today, today, 55);
        assert_eq!(tracker.current_intake(), 55);

        tracker.record_intake(today, day(2026, 10, 1), 70);
        assert_eq!(tracker.current_intake(), 55);
        assert_eq!(tracker.get_intake(day(2026, 10, 1)), 70);
    }

    #[test]
    fn zero_settings_on_disk_fall_back_to_defaults() {
        let tracker = Tracker::from_data(AppData {
            daily_goal: 0,
            increment_amount: 0,
            ..AppData::default()
        });
        assert_eq!(tracker.daily_goal(), DEFAULT_DAILY_GOAL);
        assert_eq!(tracker.increment_amount(), DEFAULT_INCREMENT);
    }

    #[test]
    fn data_round_trips_through_tracker() {
        let today = day(2026, 10, 19);
        let mut tracker = activated(today);
        tracker.add_water(today);
        let restored = Tracker::from_data(tracker.to_data());
        assert_eq!(restored, tracker);
    }

    #[test]
    fn clearing_history_keeps_todays_running_total() {
        let today = day(2026, 10, 19);
        let mut tracker = activated(today);
        tracker.record_intake(today, day(2026, 10, 2), 90);
        tracker.add_water(today);

        assert_eq!(tracker.clear_all_history(), 2);
        tracker.check_for_new_day(today);

        assert_eq!(tracker.get_intake(today), tracker.current_intake());
        assert_eq!(tracker.current_intake(), 8);
        assert_eq!(tracker.get_intake(day(2026, 10, 2)), 0);
        assert_eq!(tracker.ledger().len(), 1);
    }

    #[test]
    fn recording_after_midnight_survives_next_activation() {
        let d1 = day(2026, 10, 19);
        let d2 = day(2026, 10, 20);
        let mut tracker = activated(d1);
        tracker.add_water(d1);

        tracker.record_intake(d2, d2, 77);
        assert_eq!(tracker.check_for_new_day(d2), DayStatus::SameDay);

        assert_eq!(tracker.get_intake(d2), 77);
        assert_eq!(tracker.current_intake(), 77);
        assert_eq!(tracker.get_intake(d1), 8);
    }
}
