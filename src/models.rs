use crate::calendar::CalendarDay;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_DAILY_GOAL: u64 = 128;
pub const DEFAULT_INCREMENT: u64 = 8;

/// Everything the tracker keeps on disk, one key per setting plus the
/// day-keyed history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    pub daily_goal: u64,
    pub current_intake: u64,
    pub increment_amount: u64,
    pub last_saved_date: Option<NaiveDate>,
    pub water_history: BTreeMap<String, u64>,
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            daily_goal: DEFAULT_DAILY_GOAL,
            current_intake: 0,
            increment_amount: DEFAULT_INCREMENT,
            last_saved_date: None,
            water_history: BTreeMap::new(),
        }
    }
}

/// Goal/increment update. `value` is taken as raw user input, so both
/// `8` and `"8"` are accepted and anything else is validated downstream.
#[derive(Debug, Deserialize)]
pub struct SettingRequest {
    pub value: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub date: String,
    pub current_intake: u64,
    pub daily_goal: u64,
    pub increment_amount: u64,
    pub fill_fraction: f64,
    pub goal_met: bool,
    pub new_day: bool,
    pub revision: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IntakeResponse {
    pub date: String,
    pub intake: u64,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub daily_goal: u64,
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
    pub previous: Option<MonthRef>,
    pub next: Option<MonthRef>,
    pub revision: u64,
}

#[derive(Debug, Deserialize)]
pub struct ChangesQuery {
    pub since: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChangesResponse {
    pub revision: u64,
    pub changed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FakeDayResponse {
    pub date: String,
    pub amount: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearHistoryResponse {
    pub removed: usize,
}
