use crate::calendar::{self, Month};
use crate::errors::AppError;
use crate::ledger::{date_key, parse_date_key};
use crate::models::{
    CalendarResponse, ChangesQuery, ChangesResponse, ClearHistoryResponse, FakeDayResponse,
    IntakeResponse, MonthQuery, MonthRef, SettingRequest, TodayResponse,
};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::tracker::{DayStatus, Tracker};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use std::time::Duration;
use tracing::{error, info, warn};

const CHANGES_TIMEOUT: Duration = Duration::from_secs(30);

/// Activating the tracking view: runs the rollover check first.
pub async fn get_today(State(state): State<AppState>) -> Result<Json<TodayResponse>, AppError> {
    let today = state.clock.today();
    let mut tracker = state.tracker.lock().await;
    let snapshot = tracker.clone();
    let status = tracker.check_for_new_day(today);

    if *tracker != snapshot {
        commit(&state, &mut *tracker, snapshot).await?;
    }

    Ok(Json(to_today(&state, today, &tracker, status)))
}

pub async fn add_water(State(state): State<AppState>) -> Result<Json<TodayResponse>, AppError> {
    mutate_today(&state, |tracker, today| {
        let total = tracker.add_water(today);
        info!("added {} oz, now {total} oz", tracker.increment_amount());
    })
    .await
}

pub async fn clear_intake(State(state): State<AppState>) -> Result<Json<TodayResponse>, AppError> {
    mutate_today(&state, |tracker, today| {
        tracker.clear_intake(today);
        info!("cleared intake for {today}");
    })
    .await
}

pub async fn set_goal(
    State(state): State<AppState>,
    Json(payload): Json<SettingRequest>,
) -> Result<Json<TodayResponse>, AppError> {
    let input = raw_input(&payload.value);
    update_setting(&state, |tracker| tracker.set_goal(&input), "daily goal").await
}

pub async fn set_increment(
    State(state): State<AppState>,
    Json(payload): Json<SettingRequest>,
) -> Result<Json<TodayResponse>, AppError> {
    let input = raw_input(&payload.value);
    update_setting(&state, |tracker| tracker.set_increment(&input), "increment").await
}

pub async fn get_intake(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<IntakeResponse>, AppError> {
    let date = parse_date_key(&date)
        .ok_or_else(|| AppError::bad_request("date must be formatted as YYYY-MM-DD"))?;
    let tracker = state.tracker.lock().await;

    Ok(Json(IntakeResponse {
        date: date_key(date),
        intake: tracker.get_intake(date),
    }))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let today = state.clock.today();
    let month = resolve_month(&query, today)?;
    let tracker = state.tracker.lock().await;
    let view = calendar::month_view(month, tracker.ledger(), tracker.daily_goal(), today);

    Ok(Json(CalendarResponse {
        year: month.year(),
        month: month.month(),
        label: month.label(),
        daily_goal: tracker.daily_goal(),
        leading_blanks: month.leading_blanks(),
        days: view.days,
        previous: month.previous().map(month_ref),
        next: month.next().map(month_ref),
        revision: state.revision(),
    }))
}

/// Long-poll for history changes, replacing periodic re-reads.
pub async fn get_changes(
    State(state): State<AppState>,
    Query(query): Query<ChangesQuery>,
) -> Json<ChangesResponse> {
    let since = query.since.unwrap_or_else(|| state.revision());
    let revision = state.wait_for_change(since, CHANGES_TIMEOUT).await;
    Json(ChangesResponse {
        revision,
        changed: revision > since,
    })
}

pub async fn debug_fake_day(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<FakeDayResponse>, AppError> {
    ensure_debug(&state)?;
    let today = state.clock.today();
    let month = resolve_month(&query, today)?;
    let (date, amount) = {
        let mut rng = rand::rng();
        calendar::random_fake_day(month, &mut rng)
    };

    let mut tracker = state.tracker.lock().await;
    let snapshot = tracker.clone();
    tracker.record_intake(today, date, amount);
    commit(&state, &mut *tracker, snapshot).await?;
    info!("injected fake day {date} = {amount} oz");

    Ok(Json(FakeDayResponse {
        date: date_key(date),
        amount,
    }))
}

pub async fn debug_clear_history(
    State(state): State<AppState>,
) -> Result<Json<ClearHistoryResponse>, AppError> {
    ensure_debug(&state)?;
    let mut tracker = state.tracker.lock().await;
    let snapshot = tracker.clone();
    let removed = tracker.clear_all_history();
    commit(&state, &mut *tracker, snapshot).await?;

    Ok(Json(ClearHistoryResponse { removed }))
}

async fn mutate_today(
    state: &AppState,
    apply: impl FnOnce(&mut Tracker, NaiveDate),
) -> Result<Json<TodayResponse>, AppError> {
    let today = state.clock.today();
    let mut tracker = state.tracker.lock().await;
    let snapshot = tracker.clone();
    let status = tracker.check_for_new_day(today);
    apply(&mut *tracker, today);

    commit(state, &mut *tracker, snapshot).await?;

    Ok(Json(to_today(state, today, &tracker, status)))
}

async fn update_setting<E>(
    state: &AppState,
    apply: impl FnOnce(&mut Tracker) -> Result<u64, E>,
    name: &str,
) -> Result<Json<TodayResponse>, AppError>
where
    E: Into<AppError> + std::fmt::Display,
{
    let today = state.clock.today();
    let mut tracker = state.tracker.lock().await;
    let snapshot = tracker.clone();
    match apply(&mut *tracker) {
        Ok(value) => info!("{name} set to {value}"),
        Err(err) => {
            warn!("rejected {name}: {err}");
            return Err(err.into());
        }
    }

    commit(state, &mut *tracker, snapshot).await?;

    Ok(Json(to_today(state, today, &tracker, DayStatus::SameDay)))
}

/// Persists the tracker, or puts `snapshot` back if the write fails so memory
/// never runs ahead of disk.
async fn commit(state: &AppState, tracker: &mut Tracker, snapshot: Tracker) -> Result<(), AppError> {
    if let Err(err) = persist_data(&state.data_path, &tracker.to_data()).await {
        error!("failed to persist tracker state: {}", err.message);
        *tracker = snapshot;
        return Err(err);
    }
    state.notify_changed();
    Ok(())
}

fn ensure_debug(state: &AppState) -> Result<(), AppError> {
    if state.debug {
        Ok(())
    } else {
        Err(AppError::not_found("not found"))
    }
}

fn resolve_month(query: &MonthQuery, today: NaiveDate) -> Result<Month, AppError> {
    let current = Month::containing(today);
    let year = query.year.unwrap_or(current.year());
    let month = query.month.unwrap_or(current.month());
    Month::new(year, month).ok_or_else(|| AppError::bad_request("no such month"))
}

fn month_ref(month: Month) -> MonthRef {
    MonthRef {
        year: month.year(),
        month: month.month(),
    }
}

/// Settings arrive as whatever the client typed; strings are passed through
/// untouched and other JSON values by their textual form.
fn raw_input(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn to_today(
    state: &AppState,
    today: NaiveDate,
    tracker: &Tracker,
    status: DayStatus,
) -> TodayResponse {
    TodayResponse {
        date: date_key(today),
        current_intake: tracker.current_intake(),
        daily_goal: tracker.daily_goal(),
        increment_amount: tracker.increment_amount(),
        fill_fraction: tracker.fill_fraction(),
        goal_met: tracker.goal_met(),
        new_day: status == DayStatus::NewDay,
        revision: state.revision(),
    }
}
