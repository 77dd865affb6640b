use crate::errors::AppError;
use crate::ledger::parse_date_key;
use crate::models::{AppData, DEFAULT_DAILY_GOAL, DEFAULT_INCREMENT};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, warn};

/// Reads the state file. Missing or unreadable data never fails: the file
/// as a whole, each setting, and each history entry fall back to defaults
/// independently.
pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => decode_data(&map),
            Ok(_) => {
                error!("data file is not a JSON object, starting fresh");
                AppData::default()
            }
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

/// Writes a sibling temp file and renames it over `path`, so a crash mid-write
/// leaves the previous state intact.
pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    let tmp = temp_path_for(path);
    fs::write(&tmp, payload).await.map_err(AppError::internal)?;
    if let Err(err) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(AppError::internal(err));
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn decode_data(map: &Map<String, Value>) -> AppData {
    AppData {
        daily_goal: positive_setting(map, "daily_goal", DEFAULT_DAILY_GOAL),
        current_intake: map
            .get("current_intake")
            .and_then(Value::as_u64)
            .unwrap_or_default(),
        increment_amount: positive_setting(map, "increment_amount", DEFAULT_INCREMENT),
        last_saved_date: map
            .get("last_saved_date")
            .and_then(Value::as_str)
            .and_then(parse_date_key),
        water_history: decode_history(map.get("water_history")),
    }
}

fn positive_setting(map: &Map<String, Value>, key: &str, default: u64) -> u64 {
    let Some(raw) = map.get(key) else {
        return default;
    };
    match raw.as_u64() {
        Some(value) if value > 0 => value,
        _ => {
            warn!("ignoring invalid {key} {raw} in data file, using {default}");
            default
        }
    }
}

fn decode_history(value: Option<&Value>) -> BTreeMap<String, u64> {
    let Some(value) = value else {
        return BTreeMap::new();
    };
    let Some(entries) = value.as_object() else {
        error!("water history is not an object, treating as empty");
        return BTreeMap::new();
    };

    let mut history = BTreeMap::new();
    for (key, amount) in entries {
        match amount.as_u64() {
            Some(amount) => {
                history.insert(key.clone(), amount);
            }
            None => warn!("dropping history entry {key:?} with invalid amount {amount}"),
        }
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("water_tracker_{name}_{}_{nanos}.json", std::process::id()));
        path
    }

    #[tokio::test]
    async fn missing_file_loads_defaults() {
        let data = load_data(&temp_path("missing")).await;
        assert_eq!(data, AppData::default());
    }

    #[tokio::test]
    async fn corrupt_file_loads_defaults() {
        let path = temp_path("corrupt");
        fs::write(&path, b"{not json").await.unwrap();
        assert_eq!(load_data(&path).await, AppData::default());
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn persisted_data_loads_back() {
        let path = temp_path("roundtrip");
        let mut data = AppData {
            daily_goal: 96,
            current_intake: 24,
            increment_amount: 12,
            last_saved_date: NaiveDate::from_ymd_opt(2026, 10, 19),
            ..AppData::default()
        };
        data.water_history.insert("2026-10-19".to_string(), 24);
        data.water_history.insert("2026-10-18".to_string(), 100);

        persist_data(&path, &data).await.unwrap();
        assert_eq!(load_data(&path).await, data);
        let _ = fs::remove_file(&path).await;
    }

    #[test]
    fn bad_settings_fall_back_individually() {
        let value = serde_json::json!({
            "daily_goal": "lots",
            "current_intake": -3,
            "increment_amount": 0,
            "last_saved_date": "yesterday",
            "water_history": { "2026-10-01": 64 }
        });
        let data = decode_data(value.as_object().unwrap());
        assert_eq!(data.daily_goal, DEFAULT_DAILY_GOAL);
        assert_eq!(data.current_intake, 0);
        assert_eq!(data.increment_amount, DEFAULT_INCREMENT);
        assert_eq!(data.last_saved_date, None);
        assert_eq!(data.water_history.get("2026-10-01"), Some(&64));
    }

    #[test]
    fn corrupt_history_is_empty_without_losing_settings() {
        let value = serde_json::json!({
            "daily_goal": 64,
            "water_history": "[broken]"
        });
        let data = decode_data(value.as_object().unwrap());
        assert_eq!(data.daily_goal, 64);
        assert!(data.water_history.is_empty());
    }

    #[test]
    fn bad_history_entries_are_dropped() {
        let value = serde_json::json!({
            "water_history": { "2026-10-01": 64, "2026-10-02": "x", "2026-10-03": -1 }
        });
        let data = decode_data(value.as_object().unwrap());
        assert_eq!(data.water_history.len(), 1);
    }

    #[tokio::test]
    async fn persist_replaces_file_without_leaving_temp() {
        let path = temp_path("replace");
        fs::write(&path, b"{\"daily_goal\": 32}").await.unwrap();

        let data = AppData {
            daily_goal: 80,
            ..AppData::default()
        };
        persist_data(&path, &data).await.unwrap();

        assert_eq!(load_data(&path).await, data);
        assert!(!fs::try_exists(temp_path_for(&path)).await.unwrap());
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn failed_rename_keeps_previous_file() {
        let dir = temp_path("dir_target");
        fs::create_dir(&dir).await.unwrap();

        let result = persist_data(&dir, &AppData::default()).await;

        assert!(result.is_err());
        assert!(fs::metadata(&dir).await.unwrap().is_dir());
        assert!(!fs::try_exists(temp_path_for(&dir)).await.unwrap());
        let _ = fs::remove_dir(&dir).await;
    }

    #[test]
    fn temp_path_is_a_sibling() {
        let path = Path::new("/var/lib/water/state.json");
        assert_eq!(temp_path_for(path), PathBuf::from("/var/lib/water/state.json.tmp"));
    }
}
