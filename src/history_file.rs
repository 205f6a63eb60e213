use std::{
    env, fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{BenchTrendError, history::History};

pub const HISTORY_FILE_ENV: &str = "BENCHTREND_HISTORY_FILE";

/// Explicit path, else `BENCHTREND_HISTORY_FILE`, else nothing.
pub fn history_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    env::var_os(HISTORY_FILE_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Loads the history at `path`.
///
/// A missing, empty, unreadable or malformed file yields an empty history;
/// the problem is logged and never returned as an error.
pub fn load_history(path: &Path) -> History {
    match try_load_history(path) {
        Ok(Some(history)) => {
            debug!(path = %path.display(), runs = history.len(), "loaded history");
            history
        }
        Ok(None) => History::new(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not load history, starting empty");
            History::new()
        }
    }
}

fn try_load_history(path: &Path) -> Result<Option<History>, BenchTrendError> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read(path).map_err(|e| BenchTrendError::io(e.to_string()))?;
    if data.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(&data)
        .map(Some)
        .map_err(|e| BenchTrendError::parse(e.to_string()))
}

/// Trims `history` to `limit` runs and writes it to `path` as pretty JSON.
pub fn save_history(path: &Path, history: &mut History, limit: usize) -> Result<(), BenchTrendError> {
    let dropped = history.trim(limit);
    if dropped > 0 {
        debug!(dropped, limit, "trimmed history");
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| BenchTrendError::io(e.to_string()))?;
    }
    let data = serde_json::to_vec_pretty(history)
        .map_err(|e| BenchTrendError::invalid_input(e.to_string()))?;
    fs::write(path, data).map_err(|e| BenchTrendError::io(e.to_string()))?;
    info!(path = %path.display(), runs = history.len(), "saved history");
    Ok(())
}
