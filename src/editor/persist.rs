use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

use super::{clamp_cell, clamp_dim, EditorState, Event};
use crate::grid::Grid;

/// On-disk form of the editor state
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedState {
    pub rows: u32,
    pub cols: u32,
    pub full_grid: Vec<Vec<u32>>,
    pub cell_width: u32,
    pub cell_height: u32,
    pub alpha: f64,
    pub palette: Vec<String>,
    pub selected: u32,
}

impl From<&EditorState> for SavedState {
    fn from(st: &EditorState) -> Self {
        SavedState {
            rows: st.rows,
            cols: st.cols,
            full_grid: st.full_grid.as_rows().to_vec(),
            cell_width: st.cell_width,
            cell_height: st.cell_height,
            alpha: st.alpha,
            palette: st.palette.clone(),
            selected: st.selected,
        }
    }
}

/// Save the state as pretty JSON.
pub fn save_state(state: &EditorState, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&SavedState::from(state))
        .context("Failed to serialize editor state")?;
    std::fs::write(path, json.as_bytes())
        .with_context(|| format!("Failed to write editor state to {}", path.display()))?;
    Ok(())
}

fn number(value: Option<&Value>) -> Option<f64> {
    let n: Option<f64> = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Rebuild a state from loosely typed JSON, clamping every field and
/// keeping the default for anything missing or unusable.
pub fn state_from_json(value: &Value) -> EditorState {
    let def = EditorState::default();
    let field = |key: &str| value.get(key);

    let rows = number(field("rows")).map_or(def.rows, clamp_dim);
    let cols = number(field("cols")).map_or(def.cols, clamp_dim);
    let cell_width = number(field("cellWidth")).map_or(def.cell_width, clamp_cell);
    let cell_height = number(field("cellHeight")).map_or(def.cell_height, clamp_cell);
    let alpha = number(field("alpha")).map_or(def.alpha, |a| a.clamp(0.0, 1.0));

    let palette: Vec<String> = match field("palette").and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.trim().to_string(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        None => def.palette.clone(),
    };
    let max_selected = (palette.len() as f64).max(1.0);
    let selected = number(field("selected"))
        .map_or(def.selected, |n| n.floor().clamp(0.0, max_selected) as u32);

    // Older snapshots call the grid `grid`
    let full_grid = field("fullGrid")
        .or_else(|| field("grid"))
        .and_then(|g| Grid::from_json(g).ok())
        .unwrap_or(def.full_grid);

    EditorState {
        rows,
        cols,
        full_grid,
        cell_width,
        cell_height,
        alpha,
        palette,
        selected,
    }
}

/// Load the session state.
///
/// An import directive bypasses the snapshot entirely: the session starts
/// from defaults and applies the import. Otherwise a missing or unreadable
/// snapshot yields the default state.
pub fn load_state(path: &Path, import: Option<&str>) -> EditorState {
    if let Some(url) = import {
        debug!(url, "import present, skipping saved state");
        let mut state = EditorState::default();
        state.apply(Event::Import { url: url.to_string() });
        return state;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            debug!(path = %path.display(), %err, "no saved editor state");
            return EditorState::default();
        }
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(value) => state_from_json(&value),
        Err(err) => {
            warn!(path = %path.display(), %err, "ignoring unreadable editor state");
            EditorState::default()
        }
    }
}
