// Grid -> text encoder (current dialect)
//
// Each column is scanned bottom to top; every maximal run of one non-zero
// index becomes a segment (`y` or `a-b`, plus `.cN` unless N is 1). Empty
// columns become the `_` placeholder so the column count survives.
//
// The palette step emits `pal_cN` for every referenced slot holding a valid,
// non-sentinel color. Cells of the remaining slots must decode to the base
// color, so the query also pins the palette default key:
//   slot 1 emitted  -> the other colorless slots name the builtin color
//   otherwise       -> `paletteDefault=c1`, a key with no entry

use std::collections::BTreeMap;

use crate::color::{is_sentinel, sanitize_color, DEFAULT_COLOR};
use crate::grid::{index_label, slot_color, Grid};
use url::form_urlencoded;

/// Encoded data string and its palette query (without `?`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Encoded {
    pub data: String,
    pub query: String,
}

impl Encoded {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn segment(start: u32, end: u32, idx: u32) -> String {
    let base = if start == end {
        start.to_string()
    } else {
        format!("{start}-{end}")
    };
    match index_label(idx) {
        Some(label) => format!("{base}.{label}"),
        None => base,
    }
}

/// Encode one column (1-based)
pub fn encode_column(grid: &Grid, column: u32) -> String {
    let mut segments = Vec::new();
    let mut run: Option<(u32, u32)> = None; // (index, start row)

    for y in 1..=grid.rows() {
        let idx = grid.at(column, y);
        match run {
            Some((current, _)) if current == idx => {}
            _ => {
                if let Some((current, start)) = run.take() {
                    segments.push(segment(start, y - 1, current));
                }
                if idx != 0 {
                    run = Some((idx, y));
                }
            }
        }
    }
    if let Some((current, start)) = run {
        segments.push(segment(start, grid.rows(), current));
    }

    if segments.is_empty() {
        "_".to_string()
    } else {
        segments.join("_")
    }
}

/// Query form of a sanitized color: without `#` when that still reads back
/// as the same color
fn query_token(color: &str) -> &str {
    match color.strip_prefix('#') {
        Some(hex) if sanitize_color(hex).as_deref() == Some(color) => hex,
        _ => color,
    }
}

/// Palette parameters for the slots a grid references, in emission order
pub fn palette_params(grid: &Grid, palette: &[String]) -> Vec<(String, String)> {
    let used = grid.used_indices();
    let mut entries: BTreeMap<u32, String> = BTreeMap::new();
    let mut colorless = Vec::new();

    for &idx in &used {
        match slot_color(palette, idx) {
            Some(color) if !is_sentinel(&color) => {
                entries.insert(idx, query_token(&color).to_string());
            }
            _ => colorless.push(idx),
        }
    }

    let mut default_key = None;
    if entries.contains_key(&1) {
        for idx in colorless {
            entries.insert(idx, query_token(DEFAULT_COLOR).to_string());
        }
    } else if !colorless.is_empty() {
        default_key = Some("c1".to_string());
    }

    let mut params: Vec<(String, String)> = entries
        .into_iter()
        .map(|(idx, token)| (format!("pal_c{idx}"), token))
        .collect();
    if let Some(key) = default_key {
        params.push(("paletteDefault".to_string(), key));
    }
    params
}

/// URL-encoded query string for a list of parameters
pub fn palette_query(params: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

/// Encode a grid and its palette. A grid with nothing painted encodes to
/// empty data and an empty query.
pub fn encode_grid(grid: &Grid, palette: &[String]) -> Encoded {
    if grid.is_blank() {
        return Encoded::default();
    }
    let data = (1..=grid.cols())
        .map(|x| encode_column(grid, x))
        .collect::<Vec<_>>()
        .join("/");
    Encoded {
        data,
        query: palette_query(&palette_params(grid, palette)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette(colors: &[&str]) -> Vec<String> {
        colors.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_runs_bottom_up() {
        // Column 1 from the bottom: 1 1 2 0 2
        let grid = Grid::from_rows(vec![vec![2], vec![0], vec![2], vec![1], vec![1]]);
        assert_eq!(encode_column(&grid, 1), "1-2_3.c2_5.c2");
    }

    #[test]
    fn test_placeholder_column() {
        let grid = Grid::from_rows(vec![vec![0, 0, 3], vec![1, 0, 3]]);
        let encoded = encode_grid(&grid, &palette(&["#000000", "#111111", "#abcdef"]));
        assert_eq!(encoded.data, "1/_/1-2.c3");
        assert_eq!(encoded.query, "pal_c1=000000&pal_c3=abcdef");
    }

    #[test]
    fn test_blank_grid_encodes_empty() {
        let encoded = encode_grid(&Grid::new(4, 4), &palette(&["red"]));
        assert!(encoded.is_empty());
        assert_eq!(encoded.query, "");
    }

    #[test]
    fn test_sentinel_slot_is_omitted() {
        let grid = Grid::from_rows(vec![vec![1, 2]]);
        let encoded = encode_grid(&grid, &palette(&["2c7be5", "#FF0000"]));
        assert_eq!(encoded.data, "1/1.c2");
        // Slot 1 cells fall through to the builtin color
        assert_eq!(encoded.query, "pal_c2=FF0000&paletteDefault=c1");
    }

    #[test]
    fn test_colorless_slots_keep_builtin_color() {
        let grid = Grid::from_rows(vec![vec![1, 2, 3]]);
        let encoded = encode_grid(&grid, &palette(&["#ff0000", "#2c7be5"]));
        assert_eq!(encoded.query, "pal_c1=ff0000&pal_c2=2c7be5&pal_c3=2c7be5");

        let grid = Grid::from_rows(vec![vec![2, 3]]);
        let encoded = encode_grid(&grid, &palette(&["#ff0000", "#00ff00"]));
        assert_eq!(encoded.query, "pal_c2=00ff00&paletteDefault=c1");
    }

    #[test]
    fn test_query_token_keeps_hash_when_needed() {
        assert_eq!(query_token("#abc"), "abc");
        assert_eq!(query_token("#12345"), "#12345");
        assert_eq!(query_token("red"), "red");
        let grid = Grid::from_rows(vec![vec![2]]);
        let encoded = encode_grid(&grid, &palette(&["", "#12345"]));
        assert_eq!(encoded.query, "pal_c2=%2312345");
    }

    #[test]
    fn test_query_is_url_encoded_and_sorted() {
        let grid = Grid::from_rows(vec![vec![3, 2]]);
        let encoded = encode_grid(&grid, &palette(&["", "rgb(1,2,3)", "#00ff00"]));
        assert_eq!(encoded.query, "pal_c2=rgb%281%2C2%2C3%29&pal_c3=00ff00");
    }
}
