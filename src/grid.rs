//! Dense color-index grid, as painted in the editor.
//!
//! Storage row 0 is the top of the picture; encoded row 1 is the bottom
//! (`encoded_y = rows - storage_row`). Index 0 is background, `N >= 1`
//! refers to palette slot `N`.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::io::Read;

use crate::color::{sanitize_color, DEFAULT_COLOR};
use crate::compiler::compile_scene;
use crate::palette::PaletteMap;
use crate::params::RenderParams;
use crate::parser::{Column, Data, Segment};
use crate::svg::to_svg;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grid {
    cells: Vec<Vec<u32>>,
}

/// Segment label for a palette index: slot 1 is unlabeled, others are `cN`
pub fn index_label(idx: u32) -> Option<String> {
    (idx > 1).then(|| format!("c{idx}"))
}

/// Palette index addressed by a `cN` label
pub fn label_index(label: &str) -> Option<u32> {
    label
        .strip_prefix('c')
        .filter(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        .and_then(|n| n.parse().ok())
}

fn lenient_index(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite() && *f > 0.0)
            .map(|f| f.floor() as u32)
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<f64>().map(|f| lenient_index(&Value::from(f))).unwrap_or(0),
        _ => 0,
    }
}

impl Grid {
    pub fn new(rows: u32, cols: u32) -> Self {
        Grid {
            cells: vec![vec![0; cols as usize]; rows as usize],
        }
    }

    /// Build from storage-order rows; ragged rows are padded with background
    pub fn from_rows(mut cells: Vec<Vec<u32>>) -> Self {
        let cols = cells.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut cells {
            row.resize(cols, 0);
        }
        Grid { cells }
    }

    /// Read a grid from headerless CSV, top row first. Blank or non-numeric cells are background.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record.with_context(|| format!("Failed to read grid row {}", line + 1))?;
            rows.push(
                record
                    .iter()
                    .map(|cell| lenient_index(&Value::String(cell.to_string())))
                    .collect(),
            );
        }
        Ok(Grid::from_rows(rows))
    }

    /// Grid from a JSON array of arrays. Non-numeric cells become background.
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Grid must be a JSON array of rows"))?;
        let rows = array
            .iter()
            .map(|row| {
                row.as_array()
                    .map(|cells| cells.iter().map(lenient_index).collect())
                    .unwrap_or_default()
            })
            .collect();
        Ok(Grid::from_rows(rows))
    }

    pub fn rows(&self) -> u32 {
        self.cells.len() as u32
    }

    pub fn cols(&self) -> u32 {
        self.cells.first().map_or(0, |r| r.len() as u32)
    }

    pub fn as_rows(&self) -> &[Vec<u32>] {
        &self.cells
    }

    /// Index at storage position; out of range is background
    pub fn get(&self, row: u32, col: u32) -> u32 {
        self.cells
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Write at storage position. Returns false when out of range.
    pub fn set(&mut self, row: u32, col: u32, idx: u32) -> bool {
        match self.cells.get_mut(row as usize).and_then(|r| r.get_mut(col as usize)) {
            Some(cell) => {
                *cell = idx;
                true
            }
            None => false,
        }
    }

    /// Index at encoded coordinates: 1-based column, 1-based row from the bottom
    pub fn at(&self, column: u32, y: u32) -> u32 {
        if column == 0 || y == 0 || y > self.rows() {
            return 0;
        }
        self.get(self.rows() - y, column - 1)
    }

    /// Keep the bottom rows and the left columns; grow with background on top and right
    pub fn resized(&self, rows: u32, cols: u32) -> Grid {
        let rows = rows as usize;
        let skip = self.cells.len().saturating_sub(rows);
        let mut cells: Vec<Vec<u32>> = vec![Vec::new(); rows.saturating_sub(self.cells.len())];
        cells.extend(self.cells.iter().skip(skip).cloned());
        for row in &mut cells {
            row.resize(cols as usize, 0);
        }
        Grid { cells }
    }

    pub fn clear(&mut self) {
        for row in &mut self.cells {
            row.iter_mut().for_each(|c| *c = 0);
        }
    }

    pub fn used_indices(&self) -> BTreeSet<u32> {
        self.cells.iter().flatten().copied().filter(|&i| i > 0).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().flatten().all(|&i| i == 0)
    }

    /// One unit segment per painted cell, labelled by palette index
    pub fn to_data(&self) -> Data {
        let columns = (1..=self.cols())
            .map(|x| {
                let segments = (1..=self.rows())
                    .filter_map(|y| match self.at(x, y) {
                        0 => None,
                        idx => {
                            let seg = Segment::cell(y);
                            Some(match index_label(idx) {
                                Some(label) => seg.with_label(label),
                                None => seg,
                            })
                        }
                    })
                    .collect();
                Column::new(segments)
            })
            .collect();
        Data::new(columns)
    }
}

/// Color a painted index is drawn with: its palette slot when that holds a
/// valid color token, otherwise nothing
pub fn slot_color(palette: &[String], idx: u32) -> Option<String> {
    let slot = idx.checked_sub(1)?;
    palette.get(slot as usize).and_then(|c| sanitize_color(c))
}

/// Render a grid directly from its palette slots, without going through the
/// text encoding. Cells whose slot has no valid color use the base color.
pub fn render_grid(grid: &Grid, palette: &[String], params: &RenderParams) -> String {
    let base = params
        .color
        .as_deref()
        .and_then(sanitize_color)
        .unwrap_or_else(|| DEFAULT_COLOR.to_string());

    // Each cell carries its concrete color as a raw-token label
    let mut data = grid.to_data();
    for (x, column) in data.columns.iter_mut().enumerate() {
        for segment in &mut column.segments {
            let idx = grid.at(x as u32 + 1, segment.y0);
            segment.label = Some(slot_color(palette, idx).unwrap_or_else(|| base.clone()));
        }
    }
    let params = RenderParams {
        palette: PaletteMap::new(),
        ..params.clone()
    };
    to_svg(&compile_scene(&data, &params))
}
