// Editor URL import: `/r/20/20/1-3_5.c2/_/2.svg?pal_c2=ff0000&alpha=0.5`
// back into a dense grid and palette.
//
// Palette parameters are applied first. `cN` labels address slot N directly;
// any other label reuses a slot with the same color or appends one. Segments
// without a usable label take the palette default slot (`paletteDefault`, else
// the first entry), which falls back to a slot holding the builtin color.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;
use url::Url;

use super::{clamp_cell, clamp_dim, EditorState, MAX_PALETTE};
use crate::color::{is_sentinel, DEFAULT_COLOR};
use crate::error::RenderError;
use crate::grid::{label_index, Grid};
use crate::layout::Direction;
use crate::params::palette_label;
use crate::parser::{parse_data, strip_extension, Data};

/// Origin assumed for relative editor URLs
pub const LOCAL_ORIGIN: &str = "http://localhost";

/// Leading path segments of the other routes serving the same image
const ROUTE_PREFIXES: [&str; 4] = ["edit", "html", "png", "ogp"];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid url '{input}': {source}")]
    Url {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("url path must look like /{{r|b}}/{{width}}/{{height}}/{{data}}")]
    Route,

    #[error(transparent)]
    Data(#[from] RenderError),
}

/// Everything an import replaces in the editor
#[derive(Debug, Clone, PartialEq)]
pub struct Imported {
    pub direction: Direction,
    pub cell_width: u32,
    pub cell_height: u32,
    pub grid: Grid,
    pub palette: Vec<String>,
    pub alpha: Option<f64>,
}

fn parse_url(input: &str) -> Result<Url, ImportError> {
    let input = input.trim();
    let parsed = match Url::parse(input) {
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("{LOCAL_ORIGIN}/{}", input.trim_start_matches('/')))
        }
        other => other,
    };
    parsed.map_err(|source| ImportError::Url {
        input: input.to_string(),
        source,
    })
}

fn number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn ensure_len(palette: &mut Vec<String>, len: u32) {
    while palette.len() < len as usize {
        palette.push(DEFAULT_COLOR.to_string());
    }
}

fn slot_index(label: &str) -> Option<u32> {
    label_index(label).filter(|n| (1..=MAX_PALETTE).contains(n))
}

/// Decode an editor or render URL against the current editor state
pub fn import_url(input: &str, current: &EditorState) -> Result<Imported, ImportError> {
    let url = parse_url(input)?;

    let mut parts: Vec<&str> = url
        .path_segments()
        .map(|segs| segs.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();
    if parts.first().is_some_and(|p| ROUTE_PREFIXES.contains(p)) {
        parts.remove(0);
    }
    if parts.len() < 3 {
        return Err(ImportError::Route);
    }
    let direction = Direction::parse(Some(parts[0])).map_err(|_| ImportError::Route)?;

    // A non-numeric size segment is treated as the start of the data
    let (cw, ch, data_from) = match (number(parts[1]), number(parts[2])) {
        (Some(w), Some(h)) => (w, h, 3),
        (Some(w), None) => (w, current.cell_height as f64, 2),
        _ => (current.cell_width as f64, current.cell_height as f64, 1),
    };
    let text = parts[data_from.min(parts.len())..].join("/");
    let data = if strip_extension(text.trim()).trim().is_empty() {
        Data::default()
    } else {
        parse_data(&text)?
    };

    let mut entries: Vec<(String, String)> = Vec::new();
    let mut alpha = None;
    let mut default_label = None;
    for (key, value) in url.query_pairs() {
        if key == "alpha" {
            alpha = number(&value).map(|a| a.clamp(0.0, 1.0));
        } else if key == "paletteDefault" {
            default_label = Some(value.trim().to_string()).filter(|l| !l.is_empty());
        } else if let Some(label) = palette_label(&key) {
            let color = if value.starts_with('#') {
                value.to_string()
            } else {
                format!("#{value}")
            };
            if !is_sentinel(&color) {
                entries.push((label.to_string(), color));
            }
        }
    }

    let cols = clamp_dim(data.columns.len() as f64);
    let rows = if data.columns.is_empty() {
        current.rows
    } else {
        clamp_dim(data.row_count() as f64)
    };
    let data = data.resolve_open_ends(rows);

    let mut palette = current.palette.clone();
    let mut slots: HashMap<&str, u32> = HashMap::new();
    for (label, color) in &entries {
        let idx = match slot_index(label) {
            Some(n) => {
                ensure_len(&mut palette, n);
                palette[n as usize - 1] = color.clone();
                n
            }
            None => match palette
                .iter()
                .position(|c| c.trim().eq_ignore_ascii_case(color.trim()))
            {
                Some(i) => i as u32 + 1,
                None => {
                    palette.push(color.clone());
                    palette.len() as u32
                }
            },
        };
        slots.insert(label.as_str(), idx);
    }

    // An explicit default key without an entry falls back to the builtin color
    let default_idx = match &default_label {
        Some(label) => slots.get(label.as_str()).copied(),
        None => entries
            .first()
            .and_then(|(label, _)| slots.get(label.as_str()).copied()),
    }
    .or_else(|| palette.iter().position(|c| is_sentinel(c)).map(|i| i as u32 + 1))
    .unwrap_or_else(|| {
        palette.push(DEFAULT_COLOR.to_string());
        palette.len() as u32
    });

    let mut grid = Grid::new(rows, cols);
    let mut max_used = 0;
    for (x, column) in data.columns.iter().take(cols as usize).enumerate() {
        for segment in &column.segments {
            let label = segment.label.as_deref().or(column.default_label.as_deref());
            let idx = match label {
                Some(label) => match slot_index(label) {
                    Some(n) => {
                        max_used = max_used.max(n);
                        n
                    }
                    None => slots.get(label).copied().unwrap_or(default_idx),
                },
                None => default_idx,
            };
            for y in segment.y0.min(rows)..=segment.y1.min(rows) {
                grid.set(rows - y, x as u32, idx);
            }
        }
    }
    ensure_len(&mut palette, max_used);

    debug!(rows, cols, palette = palette.len(), "imported editor url");
    Ok(Imported {
        direction,
        cell_width: clamp_cell(cw),
        cell_height: clamp_cell(ch),
        grid,
        palette,
        alpha,
    })
}
