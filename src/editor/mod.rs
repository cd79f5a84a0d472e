//! Editor session model.
//!
//! An explicit state reducer: [`EditorState::apply`] takes one discrete
//! [`Event`] at a time. The painted picture lives in `full_grid`; the view is
//! its bottom `rows` rows and left `cols` columns, so shrinking the view never
//! loses paint.

pub mod import;
pub mod persist;

use std::str::FromStr;

use tracing::{debug, warn};

use crate::encoder::{encode_grid, Encoded};
use crate::grid::Grid;
use crate::layout::fmt_num;

pub use import::{import_url, ImportError, Imported};

pub const DEFAULT_ROWS: u32 = 16;
pub const DEFAULT_COLS: u32 = 16;
pub const DEFAULT_CELL: u32 = 20;
pub const MAX_DIM: u32 = 128;
pub const MIN_CELL: u32 = 4;
pub const MAX_CELL: u32 = 64;
/// Highest palette slot an imported `cN` label may address
pub const MAX_PALETTE: u32 = 256;

pub(crate) fn clamp_dim(v: f64) -> u32 {
    v.floor().clamp(1.0, MAX_DIM as f64) as u32
}

pub(crate) fn clamp_cell(v: f64) -> u32 {
    v.floor().clamp(MIN_CELL as f64, MAX_CELL as f64) as u32
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub rows: u32,
    pub cols: u32,
    pub full_grid: Grid,
    pub cell_width: u32,
    pub cell_height: u32,
    pub alpha: f64,
    /// 1-based slots; index 0 in the grid is background
    pub palette: Vec<String>,
    /// Index painted by the next `Paint`; 0 erases
    pub selected: u32,
}

impl Default for EditorState {
    fn default() -> Self {
        EditorState {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            full_grid: Grid::new(DEFAULT_ROWS, DEFAULT_COLS),
            cell_width: DEFAULT_CELL,
            cell_height: DEFAULT_CELL,
            alpha: 1.0,
            palette: Vec::new(),
            selected: 0,
        }
    }
}

/// Discrete editor mutations
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// View coordinates, 0-based from the top-left
    Paint { row: u32, col: u32 },
    Resize { rows: u32, cols: u32 },
    SetCellSize { width: u32, height: u32 },
    SetAlpha { alpha: f64 },
    AddColor { color: String },
    Select { index: u32 },
    Clear,
    Import { url: String },
}

fn pair(value: &str) -> Option<(u32, u32)> {
    let (a, b) = value.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

/// Command-line form: `paint:ROW,COL`, `resize:ROWS,COLS`, `cell:W,H`,
/// `alpha:A`, `color:TOKEN`, `select:N`, `clear`, `import:URL`
impl FromStr for Event {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = s.split_once(':').unwrap_or((s, ""));
        let bad = || format!("invalid editor event '{s}'");
        let event = match name.trim() {
            "paint" => pair(arg).map(|(row, col)| Event::Paint { row, col }),
            "resize" => pair(arg).map(|(rows, cols)| Event::Resize { rows, cols }),
            "cell" => pair(arg).map(|(width, height)| Event::SetCellSize { width, height }),
            "alpha" => arg.trim().parse().ok().map(|alpha| Event::SetAlpha { alpha }),
            "color" => Some(Event::AddColor { color: arg.to_string() }),
            "select" => arg.trim().parse().ok().map(|index| Event::Select { index }),
            "clear" => Some(Event::Clear),
            "import" => Some(Event::Import { url: arg.to_string() }),
            _ => None,
        };
        event.ok_or_else(bad)
    }
}

impl EditorState {
    /// Visible part of the picture
    pub fn view(&self) -> Grid {
        self.full_grid.resized(self.rows, self.cols)
    }

    /// Grow the full grid so the view fits inside it
    fn ensure_full_size(&mut self) {
        let rows = self.full_grid.rows().max(self.rows);
        let cols = self.full_grid.cols().max(self.cols);
        if (rows, cols) != (self.full_grid.rows(), self.full_grid.cols()) {
            self.full_grid = self.full_grid.resized(rows, cols);
        }
    }

    pub fn apply(&mut self, event: Event) {
        debug!(?event, "editor event");
        match event {
            Event::Paint { row, col } => {
                if row >= self.rows || col >= self.cols {
                    return;
                }
                self.ensure_full_size();
                let full_row = self.full_grid.rows() - self.rows + row;
                self.full_grid.set(full_row, col, self.selected);
            }
            Event::Resize { rows, cols } => {
                self.rows = clamp_dim(rows as f64);
                self.cols = clamp_dim(cols as f64);
                self.ensure_full_size();
            }
            Event::SetCellSize { width, height } => {
                self.cell_width = clamp_cell(width as f64);
                self.cell_height = clamp_cell(height as f64);
            }
            Event::SetAlpha { alpha } => {
                if alpha.is_finite() {
                    self.alpha = alpha.clamp(0.0, 1.0);
                }
            }
            Event::AddColor { color } => {
                let color = color.trim();
                if color.is_empty() {
                    return;
                }
                self.palette.push(color.to_string());
                if self.selected == 0 {
                    self.selected = 1;
                }
            }
            Event::Select { index } => {
                self.selected = index.min(self.palette.len() as u32);
            }
            Event::Clear => self.full_grid.clear(),
            Event::Import { url } => match import_url(&url, self) {
                Ok(imported) => self.apply_import(imported),
                Err(err) => warn!(%err, "ignoring editor import"),
            },
        }
    }

    fn apply_import(&mut self, imported: Imported) {
        self.cell_width = imported.cell_width;
        self.cell_height = imported.cell_height;
        if let Some(alpha) = imported.alpha {
            self.alpha = alpha;
        }
        self.rows = imported.grid.rows();
        self.cols = imported.grid.cols();
        self.full_grid = imported.grid;
        self.palette = imported.palette;
    }

    /// Encode the visible grid
    pub fn encode(&self) -> Encoded {
        encode_grid(&self.view(), &self.palette)
    }

    /// Shareable render path: `/r/{w}/{h}[/{data}][?{palette}&alpha=..]`
    pub fn share_path(&self) -> String {
        let encoded = self.encode();
        let mut path = format!("/r/{}/{}", self.cell_width, self.cell_height);
        if !encoded.data.is_empty() {
            path.push('/');
            path.push_str(&encoded.data);
        }
        let alpha = (self.alpha != 1.0).then(|| format!("alpha={}", fmt_num(self.alpha)));
        let query: Vec<&str> = [Some(encoded.query.as_str()), alpha.as_deref()]
            .into_iter()
            .flatten()
            .filter(|q| !q.is_empty())
            .collect();
        if !query.is_empty() {
            path.push('?');
            path.push_str(&query.join("&"));
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_color() -> EditorState {
        let mut st = EditorState::default();
        st.apply(Event::AddColor { color: " #ff0000 ".into() });
        st
    }

    #[test]
    fn test_add_color_selects_first_slot() {
        let st = state_with_color();
        assert_eq!(st.palette, vec!["#ff0000"]);
        assert_eq!(st.selected, 1);
    }

    #[test]
    fn test_paint_and_share_path() {
        let mut st = state_with_color();
        st.apply(Event::Resize { rows: 3, cols: 2 });
        // Bottom-left of the view
        st.apply(Event::Paint { row: 2, col: 0 });
        st.apply(Event::Paint { row: 1, col: 0 });
        assert_eq!(st.view().as_rows(), &[vec![0, 0], vec![1, 0], vec![1, 0]]);
        assert_eq!(st.share_path(), "/r/20/20/1-2/_?pal_c1=ff0000");

        st.apply(Event::SetAlpha { alpha: 0.25 });
        assert_eq!(st.share_path(), "/r/20/20/1-2/_?pal_c1=ff0000&alpha=0.25");
    }

    #[test]
    fn test_paint_outside_view_is_ignored() {
        let mut st = state_with_color();
        st.apply(Event::Paint { row: 99, col: 0 });
        assert!(st.full_grid.is_blank());
    }

    #[test]
    fn test_shrinking_view_keeps_paint() {
        let mut st = state_with_color();
        st.apply(Event::Paint { row: 15, col: 15 });
        st.apply(Event::Resize { rows: 4, cols: 4 });
        assert!(st.view().is_blank());
        st.apply(Event::Resize { rows: 16, cols: 16 });
        assert_eq!(st.view().at(16, 1), 1);
    }

    #[test]
    fn test_clamps() {
        let mut st = EditorState::default();
        st.apply(Event::Resize { rows: 0, cols: 500 });
        assert_eq!((st.rows, st.cols), (1, 128));
        st.apply(Event::SetCellSize { width: 1, height: 99 });
        assert_eq!((st.cell_width, st.cell_height), (4, 64));
        st.apply(Event::SetAlpha { alpha: f64::NAN });
        assert_eq!(st.alpha, 1.0);
        st.apply(Event::Select { index: 5 });
        assert_eq!(st.selected, 0);
    }

    #[test]
    fn test_blank_share_path() {
        assert_eq!(EditorState::default().share_path(), "/r/20/20");
    }

    #[test]
    fn test_import_event_replaces_grid() {
        let mut st = EditorState::default();
        st.apply(Event::Import { url: "/r/10/12/1-2.c2?pal_c2=00ff00".into() });
        assert_eq!((st.rows, st.cols), (2, 1));
        assert_eq!((st.cell_width, st.cell_height), (10, 12));
        assert_eq!(st.share_path(), "/r/10/12/1-2.c2?pal_c2=00ff00");

        // A broken import leaves the state alone
        let before = st.clone();
        st.apply(Event::Import { url: "/r/oops".into() });
        assert_eq!(st, before);
    }

    #[test]
    fn test_event_from_str() {
        assert_eq!("paint:2,3".parse::<Event>(), Ok(Event::Paint { row: 2, col: 3 }));
        assert_eq!("cell:8, 9".parse::<Event>(), Ok(Event::SetCellSize { width: 8, height: 9 }));
        assert_eq!("clear".parse::<Event>(), Ok(Event::Clear));
        assert_eq!(
            "import:/r/20/20/1?a=b".parse::<Event>(),
            Ok(Event::Import { url: "/r/20/20/1?a=b".into() })
        );
        assert!("paint:2".parse::<Event>().is_err());
        assert!("jump".parse::<Event>().is_err());
    }
}
