//! Layout engine: grid coordinates to canvas coordinates.
//!
//! Content space has row 1 at the bottom. Axis labels reserve a fixed margin
//! (left for row labels, bottom for column labels) and add outer padding
//! around the whole canvas. `Direction::Bottom` turns the content group by 90
//! degrees, which swaps the emitted canvas width and height.

use crate::error::{RenderError, Result};

pub const LABEL_MARGIN: f64 = 56.0;
pub const OUTER_PADDING: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Right,
    Bottom,
}

impl Direction {
    /// Accepts `right`/`bottom` and the path shorthands `r`/`b`
    pub fn parse(value: Option<&str>) -> Result<Direction> {
        match value.map(str::trim) {
            None | Some("") => Err(RenderError::MissingDirection),
            Some("right") | Some("r") => Ok(Direction::Right),
            Some("bottom") | Some("b") => Ok(Direction::Bottom),
            Some(other) => Err(RenderError::InvalidDirection(other.to_string())),
        }
    }

    pub fn shorthand(self) -> &'static str {
        match self {
            Direction::Right => "r",
            Direction::Bottom => "b",
        }
    }
}

/// Cell size and spacing, all in canvas units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellGeometry {
    pub cell_width: f64,
    pub cell_height: f64,
    pub col_gap: f64,
    pub row_gap: f64,
}

impl CellGeometry {
    pub fn new(cell_width: f64, cell_height: f64) -> Self {
        CellGeometry {
            cell_width,
            cell_height,
            col_gap: 0.0,
            row_gap: 0.0,
        }
    }

    pub fn with_gaps(mut self, col_gap: f64, row_gap: f64) -> Self {
        self.col_gap = col_gap.max(0.0);
        self.row_gap = row_gap.max(0.0);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub columns: u32,
    pub rows: u32,
    pub geometry: CellGeometry,
    pub direction: Direction,
    pub content_width: f64,
    pub content_height: f64,
    pub margin_left: f64,
    pub margin_bottom: f64,
    pub padding: f64,
}

fn span(count: u32, size: f64, gap: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    count as f64 * size + (count - 1) as f64 * gap
}

impl Layout {
    pub fn new(
        columns: u32,
        rows: u32,
        geometry: CellGeometry,
        direction: Direction,
        has_row_labels: bool,
        has_column_labels: bool,
    ) -> Layout {
        let has_labels = has_row_labels || has_column_labels;
        Layout {
            columns,
            rows,
            geometry,
            direction,
            content_width: span(columns, geometry.cell_width, geometry.col_gap),
            content_height: span(rows, geometry.cell_height, geometry.row_gap),
            margin_left: if has_row_labels { LABEL_MARGIN } else { 0.0 },
            margin_bottom: if has_column_labels { LABEL_MARGIN } else { 0.0 },
            padding: if has_labels { OUTER_PADDING } else { 0.0 },
        }
    }

    pub fn has_labels(&self) -> bool {
        self.padding > 0.0
    }

    /// Left edge of column `i` (1-based)
    pub fn pixel_x(&self, i: u32) -> f64 {
        let g = &self.geometry;
        self.margin_left + (i as f64 - 1.0) * (g.cell_width + g.col_gap)
    }

    /// Top edge of row `j` (1-based, counted from the bottom)
    pub fn pixel_y(&self, j: u32) -> f64 {
        let g = &self.geometry;
        let j = j as f64;
        self.content_height - (j * g.cell_height + (j - 1.0) * g.row_gap)
    }

    /// Unrotated drawing width: left margin plus content
    pub fn width(&self) -> f64 {
        self.margin_left + self.content_width
    }

    /// Unrotated drawing height: content plus bottom margin
    pub fn height(&self) -> f64 {
        self.content_height + self.margin_bottom
    }

    /// Emitted document size, orientation and padding included
    pub fn canvas_size(&self) -> (f64, f64) {
        let (w, h) = match self.direction {
            Direction::Right => (self.width(), self.height()),
            Direction::Bottom => (self.height(), self.width()),
        };
        (w + 2.0 * self.padding, h + 2.0 * self.padding)
    }

    /// Transform for the content group; translate must precede rotate
    pub fn content_transform(&self) -> Option<String> {
        match self.direction {
            Direction::Right => None,
            Direction::Bottom => Some(format!("translate({},0) rotate(90)", fmt_num(self.height()))),
        }
    }

    pub fn cell_rect(&self, column: u32, row: u32) -> Rect {
        Rect {
            x: self.pixel_x(column),
            y: self.pixel_y(row),
            width: self.geometry.cell_width,
            height: self.geometry.cell_height,
        }
    }

    /// Map a content-space rectangle into final canvas space
    pub fn to_canvas(&self, r: Rect) -> Rect {
        let rotated = match self.direction {
            Direction::Right => r,
            // rotate(90) sends (x, y) to (-y, x), then translate by (height, 0)
            Direction::Bottom => Rect {
                x: self.height() - (r.y + r.height),
                y: r.x,
                width: r.height,
                height: r.width,
            },
        };
        Rect {
            x: rotated.x + self.padding,
            y: rotated.y + self.padding,
            ..rotated
        }
    }

    /// Anchor point for the label under column `i`
    pub fn column_label_anchor(&self, i: u32) -> (f64, f64) {
        (
            self.pixel_x(i) + self.geometry.cell_width / 2.0,
            self.content_height + 20.0,
        )
    }

    /// Anchor point for the label left of row `j`
    pub fn row_label_anchor(&self, j: u32) -> (f64, f64) {
        (
            (self.margin_left - 6.0).max(2.0),
            self.pixel_y(j) + self.geometry.cell_height - 4.0,
        )
    }
}

/// Format a coordinate without a trailing `.0` for whole numbers
pub fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}
