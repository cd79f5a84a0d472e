// Normalized structure produced by both data dialects

/// Inclusive run of rows in one column. Row 1 is the bottom row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub y0: u32,
    pub y1: u32,
    /// Declared without an upper bound (`N-` / `N:`); `y1 == y0` until resolved
    pub open_end: bool,
    pub label: Option<String>,
}

impl Segment {
    pub fn new(y0: u32, y1: u32) -> Self {
        Segment {
            y0: y0.min(y1),
            y1: y0.max(y1),
            open_end: false,
            label: None,
        }
    }

    pub fn cell(y: u32) -> Self {
        Segment::new(y, y)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Extend an open-ended segment up to `rows`. Closed segments are returned unchanged.
    pub fn resolve_open_end(&self, rows: u32) -> Segment {
        let mut seg = self.clone();
        if seg.open_end {
            seg.y1 = seg.y0.max(rows);
            seg.open_end = false;
        }
        seg
    }

    pub fn rows(&self) -> impl Iterator<Item = u32> {
        self.y0..=self.y1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Column {
    pub segments: Vec<Segment>,
    /// Label used by segments that carry none of their own (`~label`)
    pub default_label: Option<String>,
}

impl Column {
    pub fn new(segments: Vec<Segment>) -> Self {
        Column {
            segments,
            default_label: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Parsed data: one entry per top-level column token, placeholders included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Data {
    pub columns: Vec<Column>,
}

impl Data {
    pub fn new(columns: Vec<Column>) -> Self {
        Data { columns }
    }

    pub fn column_count(&self) -> u32 {
        self.columns.len() as u32
    }

    /// Highest `y1` over all segments; 0 without columns, at least 1 otherwise.
    pub fn row_count(&self) -> u32 {
        if self.columns.is_empty() {
            return 0;
        }
        self.columns
            .iter()
            .flat_map(|c| c.segments.iter())
            .map(|s| s.y1)
            .fold(1, u32::max)
    }

    pub fn resolve_open_ends(&self, rows: u32) -> Data {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                segments: c.segments.iter().map(|s| s.resolve_open_end(rows)).collect(),
                default_label: c.default_label.clone(),
            })
            .collect();
        Data { columns }
    }
}

/// Legacy dialect token (`a:b`, `:b`, `a:`, `N`)
#[derive(Debug, Clone, PartialEq)]
pub enum V1Token {
    /// Bare number: a column filled from row 1 up to N
    Height(f64),
    /// `end == None` is the trailing-colon open form
    Range { start: Option<f64>, end: Option<f64> },
}

/// Current dialect token base (`N`, `a-b`, `a-`, `-b`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum V2Span {
    Cell(u32),
    /// `end == None` is the open form `N-`
    Range { start: Option<u32>, end: Option<u32> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V2Token {
    pub span: V2Span,
    pub label: Option<String>,
}
