//! Request assembly: raw key/value pairs to validated render parameters.
//!
//! The routing layer hands over the path pieces (`/r/20/20/<data>`) and the
//! decoded query pairs in order. Nothing here performs I/O.

use crate::error::{RenderError, Result};
use crate::labels::{parse_axis_labels, AxisLabels};
use crate::layout::{CellGeometry, Direction};
use crate::palette::PaletteMap;

pub const DEFAULT_ALPHA: f64 = 1.0;

/// Raw, unvalidated request values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderRequest {
    pub direction: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub data: Option<String>,
    pub query: Vec<(String, String)>,
}

impl RenderRequest {
    /// Everything comes from the query string (`?direction=right&data=...`)
    pub fn from_query<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let query: Vec<(String, String)> =
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        RenderRequest {
            direction: get(&query, "direction").map(str::to_string),
            width: get(&query, "width").map(str::to_string),
            height: get(&query, "height").map(str::to_string),
            data: get(&query, "data").map(str::to_string),
            query,
        }
    }

    /// Path form `/{r|b}/{width}/{height}/{data...}` plus query pairs
    pub fn from_path<I, K, V>(direction: &str, width: &str, height: &str, data: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        RenderRequest {
            direction: Some(direction.to_string()),
            width: Some(width.to_string()),
            height: Some(height.to_string()),
            data: Some(data.to_string()),
            query: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        get(&self.query, key)
    }
}

fn get<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// Validated parameters shared by every output format
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub direction: Direction,
    pub geometry: CellGeometry,
    pub alpha: f64,
    /// Caller's base color, validated later by the resolver
    pub color: Option<String>,
    pub palette: PaletteMap,
    pub labels: AxisLabels,
}

impl RenderParams {
    pub fn new(direction: Direction, geometry: CellGeometry) -> Self {
        RenderParams {
            direction,
            geometry,
            alpha: DEFAULT_ALPHA,
            color: None,
            palette: PaletteMap::new(),
            labels: AxisLabels::default(),
        }
    }

    /// Validate a request. Errors are reported in the order direction, data, width, height.
    pub fn from_request(req: &RenderRequest) -> Result<(RenderParams, String)> {
        let direction = Direction::parse(req.direction.as_deref())?;
        let data = req
            .data
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or(RenderError::MissingData)?
            .to_string();
        let width = dimension("width", req.width.as_deref())?;
        let height = dimension("height", req.height.as_deref())?;

        let (col_gap, row_gap) = gaps(req);
        let geometry = CellGeometry::new(width, height).with_gaps(col_gap, row_gap);

        let params = RenderParams {
            direction,
            geometry,
            alpha: alpha(req.get("alpha")),
            color: req.get("color").filter(|c| !c.is_empty()).map(str::to_string),
            palette: palette(&req.query),
            labels: parse_axis_labels(&req.query),
        };
        Ok((params, data))
    }
}

fn number(value: &str) -> Option<f64> {
    let v = value.trim();
    if v.is_empty() {
        return Some(0.0);
    }
    v.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn dimension(name: &'static str, value: Option<&str>) -> Result<f64> {
    let raw = value.unwrap_or("");
    match number(raw) {
        Some(n) if n > 0.0 => Ok(n),
        _ => Err(RenderError::InvalidDimension {
            name,
            value: raw.to_string(),
        }),
    }
}

fn alpha(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|a| a.is_finite())
        .map(|a| a.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_ALPHA)
}

fn gap(value: &str) -> f64 {
    number(value).unwrap_or(0.0).max(0.0)
}

/// `gap=x,y` first, then the individual keys override
fn gaps(req: &RenderRequest) -> (f64, f64) {
    let mut col_gap = 0.0;
    let mut row_gap = 0.0;

    if let Some(pair) = req.get("gap").filter(|g| !g.is_empty()) {
        let mut parts = pair.splitn(2, ',');
        if let Some(gx) = parts.next().filter(|s| !s.is_empty()) {
            col_gap = gap(gx);
        }
        if let Some(gy) = parts.next().filter(|s| !s.is_empty()) {
            row_gap = gap(gy);
        }
    }
    if let Some(v) = req.get("yGap").or_else(|| req.get("rowGap")) {
        row_gap = gap(v);
    }
    if let Some(v) = req.get("xGap").or_else(|| req.get("colGap")) {
        col_gap = gap(v);
    }
    (col_gap, row_gap)
}

/// `pal_<label>` must start with a letter and continue with word chars or `-`
pub(crate) fn palette_label(key: &str) -> Option<&str> {
    let label = key.strip_prefix("pal_")?;
    let mut chars = label.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    valid.then_some(label)
}

fn palette(pairs: &[(String, String)]) -> PaletteMap {
    let mut map = PaletteMap::new();
    for (key, value) in pairs {
        if let Some(label) = palette_label(key) {
            map.insert(label, value.trim());
        }
    }
    if let Some(key) = get(pairs, "paletteDefault").filter(|k| !k.is_empty()) {
        map.set_default_key(key);
    }
    map
}
