//! Palette map and the color resolution chain.
//!
//! Resolution order for a segment:
//! ```text
//! 1. segment label      -> palette entry
//! 2. segment label      -> raw color token
//! 3. column default     -> palette entry
//! 4. palette default key (explicit, else first non-sentinel entry)
//! 5. base color          (caller supplied, else DEFAULT_COLOR)
//! ```
//! Each step is a standalone strategy; the first hit wins.

use crate::color::{is_sentinel, sanitize_color, DEFAULT_COLOR};
use crate::parser::ast::{Column, Segment};
use tracing::debug;

/// Label -> raw color token, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteMap {
    entries: Vec<(String, String)>,
    explicit_default: Option<String>,
}

impl PaletteMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry. A replaced label keeps its original position.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// Valid color for a palette label; invalid tokens count as absent
    pub fn color(&self, label: &str) -> Option<String> {
        self.get(label).and_then(sanitize_color)
    }

    pub fn set_default_key(&mut self, label: impl Into<String>) {
        self.explicit_default = Some(label.into());
    }

    /// Explicit default key, else the first entry not holding the sentinel color
    pub fn default_key(&self) -> Option<&str> {
        self.explicit_default.as_deref().or_else(|| {
            self.entries
                .iter()
                .find(|(_, v)| !is_sentinel(v))
                .map(|(l, _)| l.as_str())
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which step of the chain produced a color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSource {
    SegmentLabel,
    RawToken,
    ColumnDefault,
    PaletteDefault,
    Fallback,
}

/// Inputs visible to every strategy
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    pub segment_label: Option<&'a str>,
    pub column_default: Option<&'a str>,
    pub palette: &'a PaletteMap,
    pub base_color: &'a str,
}

pub type Strategy = fn(&Lookup<'_>) -> Option<String>;

fn from_segment_label(l: &Lookup<'_>) -> Option<String> {
    l.segment_label.and_then(|label| l.palette.color(label))
}

fn from_raw_token(l: &Lookup<'_>) -> Option<String> {
    l.segment_label.and_then(sanitize_color)
}

fn from_column_default(l: &Lookup<'_>) -> Option<String> {
    l.column_default.and_then(|label| l.palette.color(label))
}

fn from_palette_default(l: &Lookup<'_>) -> Option<String> {
    l.palette.default_key().and_then(|key| l.palette.color(key))
}

fn from_base_color(l: &Lookup<'_>) -> Option<String> {
    Some(l.base_color.to_string())
}

pub const STRATEGIES: [(ColorSource, Strategy); 5] = [
    (ColorSource::SegmentLabel, from_segment_label),
    (ColorSource::RawToken, from_raw_token),
    (ColorSource::ColumnDefault, from_column_default),
    (ColorSource::PaletteDefault, from_palette_default),
    (ColorSource::Fallback, from_base_color),
];

/// Run the chain for one lookup
pub fn resolve_lookup(lookup: &Lookup<'_>) -> (String, ColorSource) {
    STRATEGIES
        .iter()
        .find_map(|(source, strategy)| strategy(lookup).map(|c| (c, *source)))
        .unwrap_or_else(|| (lookup.base_color.to_string(), ColorSource::Fallback))
}

/// Resolves segment colors against one palette and base color
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    palette: &'a PaletteMap,
    base_color: String,
}

impl<'a> Resolver<'a> {
    /// `base_color` is the caller's `color` parameter; invalid or absent means `DEFAULT_COLOR`
    pub fn new(palette: &'a PaletteMap, base_color: Option<&str>) -> Self {
        let base_color = base_color
            .and_then(sanitize_color)
            .unwrap_or_else(|| DEFAULT_COLOR.to_string());
        Resolver { palette, base_color }
    }

    pub fn base_color(&self) -> &str {
        &self.base_color
    }

    pub fn resolve_with_source(&self, column: &Column, segment: &Segment) -> (String, ColorSource) {
        let lookup = Lookup {
            segment_label: segment.label.as_deref(),
            column_default: column.default_label.as_deref(),
            palette: self.palette,
            base_color: &self.base_color,
        };
        let (color, source) = resolve_lookup(&lookup);
        if let Some(label) = lookup.segment_label {
            if !matches!(source, ColorSource::SegmentLabel | ColorSource::RawToken) {
                debug!(label, ?source, "segment label did not resolve");
            }
        }
        (color, source)
    }

    pub fn resolve(&self, column: &Column, segment: &Segment) -> String {
        self.resolve_with_source(column, segment).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(
        palette: &'a PaletteMap,
        segment_label: Option<&'a str>,
        column_default: Option<&'a str>,
    ) -> Lookup<'a> {
        Lookup {
            segment_label,
            column_default,
            palette,
            base_color: DEFAULT_COLOR,
        }
    }

    #[test]
    fn test_default_key_skips_sentinel() {
        let mut pal = PaletteMap::new();
        pal.insert("c1", "2C7BE5");
        pal.insert("c2", "#ff0000");
        assert_eq!(pal.default_key(), Some("c2"));
        // Sentinel entries stay addressable by label
        assert_eq!(pal.color("c1").as_deref(), Some("#2C7BE5"));

        pal.set_default_key("c1");
        assert_eq!(pal.default_key(), Some("c1"));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut pal = PaletteMap::new();
        pal.insert("a", "red");
        pal.insert("b", "blue");
        pal.insert("a", "green");
        let entries: Vec<_> = pal.iter().collect();
        assert_eq!(entries, vec![("a", "green"), ("b", "blue")]);
    }

    #[test]
    fn test_each_strategy_in_isolation() {
        let mut pal = PaletteMap::new();
        pal.insert("c2", "111111");

        let l = lookup(&pal, Some("c2"), None);
        assert_eq!(from_segment_label(&l).as_deref(), Some("#111111"));

        let l = lookup(&pal, Some("0x00ff00"), None);
        assert_eq!(from_segment_label(&l), None);
        assert_eq!(from_raw_token(&l).as_deref(), Some("#00ff00"));

        let l = lookup(&pal, None, Some("c2"));
        assert_eq!(from_column_default(&l).as_deref(), Some("#111111"));

        let l = lookup(&pal, None, None);
        assert_eq!(from_palette_default(&l).as_deref(), Some("#111111"));
        assert_eq!(from_base_color(&l).as_deref(), Some(DEFAULT_COLOR));
    }

    #[test]
    fn test_priority_order() {
        let mut pal = PaletteMap::new();
        pal.insert("c1", "#aaaaaa");
        pal.insert("c2", "#111111");

        let (c, s) = resolve_lookup(&lookup(&pal, Some("c2"), Some("c1")));
        assert_eq!((c.as_str(), s), ("#111111", ColorSource::SegmentLabel));

        let (c, s) = resolve_lookup(&lookup(&pal, Some("orange"), Some("c2")));
        assert_eq!((c.as_str(), s), ("orange", ColorSource::RawToken));

        // Unknown, non-color label falls to the column default, not the fallback
        let (c, s) = resolve_lookup(&lookup(&pal, Some("c9"), Some("c2")));
        assert_eq!((c.as_str(), s), ("#111111", ColorSource::ColumnDefault));

        let (c, s) = resolve_lookup(&lookup(&pal, Some("c9"), Some("c7")));
        assert_eq!((c.as_str(), s), ("#aaaaaa", ColorSource::PaletteDefault));

        let empty = PaletteMap::new();
        let (c, s) = resolve_lookup(&lookup(&empty, Some("c9"), None));
        assert_eq!((c.as_str(), s), (DEFAULT_COLOR, ColorSource::Fallback));
    }

    #[test]
    fn test_invalid_palette_value_falls_through() {
        let mut pal = PaletteMap::new();
        pal.insert("nope", "not a color");
        pal.insert("good", "#123456");
        let (c, s) = resolve_lookup(&lookup(&pal, Some("nope"), None));
        // "nope" has no usable palette value, but it is an alphabetic name
        assert_eq!((c.as_str(), s), ("nope", ColorSource::RawToken));

        // The default key is "nope" too, whose value is unusable
        let (c, s) = resolve_lookup(&lookup(&pal, None, Some("nope")));
        assert_eq!((c.as_str(), s), (DEFAULT_COLOR, ColorSource::Fallback));

        let (c, s) = resolve_lookup(&lookup(&pal, None, Some("good")));
        assert_eq!((c.as_str(), s), ("#123456", ColorSource::ColumnDefault));
    }

    #[test]
    fn test_resolver_base_color() {
        let pal = PaletteMap::new();
        assert_eq!(Resolver::new(&pal, Some("red")).base_color(), "red");
        assert_eq!(Resolver::new(&pal, Some("no way")).base_color(), DEFAULT_COLOR);
        assert_eq!(Resolver::new(&pal, None).base_color(), DEFAULT_COLOR);

        let col = Column::default();
        let seg = Segment::cell(1);
        assert_eq!(Resolver::new(&pal, Some("0x010203")).resolve(&col, &seg), "#010203");
    }
}
