// Data string parser
//
// Two dialects are auto-detected: any `:` or `|` selects the legacy dialect,
// everything else is the current slash/underscore dialect.

pub mod ast;
pub mod lexer;
pub mod v1;
pub mod v2;

pub use ast::{Column, Data, Segment};

use crate::error::{RenderError, Result};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    V1,
    V2,
}

impl Dialect {
    pub fn detect(text: &str) -> Dialect {
        if text.contains(':') || text.contains('|') {
            Dialect::V1
        } else {
            Dialect::V2
        }
    }
}

/// Drop a trailing `.svg` / `.png` extension left over from the request path
pub fn strip_extension(text: &str) -> &str {
    text.strip_suffix(".svg")
        .or_else(|| text.strip_suffix(".png"))
        .unwrap_or(text)
}

/// Parse a data string of either dialect into normalized columns
pub fn parse_data(text: &str) -> Result<Data> {
    let text = strip_extension(text.trim()).trim();
    if text.is_empty() {
        return Err(RenderError::MissingData);
    }

    let dialect = Dialect::detect(text);
    debug!(?dialect, len = text.len(), "parsing data");

    let columns = match dialect {
        Dialect::V1 => v1::parse_v1(text)?,
        Dialect::V2 => v2::parse_v2(text)?,
    };
    Ok(Data::new(columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_detection() {
        assert_eq!(Dialect::detect("1:3"), Dialect::V1);
        assert_eq!(Dialect::detect("1|3"), Dialect::V1);
        assert_eq!(Dialect::detect("1-3/4"), Dialect::V2);
        assert_eq!(Dialect::detect("5"), Dialect::V2);
    }

    #[test]
    fn test_empty_is_missing_data() {
        assert_eq!(parse_data(""), Err(RenderError::MissingData));
        assert_eq!(parse_data("  "), Err(RenderError::MissingData));
        assert_eq!(parse_data(".svg"), Err(RenderError::MissingData));
    }

    #[test]
    fn test_extension_is_stripped() {
        let data = parse_data("1-2/3.svg").unwrap();
        assert_eq!(data.column_count(), 2);
        assert_eq!(data.columns[1].segments, vec![Segment::cell(3)]);
        assert_eq!(parse_data("4.png").unwrap().row_count(), 4);
    }

    #[test]
    fn test_same_digits_differ_by_dialect() {
        // A bare number is a height in v1 and a single cell in v2
        let v1 = parse_data("3,1:1").unwrap();
        let v2 = parse_data("3/1").unwrap();
        assert_eq!(v1.columns[0].segments, vec![Segment::new(1, 3)]);
        assert_eq!(v2.columns[0].segments, vec![Segment::cell(3)]);
    }

    #[test]
    fn test_failure_aborts_whole_parse() {
        assert!(parse_data("1/2/x").is_err());
        assert!(parse_data("1:2,zz").is_err());
    }
}
