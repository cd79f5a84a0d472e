// Current dialect: `~c2_1-3_5.c4/_/-2`
//
// Columns are slash separated, segments underscore separated. A leading
// `~label` token sets the column default label; `.label` suffixes a segment.

use super::ast::{Column, Segment, V2Span, V2Token};
use super::lexer::unsigned;
use crate::error::{RenderError, Result};
use nom::{
    branch::alt,
    character::complete::char,
    combinator::{all_consuming, map, opt},
    sequence::{pair, preceded},
    IResult,
};

/// Parse a segment base
/// Format: N | a-b | a- | -b
pub fn parse_span(input: &str) -> IResult<&str, V2Span> {
    all_consuming(alt((
        map(
            pair(opt(unsigned), preceded(char('-'), opt(unsigned))),
            |(start, end)| V2Span::Range { start, end },
        ),
        map(unsigned, V2Span::Cell),
    )))(input)
}

/// Split a segment token into base and label; the label follows the last `.`
pub fn parse_v2_token(token: &str) -> Result<V2Token> {
    let (base, label) = match token.rfind('.') {
        Some(idx) => {
            let label = &token[idx + 1..];
            if label.is_empty() {
                return Err(RenderError::malformed(token, "empty color label after '.'"));
            }
            (&token[..idx], Some(label.to_string()))
        }
        None => (token, None),
    };

    let (_, span) = parse_span(base)
        .map_err(|_| RenderError::malformed(token, "expected N, a-b, a- or -b"))?;
    Ok(V2Token { span, label })
}

fn row(token: &str, value: u32) -> Result<u32> {
    if value < 1 {
        return Err(RenderError::malformed(token, "y must be >= 1"));
    }
    Ok(value)
}

fn normalize(token: &str, parsed: V2Token) -> Result<Segment> {
    let mut seg = match parsed.span {
        V2Span::Cell(y) => Segment::cell(row(token, y)?),
        V2Span::Range { start: None, end: None } => {
            return Err(RenderError::malformed(token, "range has neither start nor end"))
        }
        V2Span::Range { start, end: None } => {
            let y0 = row(token, start.unwrap_or(1))?;
            Segment {
                y0,
                y1: y0,
                open_end: true,
                label: None,
            }
        }
        V2Span::Range { start, end: Some(end) } => {
            Segment::new(row(token, start.unwrap_or(1))?, row(token, end)?)
        }
    };
    seg.label = parsed.label;
    Ok(seg)
}

fn parse_column(text: &str) -> Result<Column> {
    let mut tokens = text
        .split('_')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .peekable();

    let mut column = Column::default();
    if let Some(&first) = tokens.peek() {
        if let Some(label) = first.strip_prefix('~') {
            if label.is_empty() {
                return Err(RenderError::malformed(first, "empty column label after '~'"));
            }
            column.default_label = Some(label.to_string());
            tokens.next();
        }
    }

    for token in tokens {
        let parsed = parse_v2_token(token)?;
        column.segments.push(normalize(token, parsed)?);
    }
    Ok(column)
}

/// Parse a whole current-dialect data string into columns
pub fn parse_v2(text: &str) -> Result<Vec<Column>> {
    text.split('/').map(|col| parse_column(col.trim())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_span() {
        assert_eq!(parse_span("4").unwrap().1, V2Span::Cell(4));
        assert_eq!(
            parse_span("2-6").unwrap().1,
            V2Span::Range { start: Some(2), end: Some(6) }
        );
        assert_eq!(
            parse_span("-6").unwrap().1,
            V2Span::Range { start: None, end: Some(6) }
        );
        assert_eq!(
            parse_span("2-").unwrap().1,
            V2Span::Range { start: Some(2), end: None }
        );
        assert!(parse_span("2-x").is_err());
        assert!(parse_span("").is_err());
    }

    #[test]
    fn test_token_label_uses_last_dot() {
        let token = parse_v2_token("1-3.c2").unwrap();
        assert_eq!(token.label.as_deref(), Some("c2"));
        assert!(parse_v2_token("3.").is_err());
    }

    #[test]
    fn test_single_number_is_one_cell() {
        let cols = parse_v2("5").unwrap();
        assert_eq!(cols[0].segments, vec![Segment::cell(5)]);
    }

    #[test]
    fn test_descending_range_normalizes() {
        let cols = parse_v2("5-2").unwrap();
        assert_eq!(cols[0].segments, vec![Segment::new(2, 5)]);
    }

    #[test]
    fn test_column_default_and_labels() {
        let cols = parse_v2("~c2_1-3_5.c9").unwrap();
        assert_eq!(cols[0].default_label.as_deref(), Some("c2"));
        assert_eq!(
            cols[0].segments,
            vec![Segment::new(1, 3), Segment::cell(5).with_label("c9")]
        );
    }

    #[test]
    fn test_placeholders_keep_positions() {
        let cols = parse_v2("1/_//2").unwrap();
        assert_eq!(cols.len(), 4);
        assert!(cols[1].is_empty());
        assert!(cols[2].is_empty());
        assert_eq!(cols[3].segments, vec![Segment::cell(2)]);
    }

    #[test]
    fn test_open_end() {
        let cols = parse_v2("3-.red").unwrap();
        let seg = &cols[0].segments[0];
        assert!(seg.open_end);
        assert_eq!((seg.y0, seg.y1), (3, 3));
        assert_eq!(seg.label.as_deref(), Some("red"));
    }

    #[test]
    fn test_errors_name_the_token() {
        let err = parse_v2("1_0").unwrap_err();
        assert_eq!(err, RenderError::malformed("0", "y must be >= 1"));
        assert!(parse_v2("~").is_err());
        assert!(parse_v2("-").is_err());
        assert!(parse_v2("1_abc").is_err());
        assert!(parse_v2("2_~c1").is_err());
    }
}
