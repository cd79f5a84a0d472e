// Legacy dialect: `1:3|5,,:2|4:`
//
// Columns are comma separated, segments pipe separated. A bare number is a
// column height; ranges use `start:end` with an omitted start meaning 1 and an
// omitted end meaning open-ended.

use super::ast::{Column, Segment, V1Token};
use super::lexer::{decimal, ws};
use crate::error::{RenderError, Result};
use nom::{
    character::complete::char,
    combinator::{all_consuming, opt},
    sequence::{pair, preceded},
    IResult,
};

/// Parse one segment token
/// Format: N | a:b | :b | a:
pub fn parse_v1_token(input: &str) -> IResult<&str, V1Token> {
    let (input, (start, range)) = all_consuming(ws(pair(
        opt(decimal),
        opt(preceded(char(':'), opt(decimal))),
    )))(input)?;

    let token = match (start, range) {
        (Some(height), None) => V1Token::Height(height),
        (start, Some(end)) => V1Token::Range { start, end },
        (None, None) => {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Digit,
            )))
        }
    };
    Ok((input, token))
}

fn row(token: &str, value: f64) -> Result<u32> {
    if !value.is_finite() {
        return Err(RenderError::malformed(token, "not a finite number"));
    }
    if value < 1.0 {
        return Err(RenderError::malformed(token, "y must be >= 1"));
    }
    if value > u32::MAX as f64 {
        return Err(RenderError::malformed(token, "y is out of range"));
    }
    Ok(value.floor() as u32)
}

fn normalize(token: &str, parsed: V1Token) -> Result<Segment> {
    match parsed {
        V1Token::Height(h) => Ok(Segment::new(1, row(token, h)?)),
        V1Token::Range { start, end: None } => {
            let y0 = row(token, start.unwrap_or(1.0))?;
            Ok(Segment {
                y0,
                y1: y0,
                open_end: true,
                label: None,
            })
        }
        V1Token::Range { start, end: Some(end) } => {
            let a = row(token, start.unwrap_or(1.0))?;
            let b = row(token, end)?;
            Ok(Segment::new(a, b))
        }
    }
}

/// Parse a whole legacy data string into columns
pub fn parse_v1(text: &str) -> Result<Vec<Column>> {
    text.split(',')
        .map(|col| {
            let segments = col
                .split('|')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| {
                    let (_, parsed) = parse_v1_token(part)
                        .map_err(|_| RenderError::malformed(part, "expected N, a:b, :b or a:"))?;
                    normalize(part, parsed)
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Column::new(segments))
        })
        .collect()
}
