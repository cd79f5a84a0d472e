// Shared token-level parsers for both data dialects

use nom::{
    character::complete::{digit1, multispace0},
    combinator::map_res,
    error::ParseError,
    number::complete::double,
    sequence::delimited,
    IResult,
};

/// Wrap a parser to consume surrounding whitespace
pub fn ws<'a, F, O, E>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
    F: FnMut(&'a str) -> IResult<&'a str, O, E>,
    E: ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

/// Unsigned integer row index (current dialect)
pub fn unsigned(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |s: &str| s.parse::<u32>())(input)
}

/// Any float literal, including signs and exponents (legacy dialect)
pub fn decimal(input: &str) -> IResult<&str, f64> {
    double(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned() {
        assert_eq!(unsigned("42-"), Ok(("-", 42)));
        assert!(unsigned("-4").is_err());
        assert!(unsigned("99999999999").is_err());
    }

    #[test]
    fn test_decimal() {
        assert_eq!(decimal("2.5:"), Ok((":", 2.5)));
        assert_eq!(decimal("-3"), Ok(("", -3.0)));
        assert!(decimal("abc").is_err());
    }

    #[test]
    fn test_ws() {
        let (rest, n) = ws(unsigned)("  7  ").unwrap();
        assert_eq!((rest, n), ("", 7));
    }
}
