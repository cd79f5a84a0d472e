// Axis label parameters
//
// Three forms, applied in order; later forms only fill indices still unset:
//   row3=Mon / column2=Q2 / y3 / x2   explicit 1-based index
//   rows=a,b,c / columns=a,b          CSV shorthand (aliases: row|ylabel|y|yLabel|yLabels,
//                                     column|xlabel|x|xLabel|xLabels)
//   label=y:a,b / label=x：a,b         repeated generic form (also `yの...`)

use nom::{
    bytes::complete::tag_no_case,
    combinator::all_consuming,
    sequence::preceded,
    IResult,
};
use std::collections::BTreeMap;

use crate::parser::lexer::unsigned;

pub type LabelMap = BTreeMap<u32, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisLabels {
    /// Row-axis labels, drawn left of the content
    pub rows: LabelMap,
    /// Column-axis labels, drawn under the content
    pub columns: LabelMap,
}

impl AxisLabels {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty()
    }
}

const ROW_ALIASES: [&str; 6] = ["rows", "row", "ylabel", "y", "yLabel", "yLabels"];
const COLUMN_ALIASES: [&str; 6] = ["columns", "column", "xlabel", "x", "xLabel", "xLabels"];

/// Prefixes of the explicit index keys (`row3`, `y3`)
const ROW_PREFIXES: &[&str] = &["row", "y"];
const COLUMN_PREFIXES: &[&str] = &["column", "x"];

fn indexed<'a>(prefix: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, u32> {
    all_consuming(preceded(tag_no_case(prefix), unsigned))
}

/// 1-based index of an explicit label key such as `row3` or `x2`
fn index_key(key: &str, prefixes: &[&'static str]) -> Option<u32> {
    prefixes
        .iter()
        .find_map(|&prefix| indexed(prefix)(key).ok())
        .map(|(_, idx)| idx)
        .filter(|&idx| idx > 0)
}

fn split_csv(list: &str) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(list.as_bytes());
    reader
        .records()
        .next()
        .and_then(|r| r.ok())
        .map(|record| {
            record
                .iter()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn fill_sequential(items: Vec<String>, target: &mut LabelMap) {
    for (i, label) in items.into_iter().enumerate() {
        target.entry(i as u32 + 1).or_insert(label);
    }
}

fn first_non_empty<'a>(pairs: &'a [(String, String)], keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    })
}

/// `x:a,b` / `y：a,b` / `yのa,b` -> axis and its list
fn generic_label(value: &str) -> Option<(char, &str)> {
    let mut chars = value.chars();
    let axis = chars.next().filter(|c| matches!(c, 'x' | 'y'))?;
    let sep = chars.next().filter(|c| matches!(c, ':' | '：' | 'の'))?;
    Some((axis, &value[axis.len_utf8() + sep.len_utf8()..]))
}

pub fn parse_axis_labels(pairs: &[(String, String)]) -> AxisLabels {
    let mut labels = AxisLabels::default();

    for (key, value) in pairs {
        if let Some(idx) = index_key(key, ROW_PREFIXES) {
            labels.rows.insert(idx, value.clone());
        } else if let Some(idx) = index_key(key, COLUMN_PREFIXES) {
            labels.columns.insert(idx, value.clone());
        }
    }

    if let Some(list) = first_non_empty(pairs, &ROW_ALIASES) {
        fill_sequential(split_csv(list), &mut labels.rows);
    }
    if let Some(list) = first_non_empty(pairs, &COLUMN_ALIASES) {
        fill_sequential(split_csv(list), &mut labels.columns);
    }

    for (_, value) in pairs.iter().filter(|(k, _)| k == "label") {
        match generic_label(value) {
            Some(('y', list)) => fill_sequential(split_csv(list), &mut labels.rows),
            Some((_, list)) => fill_sequential(split_csv(list), &mut labels.columns),
            None => {}
        }
    }

    labels
}
