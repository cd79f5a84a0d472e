//! SVG serializer for compiled scenes.
//!
//! Pure functions with no I/O: a [`SceneGraph`] in, a complete document
//! string out. Every cell is its own `<rect>`; shapes are never merged.

use std::fmt::Write;

use crate::ir::{DrawCommand, SceneGraph};
use crate::layout::fmt_num;

pub const LABEL_FONT_SIZE: u32 = 12;
pub const LABEL_FILL: &str = "#334155";
pub const BACKGROUND_FILL: &str = "#ffffff";

pub const ERROR_WIDTH: u32 = 600;
pub const ERROR_HEIGHT: u32 = 80;

/// Escape the five XML special characters for text content and attribute values
pub fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn write_preamble(out: &mut String, width: f64, height: f64) {
    let (w, h) = (fmt_num(width), fmt_num(height));
    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
}

fn write_cells(out: &mut String, scene: &SceneGraph) {
    let _ = write!(out, r#"<g class="cells" fill-opacity="{}">"#, fmt_num(scene.alpha));
    for (rect, fill) in scene.cells() {
        let _ = write!(
            out,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="none"/>"#,
            fmt_num(rect.x),
            fmt_num(rect.y),
            fmt_num(rect.width),
            fmt_num(rect.height),
            xml_escape(fill),
        );
    }
    out.push_str("</g>");
}

fn write_labels(out: &mut String, scene: &SceneGraph) {
    for command in scene.labels() {
        let DrawCommand::DrawLabel { x, y, text, anchor, rotated } = command else {
            continue;
        };
        let (x, y) = (fmt_num(*x), fmt_num(*y));
        let transform = if *rotated {
            format!(r#" transform="rotate(-90 {x} {y})""#)
        } else {
            String::new()
        };
        let _ = write!(
            out,
            r#"<text x="{x}" y="{y}" text-anchor="{}" font-size="{LABEL_FONT_SIZE}" fill="{LABEL_FILL}"{transform}>{}</text>"#,
            anchor.as_str(),
            xml_escape(text),
        );
    }
}

/// Serialize a scene into a standalone SVG document
pub fn to_svg(scene: &SceneGraph) -> String {
    let layout = &scene.layout;
    let (width, height) = layout.canvas_size();

    let mut out = String::new();
    write_preamble(&mut out, width, height);

    if layout.has_labels() {
        let _ = write!(
            out,
            r#"<rect width="100%" height="100%" fill="{BACKGROUND_FILL}"/><g transform="translate({p},{p})">"#,
            p = fmt_num(layout.padding),
        );
    }

    match layout.content_transform() {
        Some(t) => {
            let _ = write!(out, r#"<g class="content" transform="{t}">"#);
        }
        None => out.push_str(r#"<g class="content">"#),
    }
    write_cells(&mut out, scene);
    write_labels(&mut out, scene);
    out.push_str("</g>");

    if layout.has_labels() {
        out.push_str("</g>");
    }
    out.push_str("</svg>");
    out
}

/// Fixed-size document carrying an error message
pub fn error_svg(message: &str) -> String {
    let mut out = String::new();
    write_preamble(&mut out, ERROR_WIDTH as f64, ERROR_HEIGHT as f64);
    let _ = write!(
        out,
        r##"<rect width="100%" height="100%" fill="#fff5f5"/><text x="10" y="50" fill="#d32f2f" font-family="monospace" font-size="16">Error: {}</text></svg>"##,
        xml_escape(message),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_scene;
    use crate::layout::{CellGeometry, Direction};
    use crate::params::RenderParams;
    use crate::parser::parse_data;

    fn render(data: &str, params: &RenderParams) -> String {
        to_svg(&compile_scene(&parse_data(data).unwrap(), params))
    }

    fn params(direction: Direction) -> RenderParams {
        RenderParams::new(direction, CellGeometry::new(20.0, 20.0))
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape(r#"<a & 'b'>"c""#), "&lt;a &amp; &apos;b&apos;&gt;&quot;c&quot;");
    }

    #[test]
    fn test_plain_document() {
        let svg = render("1-2", &params(Direction::Right));
        assert_eq!(
            svg,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"20\" height=\"40\" viewBox=\"0 0 20 40\">\
             <g class=\"content\"><g class=\"cells\" fill-opacity=\"1\">\
             <rect x=\"0\" y=\"20\" width=\"20\" height=\"20\" fill=\"#2c7be5\" stroke=\"none\"/>\
             <rect x=\"0\" y=\"0\" width=\"20\" height=\"20\" fill=\"#2c7be5\" stroke=\"none\"/>\
             </g></g></svg>"
        );
    }

    #[test]
    fn test_bottom_orientation_swaps_size() {
        let svg = render("1-3/1", &params(Direction::Bottom));
        assert!(svg.contains(r#"width="60" height="40" viewBox="0 0 60 40""#));
        assert!(svg.contains(r#"<g class="content" transform="translate(60,0) rotate(90)">"#));
    }

    #[test]
    fn test_labels_add_background_and_padding() {
        let mut p = params(Direction::Bottom);
        p.labels.columns.insert(1, "Mon & Tue".into());
        p.alpha = 0.5;
        let svg = render("1", &p);
        assert!(svg.contains(r##"<rect width="100%" height="100%" fill="#ffffff"/><g transform="translate(8,8)">"##));
        assert!(svg.contains(r#"fill-opacity="0.5""#));
        assert!(svg.contains(">Mon &amp; Tue</text>"));
        assert!(svg.contains(r#"transform="rotate(-90 10 40)""#));
        // 1 row + 56 bottom margin, 20 wide, rotated, plus 16 padding
        assert!(svg.contains(r#"width="92" height="36""#));
    }

    #[test]
    fn test_empty_columns_have_no_rects() {
        let svg = render("_/_", &params(Direction::Right));
        assert!(!svg.contains("<rect"));
        assert!(svg.contains(r#"width="40" height="20""#));
    }

    #[test]
    fn test_error_document() {
        let svg = error_svg("data is <required>");
        assert!(svg.contains(r#"width="600" height="80""#));
        assert!(svg.contains(r##"fill="#fff5f5""##));
        assert!(svg.contains(r##"fill="#d32f2f" font-family="monospace""##));
        assert!(svg.contains("Error: data is &lt;required&gt;"));
    }
}
