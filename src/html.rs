// Text-wrapped output: the SVG embedded in a minimal HTML page whose social
// card metadata points at a raster preview, plus a link back to the editor.

use crate::svg::xml_escape;

pub const PAGE_TITLE: &str = "RTNPX";

/// Links placed on the wrapper page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// Absolute URL of the raster preview (`og:image`, `twitter:image`)
    pub preview_url: Option<String>,
    pub edit_url: Option<String>,
}

/// Build the canonical `/{prefix}/{d}/{w}/{h}/{data}` path used for preview and edit links
pub fn route_path(prefix: &str, direction: &str, width: &str, height: &str, data: &str) -> String {
    format!("/{prefix}/{direction}/{width}/{height}/{data}")
}

pub fn wrap_svg(svg: &str, links: &PageLinks) -> String {
    let mut head = vec![
        r#"<meta charset="utf-8" />"#.to_string(),
        r#"<meta name="viewport" content="width=device-width,initial-scale=1" />"#.to_string(),
        r#"<meta property="og:type" content="website" />"#.to_string(),
        format!(r#"<meta property="og:title" content="{PAGE_TITLE}" />"#),
    ];
    if let Some(url) = &links.preview_url {
        let url = xml_escape(url);
        head.push(format!(r#"<meta property="og:image" content="{url}" />"#));
        head.push(r#"<meta name="twitter:card" content="summary_large_image" />"#.to_string());
        head.push(format!(r#"<meta name="twitter:image" content="{url}" />"#));
    }
    head.push(format!("<title>{PAGE_TITLE}</title>"));

    // The XML declaration is not valid inside an HTML body
    let body_svg = svg
        .strip_prefix(r#"<?xml version="1.0" encoding="UTF-8"?>"#)
        .map(str::trim_start)
        .unwrap_or(svg);

    let edit = links
        .edit_url
        .as_ref()
        .map(|url| {
            format!(
                r#"<div style="padding:8px; font-family: system-ui, sans-serif;"><a href="{}" style="color:#2563eb; text-decoration:underline;">Edit</a></div>"#,
                xml_escape(url)
            )
        })
        .unwrap_or_default();

    format!(
        "<!doctype html><html lang=\"en\"><head>\n{}\n</head><body style=\"margin:0\">{}\n{}\n</body></html>",
        head.join("\n"),
        body_svg,
        edit
    )
}
