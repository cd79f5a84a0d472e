// Runtime executor: request -> params -> data -> scene -> document

use crate::compiler::compile_scene;
use crate::error::{RenderError, Result};
use crate::html::{route_path, wrap_svg, PageLinks};
use crate::labels::AxisLabels;
use crate::params::{RenderParams, RenderRequest};
use crate::parser::{parse_data, strip_extension, Data};
use crate::raster::render_png;
use crate::svg::{error_svg, to_svg};
use crate::{OutputFormat, RenderOptions};

use std::borrow::Cow;
use tracing::{error, warn};
use url::Url;

/// Transport-neutral response for the routing layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(format: OutputFormat, body: Vec<u8>) -> Self {
        Response {
            status: 200,
            content_type: format.content_type(),
            body,
        }
    }

    /// Error document with the given status
    pub fn error(status: u16, message: &str) -> Self {
        Response {
            status,
            content_type: OutputFormat::Svg.content_type(),
            body: error_svg(message).into_bytes(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl From<RenderError> for Response {
    fn from(err: RenderError) -> Self {
        warn!(%err, "rejecting render request");
        Response::error(err.status(), &err.to_string())
    }
}

/// Validate and parse. Nothing is compiled from partial input.
pub fn prepare(req: &RenderRequest) -> Result<(RenderParams, Data)> {
    let (params, data) = RenderParams::from_request(req)?;
    let data = parse_data(&data)?;
    Ok((params, data))
}

/// Render a request to an SVG document
pub fn render_svg(req: &RenderRequest) -> Result<String> {
    let (params, data) = prepare(req)?;
    Ok(to_svg(&compile_scene(&data, &params)))
}

/// Links for the HTML wrapper, relative to `base`
fn page_links(req: &RenderRequest, params: &RenderParams, base: &str) -> PageLinks {
    let base = match Url::parse(base) {
        Ok(url) => url,
        Err(err) => {
            warn!(base, %err, "ignoring unparsable base url");
            return PageLinks::default();
        }
    };
    let d = params.direction.shorthand();
    let w = req.width.as_deref().unwrap_or_default();
    let h = req.height.as_deref().unwrap_or_default();
    let data = strip_extension(req.data.as_deref().unwrap_or_default().trim());

    let preview_url = base.join(&route_path("ogp", d, w, h, data)).ok();
    let edit_url = base.join(&route_path("edit", d, w, h, data)).ok().map(|mut url| {
        if !req.query.is_empty() {
            url.query_pairs_mut().extend_pairs(req.query.iter());
        }
        url
    });

    PageLinks {
        preview_url: preview_url.map(String::from),
        edit_url: edit_url.map(String::from),
    }
}

/// Render a request in the requested output format.
///
/// Failures never produce a partial image: validation and parse errors map
/// to the error document with status 400, backend failures to 500.
pub fn render(req: &RenderRequest, options: &RenderOptions) -> Response {
    let (params, data) = match prepare(req) {
        Ok(prepared) => prepared,
        Err(err) => return err.into(),
    };

    match options.format {
        OutputFormat::Svg => {
            let svg = to_svg(&compile_scene(&data, &params));
            Response::ok(OutputFormat::Svg, svg.into_bytes())
        }
        OutputFormat::Html => {
            let links = options
                .base_url
                .as_deref()
                .map(|base| page_links(req, &params, base))
                .unwrap_or_default();
            let svg = to_svg(&compile_scene(&data, &params));
            Response::ok(OutputFormat::Html, wrap_svg(&svg, &links).into_bytes())
        }
        OutputFormat::Png => {
            // Previews are drawn without axis labels
            let bare = RenderParams {
                labels: AxisLabels::default(),
                ..params
            };
            match render_png(&compile_scene(&data, &bare), options) {
                Ok(png) => Response::ok(OutputFormat::Png, png),
                Err(err) => {
                    error!(?err, "raster backend failed");
                    Response::error(500, &format!("{err:#}"))
                }
            }
        }
    }
}
