// Library exports for rtnpx

pub mod color;
pub mod error;
pub mod labels;
pub mod layout;
pub mod palette;
pub mod params;
pub mod parser;

// Rendering pipeline
pub mod compiler;
pub mod html;
pub mod ir;
pub mod raster;
pub mod runtime;
pub mod svg;

// Editor side
pub mod editor;
pub mod encoder;
pub mod grid;

pub use error::{RenderError, Result};
pub use params::{RenderParams, RenderRequest};
pub use runtime::{render, render_svg, Response};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "svg")]
    #[default]
    Svg,
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "html")]
    Html,
}

impl OutputFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Svg => "image/svg+xml; charset=utf-8",
            OutputFormat::Png => "image/png",
            OutputFormat::Html => "text/html; charset=utf-8",
        }
    }
}

/// Output settings that are not part of the encoded image itself
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderOptions {
    /// Raster preview canvas width
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
    /// Scale small images up to fill the preview canvas
    #[serde(default)]
    pub upscale: bool,
    /// Origin used for the preview and edit links of the HTML page
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_width() -> u32 { 1200 }
fn default_height() -> u32 { 630 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: OutputFormat::Svg,
            upscale: false,
            base_url: None,
        }
    }
}
