use anyhow::{anyhow, ensure, Context, Result};
use image::ImageEncoder;
use plotters::prelude::*;
use tracing::debug;

use crate::color::{to_rgba, Rgba, DEFAULT_COLOR};
use crate::ir::SceneGraph;
use crate::layout::Rect;
use crate::RenderOptions;

/// Largest preview canvas side, in pixels
pub const MAX_CANVAS_SIDE: u32 = 8192;

/// Where the scene lands on the preview canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Placement {
    /// Fit `content` inside `canvas`, centered. Without `upscale` small
    /// content keeps its natural size.
    pub fn fit(content: (f64, f64), canvas: (u32, u32), upscale: bool) -> Placement {
        let (cw, ch) = content;
        let (w, h) = (canvas.0 as f64, canvas.1 as f64);
        if cw <= 0.0 || ch <= 0.0 {
            return Placement { scale: 0.0, offset_x: w / 2.0, offset_y: h / 2.0 };
        }
        let mut scale = (w / cw).min(h / ch);
        if !upscale {
            scale = scale.min(1.0);
        }
        Placement {
            scale,
            offset_x: (w - cw * scale) / 2.0,
            offset_y: (h - ch * scale) / 2.0,
        }
    }

    /// Canvas-space rectangle to pixel corners (inclusive)
    fn pixels(&self, r: Rect) -> Option<[(i32, i32); 2]> {
        let x0 = (self.offset_x + r.x * self.scale).round() as i32;
        let y0 = (self.offset_y + r.y * self.scale).round() as i32;
        let x1 = (self.offset_x + (r.x + r.width) * self.scale).round() as i32;
        let y1 = (self.offset_y + (r.y + r.height) * self.scale).round() as i32;
        // Adjacent cells share an edge; drop the last pixel so translucent fills never overlap
        (x1 > x0 && y1 > y0).then_some([(x0, y0), (x1 - 1, y1 - 1)])
    }
}

fn fill_style(token: &str, alpha: f64) -> RGBAColor {
    let c = to_rgba(token)
        .or_else(|| to_rgba(DEFAULT_COLOR))
        .unwrap_or(Rgba::rgb(0, 0, 0));
    RGBColor(c.r, c.g, c.b).mix(c.a * alpha)
}

/// Rasterize a scene to PNG bytes on a white canvas of the configured size
pub fn render_png(scene: &SceneGraph, options: &RenderOptions) -> Result<Vec<u8>> {
    let (width, height) = (options.width.max(1), options.height.max(1));
    ensure!(
        width <= MAX_CANVAS_SIDE && height <= MAX_CANVAS_SIDE,
        "Preview canvas {}x{} exceeds {}px per side",
        width,
        height,
        MAX_CANVAS_SIDE
    );
    let buffer_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| anyhow!("Preview canvas {}x{} is too large", width, height))?;
    let placement = Placement::fit(scene.layout.canvas_size(), (width, height), options.upscale);
    debug!(width, height, scale = placement.scale, "rasterizing scene");

    let mut buffer = vec![0u8; buffer_len];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        for (rect, fill) in scene.cells() {
            let Some(corners) = placement.pixels(scene.layout.to_canvas(*rect)) else {
                continue;
            };
            root.draw(&Rectangle::new(corners, fill_style(fill, scene.alpha).filled()))
                .context("Failed to draw cell")?;
        }
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }
    Ok(png_bytes)
}
