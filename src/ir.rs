use crate::layout::{Layout, Rect};

// =============================================================================
// Scene Graph
// =============================================================================

/// Horizontal text anchoring, as written to `text-anchor`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Primitive drawing commands in content space (before orientation and padding).
/// Backends execute these blindly.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    DrawCell {
        column: u32,
        row: u32,
        rect: Rect,
        fill: String,
    },
    DrawLabel {
        x: f64,
        y: f64,
        text: String,
        anchor: Anchor,
        /// Counter-rotated by 90 degrees around its anchor
        rotated: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    pub layout: Layout,
    /// Shared fill-opacity of every cell, already clamped
    pub alpha: f64,
    pub commands: Vec<DrawCommand>,
}

impl SceneGraph {
    pub fn cells(&self) -> impl Iterator<Item = (&Rect, &str)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::DrawCell { rect, fill, .. } => Some((rect, fill.as_str())),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::DrawLabel { .. }))
    }

    pub fn cell_count(&self) -> usize {
        self.cells().count()
    }
}
