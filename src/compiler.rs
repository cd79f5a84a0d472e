use crate::ir::{Anchor, DrawCommand, SceneGraph};
use crate::labels::AxisLabels;
use crate::layout::{Direction, Layout};
use crate::palette::Resolver;
use crate::params::RenderParams;
use crate::parser::Data;

use std::collections::BTreeMap;
use tracing::debug;

// =============================================================================
// Cell Expansion
// =============================================================================

/// Expand segments into unit cells with resolved fills.
///
/// Keyed by (column, row); a later-declared segment overwrites an earlier one
/// cell by cell, so overlaps never stack translucent fills.
fn expand_cells(data: &Data, resolver: &Resolver<'_>) -> BTreeMap<(u32, u32), String> {
    let mut cells = BTreeMap::new();
    for (idx, column) in data.columns.iter().enumerate() {
        let x = idx as u32 + 1;
        for segment in &column.segments {
            let fill = resolver.resolve(column, segment);
            for y in segment.rows() {
                cells.insert((x, y), fill.clone());
            }
        }
    }
    cells
}

/// Labels past the grid edge are dropped; an empty grid draws none
fn within(n: u32) -> impl Fn(&(&u32, &String)) -> bool {
    move |(i, _)| (1..=n).contains(*i)
}

fn label_commands(layout: &Layout, labels: &AxisLabels) -> Vec<DrawCommand> {
    let rotated = layout.direction == Direction::Bottom;
    let mut commands = Vec::new();

    for (&i, text) in labels.columns.iter().filter(within(layout.columns)) {
        let (x, y) = layout.column_label_anchor(i);
        commands.push(DrawCommand::DrawLabel {
            x,
            y,
            text: text.clone(),
            anchor: Anchor::Middle,
            rotated,
        });
    }
    for (&j, text) in labels.rows.iter().filter(within(layout.rows)) {
        let (x, y) = layout.row_label_anchor(j);
        commands.push(DrawCommand::DrawLabel {
            x,
            y,
            text: text.clone(),
            anchor: Anchor::End,
            rotated,
        });
    }
    commands
}

// =============================================================================
// Scene Compilation
// =============================================================================

/// Compile parsed data and validated parameters into a scene graph
pub fn compile_scene(data: &Data, params: &RenderParams) -> SceneGraph {
    let layout = Layout::new(
        data.column_count(),
        data.row_count(),
        params.geometry,
        params.direction,
        !params.labels.rows.is_empty(),
        !params.labels.columns.is_empty(),
    );

    let resolver = Resolver::new(&params.palette, params.color.as_deref());
    let cells = expand_cells(data, &resolver);
    debug!(
        columns = layout.columns,
        rows = layout.rows,
        cells = cells.len(),
        "compiled scene"
    );

    let mut commands: Vec<DrawCommand> = cells
        .into_iter()
        .map(|((column, row), fill)| DrawCommand::DrawCell {
            column,
            row,
            rect: layout.cell_rect(column, row),
            fill,
        })
        .collect();
    commands.extend(label_commands(&layout, &params.labels));

    SceneGraph {
        layout,
        alpha: params.alpha,
        commands,
    }
}
