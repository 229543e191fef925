use std::collections::{BTreeMap, HashMap};

use crate::config::GridConfig;

use super::{Canvas, NodeLayout, RowLayout};

/// Widest row, never less than one column.
pub fn max_columns(rows: &[Vec<String>]) -> usize {
    rows.iter().map(Vec::len).max().unwrap_or(0).max(1)
}

/// Largest node width in `[min, max]` that lets `columns` nodes, the minimum
/// gaps and both side paddings fit the viewport. An unknown (zero) viewport
/// falls back to the minimum width.
pub fn derive_node_width(columns: usize, viewport_width: f32, config: &GridConfig) -> f32 {
    if !(viewport_width.is_finite() && viewport_width > 0.0) {
        return config.min_node_width;
    }
    let columns = columns.max(1) as f32;
    let usable =
        viewport_width - config.side_padding * 2.0 - (columns - 1.0) * config.min_col_gap;
    (usable / columns)
        .floor()
        .clamp(config.min_node_width, config.max_node_width)
}

/// Gap that spreads `columns` nodes across the viewport, clamped to the
/// configured range. Narrow viewports get the minimum and scroll.
pub fn derive_col_gap(
    columns: usize,
    node_width: f32,
    viewport_width: f32,
    config: &GridConfig,
) -> f32 {
    if columns <= 1 || !(viewport_width.is_finite() && viewport_width > 0.0) {
        return config.min_col_gap;
    }
    let usable = viewport_width - config.side_padding * 2.0;
    let ideal = (usable - columns as f32 * node_width) / (columns - 1) as f32;
    ideal.clamp(config.min_col_gap, config.max_col_gap)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridPlan {
    pub positions: BTreeMap<String, (f32, f32)>,
    pub cells: BTreeMap<String, (usize, usize)>,
    pub rows: Vec<RowLayout>,
    pub node_width: f32,
    pub col_gap: f32,
    pub start_x: f32,
}

/// Places every row top-aligned under the previous one and every node in its
/// declared column.
pub fn plan_grid(
    rows: &[Vec<String>],
    heights: &HashMap<String, f32>,
    viewport_width: f32,
    node_width: f32,
    config: &GridConfig,
) -> GridPlan {
    let viewport = if viewport_width.is_finite() {
        viewport_width.max(0.0)
    } else {
        0.0
    };
    let columns = max_columns(rows);
    let col_gap = derive_col_gap(columns, node_width, viewport, config);
    let content_width = columns as f32 * node_width + (columns - 1) as f32 * col_gap;
    let start_x = if viewport > 0.0 {
        ((viewport - content_width) / 2.0).max(config.side_padding)
    } else {
        config.side_padding
    };

    let mut positions = BTreeMap::new();
    let mut cells = BTreeMap::new();
    let mut row_layouts = Vec::with_capacity(rows.len());
    let mut y = config.top_margin;

    for (row_idx, row) in rows.iter().enumerate() {
        let mut placed = Vec::with_capacity(row.len());
        let mut row_height: f32 = 0.0;
        for name in row {
            if name.trim().is_empty() || positions.contains_key(name) {
                continue;
            }
            let col_idx = placed.len();
            let x = start_x + col_idx as f32 * (node_width + col_gap);
            positions.insert(name.clone(), (x, y));
            cells.insert(name.clone(), (row_idx, col_idx));
            row_height = row_height.max(heights.get(name).copied().unwrap_or(0.0));
            placed.push(name.clone());
        }
        if row_height <= 0.0 {
            row_height = config.empty_row_height;
        }
        row_layouts.push(RowLayout {
            index: row_idx,
            y,
            height: row_height,
            nodes: placed,
        });
        y += row_height + config.row_gap;
    }

    GridPlan {
        positions,
        cells,
        rows: row_layouts,
        node_width,
        col_gap,
        start_x,
    }
}

/// Bounding box of all nodes plus the margin, never narrower than the viewport.
pub fn canvas_size<'a, I>(nodes: I, viewport_width: f32, config: &GridConfig) -> Canvas
where
    I: IntoIterator<Item = &'a NodeLayout>,
{
    let mut max_x: f32 = 0.0;
    let mut max_y: f32 = 0.0;
    for node in nodes {
        max_x = max_x.max(node.x + node.width);
        max_y = max_y.max(node.y + node.height);
    }
    let floor = if viewport_width.is_finite() {
        viewport_width.max(0.0)
    } else {
        0.0
    };
    Canvas {
        width: (max_x + config.canvas_margin).max(floor),
        height: max_y + config.canvas_margin,
    }
}
