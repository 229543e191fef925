mod bundling;
mod curve;
mod grid;
mod routing;
mod self_loop;
mod sizing;
pub(crate) mod types;
pub use types::*;

pub use bundling::{PortAssignment, assign_ports, offset_for_index};
pub use curve::{control_points, handle_length, route_curve};
pub use grid::{GridPlan, canvas_size, derive_col_gap, derive_node_width, max_columns, plan_grid};
pub use routing::{apply_port_offset, choose_ports};
pub use self_loop::loop_glyph;
pub use sizing::{MeasuredHeights, effective_heights, estimate_node_height};

use crate::config::LayoutConfig;
use crate::ir::{Diagram, Edge};
use crate::selection::Selection;
use std::collections::BTreeMap;

/// Places every node of `diagram` on the row grid.
///
/// Heights come from `measured` where present and from the tile estimate
/// otherwise. The result carries no edges.
pub fn layout_nodes(
    diagram: &Diagram,
    measured: &MeasuredHeights,
    viewport_width: f32,
    config: &LayoutConfig,
) -> (BTreeMap<String, NodeLayout>, GridPlan) {
    let heights = effective_heights(diagram, measured, &config.sizing);
    let columns = max_columns(&diagram.rows);
    let node_width = derive_node_width(columns, viewport_width, &config.grid);
    let plan = plan_grid(&diagram.rows, &heights, viewport_width, node_width, &config.grid);

    let nodes = plan
        .positions
        .iter()
        .map(|(id, &(x, y))| {
            let (row, column) = plan.cells.get(id).copied().unwrap_or((0, 0));
            let label = diagram
                .nodes
                .get(id)
                .map(|node| node.label.clone())
                .unwrap_or_else(|| id.clone());
            let height = heights
                .get(id)
                .copied()
                .unwrap_or(config.sizing.fallback_height);
            let layout = NodeLayout {
                id: id.clone(),
                label,
                x,
                y,
                width: node_width,
                height,
                row,
                column,
            };
            (id.clone(), layout)
        })
        .collect();

    (nodes, plan)
}

/// Routes `edges` against already placed nodes, in input order.
///
/// Self-loops become loop glyphs; every other edge gets a bundled port pair and
/// a curve. Edges naming a node without a layout are dropped.
pub fn route_edges<'a, I>(
    edges: I,
    nodes: &BTreeMap<String, NodeLayout>,
    config: &LayoutConfig,
) -> Vec<EdgeLayout>
where
    I: IntoIterator<Item = &'a Edge>,
{
    let edges: Vec<&Edge> = edges.into_iter().collect();
    let assignments = assign_ports(edges.iter().copied(), nodes, &config.routing);

    let mut routed = Vec::with_capacity(edges.len());
    for edge in edges {
        let (Some(from), Some(to)) = (nodes.get(&edge.from), nodes.get(&edge.to)) else {
            log::debug!(edge = edge.key.as_str(); "Skipping edge with unknown endpoint");
            continue;
        };
        let path = if edge.is_loop {
            EdgePath::Loop(loop_glyph(from, &config.self_loop))
        } else {
            let Some(assignment) = assignments.get(&edge.key) else {
                continue;
            };
            EdgePath::Curve(route_curve(from, to, *assignment, &config.routing))
        };
        routed.push(EdgeLayout {
            key: edge.key.clone(),
            from: edge.from.clone(),
            to: edge.to.clone(),
            path,
        });
    }
    routed
}

/// One full pass: node placement first, then routing of the edges the
/// selection lets through.
pub fn compute_layout(
    diagram: &Diagram,
    measured: &MeasuredHeights,
    viewport_width: f32,
    selection: &Selection,
    config: &LayoutConfig,
) -> Layout {
    let (nodes, plan) = layout_nodes(diagram, measured, viewport_width, config);
    let canvas = canvas_size(nodes.values(), viewport_width, &config.grid);
    let edges = route_edges(selection.visible_edges(&diagram.edges), &nodes, config);

    log::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        node_width = plan.node_width,
        col_gap = plan.col_gap,
        canvas_width = canvas.width,
        canvas_height = canvas.height;
        "Layout pass complete"
    );

    Layout {
        nodes,
        rows: plan.rows,
        edges,
        node_width: plan.node_width,
        col_gap: plan.col_gap,
        canvas,
        selected: selection.selected().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagram(rows: &[&[&str]], transitions: &[(&str, &[&str])]) -> Diagram {
        let mut diagram = Diagram::new();
        for row in rows {
            diagram.push_row(row.iter());
        }
        for (from, to) in transitions {
            diagram.add_transitions(from, to.iter());
        }
        diagram
    }

    fn selected(id: &str) -> Selection {
        Selection::Selected(id.to_string())
    }

    #[test]
    fn scenario_rows_share_y_and_stack() {
        let diagram = diagram(&[&["A", "B"], &["C"]], &[]);
        let mut measured = MeasuredHeights::new();
        measured.merge([("A", 300.0), ("B", 200.0), ("C", 150.0)]);
        let config = LayoutConfig::default();
        let layout = compute_layout(&diagram, &measured, 1000.0, &Selection::Unselected, &config);

        let a = &layout.nodes["A"];
        let b = &layout.nodes["B"];
        let c = &layout.nodes["C"];
        assert!(layout.node_width <= config.grid.max_node_width);
        assert_eq!(a.y, b.y);
        assert_eq!(c.y - a.y, 300.0 + config.grid.row_gap);
        assert_eq!(a.width, b.width);
        assert_eq!(b.width, c.width);
        assert_eq!(b.height, 200.0);
    }

    #[test]
    fn unselected_routes_nothing() {
        let diagram = diagram(&[&["A", "B"]], &[("A", &["B", "A"])]);
        let layout = compute_layout(
            &diagram,
            &MeasuredHeights::new(),
            1000.0,
            &Selection::Unselected,
            &LayoutConfig::default(),
        );
        assert!(layout.edges.is_empty());
        assert_eq!(layout.selected, None);
    }

    #[test]
    fn selection_routes_curves_and_loops() {
        let diagram = diagram(&[&["A", "B"]], &[("A", &["B", "A", "Ghost"]), ("B", &["A"])]);
        let layout = compute_layout(
            &diagram,
            &MeasuredHeights::new(),
            1000.0,
            &selected("A"),
            &LayoutConfig::default(),
        );
        assert_eq!(layout.edges.len(), 2);
        assert!(matches!(layout.edges[0].path, EdgePath::Curve(_)));
        assert!(layout.edges[1].path.is_loop());
        assert!(layout.edges.iter().all(|e| e.from == "A"));
        assert_eq!(layout.selected.as_deref(), Some("A"));
    }

    #[test]
    fn fan_out_scenario_through_full_pass() {
        let diagram = diagram(
            &[&["X", "Y"], &["P", "Z"], &["Q", "W"]],
            &[("X", &["W", "Z", "Y"])],
        );
        let layout = compute_layout(
            &diagram,
            &MeasuredHeights::new(),
            1000.0,
            &selected("X"),
            &LayoutConfig::default(),
        );
        let offset_to = |to: &str| {
            layout
                .edges
                .iter()
                .find_map(|e| match e.path {
                    EdgePath::Curve(curve) if e.to == to => Some((curve.from_port, curve.offset)),
                    _ => None,
                })
                .unwrap()
        };
        assert_eq!(offset_to("Y"), (Port::Right, -10.0));
        assert_eq!(offset_to("Z"), (Port::Right, 0.0));
        assert_eq!(offset_to("W"), (Port::Right, 10.0));
    }

    #[test]
    fn canvas_covers_nodes_and_viewport() {
        let diagram = diagram(&[&["A", "B", "C", "D", "E"]], &[]);
        let config = LayoutConfig::default();
        let layout = compute_layout(&diagram, &MeasuredHeights::new(), 800.0, &Selection::Unselected, &config);
        assert!(layout.canvas.width >= 800.0);
        for node in layout.nodes.values() {
            assert!(node.x + node.width <= layout.canvas.width);
            assert!(node.y + node.height <= layout.canvas.height);
        }
        assert_eq!(layout.node_width, config.grid.min_node_width);
    }

    #[test]
    fn route_edges_keeps_input_order() {
        let diagram = diagram(&[&["A", "B"], &["C"]], &[("A", &["C", "B"]), ("B", &["B"])]);
        let config = LayoutConfig::default();
        let (nodes, _) = layout_nodes(&diagram, &MeasuredHeights::new(), 1000.0, &config);
        let routed = route_edges(&diagram.edges, &nodes, &config);
        let keys: Vec<&str> = routed.iter().map(|e| e.key.as_str()).collect();
        let expected: Vec<&str> = diagram.edges.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, expected);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn rows_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
            prop::collection::vec(prop::collection::vec(0u8..40, 0..5), 1..6).prop_map(|rows| {
                rows.into_iter()
                    .map(|row| row.into_iter().map(|n| format!("N{n}")).collect())
                    .collect()
            })
        }

        fn build(
            rows: &[Vec<String>],
            heights: &[f32],
            edge_seed: &[(usize, usize)],
        ) -> (Diagram, MeasuredHeights) {
            let mut diagram = Diagram::new();
            for row in rows {
                diagram.push_row(row.iter());
            }
            let names: Vec<String> = diagram.rows.iter().flatten().cloned().collect();
            let mut measured = MeasuredHeights::new();
            for (name, height) in names.iter().zip(heights.iter()) {
                measured.record(name, *height);
            }
            if !names.is_empty() {
                for (a, b) in edge_seed {
                    diagram.add_edge(&names[a % names.len()], &names[b % names.len()]);
                }
            }
            (diagram, measured)
        }

        fn check_pass_is_deterministic(
            rows: Vec<Vec<String>>,
            heights: Vec<f32>,
            edge_seed: Vec<(usize, usize)>,
            viewport: f32,
        ) -> Result<(), TestCaseError> {
            let (diagram, measured) = build(&rows, &heights, &edge_seed);
            let config = LayoutConfig::default();
            let Some(first) = diagram.rows.iter().flatten().next().cloned() else {
                return Ok(());
            };
            let selection = Selection::Selected(first);
            let a = compute_layout(&diagram, &measured, viewport, &selection, &config);
            let b = compute_layout(&diagram, &measured, viewport, &selection, &config);
            prop_assert_eq!(a, b);
            Ok(())
        }

        fn check_rows_contain_nodes(
            rows: Vec<Vec<String>>,
            heights: Vec<f32>,
            viewport: f32,
        ) -> Result<(), TestCaseError> {
            let (diagram, measured) = build(&rows, &heights, &[]);
            let config = LayoutConfig::default();
            let layout = compute_layout(&diagram, &measured, viewport, &Selection::Unselected, &config);
            for row in &layout.rows {
                let mut last_x = f32::NEG_INFINITY;
                for id in &row.nodes {
                    let node = &layout.nodes[id];
                    prop_assert!(node.y >= row.y && node.y <= row.y + row.height);
                    prop_assert!(node.height <= row.height);
                    prop_assert!(node.x > last_x);
                    prop_assert_eq!(node.width, layout.node_width);
                    last_x = node.x;
                }
            }
            Ok(())
        }

        fn check_routing_invariants(
            rows: Vec<Vec<String>>,
            heights: Vec<f32>,
            edge_seed: Vec<(usize, usize)>,
            viewport: f32,
        ) -> Result<(), TestCaseError> {
            let (diagram, measured) = build(&rows, &heights, &edge_seed);
            let config = LayoutConfig::default();
            let (nodes, _) = layout_nodes(&diagram, &measured, viewport, &config);
            let assignments = assign_ports(&diagram.edges, &nodes, &config.routing);
            let mut groups: BTreeMap<(String, Port), Vec<(f32, f32)>> = BTreeMap::new();
            for edge in &diagram.edges {
                let assigned = assignments.get(&edge.key);
                if edge.is_loop {
                    prop_assert!(assigned.is_none());
                    continue;
                }
                let Some(assigned) = assigned else {
                    continue;
                };
                prop_assert_eq!(assigned.to_port, assigned.from_port.opposite());
                prop_assert!(assigned.offset.abs() <= config.routing.port_max_offset);
                let (cx, cy) = nodes[&edge.to].center();
                let coord = if assigned.from_port.is_horizontal() { cy } else { cx };
                groups
                    .entry((edge.from.clone(), assigned.from_port))
                    .or_default()
                    .push((coord, assigned.offset));
            }
            for bundle in groups.values() {
                let sum: f32 = bundle.iter().map(|(_, o)| *o).sum();
                let uncapped = bundle.len() as f32 * config.routing.port_spacing
                    <= config.routing.port_max_offset * 2.0 + config.routing.port_spacing;
                if uncapped {
                    prop_assert!(sum.abs() < 1e-3);
                }
                for a in bundle {
                    for b in bundle {
                        if a.0 < b.0 {
                            if uncapped {
                                prop_assert!(a.1 < b.1);
                            } else {
                                prop_assert!(a.1 <= b.1);
                            }
                        }
                    }
                }
            }
            Ok(())
        }

        proptest! {
            #[test]
            fn pass_is_deterministic(
                rows in rows_strategy(),
                heights in prop::collection::vec(50.0f32..600.0, 0..30),
                edge_seed in prop::collection::vec((0usize..64, 0usize..64), 0..40),
                viewport in 0.0f32..3000.0,
            ) {
                check_pass_is_deterministic(rows, heights, edge_seed, viewport)?;
            }

            #[test]
            fn rows_contain_nodes(
                rows in rows_strategy(),
                heights in prop::collection::vec(50.0f32..600.0, 0..30),
                viewport in 0.0f32..3000.0,
            ) {
                check_rows_contain_nodes(rows, heights, viewport)?;
            }

            #[test]
            fn routing_invariants(
                rows in rows_strategy(),
                heights in prop::collection::vec(50.0f32..600.0, 0..30),
                edge_seed in prop::collection::vec((0usize..64, 0usize..64), 0..60),
                viewport in 0.0f32..3000.0,
            ) {
                check_routing_invariants(rows, heights, edge_seed, viewport)?;
            }
        }
    }
}
