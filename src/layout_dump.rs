use crate::ir::Diagram;
use crate::layout::{EdgePath, Layout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Serializable snapshot of one layout pass, for tooling and the wasm bridge.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub node_width: f32,
    pub col_gap: f32,
    pub selected: Option<String>,
    pub rows: Vec<RowDump>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct RowDump {
    pub index: usize,
    pub y: f32,
    pub height: f32,
    pub nodes: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub row: usize,
    pub column: usize,
    pub tile_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub key: String,
    pub from: String,
    pub to: String,
    pub kind: &'static str,
    pub from_port: Option<&'static str>,
    pub to_port: Option<&'static str>,
    pub offset: f32,
    pub path: String,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, diagram: &Diagram) -> Self {
        let rows = layout
            .rows
            .iter()
            .map(|row| RowDump {
                index: row.index,
                y: row.y,
                height: row.height,
                nodes: row.nodes.clone(),
            })
            .collect();

        let nodes = layout
            .rows
            .iter()
            .flat_map(|row| row.nodes.iter())
            .filter_map(|id| layout.nodes.get(id))
            .map(|node| NodeDump {
                id: node.id.clone(),
                label: node.label.clone(),
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                row: node.row,
                column: node.column,
                tile_count: diagram.tile_count(&node.id),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| {
                let (kind, from_port, to_port, offset) = match edge.path {
                    EdgePath::Curve(curve) => (
                        "curve",
                        Some(curve.from_port.as_str()),
                        Some(curve.to_port.as_str()),
                        curve.offset,
                    ),
                    EdgePath::Loop(_) => ("loop", None, None, 0.0),
                };
                EdgeDump {
                    key: edge.key.clone(),
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    kind,
                    from_port,
                    to_port,
                    offset,
                    path: edge.path.to_svg_path(),
                    points: edge.path.points().iter().map(|(x, y)| [*x, *y]).collect(),
                }
            })
            .collect();

        LayoutDump {
            width: layout.canvas.width,
            height: layout.canvas.height,
            node_width: layout.node_width,
            col_gap: layout.col_gap,
            selected: layout.selected.clone(),
            rows,
            nodes,
            edges,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn write_layout_dump(path: Option<&Path>, layout: &Layout, diagram: &Diagram) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout, diagram);
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => println!("{}", dump.to_json()?),
    }
    Ok(())
}
