use std::collections::{BTreeMap, HashMap};

use crate::config::RoutingConfig;
use crate::ir::Edge;

use super::routing::{bundle_sort_coordinate, choose_ports};
use super::{NodeLayout, Port};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortAssignment {
    pub from_port: Port,
    pub to_port: Port,
    pub offset: f32,
}

/// Symmetric, capped lateral offset for the `idx`-th of `total` edges in a bundle.
pub fn offset_for_index(idx: usize, total: usize, config: &RoutingConfig) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let mid = (total as f32 - 1.0) / 2.0;
    let cap = config.port_max_offset.abs();
    ((idx as f32 - mid) * config.port_spacing).clamp(-cap, cap)
}

/// Resolves ports for every routable non-loop edge, buckets the edges by
/// `(source, exit port)` and spreads each bucket around the port anchor.
///
/// Loops and edges whose endpoints have no layout are left out of the result.
/// Inside a bucket edges are ranked by the destination centre along the axis
/// perpendicular to the port; equal coordinates keep input order.
pub fn assign_ports<'a, I>(
    edges: I,
    nodes: &BTreeMap<String, NodeLayout>,
    config: &RoutingConfig,
) -> HashMap<String, PortAssignment>
where
    I: IntoIterator<Item = &'a Edge>,
{
    let mut assignments = HashMap::new();
    let mut groups: BTreeMap<(&str, Port), Vec<(&'a Edge, f32)>> = BTreeMap::new();

    for edge in edges {
        if edge.is_loop {
            continue;
        }
        let (Some(from), Some(to)) = (nodes.get(&edge.from), nodes.get(&edge.to)) else {
            continue;
        };
        let (from_port, to_port) = choose_ports(from, to, config);
        groups
            .entry((edge.from.as_str(), from_port))
            .or_default()
            .push((edge, bundle_sort_coordinate(to, from_port)));
        assignments.insert(
            edge.key.clone(),
            PortAssignment {
                from_port,
                to_port,
                offset: 0.0,
            },
        );
    }

    for ((source, port), mut bundle) in groups {
        bundle.sort_by(|a, b| a.1.total_cmp(&b.1));
        let total = bundle.len();
        log::trace!(source, port:? = port, total; "Spreading edge bundle");
        for (idx, (edge, _)) in bundle.into_iter().enumerate() {
            if let Some(assignment) = assignments.get_mut(&edge.key) {
                assignment.offset = offset_for_index(idx, total, config);
            }
        }
    }

    assignments
}
