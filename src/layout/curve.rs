use crate::config::RoutingConfig;

use super::bundling::PortAssignment;
use super::routing::apply_port_offset;
use super::{CurvePath, NodeLayout, Port};

/// Handle length for a primary-axis separation of `delta`.
pub fn handle_length(delta: f32, config: &RoutingConfig) -> f32 {
    (delta.abs() * config.handle_ratio).clamp(config.handle_min, config.handle_max)
}

/// Cubic control points pushing out of each endpoint along its port normal.
pub fn control_points(
    p1: (f32, f32),
    p2: (f32, f32),
    from_port: Port,
    to_port: Port,
    config: &RoutingConfig,
) -> ((f32, f32), (f32, f32)) {
    let hx = handle_length(p2.0 - p1.0, config);
    let hy = handle_length(p2.1 - p1.1, config);
    let push = |point: (f32, f32), port: Port| {
        let len = if port.is_horizontal() { hx } else { hy };
        let (nx, ny) = port.normal();
        (point.0 + nx * len, point.1 + ny * len)
    };
    (push(p1, from_port), push(p2, to_port))
}

/// Full curve for one routed edge. The bundle offset shifts both endpoints.
pub fn route_curve(
    from: &NodeLayout,
    to: &NodeLayout,
    assignment: PortAssignment,
    config: &RoutingConfig,
) -> CurvePath {
    let start = apply_port_offset(
        from.port_point(assignment.from_port),
        assignment.from_port,
        assignment.offset,
    );
    let end = apply_port_offset(
        to.port_point(assignment.to_port),
        assignment.to_port,
        assignment.offset,
    );
    let (c1, c2) = control_points(start, end, assignment.from_port, assignment.to_port, config);
    CurvePath {
        start,
        c1,
        c2,
        end,
        from_port: assignment.from_port,
        to_port: assignment.to_port,
        offset: assignment.offset,
    }
}
