use crate::config::RoutingConfig;

use super::{NodeLayout, Port};

/// Picks the exit port on `from` from the centre-to-centre displacement and
/// pairs it with the opposite entry port on `to`.
///
/// Coincident centres fall through to `Right` because `dx >= 0`.
pub fn choose_ports(from: &NodeLayout, to: &NodeLayout, config: &RoutingConfig) -> (Port, Port) {
    let (from_cx, from_cy) = from.center();
    let (to_cx, to_cy) = to.center();
    let dx = to_cx - from_cx;
    let dy = to_cy - from_cy;

    let use_horizontal = if config.horizontal_wins_ties {
        dx.abs() >= dy.abs()
    } else {
        dx.abs() > dy.abs()
    };

    let exit = if use_horizontal {
        if dx >= 0.0 { Port::Right } else { Port::Left }
    } else if dy >= 0.0 {
        Port::Bottom
    } else {
        Port::Top
    };
    (exit, exit.opposite())
}

/// Shifts a port anchor sideways along the box edge it sits on.
pub fn apply_port_offset(point: (f32, f32), port: Port, offset: f32) -> (f32, f32) {
    if port.is_horizontal() {
        (point.0, point.1 + offset)
    } else {
        (point.0 + offset, point.1)
    }
}

/// Destination coordinate that orders edges sharing an exit port: centre Y for
/// left/right ports, centre X for top/bottom ports.
pub fn bundle_sort_coordinate(dest: &NodeLayout, exit: Port) -> f32 {
    let (cx, cy) = dest.center();
    if exit.is_horizontal() { cy } else { cx }
}
