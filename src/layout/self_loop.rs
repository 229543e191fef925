use crate::config::SelfLoopConfig;

use super::{LoopGlyph, NodeLayout};

fn rotate(v: (f32, f32), deg: f32) -> (f32, f32) {
    let (sin, cos) = deg.to_radians().sin_cos();
    (v.0 * cos - v.1 * sin, v.0 * sin + v.1 * cos)
}

/// Small circle above the node's top-left corner with a two-stroke chevron.
///
/// The chevron sits where the configured angle meets the circle; its arms are
/// the clockwise tangent rotated by `±spread` and pointed back from the tip.
pub fn loop_glyph(node: &NodeLayout, config: &SelfLoopConfig) -> LoopGlyph {
    let r = config.radius;
    let cx = node.x + config.pad_x + r;
    let cy = node.y - config.pad_y - r;

    let (sin, cos) = config.chevron_angle_deg.to_radians().sin_cos();
    let tip = (cx + r * cos, cy + r * sin);

    let tangent = (sin, -cos);
    let len = tangent.0.hypot(tangent.1);
    let unit = if len > 0.0 {
        (tangent.0 / len, tangent.1 / len)
    } else {
        (1.0, 0.0)
    };

    let d1 = rotate(unit, config.chevron_spread_deg);
    let d2 = rotate(unit, -config.chevron_spread_deg);
    let arm = config.chevron_arm;

    LoopGlyph {
        center: (cx, cy),
        radius: r,
        tip,
        arm_a: (tip.0 - d1.0 * arm, tip.1 - d1.1 * arm),
        arm_b: (tip.0 - d2.0 * arm, tip.1 - d2.1 * arm),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn dist(a: (f32, f32), b: (f32, f32)) -> f32 {
        (a.0 - b.0).hypot(a.1 - b.1)
    }

    fn node() -> NodeLayout {
        NodeLayout {
            id: "A".to_string(),
            label: "A".to_string(),
            x: 100.0,
            y: 200.0,
            width: 240.0,
            height: 122.0,
            row: 0,
            column: 0,
        }
    }

    #[test]
    fn circle_sits_above_top_left_corner() {
        let glyph = loop_glyph(&node(), &SelfLoopConfig::default());
        assert_eq!(glyph.center, (130.0, 180.0));
        assert_eq!(glyph.radius, 12.0);
        assert!(glyph.center.1 + glyph.radius < 200.0);
    }

    #[test]
    fn tip_is_on_circle_and_arms_have_fixed_length() {
        let glyph = loop_glyph(&node(), &SelfLoopConfig::default());
        assert!(approx_eq!(f32, dist(glyph.center, glyph.tip), 12.0, epsilon = 1e-4));
        assert!(approx_eq!(f32, dist(glyph.tip, glyph.arm_a), 5.0, epsilon = 1e-4));
        assert!(approx_eq!(f32, dist(glyph.tip, glyph.arm_b), 5.0, epsilon = 1e-4));
        // 320 degrees with Y down puts the tip up and to the right of centre.
        assert!(glyph.tip.0 > glyph.center.0);
        assert!(glyph.tip.1 < glyph.center.1);
    }

    #[test]
    fn arms_are_symmetric_about_the_tangent() {
        let config = SelfLoopConfig::default();
        let glyph = loop_glyph(&node(), &config);
        let theta = config.chevron_angle_deg.to_radians();
        let tangent = (theta.sin(), -theta.cos());
        let back_a = (glyph.tip.0 - glyph.arm_a.0, glyph.tip.1 - glyph.arm_a.1);
        let back_b = (glyph.tip.0 - glyph.arm_b.0, glyph.tip.1 - glyph.arm_b.1);
        let dot_a = (back_a.0 * tangent.0 + back_a.1 * tangent.1) / 5.0;
        let dot_b = (back_b.0 * tangent.0 + back_b.1 * tangent.1) / 5.0;
        assert!(approx_eq!(f32, dot_a, 0.5, epsilon = 1e-4));
        assert!(approx_eq!(f32, dot_b, 0.5, epsilon = 1e-4));
    }
}
