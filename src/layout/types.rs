use std::collections::BTreeMap;

/// One of the four attachment points on a node's rectangular boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Port {
    Left,
    Right,
    Top,
    Bottom,
}

impl Port {
    pub fn opposite(self) -> Self {
        match self {
            Port::Left => Port::Right,
            Port::Right => Port::Left,
            Port::Top => Port::Bottom,
            Port::Bottom => Port::Top,
        }
    }

    /// True for left/right ports, whose edges leave along the X axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Port::Left | Port::Right)
    }

    /// Outward unit normal of the box side the port sits on.
    pub fn normal(self) -> (f32, f32) {
        match self {
            Port::Left => (-1.0, 0.0),
            Port::Right => (1.0, 0.0),
            Port::Top => (0.0, -1.0),
            Port::Bottom => (0.0, 1.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Port::Left => "left",
            Port::Right => "right",
            Port::Top => "top",
            Port::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub row: usize,
    pub column: usize,
}

impl NodeLayout {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Midpoint of the box side that `port` names.
    pub fn port_point(&self, port: Port) -> (f32, f32) {
        let (cx, cy) = self.center();
        match port {
            Port::Left => (self.x, cy),
            Port::Right => (self.x + self.width, cy),
            Port::Top => (cx, self.y),
            Port::Bottom => (cx, self.y + self.height),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub index: usize,
    pub y: f32,
    pub height: f32,
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePath {
    pub start: (f32, f32),
    pub c1: (f32, f32),
    pub c2: (f32, f32),
    pub end: (f32, f32),
    pub from_port: Port,
    pub to_port: Port,
    pub offset: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopGlyph {
    pub center: (f32, f32),
    pub radius: f32,
    pub tip: (f32, f32),
    pub arm_a: (f32, f32),
    pub arm_b: (f32, f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgePath {
    Curve(CurvePath),
    Loop(LoopGlyph),
}

impl EdgePath {
    pub fn is_loop(&self) -> bool {
        matches!(self, EdgePath::Loop(_))
    }

    /// SVG path data. Loops are two half-circle arcs plus the chevron strokes.
    pub fn to_svg_path(&self) -> String {
        match self {
            EdgePath::Curve(curve) => format!(
                "M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
                curve.start.0,
                curve.start.1,
                curve.c1.0,
                curve.c1.1,
                curve.c2.0,
                curve.c2.1,
                curve.end.0,
                curve.end.1
            ),
            EdgePath::Loop(glyph) => {
                let (cx, cy) = glyph.center;
                let r = glyph.radius;
                format!(
                    "M {:.2} {:.2} A {r:.2} {r:.2} 0 1 0 {:.2} {:.2} A {r:.2} {r:.2} 0 1 0 {:.2} {:.2} \
                     M {:.2} {:.2} L {:.2} {:.2} M {:.2} {:.2} L {:.2} {:.2}",
                    cx - r,
                    cy,
                    cx + r,
                    cy,
                    cx - r,
                    cy,
                    glyph.tip.0,
                    glyph.tip.1,
                    glyph.arm_a.0,
                    glyph.arm_a.1,
                    glyph.tip.0,
                    glyph.tip.1,
                    glyph.arm_b.0,
                    glyph.arm_b.1
                )
            }
        }
    }

    /// Characteristic points in drawing order.
    pub fn points(&self) -> Vec<(f32, f32)> {
        match self {
            EdgePath::Curve(curve) => vec![curve.start, curve.c1, curve.c2, curve.end],
            EdgePath::Loop(glyph) => vec![glyph.center, glyph.tip, glyph.arm_a, glyph.arm_b],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLayout {
    pub key: String,
    pub from: String,
    pub to: String,
    pub path: EdgePath,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub nodes: BTreeMap<String, NodeLayout>,
    pub rows: Vec<RowLayout>,
    pub edges: Vec<EdgeLayout>,
    pub node_width: f32,
    pub col_gap: f32,
    pub canvas: Canvas,
    pub selected: Option<String>,
}
