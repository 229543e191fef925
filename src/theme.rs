use crate::ir::ImpactType;
use serde::{Deserialize, Serialize};

/// Accent colours for one node: arrow stroke plus header band fill/border.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeColors {
    pub accent: String,
    pub header_fill: String,
    pub header_border: String,
}

impl NodeColors {
    fn new(accent: &str, header_fill: &str, header_border: &str) -> Self {
        Self {
            accent: accent.to_string(),
            header_fill: header_fill.to_string(),
            header_border: header_border.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub node_fill: String,
    pub node_border: String,
    pub text_color: String,
    pub muted_text_color: String,
    pub line_color: String,
    pub selected_border: String,
    pub tile_fill: String,
    pub cost_tile_border: String,
    pub utility_tile_border: String,
    pub both_tile_border: String,
    pub other_tile_border: String,
    pub background: String,
    pub palette: Vec<NodeColors>,
}

impl Theme {
    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            node_fill: "#FFFFFF".to_string(),
            node_border: "#E2E8F0".to_string(),
            text_color: "#0F172A".to_string(),
            muted_text_color: "#64748B".to_string(),
            line_color: "#000000".to_string(),
            selected_border: "#0F172A".to_string(),
            tile_fill: "#FFFFFF".to_string(),
            cost_tile_border: "#DC2626".to_string(),
            utility_tile_border: "#16A34A".to_string(),
            both_tile_border: "#F97316".to_string(),
            other_tile_border: "#E2E8F0".to_string(),
            background: "#FFFFFF".to_string(),
            palette: vec![
                NodeColors::new("#34d399", "#ecfdf5", "#a7f3d0"),
                NodeColors::new("#fbbf24", "#fffbeb", "#fde68a"),
                NodeColors::new("#fb7185", "#fff1f2", "#fecdd3"),
                NodeColors::new("#38bdf8", "#f0f9ff", "#bae6fd"),
                NodeColors::new("#a78bfa", "#f5f3ff", "#ddd6fe"),
                NodeColors::new("#2dd4bf", "#f0fdfa", "#99f6e4"),
                NodeColors::new("#e879f9", "#fdf4ff", "#f5d0fe"),
                NodeColors::new("#a3e635", "#f7fee7", "#d9f99d"),
                NodeColors::new("#6366f1", "#eef2ff", "#c7d2fe"),
                NodeColors::new("#fb923c", "#fff7ed", "#fed7aa"),
                NodeColors::new("#22d3ee", "#ecfeff", "#a5f3fc"),
                NodeColors::new("#f472b6", "#fdf2f8", "#fbcfe8"),
                NodeColors::new("#4ade80", "#f0fdf4", "#bbf7d0"),
                NodeColors::new("#c084fc", "#faf5ff", "#e9d5ff"),
                NodeColors::new("#fde047", "#fefce8", "#fef08a"),
                NodeColors::new("#60a5fa", "#eff6ff", "#bfdbfe"),
                NodeColors::new("#f87171", "#fef2f2", "#fecaca"),
                NodeColors::new("#5eead4", "#f0fdfa", "#99f6e4"),
                NodeColors::new("#8b5cf6", "#f5f3ff", "#ddd6fe"),
                NodeColors::new("#facc15", "#fefce8", "#fef08a"),
            ],
        }
    }

    /// Monochrome variant: every node shares one header style.
    pub fn classic() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 14.0,
            node_fill: "#ECECFF".to_string(),
            node_border: "#9370DB".to_string(),
            text_color: "#333333".to_string(),
            muted_text_color: "#666666".to_string(),
            line_color: "#333333".to_string(),
            selected_border: "#333333".to_string(),
            tile_fill: "#FFFFFF".to_string(),
            cost_tile_border: "#DC2626".to_string(),
            utility_tile_border: "#16A34A".to_string(),
            both_tile_border: "#F97316".to_string(),
            other_tile_border: "#C7D2E5".to_string(),
            background: "#FFFFFF".to_string(),
            palette: vec![NodeColors::new("#333333", "#F8FAFC", "#E2E8F0")],
        }
    }

    /// Colours for the node at `index` in placement order, cycling the palette.
    pub fn node_colors(&self, index: usize) -> Option<&NodeColors> {
        if self.palette.is_empty() {
            return None;
        }
        self.palette.get(index % self.palette.len())
    }

    pub fn tile_border(&self, impact: ImpactType) -> &str {
        match impact {
            ImpactType::Cost => &self.cost_tile_border,
            ImpactType::Utility | ImpactType::Disutility => &self.utility_tile_border,
            ImpactType::Both => &self.both_tile_border,
            ImpactType::Transition | ImpactType::Other => &self.other_tile_border,
        }
    }
}
