#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod render;
pub mod selection;
pub mod session;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config, parse_config};
pub use ir::{Diagram, Edge, ImpactType, Node, Tile};
pub use layout::{Layout, compute_layout, route_edges};
pub use layout_dump::LayoutDump;
pub use model::{ModelError, parse_model};
pub use render::render_svg;
pub use selection::Selection;
pub use session::DiagramSession;
pub use theme::Theme;

/// Everything a one-shot render needs besides the model itself.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub viewport_width: f32,
    pub selected: Option<String>,
    pub measured_heights: Vec<(String, f32)>,
    /// Route every transition instead of only the selected node's.
    pub all_edges: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::modern()
    }
}

impl RenderOptions {
    pub fn modern() -> Self {
        Self {
            theme: Theme::modern(),
            layout: LayoutConfig::default(),
            viewport_width: RenderConfig::default().viewport_width,
            selected: None,
            measured_heights: Vec::new(),
            all_edges: false,
        }
    }

    pub fn classic() -> Self {
        Self {
            theme: Theme::classic(),
            ..Self::modern()
        }
    }
}

fn session_for(model: &str, options: &RenderOptions) -> anyhow::Result<DiagramSession> {
    let diagram = parse_model(model)?;
    let mut session = DiagramSession::new(diagram, options.layout.clone());
    session.set_viewport_width(options.viewport_width);
    session.record_measured_heights(
        options
            .measured_heights
            .iter()
            .map(|(id, height)| (id.as_str(), *height)),
    );
    if let Some(id) = options.selected.as_deref() {
        session.click_node(id);
    }
    Ok(session)
}

/// Parses `model` and runs one layout pass with `options`.
pub fn layout_with_options(model: &str, options: &RenderOptions) -> anyhow::Result<(Diagram, Layout)> {
    let mut session = session_for(model, options)?;
    let mut layout = session.layout().clone();
    if options.all_edges {
        layout.edges = route_edges(&session.diagram().edges, &layout.nodes, &options.layout);
    }
    Ok((session.diagram().clone(), layout))
}

pub fn render_with_options(model: &str, options: RenderOptions) -> anyhow::Result<String> {
    let (diagram, layout) = layout_with_options(model, &options)?;
    Ok(render_svg(&layout, &diagram, &options.theme, &options.layout))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"{
        "state_diagram": [["Well", "Sick"], ["Dead"]],
        "transitions": {"Well": ["Sick", "Dead"], "Sick": ["Well", "Sick", "Dead"]}
    }"#;

    #[test]
    fn layout_with_options_applies_selection_and_heights() {
        let options = RenderOptions {
            selected: Some("Sick".to_string()),
            measured_heights: vec![("Well".to_string(), 250.0)],
            ..RenderOptions::default()
        };
        let (_, layout) = layout_with_options(MODEL, &options).unwrap();
        assert_eq!(layout.edges.len(), 3);
        assert_eq!(layout.nodes["Well"].height, 250.0);
        assert_eq!(layout.selected.as_deref(), Some("Sick"));
    }

    #[test]
    fn all_edges_routes_everything() {
        let options = RenderOptions {
            all_edges: true,
            ..RenderOptions::classic()
        };
        let (_, layout) = layout_with_options(MODEL, &options).unwrap();
        assert_eq!(layout.edges.len(), 5);
        assert_eq!(layout.selected, None);
    }

    #[test]
    fn render_with_options_produces_svg() {
        let svg = render_with_options(MODEL, RenderOptions::modern()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Dead"));
        assert!(render_with_options("[]", RenderOptions::modern()).is_err());
    }
}
