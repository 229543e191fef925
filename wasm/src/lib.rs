use std::collections::BTreeMap;

use serde::Deserialize;
use state_diagram_layout::{LayoutDump, RenderOptions, layout_with_options, render_with_options};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiagramOptions {
    theme: Option<String>,
    viewport_width: Option<f32>,
    selected: Option<String>,
    #[serde(default)]
    measured_heights: BTreeMap<String, f32>,
    all_edges: Option<bool>,
    font_family: Option<String>,
    font_size: Option<f32>,
}

fn build_render_options(options: DiagramOptions) -> RenderOptions {
    let mut render_options = match options.theme.as_deref() {
        Some("classic") | Some("default") => RenderOptions::classic(),
        _ => RenderOptions::modern(),
    };

    if let Some(width) = options.viewport_width {
        render_options.viewport_width = width;
    }
    render_options.selected = options.selected;
    render_options.measured_heights = options.measured_heights.into_iter().collect();
    render_options.all_edges = options.all_edges.unwrap_or(false);
    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }

    render_options
}

fn parse_options(options_json: Option<String>) -> Result<DiagramOptions, JsValue> {
    match options_json {
        Some(raw_options) => serde_json::from_str::<DiagramOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(DiagramOptions::default()),
    }
}

/// Layout of `model` as a JSON string (node boxes, rows, routed edges).
#[wasm_bindgen]
pub fn layout_model_json(model: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = build_render_options(parse_options(options_json)?);
    let (diagram, layout) = layout_with_options(model, &render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))?;
    LayoutDump::from_layout(&layout, &diagram)
        .to_json()
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn render_model_svg(model: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = build_render_options(parse_options(options_json)?);
    render_with_options(model, render_options).map_err(|error| JsValue::from_str(&error.to_string()))
}

#[cfg(test)]
mod tests {
    use state_diagram_layout::{layout_with_options, render_with_options};

    use crate::{DiagramOptions, build_render_options};

    const MODEL: &str = r#"{
        "state_diagram": [["Well", "Sick"], ["Dead"]],
        "transitions": {"Well": ["Sick", "Well", "Dead"], "Sick": ["Dead"]}
    }"#;

    #[test]
    fn options_select_and_measure() {
        let options: DiagramOptions = serde_json::from_str(
            r#"{"viewportWidth": 900, "selected": "Well", "measuredHeights": {"Dead": 180}}"#,
        )
        .unwrap();
        let render_options = build_render_options(options);
        let (_, layout) = layout_with_options(MODEL, &render_options).unwrap();
        assert_eq!(layout.edges.len(), 3);
        assert_eq!(layout.nodes["Dead"].height, 180.0);
    }

    #[test]
    fn renders_svg_with_classic_theme() {
        let options: DiagramOptions = serde_json::from_str(r#"{"theme": "classic"}"#).unwrap();
        let svg = render_with_options(MODEL, build_render_options(options))
            .expect("model should render");
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Sick"));
    }
}
