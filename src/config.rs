use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingConfig {
    pub header_height: f32,
    pub padding: f32,
    pub tile_height: f32,
    pub tile_gap: f32,
    pub empty_padding: f32,
    /// Height used for a node that has neither an estimate nor a measurement.
    pub fallback_height: f32,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            header_height: 66.0,
            padding: 32.0,
            tile_height: 54.0,
            tile_gap: 8.0,
            empty_padding: 24.0,
            fallback_height: 300.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub min_node_width: f32,
    pub max_node_width: f32,
    pub min_col_gap: f32,
    pub max_col_gap: f32,
    pub side_padding: f32,
    pub top_margin: f32,
    pub row_gap: f32,
    pub empty_row_height: f32,
    pub canvas_margin: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_node_width: 240.0,
            max_node_width: 320.0,
            min_col_gap: 200.0,
            max_col_gap: 280.0,
            side_padding: 32.0,
            top_margin: 48.0,
            row_gap: 50.0,
            empty_row_height: 300.0,
            canvas_margin: 200.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub port_spacing: f32,
    pub port_max_offset: f32,
    pub handle_min: f32,
    pub handle_max: f32,
    pub handle_ratio: f32,
    /// When `|dx| == |dy|` the exit port is horizontal if set, vertical otherwise.
    pub horizontal_wins_ties: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            port_spacing: 10.0,
            port_max_offset: 50.0,
            handle_min: 60.0,
            handle_max: 260.0,
            handle_ratio: 0.5,
            horizontal_wins_ties: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfLoopConfig {
    pub radius: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    /// Chevron anchor on the circle, degrees from +X with Y pointing down.
    pub chevron_angle_deg: f32,
    pub chevron_spread_deg: f32,
    pub chevron_arm: f32,
}

impl Default for SelfLoopConfig {
    fn default() -> Self {
        Self {
            radius: 12.0,
            pad_x: 18.0,
            pad_y: 8.0,
            chevron_angle_deg: 320.0,
            chevron_spread_deg: 60.0,
            chevron_arm: 5.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub sizing: SizingConfig,
    pub grid: GridConfig,
    pub routing: RoutingConfig,
    pub self_loop: SelfLoopConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Viewport width used when the caller does not supply one.
    pub viewport_width: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1200.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::modern();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    node_fill: Option<String>,
    node_border: Option<String>,
    text_color: Option<String>,
    muted_text_color: Option<String>,
    line_color: Option<String>,
    selected_border: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SizingConfigFile {
    header_height: Option<f32>,
    padding: Option<f32>,
    tile_height: Option<f32>,
    tile_gap: Option<f32>,
    empty_padding: Option<f32>,
    fallback_height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GridConfigFile {
    min_node_width: Option<f32>,
    max_node_width: Option<f32>,
    min_col_gap: Option<f32>,
    max_col_gap: Option<f32>,
    side_padding: Option<f32>,
    top_margin: Option<f32>,
    row_gap: Option<f32>,
    empty_row_height: Option<f32>,
    canvas_margin: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RoutingConfigFile {
    port_spacing: Option<f32>,
    port_max_offset: Option<f32>,
    handle_min: Option<f32>,
    handle_max: Option<f32>,
    handle_ratio: Option<f32>,
    horizontal_wins_ties: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SelfLoopConfigFile {
    radius: Option<f32>,
    pad_x: Option<f32>,
    pad_y: Option<f32>,
    chevron_angle_deg: Option<f32>,
    chevron_spread_deg: Option<f32>,
    chevron_arm: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    viewport_width: Option<f32>,
    sizing: Option<SizingConfigFile>,
    grid: Option<GridConfigFile>,
    routing: Option<RoutingConfigFile>,
    self_loop: Option<SelfLoopConfigFile>,
}

/// Drops a non-finite override (JSON5 admits `NaN` and `Infinity`) so the
/// default stays in place.
fn finite(value: Option<f32>, key: &str) -> Option<f32> {
    match value {
        Some(v) if !v.is_finite() => {
            log::warn!(key, value = v; "Ignoring non-finite config value");
            None
        }
        other => other,
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Overlays a JSON (or JSON5) config document on the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("invalid config file: {json_err}"))?,
    };

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" => config.theme = Theme::classic(),
            other => log::warn!(theme = other; "Unknown theme name, keeping default"),
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = finite(vars.font_size, "themeVariables.fontSize") {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_border = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.muted_text_color {
            config.theme.muted_text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.selected_border {
            config.theme.selected_border = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
    }

    if let Some(width) = finite(parsed.viewport_width, "viewportWidth") {
        config.render.viewport_width = width.max(0.0);
    }

    if let Some(sizing) = parsed.sizing {
        let target = &mut config.layout.sizing;
        if let Some(v) = finite(sizing.header_height, "sizing.headerHeight") {
            target.header_height = v;
        }
        if let Some(v) = finite(sizing.padding, "sizing.padding") {
            target.padding = v;
        }
        if let Some(v) = finite(sizing.tile_height, "sizing.tileHeight") {
            target.tile_height = v;
        }
        if let Some(v) = finite(sizing.tile_gap, "sizing.tileGap") {
            target.tile_gap = v;
        }
        if let Some(v) = finite(sizing.empty_padding, "sizing.emptyPadding") {
            target.empty_padding = v;
        }
        if let Some(v) = finite(sizing.fallback_height, "sizing.fallbackHeight") {
            target.fallback_height = v;
        }
    }

    if let Some(grid) = parsed.grid {
        let target = &mut config.layout.grid;
        if let Some(v) = finite(grid.min_node_width, "grid.minNodeWidth") {
            target.min_node_width = v;
        }
        if let Some(v) = finite(grid.max_node_width, "grid.maxNodeWidth") {
            target.max_node_width = v;
        }
        if let Some(v) = finite(grid.min_col_gap, "grid.minColGap") {
            target.min_col_gap = v;
        }
        if let Some(v) = finite(grid.max_col_gap, "grid.maxColGap") {
            target.max_col_gap = v;
        }
        if let Some(v) = finite(grid.side_padding, "grid.sidePadding") {
            target.side_padding = v;
        }
        if let Some(v) = finite(grid.top_margin, "grid.topMargin") {
            target.top_margin = v;
        }
        if let Some(v) = finite(grid.row_gap, "grid.rowGap") {
            target.row_gap = v;
        }
        if let Some(v) = finite(grid.empty_row_height, "grid.emptyRowHeight") {
            target.empty_row_height = v;
        }
        if let Some(v) = finite(grid.canvas_margin, "grid.canvasMargin") {
            target.canvas_margin = v;
        }
        // Keep the ranges well formed so clamp() never panics.
        target.max_node_width = target.max_node_width.max(target.min_node_width);
        target.max_col_gap = target.max_col_gap.max(target.min_col_gap);
    }

    if let Some(routing) = parsed.routing {
        let target = &mut config.layout.routing;
        if let Some(v) = finite(routing.port_spacing, "routing.portSpacing") {
            target.port_spacing = v;
        }
        if let Some(v) = finite(routing.port_max_offset, "routing.portMaxOffset") {
            target.port_max_offset = v.abs();
        }
        if let Some(v) = finite(routing.handle_min, "routing.handleMin") {
            target.handle_min = v;
        }
        if let Some(v) = finite(routing.handle_max, "routing.handleMax") {
            target.handle_max = v;
        }
        if let Some(v) = finite(routing.handle_ratio, "routing.handleRatio") {
            target.handle_ratio = v;
        }
        if let Some(v) = routing.horizontal_wins_ties {
            target.horizontal_wins_ties = v;
        }
        target.handle_max = target.handle_max.max(target.handle_min);
    }

    if let Some(self_loop) = parsed.self_loop {
        let target = &mut config.layout.self_loop;
        if let Some(v) = finite(self_loop.radius, "selfLoop.radius") {
            target.radius = v;
        }
        if let Some(v) = finite(self_loop.pad_x, "selfLoop.padX") {
            target.pad_x = v;
        }
        if let Some(v) = finite(self_loop.pad_y, "selfLoop.padY") {
            target.pad_y = v;
        }
        if let Some(v) = finite(self_loop.chevron_angle_deg, "selfLoop.chevronAngleDeg") {
            target.chevron_angle_deg = v;
        }
        if let Some(v) = finite(self_loop.chevron_spread_deg, "selfLoop.chevronSpreadDeg") {
            target.chevron_spread_deg = v;
        }
        if let Some(v) = finite(self_loop.chevron_arm, "selfLoop.chevronArm") {
            target.chevron_arm = v;
        }
    }

    Ok(config)
}
