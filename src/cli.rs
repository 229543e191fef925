use crate::config::{Config, load_config};
use crate::layout::route_edges;
use crate::layout_dump::write_layout_dump;
use crate::model::parse_model;
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::{render_svg, write_output_svg};
use crate::session::DiagramSession;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{LevelFilter, debug, info};
use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "sdlr", version, about = "State diagram layout and edge routing")]
pub struct Args {
    /// Model file (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (layout constants, theme, themeVariables)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width. Defaults to the configured render width.
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Node whose outgoing transitions are drawn
    #[arg(short = 's', long = "select")]
    pub select: Option<String>,

    /// Draw every transition regardless of selection
    #[arg(long = "all-edges")]
    pub all_edges: bool,

    /// JSON object of measured node heights, keyed by node id
    #[arg(long = "heights")]
    pub heights: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level);
    debug!(args:?; "Parsed arguments");
    run_with_args(&args)
}

fn init_logger(level: &str) {
    let log_level = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });
    // A second init (tests, embedding) is harmless.
    let _ = env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .try_init();
}

pub fn run_with_args(args: &Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.viewport_width = width;
    }

    let input = read_input(args.input.as_deref())?;
    let diagram = parse_model(&input)?;
    info!(
        rows = diagram.rows.len(),
        nodes = diagram.nodes.len(),
        edges = diagram.edges.len();
        "Loaded model"
    );

    let mut session = DiagramSession::new(diagram, config.layout.clone());
    session.set_viewport_width(config.render.viewport_width);
    if let Some(path) = args.heights.as_deref() {
        session.record_measured_heights(read_heights(path)?);
    }
    if let Some(id) = args.select.as_deref() {
        if !session.diagram().contains(id) {
            return Err(anyhow::anyhow!("Unknown node for --select: {id}"));
        }
        session.click_node(id);
    }

    let mut layout = session.layout().clone();
    if args.all_edges {
        layout.edges = route_edges(&session.diagram().edges, &layout.nodes, &config.layout);
    }

    match args.output_format {
        OutputFormat::Json => write_layout_dump(args.output.as_deref(), &layout, session.diagram()),
        OutputFormat::Svg => {
            let svg = render_svg(&layout, session.diagram(), &config.theme, &config.layout);
            write_output_svg(&svg, args.output.as_deref())
        }
        OutputFormat::Png => write_png(&layout, &session, &config, args.output.as_deref()),
    }
}

#[cfg(feature = "png")]
fn write_png(
    layout: &crate::layout::Layout,
    session: &DiagramSession,
    config: &Config,
    output: Option<&Path>,
) -> Result<()> {
    let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
    let svg = render_svg(layout, session.diagram(), &config.theme, &config.layout);
    write_output_png(&svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(
    _layout: &crate::layout::Layout,
    _session: &DiagramSession,
    _config: &Config,
    _output: Option<&Path>,
) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn read_heights(path: &Path) -> Result<BTreeMap<String, f32>> {
    let contents = std::fs::read_to_string(path)?;
    let heights = match serde_json::from_str(&contents) {
        Ok(heights) => heights,
        Err(json_err) => json5::from_str(&contents)
            .map_err(|_| anyhow::anyhow!("invalid heights file: {json_err}"))?,
    };
    Ok(heights)
}
