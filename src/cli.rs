use crate::config::{Config, load_config};
use crate::distribution::{DistributionInput, ViewId, compute_distribution};
use crate::ir::Snapshot;
use crate::layout::{compute_hierarchy_layout, compute_view_layout};
use crate::layout_dump::{DistributionDump, HierarchyDump, write_dump};
use crate::parser::parse_snapshot;
use crate::render::{render_distribution_svg, render_hierarchy_svg, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ownr", version, about = "Ownership charts for a company snapshot")]
pub struct Args {
    /// Snapshot JSON file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file, or directory for pages. Defaults to stdout for SVG and JSON.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Which chart to produce
    #[arg(long = "chart", value_enum, default_value = "hierarchy")]
    pub chart: Chart,

    /// Distribution view id: authorized, classes, total, A, B, C, Ordinary...
    /// Charts default to `total`; JSON output defaults to every view.
    #[arg(long = "view")]
    pub view: Option<String>,

    /// Config JSON/JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
    Pages,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chart {
    Hierarchy,
    Distribution,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let input = read_input(args.input.as_deref())?;
    let snapshot = parse_snapshot(&input)?;
    tracing::debug!(
        company = %snapshot.company.name,
        involvements = snapshot.involvements.len(),
        "loaded snapshot"
    );

    match args.output_format {
        OutputFormat::Pages => export_pages(&snapshot, &config, args.output.as_deref()),
        OutputFormat::Json => write_json(&snapshot, &config, &args),
        OutputFormat::Svg | OutputFormat::Png => {
            let view = args.view.as_deref().unwrap_or("total");
            let svg = render_chart(&snapshot, &config, args.chart, view)?;
            write_svg_or_png(&svg, &config, args.output_format, args.output.as_deref())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn render_chart(snapshot: &Snapshot, config: &Config, chart: Chart, view: &str) -> Result<String> {
    match chart {
        Chart::Hierarchy => {
            let layout = compute_hierarchy_layout(snapshot, &config.theme, &config.layout);
            Ok(render_hierarchy_svg(&layout, &config.theme, &config.layout, None))
        }
        Chart::Distribution => {
            let distribution = compute_distribution(
                &DistributionInput::from_snapshot(snapshot),
                &config.layout.distribution,
            );
            let id = ViewId::parse(view);
            let pie = compute_view_layout(&distribution, &id, &config.theme, &config.layout)
                .with_context(|| {
                    let known: Vec<String> =
                        distribution.view_ids().iter().map(|id| id.to_string()).collect();
                    format!("Unknown view '{id}' (available: {})", known.join(", "))
                })?;
            Ok(render_distribution_svg(&pie, &config.theme, &config.layout))
        }
    }
}

#[cfg(feature = "png")]
fn write_svg_or_png(svg: &str, config: &Config, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    match format {
        OutputFormat::Png => {
            let output = ensure_output(output, "png")?;
            crate::render::write_output_png(svg, &output, &config.render)
        }
        _ => write_output_svg(svg, output),
    }
}

#[cfg(not(feature = "png"))]
fn write_svg_or_png(svg: &str, _config: &Config, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    match format {
        OutputFormat::Png => Err(anyhow::anyhow!("PNG output requires the 'png' feature")),
        _ => write_output_svg(svg, output),
    }
}

fn write_json(snapshot: &Snapshot, config: &Config, args: &Args) -> Result<()> {
    match args.chart {
        Chart::Hierarchy => {
            let layout = compute_hierarchy_layout(snapshot, &config.theme, &config.layout);
            write_dump(args.output.as_deref(), &HierarchyDump::from_layout(&layout, snapshot))
        }
        Chart::Distribution => {
            let distribution = compute_distribution(
                &DistributionInput::from_snapshot(snapshot),
                &config.layout.distribution,
            );
            let dump = match args.view.as_deref() {
                Some(view) => {
                    let id = ViewId::parse(view);
                    let view = distribution
                        .view(&id)
                        .with_context(|| format!("Unknown view '{id}'"))?;
                    DistributionDump::single(&distribution, snapshot, view)
                }
                None => DistributionDump::new(&distribution, snapshot),
            };
            write_dump(args.output.as_deref(), &dump)
        }
    }
}

#[cfg(feature = "png")]
fn export_pages(snapshot: &Snapshot, config: &Config, output: Option<&Path>) -> Result<()> {
    use crate::export::{
        ExportRequest, PngPageAssembler, ResvgSnapshotter, SvgViewport, ViewportSize, export_hierarchy,
    };

    let output_dir = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    let layout = compute_hierarchy_layout(snapshot, &config.theme, &config.layout);
    let mut viewport = SvgViewport::new(
        layout.clone(),
        config.theme.clone(),
        config.layout.clone(),
        ViewportSize {
            width: config.render.width,
            height: config.render.height,
        },
    );
    let mut snapshotter = ResvgSnapshotter {
        render: config.render.clone(),
    };
    let mut assembler = PngPageAssembler::new(output_dir, config.export.pixel_ratio);
    assembler.page_background = config.render.background.clone();
    let request = ExportRequest {
        layout: &layout,
        entity_name: &snapshot.company.name,
        background: &config.render.background,
        config: &config.export,
    };
    let outcome = export_hierarchy(&request, Some(&mut viewport), Some(&mut snapshotter), &mut assembler)
        .context("Export failed; the chart is unchanged and the export can be retried")?;
    if let Some(outcome) = outcome {
        for file in &outcome.document.files {
            eprintln!("{}", file.display());
        }
    }
    Ok(())
}

#[cfg(not(feature = "png"))]
fn export_pages(_snapshot: &Snapshot, _config: &Config, _output: Option<&Path>) -> Result<()> {
    Err(anyhow::anyhow!("Page export requires the 'png' feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(feature = "png")]
fn ensure_output(output: Option<&Path>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.to_path_buf());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
