use crate::config::{Config, load_config};
use crate::ir::GraphDocument;
use crate::layout_dump::write_layout_dump;
use crate::render::write_output_svg;
use crate::view::DiagramView;
use crate::viewport::ViewportState;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "mindflow", version, about = "Mind map and flowchart renderer")]
pub struct Args {
    /// Input document (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). SVG goes to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// What to draw: the full diagram at its logical size, or the live view
    #[arg(short = 'm', long = "mode", value_enum, default_value = "export")]
    pub mode: Mode,

    /// Config JSON file (theme, themeVariables, layout, viewport, render)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// View surface width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// View surface height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// View zoom; defaults to the reset zoom
    #[arg(long = "zoom")]
    pub zoom: Option<f32>,

    /// View pan offset in pixels; defaults to the reset offset
    #[arg(long = "pan-x", allow_hyphen_values = true)]
    pub pan_x: Option<f32>,

    #[arg(long = "pan-y", allow_hyphen_values = true)]
    pub pan_y: Option<f32>,

    /// Write the computed layout as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long = "logLevel", default_value = "warn")]
    pub log_level: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Export,
    View,
}

pub fn run(args: &Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;

    let input = read_input(args.input.as_deref())?;
    let documents = GraphDocument::many_from_json(&input)?;
    if documents.is_empty() {
        return Err(anyhow::anyhow!("No diagrams found in input"));
    }

    if documents.len() == 1 {
        let view = prepare_view(documents.into_iter().next(), args, &config)?;
        if let Some(path) = args.dump_layout.as_deref() {
            dump_layout(&view, path)?;
        }
        let output = match args.output_format {
            OutputFormat::Svg => args.output.clone(),
            OutputFormat::Png => Some(ensure_output(&args.output, &view)?),
        };
        return write_view(&view, args, output.as_deref());
    }

    let outputs = resolve_multi_outputs(args.output.as_deref(), args.output_format, documents.len())?;
    for (idx, document) in documents.into_iter().enumerate() {
        let view = prepare_view(Some(document), args, &config)?;
        if let Some(path) = args.dump_layout.as_deref() {
            dump_layout(&view, &numbered(path, idx, "json"))?;
        }
        write_view(&view, args, Some(&outputs[idx]))?;
    }
    Ok(())
}

fn prepare_view(document: Option<GraphDocument>, args: &Args, config: &Config) -> Result<DiagramView> {
    let document = document.ok_or_else(|| anyhow::anyhow!("No diagrams found in input"))?;
    let mut view = DiagramView::new(config.clone());
    view.load(document)?;
    if args.mode == Mode::View {
        let reset = view.viewport();
        let requested = ViewportState {
            pan_x: args.pan_x.unwrap_or(reset.pan_x),
            pan_y: args.pan_y.unwrap_or(reset.pan_y),
            zoom: args.zoom.unwrap_or(reset.zoom),
        };
        view.set_viewport(requested)?;
        debug!(viewport:? = view.viewport(); "Applied view transform");
    }
    Ok(view)
}

fn write_view(view: &DiagramView, args: &Args, output: Option<&Path>) -> Result<()> {
    match (args.mode, args.output_format) {
        (Mode::Export, OutputFormat::Svg) => write_output_svg(&view.export_svg()?, output)?,
        (Mode::View, OutputFormat::Svg) => write_output_svg(&view.render(), output)?,
        (mode, OutputFormat::Png) => {
            let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            write_png(view, mode, output)?;
        }
    }
    if let Some(path) = output {
        info!(path:? = path; "Wrote diagram");
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(view: &DiagramView, mode: Mode, output: &Path) -> Result<()> {
    match mode {
        Mode::Export => std::fs::write(output, view.export_image()?)?,
        Mode::View => {
            let surface = view.surface();
            crate::render::write_output_png(
                &view.render(),
                output,
                surface.width,
                surface.height,
                &view.config().render,
            )?
        }
    }
    Ok(())
}

#[cfg(not(feature = "png"))]
fn write_png(_view: &DiagramView, _mode: Mode, _output: &Path) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn dump_layout(view: &DiagramView, path: &Path) -> Result<()> {
    let (Some(layout), Some(document)) = (view.layout(), view.document()) else {
        return Err(anyhow::anyhow!("No diagram loaded"));
    };
    write_layout_dump(path, &layout, document)
        .with_context(|| format!("Failed to write layout dump to {}", path.display()))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// PNG output needs a file; without one the document's download name is used.
fn ensure_output(output: &Option<PathBuf>, view: &DiagramView) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    view.export_file_name()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("Output path required for png output"))
}

fn resolve_multi_outputs(
    output: Option<&Path>,
    format: OutputFormat,
    count: usize,
) -> Result<Vec<PathBuf>> {
    let ext = format.extension();
    let base = output.ok_or_else(|| anyhow::anyhow!("Output path required for multiple documents"))?;
    if base.is_dir() {
        let mut outputs = Vec::new();
        for idx in 0..count {
            outputs.push(base.join(format!("diagram-{}.{}", idx + 1, ext)));
        }
        return Ok(outputs);
    }
    Ok((0..count).map(|idx| numbered(base, idx, ext)).collect())
}

fn numbered(base: &Path, idx: usize, ext: &str) -> PathBuf {
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("diagram");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{}-{}.{}", stem, idx + 1, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_view_arguments() {
        let args = Args::try_parse_from([
            "mindflow",
            "-i",
            "map.json",
            "--mode",
            "view",
            "--zoom",
            "1.5",
            "--pan-x",
            "-40",
            "-e",
            "png",
            "-o",
            "out.png",
        ])
        .unwrap();
        assert_eq!(args.mode, Mode::View);
        assert_eq!(args.output_format, OutputFormat::Png);
        assert_eq!(args.zoom, Some(1.5));
        assert_eq!(args.pan_x, Some(-40.0));
        assert_eq!(args.pan_y, None);
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn multi_outputs_are_numbered() {
        let outputs =
            resolve_multi_outputs(Some(Path::new("out/maps.svg")), OutputFormat::Svg, 2).unwrap();
        assert_eq!(
            outputs,
            vec![PathBuf::from("out/maps-1.svg"), PathBuf::from("out/maps-2.svg")]
        );
        assert!(resolve_multi_outputs(None, OutputFormat::Png, 2).is_err());
    }

    #[test]
    fn view_mode_applies_requested_transform() {
        let args = Args::try_parse_from(["mindflow", "--mode", "view", "--zoom", "9"]).unwrap();
        let doc = GraphDocument::from_json(
            r#"{"id": "1", "kind": "flowchart", "nodes": [{"id": "a", "label": "A", "x": 10, "y": 10}]}"#,
        )
        .unwrap();
        let view = prepare_view(Some(doc), &args, &Config::default()).unwrap();
        let viewport = view.viewport();
        assert_eq!(viewport.zoom, 3.0);
        assert_eq!((viewport.pan_x, viewport.pan_y), (150.0, 50.0));
    }
}
