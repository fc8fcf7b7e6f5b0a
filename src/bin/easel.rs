use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "easel", version)]
struct Cli {
    /// Log debug events to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON list of input events and export the resulting frame as a PNG.
    Script(ScriptArgs),
    /// Frame a screenshot: background, rounded corners, padding.
    Compose(ComposeArgs),
}

#[derive(Parser, Debug)]
struct ScriptArgs {
    /// Input events JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Editor options JSON.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Write the interactive viewport frame (overlays included) instead of the export frame.
    #[arg(long)]
    viewport: bool,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Solid background colour (`#RRGGBB` or `#RRGGBBAA`).
    #[arg(long, conflicts_with_all = ["gradient", "background_image"])]
    colour: Option<String>,

    /// Comma-separated gradient stops, top-left to bottom-right.
    #[arg(long, conflicts_with = "background_image")]
    gradient: Option<String>,

    /// Background image, cover-fitted.
    #[arg(long)]
    background_image: Option<PathBuf>,

    /// Corner radius in pixels.
    #[arg(long, default_value_t = 0.0)]
    radius: f64,

    /// Inset of the input on every edge, in pixels.
    #[arg(long, default_value_t = 0.0)]
    padding: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Script(args) => cmd_script(args),
        Command::Compose(args) => cmd_compose(args),
    }
}

fn cmd_script(args: ScriptArgs) -> anyhow::Result<()> {
    let opts = match &args.opts {
        Some(path) => easel::EditorOpts::from_json_path(path)?,
        None => easel::EditorOpts::default().with_env_overrides(),
    };
    let events = easel::load_script(&args.in_path)?;
    let base_dir = args.in_path.parent().unwrap_or_else(|| Path::new("."));

    let mut editor = easel::Editor::new(opts)?;
    let exports = easel::run_script(&mut editor, events, base_dir)?;
    tracing::debug!(exports, nodes = editor.scene().node_count(), "script replayed");

    let frame = if args.viewport {
        editor.render()?
    } else {
        editor.export()?
    };
    write_png(&args.out, &frame)
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read input '{}'", args.in_path.display()))?;
    let source = easel::decode_image(&bytes)?;

    let background = if let Some(c) = &args.colour {
        easel::Background::Colour(c.parse()?)
    } else if let Some(list) = &args.gradient {
        let stops = list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().parse::<easel::Color>())
            .collect::<Result<Vec<_>, _>>()?;
        easel::Background::Gradient(stops)
    } else if let Some(path) = &args.background_image {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read background '{}'", path.display()))?;
        easel::Background::Image(easel::decode_image(&bytes)?)
    } else {
        easel::Background::Transparent
    };

    let pipeline = easel::RenderPipeline::new().with_stage(easel::Stage::Background(
        easel::BackgroundStage {
            background,
            corner_radius: args.radius,
            padding: args.padding,
        },
    ));
    let out = pipeline.render(&source)?;
    write_png(&args.out, &out)
}

fn write_png(path: &Path, bitmap: &easel::Bitmap) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let png = easel::encode_png(bitmap)?;
    std::fs::write(path, png).with_context(|| format!("write png '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
