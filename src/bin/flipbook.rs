use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use flipbook::{
    ChannelSwizzle, DisplayPipeline, FileSource, FrameSource as _, Player, Rotation, ToneMapMode,
    TransformState, ViewerConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flipbook", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print page count, first-frame layout and cache sizing as JSON.
    Info(InfoArgs),
    /// Render one page through the display transform as a PNG.
    Frame(FrameArgs),
    /// Print the source pixel under a display position as JSON.
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Input image (GIF, APNG, WebP or any still format `image` reads).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Viewer config JSON (cache budget and display defaults).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Page index (0-based).
    #[arg(long)]
    frame: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    display: DisplayArgs,
}

#[derive(Args, Debug)]
struct ProbeArgs {
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Page index (0-based).
    #[arg(long)]
    frame: u32,

    /// Display column.
    #[arg(long)]
    x: u32,

    /// Display row.
    #[arg(long)]
    y: u32,

    #[command(flatten)]
    display: DisplayArgs,
}

/// Transform flags. Each one overrides the matching value from `--config`.
#[derive(Args, Debug)]
struct DisplayArgs {
    /// Viewer config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Counter-clockwise rotation in degrees (0, 90, 180, 270).
    #[arg(long)]
    rotate: Option<Rotation>,

    /// Mirror left to right.
    #[arg(long, overrides_with = "no_flip_h")]
    flip_h: bool,

    /// Turn off a horizontal flip set in `--config`.
    #[arg(long, overrides_with = "flip_h")]
    no_flip_h: bool,

    /// Mirror top to bottom.
    #[arg(long, overrides_with = "no_flip_v")]
    flip_v: bool,

    /// Turn off a vertical flip set in `--config`.
    #[arg(long, overrides_with = "flip_v")]
    no_flip_v: bool,

    /// clamp, linear, reinhard or drago (HDR frames only).
    #[arg(long)]
    tone_map: Option<ToneMapMode>,

    #[arg(long)]
    gamma: Option<f64>,

    /// identity, swap-red-blue, red, green, blue or alpha.
    #[arg(long)]
    swizzle: Option<ChannelSwizzle>,
}

impl DisplayArgs {
    fn resolve(&self) -> anyhow::Result<(ViewerConfig, TransformState)> {
        let cfg = load_config(self.config.as_deref())?;
        let mut state = cfg.display;
        if let Some(rotation) = self.rotate {
            state.rotation = rotation;
        }
        if let Some(flip) = switch(self.flip_h, self.no_flip_h) {
            state.flip_horizontal = flip;
        }
        if let Some(flip) = switch(self.flip_v, self.no_flip_v) {
            state.flip_vertical = flip;
        }
        if let Some(mode) = self.tone_map {
            state.tone_map = mode;
        }
        if let Some(gamma) = self.gamma {
            state.gamma = gamma;
        }
        if let Some(swizzle) = self.swizzle {
            state.swizzle = swizzle;
        }
        state.validate()?;
        Ok((cfg, state))
    }
}

/// `--x` / `--no-x` pair: `None` keeps the config value. clap keeps only the last one given.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Probe(args) => cmd_probe(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ViewerConfig> {
    match path {
        Some(p) => Ok(ViewerConfig::load(p)?),
        None => Ok(ViewerConfig::default()),
    }
}

fn open_player(path: &Path, cfg: &ViewerConfig) -> anyhow::Result<Player<FileSource>> {
    let source = FileSource::open(path)?;
    let player = Player::open(source, &cfg.player)
        .with_context(|| format!("open player for '{}'", path.display()))?;
    Ok(player)
}

/// Step forward from page 0 until `frame` is current.
fn seek(player: &mut Player<FileSource>, frame: u32) -> anyhow::Result<()> {
    let pages = player.frames_number();
    if frame >= pages {
        anyhow::bail!("frame {frame} out of range ({pages} pages)");
    }
    for _ in 0..frame {
        player.next()?;
    }
    Ok(())
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let player = open_player(&args.in_path, &cfg)?;
    let first = player.current_entry()?;
    let source = player.source();

    let info = serde_json::json!({
        "path": args.in_path.display().to_string(),
        "format": format!("{:?}", source.format()),
        "animated": source.is_animated(),
        "pages": player.frames_number(),
        "residual": source.stores_residual_frames(),
        "width": first.effective().width(),
        "height": first.effective().height(),
        "pixel_format": first.effective().format(),
        "flags": first.frame().flags(),
        "meta": first.frame().meta(),
        "cache_budget_bytes": cfg.player.cache_budget_bytes,
        "max_cache_size": player.max_cache_size(),
    });
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (cfg, state) = args.display.resolve()?;
    let mut player = open_player(&args.in_path, &cfg)?;
    seek(&mut player, args.frame)?;

    let mut pipeline = DisplayPipeline::new(state)?;
    pipeline.attach(&player);
    let output = pipeline
        .output(&player)
        .context("player has no current frame")?;
    let img = output.to_dynamic_image()?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let (cfg, state) = args.display.resolve()?;
    let mut player = open_player(&args.in_path, &cfg)?;
    seek(&mut player, args.frame)?;

    let pipeline = DisplayPipeline::new(state)?;
    let probe = pipeline.probe(&player, args.y, args.x).with_context(|| {
        format!(
            "display position ({}, {}) is outside the frame",
            args.x, args.y
        )
    })?;
    println!("{}", serde_json::to_string_pretty(&probe)?);
    Ok(())
}
