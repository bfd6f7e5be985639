use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use overstamp::{
    CancelToken, ComposeOpts, PlacementSession, PresetLibrary, RasterPayload, StyleFilter,
    VideoComposeOpts, VideoSource, WatermarkConfig,
};

#[derive(Parser, Debug)]
#[command(name = "overstamp", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watermark a still image and write a PNG.
    Image(ImageArgs),
    /// Watermark a video (requires `ffmpeg` and `ffprobe` on PATH).
    Video(VideoArgs),
    /// Build a watermark preset from an image file and placement flags.
    Preset(PresetArgs),
}

/// Where the watermark comes from: a single preset, or the active entry of a library.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct WatermarkSource {
    /// Preset JSON (one saved watermark).
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Preset library JSON; its active preset is used.
    #[arg(long)]
    library: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct StyleArgs {
    /// Skip the contrast/brightness enhancement.
    #[arg(long, default_value_t = false)]
    no_filter: bool,

    /// Skip the drop shadow under the watermark.
    #[arg(long, default_value_t = false)]
    no_shadow: bool,
}

impl StyleArgs {
    fn compose_opts(&self) -> ComposeOpts {
        let mut opts = ComposeOpts::default();
        if self.no_filter {
            opts = opts.with_filter(StyleFilter::IDENTITY);
        }
        if self.no_shadow {
            opts = opts.with_shadow(None);
        }
        opts
    }
}

#[derive(Parser, Debug)]
struct ImageArgs {
    /// Input image (PNG, JPEG, WebP, SVG, ...).
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    watermark: WatermarkSource,

    #[command(flatten)]
    style: StyleArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct VideoArgs {
    /// Input video file or URL.
    #[arg(long = "in")]
    input: String,

    #[command(flatten)]
    watermark: WatermarkSource,

    #[command(flatten)]
    style: StyleArgs,

    /// Pace capture against the wall clock (`realtime`) or as fast as possible (`unthrottled`).
    #[arg(long)]
    pacing: Option<overstamp::Pacing>,

    /// How long to wait for the first decoded frame and for each later one.
    #[arg(long)]
    ready_timeout_ms: Option<u64>,

    /// Output path. The extension is adjusted to the container actually produced.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PresetArgs {
    /// Watermark image file.
    #[arg(long)]
    image: PathBuf,

    /// Display name.
    #[arg(long, default_value = overstamp::DEFAULT_PRESET_NAME)]
    name: String,

    /// Keep this id instead of generating one.
    #[arg(long)]
    id: Option<String>,

    /// Center x, percent of the canvas width.
    #[arg(long, default_value_t = 90.0)]
    x: f64,

    /// Center y, percent of the canvas height.
    #[arg(long, default_value_t = 90.0)]
    y: f64,

    /// Width, percent of the canvas width.
    #[arg(long, default_value_t = 15.0)]
    scale: f64,

    #[arg(long, default_value_t = 0.9)]
    opacity: f64,

    /// Degrees.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rotation: f64,

    /// Upsert into this library JSON (created if missing) instead of writing a single preset.
    #[arg(long, conflicts_with = "out")]
    library: Option<PathBuf>,

    /// Output preset JSON path.
    #[arg(long, required_unless_present = "library")]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Image(args) => cmd_image(args),
        Command::Video(args) => cmd_video(args),
        Command::Preset(args) => cmd_preset(args),
    }
}

fn cmd_image(args: ImageArgs) -> anyhow::Result<()> {
    let Some(cfg) = load_watermark(&args.watermark)? else {
        std::fs::copy(&args.in_path, &args.out).with_context(|| {
            format!(
                "copy '{}' to '{}'",
                args.in_path.display(),
                args.out.display()
            )
        })?;
        eprintln!("no watermark active, copied {}", args.out.display());
        return Ok(());
    };

    let source = RasterPayload::from_file(&args.in_path)?;
    let out = overstamp::compose_image_with(&source, &cfg, &args.style.compose_opts())?;

    overstamp::ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, &out.bytes)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_video(args: VideoArgs) -> anyhow::Result<()> {
    let source = VideoSource::parse(&args.input);
    let Some(cfg) = load_watermark(&args.watermark)? else {
        anyhow::bail!("no watermark active; nothing to do for '{source}'");
    };

    let mut opts = VideoComposeOpts::from_env().with_compose(args.style.compose_opts());
    if let Some(pacing) = args.pacing {
        opts = opts.with_pacing(pacing);
    }
    if let Some(ms) = args.ready_timeout_ms {
        let t = Duration::from_millis(ms);
        opts = opts.with_ready_timeout(t).with_stall_timeout(t);
    }

    let composed = overstamp::compose_video(&source, &cfg, &opts, &CancelToken::new())?;

    let out = args.out.with_extension(composed.format.extension());
    overstamp::ensure_parent_dir(&out)?;
    std::fs::write(&out, &composed.video.bytes)
        .with_context(|| format!("write video '{}'", out.display()))?;
    eprintln!(
        "wrote {} ({}, {} frames)",
        out.display(),
        composed.video.mime,
        composed.frame_count
    );
    Ok(())
}

fn cmd_preset(args: PresetArgs) -> anyhow::Result<()> {
    let mut session = match &args.id {
        Some(id) => {
            let image = RasterPayload::from_file(&args.image)?;
            PlacementSession::edit(&WatermarkConfig::new(id.clone(), args.name.clone(), image))
        }
        None => {
            let mut s = PlacementSession::new();
            s.set_image(RasterPayload::from_file(&args.image)?);
            s.set_name(args.name.clone());
            s
        }
    };
    session.set_position(args.x, args.y);
    session.set_scale(args.scale);
    session.set_opacity(args.opacity);
    session.set_rotation(args.rotation);
    let cfg = session.save()?;

    if let Some(path) = &args.library {
        let mut library = if path.exists() {
            read_library(path)?
        } else {
            PresetLibrary::new()
        };
        library.upsert(cfg)?;
        write_json(path, &library.to_json()?)?;
    } else if let Some(path) = &args.out {
        let json = serde_json::to_string_pretty(&cfg).context("serialize preset")?;
        write_json(path, &json)?;
    }
    Ok(())
}

/// `None` means the sentinel (or nothing) is active.
fn load_watermark(src: &WatermarkSource) -> anyhow::Result<Option<WatermarkConfig>> {
    if let Some(path) = &src.preset {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read preset '{}'", path.display()))?;
        let cfg: WatermarkConfig = serde_json::from_str(&text)
            .with_context(|| format!("parse preset '{}'", path.display()))?;
        return Ok((!cfg.is_none_sentinel()).then_some(cfg));
    }
    if let Some(path) = &src.library {
        return Ok(read_library(path)?.resolve_active().cloned());
    }
    Ok(None)
}

fn read_library(path: &Path) -> anyhow::Result<PresetLibrary> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read preset library '{}'", path.display()))?;
    Ok(PresetLibrary::from_json(&text)?)
}

fn write_json(path: &Path, json: &str) -> anyhow::Result<()> {
    overstamp::ensure_parent_dir(path)?;
    std::fs::write(path, json).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
