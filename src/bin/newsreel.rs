use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use newsreel::clip::{ClipContext, render_placeholder};
use newsreel::providers::media::load_media_manifest;
use newsreel::script::load::load_script_file;
use newsreel::text::TextEngine;
use newsreel::voice::{CommandVoice, SilenceVoice, VoiceSynthesizer};
use newsreel::{Article, Producer, RenderConfig, RenderOutput, Renderer};

#[derive(Parser, Debug)]
#[command(name = "newsreel", version)]
struct Cli {
    /// Log per-scene decisions.
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a script document into an MP4 (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// Produce an MP4 from an article through the configured provider commands.
    Produce(ProduceArgs),
    /// Render one placeholder frame as a PNG.
    Placeholder(PlaceholderArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Script JSON (`script_text`, `scenes`).
    #[arg(long)]
    script: PathBuf,

    /// Media manifest JSON (list of `{scene_number, path, type}`).
    #[arg(long)]
    media: Option<PathBuf>,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Render config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use a silent narration of this many seconds instead of the voice command.
    #[arg(long)]
    silence: Option<f64>,
}

#[derive(Parser, Debug)]
struct ProduceArgs {
    /// Article JSON (`title`, `description`, `content`).
    #[arg(long)]
    article: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Render config JSON with `providers` commands.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlaceholderArgs {
    /// Text to show.
    #[arg(long)]
    text: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Render config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Produce(args) => cmd_produce(args),
        Command::Placeholder(args) => cmd_placeholder(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RenderConfig> {
    match path {
        Some(p) => Ok(RenderConfig::load(p)?),
        None => Ok(RenderConfig::default()),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let script = load_script_file(&args.script)?;
    let media = match &args.media {
        Some(path) => load_media_manifest(path)?,
        None => Vec::new(),
    };
    let voice: Box<dyn VoiceSynthesizer> = match args.silence {
        Some(secs) => Box::new(SilenceVoice::new(secs)),
        None => Box::new(CommandVoice::new(cfg.voice.clone())),
    };

    let renderer = Renderer::new(cfg, voice)?;
    let output = renderer.render(&script, &media, &args.out)?;
    report(&output);
    Ok(())
}

fn cmd_produce(args: ProduceArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let json = std::fs::read_to_string(&args.article)
        .with_context(|| format!("read article '{}'", args.article.display()))?;
    let article: Article = serde_json::from_str(&json)
        .with_context(|| format!("parse article '{}'", args.article.display()))?;

    let producer = Producer::from_config(Renderer::from_config(cfg)?)?;
    let output = producer.produce(&article, &args.out)?;
    report(&output);
    Ok(())
}

fn cmd_placeholder(args: PlaceholderArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let text = TextEngine::with_system_fonts(&cfg.caption.font_files);
    let ctx = ClipContext::from_config(&cfg, text);
    let frame = render_placeholder(
        ctx.canvas,
        &args.text,
        &ctx.placeholder,
        &ctx.placeholder_font,
        &ctx.text,
    );

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn report(output: &RenderOutput) {
    for seg in &output.report.segments {
        eprintln!(
            "scene {:>3}  frames {:>6}..{:<6} {:?}{}",
            seg.scene_number,
            seg.frames.start.0,
            seg.frames.end.0,
            seg.origin,
            if seg.captioned { " +caption" } else { "" }
        );
    }
    eprintln!(
        "wrote {} ({:.2}s narration, {} frames)",
        output.out_path.display(),
        output.narration_secs,
        output.report.total_frames
    );
}
