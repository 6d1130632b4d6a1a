use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use trimreel::playback::apply_action;
use trimreel::{
    AssetSlot, DirectorySink, EditorConfig, FfmpegEngine, FrameSize, JobArgs, MediaEngine,
    PlaybackClock, Preset, RenderAsset, RenderAssets, RenderRequestBuilder, Synchronizer,
    Transcript,
};

#[derive(Parser, Debug)]
#[command(name = "trimreel", version)]
struct Cli {
    /// More log output (`-v` debug, `-vv` trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the transcript lines visible at one playback position.
    Window(WindowArgs),
    /// Simulate playback over the trim range and print transcript changes.
    Play(PlayArgs),
    /// Print the ffmpeg argument list a render would submit.
    Plan(JobInputs),
    /// Render with the system ffmpeg and save the result (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct RangeArgs {
    /// Editor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Transcript JSON (overrides the config).
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Media duration in seconds.
    #[arg(long)]
    duration: f64,

    /// Trim range start in seconds.
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Trim range end in seconds (defaults to the duration).
    #[arg(long)]
    end: Option<f64>,
}

#[derive(Args, Debug)]
struct WindowArgs {
    #[command(flatten)]
    range: RangeArgs,

    /// Playback position in seconds.
    #[arg(long)]
    at: f64,
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[command(flatten)]
    range: RangeArgs,

    /// Seconds between simulated time updates.
    #[arg(long, default_value_t = 1.0)]
    tick: f64,
}

#[derive(Args, Debug)]
struct JobInputs {
    /// Editor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Intro clip played before the base video.
    #[arg(long)]
    intro: Option<PathBuf>,

    /// Image pinned to the top-left corner.
    #[arg(long)]
    left: Option<PathBuf>,

    /// Image pinned to the top-right corner.
    #[arg(long)]
    right: Option<PathBuf>,

    /// Frame size for intro concatenation, e.g. `640x480`.
    #[arg(long, value_parser = parse_frame_size)]
    frame: Option<FrameSize>,

    /// Encoder preset.
    #[arg(long)]
    preset: Option<Preset>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    job: JobInputs,

    /// Base video (overrides the config).
    #[arg(long)]
    video: Option<PathBuf>,

    /// Directory the output is saved into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// ffmpeg executable (overrides the config).
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Keep staged files in this directory (overrides the config). Without it they go to a
    /// temporary directory removed after the render.
    #[arg(long)]
    workdir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Window(args) => cmd_window(args),
        Command::Play(args) => cmd_play(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_frame_size(s: &str) -> Result<FrameSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let frame = FrameSize {
        width: w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?,
        height: h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?,
    };
    frame.validate().map_err(|e| e.to_string())?;
    Ok(frame)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EditorConfig> {
    match path {
        Some(p) => Ok(EditorConfig::from_path(p)?),
        None => Ok(EditorConfig::default()),
    }
}

fn synchronizer_for(args: &RangeArgs) -> anyhow::Result<Synchronizer> {
    let cfg = load_config(args.config.as_deref())?;
    let transcript_path = args
        .transcript
        .clone()
        .or(cfg.transcript)
        .context("no transcript given (use --transcript or a config with \"transcript\")")?;
    let transcript = Transcript::from_json_path(&transcript_path)?;

    let mut sync = Synchronizer::new(transcript);
    sync.on_duration_change(args.duration);
    if args.start != 0.0 || args.end.is_some() {
        sync.on_range_change(args.start, args.end.unwrap_or(args.duration));
    }
    Ok(sync)
}

fn print_window(sync: &Synchronizer) {
    for (i, (ts, line)) in sync.visible_lines().into_iter().enumerate() {
        let marker = if i == 0 { '>' } else { ' ' };
        println!("{marker} [{ts:>5}s] {line}");
    }
}

fn cmd_window(args: WindowArgs) -> anyhow::Result<()> {
    let mut sync = synchronizer_for(&args.range)?;
    let update = sync.on_time_update(args.at);
    if let Some(action) = update.action {
        eprintln!("playback clamped: {action:?}");
    }
    print_window(&sync);
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.tick.is_finite() && args.tick > 0.0,
        "--tick must be a positive number of seconds"
    );
    anyhow::ensure!(
        args.range.duration.is_finite() && args.range.duration >= 0.0,
        "--duration must be a finite, non-negative number of seconds"
    );
    let mut sync = synchronizer_for(&args.range)?;
    let mut clock = PlaybackClock::new(args.range.duration, args.tick);

    let settle = sync.on_time_update(clock.position());
    if let Some(action) = settle.action {
        apply_action(&mut clock, action);
    }
    clock.play();

    let mut shown: Vec<u64> = Vec::new();
    loop {
        if sync.visible() != shown.as_slice() {
            println!("-- t={:.2}s", sync.current_time());
            print_window(&sync);
            shown = sync.visible().to_vec();
        }
        let Some(event) = clock.advance() else {
            break;
        };
        let update = sync.handle(event);
        if let Some(action) = update.action {
            apply_action(&mut clock, action);
            eprintln!("playback clamped: {action:?}");
        }
    }
    eprintln!("stopped at {:.2}s", clock.position());
    Ok(())
}

fn selected_assets(job: &JobInputs) -> anyhow::Result<RenderAssets> {
    let mut assets = RenderAssets::default();
    for (slot, path) in [
        (AssetSlot::Intro, &job.intro),
        (AssetSlot::LeftOverlay, &job.left),
        (AssetSlot::RightOverlay, &job.right),
    ] {
        if let Some(path) = path {
            assets.select(slot, RenderAsset::from_path(path)?);
        }
    }
    Ok(assets)
}

fn merged_config(job: &JobInputs) -> anyhow::Result<EditorConfig> {
    let mut cfg = load_config(job.config.as_deref())?;
    if let Some(frame) = job.frame {
        cfg.frame = frame;
    }
    if let Some(preset) = job.preset {
        cfg.preset = preset;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_plan(job: JobInputs) -> anyhow::Result<()> {
    let cfg = merged_config(&job)?;
    let assets = selected_assets(&job)?;
    anyhow::ensure!(
        assets.has_any(),
        "nothing to render: pass --intro, --left or --right"
    );

    println!("ffmpeg \\");
    for arg in JobArgs::plan(&assets, &cfg.render_opts()).to_args() {
        println!("  {arg:?} \\");
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = merged_config(&args.job)?;
    if let Some(ffmpeg) = args.ffmpeg {
        cfg.ffmpeg = ffmpeg;
    }
    if let Some(workdir) = args.workdir {
        cfg.workdir = Some(workdir);
    }
    let video_path = args
        .video
        .or(cfg.video.clone())
        .context("no base video given (use --video or a config with \"video\")")?;

    let base_video = RenderAsset::from_path(&video_path)?;
    let opts = cfg.render_opts();
    let mut builder = match &cfg.placeholder {
        Some(p) => RenderRequestBuilder::new(base_video, RenderAsset::from_path(p)?, opts),
        None => RenderRequestBuilder::with_blank_placeholder(base_video, opts)?,
    };
    for (slot, asset) in selected_assets(&args.job)?.selected() {
        builder.select_asset(slot, asset.clone());
    }
    anyhow::ensure!(
        builder.can_render(),
        "nothing to render: pass --intro, --left or --right"
    );

    let mut engine = FfmpegEngine::new();
    engine.load(&cfg.engine_location())?;

    let task = builder.spawn_render(engine, DirectorySink::new(&args.out_dir));
    for msg in task.updates() {
        eprint!("\r{msg}   ");
    }
    eprintln!();

    let outcome = task.join()?;
    let path = outcome.result?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

