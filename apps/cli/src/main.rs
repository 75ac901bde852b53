//! Splat CLI - turn a phone video into a trained 3D Gaussian splat
//!
//! The `splat` command runs the full capture pipeline: frame extraction
//! (ffmpeg), downscaling (ImageMagick), camera pose estimation (COLMAP),
//! and Gaussian splat training with Brush, either locally or dispatched
//! to a remote GPU host over SSH.

mod render;

use anyhow::Context;
use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{generate, shells};
use splat_core::{
    find_brush, BrushTrainer, JobSpec, MatcherKind, PipelineDriver, RemoteTrainer,
    StdoutProgressSink, Trainer,
};
use splat_remote::{resolve_target, RemoteConfigStore, RemoteTarget, RemoteTargetFlags};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Convert a video into a trained Gaussian splat
///
/// Walks a capture video through frame extraction, COLMAP pose estimation,
/// and splat training. Training runs locally with Brush by default; pass
/// `--remote` to dispatch it to a GPU host configured once with
/// `--save-remote-config`.
#[derive(Parser, Debug)]
#[command(name = "splat", version, about = "Convert a video into a trained Gaussian splat")]
struct Args {
    /// Input video file
    #[arg(short, long)]
    video: PathBuf,

    /// Output workspace directory
    #[arg(short, long)]
    output: PathBuf,

    /// Frames per second to extract from the video
    #[arg(long, default_value_t = 2.0)]
    fps: f64,

    /// Longest-edge cap for extracted frames, in pixels
    #[arg(long, default_value_t = 1600)]
    resolution: u32,

    /// COLMAP feature matcher (sequential suits video, exhaustive unordered stills)
    #[arg(long, value_enum, default_value_t = MatcherArg::Sequential)]
    matcher: MatcherArg,

    /// Training steps (default: chosen from the frame count)
    #[arg(long)]
    steps: Option<u32>,

    /// Spherical harmonics degree, 0-3
    #[arg(long, default_value_t = 3)]
    sh_degree: u8,

    /// Export a .ply snapshot every N steps
    #[arg(long, default_value_t = 5000)]
    export_every: u32,

    /// Path to the Brush executable
    #[arg(long)]
    brush_path: Option<PathBuf>,

    /// Train headless, without the Brush viewer window
    #[arg(long)]
    no_viewer: bool,

    /// Reuse frames already extracted into <OUTPUT>/images
    #[arg(long)]
    skip_extract: bool,

    /// Reuse an existing COLMAP reconstruction
    #[arg(long)]
    skip_colmap: bool,

    /// Prepare data only, skip training
    #[arg(long)]
    skip_training: bool,

    /// Train on a remote GPU host over SSH
    #[arg(long)]
    remote: bool,

    /// Remote host name or address (e.g. 192.168.1.100)
    #[arg(long)]
    remote_host: Option<String>,

    /// SSH user on the remote host
    #[arg(long)]
    remote_user: Option<String>,

    /// Base directory for jobs on the remote host
    #[arg(long)]
    remote_path: Option<String>,

    /// SSH identity file for the remote host
    #[arg(long)]
    ssh_key: Option<PathBuf>,

    /// Persist the resolved remote host settings for later runs
    #[arg(long)]
    save_remote_config: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MatcherArg {
    Sequential,
    Exhaustive,
}

impl From<MatcherArg> for MatcherKind {
    fn from(arg: MatcherArg) -> Self {
        match arg {
            MatcherArg::Sequential => MatcherKind::Sequential,
            MatcherArg::Exhaustive => MatcherKind::Exhaustive,
        }
    }
}

fn job_from_args(args: &Args) -> JobSpec {
    let mut job = JobSpec::new(args.video.clone(), args.output.clone());
    job.extraction.fps = args.fps;
    job.extraction.resolution = args.resolution;
    job.matcher = args.matcher.into();
    job.training.steps = args.steps;
    job.training.sh_degree = args.sh_degree;
    job.training.export_every = args.export_every;
    job.training.with_viewer = !args.no_viewer;
    job.training.brush_path = args.brush_path.clone();
    job.skip.extract = args.skip_extract;
    job.skip.colmap = args.skip_colmap;
    job.skip.training = args.skip_training;
    job
}

/// Resolves the remote target from flags, the saved config, and defaults,
/// persisting it when `--save-remote-config` was passed.
fn resolve_remote(args: &Args) -> anyhow::Result<RemoteTarget> {
    let store = RemoteConfigStore::default_location();
    let stored = store
        .load()
        .with_context(|| format!("reading {}", store.path().display()))?;

    let flags = RemoteTargetFlags {
        host: args.remote_host.clone(),
        user: args.remote_user.clone(),
        key_path: args.ssh_key.clone(),
        remote_path: args.remote_path.clone(),
    };
    let from_config = stored.is_some() && (flags.host.is_none() || flags.user.is_none());
    let target = resolve_target(&flags, stored.as_ref())?;
    if from_config {
        println!("Using saved remote config: {}", target.endpoint());
    }

    if args.save_remote_config {
        store
            .save(&target.to_config())
            .with_context(|| format!("writing {}", store.path().display()))?;
        println!("Saved remote config to {}", store.path().display());
    }

    Ok(target)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Handle completion generation
    if let Ok(shell) = std::env::var("SPLAT_GENERATE_COMPLETIONS") {
        let mut cmd = Args::command();
        match shell.as_str() {
            "bash" => generate(shells::Bash, &mut cmd, "splat", &mut std::io::stdout()),
            "zsh" => generate(shells::Zsh, &mut cmd, "splat", &mut std::io::stdout()),
            "fish" => generate(shells::Fish, &mut cmd, "splat", &mut std::io::stdout()),
            "powershell" => generate(shells::PowerShell, &mut cmd, "splat", &mut std::io::stdout()),
            "elvish" => generate(shells::Elvish, &mut cmd, "splat", &mut std::io::stdout()),
            _ => {
                eprintln!("Unknown shell: {}. Supported: bash, zsh, fish, powershell, elvish", shell);
                std::process::exit(1);
            }
        };
        return Ok(());
    }

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Remote settings are resolved (and optionally persisted) before any
    // stage runs, so `--save-remote-config --skip-training` still saves.
    let remote_target = if args.remote { Some(resolve_remote(&args)?) } else { None };

    let job = job_from_args(&args);

    // Brush is only located up front for local training; a remote run can
    // live without it.
    let brush_binary = if args.skip_training || remote_target.is_some() {
        None
    } else {
        Some(find_brush(args.brush_path.as_deref())?)
    };

    render::banner(&job, remote_target.as_ref(), brush_binary.as_deref());

    let trainer: Option<Box<dyn Trainer>> = if args.skip_training {
        None
    } else if let Some(target) = &remote_target {
        Some(Box::new(RemoteTrainer::new(target.clone())))
    } else {
        brush_binary
            .clone()
            .map(|binary| Box::new(BrushTrainer::new(binary)) as Box<dyn Trainer>)
    };

    let mut driver = PipelineDriver::new(job);
    if let Some(trainer) = trainer {
        driver = driver.with_trainer(trainer);
    }
    let report = driver.run(&StdoutProgressSink).await?;

    // A remote run trained headless; offer the local viewer on the result.
    if report.trained && remote_target.is_some() && !args.no_viewer {
        match find_brush(args.brush_path.as_deref()) {
            Ok(brush) => {
                if let Err(e) = splat_core::launch_viewer(&brush, &args.output) {
                    tracing::warn!("could not open viewer: {e}");
                }
            }
            Err(_) => println!("Tip: install Brush to view the result locally"),
        }
    }

    render::summary(&report, &args.output);
    Ok(())
}
