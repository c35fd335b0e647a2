use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use clipcap::{
    Admission, CancellationToken, ClipSource, FfmpegLogLevel, MediaProbe, ProgressCallback,
    ProgressInfo, RangeSelector, TrimOptions, UploadGate, UploadLimits, VideoCodec,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  clipcap probe input.mp4 --json\n  clipcap check upload.mov --profile tool\n  clipcap trim input.mp4 clip.mp4 --start 5 --end 0:15 --progress\n  clipcap completions zsh > _clipcap";

#[derive(Debug, Parser)]
#[command(
    name = "clipcap",
    version,
    about = "Validate, cap, and re-encode fixed-length clips from larger videos",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar where supported.
    #[arg(long)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print metadata for a video file.
    #[command(
        about = "Print video metadata",
        visible_alias = "info",
        after_help = "Examples:\n  clipcap probe input.mp4\n  clipcap probe input.mp4 --json"
    )]
    Probe {
        /// Input video path.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check a file against upload limits.
    #[command(
        about = "Gate a file against type/size/resolution/duration limits",
        after_help = "Examples:\n  clipcap check upload.mp4\n  clipcap check upload.mov --profile tool --max-duration 5"
    )]
    Check {
        /// Input video path.
        input: PathBuf,

        /// Limit profile to start from (admin, tool).
        #[arg(long, default_value = "admin")]
        profile: String,

        /// Override the file size ceiling in bytes.
        #[arg(long)]
        max_size: Option<u64>,

        /// Override the pixel dimension ceiling.
        #[arg(long)]
        max_dimension: Option<u32>,

        /// Override the duration cap in seconds.
        #[arg(long)]
        max_duration: Option<f64>,
    },

    /// Trim a sub-range of a video into a new clip.
    #[command(
        about = "Re-encode a sub-range into a compact clip",
        after_help = "Examples:\n  clipcap trim input.mp4 clip.mp4 --start 5 --end 15\n  clipcap trim input.mp4 clip.webm --start 0:05 --end 0:15 --codec vp9 --progress"
    )]
    Trim {
        /// Input video path.
        input: PathBuf,

        /// Output clip path; the container is inferred from the extension.
        output: PathBuf,

        /// Range start (seconds, mm:ss, or hh:mm:ss).
        #[arg(long)]
        start: String,

        /// Range end (seconds, mm:ss, or hh:mm:ss).
        #[arg(long)]
        end: String,

        /// Clamp the selection to at most this many seconds, preserving the
        /// start handle (mirrors the capped range selector).
        #[arg(long)]
        max_span: Option<f64>,

        /// Output frame rate.
        #[arg(long, default_value_t = 30)]
        fps: u32,

        /// Output codec (auto, vp9, h264, mpeg4).
        #[arg(long, default_value = "auto")]
        codec: String,

        /// Constant Rate Factor quality (0-51, lower is better).
        #[arg(long)]
        crf: Option<u32>,

        /// Target bitrate in bits per second (overrides CRF).
        #[arg(long)]
        bitrate: Option<usize>,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Some(FfmpegLogLevel::Quiet),
        "panic" => Some(FfmpegLogLevel::Panic),
        "fatal" => Some(FfmpegLogLevel::Fatal),
        "error" => Some(FfmpegLogLevel::Error),
        "warning" | "warn" => Some(FfmpegLogLevel::Warning),
        "info" => Some(FfmpegLogLevel::Info),
        "verbose" => Some(FfmpegLogLevel::Verbose),
        "debug" => Some(FfmpegLogLevel::Debug),
        "trace" => Some(FfmpegLogLevel::Trace),
        _ => None,
    }
}

fn parse_codec(value: &str) -> Option<VideoCodec> {
    match value.to_ascii_lowercase().as_str() {
        "auto" => Some(VideoCodec::Auto),
        "vp9" => Some(VideoCodec::Vp9),
        "h264" | "avc" => Some(VideoCodec::H264),
        "mpeg4" => Some(VideoCodec::Mpeg4),
        _ => None,
    }
}

/// Parse `"75"`, `"75.5"`, `"01:15"`, or `"00:01:15.5"` into seconds.
fn parse_timecode(value: &str) -> Option<f64> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() > 3 || parts.is_empty() {
        return None;
    }
    let mut seconds = 0.0_f64;
    for part in &parts {
        let component: f64 = part.parse().ok()?;
        if component < 0.0 {
            return None;
        }
        seconds = seconds * 60.0 + component;
    }
    Some(seconds)
}

/// The codec's natural container extension, when the output path's
/// extension disagrees with it.
///
/// The mp4 family (mp4, m4v, mov) is interchangeable for the mp4-native
/// codecs; VP9 belongs in WebM.
fn container_mismatch(codec: VideoCodec, output: &Path) -> Option<&'static str> {
    let expected = codec.extension();
    let actual = output
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let compatible = match expected {
        "webm" => actual == "webm",
        _ => matches!(actual.as_str(), "mp4" | "m4v" | "mov"),
    };
    (!compatible).then_some(expected)
}

fn parse_profile(value: &str) -> Option<UploadLimits> {
    match value.to_ascii_lowercase().as_str() {
        "admin" | "admin-media" => Some(UploadLimits::admin_media()),
        "tool" | "tool-upload" => Some(UploadLimits::tool_upload()),
        _ => None,
    }
}

fn ensure_writable_path(path: &PathBuf, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &global.log_level {
        let parsed = parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?;
        clipcap::set_ffmpeg_log_level(parsed);
    } else if !global.verbose {
        // FFmpeg's own stderr chatter drowns the CLI output by default.
        clipcap::set_ffmpeg_log_level(FfmpegLogLevel::Error);
    }
    Ok(())
}

/// Bridges the library's per-frame callback onto an indicatif bar.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new(total: u64) -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(total);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.current);
        if let Some(timestamp) = info.current_timestamp {
            self.bar.set_message(format!("{:.2}s", timestamp.as_secs_f64()));
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Probe { input, json } => {
            let info = MediaProbe::probe(&input)?;
            if json {
                let payload = json!({
                    "width": info.width,
                    "height": info.height,
                    "duration_seconds": info.duration.as_secs_f64(),
                    "fps": info.frames_per_second,
                    "frame_count": info.frame_count,
                    "codec": info.codec,
                    "container": info.container,
                    "file_size": info.file_size,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Container: {}", info.container);
                println!("Codec: {}", info.codec);
                println!("Dimensions: {}x{}", info.width, info.height);
                println!("Duration: {:.3}s", info.duration.as_secs_f64());
                println!("Frame rate: {:.2} fps", info.frames_per_second);
                println!("Frames: ~{}", info.frame_count);
                println!("Size: {} bytes", info.file_size);
            }
        }

        Commands::Check {
            input,
            profile,
            max_size,
            max_dimension,
            max_duration,
        } => {
            let mut limits =
                parse_profile(&profile).ok_or(format!("unsupported --profile: {profile}"))?;
            if let Some(bytes) = max_size {
                limits = limits.with_max_file_size(bytes);
            }
            if let Some(pixels) = max_dimension {
                limits = limits.with_max_dimension(pixels);
            }
            if let Some(seconds) = max_duration {
                limits = limits.with_max_duration(Duration::from_secs_f64(seconds));
            }

            let gate = UploadGate::new(limits);
            match gate.check(&input)? {
                Admission::Direct(info) => {
                    println!(
                        "{} {}",
                        "admitted:".green().bold(),
                        format!(
                            "{} ({}x{}, {:.1}s) is within every limit",
                            input.display(),
                            info.width,
                            info.height,
                            info.duration.as_secs_f64(),
                        )
                        .green()
                    );
                }
                Admission::NeedsTrim(info) => {
                    println!(
                        "{} {}",
                        "needs trim:".yellow().bold(),
                        format!(
                            "{} is {:.1}s, over the {:.1}s cap",
                            input.display(),
                            info.duration.as_secs_f64(),
                            gate.limits().max_duration.as_secs_f64(),
                        )
                        .yellow()
                    );
                }
            }
        }

        Commands::Trim {
            input,
            output,
            start,
            end,
            max_span,
            fps,
            codec,
            crf,
            bitrate,
        } => {
            ensure_writable_path(&output, cli.global.overwrite)?;

            let start = parse_timecode(&start).ok_or(format!("invalid --start: {start}"))?;
            let end = parse_timecode(&end).ok_or(format!("invalid --end: {end}"))?;
            // Resolve Auto up front so the container warning reflects the
            // codec that will actually be written.
            let codec = parse_codec(&codec)
                .ok_or(format!("unsupported --codec: {codec}"))?
                .resolve()?;
            if let Some(expected) = container_mismatch(codec, &output) {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!(
                        "{codec:?} normally goes in .{expected}; writing it into {} anyway",
                        output.display(),
                    )
                    .yellow()
                );
            }

            let mut source = ClipSource::open(&input)?;
            let duration = source.info().duration_seconds();

            // Route the requested pair through the clamping selector so the
            // CLI honours the same span-cap semantics as an interactive UI.
            let mut selector = RangeSelector::new(duration, max_span.unwrap_or(duration))?;
            selector.set_range(start, end);
            let range = selector.confirm()?;
            if cli.global.verbose && range.as_pair() != (start, end) {
                eprintln!(
                    "clamped selection to [{:.3}, {:.3}]",
                    range.start, range.end
                );
            }

            let mut options = TrimOptions::default()
                .with_fps(fps)
                .with_codec(codec)
                .with_cancellation(CancellationToken::new());
            if let Some(crf) = crf {
                options = options.with_crf(crf);
            }
            if let Some(bitrate) = bitrate {
                options = options.with_bitrate(bitrate);
            }

            let bar = if cli.global.progress {
                Some(Arc::new(BarProgress::new(range.frame_count(fps))?))
            } else {
                None
            };
            if let Some(bar) = &bar {
                options = options.with_progress(bar.clone());
            }

            let result = source.trimmer().range(range).options(options).run(&output)?;

            if let Some(bar) = &bar {
                bar.finish();
            }

            println!(
                "{} {}",
                "success:".green().bold(),
                format!(
                    "wrote {} ({} frames, {:.2}s, {}x{}, {:?})",
                    result.path.display(),
                    result.frame_count,
                    result.duration.as_secs_f64(),
                    result.width,
                    result.height,
                    result.codec,
                )
                .green()
            );
        }

        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
