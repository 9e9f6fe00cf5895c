use std::{path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use scenesplit::{
    ClipEncoderOptions, FfmpegLogLevel, LeadInPolicy, ProgressCallback, ProgressInfo,
    SceneSplitter, SplitOptions, VideoCodec, VideoSource,
};

const CLI_AFTER_HELP: &str = "Examples:\n  scenesplit split input.mp4 --out clips --threshold 0.6 --progress\n  scenesplit scan input.mp4 --json\n  scenesplit metadata input.mp4 --json\n  scenesplit completions zsh > _scenesplit";

#[derive(Debug, Parser)]
#[command(
    name = "scenesplit",
    version,
    about = "Split videos into clips at detected scene-change boundaries",
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

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Split a video into clips at scene boundaries.
    #[command(
        about = "Split a video into per-scene clips",
        after_help = "Examples:\n  scenesplit split input.mp4 --out clips\n  scenesplit split input.mp4 --out clips --threshold 0.7 --codec h265 --crf 20 --progress"
    )]
    Split {
        /// Input video path.
        input: String,
        /// Output directory for clip files (created if missing).
        #[arg(long)]
        out: PathBuf,
        /// Similarity threshold in (0, 1]; lower detects fewer cuts.
        #[arg(long, default_value_t = 0.6)]
        threshold: f64,
        /// Drop frames before the first detected cut instead of starting
        /// clip 1 at the first frame.
        #[arg(long)]
        drop_lead: bool,
        /// Container extension for clip files.
        #[arg(long, default_value = "mp4")]
        ext: String,
        /// Output codec: h264 | h265 | mpeg4.
        #[arg(long, default_value = "h264")]
        codec: String,
        /// Constant Rate Factor (0-51, lower is better quality).
        #[arg(long)]
        crf: Option<u32>,
        /// Target bitrate in bits per second (overrides --crf).
        #[arg(long)]
        bitrate: Option<usize>,
        /// Output the summary as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Detect scene boundaries without writing clips.
    #[command(
        about = "Report scene boundaries",
        after_help = "Examples:\n  scenesplit scan input.mp4\n  scenesplit scan input.mp4 --threshold 0.5 --json"
    )]
    Scan {
        /// Input video path.
        input: String,
        /// Similarity threshold in (0, 1].
        #[arg(long, default_value_t = 0.6)]
        threshold: f64,
        /// Output boundaries as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print metadata for a video file (alias: probe).
    #[command(about = "Print video metadata", visible_aliases = ["probe", "info"])]
    Metadata {
        /// Input video path.
        input: String,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate a source (and optionally an output directory) before
    /// splitting.
    #[command(about = "Validate a video file")]
    Validate {
        /// Input video path.
        input: String,
        /// Intended output directory to check for writability.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Similarity threshold to check.
        #[arg(long, default_value_t = 0.6)]
        threshold: f64,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_codec(value: &str) -> Option<VideoCodec> {
    match value.to_ascii_lowercase().as_str() {
        "h264" | "avc" => Some(VideoCodec::H264),
        "h265" | "hevc" => Some(VideoCodec::H265),
        "mpeg4" | "mp4v" => Some(VideoCodec::Mpeg4),
        _ => None,
    }
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

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &global.log_level {
        let parsed = parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?;
        scenesplit::set_ffmpeg_log_level(parsed);
    }
    Ok(())
}

/// Progress bar bridge: forwards split-pass progress to an indicatif bar.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new(total: Option<u64>) -> Result<Self, Box<dyn std::error::Error>> {
        let bar = match total {
            Some(total) => {
                let bar = ProgressBar::new(total);
                let style = ProgressStyle::with_template(
                    "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
                )?;
                bar.set_style(style.progress_chars("##-"));
                bar
            }
            None => ProgressBar::new_spinner(),
        };
        Ok(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.current);
    }
}

fn split_options_for(
    global: &GlobalOptions,
    threshold: f64,
    drop_lead: bool,
    ext: &str,
    encoder: ClipEncoderOptions,
    progress: Option<Arc<TerminalProgress>>,
) -> SplitOptions {
    let mut options = SplitOptions::new()
        .with_threshold(threshold)
        .with_extension(ext)
        .with_encoder(encoder);

    if drop_lead {
        options = options.with_lead_in_policy(LeadInPolicy::OpenOnFirstCut);
    }

    if let Some(progress) = progress {
        options = options.with_progress(progress).with_batch_size(1);
    } else if !global.progress {
        // Avoid per-frame callback overhead when nobody is listening.
        options = options.with_batch_size(32);
    }

    options
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Split {
            input,
            out,
            threshold,
            drop_lead,
            ext,
            codec,
            crf,
            bitrate,
            json,
        } => {
            let codec = parse_codec(&codec).ok_or(format!("unsupported --codec: {codec}"))?;
            let mut encoder = ClipEncoderOptions::default().codec(codec);
            if let Some(crf) = crf {
                encoder = encoder.crf(crf);
            }
            if let Some(bitrate) = bitrate {
                encoder = encoder.bitrate(bitrate);
            }

            let mut source = VideoSource::open(&input)?;
            let info = source.info().clone();

            let progress_bar = if cli.global.progress {
                let total = (info.frame_count > 0).then_some(info.frame_count);
                Some(Arc::new(TerminalProgress::new(total)?))
            } else {
                None
            };

            let options = split_options_for(
                &cli.global,
                threshold,
                drop_lead,
                &ext,
                encoder,
                progress_bar.clone(),
            );

            let summary = SceneSplitter::new(options).split(&mut source, &out)?;

            if let Some(bar) = &progress_bar {
                bar.finish();
            }

            if json {
                let payload = json!({
                    "clips_written": summary.clips_written,
                    "frames_read": summary.frames_read,
                    "frames_written": summary.frames_written,
                    "output_directory": out.display().to_string(),
                    "boundaries": summary.boundaries.iter().map(|b| json!({
                        "frame_number": b.frame_number,
                        "timestamp_seconds": b.timestamp.as_secs_f64(),
                        "similarity": b.similarity,
                    })).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else if summary.clips_written == 0 {
                println!(
                    "{} {}",
                    "done:".yellow().bold(),
                    "no clips produced (no scene change fell below threshold)".yellow()
                );
            } else {
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!(
                        "Video split into {} clip(s) in {} ({} of {} frames written)",
                        summary.clips_written,
                        out.display(),
                        summary.frames_written,
                        summary.frames_read,
                    )
                    .green()
                );
            }

            if cli.global.verbose {
                for boundary in &summary.boundaries {
                    eprintln!(
                        "cut at {:.3}s (frame {}, similarity {:.3})",
                        boundary.timestamp.as_secs_f64(),
                        boundary.frame_number,
                        boundary.similarity,
                    );
                }
            }
        }
        Commands::Scan {
            input,
            threshold,
            json,
        } => {
            let mut source = VideoSource::open(&input)?;
            let options = SplitOptions::new().with_threshold(threshold);
            let boundaries = SceneSplitter::new(options).scan(&mut source)?;

            if json {
                let payload: Vec<_> = boundaries
                    .iter()
                    .map(|boundary| {
                        json!({
                            "frame_number": boundary.frame_number,
                            "timestamp_seconds": boundary.timestamp.as_secs_f64(),
                            "similarity": boundary.similarity,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else if boundaries.is_empty() {
                println!("no scene boundaries detected");
            } else {
                for boundary in boundaries {
                    println!(
                        "cut at {:.3}s (frame {}, similarity {:.3})",
                        boundary.timestamp.as_secs_f64(),
                        boundary.frame_number,
                        boundary.similarity,
                    );
                }
            }
        }
        Commands::Metadata { input, json } => {
            let source = VideoSource::open(&input)?;
            let info = source.info();
            if json {
                let payload = json!({
                    "format": info.format,
                    "duration_seconds": info.duration.as_secs_f64(),
                    "width": info.width,
                    "height": info.height,
                    "fps": info.frames_per_second,
                    "frame_count": info.frame_count,
                    "codec": info.codec,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Format: {}", info.format);
                println!("Duration: {:?}", info.duration);
                println!(
                    "Video: {}x{} @ {:.2} fps [{}], ~{} frames",
                    info.width, info.height, info.frames_per_second, info.codec, info.frame_count,
                );
            }
        }
        Commands::Validate {
            input,
            out,
            threshold,
        } => {
            let source = VideoSource::open(&input)?;
            let report = match out {
                Some(out) => scenesplit::validate_run(source.info(), threshold, &out),
                None => source.validate(),
            };
            print!("{report}");
            if !report.is_valid() {
                return Err("validation failed".into());
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "scenesplit", &mut std::io::stdout());
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

#[cfg(test)]
mod tests {
    use super::{parse_codec, parse_log_level};
    use scenesplit::VideoCodec;

    #[test]
    fn parse_codec_aliases() {
        assert_eq!(parse_codec("h264"), Some(VideoCodec::H264));
        assert_eq!(parse_codec("HEVC"), Some(VideoCodec::H265));
        assert_eq!(parse_codec("mp4v"), Some(VideoCodec::Mpeg4));
        assert_eq!(parse_codec("vp9"), None);
    }

    #[test]
    fn parse_log_level_aliases() {
        assert!(parse_log_level("quiet").is_some());
        assert!(parse_log_level("WARN").is_some());
        assert!(parse_log_level("noisy").is_none());
    }
}
