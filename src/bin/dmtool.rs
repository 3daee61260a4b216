use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use rust_dm::encoder::{RenderOptions, encode, render};
use rust_dm::tools::{
    bench_limit_from_env, dataset_iter, dataset_root_from_env, expand_inputs, frame_to_gray_image,
    load_frame,
};
use rust_dm::{Polarity, PolarityMode, ScanConfig, ScanOutcome, ScanSession, SymbolShape};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
};

#[derive(Parser)]
#[command(name = "dmtool", version, about = "RustDM CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Auto,
    Dark,
    Light,
}

impl From<ModeArg> for PolarityMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => PolarityMode::AutoDetect,
            ModeArg::Dark => PolarityMode::ForceDarkOnLight,
            ModeArg::Light => PolarityMode::ForceLightOnDark,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ShapeArg {
    Square,
    Rectangle,
    Any,
}

impl From<ShapeArg> for SymbolShape {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::Square => SymbolShape::Square,
            ShapeArg::Rectangle => SymbolShape::Rectangle,
            ShapeArg::Any => SymbolShape::Any,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Decode image files (directories are walked) as frames of one session
    Decode {
        inputs: Vec<PathBuf>,
        /// Override the polarity policy from the environment
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Run polarity passes one after the other
        #[arg(long)]
        sequential: bool,
    },
    /// Render a fixture symbol to a PNG file
    Render {
        /// Payload; `\x1D`-style escapes are not interpreted, use --gs1 for FNC1
        #[arg(long)]
        text: String,
        #[arg(long)]
        out: PathBuf,
        /// Light modules on a dark background
        #[arg(long)]
        inverted: bool,
        /// Prefix the payload with FNC1 and turn `|` into group separators
        #[arg(long)]
        gs1: bool,
        #[arg(long, default_value_t = 8)]
        module_px: usize,
        #[arg(long, value_enum, default_value = "square")]
        shape: ShapeArg,
    },
    /// Compute the decode rate over a dataset
    ReadingRate {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let is_debug = env_filter.to_string().contains("debug")
        || std::env::var("RUST_LOG").unwrap_or_default().contains("debug");

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::uptime())
        .with_span_events(if is_debug {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Decode {
            inputs,
            mode,
            sequential,
        } => decode_cmd(&inputs, mode, sequential),
        Command::Render {
            text,
            out,
            inverted,
            gs1,
            module_px,
            shape,
        } => render_cmd(&text, out, inverted, gs1, module_px, shape),
        Command::ReadingRate { root, limit } => reading_rate_cmd(root, limit),
    }
}

fn session_config(mode: Option<ModeArg>, sequential: bool) -> Result<ScanConfig> {
    let mut config = ScanConfig::from_env().context("invalid DM_* environment")?;
    if let Some(mode) = mode {
        config = config.with_polarity_mode(mode.into());
    }
    if sequential {
        config = config.with_parallel_passes(false);
    }
    Ok(config)
}

fn decode_cmd(inputs: &[PathBuf], mode: Option<ModeArg>, sequential: bool) -> Result<()> {
    let paths = expand_inputs(inputs);
    if paths.is_empty() {
        bail!("no input images");
    }

    let mut session = ScanSession::try_new(session_config(mode, sequential)?)?;
    let start = Instant::now();
    let mut decoded = 0usize;

    for path in &paths {
        let frame = match load_frame(path, start.elapsed()) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("Failed to load image {}: {}", path.display(), err);
                continue;
            }
        };
        let report = session.scan(&frame);
        let timestamp_ms = report.timestamp.as_millis();
        match &report.outcome {
            ScanOutcome::Decoded(payload) => {
                decoded += 1;
                let polarity = payload
                    .polarity
                    .map(|p| p.to_string())
                    .unwrap_or_default();
                println!(
                    "{}\t{timestamp_ms}ms\t{}\t{polarity}\t{}",
                    path.display(),
                    payload.symbol,
                    payload.display()
                );
            }
            ScanOutcome::NoSymbolFound => println!("{}\t{timestamp_ms}ms\tno symbol", path.display()),
            ScanOutcome::Failed(kind) => {
                println!("{}\t{timestamp_ms}ms\tfailed: {kind:?}", path.display())
            }
        }
        debug!(attempted = ?report.attempted, hint = session.hint().value(), "frame reported");
    }

    info!("Decoded {}/{} frames", decoded, paths.len());
    Ok(())
}

fn render_cmd(
    text: &str,
    out: PathBuf,
    inverted: bool,
    gs1: bool,
    module_px: usize,
    shape: ShapeArg,
) -> Result<()> {
    let mut data = Vec::with_capacity(text.len() + 1);
    if gs1 {
        data.push(0x1D);
        data.extend(text.bytes().map(|b| if b == b'|' { 0x1D } else { b }));
    } else {
        data.extend_from_slice(text.as_bytes());
    }

    let matrix = encode(&data, shape.into())?;
    let polarity = if inverted {
        Polarity::LightOnDark
    } else {
        Polarity::DarkOnLight
    };
    let options = RenderOptions::default()
        .with_polarity(polarity)
        .with_module_px(module_px);
    let frame = render(&matrix, &options)?;
    let image = frame_to_gray_image(&frame).context("rendered frame is not grayscale")?;
    image
        .save(&out)
        .with_context(|| format!("writing {}", out.display()))?;
    info!(
        "Wrote {} symbol ({}) to {}",
        matrix.size(),
        polarity,
        out.display()
    );
    Ok(())
}

fn reading_rate_cmd(root: Option<PathBuf>, limit: Option<usize>) -> Result<()> {
    let root = root.unwrap_or_else(dataset_root_from_env);
    let limit = limit.or_else(bench_limit_from_env);
    let mut session = ScanSession::try_new(session_config(None, false)?)?;

    let start = Instant::now();
    let mut total = 0usize;
    let mut decoded = 0usize;
    for path in dataset_iter(&root, limit) {
        let Ok(frame) = load_frame(&path, start.elapsed()) else {
            continue;
        };
        total += 1;
        if session.scan(&frame).outcome.is_decoded() {
            decoded += 1;
        }
    }

    if total == 0 {
        bail!("no images under {}", root.display());
    }
    let elapsed = start.elapsed();
    println!(
        "Reading rate: {decoded}/{total} ({:.1}%) in {:.2?} ({:.1} ms/frame)",
        decoded as f64 * 100.0 / total as f64,
        elapsed,
        elapsed.as_secs_f64() * 1000.0 / total as f64
    );
    Ok(())
}
