use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cvbind_core::{Depth, HostArray};
use cvbind_cv::{ops, to_mat, BackgroundModel, CudaMog2Model, Mog2Model, Mog2Settings};
use ndarray::arr2;
use std::path::PathBuf;

mod config;
mod parser;
mod pipeline;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// TOML file with a [background] table of model settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the bundled smoke example: dot products and one background update
    Demo,
    /// Print the 240x320x3 uint16 zero matrix summary
    Zeros,
    /// Multiply two inline matrices, e.g. --left "1,2;3,4" --right "5,6;7,8"
    Dot {
        #[arg(long)]
        left: String,
        #[arg(long)]
        right: String,
        /// Element type of both operands
        #[arg(long, default_value = "float64")]
        depth: Depth,
    },
    /// Add one to every element of an inline matrix
    Increment {
        #[arg(long)]
        values: String,
        #[arg(long, default_value = "float64")]
        depth: Depth,
    },
    /// Run a video file or camera through a background model
    Subtract {
        /// Video file path, or a camera index
        #[arg(short, long)]
        input: String,
        /// Stop after this many frames
        #[arg(long)]
        frames: Option<u64>,
        /// Use the CUDA model
        #[arg(long)]
        gpu: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let settings = match &args.config {
        Some(path) => config::load_config(path)?.background,
        None => Mog2Settings::default(),
    };

    match args.command {
        Command::Demo => run_demo(settings),
        Command::Zeros => {
            let zeros = ops::make_cv16u_array()?;
            println!("{} array of shape {:?}", zeros.depth(), zeros.dims());
            Ok(())
        }
        Command::Dot { left, right, depth } => {
            let left = parser::parse_matrix(&left, depth).context("Failed to parse --left")?;
            let right = parser::parse_matrix(&right, depth).context("Failed to parse --right")?;
            let product = ops::dot(&left, &right)?;
            println!("{}", parser::format_matrix(&product));
            Ok(())
        }
        Command::Increment { values, depth } => {
            let matrix = parser::parse_matrix(&values, depth).context("Failed to parse --values")?;
            println!("{}", parser::format_matrix(&ops::increment(&matrix)?));
            Ok(())
        }
        Command::Subtract { input, frames, gpu } => run_subtract(&input, frames, gpu, settings),
    }
}

/// Smoke run: a row vector times a column vector, then the row vector fed to
/// a background model as a tiny single-channel frame.
fn run_demo(settings: Mog2Settings) -> Result<()> {
    let a = HostArray::new(arr2(&[[1.0f64, 2.0, 3.0]]));
    let b = HostArray::new(arr2(&[[1.0f64], [2.0], [3.0]]));
    // MOG2 takes 8-bit or float32 frames
    let frame = HostArray::new(arr2(&[[1.0f32, 2.0, 3.0]]));

    let mut model = Mog2Model::new(settings)?;
    let separation = model.apply(&to_mat(&frame)?)?;
    tracing::info!(
        "Background model {:?} after {} frame(s)",
        model.state(),
        model.frames_seen()
    );
    println!(
        "{}",
        parser::format_matrix(&cvbind_cv::from_mat(&separation.foreground_mask)?)
    );

    // should print [[14]] twice
    println!("{}", parser::format_matrix(&ops::dot(&a, &b)?));
    let product = cvbind_cv::dot_mat(&to_mat(&a)?, &to_mat(&b)?)?;
    println!("{}", parser::format_matrix(&cvbind_cv::from_mat(&product)?));
    Ok(())
}

fn run_subtract(input: &str, frames: Option<u64>, gpu: bool, settings: Mog2Settings) -> Result<()> {
    tracing::info!("Opening video source {}", input);
    let mut capture = pipeline::open_source(input)?;

    let mut model: Box<dyn BackgroundModel> = if gpu {
        tracing::info!("Using CUDA background model");
        Box::new(CudaMog2Model::new(settings).context("Failed to create CUDA model")?)
    } else {
        Box::new(Mog2Model::new(settings)?)
    };

    let stats = pipeline::run_subtraction(&mut capture, model.as_mut(), frames)?;
    tracing::info!(
        "Processed {} frames in {:.2}s: mean foreground {:.1}%, peak {:.1}%",
        stats.frames,
        stats.elapsed.as_secs_f64(),
        stats.mean_foreground * 100.0,
        stats.peak_foreground * 100.0
    );
    Ok(())
}
