//! FFTSpectrum command-line interface.
//!
//! Render centred log-magnitude spectra of 8-bit grayscale frames:
//! ```sh
//! fftspectrum run job.toml
//! fftspectrum render frame0.png frame1.png --grid -o spectra
//! fftspectrum validate job.toml
//! fftspectrum info frame0.png
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use fftspectrum_core::VideoFormat;

#[derive(Parser)]
#[command(name = "fftspectrum")]
#[command(about = "FFTSpectrum: centred Fourier magnitude spectra of grayscale frames")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a render job from a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render the given frames without a configuration file.
    Render {
        /// Input images, in frame order.
        #[arg(required = true)]
        frames: Vec<PathBuf>,
        /// Output directory.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
        /// Burn a 100-pixel reference grid centred on the DC term.
        #[arg(long)]
        grid: bool,
        /// Compute backend: "auto" or "cpu".
        #[arg(long, default_value = "auto")]
        backend: String,
    },
    /// Validate a configuration file and its inputs without rendering.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Display the geometry and storage format of an image.
    Info {
        /// Image to inspect.
        frame: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("FFTSpectrum");
            println!("===========");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let out_dir = output.unwrap_or_else(|| job.output.directory.clone());
            let written = runner::run_job(&job, &out_dir)?;
            println!("Wrote {} spectrum image(s) to {}", written.len(), out_dir.display());
            Ok(())
        }
        Commands::Render {
            frames,
            output,
            grid,
            backend,
        } => {
            let job = config::JobConfig::from_frames(frames, grid, backend);
            let written = runner::run_job(&job, &output)?;
            for path in &written {
                println!("  {}", path.display());
            }
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let prepared = runner::prepare_job(&job)?;
            println!("Configuration is valid: {}", config.display());
            println!(
                "  {} frame(s) of {}x{}, backend: {}",
                prepared.inputs.len(),
                prepared.filter.geometry().width,
                prepared.filter.geometry().height,
                job.compute.backend
            );
            Ok(())
        }
        Commands::Info { frame } => {
            let loaded = runner::load_frame(&frame)?;
            let VideoFormat {
                color_family,
                sample_type,
                bits_per_sample,
            } = loaded.format;
            println!("{}", loaded.path.display());
            println!("  Size:   {}x{}", loaded.plane.width(), loaded.plane.height());
            println!(
                "  Format: {:?} {:?} {}-bit",
                color_family, sample_type, bits_per_sample
            );
            if loaded.format.is_8bit_luma() {
                println!("  Supported by FFTSpectrum");
            } else {
                println!("  Not supported: FFTSpectrum needs 8-bit integer luma input");
            }
            Ok(())
        }
    }
}
