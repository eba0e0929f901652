//! TOML configuration deserialisation for render jobs.

use std::path::PathBuf;

use fftspectrum_core::FftSpectrumOptions;
use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub spectrum: FftSpectrumOptions,
    #[serde(default)]
    pub compute: ComputeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Frames of the clip, in order.
#[derive(Debug, Deserialize)]
pub struct InputConfig {
    pub frames: Vec<PathBuf>,
}

/// Transform backend selection.
#[derive(Debug, Deserialize)]
pub struct ComputeConfig {
    /// Compute backend: "auto" or "cpu". Default: "auto".
    #[serde(default = "default_backend")]
    pub backend: String,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

fn default_backend() -> String {
    "auto".into()
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    /// Appended to each input file stem (default: "_spectrum").
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            suffix: default_suffix(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}
fn default_suffix() -> String {
    "_spectrum".into()
}

impl JobConfig {
    /// A job built from command-line arguments instead of a file.
    pub fn from_frames(frames: Vec<PathBuf>, grid: bool, backend: String) -> Self {
        Self {
            input: InputConfig { frames },
            spectrum: FftSpectrumOptions { grid },
            compute: ComputeConfig { backend },
            output: OutputConfig::default(),
        }
    }
}

/// Parse a TOML job configuration.
pub fn parse_config(content: &str) -> anyhow::Result<JobConfig> {
    let config: JobConfig = toml::from_str(content)?;
    if config.input.frames.is_empty() {
        anyhow::bail!("[input] frames must list at least one image");
    }
    Ok(config)
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}
