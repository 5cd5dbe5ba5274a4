//! TOML configuration deserialisation for conversion jobs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use primlut_core::types::{
    DEFAULT_ANGLE_DIFF, DEFAULT_DEPTH_INTERACTION, DEFAULT_FOV, DEFAULT_VOXELS_NUMBER,
};
use primlut_core::{ScannerConfig, Topology};
use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub scanner: ScannerSection,
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Scanner description and acquisition defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerSection {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Crystal size (x, y, z).
    pub crystals_size: [f32; 3],
    /// GATE system type: "scanner" or "cylindricalpet". Default: "scanner".
    #[serde(default, rename = "type")]
    pub scanner_type: Topology,
    #[serde(default = "default_voxels_number")]
    pub voxels_number: u32,
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_depth_interaction")]
    pub depth_interaction: f32,
    #[serde(default = "default_angle_diff")]
    pub angle_diff: i32,
    /// Volumes whose name contains this substring are ignored (e.g. WLS layers).
    #[serde(default)]
    pub skip_layer: Option<String>,
}

fn default_voxels_number() -> u32 {
    DEFAULT_VOXELS_NUMBER
}
fn default_fov() -> f32 {
    DEFAULT_FOV
}
fn default_depth_interaction() -> f32 {
    DEFAULT_DEPTH_INTERACTION
}
fn default_angle_diff() -> i32 {
    DEFAULT_ANGLE_DIFF
}

/// Input file.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub prim_file: PathBuf,
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: ".").
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl JobConfig {
    pub fn topology(&self) -> Topology {
        self.scanner.scanner_type
    }

    pub fn scanner_config(&self) -> ScannerConfig {
        let s = &self.scanner;
        let mut config = ScannerConfig::new(s.name.clone(), s.description.clone(), s.crystals_size);
        config.voxels_number = s.voxels_number;
        config.fov = s.fov;
        config.depth_interaction = s.depth_interaction;
        config.angle_diff = s.angle_diff;
        config
    }

    /// Check everything that can be checked before touching the input file.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.scanner_config().validate()?;
        Ok(())
    }
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: JobConfig =
        toml::from_str(&content).with_context(|| format!("invalid job file {}", path.display()))?;
    Ok(config)
}
