//! primlut command-line interface.
//!
//! Convert GATE PRIM geometry files into CASToR LUT files:
//! ```sh
//! primlut convert --scanner-name jpet --description "J-PET" \
//!     --prim-file geometry.prim --crystals-size 0.6 2.5 50 --save-path out
//! primlut run job.toml
//! primlut validate job.toml
//! primlut inspect out/jpet.lut out/jpet.hscan
//! ```

mod config;
mod runner;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use primlut_core::types::{
    DEFAULT_ANGLE_DIFF, DEFAULT_DEPTH_INTERACTION, DEFAULT_FOV, DEFAULT_VOXELS_NUMBER,
};
use primlut_core::Topology;

use crate::config::{InputConfig, JobConfig, OutputConfig, ScannerSection};

#[derive(Parser)]
#[command(name = "primlut")]
#[command(about = "Convert GATE PRIM geometry files to CASToR LUT files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PRIM file using command-line parameters.
    Convert(ConvertArgs),
    /// Convert a PRIM file described by a TOML job file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a job file without converting.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Read a LUT and its header back and summarise them.
    Inspect {
        /// Binary LUT file.
        lut: PathBuf,
        /// Matching `.hscan` header.
        header: PathBuf,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct ConvertArgs {
    /// Name of the generated scanner (also the output file stem).
    #[arg(long, alias = "scanner_name")]
    scanner_name: String,
    /// Description of the generated scanner.
    #[arg(long, alias = "scanner_description")]
    description: String,
    /// Path to the input PRIM file.
    #[arg(long, alias = "prim_file")]
    prim_file: PathBuf,
    /// Size of crystals (x, y, z).
    #[arg(long, alias = "crystals_size", num_args = 3, value_names = ["X", "Y", "Z"], required = true)]
    crystals_size: Vec<f32>,
    /// Directory where the LUT and header are written.
    #[arg(long, alias = "save_path", default_value = ".")]
    save_path: PathBuf,
    /// GATE system type of the PRIM file: scanner or cylindricalpet.
    #[arg(long, alias = "scanner_type", default_value = "scanner")]
    scanner_type: String,
    /// Default number of reconstructed voxels.
    #[arg(long, alias = "voxels_number", default_value_t = DEFAULT_VOXELS_NUMBER)]
    voxels_number: u32,
    /// Default field of view.
    #[arg(long, default_value_t = DEFAULT_FOV)]
    fov: f32,
    /// Default mean depth of interaction.
    #[arg(long, alias = "depth_interaction", default_value_t = DEFAULT_DEPTH_INTERACTION, allow_negative_numbers = true)]
    depth_interaction: f32,
    /// Minimal angle difference between two hits of an event.
    #[arg(long, alias = "angle_diff", default_value_t = DEFAULT_ANGLE_DIFF, allow_negative_numbers = true)]
    angle_diff: i32,
    /// Skip volumes whose name contains this string (e.g. WLS layers).
    #[arg(long, alias = "skip_layer")]
    skip_layer: Option<String>,
}

impl ConvertArgs {
    fn into_job(self) -> anyhow::Result<JobConfig> {
        let scanner_type: Topology = self.scanner_type.parse()?;
        // clap enforces exactly three values
        let size = &self.crystals_size;
        Ok(JobConfig {
            scanner: ScannerSection {
                crystals_size: [size[0], size[1], size[2]],
                name: self.scanner_name,
                description: self.description,
                scanner_type,
                voxels_number: self.voxels_number,
                fov: self.fov,
                depth_interaction: self.depth_interaction,
                angle_diff: self.angle_diff,
                skip_layer: self.skip_layer,
            },
            input: InputConfig {
                prim_file: self.prim_file,
            },
            output: OutputConfig {
                directory: self.save_path,
            },
        })
    }
}

fn convert(job: &JobConfig, out_dir: &std::path::Path) -> anyhow::Result<()> {
    println!("primlut PRIM → LUT converter");
    println!("============================");
    job.validate()?;
    let output = runner::run_conversion(job, out_dir)?;
    runner::print_conversion(&output);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => {
            let job = args.into_job()?;
            convert(&job, &job.output.directory)
        }
        Commands::Run { config, output } => {
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());
            let out_dir = output.unwrap_or_else(|| job.output.directory.clone());
            convert(&job, &out_dir)
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            job.validate()?;
            println!("Configuration is valid: {}", config.display());
            Ok(())
        }
        Commands::Inspect { lut, header, json } => {
            let report = runner::inspect(&lut, &header)?;
            if json {
                runner::print_inspection_json(&report)
            } else {
                runner::print_inspection(&report);
                Ok(())
            }
        }
    }
}
