//! Conversion runner: ties together configuration, PRIM parsing and LUT output.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use primlut_core::lut::{save_scanner, LoadedLut, LutPaths};
use primlut_core::Scanner;
use primlut_geometry::{parse_prim_file, ParseSummary, SegmentRules};

use crate::config::JobConfig;

/// Results from a conversion run.
#[derive(Debug)]
pub struct ConversionOutput {
    pub summary: ParseSummary,
    pub paths: LutPaths,
    /// Layer names and crystal counts, in LUT order.
    pub layers: Vec<(String, usize)>,
}

impl ConversionOutput {
    pub fn total_elements(&self) -> usize {
        self.layers.iter().map(|(_, n)| n).sum()
    }
}

/// Run a full conversion from a job configuration, writing into `out_dir`.
pub fn run_conversion(job: &JobConfig, out_dir: &Path) -> Result<ConversionOutput> {
    let topology = job.topology();
    let mut scanner = Scanner::new(job.scanner_config())?;
    let rules = SegmentRules::new(topology, job.scanner.skip_layer.clone());

    println!("  Scanner: '{}' ({})", job.scanner.name, topology);
    println!("  PRIM file: {}", job.input.prim_file.display());
    if let Some(skip) = &rules.skip_layer {
        println!("  Skipping volumes matching '{}'", skip);
    }

    let summary = parse_prim_file(&job.input.prim_file, &mut scanner, &rules)
        .with_context(|| format!("failed to parse {}", job.input.prim_file.display()))?;

    let layers: Vec<(String, usize)> = scanner
        .layers()
        .iter()
        .map(|l| (l.name().to_string(), l.crystal_count()))
        .collect();
    for (name, count) in &layers {
        println!("  Layer '{}': {} crystals", name, count);
    }
    if scanner.total_elements() == 0 {
        log::warn!("No crystals found; the LUT will be empty");
    }

    let paths = save_scanner(&scanner, out_dir)?;
    Ok(ConversionOutput {
        summary,
        paths,
        layers,
    })
}

/// Print a short report of a finished conversion.
pub fn print_conversion(output: &ConversionOutput) {
    let s = &output.summary;
    println!(
        "Parsed {} segments: {} crystal volumes, {} skipped, {} ignored, {} unnamed",
        s.segments, s.crystal_volumes, s.skipped, s.ignored, s.unnamed
    );
    println!(
        "Total: {} crystals in {} layers",
        output.total_elements(),
        output.layers.len()
    );
    println!("LUT written to: {}", output.paths.lut.display());
    println!("Header written to: {}", output.paths.header.display());
}

/// Per-layer summary of a LUT read back from disk.
#[derive(Debug, Serialize)]
pub struct LayerReport {
    pub index: usize,
    pub crystals: usize,
    /// Axis-aligned bounds of crystal centres: `[min, max]`.
    pub bounds: Option<[[f32; 3]; 2]>,
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub scanner_name: String,
    pub description: String,
    pub number_of_elements: usize,
    pub layers: Vec<LayerReport>,
}

/// Read a LUT / header pair back and summarise it.
pub fn inspect(lut: &Path, header: &Path) -> Result<InspectReport> {
    let loaded = LoadedLut::load(lut, header)
        .with_context(|| format!("failed to load {}", lut.display()))?;

    let layers = loaded
        .layers
        .iter()
        .enumerate()
        .map(|(index, placements)| {
            let bounds = placements.iter().fold(None, |acc: Option<[[f32; 3]; 2]>, p| {
                let [mut lo, mut hi] = acc.unwrap_or([p.position, p.position]);
                for axis in 0..3 {
                    lo[axis] = lo[axis].min(p.position[axis]);
                    hi[axis] = hi[axis].max(p.position[axis]);
                }
                Some([lo, hi])
            });
            LayerReport {
                index,
                crystals: placements.len(),
                bounds,
            }
        })
        .collect();

    Ok(InspectReport {
        scanner_name: loaded.header.scanner_name.clone(),
        description: loaded.header.description.clone(),
        number_of_elements: loaded.total_elements(),
        layers,
    })
}

pub fn print_inspection(report: &InspectReport) {
    println!("Scanner: {} ({})", report.scanner_name, report.description);
    println!("Elements: {}", report.number_of_elements);
    for layer in &report.layers {
        match layer.bounds {
            Some([lo, hi]) => println!(
                "  Layer {}: {} crystals, x=[{:.2}, {:.2}] y=[{:.2}, {:.2}] z=[{:.2}, {:.2}]",
                layer.index, layer.crystals, lo[0], hi[0], lo[1], hi[1], lo[2], hi[2]
            ),
            None => println!("  Layer {}: empty", layer.index),
        }
    }
}

pub fn print_inspection_json(report: &InspectReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    println!("{}", json);
    Ok(())
}
