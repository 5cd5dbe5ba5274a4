//! The `.hscan` scanner header that accompanies a binary LUT.
//!
//! The header is a fixed, ordered list of `key: value` lines. Per-layer fields
//! hold one entry per layer even where the value is global (crystal size,
//! depth of interaction): downstream readers expect one entry per layer.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LutError;
use crate::scanner::Scanner;

const MODALITY: &str = "PET";

const KEY_MODALITY: &str = "modality";
const KEY_NAME: &str = "scanner name";
const KEY_DESCRIPTION: &str = "description";
const KEY_ELEMENTS: &str = "number of elements";
const KEY_LAYERS: &str = "number of layers";
const KEY_VOXELS_TRANS: &str = "voxels number transaxial";
const KEY_VOXELS_AXIAL: &str = "voxels number axial";
const KEY_FOV_TRANS: &str = "field of view transaxial";
const KEY_FOV_AXIAL: &str = "field of view axial";
const KEY_CRYSTALS_IN_LAYER: &str = "number of crystals in layer";
const KEY_SIZE_AXIAL: &str = "crystals size axial";
const KEY_SIZE_TRANS: &str = "crystals size trans";
const KEY_SIZE_DEPTH: &str = "crystals size depth";
const KEY_DOI: &str = "mean depth of interaction";
const KEY_ANGLE_DIFF: &str = "min angle difference";

/// Typed contents of a `.hscan` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanHeader {
    pub modality: String,
    pub scanner_name: String,
    pub description: String,
    pub number_of_elements: usize,
    pub number_of_layers: usize,
    pub voxels_number_transaxial: u32,
    pub voxels_number_axial: u32,
    pub fov_transaxial: f32,
    pub fov_axial: f32,
    pub crystals_in_layer: Vec<usize>,
    pub crystals_size_axial: Vec<f32>,
    pub crystals_size_trans: Vec<f32>,
    pub crystals_size_depth: Vec<f32>,
    pub mean_depth_of_interaction: Vec<f32>,
    pub min_angle_difference: i32,
}

impl ScanHeader {
    /// Build the header describing a finished scanner.
    pub fn from_scanner(scanner: &Scanner) -> Self {
        let config = scanner.config();
        let layers = scanner.num_layers();
        let [size_x, size_y, size_z] = config.crystal_size;
        Self {
            modality: MODALITY.to_string(),
            scanner_name: config.name.clone(),
            description: config.description.clone(),
            number_of_elements: scanner.total_elements(),
            number_of_layers: layers,
            voxels_number_transaxial: config.voxels_number,
            voxels_number_axial: config.voxels_number,
            fov_transaxial: config.fov,
            fov_axial: config.fov,
            crystals_in_layer: scanner.crystal_counts(),
            crystals_size_axial: vec![size_x; layers],
            crystals_size_trans: vec![size_y; layers],
            crystals_size_depth: vec![size_z; layers],
            mean_depth_of_interaction: vec![config.depth_interaction; layers],
            min_angle_difference: config.angle_diff,
        }
    }

    /// Check the counts agree with each other.
    pub fn check_consistency(&self) -> Result<(), LutError> {
        if self.crystals_in_layer.len() != self.number_of_layers {
            return Err(LutError::Format(format!(
                "header declares {} layers but lists {} layer counts",
                self.number_of_layers,
                self.crystals_in_layer.len()
            )));
        }
        let sum: usize = self.crystals_in_layer.iter().sum();
        if sum != self.number_of_elements {
            return Err(LutError::Format(format!(
                "header declares {} elements but layer counts sum to {}",
                self.number_of_elements, sum
            )));
        }
        Ok(())
    }

    /// Parse header text, accepting fields in any order.
    pub fn parse(content: &str) -> Result<Self, LutError> {
        let mut fields: HashMap<&str, (usize, &str)> = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) = line.split_once(':').ok_or_else(|| LutError::Header {
                line: idx + 1,
                message: format!("expected 'key: value', got '{}'", line),
            })?;
            fields.insert(key.trim(), (idx + 1, value.trim()));
        }

        let fields = Fields(fields);
        Ok(Self {
            modality: fields.text(KEY_MODALITY)?,
            scanner_name: fields.text(KEY_NAME)?,
            description: fields.text(KEY_DESCRIPTION)?,
            number_of_elements: fields.scalar(KEY_ELEMENTS)?,
            number_of_layers: fields.scalar(KEY_LAYERS)?,
            voxels_number_transaxial: fields.scalar(KEY_VOXELS_TRANS)?,
            voxels_number_axial: fields.scalar(KEY_VOXELS_AXIAL)?,
            fov_transaxial: fields.scalar(KEY_FOV_TRANS)?,
            fov_axial: fields.scalar(KEY_FOV_AXIAL)?,
            crystals_in_layer: fields.list(KEY_CRYSTALS_IN_LAYER)?,
            crystals_size_axial: fields.list(KEY_SIZE_AXIAL)?,
            crystals_size_trans: fields.list(KEY_SIZE_TRANS)?,
            crystals_size_depth: fields.list(KEY_SIZE_DEPTH)?,
            mean_depth_of_interaction: fields.list(KEY_DOI)?,
            min_angle_difference: fields.scalar(KEY_ANGLE_DIFF)?,
        })
    }
}

impl fmt::Display for ScanHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", KEY_MODALITY, self.modality)?;
        writeln!(f, "{}: {}", KEY_NAME, self.scanner_name)?;
        writeln!(f, "{}: {}", KEY_DESCRIPTION, self.description)?;
        writeln!(f, "{}: {}", KEY_ELEMENTS, self.number_of_elements)?;
        writeln!(f, "{}: {}", KEY_LAYERS, self.number_of_layers)?;
        writeln!(f, "{}: {}", KEY_VOXELS_TRANS, self.voxels_number_transaxial)?;
        writeln!(f, "{}: {}", KEY_VOXELS_AXIAL, self.voxels_number_axial)?;
        writeln!(f, "{}: {}", KEY_FOV_TRANS, format_float(self.fov_transaxial))?;
        writeln!(f, "{}: {}", KEY_FOV_AXIAL, format_float(self.fov_axial))?;
        writeln!(f, "{}: {}", KEY_CRYSTALS_IN_LAYER, join(&self.crystals_in_layer, |n| n.to_string()))?;
        writeln!(f, "{}: {}", KEY_SIZE_AXIAL, join(&self.crystals_size_axial, |v| format_float(*v)))?;
        writeln!(f, "{}: {}", KEY_SIZE_TRANS, join(&self.crystals_size_trans, |v| format_float(*v)))?;
        writeln!(f, "{}: {}", KEY_SIZE_DEPTH, join(&self.crystals_size_depth, |v| format_float(*v)))?;
        writeln!(f, "{}: {}", KEY_DOI, join(&self.mean_depth_of_interaction, |v| format_float(*v)))?;
        writeln!(f, "{}: {}", KEY_ANGLE_DIFF, self.min_angle_difference)
    }
}

/// Shortest round-trip form, always with a decimal point (`2.0`, `0.25`).
fn format_float(value: f32) -> String {
    format!("{:?}", value)
}

fn join<T>(values: &[T], render: impl Fn(&T) -> String) -> String {
    values.iter().map(render).collect::<Vec<_>>().join(", ")
}

struct Fields<'a>(HashMap<&'a str, (usize, &'a str)>);

impl<'a> Fields<'a> {
    fn get(&self, key: &str) -> Result<(usize, &'a str), LutError> {
        self.0.get(key).copied().ok_or_else(|| LutError::Header {
            line: 0,
            message: format!("missing field '{}'", key),
        })
    }

    fn text(&self, key: &str) -> Result<String, LutError> {
        Ok(self.get(key)?.1.to_string())
    }

    fn scalar<T: FromStr>(&self, key: &str) -> Result<T, LutError> {
        let (line, value) = self.get(key)?;
        value.parse().map_err(|_| LutError::Header {
            line,
            message: format!("invalid value for '{}': '{}'", key, value),
        })
    }

    fn list<T: FromStr>(&self, key: &str) -> Result<Vec<T>, LutError> {
        let (line, value) = self.get(key)?;
        value
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse().map_err(|_| LutError::Header {
                    line,
                    message: format!("invalid entry in '{}': '{}'", key, token),
                })
            })
            .collect()
    }
}
