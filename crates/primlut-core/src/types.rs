//! Core types shared across the converter.
//!
//! This module defines the crystal placement record written to the LUT, the
//! two supported scanner topologies and the immutable run configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LutError;

/// A 3-component single-precision vector, matching the LUT float width.
pub type Vec3 = [f32; 3];

/// Default number of reconstructed voxels (transaxial and axial).
pub const DEFAULT_VOXELS_NUMBER: u32 = 161;
/// Default field of view.
pub const DEFAULT_FOV: f32 = 45.0;
/// Default mean depth of interaction; negative means "not set".
pub const DEFAULT_DEPTH_INTERACTION: f32 = -1.0;
/// Default minimal angle difference between two hits of an event.
pub const DEFAULT_ANGLE_DIFF: i32 = 90;

/// One detector element: where it sits and which way it faces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrystalPlacement {
    /// Crystal centre.
    pub position: Vec3,
    /// Crystal orientation (x axis of the placed volume).
    pub orientation: Vec3,
}

impl CrystalPlacement {
    pub fn new(position: Vec3, orientation: Vec3) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// The six floats stored in the LUT: position then orientation.
    pub fn to_floats(&self) -> [f32; 6] {
        let [px, py, pz] = self.position;
        let [ox, oy, oz] = self.orientation;
        [px, py, pz, ox, oy, oz]
    }

    pub fn from_floats(values: [f32; 6]) -> Self {
        Self {
            position: [values[0], values[1], values[2]],
            orientation: [values[3], values[4], values[5]],
        }
    }
}

/// Volume-name prefixes that identify layers and crystals in a PRIM file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    pub layer: &'static str,
    pub crystal: &'static str,
}

/// GATE system type the PRIM file was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// Generic `scanner` system: crystals are direct children of `world`.
    #[default]
    Scanner,
    /// `cylindricalPET` system: every named `layer` volume is a crystal of that layer.
    CylindricalPet,
}

impl Topology {
    pub fn markers(self) -> Markers {
        match self {
            Topology::Scanner => Markers {
                layer: "world",
                crystal: "crystal",
            },
            Topology::CylindricalPet => Markers {
                layer: "layer",
                crystal: "layer",
            },
        }
    }
}

impl FromStr for Topology {
    type Err = LutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scanner" => Ok(Topology::Scanner),
            "cylindricalpet" => Ok(Topology::CylindricalPet),
            other => Err(LutError::Config(format!(
                "unknown scanner type '{}'. Valid types: scanner, cylindricalpet",
                other
            ))),
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::Scanner => f.write_str("scanner"),
            Topology::CylindricalPet => f.write_str("cylindricalpet"),
        }
    }
}

/// Run parameters, fixed before parsing starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Scanner name; also the stem of the output files.
    pub name: String,
    /// Free-text description copied into the header.
    pub description: String,
    /// Nominal crystal size (axial, transaxial, depth).
    pub crystal_size: Vec3,
    /// Default reconstructed voxel count, transaxial = axial.
    pub voxels_number: u32,
    /// Default field of view, transaxial = axial.
    pub fov: f32,
    /// Default mean depth of interaction.
    pub depth_interaction: f32,
    /// Minimal angle difference between two hits of an event.
    pub angle_diff: i32,
}

impl ScannerConfig {
    /// Create a configuration with default acquisition parameters.
    pub fn new(name: impl Into<String>, description: impl Into<String>, crystal_size: Vec3) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            crystal_size,
            voxels_number: DEFAULT_VOXELS_NUMBER,
            fov: DEFAULT_FOV,
            depth_interaction: DEFAULT_DEPTH_INTERACTION,
            angle_diff: DEFAULT_ANGLE_DIFF,
        }
    }

    /// Nominal depth of a single crystal.
    pub fn crystal_depth(&self) -> f32 {
        self.crystal_size[2]
    }

    pub fn validate(&self) -> Result<(), LutError> {
        if self.name.trim().is_empty() {
            return Err(LutError::Config("scanner name must not be empty".into()));
        }
        // The name is a file stem and both fields are single header lines.
        if self.name == "." || self.name == ".." || self.name.contains(['/', '\\']) {
            return Err(LutError::Config(format!(
                "scanner name '{}' must not contain path separators",
                self.name
            )));
        }
        for (field, value) in [("scanner name", &self.name), ("description", &self.description)] {
            if value.chars().any(char::is_control) {
                return Err(LutError::Config(format!(
                    "{} must be a single line, got {:?}",
                    field, value
                )));
            }
        }
        for (axis, value) in ["x", "y", "z"].iter().zip(self.crystal_size) {
            if !value.is_finite() || value <= 0.0 {
                return Err(LutError::Config(format!(
                    "crystal size {} must be positive, got {}",
                    axis, value
                )));
            }
        }
        Ok(())
    }
}
