//! Expansion of over-deep volumes into stacked crystals.
//!
//! Simulation geometries sometimes model a stack of crystals as one bounding
//! volume. When the volume's depth (z extent) exceeds the nominal crystal
//! depth `d`, it is replaced by `n = floor(2 * depth / d)` placements spaced
//! by `d` along z, the first one at `origin_z - d - (n / 2) * d`.
//!
//! The truncation in `n` is intentional: fractional stacks are not modelled.
//! A volume that would expand past [`MAX_SPLIT`] crystals is a format error.
//! Arithmetic is `f32` throughout to match the LUT.

use crate::error::LutError;
use crate::types::{CrystalPlacement, Vec3};

const DEPTH_AXIS: usize = 2;

/// Upper bound on the crystals a single volume may expand into.
pub const MAX_SPLIT: u32 = 1 << 16;

/// Number of crystals represented by a volume of depth `box_depth`.
///
/// Returns 1 when the volume is no deeper than a single crystal.
pub fn split_factor(box_depth: f32, crystal_depth: f32) -> Result<u32, LutError> {
    if !crystal_depth.is_finite() || crystal_depth <= 0.0 {
        return Err(LutError::Config(format!(
            "crystal depth must be positive, got {}",
            crystal_depth
        )));
    }
    if !box_depth.is_finite() {
        return Err(LutError::Format(format!("box depth must be finite, got {}", box_depth)));
    }
    if box_depth <= crystal_depth {
        return Ok(1);
    }

    let ratio = ((2.0 * box_depth) / crystal_depth).floor();
    if !ratio.is_finite() || ratio > MAX_SPLIT as f32 {
        return Err(LutError::Format(format!(
            "box depth {} splits into more than {} crystals of depth {}",
            box_depth, MAX_SPLIT, crystal_depth
        )));
    }
    // In range [2, MAX_SPLIT] after the checks above.
    Ok(ratio as u32)
}

/// Turn one placed volume into one or more crystal placements.
pub fn split_crystal(
    origin: Vec3,
    orientation: Vec3,
    box_size: Vec3,
    crystal_depth: f32,
) -> Result<Vec<CrystalPlacement>, LutError> {
    let n = split_factor(box_size[DEPTH_AXIS], crystal_depth)?;
    if n <= 1 {
        return Ok(vec![CrystalPlacement::new(origin, orientation)]);
    }

    let mut position = origin;
    position[DEPTH_AXIS] -= crystal_depth + (n as f32 / 2.0) * crystal_depth;

    let mut placements = Vec::with_capacity(n as usize);
    for _ in 0..n {
        placements.push(CrystalPlacement::new(position, orientation));
        position[DEPTH_AXIS] += crystal_depth;
    }
    Ok(placements)
}
