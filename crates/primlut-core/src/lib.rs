//! # primlut core
//!
//! The scanner model behind the PRIM → CASToR LUT conversion. This crate is
//! independent of the input format: the PRIM parser in `primlut-geometry`
//! drives it, and the writer here turns the finished model into the two
//! output artifacts.
//!
//! ## Modules
//!
//! - [`types`] — Crystal placements, scanner topologies and run configuration.
//! - [`scanner`] — The geometry model: named layers of crystal placements.
//! - [`splitter`] — Expansion of over-deep volumes into stacked crystals.
//! - [`header`] — The `.hscan` text header, rendered and parsed.
//! - [`lut`] — Binary LUT serialisation and read-back.

pub mod error;
pub mod header;
pub mod lut;
pub mod scanner;
pub mod splitter;
pub mod types;

pub use error::LutError;
pub use header::ScanHeader;
pub use scanner::{Layer, LayerId, Scanner};
pub use types::{CrystalPlacement, Markers, ScannerConfig, Topology, Vec3};
