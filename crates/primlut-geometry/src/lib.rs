//! # primlut geometry
//!
//! Reading GATE PRIM geometry descriptions into a [`primlut_core::Scanner`].
//!
//! - [`parsers::directive`] — Classifies single PRIM lines.
//! - [`parsers::segment`] — Groups directives into segments and resolves them
//!   into layers and crystal placements.

pub mod parsers;

pub use parsers::segment::{parse_prim, ParseSummary, SegmentParser, SegmentRules};
pub use parsers::{parse_prim_file, ParseError};
