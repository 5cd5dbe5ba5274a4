//! Segment assembly and resolution.
//!
//! Directives are accumulated into a [`Segment`] until a terminator line. The
//! finished segment is then resolved against the topology's markers:
//!
//! 1. a name starting with the layer marker selects (or creates) that layer;
//! 2. a name starting with the crystal marker places the volume, split by the
//!    crystal depth, into the current layer;
//! 3. anything else is ignored.
//!
//! Rules 1 and 2 are independent. Under `cylindricalpet` both markers are
//! `layer`, so each `layer*` volume selects its layer and is placed into it.
//! Names containing the skip substring are dropped before either rule.

use primlut_core::splitter::split_crystal;
use primlut_core::{LayerId, LutError, Markers, Scanner, Topology, Vec3};

use super::directive::{read_directive, Directive, ObjectName};
use super::ParseError;

const MODULE_PREFIX: &str = "module";

/// How segment names map onto layers and crystals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRules {
    pub markers: Markers,
    /// Volumes whose name contains this substring are dropped.
    pub skip_layer: Option<String>,
}

impl SegmentRules {
    pub fn new(topology: Topology, skip_layer: Option<String>) -> Self {
        Self {
            markers: topology.markers(),
            skip_layer: skip_layer.filter(|s| !s.is_empty()),
        }
    }

    fn is_skipped(&self, name: &str) -> bool {
        self.skip_layer
            .as_deref()
            .is_some_and(|skip| name.contains(skip))
    }
}

/// Counters reported after a parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    /// Terminated, non-empty segments.
    pub segments: usize,
    pub layer_switches: usize,
    /// Volumes recognised as crystals.
    pub crystal_volumes: usize,
    /// Placements emitted after splitting.
    pub placements: usize,
    pub skipped: usize,
    pub ignored: usize,
    pub unnamed: usize,
}

/// Directives collected since the last terminator.
#[derive(Debug, Default)]
struct Segment {
    name: Option<ObjectName>,
    origin: Option<Vec<f32>>,
    base_vector: Option<Vec<f32>>,
    box_size: Option<Vec<f32>>,
    start_line: usize,
    directives: usize,
}

impl Segment {
    fn is_empty(&self) -> bool {
        self.directives == 0
    }

    fn vec3(&self, field: &Option<Vec<f32>>, what: &str, name: &str) -> Result<Vec3, ParseError> {
        match field.as_deref() {
            Some([x, y, z, ..]) => Ok([*x, *y, *z]),
            Some(values) => Err(ParseError::FormatError {
                line: self.start_line,
                message: format!(
                    "{} of '{}' needs at least 3 components, got {}",
                    what,
                    name,
                    values.len()
                ),
            }),
            None => Err(ParseError::FormatError {
                line: self.start_line,
                message: format!("'{}' has no {}", name, what),
            }),
        }
    }
}

/// Drives a [`Scanner`] from a stream of PRIM lines.
///
/// The active layer lives here, not in the scanner.
#[derive(Debug)]
pub struct SegmentParser<'r> {
    rules: &'r SegmentRules,
    current_layer: Option<LayerId>,
    summary: ParseSummary,
}

impl<'r> SegmentParser<'r> {
    pub fn new(rules: &'r SegmentRules) -> Self {
        Self {
            rules,
            current_layer: None,
            summary: ParseSummary::default(),
        }
    }

    pub fn current_layer(&self) -> Option<LayerId> {
        self.current_layer
    }

    /// Consume every line of `content`.
    pub fn parse(mut self, content: &str, scanner: &mut Scanner) -> Result<ParseSummary, ParseError> {
        let mut segment = Segment::default();

        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let directive = read_directive(line, line_no)?;
            if directive == Directive::Terminator {
                let finished = std::mem::take(&mut segment);
                if !finished.is_empty() {
                    self.resolve(finished, scanner)?;
                }
                continue;
            }
            if directive == Directive::Ignored {
                continue;
            }

            if segment.is_empty() {
                segment.start_line = line_no;
            }
            segment.directives += 1;
            match directive {
                Directive::Name(name) => {
                    if let Some(n) = &name {
                        if n.name.starts_with(MODULE_PREFIX) {
                            log::info!("Parsing module {}...", n.id);
                        }
                    }
                    segment.name = name;
                }
                Directive::Origin(v) => segment.origin = Some(v),
                Directive::BaseVector(v) => segment.base_vector = Some(v),
                Directive::Box(v) => segment.box_size = Some(v),
                Directive::Terminator | Directive::Ignored => {}
            }
        }

        if !segment.is_empty() {
            log::warn!(
                "Input ended without a terminator; discarding segment started at line {}",
                segment.start_line
            );
        }

        log::info!(
            "Parsed {} segments: {} crystal volumes -> {} placements in {} layers ({} skipped, {} ignored, {} unnamed)",
            self.summary.segments,
            self.summary.crystal_volumes,
            self.summary.placements,
            scanner.num_layers(),
            self.summary.skipped,
            self.summary.ignored,
            self.summary.unnamed
        );
        Ok(self.summary)
    }

    fn resolve(&mut self, segment: Segment, scanner: &mut Scanner) -> Result<(), ParseError> {
        self.summary.segments += 1;

        let name = match &segment.name {
            Some(n) => n.name.as_str(),
            None => {
                log::warn!("Dropping unnamed segment at line {}", segment.start_line);
                self.summary.unnamed += 1;
                return Ok(());
            }
        };

        if self.rules.is_skipped(name) {
            log::debug!("Skipping '{}' at line {}", name, segment.start_line);
            self.summary.skipped += 1;
            return Ok(());
        }

        let is_layer = name.starts_with(self.rules.markers.layer);
        let is_crystal = name.starts_with(self.rules.markers.crystal);

        if is_layer {
            self.current_layer = Some(scanner.change_layer(name));
            self.summary.layer_switches += 1;
        }

        if is_crystal {
            let layer = self.current_layer.ok_or_else(|| ParseError::FormatError {
                line: segment.start_line,
                message: format!("Crystal '{}' placed before any layer", name),
            })?;
            let origin = segment.vec3(&segment.origin, "origin", name)?;
            // The base vector holds the rotated x and y axes; only x is kept.
            let orientation = segment.vec3(&segment.base_vector, "base vector", name)?;
            let box_size = segment.vec3(&segment.box_size, "box", name)?;

            let placements =
                split_crystal(origin, orientation, box_size, scanner.config().crystal_depth())
                    .map_err(|e| match e {
                        LutError::Format(message) => ParseError::FormatError {
                            line: segment.start_line,
                            message: format!("'{}': {}", name, message),
                        },
                        other => ParseError::Scanner(other),
                    })?;
            log::debug!(
                "Adding crystal {}({}) as {} placement(s) to '{}'",
                segment.name.as_ref().map_or("", |n| n.id.as_str()),
                name,
                placements.len(),
                scanner.layer(layer).name()
            );
            self.summary.crystal_volumes += 1;
            self.summary.placements += placements.len();
            for placement in placements {
                scanner.add_crystal(layer, placement);
            }
        }

        if !is_layer && !is_crystal {
            self.summary.ignored += 1;
        }
        Ok(())
    }
}

/// Parse PRIM `content` into `scanner`.
pub fn parse_prim(
    content: &str,
    scanner: &mut Scanner,
    rules: &SegmentRules,
) -> Result<ParseSummary, ParseError> {
    SegmentParser::new(rules).parse(content, scanner)
}
