//! Binary LUT serialisation.
//!
//! A LUT is a bare sequence of little-endian `f32`, six per crystal
//! (`px py pz ox oy oz`), concatenated layer by layer in creation order. It
//! carries no header, padding or element count; the companion `.hscan`
//! header gives the per-layer split.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::LutError;
use crate::header::ScanHeader;
use crate::scanner::Scanner;
use crate::types::CrystalPlacement;

/// Floats stored per crystal.
pub const FLOATS_PER_CRYSTAL: usize = 6;
/// Bytes stored per crystal.
pub const BYTES_PER_CRYSTAL: usize = FLOATS_PER_CRYSTAL * std::mem::size_of::<f32>();

pub const LUT_EXTENSION: &str = "lut";
pub const HEADER_EXTENSION: &str = "hscan";

/// Paths of the two artifacts written for a scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LutPaths {
    pub lut: PathBuf,
    pub header: PathBuf,
}

impl LutPaths {
    /// `<dir>/<name>.lut` and `<dir>/<name>.hscan`.
    pub fn in_dir(dir: &Path, name: &str) -> Self {
        Self {
            lut: dir.join(format!("{}.{}", name, LUT_EXTENSION)),
            header: dir.join(format!("{}.{}", name, HEADER_EXTENSION)),
        }
    }
}

/// Write every placement of `scanner` to `writer`. Returns the crystal count.
pub fn write_lut<W: Write>(scanner: &Scanner, writer: &mut W) -> std::io::Result<usize> {
    let mut count = 0;
    for placement in scanner.placements() {
        for value in placement.to_floats() {
            writer.write_all(&value.to_le_bytes())?;
        }
        count += 1;
    }
    Ok(count)
}

/// Write the LUT and its header into `dir`, creating the directory if needed.
pub fn save_scanner(scanner: &Scanner, dir: &Path) -> Result<LutPaths, LutError> {
    std::fs::create_dir_all(dir).map_err(|e| LutError::io(dir, e))?;
    let paths = LutPaths::in_dir(dir, &scanner.config().name);

    let file = File::create(&paths.lut).map_err(|e| LutError::io(&paths.lut, e))?;
    let mut writer = BufWriter::new(file);
    let written = write_lut(scanner, &mut writer)
        .and_then(|n| writer.flush().map(|_| n))
        .map_err(|e| LutError::io(&paths.lut, e))?;

    let header = ScanHeader::from_scanner(scanner);
    debug_assert_eq!(written, header.number_of_elements);
    if let Err(e) = std::fs::write(&paths.header, header.to_string()) {
        // A LUT without its header cannot be partitioned into layers.
        if let Err(cleanup) = std::fs::remove_file(&paths.lut) {
            log::warn!("Failed to remove {}: {}", paths.lut.display(), cleanup);
        }
        return Err(LutError::io(&paths.header, e));
    }

    log::info!(
        "Wrote {} crystals in {} layers to {}",
        written,
        header.number_of_layers,
        paths.lut.display()
    );
    Ok(paths)
}

/// Read a binary LUT stream into placements.
pub fn read_lut<R: Read>(reader: &mut R) -> Result<Vec<CrystalPlacement>, LutError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| LutError::Format(format!("failed to read LUT stream: {}", e)))?;
    decode_lut(&bytes)
}

/// Decode raw LUT bytes into placements.
pub fn decode_lut(bytes: &[u8]) -> Result<Vec<CrystalPlacement>, LutError> {
    if bytes.len() % BYTES_PER_CRYSTAL != 0 {
        return Err(LutError::Format(format!(
            "{} bytes is not a whole number of {}-byte crystal records",
            bytes.len(),
            BYTES_PER_CRYSTAL
        )));
    }
    let placements = bytes
        .chunks_exact(BYTES_PER_CRYSTAL)
        .map(|record| {
            let mut values = [0.0_f32; FLOATS_PER_CRYSTAL];
            for (value, raw) in values.iter_mut().zip(record.chunks_exact(4)) {
                *value = f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            }
            CrystalPlacement::from_floats(values)
        })
        .collect();
    Ok(placements)
}

/// A LUT read back from disk, partitioned by its header.
#[derive(Debug, Clone)]
pub struct LoadedLut {
    pub header: ScanHeader,
    /// Placements per layer, in the header's layer order.
    pub layers: Vec<Vec<CrystalPlacement>>,
}

impl LoadedLut {
    /// Load a `.lut` / `.hscan` pair and check they describe the same table.
    pub fn load(lut_path: &Path, header_path: &Path) -> Result<Self, LutError> {
        let text = std::fs::read_to_string(header_path).map_err(|e| LutError::io(header_path, e))?;
        let header = ScanHeader::parse(&text)?;
        let bytes = std::fs::read(lut_path).map_err(|e| LutError::io(lut_path, e))?;
        let placements = decode_lut(&bytes)?;
        Self::from_parts(header, placements)
    }

    /// Split a flat placement list using the header's per-layer counts.
    pub fn from_parts(header: ScanHeader, placements: Vec<CrystalPlacement>) -> Result<Self, LutError> {
        header.check_consistency()?;
        if placements.len() != header.number_of_elements {
            return Err(LutError::Format(format!(
                "header declares {} elements but the LUT holds {}",
                header.number_of_elements,
                placements.len()
            )));
        }

        let mut rest = placements.as_slice();
        let mut layers = Vec::with_capacity(header.crystals_in_layer.len());
        for &count in &header.crystals_in_layer {
            let (layer, tail) = rest.split_at(count);
            layers.push(layer.to_vec());
            rest = tail;
        }
        Ok(Self { header, layers })
    }

    pub fn total_elements(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScannerConfig;

    fn scanner() -> Scanner {
        let mut s = Scanner::new(ScannerConfig::new("unit", "", [2.0; 3])).unwrap();
        let a = s.change_layer("a");
        s.add_crystal(a, CrystalPlacement::new([1.0, 2.0, 3.0], [0.0, 0.0, 1.0]));
        let b = s.change_layer("b");
        s.add_crystal(b, CrystalPlacement::new([-1.5, 0.0, 4.0], [1.0, 0.0, 0.0]));
        s
    }

    #[test]
    fn test_write_is_little_endian_and_unpadded() {
        let mut buf = Vec::new();
        let n = write_lut(&scanner(), &mut buf).unwrap();
        assert_eq!(n, 2);
        assert_eq!(buf.len(), 2 * BYTES_PER_CRYSTAL);
        assert_eq!(&buf[0..4], &1.0_f32.to_le_bytes());
        assert_eq!(&buf[24..28], &(-1.5_f32).to_le_bytes());
    }

    #[test]
    fn test_decode_rejects_partial_record() {
        let err = decode_lut(&[0u8; 25]).unwrap_err();
        assert!(matches!(err, LutError::Format(_)));
    }

    #[test]
    fn test_read_lut_from_stream() {
        let mut buf = Vec::new();
        write_lut(&scanner(), &mut buf).unwrap();
        let placements = read_lut(&mut buf.as_slice()).unwrap();
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[1].position, [-1.5, 0.0, 4.0]);
    }

    #[test]
    fn test_from_parts_count_mismatch() {
        let s = scanner();
        let header = ScanHeader::from_scanner(&s);
        let placements: Vec<_> = s.placements().copied().take(1).collect();
        let err = LoadedLut::from_parts(header, placements).unwrap_err();
        assert!(err.to_string().contains("2 elements"), "{}", err);
    }

    #[test]
    fn test_paths_use_scanner_name() {
        let paths = LutPaths::in_dir(Path::new("/tmp/out"), "jpet");
        assert_eq!(paths.lut, Path::new("/tmp/out/jpet.lut"));
        assert_eq!(paths.header, Path::new("/tmp/out/jpet.hscan"));
    }
}
