//! The in-memory scanner: named layers of crystal placements.
//!
//! Layers keep their creation order, which becomes the stacking order of the
//! binary LUT. The model is write-once: placements are appended while the
//! PRIM file is parsed and only read back when the LUT is written.

use std::collections::HashMap;

use crate::error::LutError;
use crate::types::{CrystalPlacement, ScannerConfig};

/// Index of a layer in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(usize);

impl LayerId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named group of crystals.
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    placements: Vec<CrystalPlacement>,
    crystal_count: usize,
}

impl Layer {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            placements: Vec::new(),
            crystal_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn placements(&self) -> &[CrystalPlacement] {
        &self.placements
    }

    pub fn crystal_count(&self) -> usize {
        self.crystal_count
    }
}

/// Scanner geometry accumulated from a PRIM file.
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScannerConfig,
    layers: Vec<Layer>,
    by_name: HashMap<String, LayerId>,
}

impl Scanner {
    /// Create an empty scanner. Fails if the configuration is invalid.
    pub fn new(config: ScannerConfig) -> Result<Self, LutError> {
        config.validate()?;
        Ok(Self {
            config,
            layers: Vec::new(),
            by_name: HashMap::new(),
        })
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Select the layer called `name`, creating it if it has not been seen.
    pub fn change_layer(&mut self, name: &str) -> LayerId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = LayerId(self.layers.len());
        self.layers.push(Layer::new(name));
        self.by_name.insert(name.to_string(), id);
        log::debug!("Created layer '{}' (#{})", name, id.0);
        id
    }

    /// Append a placement to `layer`.
    ///
    /// # Panics
    ///
    /// Panics if `layer` was not returned by this scanner's [`Scanner::change_layer`].
    pub fn add_crystal(&mut self, layer: LayerId, placement: CrystalPlacement) {
        let layer = &mut self.layers[layer.0];
        layer.placements.push(placement);
        layer.crystal_count += 1;
    }

    pub fn layer_id(&self, name: &str) -> Option<LayerId> {
        self.by_name.get(name).copied()
    }

    /// Layers in creation order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> &Layer {
        &self.layers[id.0]
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.name.as_str())
    }

    pub fn crystal_counts(&self) -> Vec<usize> {
        self.layers.iter().map(|l| l.crystal_count).collect()
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Total number of crystals over all layers.
    pub fn total_elements(&self) -> usize {
        self.layers.iter().map(|l| l.crystal_count).sum()
    }

    /// All placements, layer by layer in creation order.
    pub fn placements(&self) -> impl Iterator<Item = &CrystalPlacement> {
        self.layers.iter().flat_map(|l| l.placements.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> Scanner {
        Scanner::new(ScannerConfig::new("test", "unit test", [2.0, 2.0, 2.0])).unwrap()
    }

    fn placement(z: f32) -> CrystalPlacement {
        CrystalPlacement::new([0.0, 0.0, z], [1.0, 0.0, 0.0])
    }

    #[test]
    fn test_change_layer_creates_then_reuses() {
        let mut s = scanner();
        let a = s.change_layer("layer0");
        let b = s.change_layer("layer1");
        let a_again = s.change_layer("layer0");
        assert_eq!(a, a_again);
        assert_ne!(a, b);
        assert_eq!(s.num_layers(), 2);
        assert_eq!(s.layer_names().collect::<Vec<_>>(), ["layer0", "layer1"]);
    }

    #[test]
    fn test_counts_follow_appends() {
        let mut s = scanner();
        let a = s.change_layer("a");
        let b = s.change_layer("b");
        s.add_crystal(a, placement(0.0));
        s.add_crystal(b, placement(1.0));
        s.add_crystal(a, placement(2.0));

        assert_eq!(s.crystal_counts(), vec![2, 1]);
        assert_eq!(s.total_elements(), 3);
        for layer in s.layers() {
            assert_eq!(layer.crystal_count(), layer.placements().len());
        }
        let z: Vec<f32> = s.placements().map(|p| p.position[2]).collect();
        assert_eq!(z, vec![0.0, 2.0, 1.0]);
    }

    #[test]
    fn test_empty_scanner() {
        let s = scanner();
        assert_eq!(s.total_elements(), 0);
        assert!(s.layers().is_empty());
        assert!(s.layer_id("world").is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ScannerConfig::new("bad", "", [2.0, 2.0, 0.0]);
        assert!(matches!(Scanner::new(config), Err(LutError::Config(_))));
    }
}
