//! End-to-end: PRIM text on disk → scanner → LUT and header files.

use std::path::Path;

use primlut_core::lut::{save_scanner, LoadedLut};
use primlut_core::{ScanHeader, Scanner, ScannerConfig, Topology};
use primlut_geometry::{parse_prim_file, ParseError, SegmentRules};

fn prim(box_depth: f32) -> String {
    format!(
        "\
#/PVName world.0
/Origin 0 0 0
/BaseVector 1 0 0 0 1 0
/Box 2 2 2
#--------------------
#/PVName crystal_1.0
/Origin 10 0 5
/BaseVector 0 1 0 0 0 1
/Box 2 2 {}
#--------------------
",
        box_depth
    )
}

fn read_floats(path: &Path) -> Vec<f32> {
    std::fs::read(path)
        .unwrap()
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

fn convert(input: &str, topology: Topology, skip: Option<&str>) -> (tempfile::TempDir, Scanner) {
    let dir = tempfile::tempdir().unwrap();
    let prim_path = dir.path().join("geometry.prim");
    std::fs::write(&prim_path, input).unwrap();

    let mut scanner = Scanner::new(ScannerConfig::new("e2e", "end to end", [2.0, 2.0, 2.0])).unwrap();
    let rules = SegmentRules::new(topology, skip.map(str::to_string));
    parse_prim_file(&prim_path, &mut scanner, &rules).unwrap();
    save_scanner(&scanner, &dir.path().join("out")).unwrap();
    (dir, scanner)
}

#[test]
fn test_single_crystal() {
    let (dir, _) = convert(&prim(2.0), Topology::Scanner, None);
    let out = dir.path().join("out");

    assert_eq!(read_floats(&out.join("e2e.lut")), vec![10.0, 0.0, 5.0, 0.0, 1.0, 0.0]);

    let header = std::fs::read_to_string(out.join("e2e.hscan")).unwrap();
    assert!(header.contains("number of elements: 1\n"));
    assert!(header.contains("number of layers: 1\n"));
    assert!(header.contains("number of crystals in layer: 1\n"));
}

#[test]
fn test_deep_crystal_is_split() {
    let (dir, scanner) = convert(&prim(6.0), Topology::Scanner, None);
    let floats = read_floats(&dir.path().join("out/e2e.lut"));

    assert_eq!(floats.len(), 6 * 6);
    let z: Vec<f32> = floats.chunks_exact(6).map(|c| c[2]).collect();
    assert_eq!(z, vec![-3.0, -1.0, 1.0, 3.0, 5.0, 7.0]);
    for crystal in floats.chunks_exact(6) {
        assert_eq!(&crystal[3..], &[0.0_f32, 1.0, 0.0]);
    }
    assert_eq!(scanner.crystal_counts(), vec![6]);
}

#[test]
fn test_elements_match_float_count() {
    let mut input = String::new();
    for (i, layer) in ["layer0", "layer1"].iter().enumerate() {
        for j in 0..5 {
            input += &format!(
                "#/PVName {}.{}\n/Origin {} {} 0\n/BaseVector 1 0 0 0 1 0\n/Box 2 2 {}\n#--------------------\n",
                layer,
                j,
                40 + i,
                j,
                if j == 4 { 4.0 } else { 1.0 }
            );
        }
    }
    let (dir, _) = convert(&input, Topology::CylindricalPet, None);
    let out = dir.path().join("out");
    let floats = read_floats(&out.join("e2e.lut"));
    let header = ScanHeader::parse(&std::fs::read_to_string(out.join("e2e.hscan")).unwrap()).unwrap();

    // Box depth 4 with crystal depth 2 yields 4 crystals.
    assert_eq!(header.crystals_in_layer, vec![8, 8]);
    assert_eq!(header.number_of_elements, floats.len() / 6);

    let loaded = LoadedLut::load(&out.join("e2e.lut"), &out.join("e2e.hscan")).unwrap();
    assert!(loaded.layers[0].iter().all(|p| p.position[0] == 40.0));
    assert!(loaded.layers[1].iter().all(|p| p.position[0] == 41.0));
}

#[test]
fn test_skip_layer_contributes_nothing() {
    let input = "\
#/PVName layer0.0
/Origin 1 0 0
/BaseVector 1 0 0 0 1 0
/Box 1 1 1
#--------------------
#/PVName layerWLS.0
/Origin 2 0 0
/BaseVector 1 0 0 0 1 0
/Box 1 1 1
#--------------------
";
    let (dir, scanner) = convert(input, Topology::CylindricalPet, Some("WLS"));
    assert_eq!(scanner.layer_names().collect::<Vec<_>>(), ["layer0"]);
    assert_eq!(read_floats(&dir.path().join("out/e2e.lut")).len(), 6);
}

#[test]
fn test_missing_input_reports_path() {
    let mut scanner = Scanner::new(ScannerConfig::new("e2e", "", [1.0; 3])).unwrap();
    let rules = SegmentRules::new(Topology::Scanner, None);
    let err = parse_prim_file(Path::new("/nonexistent/geometry.prim"), &mut scanner, &rules).unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/geometry.prim"));
}
