use std::collections::HashMap;
use std::io::Write;

use float_ord::FloatOrd;

use crate::mesh::facets::{facet_count, FACET_SIZE};
use crate::mesh::stl::HEADER_SIZE;
use crate::prelude::*;
use crate::{generate, generate_to_path, FacetWriter};

struct Facet {
    normal: Vec3,
    vertices: [Vec3; 3],
}

fn read_vec3(bytes: &[u8]) -> Vec3 {
    let f = |i: usize| f32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
    Vec3::new(f(0), f(4), f(8))
}

fn parse_stl(bytes: &[u8]) -> (u32, Vec<Facet>) {
    let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]);
    let facets = bytes[HEADER_SIZE + 4..]
        .chunks_exact(FACET_SIZE)
        .map(|f| {
            assert_eq!(&f[48..], &[0, 0]);
            Facet {
                normal: read_vec3(&f[0..12]),
                vertices: [read_vec3(&f[12..24]), read_vec3(&f[24..36]), read_vec3(&f[36..48])],
            }
        })
        .collect_vec();
    assert_eq!(HEADER_SIZE + 4 + facets.len() * FACET_SIZE, bytes.len());
    (count, facets)
}

fn terrain(width: usize, height: usize) -> HeightMap {
    HeightMap::from_perlin(width, height, 4.0, Vec2::new(0.3, 1.7), 50.0).unwrap()
}

fn solid_params() -> ShapingParameters {
    // A positive base keeps every wall facet non-degenerate.
    ShapingParameters {
        horizontal_size: Some(25.0),
        vertical_size: 750.0,
        base_height: 1.0,
        ..Default::default()
    }
}

fn generate_bytes(heightmaps: &[HeightMap], params: &ShapingParameters) -> Vec<u8> {
    let mut out = vec![];
    generate(heightmaps, params, &mut out, &FacetWriter::default()).unwrap();
    out
}

/// Every facet is wound counter-clockwise around its stored normal.
fn assert_oriented(facets: &[Facet]) {
    for facet in facets {
        let [a, b, c] = facet.vertices;
        let cross = (b - a).cross(c - a);
        assert!(cross.length() > 0.0, "degenerate facet {:?}", facet.vertices);
        assert!(
            cross.dot(facet.normal) > 0.0,
            "facet {:?} is wound against its normal {:?}",
            facet.vertices,
            facet.normal
        );
    }
}

/// Vertices emitted from the same sample are bit-identical, so they can be
/// matched exactly.
type VertexKey = [FloatOrd<f32>; 3];

fn vertex_key(v: Vec3) -> VertexKey {
    [FloatOrd(v.x), FloatOrd(v.y), FloatOrd(v.z)]
}

/// Every directed edge is matched by exactly one edge running the other way.
fn assert_watertight(facets: &[Facet]) {
    let mut edges: HashMap<(VertexKey, VertexKey), usize> = HashMap::new();
    for facet in facets {
        let [a, b, c] = facet.vertices;
        for (from, to) in [(a, b), (b, c), (c, a)] {
            *edges.entry((vertex_key(from), vertex_key(to))).or_default() += 1;
        }
    }
    let show = |k: VertexKey| k.map(|c| c.0);
    for (&(from, to), &count) in &edges {
        assert_eq!(count, 1, "edge {:?} -> {:?} is used {count} times", show(from), show(to));
        assert_eq!(
            edges.get(&(to, from)),
            Some(&1),
            "edge {:?} -> {:?} has no twin",
            show(from),
            show(to)
        );
    }
}

#[test]
pub fn facet_count_formula() {
    for (w, h) in [(2, 2), (2, 3), (3, 2), (3, 3), (10, 4), (5, 17)] {
        let bytes = generate_bytes(&[terrain(w, h)], &solid_params());
        let (count, facets) = parse_stl(&bytes);
        let expected = 4 * (w - 1) * (h - 1) + 4 * (w - 1) + 4 * (h - 1);
        assert_eq!(count as usize, expected);
        assert_eq!(facets.len(), expected);
    }
}

#[test]
pub fn three_by_three_example() {
    let hm = HeightMap::from_rows(&[
        vec![1.0, 2.0, 3.0],
        vec![4.0, 5.0, 6.0],
        vec![7.0, 8.0, 9.0],
    ])
    .unwrap();
    let params = ShapingParameters {
        horizontal_size: Some(2.0),
        vertical_size: 750.0,
        base_height: 0.0,
        ..Default::default()
    };
    let (count, facets) = parse_stl(&generate_bytes(&[hm], &params));
    assert_eq!(count, 32);

    // Top surface vertices sit on integer coordinates with z = value - 1.
    for facet in facets.iter().filter(|f| f.normal == Vec3::Z) {
        for v in facet.vertices {
            let (x, y) = (v.x as usize, v.y as usize);
            assert_eq!(v.x, x as f32);
            assert_eq!(v.y, y as f32);
            assert_eq!(v.z, (y * 3 + x) as f32);
        }
    }
    assert_eq!(facets.iter().filter(|f| f.normal == Vec3::Z).count(), 8);
    assert_eq!(facets.iter().filter(|f| f.normal == Vec3::NEG_Z).count(), 8);
}

#[test]
pub fn mesh_is_oriented_and_watertight() {
    for (w, h) in [(2, 2), (2, 6), (6, 2), (9, 7)] {
        let (_, facets) = parse_stl(&generate_bytes(&[terrain(w, h)], &solid_params()));
        assert_oriented(&facets);
        assert_watertight(&facets);
    }
}

#[test]
pub fn multi_panel_block_is_watertight() {
    let params = ShapingParameters {
        horizontal_size: Some(10.0),
        panel_separation_height: 2.0,
        tab_width: 3.0,
        anchor_depth: 4.0,
        ..solid_params()
    };
    let tiles = [terrain(11, 6), terrain(11, 9)];
    let (count, facets) = parse_stl(&generate_bytes(&tiles, &params));

    // scale = 10 / 5 cells = 2: separators are 1 row, anchors 2 rows.
    let rows = 6 + 1 + 9 + 2 * (2 + 1);
    assert_eq!(count as u64, facet_count(11, rows));
    assert_oriented(&facets);
    assert_watertight(&facets);
}

#[test]
pub fn output_is_deterministic() {
    let tiles = [terrain(13, 8), terrain(13, 5)];
    let params = solid_params();
    let mut reference = vec![];
    generate(&tiles, &params, &mut reference, &FacetWriter::sequential()).unwrap();
    for facet_writer in [
        FacetWriter::default(),
        FacetWriter::with_threads(1),
        FacetWriter::with_threads(3),
    ] {
        let mut out = vec![];
        generate(&tiles, &params, &mut out, &facet_writer).unwrap();
        assert_eq!(out, reference);
    }
}

#[test]
pub fn long_name_fails_before_writing() {
    #[derive(Default)]
    struct RecordingSink {
        writes: usize,
    }
    impl Write for RecordingSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.writes += 1;
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let params = ShapingParameters {
        object_name: "m".repeat(81),
        ..solid_params()
    };
    let mut sink = RecordingSink::default();
    let err = generate(&[terrain(4, 4)], &params, &mut sink, &FacetWriter::default()).unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(sink.writes, 0);
}

#[test]
pub fn writes_complete_files_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("terrain.stl");

    let count = generate_to_path(
        &[terrain(5, 5)],
        &solid_params(),
        &path,
        &FacetWriter::default(),
    )
    .unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), HEADER_SIZE + 4 + count as usize * FACET_SIZE);
    assert_eq!(&bytes[..12], b"DEM 3D Model");

    let failed = dir.path().join("failed.stl");
    let mismatched = [terrain(5, 5), terrain(6, 5)];
    assert!(generate_to_path(&mismatched, &solid_params(), &failed, &FacetWriter::default()).is_err());
    assert!(!failed.exists());
    // Only the successful mesh is left in the directory.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
pub fn failed_persist_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    // A directory in the way: the mesh is fully written, but the final
    // rename onto the destination fails.
    let blocked = dir.path().join("blocked.stl");
    std::fs::create_dir(&blocked).unwrap();

    let err = generate_to_path(
        &[terrain(6, 6)],
        &solid_params(),
        &blocked,
        &FacetWriter::default(),
    )
    .unwrap_err();
    assert!(matches!(err, MeshError::Io(_)));
    assert!(blocked.is_dir());
    assert_eq!(std::fs::read_dir(&blocked).unwrap().count(), 0);
    // The temporary file was cleaned up as well.
    let entries = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect_vec();
    assert_eq!(entries, vec![std::ffi::OsString::from("blocked.stl")]);
}
