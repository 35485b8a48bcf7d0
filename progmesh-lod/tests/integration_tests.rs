//! Integration tests for progmesh-lod
//!
//! These tests drive the generator end to end on small procedural meshes and
//! check the properties every baked level must have.

use approx::assert_relative_eq;
use progmesh_core::{IndexBuffer, IndexWidth, IndexedMesh, Point3f};
use progmesh_lod::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn mesh(positions: Vec<Point3f>, indices: &[u32]) -> IndexedMesh {
    let width = IndexWidth::for_vertex_count(positions.len());
    IndexedMesh::new(positions, IndexBuffer::from_indices(width, indices).unwrap())
}

fn unit_quad() -> IndexedMesh {
    mesh(
        vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ],
        &[0, 1, 2, 0, 2, 3],
    )
}

/// Regular grid in the xy plane with a height field applied
fn grid(size: usize, height: impl Fn(f32, f32) -> f32) -> IndexedMesh {
    let mut positions = Vec::new();
    for y in 0..size {
        for x in 0..size {
            let (fx, fy) = (x as f32, y as f32);
            positions.push(Point3f::new(fx, fy, height(fx, fy)));
        }
    }
    let mut indices = Vec::new();
    for y in 0..(size - 1) {
        for x in 0..(size - 1) {
            let tl = (y * size + x) as u32;
            let tr = tl + 1;
            let bl = ((y + 1) * size + x) as u32;
            let br = bl + 1;
            indices.extend([tl, bl, tr, tr, bl, br]);
        }
    }
    mesh(positions, &indices)
}

fn wavy(size: usize) -> IndexedMesh {
    grid(size, |x, y| (x * 0.6).sin() * (y * 0.4).cos())
}

/// Copy of a flat 3x3 grid whose center is split into two coincident
/// positions; cells in the right column use the copy at index 9
fn split_center(plain: &IndexedMesh) -> IndexedMesh {
    let mut positions = plain.positions.clone();
    positions.push(positions[4]);
    let split: Vec<u32> = plain
        .indices
        .triangles()
        .enumerate()
        .flat_map(|(t, tri)| {
            let right = (t / 2) % 2 == 1;
            tri.map(|i| if right && i == 4 { 9 } else { i })
        })
        .collect();
    mesh(positions, &split)
}

fn assert_sound(level: &IndexBuffer, vertex_count: usize) {
    if level.iter().collect::<Vec<_>>() == [0, 0, 0] {
        return;
    }
    for [a, b, c] in level.triangles() {
        assert!(a != b && b != c && a != c, "repeated index in {:?}", [a, b, c]);
        assert!((a.max(b).max(c) as usize) < vertex_count);
    }
}

#[test]
fn test_monotonic_reduction() {
    init_logging();
    let mesh = wavy(10);
    let mut generator = LodGenerator::new(&mesh).unwrap();
    let levels = generator
        .compute_levels(ReductionMethod::Proportional, &[0.25, 0.5, 0.75])
        .unwrap();

    assert_eq!(levels.len(), 4);
    let counts: Vec<usize> = levels.iter().map(|l| l.triangle_count()).collect();
    for pair in counts.windows(2) {
        assert!(pair[1] < pair[0], "triangle counts {:?} not decreasing", counts);
    }
    assert!(counts[1] <= 121);
}

#[test]
fn test_constant_reduction() {
    init_logging();
    let mesh = wavy(8);
    let mut generator = LodGenerator::new(&mesh).unwrap();
    let levels = generator
        .compute_levels(ReductionMethod::Constant, &[10.0, 40.0])
        .unwrap();
    let base = generator.initial_triangle_count();
    assert!(levels[1].triangle_count() <= base - 10);
    assert!(levels[2].triangle_count() < levels[1].triangle_count());
}

#[test]
fn test_levels_are_sound() {
    init_logging();
    let mesh = wavy(9);
    let mut generator = LodGenerator::new(&mesh).unwrap();
    let levels = generator
        .compute_levels(ReductionMethod::Proportional, &[0.2, 0.4, 0.6, 0.8, 1.0])
        .unwrap();
    for level in &levels {
        assert_eq!(level.width(), IndexWidth::U16);
        assert_sound(level, mesh.vertex_count());
    }
    assert!(generator.validate().is_ok());
}

#[test]
fn test_ingestion_is_idempotent() {
    let mesh = wavy(6);
    let first = LodGenerator::new(&mesh).unwrap().stats();
    let second = LodGenerator::new(&mesh).unwrap().stats();
    assert_eq!(first, second);
    assert_eq!(first.vertices, 36);
    assert_eq!(first.live_triangles, 50);
}

#[test]
fn test_seamed_ingestion_is_idempotent() {
    let seamed = split_center(&grid(3, |_, _| 0.0));
    let first = LodGenerator::new(&seamed).unwrap().stats();
    let second = LodGenerator::new(&seamed).unwrap().stats();
    assert_eq!(first, second);
    assert_eq!(first.seam_vertices, 1);
    assert_eq!(first.vertices, 9);
    assert_eq!(first.live_triangles, 8);
}

#[test]
fn test_single_triangle_never_collapses() {
    let triangle = mesh(
        vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ],
        &[0, 1, 2],
    );
    let mut generator = LodGenerator::new(&triangle).unwrap();
    assert_eq!(generator.edge_collapse_cost(0, 1), Some(NEVER_COLLAPSE_COST));
    assert_eq!(generator.vertex_collapse_cost(2), Some(NEVER_COLLAPSE_COST));

    let levels = generator.compute_levels(ReductionMethod::Proportional, &[1.0]).unwrap();
    assert_eq!(levels.len(), 1);
    assert_eq!(generator.live_triangle_count(), 1);
}

#[test]
fn test_quad_keeps_one_triangle() {
    let runs: [(ReductionMethod, f32); 3] = [
        (ReductionMethod::Proportional, 1.0),
        (ReductionMethod::Constant, 100.0),
        (ReductionMethod::CollapseCost, f32::MAX),
    ];
    for (method, value) in runs {
        let mut generator = LodGenerator::new(&unit_quad()).unwrap();
        let levels = generator.compute_levels(method, &[value]).unwrap();
        assert_eq!(generator.live_triangle_count(), 1, "{:?}", method);
        assert_eq!(levels.last().unwrap().triangle_count(), 1);
    }
}

#[test]
fn test_border_strip() {
    let strip = mesh(
        vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(2.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(2.0, 1.0, 0.0),
        ],
        &[0, 1, 4, 0, 4, 3, 1, 2, 5, 1, 5, 4],
    );
    let generator = LodGenerator::new(&strip).unwrap();
    for index in 0..6 {
        assert_eq!(generator.is_border_vertex(index), Some(true));
    }
    // 1 -> 4 crosses the strip
    assert_relative_eq!(generator.edge_collapse_cost(1, 4).unwrap(), 1.0);
}

#[test]
fn test_unit_quad_constant_one() {
    let quad = unit_quad();
    let mut generator = LodGenerator::new(&quad).unwrap();
    let levels = generator.compute_levels(ReductionMethod::Constant, &[1.0]).unwrap();
    assert_eq!(levels.len(), 2);
    let level: Vec<u32> = levels[1].iter().collect();
    assert_eq!(level.len(), 3);
    let mut distinct = level.clone();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(distinct.len(), 3);
    assert!(level.iter().all(|&i| i < 4));
}

#[test]
fn test_degenerate_triangle_excluded() {
    init_logging();
    let degenerate = mesh(
        vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ],
        &[0, 1, 2, 1, 1, 3, 0, 2, 3],
    );
    let mut generator = LodGenerator::new(&degenerate).unwrap();
    assert_eq!(generator.initial_triangle_count(), 2);
    assert_eq!(generator.stats().excluded_triangles, 1);

    let levels = generator.compute_levels(ReductionMethod::Constant, &[1.0]).unwrap();
    assert_eq!(levels[0].triangle_count(), 3);
    for level in &levels[1..] {
        assert_sound(level, 4);
    }
}

#[test]
fn test_seam_vertex_costs_more() {
    let plain = grid(3, |_, _| 0.0);
    let seam = split_center(&plain);

    let plain = LodGenerator::new(&plain).unwrap();
    let seam = LodGenerator::new(&seam).unwrap();
    assert_eq!(seam.is_seam_vertex(9), Some(true));
    assert_eq!(plain.stats().edges, seam.stats().edges);
    assert!(seam.vertex_collapse_cost(4).unwrap() > plain.vertex_collapse_cost(4).unwrap());
}

#[test]
fn test_zero_cost_limit_keeps_original() {
    let mesh = wavy(6);
    let mut generator = LodGenerator::new(&mesh).unwrap();
    let levels = generator.compute_levels(ReductionMethod::CollapseCost, &[0.0]).unwrap();
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0], mesh.indices);
}

#[test]
fn test_cost_limit_reduces_flat_regions() {
    let flat = grid(6, |_, _| 0.0);
    let mut generator = LodGenerator::new(&flat).unwrap();
    let levels = generator.compute_levels(ReductionMethod::CollapseCost, &[0.01]).unwrap();
    assert_eq!(levels.len(), 2);
    assert!(levels[1].triangle_count() < flat.triangle_count());
}

#[test]
fn test_strategies_with_validation() {
    init_logging();
    let mesh = wavy(8);
    for strategy in [ReevaluationStrategy::Exhaustive, ReevaluationStrategy::Batched] {
        let config = LodConfig::with_params(strategy, true);
        let mut generator = LodGenerator::with_config(&mesh, config).unwrap();
        let levels = generator
            .compute_levels(ReductionMethod::Proportional, &[0.3, 0.6])
            .unwrap();
        assert_eq!(levels.len(), 3, "{:?}", strategy);
        for level in &levels {
            assert_sound(level, mesh.vertex_count());
        }
    }
}

#[test]
fn test_wide_indices_kept() {
    let quad = unit_quad();
    let wide = IndexBuffer::from_indices(IndexWidth::U32, &[0, 1, 2, 0, 2, 3]).unwrap();
    let mut generator =
        LodGenerator::from_buffers(&quad.positions, wide, LodConfig::default()).unwrap();
    let levels = generator.compute_levels(ReductionMethod::Constant, &[1.0]).unwrap();
    assert!(levels.iter().all(|l| l.width() == IndexWidth::U32));
}

#[test]
fn test_bake_into_mesh() {
    let mut mesh = wavy(7);
    let mut generator = LodGenerator::new(&mesh).unwrap();
    generator
        .bake_into_mesh(&mut mesh, ReductionMethod::Proportional, &[0.5, 0.9])
        .unwrap();
    assert_eq!(mesh.num_lod_levels(), 3);
    assert_eq!(mesh.lod_level(0), Some(&mesh.indices));
    assert_eq!(mesh.select_lod(10), mesh.lod_level(2).unwrap());
}

#[test]
fn test_bake_lods_helper() {
    let mut mesh = wavy(5);
    bake_lods(&mut mesh, ReductionMethod::Constant, &[4.0], LodConfig::default()).unwrap();
    assert_eq!(mesh.num_lod_levels(), 2);
}

#[test]
fn test_batch_generation() {
    init_logging();
    let meshes: Vec<IndexedMesh> = (4..8).map(wavy).collect();
    let all = compute_lods_batch(
        &meshes,
        ReductionMethod::Proportional,
        &[0.5],
        &LodConfig::default(),
    )
    .unwrap();
    assert_eq!(all.len(), meshes.len());
    for (mesh, levels) in meshes.iter().zip(&all) {
        assert_eq!(levels[0], mesh.indices);
        assert!(levels.last().unwrap().triangle_count() < mesh.triangle_count());
    }
}
