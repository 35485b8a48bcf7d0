//! LOD generation demo
//!
//! Builds a procedural height-field mesh, bakes LOD levels for it and prints
//! a per-level report. Run with `RUST_LOG=debug` to see the generator's own
//! diagnostics.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;
use progmesh_core::{Bounded, IndexBuffer, IndexedMesh, Point3f};
use progmesh_lod::{
    compute_lods_batch, LodConfig, LodGenerator, ReductionMethod, ReevaluationStrategy,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Method {
    Proportional,
    Constant,
    CollapseCost,
}

impl From<Method> for ReductionMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Proportional => ReductionMethod::Proportional,
            Method::Constant => ReductionMethod::Constant,
            Method::CollapseCost => ReductionMethod::CollapseCost,
        }
    }
}

/// Bake LOD levels for a procedural mesh
#[derive(Parser)]
#[command(name = "generate_lods")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// How reduction values are interpreted
    #[arg(short, long, value_enum, default_value = "proportional")]
    method: Method,

    /// Reduction value per level
    #[arg(short, long, value_delimiter = ',', default_value = "0.25,0.5,0.75")]
    values: Vec<f32>,

    /// Grid resolution (vertices per side)
    #[arg(short, long, default_value = "64")]
    size: usize,

    /// Use the batched re-evaluation strategy
    #[arg(long)]
    batched: bool,

    /// Check topology invariants after every collapse
    #[arg(long)]
    validate: bool,

    /// Bake this many copies in parallel instead of one mesh
    #[arg(long, default_value = "1")]
    copies: usize,
}

fn height_field(size: usize) -> Result<IndexedMesh> {
    let mut positions = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let fx = x as f32 / (size - 1) as f32 * std::f32::consts::TAU;
            let fy = y as f32 / (size - 1) as f32 * std::f32::consts::TAU;
            positions.push(Point3f::new(x as f32, y as f32, fx.sin() * fy.cos() * 4.0));
        }
    }
    let mut faces = Vec::with_capacity((size - 1) * (size - 1) * 2);
    for y in 0..(size - 1) {
        for x in 0..(size - 1) {
            let tl = y * size + x;
            let bl = tl + size;
            faces.push([tl, bl, tl + 1]);
            faces.push([tl + 1, bl, bl + 1]);
        }
    }
    let indices = IndexBuffer::from_faces(&faces, positions.len())?;
    Ok(IndexedMesh::new(positions, indices))
}

fn report(levels: &[IndexBuffer]) {
    let base = levels.first().map_or(0, |l| l.triangle_count()).max(1);
    for (i, level) in levels.iter().enumerate() {
        println!(
            "  LOD {}: {:>7} triangles ({:5.1}%), {:>8} bytes as {:?}",
            i,
            level.triangle_count(),
            level.triangle_count() as f32 * 100.0 / base as f32,
            level.as_bytes().len(),
            level.width()
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let size = cli.size.max(2);
    let mesh = height_field(size)?;
    let strategy = if cli.batched {
        ReevaluationStrategy::Batched
    } else {
        ReevaluationStrategy::Exhaustive
    };
    let config = LodConfig::with_params(strategy, cli.validate);
    let method = ReductionMethod::from(cli.method);

    println!("progmesh LOD generation");
    println!("=======================");
    println!(
        "Mesh: {} vertices, {} triangles, bounding radius {:.3}",
        mesh.vertex_count(),
        mesh.triangle_count(),
        mesh.bounding_sphere().radius
    );
    let bbox = mesh.bounding_box();
    println!("Bounds: center {:?}, extents {:?}", bbox.center(), bbox.extents());
    println!("Method: {:?} {:?}, strategy: {:?}", method, cli.values, strategy);

    if cli.copies > 1 {
        let meshes = vec![mesh; cli.copies];
        info!("baking {} meshes in parallel", meshes.len());
        let all = compute_lods_batch(&meshes, method, &cli.values, &config)?;
        for (i, levels) in all.iter().enumerate() {
            println!("\nMesh {}:", i);
            report(levels);
        }
        return Ok(());
    }

    let mut generator = LodGenerator::with_config(&mesh, config)?;
    let stats = generator.stats();
    println!(
        "Topology: {} vertices, {} directed edges, {} seams, {} excluded triangles",
        stats.vertices, stats.edges, stats.seam_vertices, stats.excluded_triangles
    );

    let mut mesh = mesh;
    generator.bake_into_mesh(&mut mesh, method, &cli.values)?;
    println!("\nLevels:");
    report(mesh.lod_levels());
    println!(
        "\nCoarsest level selectable: {} triangles",
        mesh.select_lod(usize::MAX).triangle_count()
    );

    Ok(())
}
