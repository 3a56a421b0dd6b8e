//! Benchmark for chunk culling, panel merging and full regeneration.
//!
//! TARGET: a 32³ chunk regenerates in well under a frame (< 10ms)
//!
//! Run with: cargo bench --package panelforge_meshing --bench meshing_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use panelforge_core::{ChunkCoord, ChunkId, ChunkSpace, LocalPos, PanelSizeCatalog, Voxel};
use panelforge_meshing::{DefaultAppearance, FaceCuller, GreedyMesher, PanelLibrary, PanelPipeline};

const N: i32 = 32;

/// Stepped terrain: column height varies with position.
fn terrain() -> (ChunkSpace, ChunkId) {
    let mut space = ChunkSpace::new(N as usize).unwrap();
    let id = space.create_chunk(ChunkCoord::new(0, 0, 0));
    for z in 0..N {
        for x in 0..N {
            let height = 1 + ((x / 4) * 3 + (z / 5) * 2) % (N - 1);
            for y in 0..height {
                space.set_voxel(id, LocalPos::new(x, y, z), Voxel::wall());
            }
        }
    }
    (space, id)
}

/// Every other voxel solid: worst case for merging.
fn checkerboard() -> (ChunkSpace, ChunkId) {
    let mut space = ChunkSpace::new(N as usize).unwrap();
    let id = space.create_chunk(ChunkCoord::new(0, 0, 0));
    for z in 0..N {
        for y in 0..N {
            for x in 0..N {
                if (x + y + z) % 2 == 0 {
                    space.set_voxel(id, LocalPos::new(x, y, z), Voxel::wall());
                }
            }
        }
    }
    (space, id)
}

fn benchmark_cull(c: &mut Criterion) {
    let appearance = DefaultAppearance::default();
    let mut group = c.benchmark_group("face_cull");
    group.throughput(Throughput::Elements((N * N * N) as u64));

    for (name, (space, id)) in [("terrain", terrain()), ("checkerboard", checkerboard())] {
        let mut culler = FaceCuller::new();
        group.bench_function(name, |b| {
            b.iter(|| black_box(culler.cull(space.view(id).unwrap(), &appearance)));
        });
    }
    group.finish();
}

fn benchmark_greedy(c: &mut Criterion) {
    let (space, id) = terrain();
    let culled = FaceCuller::new().cull(space.view(id).unwrap(), &DefaultAppearance::default());
    let mut mesher = GreedyMesher::new(PanelSizeCatalog::standard());

    c.bench_function("greedy_merge_terrain", |b| {
        b.iter(|| black_box(mesher.mesh(black_box(&culled)).len()));
    });
}

fn benchmark_regenerate(c: &mut Criterion) {
    let (space, id) = terrain();
    let catalog = PanelSizeCatalog::standard();
    let library = PanelLibrary::for_catalog(&catalog);
    let appearance = DefaultAppearance::default();
    let mut pipeline = PanelPipeline::new(catalog);

    c.bench_function("regenerate_chunk_terrain", |b| {
        b.iter(|| {
            black_box(
                pipeline
                    .regenerate_chunk(&space, id, &appearance, &library)
                    .unwrap(),
            )
        });
    });
}

criterion_group!(benches, benchmark_cull, benchmark_greedy, benchmark_regenerate);
criterion_main!(benches);
