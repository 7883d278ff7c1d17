use criterion::{black_box, criterion_group, criterion_main, Criterion};

use voxelforge::codec;
use voxelforge::core::config::EditorConfig;
use voxelforge::mesh::{AtlasMap, ChunkMesher};
use voxelforge::voxel::{Chunk, ChunkCoord, ChunkStore, SparseVoxelOctree, Voxel};

use glam::{IVec3, UVec3};

fn sphere_chunk() -> Chunk {
    let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0), UVec3::splat(16));
    let center = IVec3::splat(8);
    for x in 0..16 {
        for y in 0..16 {
            for z in 0..16 {
                let pos = IVec3::new(x, y, z);
                let d = pos - center;
                if d.dot(d) <= 36 {
                    chunk.set(pos, Voxel::new((1 + (x + y + z) % 4) as u8));
                }
            }
        }
    }
    chunk
}

fn sphere_store(size: u32, radius: i32) -> ChunkStore {
    let mut store = ChunkStore::new(UVec3::splat(size));
    let center = IVec3::splat(size as i32 / 2);
    for x in 0..size as i32 {
        for y in 0..size as i32 {
            for z in 0..size as i32 {
                let pos = IVec3::new(x, y, z);
                let d = pos - center;
                if d.dot(d) <= radius * radius {
                    store.set(pos, Voxel::new(2));
                }
            }
        }
    }
    store
}

fn bench_chunk_mesh_full(c: &mut Criterion) {
    let chunk = sphere_chunk();
    let atlas = AtlasMap::from_config(1, &EditorConfig::default());

    c.bench_function("chunk_mesh_full", |b| {
        b.iter(|| {
            let mut mesher = ChunkMesher::new(0.25);
            mesher.update(black_box(&chunk), black_box(&atlas));
            mesher.buffers().quad_count()
        });
    });
}

fn bench_chunk_mesh_selection_only(c: &mut Criterion) {
    let mut chunk = sphere_chunk();
    let atlas = AtlasMap::from_config(1, &EditorConfig::default());
    let mut mesher = ChunkMesher::new(0.25);
    mesher.update(&chunk, &atlas);

    c.bench_function("chunk_mesh_selection_only", |b| {
        let mut on = false;
        b.iter(|| {
            on = !on;
            chunk.set_selected(IVec3::splat(8), on);
            mesher.update(black_box(&chunk), &atlas)
        });
    });
}

fn bench_octree_from_store_64(c: &mut Criterion) {
    let store = sphere_store(64, 28);

    c.bench_function("octree_from_store_64", |b| {
        b.iter(|| SparseVoxelOctree::from_store(black_box(&store)));
    });
}

fn bench_codec_chunk_round_trip(c: &mut Criterion) {
    let chunk = sphere_chunk();
    let bytes = chunk.voxels().as_bytes().to_vec();

    c.bench_function("codec_chunk_round_trip", |b| {
        b.iter(|| {
            let packed = codec::compress(black_box(&bytes));
            codec::decompress(&packed).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_chunk_mesh_full,
    bench_chunk_mesh_selection_only,
    bench_octree_from_store_64,
    bench_codec_chunk_round_trip
);
criterion_main!(benches);
