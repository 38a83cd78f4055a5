//! Placement benchmarks: fit checks and full brush strokes.

use std::hint::black_box;

use arena_sim::{
    ArenaConfig, ArenaWorld, CellIndex, DeployableCatalog, EditorMode, Footprint, OccupancyGrid, PointerInput,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn fit_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_placeable");

    for size in [16u32, 64, 256] {
        let grid = OccupancyGrid::new(size, size, 1.0);
        let footprint = Footprint::solid(3, 3).unwrap();
        group.throughput(Throughput::Elements(u64::from(size) * u64::from(size)));

        group.bench_with_input(BenchmarkId::new("sweep_3x3", size), &size, |b, &size| {
            b.iter(|| {
                let mut fits = 0usize;
                for row in 0..size as i32 {
                    for col in 0..size as i32 {
                        if grid.is_placeable(&footprint, CellIndex::new(col, row)) {
                            fits += 1;
                        }
                    }
                }
                black_box(fits)
            });
        });
    }

    group.finish();
}

fn brush_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("brush_stroke");

    for size in [16u32, 64] {
        group.throughput(Throughput::Elements(u64::from(size)));

        group.bench_with_input(BenchmarkId::new("row", size), &size, |b, &size| {
            b.iter(|| {
                let config = ArenaConfig {
                    columns: size,
                    rows: size,
                    ..Default::default()
                };
                let mut arena = ArenaWorld::with_config(config, DeployableCatalog::arena_defaults()).unwrap();
                let kind = arena.catalog().find_by_name("Crate").unwrap().id;
                arena.select_deployable(kind).unwrap();
                arena.select_mode(EditorMode::Create);

                let at = |arena: &ArenaWorld, col: i32| arena.grid().cell_center(CellIndex::new(col, 0));
                arena.update(PointerInput::press(at(&arena, 0))).unwrap();
                for col in 1..size as i32 {
                    arena.update(PointerInput::hold(at(&arena, col))).unwrap();
                }
                arena.update(PointerInput::release(at(&arena, 0))).unwrap();
                black_box(arena.grid().occupied_count())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, fit_benchmarks, brush_benchmarks);
criterion_main!(benches);
