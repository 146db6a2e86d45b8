use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::IVec3;
use tetris3d::core::pipeline::Viewport;
use tetris3d::core::{ArchetypeRegistry, DrawCommand, GameState, Mesh, RenderPipeline, VoxelGrid};
use tetris3d::term::{Canvas, Rgb};
use tetris3d::types::GameKey;

fn bench_tick(c: &mut Criterion) {
    let mut state = GameState::new(IVec3::new(4, 10, 4), 12345);

    c.bench_function("game_update_16ms", |b| {
        b.iter(|| {
            if !state.update(black_box(0.016), &[GameKey::Down]) {
                state.reset();
            }
        })
    });
}

fn bench_layer_clear(c: &mut Criterion) {
    c.bench_function("clear_4_layers", |b| {
        b.iter(|| {
            let mut grid = VoxelGrid::new(IVec3::new(4, 10, 4));
            for y in 0..4 {
                for z in 0..4 {
                    for x in 0..4 {
                        grid.set(x, y, z, 1);
                    }
                }
            }
            black_box(grid.clear_full_layers());
        })
    });
}

fn bench_surface_rebuild(c: &mut Criterion) {
    let mut grid = VoxelGrid::new(IVec3::new(6, 14, 6));
    for y in 0..7 {
        for z in 0..6 {
            for x in 0..6 {
                if (x + y + z) % 3 != 0 {
                    grid.set(x, y, z, 1);
                }
            }
        }
    }

    c.bench_function("rebuild_surface_6x14x6", |b| {
        b.iter(|| {
            grid.rebuild_surface();
            black_box(grid.surface().geometries().len());
        })
    });
}

fn bench_merge(c: &mut Criterion) {
    let registry = ArchetypeRegistry::new();
    let a = registry.get(0).mesh().clone();
    let b_mesh = registry.get(4).mesh().clone();

    c.bench_function("mesh_merge", |b| {
        b.iter(|| black_box(Mesh::merge(black_box(&a), black_box(&b_mesh))))
    });
}

fn bench_render(c: &mut Criterion) {
    let game = GameState::new(IVec3::new(4, 10, 4), 7);
    let mut pipeline = RenderPipeline::default();
    let viewport = Viewport::new(0.0, 0.0, 160.0, 96.0);

    c.bench_function("render_scene_commands", |b| {
        let mut out: Vec<DrawCommand> = Vec::with_capacity(256);
        b.iter(|| {
            out.clear();
            pipeline.render_scene(&game, viewport, &mut out);
            black_box(out.len());
        })
    });

    c.bench_function("render_scene_canvas", |b| {
        let mut canvas = Canvas::new(160, 96, Rgb::new(0, 0, 0));
        b.iter(|| {
            canvas.clear();
            pipeline.render_scene(&game, viewport, &mut canvas);
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_layer_clear,
    bench_surface_rebuild,
    bench_merge,
    bench_render
);
criterion_main!(benches);
