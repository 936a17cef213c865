use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use wisp_animation::{AnimationConfig, Animator, EventRules, HostEvent};
use wisp_core::{Rect, ScreenInfo, WindowId, WindowInfo};
use wisp_fx::polygon::PolygonSet;
use wisp_fx::Addon;

fn bench_tessellate(c: &mut Criterion) {
    let window = WindowInfo::new(WindowId(1), 200, 150, 800, 600);
    c.bench_function("tessellate/rectangles/13x10", |b| {
        b.iter(|| {
            let mut set = PolygonSet::new(false);
            set.tessellate_rectangles(&window, 1920.0, 13, 10, 15.0)
                .map(|_| black_box(set.len()))
        })
    });
    c.bench_function("tessellate/hexagons/13x10", |b| {
        b.iter(|| {
            let mut set = PolygonSet::new(false);
            set.tessellate_hexagons(&window, 1920.0, 13, 10, 15.0)
                .map(|_| black_box(set.len()))
        })
    });
    c.bench_function("tessellate/glass/2x3", |b| {
        b.iter(|| {
            let mut set = PolygonSet::new(false);
            set.tessellate_glass(&window, 1920.0, 2, 3, 15.0, || 0.5)
                .map(|_| black_box(set.len()))
        })
    });
}

fn exploding(windows: u64) -> Animator {
    let mut config = AnimationConfig::empty();
    config.minimize = EventRules::single("fx:Explode", 100_000);
    let mut animator = Animator::new(config, ScreenInfo::new(1920, 1080));
    let _ = animator.add_extension(&Addon);
    for i in 0..windows {
        let x = (i as i32 % 4) * 400;
        let y = (i as i32 / 4) * 300;
        animator.handle(HostEvent::Add {
            window: WindowInfo::new(WindowId(i + 1), x, y, 400, 300),
        });
        animator.handle(HostEvent::Unmap {
            window: WindowId(i + 1),
            shaded: false,
            iconic: true,
        });
    }
    animator
}

fn bench_explode_geometry(c: &mut Criterion) {
    c.bench_function("explode/prepare_paint/8", |b| {
        b.iter_batched_ref(
            || exploding(8),
            |animator| black_box(animator.prepare_paint(16.0)),
            BatchSize::SmallInput,
        )
    });

    let mut animator = exploding(8);
    animator.prepare_paint(16.0);
    let clips = [Rect::new(0.0, 0.0, 1920.0, 1080.0)];
    c.bench_function("explode/geometry/8", |b| {
        b.iter(|| {
            for i in 1..=8 {
                black_box(animator.add_window_geometry(WindowId(i), &clips));
            }
        })
    });
}

criterion_group!(benches, bench_tessellate, bench_explode_geometry);
criterion_main!(benches);
