use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use wisp_animation::{AnimationConfig, Animator, EventRules, HostEvent};
use wisp_core::{ScreenInfo, WindowId, WindowInfo};

fn minimizing(effect: &str, windows: u64) -> Animator {
    let mut config = AnimationConfig::empty();
    config.minimize = EventRules::single(effect, 100_000);
    let mut animator = Animator::new(config, ScreenInfo::new(1920, 1080));
    for i in 0..windows {
        let x = (i as i32 % 8) * 200;
        let y = (i as i32 / 8) * 150;
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

fn bench_prepare_paint(c: &mut Criterion) {
    for effect in ["Magic Lamp", "Zoom", "Wave"] {
        c.bench_function(&format!("prepare_paint/{effect}/32"), |b| {
            b.iter_batched_ref(
                || minimizing(effect, 32),
                |animator| black_box(animator.prepare_paint(16.0)),
                BatchSize::SmallInput,
            )
        });
    }
}

fn bench_paint_window(c: &mut Criterion) {
    let mut animator = minimizing("Magic Lamp", 32);
    animator.prepare_paint(16.0);
    c.bench_function("paint_window/magic_lamp/32", |b| {
        b.iter(|| {
            for step in animator.paint_order() {
                black_box(animator.paint_window(step));
            }
        })
    });
}

criterion_group!(benches, bench_prepare_paint, bench_paint_window);
criterion_main!(benches);
