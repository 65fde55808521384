use holoweave_core::{Engine, EngineConfig, MovementMode};
use holoweave_render::{compose_frame, render_png_offscreen};

fn engine(seed: &str, movement: MovementMode, ticks: usize) -> Engine {
    let config = EngineConfig {
        movement,
        ..EngineConfig::seeded(seed)
    };
    let mut engine = Engine::new(config, 640, 360).expect("engine");
    for _ in 0..ticks {
        engine.tick();
    }
    engine
}

#[test]
fn png_snapshot_is_reproducible() {
    let a = render_png_offscreen(&engine("snapshot", MovementMode::Glitch, 60), 640, 360, 42.0)
        .expect("render a");
    let b = render_png_offscreen(&engine("snapshot", MovementMode::Glitch, 60), 640, 360, 42.0)
        .expect("render b");
    assert_eq!(&a[0..8], b"\x89PNG\r\n\x1a\n", "invalid PNG header");
    assert!(a.len() > 4096, "expected non-trivial PNG output");
    assert_eq!(a, b);

    let decoded = image::load_from_memory(&a).expect("decode png").to_rgba8();
    assert_eq!(decoded.dimensions(), (640, 360));
}

#[test]
fn sheen_time_does_not_touch_simulation() {
    let engine = engine("sheen", MovementMode::Pixel, 20);
    let before = engine.buffer().clone();
    let early = compose_frame(&engine.render_target(), 320, 180, 0.0).expect("frame");
    let late = compose_frame(&engine.render_target(), 320, 180, 900.0).expect("frame");
    assert_ne!(early, late);
    assert_eq!(engine.buffer(), &before);
    assert!(early.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn export_size_is_independent_of_buffer() {
    let engine = engine("export", MovementMode::Datamosh, 10);
    let png = render_png_offscreen(&engine, 300, 300, 1.0).expect("render");
    let decoded = image::load_from_memory(&png).expect("decode png");
    assert_eq!((decoded.width(), decoded.height()), (300, 300));
}
