use std::cell::Cell;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vizij_binding::{prop, BindingContext, NativeEngine, NativeHandle, PropertyValue};
use vizij_native::MemoryEngine;
use vizij_orchestrator::{Orchestrator, RenderTarget, UpdateMode};
use vizij_test_fixtures::view_models;

/// Bumps every score each frame it is enabled.
struct Ticker {
    engine: Rc<MemoryEngine>,
    scores: Vec<NativeHandle>,
    value: f32,
    enabled: Rc<Cell<bool>>,
}

impl RenderTarget for Ticker {
    fn advance(&mut self, dt: f32) -> bool {
        if !self.enabled.get() {
            return false;
        }
        self.value += dt;
        for handle in &self.scores {
            self.engine.write(*handle, PropertyValue::Number(self.value));
        }
        true
    }

    fn prepare_render(&mut self, ctx: &BindingContext) {
        black_box(ctx.registered_count());
    }
}

fn setup(games: usize) -> (Orchestrator, Rc<Cell<bool>>) {
    let file = view_models::load("hud").expect("hud fixture");
    let engine = Rc::new(MemoryEngine::new(file).expect("valid"));
    let dyn_engine: Rc<dyn NativeEngine> = engine.clone();
    let mut orch = Orchestrator::new(dyn_engine);
    let mut scores = Vec::with_capacity(games);
    for _ in 0..games {
        let ctx = orch.binding_mut();
        let game = ctx.create_instance("Game").expect("Game");
        let score = ctx
            .property::<prop::Number>(game, "Stats/Score")
            .expect("score");
        ctx.subscribe(score, |ctx, change| {
            black_box(ctx.property_name(change.property));
        });
        scores.push(ctx.property_handle(score.id()).expect("handle"));
    }
    let enabled = Rc::new(Cell::new(true));
    orch.add_target(
        Ticker {
            engine,
            scores,
            value: 0.0,
            enabled: enabled.clone(),
        },
        UpdateMode::Auto,
    );
    (orch, enabled)
}

fn bench_tick(c: &mut Criterion) {
    c.bench_function("step_idle_128", |b| {
        let (mut orch, enabled) = setup(128);
        enabled.set(false);
        b.iter(|| black_box(orch.step(0.016)));
    });

    c.bench_function("step_all_changed_128", |b| {
        let (mut orch, _enabled) = setup(128);
        b.iter(|| black_box(orch.step(0.016)));
    });
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
