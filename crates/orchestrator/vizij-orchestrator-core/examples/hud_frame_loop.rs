use std::rc::Rc;

use anyhow::Context;
use serde_json::to_string_pretty;
use vizij_binding::{prop, BindingContext, NativeEngine, NativeHandle, PropertyValue};
use vizij_native::MemoryEngine;
use vizij_orchestrator::{Orchestrator, RenderTarget, UpdateMode};
use vizij_test_fixtures::view_models;

/// Counts the score up by one every other frame.
struct ScoreBoard {
    engine: Rc<MemoryEngine>,
    score: NativeHandle,
    frame: u32,
}

impl RenderTarget for ScoreBoard {
    fn advance(&mut self, _dt: f32) -> bool {
        self.frame += 1;
        if self.frame % 2 == 1 {
            return false;
        }
        let next = self.engine.value(self.score).and_then(|v| v.as_number()).unwrap_or(0.0) + 1.0;
        self.engine.write(self.score, PropertyValue::Number(next))
    }

    fn prepare_render(&mut self, _ctx: &BindingContext) {}

    fn label(&self) -> &str {
        "scoreboard"
    }
}

fn main() -> anyhow::Result<()> {
    let file = view_models::load("hud")?;
    let engine = Rc::new(MemoryEngine::new(file)?);
    let dyn_engine: Rc<dyn NativeEngine> = engine.clone();
    let mut orch = Orchestrator::new(dyn_engine);

    let ctx = orch.binding_mut();
    let game = ctx.create_instance("Game").context("Game view model")?;
    let score = ctx
        .property::<prop::Number>(game, "Stats/Score")
        .context("Stats/Score")?;
    ctx.subscribe(score, move |ctx, change| {
        println!("{} -> {:?}", change.name, ctx.value(score));
    })
    .context("subscribe")?;
    let handle = ctx.property_handle(score.id()).context("score handle")?;

    orch.add_target(
        ScoreBoard {
            engine,
            score: handle,
            frame: 0,
        },
        UpdateMode::Auto,
    );

    for _ in 0..4 {
        let frame = orch.step(1.0 / 60.0);
        println!("{}", to_string_pretty(&frame)?);
    }
    Ok(())
}
