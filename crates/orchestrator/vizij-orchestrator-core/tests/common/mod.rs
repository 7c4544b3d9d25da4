#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use vizij_binding::{prop, BindingContext, InstanceId, NativeEngine, NativeHandle, PropertyId, PropertyValue};
use vizij_native::{MemoryEngine, ViewModelFile};
use vizij_orchestrator::{Orchestrator, OrchestratorConfig, RenderTarget};
use vizij_test_fixtures::view_models;

pub type Log = Rc<RefCell<Vec<String>>>;
pub type Queue = Rc<RefCell<Vec<(NativeHandle, PropertyValue)>>>;

pub fn engine(fixture: &str) -> Rc<MemoryEngine> {
    let file: ViewModelFile = view_models::load(fixture).expect("view-model fixture");
    Rc::new(MemoryEngine::new(file).expect("fixture validates"))
}

/// Orchestrator over the `hud` fixture with one host-created `Game`.
pub fn hud(config: OrchestratorConfig) -> (Rc<MemoryEngine>, Orchestrator, InstanceId) {
    let engine = engine("hud");
    let dyn_engine: Rc<dyn NativeEngine> = engine.clone();
    let mut orch = Orchestrator::with_config(dyn_engine, config);
    let game = orch
        .binding_mut()
        .create_instance("Game")
        .expect("Game view model");
    (engine, orch, game)
}

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Target that plays queued engine writes on advance, the way a state
/// machine would, and reads one number property when preparing a render.
pub struct ScriptTarget {
    pub engine: Rc<MemoryEngine>,
    pub queue: Queue,
    pub log: Log,
    pub redraw: Rc<Cell<bool>>,
    pub watch: Option<PropertyId>,
    pub advances: Rc<Cell<u32>>,
}

impl ScriptTarget {
    pub fn new(engine: &Rc<MemoryEngine>, log: &Log) -> Self {
        Self {
            engine: engine.clone(),
            queue: Rc::new(RefCell::new(Vec::new())),
            log: log.clone(),
            redraw: Rc::new(Cell::new(true)),
            watch: None,
            advances: Rc::new(Cell::new(0)),
        }
    }

    pub fn watching(mut self, property: PropertyId) -> Self {
        self.watch = Some(property);
        self
    }
}

impl RenderTarget for ScriptTarget {
    fn advance(&mut self, _dt: f32) -> bool {
        self.advances.set(self.advances.get() + 1);
        let writes = std::mem::take(&mut *self.queue.borrow_mut());
        if writes.is_empty() {
            return false;
        }
        self.log.borrow_mut().push("advance".to_string());
        for (handle, value) in writes {
            self.engine.write(handle, value);
        }
        true
    }

    fn needs_redraw(&self) -> bool {
        self.redraw.get()
    }

    fn prepare_render(&mut self, ctx: &BindingContext) {
        let value = self
            .watch
            .and_then(|id| ctx.typed::<prop::Number>(id))
            .and_then(|p| ctx.value(p));
        match value {
            Some(v) => self.log.borrow_mut().push(format!("render:{v}")),
            None => self.log.borrow_mut().push("render".to_string()),
        }
    }

    fn label(&self) -> &str {
        "script"
    }
}
