#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use vizij_binding::{BindingContext, InstanceId, NativeEngine, NativeHandle, PropertyId};
use vizij_native::{MemoryEngine, ViewModelFile};
use vizij_test_fixtures::view_models;

pub struct Harness {
    pub engine: Rc<MemoryEngine>,
    pub ctx: BindingContext,
}

impl Harness {
    pub fn new(fixture: &str) -> Self {
        let file: ViewModelFile = view_models::load(fixture).expect("view-model fixture");
        let engine = Rc::new(MemoryEngine::new(file).expect("fixture validates"));
        let dyn_engine: Rc<dyn NativeEngine> = engine.clone();
        Self {
            engine,
            ctx: BindingContext::new(dyn_engine),
        }
    }

    pub fn handle(&self, instance: InstanceId) -> NativeHandle {
        self.ctx.instance_handle(instance).expect("live instance")
    }

    pub fn prop_handle(&self, property: PropertyId) -> NativeHandle {
        self.ctx.property_handle(property).expect("live property")
    }
}

/// Harness over the `hud` fixture with one host-created `Game`.
pub fn hud() -> (Harness, InstanceId) {
    let mut h = Harness::new("hud");
    let game = h.ctx.create_instance("Game").expect("Game view model");
    (h, game)
}

/// Shared log that callbacks append to.
pub fn recorder() -> Rc<RefCell<Vec<String>>> {
    Rc::new(RefCell::new(Vec::new()))
}
