mod common;

use std::rc::Rc;

use vizij_binding::{prop, NativeEngine};
use vizij_orchestrator::{global, Orchestrator, OrchestratorError, UpdateMode};

use common::{engine, log, ScriptTarget};

#[test]
fn install_use_and_teardown() {
    assert!(!global::is_installed());
    assert_eq!(global::with(|o| o.epoch), None);

    let engine = engine("hud");
    let dyn_engine: Rc<dyn NativeEngine> = engine.clone();
    assert!(global::install(Orchestrator::new(dyn_engine)).unwrap().is_none());
    assert!(global::is_installed());

    let events = log();
    let target = ScriptTarget::new(&engine, &events);
    global::with(|o| {
        let game = o.binding_mut().create_instance("Game").unwrap();
        let score = o
            .binding_mut()
            .property::<prop::Number>(game, "Stats/Score")
            .unwrap();
        o.binding_mut().subscribe(score, |_, _| {}).unwrap();
        o.add_target(target, UpdateMode::Auto);
    })
    .unwrap();
    assert_eq!(global::with(|o| o.step(0.016).epoch), Some(1));
    assert!(engine.outstanding_refs() > 0);

    assert!(global::teardown());
    assert!(!global::is_installed());
    assert_eq!(engine.outstanding_refs(), 0);
    assert_eq!(engine.over_releases(), 0);
    assert!(!global::teardown());
}

#[test]
fn reentrant_access_is_refused() {
    let dyn_engine: Rc<dyn NativeEngine> = engine("hud");
    global::install(Orchestrator::new(dyn_engine.clone())).unwrap();

    let nested = global::with(|_| global::with(|o| o.epoch));
    assert_eq!(nested, Some(None));

    let swapped = global::with(|_| global::install(Orchestrator::new(dyn_engine.clone())).is_err());
    assert_eq!(swapped, Some(true));

    let init = global::with(|_| {
        global::with_or_init(|| Orchestrator::new(dyn_engine.clone()), |o| o.epoch)
    });
    assert_eq!(init, Some(Err(OrchestratorError::Reentrant)));

    assert_eq!(global::with(|_| global::teardown()), Some(false));
    assert!(global::teardown());
}

#[test]
fn install_replaces_and_init_recreates() {
    let dyn_engine: Rc<dyn NativeEngine> = engine("hud");
    let first = Orchestrator::new(dyn_engine.clone());
    global::install(first).unwrap();
    global::with(|o| o.step(0.016)).unwrap();

    let previous = global::install(Orchestrator::new(dyn_engine.clone()))
        .unwrap()
        .expect("previous orchestrator");
    assert_eq!(previous.epoch, 1);
    assert_eq!(global::with(|o| o.epoch), Some(0));

    assert!(global::teardown());
    let epoch = global::with_or_init(
        || Orchestrator::new(dyn_engine.clone()),
        |o| o.step(0.016).epoch,
    );
    assert_eq!(epoch, Ok(1));
    assert_eq!(
        global::with_or_init(|| unreachable!("already installed"), |o| o.epoch),
        Ok(1)
    );
    assert!(global::teardown());
}
