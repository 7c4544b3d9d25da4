mod common;

use vizij_binding::{prop, BindingError, NativeEngine};

use common::hud;

#[test]
fn disposing_releases_every_subscribed_descendant() {
    let (mut h, game) = hud();
    let score = h.ctx.property::<prop::Number>(game, "Stats/Score").unwrap();
    let lives = h.ctx.property::<prop::Number>(game, "Stats/Lives").unwrap();
    let alive = h
        .ctx
        .property::<prop::Boolean>(game, "Player/Stats/Alive")
        .unwrap();
    let title = h.ctx.property::<prop::Text>(game, "Title").unwrap();
    h.ctx.subscribe(score, |_, _| {}).unwrap();
    h.ctx.subscribe(lives, |_, _| {}).unwrap();
    h.ctx.subscribe(alive, |_, _| {}).unwrap();
    h.ctx.subscribe(title, |_, _| {}).unwrap();
    assert_eq!(h.ctx.registered_count(), 4);

    let stats = h.ctx.instance_child(game, "Stats").unwrap();
    let stats_handle = h.handle(stats);
    let score_handle = h.prop_handle(score.id());

    assert!(h.ctx.dispose_instance(stats));
    assert_eq!(h.ctx.registered_count(), 2);
    assert!(h.ctx.lookup(stats_handle).is_none());
    assert!(h.ctx.lookup(score_handle).is_none());
    assert!(!h.ctx.is_property_alive(lives.id()));
    assert_eq!(h.ctx.value(score), None);
    assert_eq!(h.engine.ref_count(stats_handle), 0);
    assert_eq!(h.engine.ref_count(score_handle), 0);
    assert!(h.ctx.is_interested(game));

    assert!(h.ctx.dispose_instance(game));
    assert_eq!(h.ctx.registered_count(), 0);
    assert_eq!(h.ctx.cached_wrappers(), 0);
    assert_eq!(h.ctx.instance_count(), 0);
    assert_eq!(h.ctx.property_count(), 0);
    assert_eq!(h.engine.outstanding_refs(), 0);
    assert_eq!(h.engine.over_releases(), 0);
}

#[test]
fn disposing_twice_is_a_quiet_no_op() {
    let (mut h, game) = hud();
    let score = h.ctx.property::<prop::Number>(game, "Stats/Score").unwrap();

    assert!(h.ctx.dispose_property(score));
    assert!(!h.ctx.dispose_property(score));
    assert!(h.ctx.dispose_instance(game));
    assert!(!h.ctx.dispose_instance(game));
    assert!(matches!(
        h.ctx.diagnostics().last(),
        Some(BindingError::AlreadyDisposed(_))
    ));
    assert!(h.ctx.diagnostics().last().is_some_and(BindingError::is_quiet));
    assert_eq!(h.engine.over_releases(), 0);
}

#[test]
fn host_owned_children_survive_their_parent() {
    let (mut h, game) = hud();
    let player = h.ctx.instance_child(game, "Player").unwrap();
    let stats = h.ctx.instance_child(player, "Stats").unwrap();
    assert!(!h.ctx.is_host_owned(player));
    assert!(h.ctx.retain_instance(player));

    h.ctx.dispose_instance(game);
    assert!(h.ctx.is_alive(player));
    assert!(h.ctx.parents(player).is_empty());
    assert!(h.ctx.is_alive(stats), "still reachable from the retained player");

    let name = h.ctx.property::<prop::Text>(player, "Name").unwrap();
    assert_eq!(h.ctx.value(name).as_deref(), Some("P1"));

    assert!(h.ctx.release_instance(player));
    assert!(!h.ctx.is_alive(player));
    assert!(!h.ctx.is_alive(stats));
    assert_eq!(h.engine.outstanding_refs(), 0);
}

#[test]
fn disposed_property_is_rebuilt_on_next_lookup() {
    let (mut h, game) = hud();
    let score = h.ctx.property::<prop::Number>(game, "Stats/Score").unwrap();
    h.ctx.subscribe(score, |_, _| {}).unwrap();
    assert!(h.ctx.dispose_property(score));
    assert_eq!(h.ctx.registered_count(), 0);
    assert!(!h.ctx.is_interested(game));

    let again = h.ctx.property::<prop::Number>(game, "Stats/Score").unwrap();
    assert_ne!(again, score);
    assert_eq!(h.ctx.value(again), Some(0.0));
    assert!(!h.ctx.set_value(score, 1.0));
    assert!(matches!(
        h.ctx.diagnostics().last(),
        Some(BindingError::DisposedProperty(_))
    ));
}

#[test]
fn disposed_arguments_are_rejected() {
    let (mut h, game) = hud();
    let stats = h.ctx.instance_child(game, "Stats").unwrap();
    h.ctx.dispose_instance(stats);
    assert!(h.ctx.property::<prop::Number>(stats, "Score").is_none());
    assert!(!h.ctx.replace_child(game, "Stats", stats));
    assert!(matches!(
        h.ctx.diagnostics().last(),
        Some(BindingError::DisposedInstance(_))
    ));

    // the slot can be resolved again through the live parent
    let fresh = h.ctx.instance_child(game, "Stats").unwrap();
    assert_ne!(fresh, stats);
}

#[test]
fn reset_releases_everything_and_stays_usable() {
    let (mut h, game) = hud();
    let lives = h
        .ctx
        .property::<prop::Number>(game, "Player/Stats/Lives")
        .unwrap();
    h.ctx.subscribe(lives, |_, _| {}).unwrap();
    let enemies = h.ctx.property::<prop::List>(game, "Enemies").unwrap();
    let enemy = h.ctx.create_instance("Player").unwrap();
    h.ctx.list_add(enemies, enemy);

    h.ctx.reset();
    assert_eq!(h.ctx.registered_count(), 0);
    assert_eq!(h.ctx.cached_wrappers(), 0);
    assert!(!h.ctx.is_alive(game));
    assert_eq!(h.engine.outstanding_refs(), 0);
    assert_eq!(h.engine.over_releases(), 0);

    let again = h.ctx.create_instance("Game").unwrap();
    assert!(h.ctx.property::<prop::Number>(again, "Stats/Score").is_some());
}

#[test]
fn disposing_a_list_disposes_only_the_elements_it_held() {
    let (mut h, game) = hud();
    let enemies = h.ctx.property::<prop::List>(game, "Enemies").unwrap();
    let list = h.prop_handle(enemies.id());
    let kept = h.ctx.create_instance("Player").unwrap();
    assert!(h.ctx.list_add(enemies, kept));
    let raw = h.engine.create_instance("Player").unwrap();
    assert!(h.engine.list_insert(list, 1, raw));
    h.engine.release(raw);
    let items = h.ctx.list_items(enemies);
    assert_eq!(items.len(), 2);
    let synced = items[1];

    assert!(h.ctx.dispose_property(enemies));
    assert!(!h.ctx.is_alive(synced));
    assert!(h.ctx.is_alive(kept));
    assert!(h.ctx.parents(kept).is_empty());
    assert_eq!(h.ctx.instance_count(), 2);
}
