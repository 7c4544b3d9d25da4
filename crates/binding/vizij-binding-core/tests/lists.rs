mod common;

use std::cell::Cell;
use std::rc::Rc;

use vizij_binding::{prop, BindingError, NativeEngine};

use common::hud;

#[test]
fn add_insert_and_read_back() {
    let (mut h, game) = hud();
    let enemies = h.ctx.property::<prop::List>(game, "Enemies").unwrap();
    assert_eq!(h.ctx.list_len(enemies), 0);

    let a = h.ctx.create_instance("Player").unwrap();
    let b = h.ctx.create_instance("Player").unwrap();
    let c = h.ctx.create_instance("Player").unwrap();
    assert!(h.ctx.list_add(enemies, a));
    assert!(h.ctx.list_add(enemies, c));
    assert!(h.ctx.list_insert(enemies, 1, b));
    assert_eq!(h.ctx.list_items(enemies), vec![a, b, c]);
    assert_eq!(h.ctx.list_get(enemies, 2), Some(c));
    assert_eq!(h.ctx.parents(b), vec![game]);

    let handle = h.prop_handle(enemies.id());
    let native: Vec<_> = [a, b, c].iter().map(|i| h.handle(*i)).collect();
    assert_eq!(h.engine.list_items(handle), native);
}

#[test]
fn out_of_range_and_mistyped_elements_are_rejected() {
    let (mut h, game) = hud();
    let enemies = h.ctx.property::<prop::List>(game, "Enemies").unwrap();
    let stats = h.ctx.create_instance("Stats").unwrap();
    let player = h.ctx.create_instance("Player").unwrap();

    assert!(!h.ctx.list_insert(enemies, 1, player));
    assert_eq!(
        h.ctx.diagnostics().last(),
        Some(&BindingError::IndexOutOfRange {
            op: "list_insert",
            index: 1,
            len: 0,
        })
    );
    assert!(!h.ctx.list_add(enemies, stats));
    assert!(matches!(
        h.ctx.diagnostics().last(),
        Some(BindingError::Rejected { op: "list_insert", .. })
    ));
    assert_eq!(h.ctx.list_get(enemies, 0), None);
    assert!(!h.ctx.list_remove_at(enemies, 0));
    assert!(!h.ctx.list_swap(enemies, 0, 1));
    assert!(h.ctx.parents(stats).is_empty());
}

#[test]
fn swap_and_remove() {
    let (mut h, game) = hud();
    let enemies = h.ctx.property::<prop::List>(game, "Enemies").unwrap();
    let a = h.ctx.create_instance("Player").unwrap();
    let b = h.ctx.create_instance("Player").unwrap();
    h.ctx.list_add(enemies, a);
    h.ctx.list_add(enemies, b);

    assert!(h.ctx.list_swap(enemies, 0, 1));
    assert_eq!(h.ctx.list_items(enemies), vec![b, a]);
    assert!(h.ctx.list_remove_at(enemies, 0));
    assert_eq!(h.ctx.list_items(enemies), vec![a]);
    assert!(h.ctx.parents(b).is_empty());
    assert!(h.ctx.is_alive(b), "host-owned elements outlive removal");
    assert!(!h.ctx.list_remove(enemies, b));
}

#[test]
fn elements_can_move_between_lists() {
    let (mut h, game) = hud();
    let enemies = h.ctx.property::<prop::List>(game, "Enemies").unwrap();
    let allies = h.ctx.property::<prop::List>(game, "Allies").unwrap();
    let p = h.ctx.create_instance("Player").unwrap();
    h.ctx.release_instance(p);
    assert!(!h.ctx.is_alive(p), "unowned, unparented instances are disposed");

    let p = h.ctx.create_instance("Player").unwrap();
    h.ctx.list_add(enemies, p);
    h.ctx.list_add(allies, p);
    assert_eq!(h.ctx.parents(p), vec![game, game]);

    h.ctx.list_remove(enemies, p);
    assert_eq!(h.ctx.parents(p), vec![game]);
    assert_eq!(h.ctx.list_items(allies), vec![p]);
}

#[test]
fn engine_side_list_changes_are_mirrored() {
    let (mut h, game) = hud();
    let enemies = h.ctx.property::<prop::List>(game, "Enemies").unwrap();
    let notified = Rc::new(Cell::new(0));
    let n = notified.clone();
    h.ctx.subscribe(enemies, move |_, _| n.set(n.get() + 1)).unwrap();

    let engine = h.ctx.engine().clone();
    let raw = engine.create_instance("Player").unwrap();
    assert!(engine.list_insert(h.prop_handle(enemies.id()), 0, raw));
    engine.release(raw);

    assert!(h.ctx.capture_changes());
    h.ctx.flush_captured();
    assert_eq!(notified.get(), 1);

    let items = h.ctx.list_items(enemies);
    assert_eq!(items.len(), 1);
    assert_eq!(h.ctx.instance_handle(items[0]), Some(raw));
    assert_eq!(h.ctx.parents(items[0]), vec![game]);
    assert!(!h.ctx.is_host_owned(items[0]));

    // list-owned elements go away with their owner
    h.ctx.dispose_instance(game);
    assert!(!h.ctx.is_alive(items[0]));
    assert_eq!(h.engine.outstanding_refs(), 0);
}

#[test]
fn disposing_an_element_drops_it_from_the_mirror() {
    let (mut h, game) = hud();
    let enemies = h.ctx.property::<prop::List>(game, "Enemies").unwrap();
    let a = h.ctx.create_instance("Player").unwrap();
    h.ctx.list_add(enemies, a);
    let native = h.handle(a);

    assert!(h.ctx.dispose_instance(a));
    // the engine still holds the element, so a fresh wrapper replaces it
    let items = h.ctx.list_items(enemies);
    assert_eq!(items.len(), 1);
    assert_ne!(items[0], a);
    assert_eq!(h.ctx.instance_handle(items[0]), Some(native));
}

#[test]
fn an_item_shared_by_two_lists_and_a_slot_keeps_every_link() {
    let mut h = common::Harness::new("inventory");
    let inv = h.ctx.create_instance("Inventory").unwrap();
    let items = h.ctx.property::<prop::List>(inv, "Items").unwrap();
    let featured = h.ctx.property::<prop::List>(inv, "Featured").unwrap();
    let sword = h.ctx.create_instance("Item").unwrap();
    let shield = h.ctx.create_instance("Item").unwrap();

    let count = h.ctx.property::<prop::Number>(sword, "Count").unwrap();
    h.ctx.subscribe(count, |_, _| {}).unwrap();
    assert!(!h.ctx.is_interested(inv));

    assert!(h.ctx.list_add(items, sword));
    assert!(h.ctx.list_add(featured, sword));
    assert!(h.ctx.replace_child(inv, "Selected", sword));
    assert_eq!(h.ctx.parents(sword), vec![inv, inv, inv]);
    assert!(h.ctx.is_interested(inv));

    assert!(h.ctx.list_remove(items, sword));
    assert!(h.ctx.list_remove(featured, sword));
    assert!(h.ctx.is_interested(inv), "the slot still links the item");

    assert!(h.ctx.replace_child(inv, "Selected", shield));
    assert!(h.ctx.parents(sword).is_empty());
    assert!(!h.ctx.is_interested(inv));
    assert!(h.ctx.is_alive(sword));

    let a = h.ctx.property::<prop::Enum>(sword, "Rarity").unwrap();
    let b = h.ctx.property::<prop::Enum>(shield, "Rarity").unwrap();
    assert!(Rc::ptr_eq(
        &h.ctx.enum_values(a).unwrap(),
        &h.ctx.enum_values(b).unwrap()
    ));
}

#[test]
fn removing_an_element_nothing_else_holds_disposes_it() {
    let (mut h, game) = hud();
    let enemies = h.ctx.property::<prop::List>(game, "Enemies").unwrap();
    let list = h.prop_handle(enemies.id());
    let (instances, refs) = (h.ctx.instance_count(), h.engine.outstanding_refs());

    let raw = h.engine.create_instance("Player").unwrap();
    assert!(h.engine.list_insert(list, 0, raw));
    h.engine.release(raw);
    let item = h.ctx.list_get(enemies, 0).unwrap();
    assert!(!h.ctx.is_host_owned(item));
    let health = h.ctx.property::<prop::Number>(item, "Health").unwrap();
    h.ctx.subscribe(health, |_, _| {}).unwrap();

    assert!(h.ctx.list_remove(enemies, item));
    assert!(!h.ctx.is_alive(item));
    assert_eq!(h.ctx.list_len(enemies), 0);
    assert_eq!(h.ctx.instance_count(), instances);
    assert_eq!(h.ctx.registered_count(), 0);
    assert_eq!(h.engine.outstanding_refs(), refs);
}

#[test]
fn engine_side_churn_leaves_no_wrappers_behind() {
    let (mut h, game) = hud();
    let enemies = h.ctx.property::<prop::List>(game, "Enemies").unwrap();
    h.ctx.subscribe(enemies, |_, _| {}).unwrap();
    let list = h.prop_handle(enemies.id());
    let instances = h.ctx.instance_count();
    let registered = h.ctx.registered_count();
    let refs = h.engine.outstanding_refs();

    for _ in 0..10 {
        let raw = h.engine.create_instance("Player").unwrap();
        assert!(h.engine.list_insert(list, 0, raw));
        h.engine.release(raw);
        assert!(h.ctx.capture_changes());
        h.ctx.flush_captured();

        let item = h.ctx.list_get(enemies, 0).unwrap();
        let health = h.ctx.property::<prop::Number>(item, "Health").unwrap();
        h.ctx.subscribe(health, |_, _| {}).unwrap();
        assert_eq!(h.ctx.registered_count(), registered + 1);

        assert!(h.engine.list_remove_at(list, 0));
        assert!(h.ctx.capture_changes());
        h.ctx.flush_captured();
        assert!(!h.ctx.is_alive(item));
    }

    assert_eq!(h.ctx.list_len(enemies), 0);
    assert_eq!(h.ctx.instance_count(), instances);
    assert_eq!(h.ctx.registered_count(), registered);
    assert_eq!(h.engine.outstanding_refs(), refs);
    assert_eq!(h.engine.over_releases(), 0);
}

#[test]
fn unsubscribed_lists_follow_engine_side_reordering() {
    let (mut h, game) = hud();
    let enemies = h.ctx.property::<prop::List>(game, "Enemies").unwrap();
    let list = h.prop_handle(enemies.id());
    let a = h.ctx.create_instance("Player").unwrap();
    let b = h.ctx.create_instance("Player").unwrap();
    h.ctx.list_add(enemies, a);
    h.ctx.list_add(enemies, b);
    assert_eq!(h.ctx.list_items(enemies), vec![a, b]);

    assert!(h.engine.list_swap(list, 0, 1));
    assert_eq!(h.ctx.list_items(enemies), vec![b, a]);
    assert_eq!(h.ctx.list_get(enemies, 0), Some(b));

    // same length, different element
    let raw = h.engine.create_instance("Player").unwrap();
    assert!(h.engine.list_remove_at(list, 0));
    assert!(h.engine.list_insert(list, 0, raw));
    h.engine.release(raw);
    let items = h.ctx.list_items(enemies);
    assert_eq!(items.len(), 2);
    assert_eq!(h.ctx.instance_handle(items[0]), Some(raw));
    assert_eq!(items[1], a);
    assert!(h.ctx.is_alive(b), "host-owned elements outlive removal");
    assert!(h.ctx.parents(b).is_empty());

    // the flag was consumed by the resync, so a late subscriber sees nothing
    h.ctx.subscribe(enemies, |_, _| {}).unwrap();
    assert!(!h.ctx.capture_changes());
}
