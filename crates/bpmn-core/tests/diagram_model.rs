//! Integration tests: canvas containment, business object lists and the
//! id registry working together (bpmn-core).

use bpmn_core::{
    Bounds, BpmnType, Canvas, CoreError, Element, ElementId, ElementIndex, IdRegistry, Moddle,
    props,
};
use pretty_assertions::assert_eq;

fn make_shape(canvas: &mut Canvas, id: &str, parent: ElementIndex) -> ElementIndex {
    let idx = canvas.create(Element::shape(
        ElementId::intern(id),
        Bounds::new(0.0, 0.0, 100.0, 80.0),
    ));
    canvas.add_shape(idx, parent, None).unwrap();
    idx
}

// ─── Canvas containment ─────────────────────────────────────────────────

#[test]
fn nested_shapes_form_a_containment_tree() {
    let mut canvas = Canvas::new();
    let root = canvas.root();
    let pool = make_shape(&mut canvas, "dm_pool", root);
    let sub = make_shape(&mut canvas, "dm_sub", pool);
    let task = make_shape(&mut canvas, "dm_task", sub);

    assert!(canvas.is_ancestor(pool, task));
    assert!(!canvas.is_ancestor(task, pool));
    assert_eq!(canvas.find_root(task), root);

    let mut below = canvas.descendants(&[pool]);
    below.sort();
    let mut expected = vec![sub, task];
    expected.sort();
    assert_eq!(below, expected);
}

#[test]
fn remove_and_readd_restores_the_snapshot() {
    let mut canvas = Canvas::new();
    let root = canvas.root();
    for id in ["dm_a", "dm_b", "dm_c"] {
        make_shape(&mut canvas, id, root);
    }
    let before = canvas.snapshot();

    let b = canvas.find("dm_b").unwrap();
    let (parent, index) = canvas.remove(b).unwrap();
    assert_ne!(canvas.snapshot(), before);

    canvas.add_shape(b, parent, Some(index)).unwrap();
    assert_eq!(canvas.snapshot(), before);
}

#[test]
fn renaming_an_element_rekeys_the_registry() {
    let mut canvas = Canvas::new();
    let root = canvas.root();
    let task = make_shape(&mut canvas, "dm_old", root);
    make_shape(&mut canvas, "dm_taken", root);

    canvas.update_id(task, ElementId::intern("dm_new")).unwrap();
    assert_eq!(canvas.find("dm_new"), Some(task));
    assert!(canvas.find("dm_old").is_none());

    let err = canvas.update_id(task, ElementId::intern("dm_taken"));
    assert!(err.is_err());
}

// ─── Business objects ───────────────────────────────────────────────────

#[test]
fn list_insertion_is_idempotent_and_clamped() {
    let mut moddle = Moddle::new();
    let process = moddle.create(BpmnType::Process, ElementId::intern("dm_Process"));
    let a = moddle.create(BpmnType::Task, ElementId::intern("dm_Task_a"));
    let b = moddle.create(BpmnType::Task, ElementId::intern("dm_Task_b"));

    assert_eq!(moddle.add_to(process, props::FLOW_ELEMENTS, a, None), 0);
    assert_eq!(moddle.add_to(process, props::FLOW_ELEMENTS, b, Some(10)), 1);
    // already present
    assert_eq!(moddle.add_to(process, props::FLOW_ELEMENTS, a, Some(1)), 0);
    assert_eq!(moddle.list(process, props::FLOW_ELEMENTS), &[a, b]);

    assert_eq!(moddle.remove_from(process, props::FLOW_ELEMENTS, a), Some(0));
    assert_eq!(moddle.remove_from(process, props::FLOW_ELEMENTS, a), None);
    assert_eq!(moddle.list(process, props::FLOW_ELEMENTS), &[b]);
}

#[test]
fn fresh_document_claims_its_definitions_id() {
    let moddle = Moddle::new();
    let definitions = moddle.get(moddle.definitions);
    assert_eq!(definitions.bpmn_type, BpmnType::Definitions);
    assert!(moddle.ids.assigned(definitions.id));
}

// ─── Id registry ────────────────────────────────────────────────────────

#[test]
fn claimed_ids_conflict_until_released() {
    let mut ids = IdRegistry::new();
    let id = ElementId::intern("dm_Shared");
    let owner = ElementId::intern("dm_Owner");

    ids.claim(id, owner).unwrap();
    assert_eq!(
        ids.claim(id, owner),
        Err(CoreError::IdConflict("dm_Shared".into()))
    );

    ids.unclaim(id);
    assert!(!ids.assigned(id));
    ids.claim(id, owner).unwrap();
}

#[test]
fn generated_ids_skip_claimed_ones() {
    let mut ids = IdRegistry::new();
    ids.claim(ElementId::intern("dmgen_2"), ElementId::intern("dm_x"))
        .unwrap();

    let first = ids.next_prefixed("dmgen", None);
    let second = ids.next_prefixed("dmgen", None);
    assert_eq!(first.as_str(), "dmgen_1");
    assert_eq!(second.as_str(), "dmgen_3");
    assert!(ids.assigned(second));
}
