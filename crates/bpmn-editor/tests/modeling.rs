//! Integration tests: editing scenarios through the modeling facade.
//!
//! Each scenario checks the graphical model, the business objects behind
//! it, and that undo restores the previous state.

use std::collections::BTreeMap;

use bpmn_core::{
    Bounds, BpmnType, Delta, DiLabel, ElementIndex, Point, Value, Waypoint, Waypoints, props,
};
use bpmn_editor::command::{
    ConnectionMoveContext, ConnectionMoveHints, CreateHints, ReplaceHints, ShapeCreateContext,
};
use bpmn_editor::{CommandKind, Hook, Modeler, ModelerConfig, ModelingError, ShapeAttrs};
use pretty_assertions::assert_eq;

fn make_modeler() -> Modeler {
    let _ = env_logger::builder().is_test(true).try_init();
    Modeler::new()
}

fn make_shape(modeler: &mut Modeler, attrs: ShapeAttrs, x: f64, y: f64) -> ElementIndex {
    let root = modeler.root();
    modeler
        .modeling()
        .create_shape(&attrs, Point::new(x, y), root)
        .unwrap()
}

fn connect(modeler: &mut Modeler, source: ElementIndex, target: ElementIndex) -> ElementIndex {
    modeler
        .modeling()
        .connect(source, target)
        .unwrap()
        .expect("connection allowed")
}

fn flow_elements(modeler: &Modeler) -> Vec<bpmn_core::ObjectIndex> {
    let process = modeler.bo(modeler.root()).unwrap();
    modeler.moddle.list(process, props::FLOW_ELEMENTS).to_vec()
}

fn child_index(modeler: &Modeler, element: ElementIndex) -> Option<usize> {
    let parent = modeler.element(element).parent?;
    modeler
        .element(parent)
        .children
        .iter()
        .position(|c| *c == element)
}

// ─── Create ─────────────────────────────────────────────────────────────

#[test]
fn create_shape_centers_on_the_position() {
    let mut modeler = make_modeler();
    let task = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::Task), 200.0, 200.0);

    assert_eq!(
        modeler.element(task).bounds,
        Bounds::new(150.0, 160.0, 100.0, 80.0)
    );
    assert_eq!(modeler.element(task).parent, Some(modeler.root()));
    assert!(flow_elements(&modeler).contains(&modeler.bo(task).unwrap()));
}

#[test]
fn named_events_get_an_external_label() {
    let mut modeler = make_modeler();
    let event = make_shape(
        &mut modeler,
        ShapeAttrs::new(BpmnType::StartEvent).named("Order received"),
        100.0,
        100.0,
    );

    let label = modeler.element(event).label.expect("label created");
    assert!(modeler.canvas.contains(label));
    assert_eq!(modeler.element(label).label_target, Some(event));
    // below the event
    assert!(modeler.element(label).bounds.y > modeler.element(event).bounds.bottom());

    modeler.undo().unwrap();
    assert!(!modeler.canvas.contains(event));
    assert!(!modeler.canvas.contains(label));
}

// ─── Attachers ──────────────────────────────────────────────────────────

#[test]
fn moving_a_host_moves_its_attachers() {
    let mut modeler = make_modeler();
    let host = make_shape(
        &mut modeler,
        ShapeAttrs::new(BpmnType::Task).with_size(100.0, 100.0),
        150.0,
        150.0,
    );
    let attacher = modeler
        .modeling()
        .create_shape_with(
            &ShapeAttrs::new(BpmnType::BoundaryEvent),
            Point::new(150.0, 200.0),
            host,
            CreateHints { attach: true },
        )
        .unwrap();
    let other = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::Task), 350.0, 150.0);

    assert_eq!(modeler.element(host).bounds, Bounds::new(100.0, 100.0, 100.0, 100.0));
    assert_eq!(modeler.element(attacher).host, Some(host));
    assert!(modeler.element(host).attachers.contains(&attacher));
    let host_bo = modeler.bo(host).unwrap();
    assert_eq!(
        modeler
            .moddle
            .get(modeler.bo(attacher).unwrap())
            .get_ref(props::ATTACHED_TO_REF),
        Some(host_bo)
    );

    let attacher_before = modeler.element(attacher).bounds;
    let other_before = modeler.element(other).bounds;

    modeler
        .modeling()
        .move_elements(&[host], Delta::new(50.0, 0.0), None, false)
        .unwrap();

    assert_eq!(modeler.element(host).bounds, Bounds::new(150.0, 100.0, 100.0, 100.0));
    assert_eq!(
        modeler.element(attacher).bounds,
        attacher_before.translate(Delta::new(50.0, 0.0))
    );
    assert_eq!(modeler.element(other).bounds, other_before);
    assert_eq!(modeler.element(attacher).host, Some(host));
    assert!(modeler.element(host).attachers.contains(&attacher));

    modeler.undo().unwrap();
    assert_eq!(modeler.element(attacher).bounds, attacher_before);
}

#[test]
fn deleting_a_host_deletes_its_attachers() {
    let mut modeler = make_modeler();
    let host = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::Task), 200.0, 200.0);
    let attacher = modeler
        .modeling()
        .create_shape_with(
            &ShapeAttrs::new(BpmnType::BoundaryEvent),
            Point::new(200.0, 240.0),
            host,
            CreateHints { attach: true },
        )
        .unwrap();

    modeler.modeling().remove_shape(host).unwrap();
    assert!(!modeler.canvas.contains(attacher));

    modeler.undo().unwrap();
    assert!(modeler.canvas.contains(attacher));
    assert_eq!(modeler.element(attacher).host, Some(host));
    assert_eq!(modeler.element(host).attachers.to_vec(), vec![attacher]);
}

// ─── Delete ─────────────────────────────────────────────────────────────

#[test]
fn delete_shape_with_label_and_connection_undoes_completely() {
    let mut modeler = make_modeler();
    let start = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::StartEvent), 100.0, 100.0);
    let end = make_shape(
        &mut modeler,
        ShapeAttrs::new(BpmnType::EndEvent).named("Done"),
        400.0,
        100.0,
    );
    let label = modeler.element(end).label.expect("label created");
    let flow = connect(&mut modeler, start, end);

    let before = modeler.canvas.snapshot();
    let index_before = child_index(&modeler, end);
    let end_bo = modeler.bo(end).unwrap();

    modeler.modeling().remove_shape(end).unwrap();

    assert!(!modeler.canvas.contains(end));
    assert!(!modeler.canvas.contains(label));
    assert!(!modeler.canvas.contains(flow));
    assert!(modeler.element(start).outgoing.is_empty());
    assert!(!flow_elements(&modeler).contains(&end_bo));

    modeler.undo().unwrap();

    assert_eq!(modeler.canvas.snapshot(), before);
    assert_eq!(child_index(&modeler, end), index_before);
    assert!(flow_elements(&modeler).contains(&end_bo));
    assert!(flow_elements(&modeler).contains(&modeler.bo(flow).unwrap()));
}

#[test]
fn deleting_a_shape_releases_its_id() {
    let mut modeler = make_modeler();
    let task = make_shape(
        &mut modeler,
        ShapeAttrs::new(BpmnType::Task).with_id("Task_review"),
        200.0,
        200.0,
    );
    let id = modeler.element(task).id;
    assert!(modeler.moddle.ids.assigned(id));

    modeler.modeling().remove_shape(task).unwrap();
    assert!(!modeler.moddle.ids.assigned(id));

    modeler.undo().unwrap();
    assert!(modeler.moddle.ids.assigned(id));
}

// ─── Default flows ──────────────────────────────────────────────────────

fn make_default_flow(modeler: &mut Modeler) -> (ElementIndex, ElementIndex, ElementIndex) {
    let task = make_shape(modeler, ShapeAttrs::new(BpmnType::Task), 100.0, 100.0);
    let end = make_shape(modeler, ShapeAttrs::new(BpmnType::EndEvent), 400.0, 100.0);
    let flow = connect(modeler, task, end);
    let flow_bo = modeler.bo(flow).unwrap();
    modeler
        .modeling()
        .update_properties(
            task,
            BTreeMap::from([(props::DEFAULT.to_string(), Value::from(flow_bo))]),
        )
        .unwrap();
    (task, end, flow)
}

fn default_of(modeler: &Modeler, element: ElementIndex) -> Option<bpmn_core::ObjectIndex> {
    modeler
        .moddle
        .get(modeler.bo(element).unwrap())
        .get_ref(props::DEFAULT)
}

#[test]
fn reconnecting_a_default_flow_clears_the_default() {
    let mut modeler = make_modeler();
    let (task, _end, flow) = make_default_flow(&mut modeler);
    let other = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::Task), 100.0, 300.0);
    let flow_bo = modeler.bo(flow).unwrap();
    assert_eq!(default_of(&modeler, task), Some(flow_bo));

    modeler
        .modeling()
        .reconnect_start(flow, other, None)
        .unwrap();

    assert_eq!(default_of(&modeler, task), None);
    assert_eq!(modeler.element(flow).source, Some(other));
    assert_eq!(
        modeler.moddle.get(flow_bo).get_ref(props::SOURCE_REF),
        modeler.bo(other)
    );

    modeler.undo().unwrap();
    assert_eq!(default_of(&modeler, task), Some(flow_bo));
    assert_eq!(modeler.element(flow).source, Some(task));

    modeler.redo().unwrap();
    assert_eq!(default_of(&modeler, task), None);
}

#[test]
fn deleting_a_default_flow_unsets_the_default() {
    let mut modeler = make_modeler();
    let (task, _end, flow) = make_default_flow(&mut modeler);
    let flow_bo = modeler.bo(flow).unwrap();

    modeler.modeling().remove_connection(flow).unwrap();
    assert_eq!(default_of(&modeler, task), None);

    modeler.undo().unwrap();
    assert_eq!(default_of(&modeler, task), Some(flow_bo));
}

// ─── Properties and ids ─────────────────────────────────────────────────

#[test]
fn renaming_updates_the_label() {
    let mut modeler = make_modeler();
    let event = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::EndEvent), 300.0, 100.0);
    assert!(modeler.element(event).label.is_none());

    modeler
        .modeling()
        .update_label(event, Some("Shipped"), None)
        .unwrap();

    assert_eq!(
        bpmn_editor::label_util::get_label(&modeler, event).as_deref(),
        Some("Shipped")
    );
    assert!(modeler.element(event).label.is_some());

    modeler.undo().unwrap();
    assert_eq!(bpmn_editor::label_util::get_label(&modeler, event), None);
    assert!(modeler.element(event).label.is_none());
}

#[test]
fn taken_ids_conflict() {
    let mut modeler = make_modeler();
    let first = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::Task), 100.0, 100.0);
    make_shape(
        &mut modeler,
        ShapeAttrs::new(BpmnType::Task).with_id("Shared"),
        300.0,
        100.0,
    );

    let err = modeler
        .modeling()
        .update_properties(
            first,
            BTreeMap::from([("id".to_string(), Value::from("Shared"))]),
        )
        .unwrap_err();
    assert_eq!(err, ModelingError::IdConflict("Shared".into()));

    let bo = modeler.bo(first).unwrap();
    let err = modeler.modeling().claim_id("Shared", bo).unwrap_err();
    assert_eq!(err, ModelingError::IdConflict("Shared".into()));
}

#[test]
fn changing_an_id_rekeys_the_element() {
    let mut modeler = make_modeler();
    let task = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::Task), 100.0, 100.0);

    modeler
        .modeling()
        .update_properties(
            task,
            BTreeMap::from([("id".to_string(), Value::from("Task_pack"))]),
        )
        .unwrap();
    assert_eq!(modeler.element_by_id("Task_pack").unwrap(), task);

    modeler.undo().unwrap();
    assert!(modeler.element_by_id("Task_pack").is_err());
}

// ─── Replace ────────────────────────────────────────────────────────────

#[test]
fn task_replaced_by_expanded_sub_process_gets_a_start_event() {
    let mut modeler = make_modeler();
    let task = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::Task), 300.0, 200.0);

    let sub_process = modeler
        .modeling()
        .replace_shape(
            task,
            &ShapeAttrs::new(BpmnType::SubProcess).expanded(true),
            ReplaceHints::default(),
        )
        .unwrap()
        .expect("replaced");

    assert!(!modeler.canvas.contains(task));
    assert_eq!(
        modeler.element(sub_process).bounds,
        Bounds::new(125.0, 100.0, 350.0, 200.0)
    );
    let starts: Vec<ElementIndex> = modeler
        .element(sub_process)
        .children
        .iter()
        .copied()
        .filter(|c| modeler.is_type(*c, BpmnType::StartEvent))
        .collect();
    assert_eq!(starts.len(), 1);
    assert_eq!(
        modeler.element(starts[0]).bounds,
        Bounds::new(165.0, 182.0, 36.0, 36.0)
    );

    modeler.undo().unwrap();
    assert!(modeler.canvas.contains(task));
    assert!(!modeler.canvas.contains(sub_process));
}

// ─── Groups ─────────────────────────────────────────────────────────────

#[test]
fn groups_own_a_category_value_while_on_the_canvas() {
    let mut modeler = make_modeler();
    let group = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::Group), 300.0, 300.0);
    let group_bo = modeler.bo(group).unwrap();
    let value = modeler
        .moddle
        .get(group_bo)
        .get_ref(props::CATEGORY_VALUE_REF)
        .expect("category value");
    let category = modeler.moddle.parent_of(value).expect("category");
    let definitions = modeler.moddle.definitions;
    let root_elements = |m: &Modeler| m.moddle.list(definitions, props::ROOT_ELEMENTS).to_vec();

    assert!(root_elements(&modeler).contains(&category));
    assert!(modeler.moddle.list(category, props::CATEGORY_VALUE).contains(&value));

    modeler.modeling().remove_shape(group).unwrap();
    assert!(!root_elements(&modeler).contains(&category));

    modeler.undo().unwrap();
    assert!(root_elements(&modeler).contains(&category));
}

// ─── Failures ───────────────────────────────────────────────────────────

fn reject_shape_creation(modeler: &mut Modeler) {
    modeler
        .interceptor()
        .on(CommandKind::ShapeCreate, Hook::PostExecute, None, |_, _| {
            Err(ModelingError::InvalidOperation("rejected".into()))
        })
        .unwrap();
}

fn create_rejected_task(modeler: &mut Modeler) -> (ElementIndex, ModelingError) {
    let task = modeler
        .element_factory()
        .create_shape(&ShapeAttrs::new(BpmnType::Task))
        .unwrap();
    let root = modeler.root();
    let err = modeler
        .execute(ShapeCreateContext {
            shape: task,
            placement: Point::new(100.0, 100.0).into(),
            parent: root,
            parent_index: None,
            host: None,
            hints: CreateHints::default(),
        })
        .unwrap_err();
    (task, err)
}

#[test]
fn failed_commands_roll_back() {
    let mut modeler = make_modeler();
    reject_shape_creation(&mut modeler);
    let before = modeler.canvas.snapshot();
    let elements_before = flow_elements(&modeler);

    let (task, err) = create_rejected_task(&mut modeler);

    assert_eq!(err, ModelingError::InvalidOperation("rejected".into()));
    assert!(!modeler.canvas.contains(task));
    assert_eq!(modeler.canvas.snapshot(), before);
    assert_eq!(flow_elements(&modeler), elements_before);
    assert!(!modeler.can_undo());
}

#[test]
fn moving_a_removed_shape_is_element_not_found() {
    let mut modeler = make_modeler();
    let task = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::Task), 200.0, 200.0);
    modeler.modeling().remove_shape(task).unwrap();

    let err = modeler
        .modeling()
        .move_shape(task, Delta::new(10.0, 0.0), None)
        .unwrap_err();
    assert!(matches!(err, ModelingError::ElementNotFound(_)));
}

#[test]
fn without_rollback_a_failed_command_stays_undoable() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = ModelerConfig {
        rollback_on_error: false,
        ..ModelerConfig::default()
    };
    let mut modeler = Modeler::with_config(config).unwrap();
    make_shape(&mut modeler, ShapeAttrs::new(BpmnType::Task), 300.0, 100.0);
    modeler.undo().unwrap();
    assert!(modeler.can_redo());
    let before = modeler.canvas.snapshot();

    reject_shape_creation(&mut modeler);
    let (task, err) = create_rejected_task(&mut modeler);

    assert_eq!(err, ModelingError::InvalidOperation("rejected".into()));
    assert!(modeler.canvas.contains(task));
    assert!(flow_elements(&modeler).contains(&modeler.bo(task).unwrap()));
    assert!(modeler.can_undo());
    assert!(!modeler.can_redo());

    assert_eq!(modeler.undo().unwrap(), Some(CommandKind::ShapeCreate));
    assert!(!modeler.canvas.contains(task));
    assert_eq!(modeler.canvas.snapshot(), before);
}

// ─── Exact revert ───────────────────────────────────────────────────────

#[test]
fn undoing_a_fractional_move_restores_the_exact_bounds() {
    let mut modeler = make_modeler();
    let task = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::Task), 200.0, 200.0);
    let origin = Bounds::new(0.1, 0.1, 100.0, 80.0);
    modeler.modeling().resize_shape(task, origin).unwrap();
    let before = modeler.canvas.snapshot();

    modeler
        .modeling()
        .move_shape(task, Delta::new(0.2, 0.2), None)
        .unwrap();
    assert_ne!(modeler.element(task).bounds, origin);

    modeler.undo().unwrap();
    assert_eq!(modeler.element(task).bounds, origin);
    assert_eq!(modeler.canvas.snapshot(), before);
    let di = modeler.moddle.di_of(modeler.bo(task).unwrap()).unwrap();
    assert_eq!(modeler.moddle.di(di).bounds, Some(origin));
}

#[test]
fn undoing_a_fractional_connection_move_restores_the_exact_waypoints() {
    let mut modeler = make_modeler();
    let (flow, waypoints) = make_anchored_flow(&mut modeler);

    modeler
        .execute(ConnectionMoveContext::new(flow, Delta::new(0.2, 0.2)))
        .unwrap();
    modeler.undo().unwrap();

    assert_eq!(modeler.element(flow).waypoints, waypoints);
}

// ─── Connection move ────────────────────────────────────────────────────

/// Task -> Task with fractional waypoints that remember their anchors.
fn make_anchored_flow(modeler: &mut Modeler) -> (ElementIndex, Waypoints) {
    let source = make_shape(modeler, ShapeAttrs::new(BpmnType::Task), 100.0, 100.0);
    let target = make_shape(modeler, ShapeAttrs::new(BpmnType::Task), 400.0, 100.0);
    let flow = connect(modeler, source, target);
    let waypoints: Waypoints = [
        Waypoint {
            x: 150.1,
            y: 100.1,
            original: Some(Point::new(100.1, 100.1)),
        },
        Waypoint {
            x: 350.1,
            y: 100.1,
            original: Some(Point::new(400.1, 100.1)),
        },
    ]
    .into_iter()
    .collect();
    modeler
        .modeling()
        .update_waypoints(flow, waypoints.clone())
        .unwrap();
    (flow, waypoints)
}

#[test]
fn connection_move_translates_anchors_only_when_asked() {
    let mut modeler = make_modeler();
    let (flow, waypoints) = make_anchored_flow(&mut modeler);
    let delta = Delta::new(10.0, 20.0);

    modeler
        .execute(ConnectionMoveContext {
            hints: ConnectionMoveHints {
                update_anchors: false,
            },
            ..ConnectionMoveContext::new(flow, delta)
        })
        .unwrap();
    let moved = &modeler.element(flow).waypoints;
    assert_eq!(moved[0].point(), waypoints[0].point().translate(delta));
    assert_eq!(moved[0].original, waypoints[0].original);
    assert_eq!(moved[1].original, waypoints[1].original);

    modeler
        .execute(ConnectionMoveContext::new(flow, delta))
        .unwrap();
    let moved = &modeler.element(flow).waypoints;
    assert_eq!(
        moved[1].original,
        waypoints[1].original.map(|p| p.translate(delta).translate(delta))
    );

    let di = modeler.moddle.di_of(modeler.bo(flow).unwrap()).unwrap();
    let points: Vec<Point> = moved.iter().map(Waypoint::point).collect();
    assert_eq!(modeler.moddle.di(di).waypoints, points);

    modeler.undo().unwrap();
    modeler.undo().unwrap();
    assert_eq!(modeler.element(flow).waypoints, waypoints);
}

// ─── Conditional flows ──────────────────────────────────────────────────

#[test]
fn reconnecting_to_an_event_drops_the_condition_until_undo() {
    let mut modeler = make_modeler();
    let gateway = make_shape(
        &mut modeler,
        ShapeAttrs::new(BpmnType::ExclusiveGateway),
        100.0,
        100.0,
    );
    let task = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::Task), 300.0, 100.0);
    let start = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::StartEvent), 100.0, 300.0);
    let flow = connect(&mut modeler, gateway, task);
    let flow_bo = modeler.bo(flow).unwrap();
    let condition = Value::from("${approved}");
    modeler
        .modeling()
        .update_properties(
            flow,
            BTreeMap::from([(props::CONDITION_EXPRESSION.to_string(), condition.clone())]),
        )
        .unwrap();

    modeler.modeling().reconnect_start(flow, start, None).unwrap();
    assert!(
        modeler
            .moddle
            .get(flow_bo)
            .get(props::CONDITION_EXPRESSION)
            .is_null()
    );

    modeler.undo().unwrap();
    assert_eq!(modeler.element(flow).source, Some(gateway));
    assert_eq!(
        modeler.moddle.get(flow_bo).get(props::CONDITION_EXPRESSION),
        &condition
    );
}

// ─── Data ───────────────────────────────────────────────────────────────

#[test]
fn data_associations_belong_to_their_activity() {
    let mut modeler = make_modeler();
    let data = make_shape(
        &mut modeler,
        ShapeAttrs::new(BpmnType::DataObjectReference),
        100.0,
        300.0,
    );
    let task = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::Task), 300.0, 300.0);
    let task_bo = modeler.bo(task).unwrap();
    let data_bo = modeler.bo(data).unwrap();

    let input = connect(&mut modeler, data, task);
    let input_bo = modeler.bo(input).unwrap();
    assert_eq!(modeler.moddle.type_of(input_bo), BpmnType::DataInputAssociation);
    assert_eq!(modeler.moddle.parent_of(input_bo), Some(task_bo));
    assert_eq!(
        modeler.moddle.list(task_bo, props::DATA_INPUT_ASSOCIATIONS),
        &[input_bo]
    );
    assert_eq!(modeler.moddle.get(input_bo).get_ref(props::SOURCE_REF), Some(data_bo));

    let output = connect(&mut modeler, task, data);
    let output_bo = modeler.bo(output).unwrap();
    assert_eq!(modeler.moddle.type_of(output_bo), BpmnType::DataOutputAssociation);
    assert_eq!(modeler.moddle.parent_of(output_bo), Some(task_bo));
    assert_eq!(
        modeler.moddle.list(task_bo, props::DATA_OUTPUT_ASSOCIATIONS),
        &[output_bo]
    );
    assert_eq!(modeler.moddle.get(output_bo).get_ref(props::TARGET_REF), Some(data_bo));
    assert!(!flow_elements(&modeler).contains(&input_bo));

    modeler.undo().unwrap();
    modeler.undo().unwrap();
    assert!(modeler.moddle.list(task_bo, props::DATA_INPUT_ASSOCIATIONS).is_empty());
    assert!(modeler.moddle.list(task_bo, props::DATA_OUTPUT_ASSOCIATIONS).is_empty());
}

#[test]
fn data_objects_follow_their_reference_into_a_sub_process() {
    let mut modeler = make_modeler();
    let sub_process = make_shape(
        &mut modeler,
        ShapeAttrs::new(BpmnType::SubProcess).expanded(true),
        500.0,
        300.0,
    );
    let data = make_shape(
        &mut modeler,
        ShapeAttrs::new(BpmnType::DataObjectReference),
        100.0,
        100.0,
    );
    let process = modeler.bo(modeler.root()).unwrap();
    let sub_bo = modeler.bo(sub_process).unwrap();
    let data_bo = modeler.bo(data).unwrap();
    let data_object = modeler
        .moddle
        .get(data_bo)
        .get_ref(props::DATA_OBJECT_REF)
        .expect("data object");
    assert_eq!(modeler.moddle.parent_of(data_object), Some(process));
    assert!(flow_elements(&modeler).contains(&data_object));

    modeler
        .modeling()
        .move_elements(&[data], Delta::new(400.0, 200.0), Some(sub_process), false)
        .unwrap();

    assert_eq!(modeler.element(data).parent, Some(sub_process));
    assert_eq!(modeler.moddle.parent_of(data_bo), Some(sub_bo));
    assert_eq!(modeler.moddle.parent_of(data_object), Some(sub_bo));
    assert!(
        modeler
            .moddle
            .list(sub_bo, props::FLOW_ELEMENTS)
            .contains(&data_object)
    );
    assert!(!flow_elements(&modeler).contains(&data_object));

    modeler.undo().unwrap();
    assert_eq!(modeler.moddle.parent_of(data_object), Some(process));
    assert!(flow_elements(&modeler).contains(&data_object));
    assert!(
        !modeler
            .moddle
            .list(sub_bo, props::FLOW_ELEMENTS)
            .contains(&data_object)
    );
}

// ─── Label DI ───────────────────────────────────────────────────────────

fn label_di_bounds(modeler: &Modeler, element: ElementIndex) -> Option<Bounds> {
    let di = modeler.moddle.di_of(modeler.bo(element).unwrap()).unwrap();
    modeler.moddle.di(di).label.as_ref().and_then(|l| l.bounds)
}

#[test]
fn external_labels_write_the_label_bounds_of_their_target() {
    let mut modeler = make_modeler();
    let event = make_shape(
        &mut modeler,
        ShapeAttrs::new(BpmnType::EndEvent).named("Done"),
        300.0,
        100.0,
    );
    let label = modeler.element(event).label.expect("label created");
    let created = modeler.element(label).bounds;
    assert_eq!(label_di_bounds(&modeler, event), Some(created));

    modeler
        .modeling()
        .move_shape(label, Delta::new(25.0, 10.0), None)
        .unwrap();
    let moved = modeler.element(label).bounds;
    assert_eq!(moved, created.translate(Delta::new(25.0, 10.0)));
    assert_eq!(label_di_bounds(&modeler, event), Some(moved));
    // the event keeps its own bounds
    let di = modeler.moddle.di_of(modeler.bo(event).unwrap()).unwrap();
    assert_eq!(modeler.moddle.di(di).bounds, Some(modeler.element(event).bounds));

    modeler.undo().unwrap();
    assert_eq!(label_di_bounds(&modeler, event), Some(created));
}

#[test]
fn embedded_activity_labels_follow_the_move() {
    let mut modeler = make_modeler();
    let task = make_shape(&mut modeler, ShapeAttrs::new(BpmnType::Task), 100.0, 100.0);
    let di = modeler.moddle.di_of(modeler.bo(task).unwrap()).unwrap();
    let label = Bounds::new(60.0, 90.0, 80.0, 20.0);
    modeler.moddle.di_mut(di).label = Some(DiLabel {
        bounds: Some(label),
        color: None,
    });

    modeler
        .modeling()
        .move_elements(&[task], Delta::new(30.0, -10.0), None, false)
        .unwrap();
    assert_eq!(
        label_di_bounds(&modeler, task),
        Some(Bounds::new(90.0, 80.0, 80.0, 20.0))
    );

    modeler.undo().unwrap();
    assert_eq!(label_di_bounds(&modeler, task), Some(label));
}
