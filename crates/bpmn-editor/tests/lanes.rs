//! Integration tests: participants, lanes and flow node references.

use std::cell::Cell;
use std::rc::Rc;

use bpmn_core::{Bounds, BpmnType, Delta, ElementIndex, ObjectIndex, Point, props};
use bpmn_editor::command::ReplaceHints;
use bpmn_editor::{CommandKind, Hook, LaneLocation, Modeler, ModelingError, ShapeAttrs};
use pretty_assertions::assert_eq;

/// A collaboration with one participant at (100, 100, 600, 250).
fn make_participant() -> (Modeler, ElementIndex) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut modeler = Modeler::new();
    let collaboration = modeler.modeling().make_collaboration().unwrap();
    let participant = modeler
        .modeling()
        .create_shape(
            &ShapeAttrs::new(BpmnType::Participant),
            Point::new(400.0, 225.0),
            collaboration,
        )
        .unwrap();
    (modeler, participant)
}

fn lanes_of(modeler: &Modeler, shape: ElementIndex) -> Vec<ElementIndex> {
    let mut lanes: Vec<ElementIndex> = modeler
        .element(shape)
        .children
        .iter()
        .copied()
        .filter(|c| modeler.is_type(*c, BpmnType::Lane))
        .collect();
    lanes.sort_by(|a, b| {
        modeler
            .element(*a)
            .bounds
            .y
            .total_cmp(&modeler.element(*b).bounds.y)
    });
    lanes
}

fn flow_node_refs(modeler: &Modeler, lane: ElementIndex) -> Vec<ObjectIndex> {
    let bo = modeler.bo(lane).unwrap();
    modeler.moddle.list(bo, props::FLOW_NODE_REF).to_vec()
}

// ─── Collaboration ──────────────────────────────────────────────────────

#[test]
fn participant_brings_its_process_into_the_definitions() {
    let (modeler, participant) = make_participant();
    assert_eq!(
        modeler.element(participant).bounds,
        Bounds::new(100.0, 100.0, 600.0, 250.0)
    );
    let bo = modeler.bo(participant).unwrap();
    let process = modeler.moddle.get(bo).get_ref(props::PROCESS_REF).unwrap();
    let definitions = modeler.moddle.definitions;
    assert!(
        modeler
            .moddle
            .list(definitions, props::ROOT_ELEMENTS)
            .contains(&process)
    );
    let collaboration = modeler.bo(modeler.root()).unwrap();
    assert!(
        modeler
            .moddle
            .list(collaboration, props::PARTICIPANTS)
            .contains(&bo)
    );
}

#[test]
fn flow_nodes_in_a_participant_live_in_its_process() {
    let (mut modeler, participant) = make_participant();
    let task = modeler
        .modeling()
        .create_shape(
            &ShapeAttrs::new(BpmnType::Task),
            Point::new(300.0, 200.0),
            participant,
        )
        .unwrap();
    let process = modeler
        .moddle
        .get(modeler.bo(participant).unwrap())
        .get_ref(props::PROCESS_REF)
        .unwrap();
    assert_eq!(modeler.moddle.parent_of(modeler.bo(task).unwrap()), Some(process));
}

// ─── Split ──────────────────────────────────────────────────────────────

#[test]
fn split_lanes_partition_the_participant() {
    let (mut modeler, participant) = make_participant();
    modeler.modeling().split_lane(participant, 3).unwrap();

    let lanes = lanes_of(&modeler, participant);
    assert_eq!(lanes.len(), 3);
    let bounds: Vec<Bounds> = lanes.iter().map(|l| modeler.element(*l).bounds).collect();
    assert_eq!(
        bounds,
        vec![
            Bounds::new(130.0, 100.0, 570.0, 83.0),
            Bounds::new(130.0, 183.0, 570.0, 83.0),
            Bounds::new(130.0, 266.0, 570.0, 84.0),
        ]
    );
    let total: f64 = bounds.iter().map(|b| b.height).sum();
    assert_eq!(total, 250.0);

    modeler.undo().unwrap();
    assert!(lanes_of(&modeler, participant).is_empty());
}

#[test]
fn splitting_into_fewer_lanes_than_exist_fails() {
    let (mut modeler, participant) = make_participant();
    modeler.modeling().split_lane(participant, 3).unwrap();
    let before = modeler.canvas.snapshot();

    let err = modeler.modeling().split_lane(participant, 2).unwrap_err();
    assert!(matches!(err, ModelingError::InvalidOperation(_)));
    assert_eq!(modeler.canvas.snapshot(), before);
}

/// A vertical participant at (100, 100, 250, 600).
fn make_vertical_participant() -> (Modeler, ElementIndex) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut modeler = Modeler::new();
    let collaboration = modeler.modeling().make_collaboration().unwrap();
    let participant = modeler
        .modeling()
        .create_shape(
            &ShapeAttrs::new(BpmnType::Participant).horizontal(false),
            Point::new(225.0, 400.0),
            collaboration,
        )
        .unwrap();
    (modeler, participant)
}

fn lanes_left_to_right(modeler: &Modeler, shape: ElementIndex) -> Vec<ElementIndex> {
    let mut lanes = lanes_of(modeler, shape);
    lanes.sort_by(|a, b| {
        modeler
            .element(*a)
            .bounds
            .x
            .total_cmp(&modeler.element(*b).bounds.x)
    });
    lanes
}

#[test]
fn vertical_participants_split_into_columns() {
    let (mut modeler, participant) = make_vertical_participant();
    assert_eq!(
        modeler.element(participant).bounds,
        Bounds::new(100.0, 100.0, 250.0, 600.0)
    );
    modeler.modeling().split_lane(participant, 3).unwrap();

    let lanes = lanes_left_to_right(&modeler, participant);
    let bounds: Vec<Bounds> = lanes.iter().map(|l| modeler.element(*l).bounds).collect();
    assert_eq!(
        bounds,
        vec![
            Bounds::new(100.0, 130.0, 83.0, 570.0),
            Bounds::new(183.0, 130.0, 83.0, 570.0),
            Bounds::new(266.0, 130.0, 84.0, 570.0),
        ]
    );
    for lane in &lanes {
        let di = modeler.moddle.di_of(modeler.bo(*lane).unwrap()).unwrap();
        assert_eq!(modeler.moddle.di(di).is_horizontal, Some(false));
    }
}

// ─── Add ────────────────────────────────────────────────────────────────

#[test]
fn adding_a_lane_below_grows_the_participant() {
    let (mut modeler, participant) = make_participant();

    let lane = modeler
        .modeling()
        .add_lane(participant, LaneLocation::Bottom)
        .unwrap()
        .expect("lane added");

    let height = modeler.config.lane_height;
    let lanes = lanes_of(&modeler, participant);
    assert_eq!(lanes.len(), 2);
    assert_eq!(lanes[1], lane);
    assert_eq!(modeler.element(participant).bounds.height, 250.0 + height);
    assert_eq!(modeler.element(lane).bounds.height, height);
    assert_eq!(
        modeler.element(lanes[0]).bounds.bottom(),
        modeler.element(lane).bounds.y
    );

    modeler.undo().unwrap();
    assert!(lanes_of(&modeler, participant).is_empty());
    assert_eq!(
        modeler.element(participant).bounds,
        Bounds::new(100.0, 100.0, 600.0, 250.0)
    );
}

#[test]
fn adding_a_lane_right_widens_a_vertical_participant() {
    let (mut modeler, participant) = make_vertical_participant();
    let lane = modeler
        .modeling()
        .add_lane(participant, LaneLocation::Right)
        .unwrap()
        .expect("lane added");

    let width = modeler.config.lane_height;
    let lanes = lanes_left_to_right(&modeler, participant);
    assert_eq!(lanes.len(), 2);
    assert_eq!(lanes[1], lane);
    assert_eq!(modeler.element(participant).bounds.width, 250.0 + width);
    assert_eq!(modeler.element(participant).bounds.height, 600.0);
    assert_eq!(modeler.element(lane).bounds.width, width);
    assert_eq!(
        modeler.element(lanes[0]).bounds.right(),
        modeler.element(lane).bounds.x
    );
}

#[test]
fn vertical_participants_reject_top_and_bottom() {
    let (mut modeler, participant) = make_vertical_participant();
    let before = modeler.canvas.snapshot();
    let err = modeler
        .modeling()
        .add_lane(participant, LaneLocation::Top)
        .unwrap_err();
    assert!(matches!(err, ModelingError::InvalidArgument(_)));
    assert_eq!(modeler.canvas.snapshot(), before);
}

#[test]
fn deleting_a_vertical_lane_widens_its_neighbour() {
    let (mut modeler, participant) = make_vertical_participant();
    modeler.modeling().split_lane(participant, 2).unwrap();
    let lanes = lanes_left_to_right(&modeler, participant);
    let (left, right) = (lanes[0], lanes[1]);

    modeler.modeling().remove_shape(right).unwrap();
    assert_eq!(
        modeler.element(left).bounds,
        Bounds::new(100.0, 130.0, 250.0, 570.0)
    );
}

// ─── Resize ─────────────────────────────────────────────────────────────

#[test]
fn balanced_resize_takes_space_from_the_neighbour() {
    let (mut modeler, participant) = make_participant();
    modeler.modeling().split_lane(participant, 2).unwrap();
    let lanes = lanes_of(&modeler, participant);
    let (upper, lower) = (lanes[0], lanes[1]);
    assert_eq!(modeler.element(upper).bounds, Bounds::new(130.0, 100.0, 570.0, 125.0));

    modeler
        .modeling()
        .resize_lane(upper, Bounds::new(130.0, 100.0, 570.0, 150.0), true)
        .unwrap();

    assert_eq!(modeler.element(upper).bounds, Bounds::new(130.0, 100.0, 570.0, 150.0));
    assert_eq!(modeler.element(lower).bounds, Bounds::new(130.0, 250.0, 570.0, 100.0));
    assert_eq!(
        modeler.element(participant).bounds,
        Bounds::new(100.0, 100.0, 600.0, 250.0)
    );

    modeler.undo().unwrap();
    assert_eq!(modeler.element(lower).bounds, Bounds::new(130.0, 225.0, 570.0, 125.0));
}

#[test]
fn unbalanced_resize_pushes_the_lanes_below() {
    let (mut modeler, participant) = make_participant();
    modeler.modeling().split_lane(participant, 2).unwrap();
    let lanes = lanes_of(&modeler, participant);
    let (upper, lower) = (lanes[0], lanes[1]);
    let before = modeler.canvas.snapshot();

    modeler
        .modeling()
        .resize_lane(upper, Bounds::new(130.0, 100.0, 570.0, 150.0), false)
        .unwrap();

    assert_eq!(modeler.element(upper).bounds, Bounds::new(130.0, 100.0, 570.0, 150.0));
    assert_eq!(modeler.element(lower).bounds, Bounds::new(130.0, 250.0, 570.0, 125.0));
    assert_eq!(
        modeler.element(participant).bounds,
        Bounds::new(100.0, 100.0, 600.0, 275.0)
    );

    modeler.undo().unwrap();
    assert_eq!(modeler.canvas.snapshot(), before);
}

// ─── Flow node refs ─────────────────────────────────────────────────────

#[test]
fn flow_nodes_belong_to_the_lane_containing_their_center() {
    let (mut modeler, participant) = make_participant();
    modeler.modeling().split_lane(participant, 2).unwrap();
    let lanes = lanes_of(&modeler, participant);
    let (upper, lower) = (lanes[0], lanes[1]);

    // upper lane spans y 100..225
    let task = modeler
        .modeling()
        .create_shape(
            &ShapeAttrs::new(BpmnType::Task),
            Point::new(300.0, 160.0),
            participant,
        )
        .unwrap();
    let task_bo = modeler.bo(task).unwrap();

    assert_eq!(flow_node_refs(&modeler, upper), vec![task_bo]);
    assert!(flow_node_refs(&modeler, lower).is_empty());

    modeler
        .modeling()
        .move_elements(&[task], Delta::new(0.0, 125.0), None, false)
        .unwrap();

    assert!(flow_node_refs(&modeler, upper).is_empty());
    assert_eq!(flow_node_refs(&modeler, lower), vec![task_bo]);

    modeler.undo().unwrap();
    assert_eq!(flow_node_refs(&modeler, upper), vec![task_bo]);
    assert!(flow_node_refs(&modeler, lower).is_empty());
}

#[test]
fn deleting_a_flow_node_drops_its_lane_refs() {
    let (mut modeler, participant) = make_participant();
    modeler.modeling().split_lane(participant, 2).unwrap();
    let upper = lanes_of(&modeler, participant)[0];
    let task = modeler
        .modeling()
        .create_shape(
            &ShapeAttrs::new(BpmnType::Task),
            Point::new(300.0, 160.0),
            participant,
        )
        .unwrap();

    modeler.modeling().remove_shape(task).unwrap();
    assert!(flow_node_refs(&modeler, upper).is_empty());

    modeler.undo().unwrap();
    assert_eq!(flow_node_refs(&modeler, upper), vec![modeler.bo(task).unwrap()]);
}

// ─── Data stores ────────────────────────────────────────────────────────

#[test]
fn data_stores_on_a_collaboration_join_a_participant_process() {
    let (mut modeler, participant) = make_participant();
    let root = modeler.root();
    let data_store = modeler
        .modeling()
        .create_shape(
            &ShapeAttrs::new(BpmnType::DataStoreReference),
            Point::new(400.0, 500.0),
            root,
        )
        .unwrap();

    let process = modeler
        .moddle
        .get(modeler.bo(participant).unwrap())
        .get_ref(props::PROCESS_REF)
        .unwrap();
    let bo = modeler.bo(data_store).unwrap();
    assert_eq!(modeler.element(data_store).parent, Some(root));
    assert_eq!(modeler.moddle.parent_of(bo), Some(process));
    assert!(modeler.moddle.list(process, props::FLOW_ELEMENTS).contains(&bo));

    modeler.undo().unwrap();
    assert!(!modeler.moddle.list(process, props::FLOW_ELEMENTS).contains(&bo));
}

#[test]
fn a_failed_create_leaves_no_pending_lane_refs() {
    let (mut modeler, participant) = make_participant();
    modeler.modeling().split_lane(participant, 2).unwrap();
    let upper = lanes_of(&modeler, participant)[0];
    let task = modeler
        .modeling()
        .create_shape(
            &ShapeAttrs::new(BpmnType::Task),
            Point::new(300.0, 160.0),
            participant,
        )
        .unwrap();

    let reject = Rc::new(Cell::new(true));
    let rejecting = reject.clone();
    modeler
        .interceptor()
        .on(CommandKind::ShapeCreate, Hook::PostExecute, None, move |_, _| {
            if rejecting.get() {
                return Err(ModelingError::InvalidOperation("rejected".into()));
            }
            Ok(())
        })
        .unwrap();
    let err = modeler
        .modeling()
        .create_shape(
            &ShapeAttrs::new(BpmnType::Task),
            Point::new(500.0, 160.0),
            participant,
        )
        .unwrap_err();
    assert_eq!(err, ModelingError::InvalidOperation("rejected".into()));
    reject.set(false);

    let user_task = modeler
        .modeling()
        .replace_shape(
            task,
            &ShapeAttrs::new(BpmnType::UserTask),
            ReplaceHints::default(),
        )
        .unwrap()
        .expect("replaced");
    let bo = modeler.bo(user_task).unwrap();
    let upper_bo = modeler.bo(upper).unwrap();
    assert_eq!(modeler.moddle.list(bo, props::LANES), &[upper_bo]);
    assert_eq!(flow_node_refs(&modeler, upper), vec![bo]);
}
