//! `lane.updateRefs`: keep `Lane.flowNodeRef` and `FlowNode.lanes` in line
//! with geometry.
//!
//! A flow node belongs to every lane whose rectangle strictly contains its
//! mid point; a node exactly on a border belongs to neither lane.

use bpmn_core::{BpmnType, ElementIndex, ObjectIndex, props};

use crate::command::LaneUpdateRefsContext;
use crate::error::ModelingError;
use crate::lane_util::{collect_lanes, lanes_root};
use crate::modeler::Modeler;

/// The lane changes of one flow node.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowNodeRefUpdate {
    pub flow_node: ObjectIndex,
    pub remove: Vec<ObjectIndex>,
    pub add: Vec<ObjectIndex>,
    /// Where each removed pair sat: index in the node's `lanes`, index in
    /// the lane's `flowNodeRef`.
    removed_at: Vec<(Option<usize>, Option<usize>)>,
}

impl FlowNodeRefUpdate {
    pub fn new(flow_node: ObjectIndex, remove: Vec<ObjectIndex>, add: Vec<ObjectIndex>) -> Self {
        Self {
            flow_node,
            remove,
            add,
            removed_at: Vec::new(),
        }
    }
}

fn is_in_lane(modeler: &Modeler, element: ElementIndex, lane: ElementIndex) -> bool {
    let mid = modeler.element(element).bounds.mid();
    modeler.element(lane).bounds.contains_strict(mid)
}

/// Updates for the given flow nodes plus every flow node in the lane sets
/// of the given lanes.
pub fn compute_updates(
    modeler: &Modeler,
    flow_nodes: &[ElementIndex],
    lanes: &[ElementIndex],
) -> Vec<FlowNodeRefUpdate> {
    let mut handled: Vec<ElementIndex> = Vec::new();
    let mut all_flow_nodes: Vec<ElementIndex> = Vec::new();

    for &lane in lanes {
        let Some(root) = lanes_root(modeler, lane) else {
            continue;
        };
        if handled.contains(&root) {
            continue;
        }
        for &child in &modeler.element(root).children {
            if modeler.is(child, BpmnType::is_flow_node) && !all_flow_nodes.contains(&child) {
                all_flow_nodes.push(child);
            }
        }
        handled.push(root);
    }
    for &node in flow_nodes {
        if !all_flow_nodes.contains(&node) {
            all_flow_nodes.push(node);
        }
    }

    let mut updates = Vec::new();
    for node in all_flow_nodes {
        let Some(bo) = modeler.bo(node) else {
            continue;
        };
        let remove = modeler.moddle.list(bo, props::LANES).to_vec();
        let add = if modeler.canvas.contains(node) && modeler.element(node).parent.is_some() {
            lanes_root(modeler, node)
                .map(|root| collect_lanes(modeler, root))
                .unwrap_or_default()
                .into_iter()
                .filter(|lane| is_in_lane(modeler, node, *lane))
                .filter_map(|lane| modeler.bo(lane))
                .collect()
        } else {
            Vec::new()
        };
        if remove != add {
            updates.push(FlowNodeRefUpdate::new(bo, remove, add));
        }
    }

    // lanes that left the canvas release their refs
    for &lane in lanes {
        if modeler.canvas.contains(lane) {
            continue;
        }
        let Some(lane_bo) = modeler.bo(lane) else {
            continue;
        };
        for &flow_node in modeler.moddle.list(lane_bo, props::FLOW_NODE_REF) {
            updates.push(FlowNodeRefUpdate::new(flow_node, vec![lane_bo], Vec::new()));
        }
    }
    updates
}

pub fn pre_execute(modeler: &mut Modeler, ctx: &mut LaneUpdateRefsContext) -> Result<(), ModelingError> {
    if ctx.updates.is_empty() {
        ctx.updates = compute_updates(modeler, &ctx.flow_nodes, &ctx.lanes);
    }
    Ok(())
}

pub fn execute(modeler: &mut Modeler, ctx: &mut LaneUpdateRefsContext) -> Result<(), ModelingError> {
    let moddle = &mut modeler.moddle;
    for update in &mut ctx.updates {
        let node = update.flow_node;
        update.removed_at = update
            .remove
            .iter()
            .map(|&lane| {
                (
                    moddle.remove_from(node, props::LANES, lane),
                    moddle.remove_from(lane, props::FLOW_NODE_REF, node),
                )
            })
            .collect();
        for &lane in &update.add {
            moddle.add_to(node, props::LANES, lane, None);
            moddle.add_to(lane, props::FLOW_NODE_REF, node, None);
        }
    }
    Ok(())
}

pub fn revert(modeler: &mut Modeler, ctx: &mut LaneUpdateRefsContext) -> Result<(), ModelingError> {
    let moddle = &mut modeler.moddle;
    for update in ctx.updates.iter().rev() {
        let node = update.flow_node;
        for &lane in update.add.iter().rev() {
            moddle.remove_from(node, props::LANES, lane);
            moddle.remove_from(lane, props::FLOW_NODE_REF, node);
        }
        for (&lane, &(lane_index, node_index)) in update.remove.iter().zip(&update.removed_at).rev() {
            if lane_index.is_some() {
                moddle.add_to(node, props::LANES, lane, lane_index);
            }
            if node_index.is_some() {
                moddle.add_to(lane, props::FLOW_NODE_REF, node, node_index);
            }
        }
    }
    Ok(())
}
