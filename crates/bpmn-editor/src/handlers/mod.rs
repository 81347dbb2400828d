//! Command handlers.
//!
//! Each module implements one command as free functions over its typed
//! context:
//!
//! - `pre_execute`: enrich the context, run nested commands
//! - `execute`: apply the change, capturing what revert needs
//! - `post_execute`: run follow-up nested commands
//! - `revert`: restore the captured state exactly
//!
//! `execute` and `revert` must not start commands; nested commands belong
//! in the pre and post phases, which redo does not replay.

pub mod add_lane;
pub mod create_connection;
pub mod create_elements;
pub mod create_label;
pub mod create_shape;
pub mod delete_connection;
pub mod delete_elements;
pub mod delete_shape;
pub mod id_claim;
pub mod layout_connection;
pub mod move_connection;
pub mod move_elements;
pub mod move_shape;
pub mod reconnect_connection;
pub mod replace_shape;
pub mod resize_lane;
pub mod resize_shape;
pub mod set_color;
pub mod space_tool;
pub mod split_lane;
pub mod update_attachment;
pub mod update_canvas_root;
pub mod update_flow_node_refs;
pub mod update_label;
pub mod update_moddle_properties;
pub mod update_parent;
pub mod update_properties;
pub mod update_semantic_parent;
pub mod update_waypoints;

use bpmn_core::ElementIndex;

use crate::command::CommandContext;
use crate::error::ModelingError;
use crate::modeler::Modeler;

type HandlerResult = Result<(), ModelingError>;

/// Fail unless `element` is on the canvas.
pub(crate) fn ensure_on_canvas(modeler: &Modeler, element: ElementIndex) -> HandlerResult {
    if modeler.canvas.contains(element) {
        Ok(())
    } else {
        Err(ModelingError::ElementNotFound(
            modeler.element(element).id.to_string(),
        ))
    }
}

/// Create commands need a fresh element; delete commands a live one.
pub(crate) fn can_execute(modeler: &Modeler, context: &CommandContext) -> bool {
    match context {
        CommandContext::ShapeCreate(c) => !modeler.canvas.contains(c.shape),
        CommandContext::LabelCreate(c) => !modeler.canvas.contains(c.label),
        CommandContext::ConnectionCreate(c) => !modeler.canvas.contains(c.connection),
        CommandContext::ShapeDelete(c) => modeler.canvas.contains(c.shape),
        CommandContext::ConnectionDelete(c) => modeler.canvas.contains(c.connection),
        _ => true,
    }
}

pub(crate) fn pre_execute(modeler: &mut Modeler, context: &mut CommandContext) -> HandlerResult {
    match context {
        CommandContext::ShapeMove(c) => ensure_on_canvas(modeler, c.shape),
        CommandContext::ShapeResize(c) => ensure_on_canvas(modeler, c.shape),
        CommandContext::ConnectionReconnect(c) => ensure_on_canvas(modeler, c.connection),
        CommandContext::ShapeDelete(c) => delete_shape::pre_execute(modeler, c),
        CommandContext::ShapeReplace(c) => replace_shape::pre_execute(modeler, c),
        CommandContext::LabelCreate(c) => create_label::pre_execute(modeler, c),
        CommandContext::ElementsMove(c) => move_elements::pre_execute(modeler, c),
        CommandContext::ElementsCreate(c) => create_elements::pre_execute(modeler, c),
        CommandContext::ElementsDelete(c) => delete_elements::pre_execute(modeler, c),
        CommandContext::ElementUpdateLabel(c) => update_label::pre_execute(modeler, c),
        CommandContext::LaneAdd(c) => add_lane::pre_execute(modeler, c),
        CommandContext::LaneSplit(c) => split_lane::pre_execute(modeler, c),
        CommandContext::LaneResize(c) => resize_lane::pre_execute(modeler, c),
        CommandContext::LaneUpdateRefs(c) => update_flow_node_refs::pre_execute(modeler, c),
        CommandContext::SpaceTool(c) => space_tool::pre_execute(modeler, c),
        _ => Ok(()),
    }
}

pub(crate) fn execute(modeler: &mut Modeler, context: &mut CommandContext) -> HandlerResult {
    match context {
        CommandContext::ShapeCreate(c) => create_shape::execute(modeler, c),
        CommandContext::LabelCreate(c) => create_label::execute(modeler, c),
        CommandContext::ShapeDelete(c) => delete_shape::execute(modeler, c),
        CommandContext::ShapeMove(c) => move_shape::execute(modeler, c),
        CommandContext::ShapeResize(c) => resize_shape::execute(modeler, c),
        CommandContext::ConnectionCreate(c) => create_connection::execute(modeler, c),
        CommandContext::ConnectionDelete(c) => delete_connection::execute(modeler, c),
        CommandContext::ConnectionMove(c) => move_connection::execute(modeler, c),
        CommandContext::ConnectionLayout(c) => layout_connection::execute(modeler, c),
        CommandContext::ConnectionUpdateWaypoints(c) => update_waypoints::execute(modeler, c),
        CommandContext::ConnectionReconnect(c) => reconnect_connection::execute(modeler, c),
        CommandContext::ElementUpdateAttachment(c) => update_attachment::execute(modeler, c),
        CommandContext::ElementUpdateParent(c) => update_parent::execute(modeler, c),
        CommandContext::ElementUpdateLabel(c) => update_label::execute(modeler, c),
        CommandContext::ElementUpdateProperties(c) => update_properties::execute(modeler, c),
        CommandContext::ElementUpdateModdleProperties(c) => {
            update_moddle_properties::execute(modeler, c)
        }
        CommandContext::ElementUpdateSemanticParent(c) => {
            update_semantic_parent::execute(modeler, c)
        }
        CommandContext::ElementSetColor(c) => set_color::execute(modeler, c),
        CommandContext::LaneUpdateRefs(c) => update_flow_node_refs::execute(modeler, c),
        CommandContext::IdClaim(c) => id_claim::claim(modeler, c),
        CommandContext::IdUnclaim(c) => id_claim::unclaim(modeler, c),
        CommandContext::CanvasUpdateRoot(c) => update_canvas_root::execute(modeler, c),
        // composite commands: all work happens in nested commands
        CommandContext::ShapeReplace(_)
        | CommandContext::ElementsMove(_)
        | CommandContext::ElementsCreate(_)
        | CommandContext::ElementsDelete(_)
        | CommandContext::LaneAdd(_)
        | CommandContext::LaneSplit(_)
        | CommandContext::LaneResize(_)
        | CommandContext::SpaceTool(_) => Ok(()),
    }
}

pub(crate) fn post_execute(modeler: &mut Modeler, context: &mut CommandContext) -> HandlerResult {
    match context {
        CommandContext::ShapeMove(c) => move_shape::post_execute(modeler, c),
        CommandContext::ShapeResize(c) => resize_shape::post_execute(modeler, c),
        CommandContext::ShapeReplace(c) => replace_shape::post_execute(modeler, c),
        CommandContext::ElementsMove(c) => move_elements::post_execute(modeler, c),
        CommandContext::ConnectionReconnect(c) => reconnect_connection::post_execute(modeler, c),
        CommandContext::ElementUpdateLabel(c) => update_label::post_execute(modeler, c),
        _ => Ok(()),
    }
}

pub(crate) fn revert(modeler: &mut Modeler, context: &mut CommandContext) -> HandlerResult {
    match context {
        CommandContext::ShapeCreate(c) => create_shape::revert(modeler, c),
        CommandContext::LabelCreate(c) => create_label::revert(modeler, c),
        CommandContext::ShapeDelete(c) => delete_shape::revert(modeler, c),
        CommandContext::ShapeMove(c) => move_shape::revert(modeler, c),
        CommandContext::ShapeResize(c) => resize_shape::revert(modeler, c),
        CommandContext::ConnectionCreate(c) => create_connection::revert(modeler, c),
        CommandContext::ConnectionDelete(c) => delete_connection::revert(modeler, c),
        CommandContext::ConnectionMove(c) => move_connection::revert(modeler, c),
        CommandContext::ConnectionLayout(c) => layout_connection::revert(modeler, c),
        CommandContext::ConnectionUpdateWaypoints(c) => update_waypoints::revert(modeler, c),
        CommandContext::ConnectionReconnect(c) => reconnect_connection::revert(modeler, c),
        CommandContext::ElementUpdateAttachment(c) => update_attachment::revert(modeler, c),
        CommandContext::ElementUpdateParent(c) => update_parent::revert(modeler, c),
        CommandContext::ElementUpdateLabel(c) => update_label::revert(modeler, c),
        CommandContext::ElementUpdateProperties(c) => update_properties::revert(modeler, c),
        CommandContext::ElementUpdateModdleProperties(c) => {
            update_moddle_properties::revert(modeler, c)
        }
        CommandContext::ElementUpdateSemanticParent(c) => {
            update_semantic_parent::revert(modeler, c)
        }
        CommandContext::ElementSetColor(c) => set_color::revert(modeler, c),
        CommandContext::LaneUpdateRefs(c) => update_flow_node_refs::revert(modeler, c),
        CommandContext::IdClaim(c) => id_claim::unclaim(modeler, c),
        CommandContext::IdUnclaim(c) => id_claim::claim(modeler, c),
        CommandContext::CanvasUpdateRoot(c) => update_canvas_root::revert(modeler, c),
        CommandContext::ShapeReplace(_)
        | CommandContext::ElementsMove(_)
        | CommandContext::ElementsCreate(_)
        | CommandContext::ElementsDelete(_)
        | CommandContext::LaneAdd(_)
        | CommandContext::LaneSplit(_)
        | CommandContext::LaneResize(_)
        | CommandContext::SpaceTool(_) => Ok(()),
    }
}
