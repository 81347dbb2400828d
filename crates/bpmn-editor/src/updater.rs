//! The BPMN updater: keeps business objects and DI in line with the
//! graphical model.
//!
//! Handlers only touch the canvas. After every structural command the
//! updater, installed as `executed`/`reverted` listeners, mirrors the change
//! into the semantic tree (`$parent`, containment lists, references) and the
//! DI tree (bounds, waypoints, plane elements). Elements without a business
//! object are ignored.

use bpmn_core::{BpmnType, DiIndex, DiLabel, ElementIndex, ObjectIndex, Value, props};

use crate::command::{CommandContext, CommandKind};
use crate::error::ModelingError;
use crate::interceptor::{CommandInterceptor, Hook};
use crate::modeler::Modeler;

/// Runs after the behaviors of the same hook.
const UPDATER_PRIORITY: i32 = 500;

/// Where a business object lives inside its semantic parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Containment {
    Lanes,
    FlowElements,
    Artifacts,
    MessageFlows,
    Participants,
    DataInputAssociations,
    DataOutputAssociations,
}

impl Containment {
    fn of(bpmn_type: BpmnType) -> Option<Self> {
        Some(match bpmn_type {
            BpmnType::Lane => Containment::Lanes,
            BpmnType::MessageFlow => Containment::MessageFlows,
            BpmnType::Participant => Containment::Participants,
            BpmnType::DataInputAssociation => Containment::DataInputAssociations,
            BpmnType::DataOutputAssociation => Containment::DataOutputAssociations,
            t if t.is_flow_element() => Containment::FlowElements,
            t if t.is_artifact() => Containment::Artifacts,
            _ => return None,
        })
    }

    fn property(self) -> &'static str {
        match self {
            Containment::Lanes => props::LANES,
            Containment::FlowElements => props::FLOW_ELEMENTS,
            Containment::Artifacts => props::ARTIFACTS,
            Containment::MessageFlows => props::MESSAGE_FLOWS,
            Containment::Participants => props::PARTICIPANTS,
            Containment::DataInputAssociations => props::DATA_INPUT_ASSOCIATIONS,
            Containment::DataOutputAssociations => props::DATA_OUTPUT_ASSOCIATIONS,
        }
    }

    /// The object that actually holds the collection when `parent` is the
    /// visual container.
    fn resolve(self, modeler: &mut Modeler, parent: ObjectIndex) -> ObjectIndex {
        if self == Containment::Lanes {
            return lane_set(modeler, parent);
        }
        let moddle = &modeler.moddle;
        match self {
            Containment::FlowElements => {
                if moddle.type_of(parent) == BpmnType::Participant {
                    return moddle.get(parent).get_ref(props::PROCESS_REF).unwrap_or(parent);
                }
                // lane → lane set → process or parent lane
                let mut parent = parent;
                while moddle.type_of(parent) == BpmnType::Lane {
                    match moddle.parent_of(parent).and_then(|set| moddle.parent_of(set)) {
                        Some(next) => parent = next,
                        None => break,
                    }
                }
                parent
            }
            Containment::Artifacts => {
                let mut current = Some(parent);
                while let Some(p) = current {
                    match moddle.type_of(p) {
                        BpmnType::Process | BpmnType::Collaboration => return p,
                        t if t.is_sub_process() => return p,
                        BpmnType::Participant => {
                            return moddle.get(p).get_ref(props::PROCESS_REF).unwrap_or(p);
                        }
                        _ => current = moddle.parent_of(p),
                    }
                }
                parent
            }
            _ => parent,
        }
    }
}

/// The lane set lanes of `container` go into, created on demand.
fn lane_set(modeler: &mut Modeler, container: ObjectIndex) -> ObjectIndex {
    let owner = match modeler.moddle.type_of(container) {
        BpmnType::Participant => modeler
            .moddle
            .get(container)
            .get_ref(props::PROCESS_REF)
            .unwrap_or(container),
        _ => container,
    };

    if modeler.moddle.type_of(owner) == BpmnType::Lane {
        if let Some(set) = modeler.moddle.get(owner).get_ref(props::CHILD_LANE_SET) {
            return set;
        }
        let set = create_lane_set(modeler, owner);
        modeler
            .moddle
            .get_mut(owner)
            .set(props::CHILD_LANE_SET, set.into());
        return set;
    }

    if let Some(&set) = modeler.moddle.list(owner, props::LANE_SETS).first() {
        return set;
    }
    let set = create_lane_set(modeler, owner);
    modeler.moddle.add_to(owner, props::LANE_SETS, set, None);
    set
}

fn create_lane_set(modeler: &mut Modeler, owner: ObjectIndex) -> ObjectIndex {
    let moddle = &mut modeler.moddle;
    let id = moddle.ids.next_prefixed(BpmnType::LaneSet.id_prefix(), None);
    let set = moddle.create(BpmnType::LaneSet, id);
    moddle.get_mut(set).parent = Some(owner);
    log::trace!("created lane set {} in {}", id, moddle.get(owner).id);
    set
}

/// Move `bo` into the containment list of `new_parent` (or out of its
/// current one for `None`).
///
/// # Errors
/// Returns [`ModelingError::InvalidModel`] when `bo` cannot live in a
/// semantic container.
pub(crate) fn update_semantic_parent(
    modeler: &mut Modeler,
    bo: ObjectIndex,
    new_parent: Option<ObjectIndex>,
) -> Result<(), ModelingError> {
    let bpmn_type = modeler.moddle.type_of(bo);
    if modeler.moddle.parent_of(bo) == new_parent
        || matches!(bpmn_type, BpmnType::DataInput | BpmnType::DataOutput)
    {
        return Ok(());
    }

    let Some(containment) = Containment::of(bpmn_type) else {
        let parent_id = new_parent
            .map(|p| modeler.moddle.get(p).id.to_string())
            .unwrap_or_default();
        return Err(ModelingError::InvalidModel(format!(
            "no parent for {} in {parent_id}",
            modeler.moddle.get(bo).id
        )));
    };
    let new_parent = match new_parent {
        Some(parent) => Some(containment.resolve(modeler, parent)),
        None => None,
    };
    if modeler.moddle.parent_of(bo) == new_parent {
        return Ok(());
    }

    if bpmn_type == BpmnType::Participant {
        move_participant_process(modeler, bo, new_parent);
    }

    let prop = containment.property();
    if let Some(old) = modeler.moddle.parent_of(bo) {
        modeler.moddle.remove_from(old, prop, bo);
    }
    if let Some(new) = new_parent {
        modeler.moddle.add_to(new, prop, bo, None);
    }
    modeler.moddle.get_mut(bo).parent = new_parent;
    Ok(())
}

/// A participant's process is a root element exactly while the participant
/// is part of the diagram.
fn move_participant_process(modeler: &mut Modeler, participant: ObjectIndex, new_parent: Option<ObjectIndex>) {
    let Some(process) = modeler.moddle.get(participant).get_ref(props::PROCESS_REF) else {
        return;
    };
    let definitions = modeler.moddle.definitions;
    if modeler.moddle.parent_of(participant).is_some() {
        modeler
            .moddle
            .remove_from(definitions, props::ROOT_ELEMENTS, process);
        modeler.moddle.get_mut(process).parent = None;
    }
    if new_parent.is_some() {
        modeler
            .moddle
            .add_to(definitions, props::ROOT_ELEMENTS, process, None);
        modeler.moddle.get_mut(process).parent = Some(definitions);
    }
}

/// Move `di` under `parent`. Shapes and edges always live on a plane, so a
/// non-plane parent stands for its own plane.
pub(crate) fn update_di_parent(modeler: &mut Modeler, di: DiIndex, parent: Option<DiIndex>) {
    let parent = match parent {
        Some(p) if !modeler.moddle.di(p).is_plane() => modeler.moddle.di(p).parent,
        other => other,
    };
    if modeler.moddle.di(di).parent == parent {
        return;
    }
    modeler.moddle.set_di_parent(di, parent);
}

// ─── Parent ──────────────────────────────────────────────────────────────

/// Sync the semantic and DI parent of `element` with its graphical parent.
fn update_parent(
    modeler: &mut Modeler,
    element: ElementIndex,
    old_parent: Option<ElementIndex>,
) -> Result<(), ModelingError> {
    let el = modeler.element(element);
    // labels share the business object of their target
    if el.is_label() {
        return Ok(());
    }
    let Some(bo) = el.business_object else {
        return Ok(());
    };
    let parent = el.parent;
    let (source, target) = (el.source, el.target);
    let bpmn_type = modeler.moddle.type_of(bo);

    if bpmn_type == BpmnType::DataStoreReference
        && parent.is_some_and(|p| modeler.is_type(p, BpmnType::Collaboration))
    {
        return Ok(());
    }

    let mut parent_bo = parent.and_then(|p| modeler.bo(p));
    let parent_di = parent_bo.and_then(|p| modeler.moddle.di_of(p));

    if bpmn_type.is_flow_node() {
        update_lane_containment(
            modeler,
            bo,
            parent_bo,
            old_parent.and_then(|p| modeler.bo(p)),
        );
    }
    match bpmn_type {
        BpmnType::DataOutputAssociation => parent_bo = source.and_then(|s| modeler.bo(s)),
        BpmnType::DataInputAssociation => parent_bo = target.and_then(|t| modeler.bo(t)),
        _ => {}
    }

    update_semantic_parent(modeler, bo, parent_bo)?;
    if bpmn_type == BpmnType::DataObjectReference
        && let Some(data_object) = modeler.moddle.get(bo).get_ref(props::DATA_OBJECT_REF)
    {
        update_semantic_parent(modeler, data_object, parent_bo)?;
    }
    if let Some(di) = modeler.moddle.di_of(bo) {
        update_di_parent(modeler, di, parent_di);
    }
    Ok(())
}

/// A flow node dropped straight into a lane is referenced by that lane.
fn update_lane_containment(
    modeler: &mut Modeler,
    bo: ObjectIndex,
    new_container: Option<ObjectIndex>,
    old_container: Option<ObjectIndex>,
) {
    if new_container == old_container {
        return;
    }
    let is_lane = |m: &Modeler, c: Option<ObjectIndex>| {
        c.filter(|c| m.moddle.type_of(*c) == BpmnType::Lane)
    };
    if let Some(old) = is_lane(modeler, old_container) {
        modeler.moddle.remove_from(old, props::FLOW_NODE_REF, bo);
        modeler.moddle.remove_from(bo, props::LANES, old);
    }
    if let Some(new) = is_lane(modeler, new_container) {
        modeler.moddle.add_to(new, props::FLOW_NODE_REF, bo, None);
        modeler.moddle.add_to(bo, props::LANES, new, None);
    }
}

// ─── Bounds & waypoints ──────────────────────────────────────────────────

/// Write the shape's bounds into its DI. Labels write the label bounds of
/// their target's DI; activities keep their embedded label in place.
fn update_bounds(modeler: &mut Modeler, shape: ElementIndex) {
    let el = modeler.element(shape);
    let Some(bo) = el.business_object else {
        return;
    };
    let Some(di) = modeler.moddle.di_of(bo) else {
        return;
    };
    let bounds = el.bounds;
    let is_label = el.is_label();
    let is_activity = modeler.moddle.type_of(bo).is_activity();
    let di_object = modeler.moddle.di_mut(di);

    if is_label {
        di_object.label.get_or_insert_with(DiLabel::default).bounds = Some(bounds);
        return;
    }

    if is_activity
        && let (Some(old), Some(label_bounds)) = (
            di_object.bounds,
            di_object.label.as_mut().and_then(|l| l.bounds.as_mut()),
        )
    {
        label_bounds.x = bounds.x + (label_bounds.x - old.x);
        label_bounds.y = bounds.y + (label_bounds.y - old.y);
    }
    di_object.bounds = Some(bounds);
}

fn update_connection_waypoints(modeler: &mut Modeler, connection: ElementIndex) {
    let el = modeler.element(connection);
    let Some(di) = el.business_object.and_then(|bo| modeler.moddle.di_of(bo)) else {
        return;
    };
    let points = el.waypoints.iter().map(|w| w.point()).collect();
    modeler.moddle.di_mut(di).waypoints = points;
}

// ─── Connections ─────────────────────────────────────────────────────────

/// Mirror source and target of `connection` into `sourceRef`/`targetRef`
/// (and `incoming`/`outgoing` for sequence flows).
fn update_connection(modeler: &mut Modeler, connection: ElementIndex) -> Result<(), ModelingError> {
    let el = modeler.element(connection);
    let Some(bo) = el.business_object else {
        return Ok(());
    };
    let new_source = el.source.and_then(|s| modeler.bo(s));
    let new_target = el.target.and_then(|t| modeler.bo(t));

    match modeler.moddle.type_of(bo) {
        BpmnType::DataInputAssociation => {
            modeler.moddle.get_mut(bo).set(props::SOURCE_REF, new_source.into());
            update_semantic_parent(modeler, bo, new_target)?;
        }
        BpmnType::DataOutputAssociation => {
            update_semantic_parent(modeler, bo, new_source)?;
            modeler.moddle.get_mut(bo).set(props::TARGET_REF, new_target.into());
        }
        bpmn_type => {
            let inverse = bpmn_type == BpmnType::SequenceFlow;
            relink(modeler, bo, props::SOURCE_REF, props::OUTGOING, new_source, inverse);
            relink(modeler, bo, props::TARGET_REF, props::INCOMING, new_target, inverse);
        }
    }
    update_connection_waypoints(modeler, connection);
    Ok(())
}

fn relink(
    modeler: &mut Modeler,
    bo: ObjectIndex,
    reference: &str,
    inverse_list: &str,
    new_end: Option<ObjectIndex>,
    inverse: bool,
) {
    let old_end = modeler.moddle.get(bo).get_ref(reference);
    if old_end == new_end {
        return;
    }
    if inverse {
        if let Some(old) = old_end {
            modeler.moddle.remove_from(old, inverse_list, bo);
        }
        if let Some(new) = new_end {
            modeler.moddle.add_to(new, inverse_list, bo, None);
        }
    }
    modeler.moddle.get_mut(bo).set(reference, new_end.into());
}

/// Sequence flows leaving their source lose a stale `default` marker on
/// the old source and a condition the new source cannot carry.
fn clear_reconnected_flow(modeler: &mut Modeler, context: &mut CommandContext) {
    let CommandContext::ConnectionReconnect(ctx) = context else {
        return;
    };
    let Some(bo) = modeler.bo(ctx.connection) else {
        return;
    };
    if modeler.moddle.type_of(bo) != BpmnType::SequenceFlow {
        return;
    }

    ctx.old_default_owner = None;
    if let Some(old_source) = ctx.old_source
        && old_source != ctx.new_source
        && let Some(owner) = modeler.bo(old_source)
        && modeler.moddle.get(owner).get_ref(props::DEFAULT) == Some(bo)
    {
        modeler.moddle.get_mut(owner).set(props::DEFAULT, Value::Null);
        ctx.old_default_owner = Some(owner);
    }

    let supports_condition = modeler.is(ctx.new_source, BpmnType::supports_conditional_outgoing);
    ctx.old_condition_expression = if supports_condition {
        Value::Null
    } else {
        modeler
            .moddle
            .get_mut(bo)
            .set(props::CONDITION_EXPRESSION, Value::Null)
    };
}

fn restore_reconnected_flow(modeler: &mut Modeler, context: &mut CommandContext) {
    let CommandContext::ConnectionReconnect(ctx) = context else {
        return;
    };
    let Some(bo) = modeler.bo(ctx.connection) else {
        return;
    };
    if !ctx.old_condition_expression.is_null() {
        modeler
            .moddle
            .get_mut(bo)
            .set(props::CONDITION_EXPRESSION, ctx.old_condition_expression.clone());
    }
    if let Some(owner) = ctx.old_default_owner {
        modeler.moddle.get_mut(owner).set(props::DEFAULT, bo.into());
    }
}

/// `attachedToRef` follows the graphical host.
fn update_attachment(modeler: &mut Modeler, shape: ElementIndex) {
    let el = modeler.element(shape);
    if el.is_label() {
        return;
    }
    let Some(bo) = el.business_object else {
        return;
    };
    let host = el.host.and_then(|h| modeler.bo(h));
    let current = modeler.moddle.get(bo).get_ref(props::ATTACHED_TO_REF);
    if current != host {
        modeler
            .moddle
            .get_mut(bo)
            .set(props::ATTACHED_TO_REF, host.into());
    }
}

// ─── Wiring ──────────────────────────────────────────────────────────────

/// The element whose parent changed, the parent it had before `executed`,
/// and the parent it returns from on `reverted`.
fn parent_change(
    context: &CommandContext,
) -> Option<(ElementIndex, Option<ElementIndex>, Option<ElementIndex>)> {
    Some(match context {
        CommandContext::ShapeCreate(c) => (c.shape, None, Some(c.parent)),
        CommandContext::ShapeDelete(c) => (c.shape, c.old_parent, None),
        CommandContext::ShapeMove(c) => (c.shape, c.old_parent, c.new_parent.or(c.old_parent)),
        CommandContext::ConnectionCreate(c) => (c.connection, None, Some(c.parent)),
        CommandContext::ConnectionDelete(c) => (c.connection, c.old_parent, None),
        CommandContext::ConnectionMove(c) => {
            (c.connection, c.old_parent, c.new_parent.or(c.old_parent))
        }
        CommandContext::ElementUpdateParent(c) => (c.element, c.old_parent, Some(c.new_parent)),
        _ => return None,
    })
}

type UpdateFn = fn(&mut Modeler, &mut CommandContext, Hook) -> Result<(), ModelingError>;

fn listen(
    interceptor: &mut CommandInterceptor,
    commands: &[CommandKind],
    hook: Hook,
    update: UpdateFn,
) -> Result<(), ModelingError> {
    interceptor.on(commands, hook, Some(UPDATER_PRIORITY), move |modeler, event| {
        update(modeler, event.context, event.hook)
    })
}

pub struct BpmnUpdater;

impl BpmnUpdater {
    /// Register the updater's listeners.
    pub fn install(interceptor: &mut CommandInterceptor) -> Result<(), ModelingError> {
        use CommandKind::*;

        for hook in [Hook::Executed, Hook::Reverted] {
            listen(
                interceptor,
                &[ShapeCreate, ShapeDelete, ShapeMove, ConnectionCreate, ConnectionDelete, ConnectionMove, ElementUpdateParent],
                hook,
                |modeler, context, hook| {
                    let Some((element, old, reverted_from)) = parent_change(context) else {
                        return Ok(());
                    };
                    let old_parent = if hook == Hook::Reverted { reverted_from } else { old };
                    update_parent(modeler, element, old_parent)
                },
            )?;
            listen(
                interceptor,
                &[ShapeCreate, ShapeMove, ShapeResize, LabelCreate],
                hook,
                |modeler, context, _| {
                    if let Some(shape) = context.element()
                        && modeler.canvas.contains(shape)
                    {
                        update_bounds(modeler, shape);
                    }
                    Ok(())
                },
            )?;
            listen(
                interceptor,
                &[ConnectionLayout, ConnectionUpdateWaypoints],
                hook,
                |modeler, context, _| {
                    if let Some(connection) = context.element() {
                        update_connection_waypoints(modeler, connection);
                    }
                    Ok(())
                },
            )?;
            listen(
                interceptor,
                &[ConnectionCreate, ConnectionDelete, ConnectionMove, ConnectionReconnect],
                hook,
                |modeler, context, _| match context.element() {
                    Some(connection) => update_connection(modeler, connection),
                    None => Ok(()),
                },
            )?;
            listen(
                interceptor,
                &[ElementUpdateAttachment, ShapeCreate, ShapeDelete],
                hook,
                |modeler, context, _| {
                    if let Some(shape) = context.element() {
                        update_attachment(modeler, shape);
                    }
                    Ok(())
                },
            )?;
        }

        listen(interceptor, &[ConnectionReconnect], Hook::Executed, |modeler, context, _| {
            clear_reconnected_flow(modeler, context);
            Ok(())
        })?;
        listen(interceptor, &[ConnectionReconnect], Hook::Reverted, |modeler, context, _| {
            restore_reconnected_flow(modeler, context);
            Ok(())
        })?;
        log::debug!("bpmn updater installed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelerConfig;
    use crate::element_factory::ShapeAttrs;
    use bpmn_core::{Bounds, Point};
    use pretty_assertions::assert_eq;

    #[test]
    fn containment_by_type() {
        assert_eq!(Containment::of(BpmnType::Task), Some(Containment::FlowElements));
        assert_eq!(Containment::of(BpmnType::Group), Some(Containment::Artifacts));
        assert_eq!(Containment::of(BpmnType::Lane), Some(Containment::Lanes));
        assert_eq!(Containment::of(BpmnType::Category), None);
    }

    #[test]
    fn uncontainable_objects_are_invalid_model() {
        let mut modeler = Modeler::new();
        let category = modeler
            .element_factory()
            .create_business_object(BpmnType::Category, Some("Category_x"))
            .unwrap();
        let process = modeler.bo(modeler.root()).unwrap();
        let err = update_semantic_parent(&mut modeler, category, Some(process)).unwrap_err();
        assert_eq!(
            err,
            ModelingError::InvalidModel(format!(
                "no parent for Category_x in {}",
                modeler.moddle.get(process).id
            ))
        );
    }

    #[test]
    fn created_shapes_join_flow_elements() {
        let mut modeler = Modeler::with_config(ModelerConfig::default()).unwrap();
        let root = modeler.root();
        let task = modeler
            .modeling()
            .create_shape(&ShapeAttrs::new(BpmnType::Task), Point::new(200.0, 200.0), root)
            .unwrap();
        let bo = modeler.bo(task).unwrap();
        let process = modeler.bo(root).unwrap();
        assert_eq!(modeler.moddle.parent_of(bo), Some(process));
        assert!(modeler.moddle.list(process, props::FLOW_ELEMENTS).contains(&bo));
        let di = modeler.moddle.di_of(bo).unwrap();
        assert_eq!(modeler.moddle.di(di).parent, Some(modeler.moddle.plane));
        assert_eq!(
            modeler.moddle.di(di).bounds,
            Some(Bounds::new(150.0, 160.0, 100.0, 80.0))
        );
    }
}
