//! Data store references dropped on a collaboration still need a process to
//! live in: they join the first participant that has one.

use bpmn_core::{BpmnType, ElementIndex, ObjectIndex, props};

use crate::command::{CommandContext, CommandKind, UpdateSemanticParentContext};
use crate::error::ModelingError;
use crate::interceptor::{CommandInterceptor, Hook};
use crate::modeler::Modeler;

pub(super) fn install(interceptor: &mut CommandInterceptor) -> Result<(), ModelingError> {
    interceptor.on_context(
        [CommandKind::ShapeCreate, CommandKind::ShapeMove],
        Hook::PostExecute,
        None,
        |modeler, context, _| {
            let Some(shape) = context.element() else {
                return Ok(());
            };
            let on_collaboration = modeler
                .element(shape)
                .parent
                .is_some_and(|p| modeler.is_type(p, BpmnType::Collaboration));
            if is_data_store(modeler, shape) && on_collaboration {
                update_data_store_parent(modeler, shape, None)?;
            }
            Ok(())
        },
    )?;

    // data stores living in a removed participant move to another one
    interceptor.on_context(
        CommandKind::ShapeDelete,
        Hook::PostExecute,
        None,
        |modeler, context, _| {
            let CommandContext::ShapeDelete(ctx) = context else {
                return Ok(());
            };
            let root = modeler.root();
            let removed_container = modeler.is(ctx.shape, |t| {
                t == BpmnType::Participant || t.is_sub_process()
            });
            if !removed_container || !modeler.is_type(root, BpmnType::Collaboration) {
                return Ok(());
            }
            let Some(container) = modeler.bo(ctx.shape).map(|bo| semantic_container(modeler, bo))
            else {
                return Ok(());
            };
            let container_id = modeler.moddle.get(container).id;
            for data_store in data_stores(modeler, root) {
                let inside = modeler.bo(data_store).is_some_and(|bo| {
                    modeler
                        .moddle
                        .find_ancestor(bo, |o| o.id == container_id)
                        .is_some()
                });
                if inside {
                    update_data_store_parent(modeler, data_store, None)?;
                }
            }
            Ok(())
        },
    )?;

    // turning a collaboration back into a process
    interceptor.on_context(
        CommandKind::CanvasUpdateRoot,
        Hook::PostExecute,
        None,
        |modeler, context, _| {
            let CommandContext::CanvasUpdateRoot(ctx) = context else {
                return Ok(());
            };
            let (Some(old_root), new_root) = (ctx.old_root, ctx.new_root) else {
                return Ok(());
            };
            if !modeler.is_type(new_root, BpmnType::Process) {
                return Ok(());
            }
            for data_store in data_stores(modeler, old_root) {
                update_data_store_parent(modeler, data_store, Some(new_root))?;
            }
            Ok(())
        },
    )?;
    Ok(())
}

fn is_data_store(modeler: &Modeler, shape: ElementIndex) -> bool {
    !modeler.element(shape).is_label() && modeler.is_type(shape, BpmnType::DataStoreReference)
}

fn data_stores(modeler: &Modeler, root: ElementIndex) -> Vec<ElementIndex> {
    modeler
        .element(root)
        .children
        .iter()
        .copied()
        .filter(|c| is_data_store(modeler, *c))
        .collect()
}

/// The object a participant's contents live in.
fn semantic_container(modeler: &Modeler, bo: ObjectIndex) -> ObjectIndex {
    modeler
        .moddle
        .get(bo)
        .get_ref(props::PROCESS_REF)
        .unwrap_or(bo)
}

fn first_participant_with_process(modeler: &Modeler) -> Option<ElementIndex> {
    let root = modeler.root();
    modeler.element(root).children.iter().copied().find(|c| {
        modeler.is_type(*c, BpmnType::Participant)
            && modeler
                .bo(*c)
                .is_some_and(|bo| modeler.moddle.get(bo).get_ref(props::PROCESS_REF).is_some())
    })
}

fn update_data_store_parent(
    modeler: &mut Modeler,
    data_store: ElementIndex,
    new_parent: Option<ElementIndex>,
) -> Result<(), ModelingError> {
    let Some(new_parent) = new_parent.or_else(|| first_participant_with_process(modeler)) else {
        log::debug!(
            "no process for data store {}",
            modeler.element(data_store).id
        );
        return Ok(());
    };
    let Some(parent_bo) = modeler.bo(new_parent) else {
        return Ok(());
    };
    let new_semantic_parent = semantic_container(modeler, parent_bo);
    let new_di_parent = modeler.moddle.di_of(parent_bo);
    modeler.execute(UpdateSemanticParentContext {
        element: data_store,
        new_semantic_parent,
        new_di_parent,
        old_semantic_parent: None,
        old_di_parent: None,
    })?;
    Ok(())
}
