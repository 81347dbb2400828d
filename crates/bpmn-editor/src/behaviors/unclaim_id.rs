//! Removed elements give their ids back.

use bpmn_core::{BpmnType, ObjectIndex, props};

use crate::command::{CommandContext, CommandKind};
use crate::error::ModelingError;
use crate::interceptor::{CommandInterceptor, Hook};
use crate::modeler::Modeler;

pub(super) fn install(interceptor: &mut CommandInterceptor) -> Result<(), ModelingError> {
    interceptor.on_context(
        [CommandKind::ShapeDelete, CommandKind::ConnectionDelete],
        Hook::PreExecute,
        None,
        |modeler, context, _| {
            let Some(element) = context.element() else {
                return Ok(());
            };
            let el = modeler.element(element);
            if el.is_label() {
                return Ok(());
            }
            let collapsed = el.collapsed;
            let Some(bo) = el.business_object else {
                return Ok(());
            };
            if modeler.moddle.type_of(bo) == BpmnType::Participant
                && !collapsed
                && let Some(process) = modeler.moddle.get(bo).get_ref(props::PROCESS_REF)
            {
                unclaim(modeler, process)?;
            }
            unclaim(modeler, bo)
        },
    )?;

    // leaving a collaboration frees its id
    interceptor.on_context(
        CommandKind::CanvasUpdateRoot,
        Hook::PreExecute,
        None,
        |modeler, _, _| {
            let root = modeler.root();
            match modeler.bo(root) {
                Some(bo) if modeler.moddle.type_of(bo) == BpmnType::Collaboration => {
                    unclaim(modeler, bo)
                }
                _ => Ok(()),
            }
        },
    )?;
    Ok(())
}

fn unclaim(modeler: &mut Modeler, bo: ObjectIndex) -> Result<(), ModelingError> {
    let id = modeler.moddle.get(bo).id;
    modeler.execute(CommandContext::unclaim_id(id, bo))?;
    Ok(())
}
