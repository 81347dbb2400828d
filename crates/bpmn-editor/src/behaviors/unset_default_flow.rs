use std::collections::BTreeMap;

use bpmn_core::{BpmnType, Value, props};

use crate::command::{CommandContext, CommandKind, UpdatePropertiesContext};
use crate::error::ModelingError;
use crate::interceptor::{CommandInterceptor, Hook};

/// A deleted default flow stops being its source's default.
pub(super) fn install(interceptor: &mut CommandInterceptor) -> Result<(), ModelingError> {
    interceptor.on_context(
        CommandKind::ConnectionDelete,
        Hook::PreExecute,
        None,
        |modeler, context, _| {
            let CommandContext::ConnectionDelete(ctx) = context else {
                return Ok(());
            };
            if !modeler.is_type(ctx.connection, BpmnType::SequenceFlow) {
                return Ok(());
            }
            let Some(source) = modeler.element(ctx.connection).source else {
                return Ok(());
            };
            let (Some(flow), Some(source_bo)) = (modeler.bo(ctx.connection), modeler.bo(source))
            else {
                return Ok(());
            };
            if modeler.moddle.get(source_bo).get_ref(props::DEFAULT) == Some(flow) {
                let properties = BTreeMap::from([(props::DEFAULT.to_string(), Value::Null)]);
                modeler.execute(UpdatePropertiesContext::new(source, properties))?;
            }
            Ok(())
        },
    )?;
    Ok(())
}
